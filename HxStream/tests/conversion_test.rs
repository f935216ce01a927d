use hxstream::converter::{convert, convert_hx_to_json, convert_json_to_hx, from_json, to_json};
use hxstream::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn sample() -> Document {
    let mut doc = Document::new(1);
    doc.header.push(PropertyTag::Generator, "tool-x");
    doc.header.push(PropertyTag::PadArrays, true);
    doc.push_block(
        ObjectBlock::new()
            .with(PropertyTag::Name, "tri")
            .with(PropertyTag::NumVertices, 3u32)
            .with(PropertyTag::IndexType, IndexType::U16)
            .with(PropertyTag::IndexData, IndexData::U16(vec![0, 1, 2]))
            .with(
                PropertyTag::VertexStreamData,
                vec![0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            ),
    );
    doc.push_block(
        ObjectBlock::new()
            .with(PropertyTag::Alpha, 0.3f32)
            .with(PropertyTag::BlendState, BlendState::alpha()),
    );
    doc
}

#[test]
fn test_hx_json_hx_round_trip() {
    let dir = tempdir().unwrap();
    let hx = dir.path().join("scene.hx");
    let json = dir.path().join("scene.json");
    let back = dir.path().join("back.hx");

    let doc = sample();
    write_document(&doc, &hx).unwrap();
    convert_hx_to_json(&hx, &json).unwrap();
    convert_json_to_hx(&json, &back).unwrap();

    assert_eq!(read_document(&back).unwrap(), doc);
    assert_eq!(std::fs::read(&back).unwrap(), std::fs::read(&hx).unwrap());
}

#[test]
fn test_convert_picks_direction_from_extension() {
    let dir = tempdir().unwrap();
    let hx = dir.path().join("scene.hx");
    let json = dir.path().join("scene.JSON");

    write_document(&sample(), &hx).unwrap();
    convert(&hx, &json).unwrap();
    let text = std::fs::read_to_string(&json).unwrap();
    assert!(text.contains("\"INDEX_DATA\""));

    assert!(matches!(
        convert(&hx, &dir.path().join("scene.txt")),
        Err(Error::UnsupportedConversion { .. })
    ));
}

#[test]
fn test_json_string_round_trip() {
    let doc = sample();
    let json = to_json(&doc, false).unwrap();
    assert_eq!(from_json(&json).unwrap(), doc);
}

#[test]
fn test_non_finite_floats_survive_conversion() {
    let dir = tempdir().unwrap();
    let hx = dir.path().join("camera.hx");
    let json = dir.path().join("camera.json");
    let back = dir.path().join("camera_back.hx");

    let mut doc = Document::new(1);
    doc.push_block(
        ObjectBlock::new()
            .with(PropertyTag::Fov, 1.2f32)
            .with(PropertyTag::ClipDistances, [0.1f32, f32::INFINITY]),
    );
    write_document(&doc, &hx).unwrap();
    convert_hx_to_json(&hx, &json).unwrap();
    assert!(std::fs::read_to_string(&json).unwrap().contains("\"inf\""));

    convert_json_to_hx(&json, &back).unwrap();
    assert_eq!(read_document(&back).unwrap(), doc);
    assert_eq!(std::fs::read(&back).unwrap(), std::fs::read(&hx).unwrap());
}

#[test]
fn test_invalid_source_leaves_no_output() {
    let dir = tempdir().unwrap();
    let hx = dir.path().join("broken.hx");
    let json = dir.path().join("broken.json");
    std::fs::write(&hx, [10, 0, 1, 0]).unwrap();

    let err = convert_hx_to_json(&hx, &json).unwrap_err();
    assert!(matches!(err, Error::TruncatedStream { .. }));
    assert!(!json.exists());
}
