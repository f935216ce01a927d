//! CLI command for inspecting HX documents

use std::path::Path;

use console::style;

use crate::formats::{DecodeOptions, ObjectBlock, PropertyValue, decode_document_with};

/// One-line rendering of a value; arrays show their length only.
fn describe(value: &PropertyValue) -> String {
    match value {
        PropertyValue::String(s) => format!("{s:?}"),
        PropertyValue::Bool(b) => b.to_string(),
        PropertyValue::UInt(v) => v.to_string(),
        PropertyValue::Float(v) => v.to_string(),
        PropertyValue::Float2(v) => format!("{v:?}"),
        PropertyValue::Float3(v) => format!("{v:?}"),
        PropertyValue::Float4(v) => format!("{v:?}"),
        PropertyValue::Mode(v) => format!("mode {v}"),
        PropertyValue::IndexType(t) => format!("uint{}", t.bits()),
        PropertyValue::Indices(data) => format!("{} x uint{}", data.len(), data.index_type().bits()),
        PropertyValue::Floats(data) => format!("{} x float32", data.len()),
        PropertyValue::VertexAttribute(attr) => format!(
            "{} ({} components, stream {})",
            attr.name, attr.num_components, attr.stream_index
        ),
        PropertyValue::BlendState(state) => format!("{state:?}"),
    }
}

fn print_records(block: &ObjectBlock) {
    for record in &block.records {
        println!("    {:<28} {}", style(record.tag).cyan(), describe(&record.value));
    }
}

/// # Errors
/// Returns an error if the file cannot be read or decoded.
pub fn execute(file: &Path, records: bool, strict: bool) -> anyhow::Result<()> {
    let options = if strict {
        DecodeOptions::strict()
    } else {
        DecodeOptions::default()
    };
    let bytes = std::fs::read(file)?;
    let doc = decode_document_with(&bytes, &options)?;
    let summary = doc.summary();

    println!("{} ({} bytes)", style(file.display()).bold(), bytes.len());
    println!(
        "  version {}, generator {}, pad_arrays {}",
        summary.version.unwrap_or_default(),
        summary.generator.as_deref().unwrap_or("-"),
        summary.pad_arrays
    );
    if let Some(scene) = doc.default_scene_index() {
        println!("  default scene {scene}");
    }
    if let Some(mode) = doc.lighting_mode() {
        println!("  lighting {mode:?}");
    }
    if records {
        print_records(&doc.header);
    }

    println!("  {} blocks, {} records", summary.block_count, summary.record_count);
    for (category, count) in &summary.categories {
        println!("    {category:<10} {count}");
    }

    if records {
        for (index, block) in doc.blocks.iter().enumerate() {
            let category = block.category().map_or("?", |c| c.name());
            println!("  {} {}", style(format!("[{index}]")).dim(), style(category).bold());
            print_records(block);
        }
    }

    Ok(())
}
