//! CLI interface for format conversion

use std::path::Path;

use crate::cli::progress::{GEAR, Steps};
use crate::converter;

/// # Errors
/// Returns an error if the extensions are not an HX/JSON pair or the
/// conversion fails.
pub fn execute(source: &Path, destination: &Path) -> anyhow::Result<()> {
    println!("Converting {} to {}", source.display(), destination.display());

    // read, serialize, write
    let steps = Steps::new(3);
    converter::convert_with_progress(source, destination, &|msg: &str| steps.step(GEAR, msg))?;

    steps.finish();
    Ok(())
}
