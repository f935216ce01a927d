//! CLI command for batch validation

use std::path::PathBuf;

use console::style;

use crate::cli::progress::{SEARCH, Steps, file_bar};
use crate::formats::DecodeOptions;
use crate::validate::{batch_validate, find_documents};

/// # Errors
/// Returns an error if no documents were found or any document is invalid.
pub fn execute(
    paths: &[PathBuf],
    recursive: bool,
    strict: bool,
    show_progress: bool,
) -> anyhow::Result<()> {
    let steps = Steps::new(2);
    let options = if strict {
        DecodeOptions::strict()
    } else {
        DecodeOptions::default()
    };

    steps.step(SEARCH, "Scanning for HX documents...");
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(find_documents(path, recursive));
        } else {
            files.push(path.clone());
        }
    }
    if files.is_empty() {
        anyhow::bail!("No .hx files found");
    }

    steps.step(SEARCH, &format!("Decoding {} files...", files.len()));
    let pb = show_progress.then(|| file_bar(files.len()));
    let result = batch_validate(&files, &options, |progress| {
        if let Some(pb) = &pb {
            pb.set_message(progress.path.clone());
            pb.inc(1);
        }
    });
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    for report in result.reports.iter().filter(|r| !r.is_valid()) {
        println!(
            "{} {}: {}",
            style("FAIL").red().bold(),
            report.path.display(),
            report.error.as_deref().unwrap_or_default()
        );
    }
    println!(
        "{} valid, {} invalid",
        style(result.success_count).green(),
        style(result.fail_count).red()
    );
    steps.finish();

    if result.fail_count > 0 {
        anyhow::bail!("{} of {} documents failed to decode", result.fail_count, files.len());
    }
    Ok(())
}
