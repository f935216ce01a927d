//! CLI command for printing the tag table

use console::style;
use serde_json::json;

use crate::formats::{Category, TAG_TABLE};

/// # Errors
/// Returns an error if the category name is unknown.
pub fn execute(category: Option<&str>, as_json: bool) -> anyhow::Result<()> {
    let filter = match category {
        Some(name) => Some(
            Category::ALL
                .into_iter()
                .find(|c| c.name().eq_ignore_ascii_case(name))
                .ok_or_else(|| anyhow::anyhow!("Unknown category '{name}'"))?,
        ),
        None => None,
    };
    let entries = TAG_TABLE
        .iter()
        .filter(|info| filter.is_none_or(|c| info.category == c));

    if as_json {
        let rows: Vec<_> = entries
            .map(|info| {
                json!({
                    "tag": info.tag.value(),
                    "name": info.name,
                    "category": info.category.name(),
                    "shape": info.shape.to_string(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:>5}  {:<30} {:<12} {}",
        style("TAG").bold(),
        style("NAME").bold(),
        style("CATEGORY").bold(),
        style("SHAPE").bold()
    );
    for info in entries {
        println!(
            "{:>5}  {:<30} {:<12} {}",
            info.tag.value(),
            info.name,
            info.category.name(),
            info.shape
        );
    }
    Ok(())
}
