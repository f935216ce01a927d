//! CLI subcommands

use clap::Subcommand;
use std::path::PathBuf;

pub mod convert;
pub mod inspect;
pub mod tags;
pub mod validate;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the header and block structure of an HX document
    Inspect {
        /// HX file to inspect
        file: PathBuf,

        /// List every record, not just the per-block summary
        #[arg(short, long)]
        records: bool,

        /// Fail on extension tags instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// Convert between HX and JSON (direction taken from the file extensions)
    Convert {
        /// Source file
        #[arg(short, long)]
        source: PathBuf,

        /// Destination file
        #[arg(short, long)]
        destination: PathBuf,
    },

    /// Decode HX files and report which ones are invalid
    Validate {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Fail on extension tags instead of skipping them
        #[arg(long)]
        strict: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the property tag table
    Tags {
        /// Only show tags of this category (e.g. "mesh", "material")
        #[arg(short, long)]
        category: Option<String>,

        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Run the selected subcommand
    ///
    /// # Errors
    /// Returns the error of the subcommand.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Inspect {
                file,
                records,
                strict,
            } => inspect::execute(file, *records, *strict),
            Commands::Convert {
                source,
                destination,
            } => convert::execute(source, destination),
            Commands::Validate {
                paths,
                recursive,
                strict,
                quiet,
            } => validate::execute(paths, *recursive, *strict, !*quiet),
            Commands::Tags { category, json } => tags::execute(category.as_deref(), *json),
        }
    }
}
