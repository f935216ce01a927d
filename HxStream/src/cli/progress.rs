//! Step lines and progress bars for the CLI commands

use std::cell::Cell;
use std::time::Instant;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

pub static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "");
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
static SPARKLES: Emoji<'_, '_> = Emoji("✨ ", "");

/// Numbered step lines for a command with a fixed number of steps.
pub struct Steps {
    total: usize,
    current: Cell<usize>,
    started: Instant,
}

impl Steps {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            current: Cell::new(0),
            started: Instant::now(),
        }
    }

    /// Prints `[2/3] ⚙️  msg`.
    pub fn step(&self, emoji: Emoji<'_, '_>, msg: &str) {
        let current = self.current.get() + 1;
        self.current.set(current);
        println!(
            "{} {}{}",
            style(format!("[{current}/{}]", self.total)).bold().dim(),
            emoji,
            msg
        );
    }

    /// Prints the elapsed time since the steps were created.
    pub fn finish(&self) {
        println!("{SPARKLES}Done in {}", HumanDuration(self.started.elapsed()));
    }
}

/// Bar over a batch of files, with the file being decoded as its message.
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn file_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:32.green/white}] {pos}/{len} {wide_msg}")
            .expect("valid template"),
    );
    pb
}
