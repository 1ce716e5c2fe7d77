//! Progress indication while a batch is checked.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(80);

fn checking_message(documents: usize) -> String {
    match documents {
        1 => "Checking 1 document...".to_string(),
        n => format!("Checking {n} documents..."),
    }
}

/// A spinner on stderr for a batch of `documents`, or `None` when progress
/// output is off. Nothing is drawn when stderr is not a terminal.
#[must_use]
pub fn checking(documents: usize, show: bool) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(checking_message(documents));
    pb.enable_steady_tick(TICK);
    Some(pb)
}
