//! Spinner helpers using indicatif.
//!
//! indicatif draws to stderr and hides itself when stderr is not a
//! terminal, so spinners never end up in piped output.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TICKS: &[&str] = &["◇ ", "◆ ", "◇ ", "◆ "];

fn spinner_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Creates a spinner with a message.
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let template = if super::no_color() {
        "{spinner} {msg}"
    } else {
        "{spinner:.cyan} {msg}"
    };
    pb.set_style(spinner_style(template).tick_strings(SPINNER_TICKS));
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn finish_and_clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}
