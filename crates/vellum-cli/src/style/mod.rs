//! Terminal styling: semantic colors, message helpers, tables and spinners.

use std::sync::atomic::{AtomicBool, Ordering};

use vellum_config::ColorMode;

pub mod colors;
pub mod output;
pub mod spinner;
pub mod table;

pub use output::*;
pub use spinner::*;
pub use table::*;

/// Global flag to track if colors are disabled.
static NO_COLOR: AtomicBool = AtomicBool::new(false);

/// Sets the global no-color flag.
pub fn set_no_color(value: bool) {
    NO_COLOR.store(value, Ordering::SeqCst);
    console::set_colors_enabled(!value);
    console::set_colors_enabled_stderr(!value);
}

/// Checks if colors are disabled.
pub fn no_color() -> bool {
    NO_COLOR.load(Ordering::SeqCst)
}

/// Applies the configured color mode. `--no-color` always wins.
pub fn apply_color_mode(mode: ColorMode, force_off: bool) {
    let enabled = match mode {
        _ if force_off => false,
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            std::env::var_os("NO_COLOR").is_none()
                && console::Term::stdout().features().colors_supported()
        }
    };
    set_no_color(!enabled);
}
