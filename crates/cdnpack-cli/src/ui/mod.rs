//! Terminal status lines for builds and rebuilds.
//!
//! Everything here writes to stderr. Colors are decided once by
//! [`init_colors`] and honor `--no-color`, `NO_COLOR` and `FORCE_COLOR`.
//!
//! # Examples
//!
//! ```no_run
//! use cdnpack_cli::ui;
//!
//! ui::init_colors(false);
//! ui::info("building...");
//! ui::success("built fake-cdn/fw.js");
//! ```

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_size, print_build_summary};
pub(crate) use format::display_path;
pub use messages::{error, info, success, warning};

static COLOR: AtomicBool = AtomicBool::new(false);

/// Check if color output should be enabled.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise colors follow whether
/// stderr is attended by a user.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Decide once whether status lines are colored.
pub fn init_colors(no_color: bool) {
    COLOR.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colored() -> bool {
    COLOR.load(Ordering::Relaxed)
}
