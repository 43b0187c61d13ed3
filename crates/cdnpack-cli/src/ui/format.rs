//! Formatting utilities for sizes, durations, and build summaries.

use cdnpack_bundler::BuildResult;
use console::Term;
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::Duration;

use super::colored;

/// Format file size in human-readable format.
///
/// # Examples
///
/// ```
/// use cdnpack_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

/// Format a duration as "50ms", "1.50s" or "2m 30s".
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cdnpack_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print one line per built bundle, then the total size.
///
/// Destinations are shown relative to `cwd` when they live under it.
pub fn print_build_summary(results: &[BuildResult], cwd: &Path) {
    let width = (Term::stderr().size().1 as usize).min(80);
    let rule = "─".repeat(width);

    eprintln!();
    eprintln!("{rule}");
    for result in results {
        let dest = display_path(&result.output, cwd);
        let size = format_size(result.bytes);
        let time = format!("({})", format_duration(result.duration));
        if colored() {
            eprintln!(
                "  {} {} {} {} {}",
                "▸".blue(),
                result.bundle.bright_white().bold(),
                dest,
                size.dimmed(),
                time.dimmed()
            );
        } else {
            eprintln!("  ▸ {} {} {} {}", result.bundle, dest, size, time);
        }
    }
    eprintln!("{rule}");

    let total: u64 = results.iter().map(|result| result.bytes).sum();
    eprintln!("  Total: {}", format_size(total));
}

pub(crate) fn display_path(path: &Path, cwd: &Path) -> String {
    path.strip_prefix(cwd)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1_048_576), "1.00 MB");
        assert_eq!(format_size(2_147_483_648), "2.00 GB");
    }

    #[test]
    fn test_format_duration_milliseconds() {
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
    }

    #[test]
    fn test_format_duration_seconds() {
        assert_eq!(format_duration(Duration::from_millis(1000)), "1.00s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(Duration::from_secs(60)), "1m 0s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_display_path_is_relative_under_cwd() {
        let cwd = Path::new("/site");
        assert_eq!(display_path(Path::new("/site/fake-cdn/fw.js"), cwd), "fake-cdn/fw.js");
        assert_eq!(display_path(Path::new("/elsewhere/fw.js"), cwd), "/elsewhere/fw.js");
    }

    #[test]
    fn test_print_build_summary() {
        print_build_summary(
            &[BuildResult {
                bundle: "fw".to_string(),
                output: PathBuf::from("/site/fake-cdn/fw.js"),
                sourcemap: None,
                modules: 2,
                bytes: 15_234,
                duration: Duration::from_millis(450),
            }],
            Path::new("/site"),
        );
        print_build_summary(&[], Path::new("/site"));
    }
}
