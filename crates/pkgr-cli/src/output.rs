//! Minimal terminal output helpers: colored status lines and a duration
//! formatter, degrading gracefully when stdout isn't a TTY or `NO_COLOR`
//! is set.

use console::style;
use std::time::Duration;

pub fn header(text: &str) {
    println!("{} {text}", style("pkgr").cyan().bold());
}

pub fn success(text: &str) {
    println!("{} {text}", style("✓").green().bold());
}

pub fn warning(text: &str) {
    eprintln!("{} {text}", style("!").yellow().bold());
}

pub fn error(text: &str) {
    eprintln!("{} {text}", style("✗").red().bold());
}

pub fn info(text: &str) {
    println!("{} {text}", style("i").blue().bold());
}

/// Print one planned package line: `  name  1.2.3  (source, cran)`.
pub fn package_line(name: &str, version: &str, source_type: &str, repo: &str) {
    println!("  {} {} ({source_type}, {repo})", style(name).green(), style(version).yellow());
}

#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.2}s")
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sub_second_durations_as_millis() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
    }

    #[test]
    fn formats_multi_second_durations() {
        assert_eq!(format_duration(Duration::from_secs(5)), "5.00s");
    }

    #[test]
    fn formats_multi_minute_durations() {
        assert_eq!(format_duration(Duration::from_secs(125)), "2.1m");
    }
}
