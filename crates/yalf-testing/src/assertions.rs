//! Custom assertions over rendered reports.
//!
//! Reports are plain text, one line per entry; these helpers keep tests from
//! hand-rolling line scanning.

use anyhow::{Context, Result};

/// Lines of the report containing `needle`
pub fn lines_containing<'a>(report: &'a str, needle: &str) -> Vec<&'a str> {
    report.lines().filter(|l| l.contains(needle)).collect()
}

/// Assert that exactly `expected` lines contain `needle`.
pub fn assert_line_count(report: &str, needle: &str, expected: usize) -> Result<()> {
    let found = lines_containing(report, needle).len();
    if found != expected {
        anyhow::bail!(
            "Expected {} line(s) containing '{}', got {}\n--- report ---\n{}",
            expected,
            needle,
            found,
            report
        );
    }
    Ok(())
}

/// Assert that the needles appear on lines in the given order.
pub fn assert_line_order(report: &str, needles: &[&str]) -> Result<()> {
    let lines: Vec<&str> = report.lines().collect();
    let mut from = 0;

    for needle in needles {
        let pos = lines[from..]
            .iter()
            .position(|l| l.contains(needle))
            .with_context(|| {
                format!(
                    "'{}' not found after line {}\n--- report ---\n{}",
                    needle, from, report
                )
            })?;
        from += pos + 1;
    }

    Ok(())
}

/// Indent level of the first line containing `needle`, counted in `unit`s.
pub fn indent_level(report: &str, needle: &str, unit: &str) -> Result<usize> {
    let line = report
        .lines()
        .find(|l| l.contains(needle))
        .with_context(|| format!("No line containing '{}'", needle))?;

    let mut rest = line;
    let mut level = 0;
    while let Some(stripped) = rest.strip_prefix(unit) {
        rest = stripped;
        level += 1;
    }
    Ok(level)
}
