//! Human readable rendering of suite results

use crate::stats::{RankedResult, TestStats};
use crate::suite::SuiteResult;
use std::io::{self, Write};

/// Write the report for every group of `result` to `out`
pub fn write_report<W: Write>(result: &SuiteResult, out: &mut W) -> io::Result<()> {
    let sections = result.results.iter();
    for (index, (group, ranked)) in sections.into_iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        if let Some(group) = group {
            writeln!(out, "Group: {group}")?;
        }
        write_ranked(ranked, out)?;
    }
    Ok(())
}

/// Render a report into a string
pub fn render(result: &SuiteResult) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_report(result, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn write_ranked<W: Write>(ranked: &RankedResult, out: &mut W) -> io::Result<()> {
    if let Some(winner) = &ranked.winner {
        writeln!(out, "Winner - {winner}")?;
        writeln!(out)?;
    }
    writeln!(out, "Results:")?;
    for stats in &ranked.results {
        writeln!(out, "{}", format_line(stats))?;
    }
    Ok(())
}

/// One result line: `name - count: N, ops/sec: X[, diff: Y%]`
pub fn format_line(stats: &TestStats) -> String {
    let mut line = format!(
        "{} - count: {}, ops/sec: {:.2}",
        stats.name, stats.count, stats.ops_sec
    );
    if let Some(diff) = stats.diff {
        line.push_str(&format!(", diff: {diff:.2}%"));
    }
    line
}
