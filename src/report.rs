use std::fmt::Write;

use serde::Serialize;

use crate::models::WeeklySummary;
use crate::rollup;

pub fn build_report(summary: &WeeklySummary) -> String {
    let label_counts = rollup::summarize_by_label(summary);
    let mut output = String::new();

    let _ = writeln!(output, "# Weekly Progress Summary");
    let _ = writeln!(output, "{} ({} students)", summary.week_label, summary.rows.len());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Trend Mix");

    if label_counts.is_empty() {
        let _ = writeln!(output, "No students on the roster.");
    } else {
        for entry in label_counts.iter() {
            let _ = writeln!(output, "- {}: {}", entry.label.title(), entry.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Students");

    if summary.rows.is_empty() {
        let _ = writeln!(output, "No students on the roster.");
    } else {
        for row in summary.rows.iter() {
            let _ = writeln!(
                output,
                "- {} ({} sessions): {}. {}",
                row.student,
                row.entries_count,
                row.insight.label.title(),
                row.insight.reason
            );
            let _ = writeln!(output, "  {}", row.highlight);
        }
    }

    output
}

#[derive(Serialize)]
struct CsvRow<'a> {
    student: &'a str,
    entries_count: usize,
    label: &'static str,
    change_pct: Option<f64>,
    reason: &'a str,
    highlight: &'a str,
}

pub fn write_summary_csv<W: std::io::Write>(
    summary: &WeeklySummary,
    writer: W,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in summary.rows.iter() {
        writer.serialize(CsvRow {
            student: &row.student,
            entries_count: row.entries_count,
            label: row.insight.label.as_str(),
            change_pct: row.insight.change_pct,
            reason: &row.insight.reason,
            highlight: &row.highlight,
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Evidence, Insight, SummaryRow, TrendLabel};

    fn row(student: &str, label: TrendLabel, change_pct: Option<f64>) -> SummaryRow {
        SummaryRow {
            student: student.to_string(),
            entries_count: 3,
            insight: Insight {
                label,
                reason: "Reason here.".to_string(),
                evidence: Evidence::Timed,
                change_pct,
            },
            highlight: "Latest: Sprint — 18.0s".to_string(),
        }
    }

    fn sample_summary() -> WeeklySummary {
        WeeklySummary {
            week_label: "Week of 2026-03-02".to_string(),
            rows: vec![
                row("ana", TrendLabel::Improving, Some(12.5)),
                row("ben", TrendLabel::NeedsPractice, None),
            ],
        }
    }

    #[test]
    fn markdown_lists_mix_and_students() {
        let report = build_report(&sample_summary());

        assert!(report.starts_with("# Weekly Progress Summary\n"));
        assert!(report.contains("Week of 2026-03-02 (2 students)\n"));
        assert!(report.contains("- Improving: 1\n"));
        assert!(report.contains("- Needs practice: 1\n"));
        assert!(report.contains("- ana (3 sessions): Improving. Reason here.\n"));
        assert!(report.contains("\n  Latest: Sprint — 18.0s\n"));
    }

    #[test]
    fn markdown_handles_empty_roster() {
        let report = build_report(&WeeklySummary {
            week_label: "w".to_string(),
            rows: Vec::new(),
        });
        assert_eq!(report.matches("No students on the roster.").count(), 2);
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let mut buffer = Vec::new();
        write_summary_csv(&sample_summary(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "student,entries_count,label,change_pct,reason,highlight");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("ana,3,improving,12.5,"));
        assert!(lines[2].starts_with("ben,3,needs_practice,,"));
    }
}
