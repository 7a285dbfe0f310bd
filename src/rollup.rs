use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};

use crate::config::InsightConfig;
use crate::history::NewestFirst;
use crate::insight;
use crate::models::{LabelCount, SessionRecord, SummaryRow, TrendLabel, WeeklySummary};

pub const NO_SESSIONS_HIGHLIGHT: &str = "No sessions logged yet.";

/// One row per roster entry, in roster order. Duplicates are kept.
pub fn build_weekly_summary(
    records: &NewestFirst<'_>,
    roster: &[String],
    week_label: &str,
    config: &InsightConfig,
) -> WeeklySummary {
    let rows: Vec<SummaryRow> = roster
        .iter()
        .map(|student| SummaryRow {
            student: student.clone(),
            entries_count: records.count_for(student),
            insight: insight::classify(student, records, config),
            highlight: records
                .latest_for(student)
                .map(highlight)
                .unwrap_or_else(|| NO_SESSIONS_HIGHLIGHT.to_string()),
        })
        .collect();

    tracing::info!(
        week = week_label,
        students = rows.len(),
        records = records.records().len(),
        "built weekly summary"
    );

    WeeklySummary {
        week_label: week_label.to_string(),
        rows,
    }
}

pub fn highlight(record: &SessionRecord) -> String {
    match record.note_text() {
        Some(note) => format!("Latest: {} — {} (“{}”)", record.activity, record.result, note),
        None => format!("Latest: {} — {}", record.activity, record.result),
    }
}

pub fn summarize_by_label(summary: &WeeklySummary) -> Vec<LabelCount> {
    let mut counts: Vec<LabelCount> = TrendLabel::ALL
        .iter()
        .map(|&label| LabelCount {
            label,
            count: summary
                .rows
                .iter()
                .filter(|row| row.insight.label == label)
                .count(),
        })
        .filter(|entry| entry.count > 0)
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.label.cmp(&b.label)));
    counts
}

/// Students in order of first appearance, used when no roster is supplied.
pub fn roster_from_records(records: &NewestFirst<'_>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut roster = Vec::new();
    for record in records.records() {
        if seen.insert(record.student.as_str()) {
            roster.push(record.student.clone());
        }
    }
    roster
}

pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
}

pub fn default_week_label(today: NaiveDate) -> String {
    format!("Week of {}", week_start(today))
}
