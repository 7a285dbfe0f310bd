use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub student: String,
    pub activity: String,
    pub result: String,
    #[serde(default)]
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl SessionRecord {
    /// The note as written, unless it is blank.
    pub fn note_text(&self) -> Option<&str> {
        self.note.as_deref().filter(|note| !note.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Improving,
    NeedsPractice,
    ConsistentPerformer,
    NotEnoughData,
}

impl TrendLabel {
    pub const ALL: [TrendLabel; 4] = [
        TrendLabel::Improving,
        TrendLabel::NeedsPractice,
        TrendLabel::ConsistentPerformer,
        TrendLabel::NotEnoughData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::Improving => "improving",
            TrendLabel::NeedsPractice => "needs_practice",
            TrendLabel::ConsistentPerformer => "consistent_performer",
            TrendLabel::NotEnoughData => "not_enough_data",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TrendLabel::Improving => "Improving",
            TrendLabel::NeedsPractice => "Needs practice",
            TrendLabel::ConsistentPerformer => "Consistent performer",
            TrendLabel::NotEnoughData => "Not enough data",
        }
    }
}

/// Which evidence channel produced a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    Timed,
    Qualitative,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub label: TrendLabel,
    pub reason: String,
    pub evidence: Evidence,
    /// Unrounded percentage decrease in time, only set for the timed channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub student: String,
    pub entries_count: usize,
    pub insight: Insight,
    pub highlight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub week_label: String,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: TrendLabel,
    pub count: usize,
}
