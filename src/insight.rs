use crate::config::InsightConfig;
use crate::history::{Chronological, NewestFirst};
use crate::models::{Evidence, Insight, TrendLabel};

const PRACTICE_TIP: &str = "Add extra calibration practice.";

/// Classifies one student's trend from the store's newest-first records.
pub fn classify(student: &str, records: &NewestFirst<'_>, config: &InsightConfig) -> Insight {
    let history = records.chronological_for(student);
    let insight = classify_chronological(&history, config);
    tracing::debug!(
        student,
        sessions = history.len(),
        label = insight.label.as_str(),
        "classified student trend"
    );
    insight
}

pub fn classify_chronological(history: &Chronological<'_>, config: &InsightConfig) -> Insight {
    if history.len() < config.min_sessions {
        return Insight {
            label: TrendLabel::NotEnoughData,
            reason: format!(
                "Log at least {} sessions to unlock a trend insight.",
                config.min_sessions
            ),
            evidence: Evidence::None,
            change_pct: None,
        };
    }

    let times = history.timed_values();
    if times.len() >= config.min_timed_values {
        if let (Some(&first), Some(&last)) = (times.first(), times.last()) {
            return timed_insight(first, last, config.trend_threshold_pct);
        }
    }

    qualitative_insight(history.success_count(), config.min_qualitative_successes)
}

/// Percentage decrease from `first` to `last`; positive means faster.
pub fn percent_change(first: f64, last: f64) -> f64 {
    (first - last) * 100.0 / first
}

fn timed_insight(first: f64, last: f64, threshold: f64) -> Insight {
    let change = percent_change(first, last);

    let (label, reason) = if change >= threshold {
        (
            TrendLabel::Improving,
            format!(
                "Time dropped from {first:.1}s to {last:.1}s, a {:.0}% reduction.",
                change.round()
            ),
        )
    } else if change <= -threshold {
        (
            TrendLabel::NeedsPractice,
            format!(
                "Time rose from {first:.1}s to {last:.1}s ({:.0}% slower). {PRACTICE_TIP}",
                change.abs().round()
            ),
        )
    } else {
        (
            TrendLabel::ConsistentPerformer,
            format!("Performance is stable across sessions ({first:.1}s to {last:.1}s)."),
        )
    };

    Insight {
        label,
        reason,
        evidence: Evidence::Timed,
        change_pct: Some(change),
    }
}

fn qualitative_insight(successes: usize, min_successes: usize) -> Insight {
    if successes >= min_successes {
        Insight {
            label: TrendLabel::ConsistentPerformer,
            reason: format!("{successes} recent sessions were completed or placed top."),
            evidence: Evidence::Qualitative,
            change_pct: None,
        }
    } else {
        Insight {
            label: TrendLabel::NeedsPractice,
            reason: "Log one more scored or timed session to strengthen the signal.".to_string(),
            evidence: Evidence::Qualitative,
            change_pct: None,
        }
    }
}
