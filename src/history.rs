//! Ordered views over session records.
//!
//! The record store hands back records newest-first, which is what the weekly
//! highlight wants. Trend detection needs the opposite. The two orders are kept as
//! distinct types so neither consumer can be fed the wrong one by accident.

use crate::models::SessionRecord;
use crate::outcome::{parse_result, ResultKind};

/// Records as the store supplies them: newest first.
#[derive(Debug, Clone, Copy)]
pub struct NewestFirst<'a> {
    records: &'a [SessionRecord],
}

impl<'a> NewestFirst<'a> {
    pub fn new(records: &'a [SessionRecord]) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &'a [SessionRecord] {
        self.records
    }

    pub fn for_student<'s>(
        &self,
        student: &'s str,
    ) -> impl Iterator<Item = &'a SessionRecord> + 's
    where
        'a: 's,
    {
        self.records
            .iter()
            .filter(move |record| record.student == student)
    }

    pub fn count_for(&self, student: &str) -> usize {
        self.for_student(student).count()
    }

    /// First record for the student in the given order, no re-sorting.
    pub fn latest_for(&self, student: &str) -> Option<&'a SessionRecord> {
        self.for_student(student).next()
    }

    pub fn chronological_for(&self, student: &str) -> Chronological<'a> {
        let mut records: Vec<&'a SessionRecord> = self.for_student(student).collect();
        records.reverse();
        Chronological { records }
    }
}

/// One student's records, oldest first.
#[derive(Debug, Clone)]
pub struct Chronological<'a> {
    records: Vec<&'a SessionRecord>,
}

impl Chronological<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn kinds(&self) -> Vec<ResultKind> {
        self.records
            .iter()
            .map(|record| parse_result(&record.result))
            .collect()
    }

    pub fn timed_values(&self) -> Vec<f64> {
        self.kinds()
            .into_iter()
            .filter_map(|kind| kind.seconds())
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.kinds().iter().filter(|kind| kind.is_success()).count()
    }
}

/// Stable sort into the store's newest-first convention.
pub fn sort_newest_first(mut records: Vec<SessionRecord>) -> Vec<SessionRecord> {
    records.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn record(student: &str, result: &str, minutes: i64) -> SessionRecord {
        SessionRecord {
            student: student.to_string(),
            activity: "Sprint".to_string(),
            result: result.to_string(),
            note: None,
            occurred_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[test]
    fn chronological_reverses_store_order() {
        let records = vec![
            record("ana", "18.0s", 20),
            record("ben", "Completed", 15),
            record("ana", "20.0s", 10),
        ];
        let history = NewestFirst::new(&records).chronological_for("ana");

        assert_eq!(history.len(), 2);
        assert_eq!(history.timed_values(), vec![20.0, 18.0]);
    }

    #[test]
    fn latest_trusts_given_order() {
        let records = vec![record("ana", "old", 0), record("ana", "new", 30)];
        let view = NewestFirst::new(&records);

        assert_eq!(view.latest_for("ana").map(|r| r.result.as_str()), Some("old"));
        assert_eq!(view.count_for("ana"), 2);
        assert!(view.latest_for("zoe").is_none());
    }

    #[test]
    fn success_count_skips_other_results() {
        let records = vec![
            record("ana", "Top 3", 2),
            record("ana", "Incomplete", 1),
            record("ana", "Completed", 0),
        ];
        let history = NewestFirst::new(&records).chronological_for("ana");

        assert_eq!(history.success_count(), 2);
        assert!(history.timed_values().is_empty());
    }

    #[test]
    fn sorts_newest_first_and_keeps_ties_stable() {
        let records = vec![
            record("ana", "a", 0),
            record("ana", "b", 10),
            record("ben", "c", 10),
        ];
        let sorted = sort_newest_first(records);
        let results: Vec<&str> = sorted.iter().map(|r| r.result.as_str()).collect();

        assert_eq!(results, vec!["b", "c", "a"]);
    }
}
