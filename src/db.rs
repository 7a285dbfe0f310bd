use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::history;
use crate::models::SessionRecord;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn insert_session(
    pool: &PgPool,
    record: &SessionRecord,
    source_key: &str,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO progress_insight.sessions
        (id, student, activity, result, note, occurred_at, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&record.student)
    .bind(&record.activity)
    .bind(&record.result)
    .bind(record.note.as_deref())
    .bind(record.occurred_at)
    .bind(source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let sessions = vec![
        ("seed-001", "avery.lee", "Shuttle run", "41.0s", None, (2026, 3, 2)),
        (
            "seed-002",
            "avery.lee",
            "Shuttle run",
            "38.2s",
            Some("Cleaner turns"),
            (2026, 3, 4),
        ),
        ("seed-003", "avery.lee", "Shuttle run", "35.9s", None, (2026, 3, 6)),
        ("seed-004", "jules.moreno", "Ladder drill", "Completed", None, (2026, 3, 3)),
        (
            "seed-005",
            "jules.moreno",
            "Ladder drill",
            "Top 3",
            Some("Best placement yet"),
            (2026, 3, 5),
        ),
        ("seed-006", "kiara.patel", "Sensor calibration", "22.0s", None, (2026, 3, 2)),
        (
            "seed-007",
            "kiara.patel",
            "Sensor calibration",
            "25.4s",
            Some("Lost focus midway"),
            (2026, 3, 5),
        ),
        ("seed-008", "noor.haddad", "Sensor calibration", "Completed", None, (2026, 3, 4)),
    ];

    let mut inserted = 0usize;
    for (source_key, student, activity, result, note, (year, month, day)) in sessions {
        let record = SessionRecord {
            student: student.to_string(),
            activity: activity.to_string(),
            result: result.to_string(),
            note: note.map(str::to_string),
            occurred_at: seed_time(year, month, day)?,
        };
        if insert_session(pool, &record, source_key).await? {
            inserted += 1;
        }
    }

    Ok(inserted)
}

fn seed_time(year: i32, month: u32, day: u32) -> anyhow::Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 16, 0, 0)
        .single()
        .context("invalid seed date")
}

/// Sessions newest first, optionally limited to a window and a single student.
pub async fn fetch_sessions(
    pool: &PgPool,
    since: Option<DateTime<Utc>>,
    student: Option<&str>,
) -> anyhow::Result<Vec<SessionRecord>> {
    let rows = sqlx::query(
        "SELECT student, activity, result, note, occurred_at \
         FROM progress_insight.sessions \
         WHERE ($1::timestamptz IS NULL OR occurred_at >= $1) \
         AND ($2::text IS NULL OR student = $2) \
         ORDER BY occurred_at DESC, source_key DESC",
    )
    .bind(since)
    .bind(student)
    .fetch_all(pool)
    .await
    .context("failed to fetch sessions")?;

    let mut sessions = Vec::with_capacity(rows.len());
    for row in rows {
        sessions.push(SessionRecord {
            student: row.try_get("student")?,
            activity: row.try_get("activity")?,
            result: row.try_get("result")?,
            note: row.try_get("note")?,
            occurred_at: row.try_get("occurred_at")?,
        });
    }

    tracing::debug!(count = sessions.len(), "fetched sessions");
    Ok(sessions)
}

#[derive(serde::Deserialize)]
struct CsvRow {
    student: String,
    activity: String,
    result: String,
    #[serde(default)]
    note: Option<String>,
    occurred_at: DateTime<Utc>,
    #[serde(default)]
    source_key: Option<String>,
}

impl CsvRow {
    fn into_record(self) -> (SessionRecord, Option<String>) {
        let note = self.note.filter(|note| !note.trim().is_empty());
        (
            SessionRecord {
                student: self.student,
                activity: self.activity,
                result: self.result,
                note,
                occurred_at: self.occurred_at,
            },
            self.source_key.filter(|key| !key.trim().is_empty()),
        )
    }
}

fn read_csv_rows(csv_path: &Path) -> anyhow::Result<Vec<(SessionRecord, Option<String>)>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut rows = Vec::new();

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| {
            format!("invalid session on row {} of {}", line + 1, csv_path.display())
        })?;
        rows.push(row.into_record());
    }

    Ok(rows)
}

/// Offline record source; sorted into the store's newest-first order.
pub fn read_sessions_csv(csv_path: &Path) -> anyhow::Result<Vec<SessionRecord>> {
    let records = read_csv_rows(csv_path)?
        .into_iter()
        .map(|(record, _)| record)
        .collect();
    Ok(history::sort_newest_first(records))
}

pub async fn import_csv(pool: &PgPool, csv_path: &Path) -> anyhow::Result<usize> {
    let mut inserted = 0usize;

    for (record, source_key) in read_csv_rows(csv_path)? {
        let source_key = source_key.unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));
        if insert_session(pool, &record, &source_key).await? {
            inserted += 1;
        } else {
            tracing::debug!(%source_key, "session already imported");
        }
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::TempDir;

    #[test]
    fn reads_csv_newest_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.csv");
        fs::write(
            &path,
            "student,activity,result,note,occurred_at\n\
             ana,Sprint,20.0s,,2026-03-02T09:00:00Z\n\
             ana,Sprint,18.0s,felt quick,2026-03-04T09:00:00Z\n\
             ben,Drill,Completed,,2026-03-03T09:00:00Z\n",
        )
        .unwrap();

        let records = read_sessions_csv(&path).unwrap();
        let results: Vec<&str> = records.iter().map(|r| r.result.as_str()).collect();

        assert_eq!(results, vec!["18.0s", "Completed", "20.0s"]);
        assert_eq!(records[0].note.as_deref(), Some("felt quick"));
        assert_eq!(records[2].note, None);
    }

    #[test]
    fn keeps_source_keys_from_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.csv");
        fs::write(
            &path,
            "student,activity,result,note,occurred_at,source_key\n\
             ana,Sprint,20.0s,,2026-03-02T09:00:00Z,k-1\n\
             ana,Sprint,19.0s,,2026-03-03T09:00:00Z,\n",
        )
        .unwrap();

        let rows = read_csv_rows(&path).unwrap();
        assert_eq!(rows[0].1.as_deref(), Some("k-1"));
        assert_eq!(rows[1].1, None);
    }

    #[test]
    fn reports_bad_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.csv");
        fs::write(
            &path,
            "student,activity,result,note,occurred_at\nana,Sprint,20.0s,,yesterday\n",
        )
        .unwrap();

        let err = read_sessions_csv(&path).unwrap_err();
        assert!(format!("{err:#}").contains("row 1"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(read_sessions_csv(&dir.path().join("nope.csv")).is_err());
    }
}
