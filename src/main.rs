use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod db;
mod history;
mod insight;
mod models;
mod outcome;
mod report;
mod rollup;

use config::InsightConfig;
use history::NewestFirst;
use models::SessionRecord;

#[derive(Parser)]
#[command(name = "progress-insight")]
#[command(
    about = "Trend insights and weekly rollups for logged student sessions",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read sessions from a CSV file instead of Postgres
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(flatten)]
    thresholds: InsightConfig,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample sessions
    Seed,
    /// Import sessions from a CSV file into Postgres
    Import {
        #[arg(long)]
        file: PathBuf,
    },
    /// Show the trend insight for one student
    Insight {
        #[arg(long)]
        student: String,
        #[arg(long)]
        since_days: Option<i64>,
    },
    /// Build the weekly summary for a roster
    Summary {
        /// Comma-separated students; defaults to everyone with sessions
        #[arg(long, value_delimiter = ',')]
        roster: Vec<String>,
        #[arg(long)]
        week_label: Option<String>,
        /// Only use sessions from the last N days; all sessions when omitted
        #[arg(long)]
        since_days: Option<i64>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.log_format, cli.verbose);
    cli.thresholds
        .validate()
        .context("invalid insight thresholds")?;

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            let inserted = db::seed(&pool).await?;
            println!("Inserted {inserted} sample sessions.");
        }
        Commands::Import { file } => {
            let pool = connect().await?;
            let inserted = db::import_csv(&pool, &file).await?;
            println!("Inserted {inserted} sessions from {}.", file.display());
        }
        Commands::Insight {
            student,
            since_days,
        } => {
            let since = cutoff(since_days, Utc::now())?;
            let sessions = load_sessions(cli.csv.as_deref(), since, Some(student.as_str())).await?;
            let view = NewestFirst::new(&sessions);
            let insight = insight::classify(&student, &view, &cli.thresholds);
            println!("{}: {}", student, insight.label.title());
            println!("{}", insight.reason);
        }
        Commands::Summary {
            roster,
            week_label,
            since_days,
            format,
            out,
        } => {
            let since = cutoff(since_days, Utc::now())?;
            let sessions = load_sessions(cli.csv.as_deref(), since, None).await?;
            let view = NewestFirst::new(&sessions);
            let roster = if roster.is_empty() {
                rollup::roster_from_records(&view)
            } else {
                roster
            };
            let week_label = week_label
                .unwrap_or_else(|| rollup::default_week_label(Utc::now().date_naive()));
            let summary =
                rollup::build_weekly_summary(&view, &roster, &week_label, &cli.thresholds);

            let rendered = match format {
                OutputFormat::Markdown => report::build_report(&summary).into_bytes(),
                OutputFormat::Json => {
                    let mut json = serde_json::to_vec_pretty(&summary)?;
                    json.push(b'\n');
                    json
                }
                OutputFormat::Csv => {
                    let mut buffer = Vec::new();
                    report::write_summary_csv(&summary, &mut buffer)?;
                    buffer
                }
            };

            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Summary written to {}.", path.display());
                }
                None => print!("{}", String::from_utf8_lossy(&rendered)),
            }
        }
    }

    Ok(())
}

fn setup_tracing(format: LogFormat, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("progress_insight=debug,sqlx=warn")
    } else {
        EnvFilter::new("progress_insight=info,sqlx=warn")
    };

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance (or pass --csv)")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

/// Start of the `--since-days` window, or `None` for no window.
fn cutoff(since_days: Option<i64>, now: DateTime<Utc>) -> anyhow::Result<Option<DateTime<Utc>>> {
    let Some(days) = since_days else {
        return Ok(None);
    };
    let window = Duration::try_days(days.max(1)).context("since-days out of range")?;
    let since = now
        .checked_sub_signed(window)
        .context("since-days out of range")?;
    Ok(Some(since))
}

/// Sessions newest first, from the CSV file when given, otherwise Postgres.
async fn load_sessions(
    csv: Option<&Path>,
    since: Option<DateTime<Utc>>,
    student: Option<&str>,
) -> anyhow::Result<Vec<SessionRecord>> {
    let sessions = match csv {
        Some(path) => db::read_sessions_csv(path)?
            .into_iter()
            .filter(|record| since.map_or(true, |cutoff| record.occurred_at >= cutoff))
            .filter(|record| student.map_or(true, |name| record.student == name))
            .collect(),
        None => {
            let pool = connect().await?;
            db::fetch_sessions(&pool, since, student).await?
        }
    };

    tracing::info!(count = sessions.len(), "loaded sessions");
    Ok(sessions)
}
