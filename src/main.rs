use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod db;
mod error;
mod leaderboard;
mod models;
mod report;
mod search;
mod semester;
mod storage;
mod store;
mod upload;
mod views;

use crate::db::PgUploadStore;
use crate::models::{ExamType, Selection};
use crate::storage::BucketStorage;
use crate::store::UploadStore;
use crate::upload::{UploadForm, KNOWN_COURSES, KNOWN_SEMESTERS};
use crate::views::{
    BrowseEvent, BrowseState, LeaderboardEvent, LeaderboardState, UploadEvent, UploadState,
};

#[derive(Parser)]
#[command(name = "exam-archive")]
#[command(about = "Student-run archive of past midterms and finals", long_about = None)]
struct Cli {
    /// Postgres connection string for the hosted backend
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed uploads
    Seed,
    /// Import upload metadata from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// List available exams, optionally filtered
    Browse {
        /// Case-insensitive course substring, e.g. "cse"
        #[arg(long, default_value = "")]
        course: String,
        /// Case-insensitive semester substring, e.g. "fall 2025"
        #[arg(long, default_value = "")]
        semester: String,
    },
    /// List semesters that have uploads
    Semesters,
    /// Print the semester a timestamp falls in
    Classify {
        /// RFC 3339 timestamp or YYYY-MM-DD date
        timestamp: String,
    },
    /// Show top contributors for a semester
    Leaderboard {
        #[arg(long, default_value = views::DEFAULT_SEMESTER)]
        semester: String,
        #[arg(long, default_value_t = leaderboard::DEFAULT_TOP_N)]
        top: usize,
    },
    /// Contribute an exam file
    Upload {
        #[arg(long)]
        name: String,
        /// One of the listed courses, or any other course name
        #[arg(long)]
        course: String,
        /// One of the listed semesters, or any other semester name
        #[arg(long)]
        semester: String,
        #[arg(long, value_enum)]
        exam_type: ExamType,
        #[arg(long)]
        email: String,
        /// PDF, PNG or JPG scan of the exam
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        comments: Option<String>,
        #[arg(long, env = "STORAGE_URL")]
        storage_url: String,
        #[arg(long, env = "STORAGE_KEY", hide_env_values = true)]
        storage_key: String,
        #[arg(long, env = "STORAGE_BUCKET", default_value = storage::DEFAULT_BUCKET)]
        bucket: String,
    },
    /// Generate a markdown report for a semester
    Report {
        #[arg(long, default_value = views::DEFAULT_SEMESTER)]
        semester: String,
        #[arg(long, default_value_t = leaderboard::DEFAULT_TOP_N)]
        top: usize,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exam_archive=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Commands::Classify { timestamp } = &cli.command {
        println!("{}", semester::classify(timestamp)?);
        return Ok(());
    }

    let database_url = cli
        .database_url
        .context("DATABASE_URL must be set to the hosted Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;
    info!("connected to database");

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} uploads from {}.", csv.display());
        }
        Commands::Browse { course, semester } => {
            let store = PgUploadStore::new(pool);
            let state = BrowseState::default().update(BrowseEvent::FetchStarted);
            let request = state.requests.latest();
            let result = store.list_uploads().await;
            let state = state
                .update(BrowseEvent::FetchCompleted { request, result })
                .update(BrowseEvent::CourseQueryChanged(course))
                .update(BrowseEvent::SemesterQueryChanged(semester));

            if let Some(error) = state.error {
                anyhow::bail!(error);
            }

            if state.visible.is_empty() {
                println!("No exams found. Be the first to upload!");
                return Ok(());
            }

            println!("Available exams:");
            for exam in state.visible.iter() {
                println!("- {} | {} | {}", exam.course, exam.semester, exam.exam_type);
                if let Some(comments) = &exam.comments {
                    println!("  Additional information from uploader: {comments}");
                }
                println!("  {}", exam.file_url);
            }
        }
        Commands::Classify { .. } => {}
        Commands::Semesters => {
            let store = PgUploadStore::new(pool);
            let state = LeaderboardState::default().update(LeaderboardEvent::FetchStarted);
            let request = state.requests.latest();
            let result = store.list_uploads().await;
            let state = state.update(LeaderboardEvent::FetchCompleted { request, result });

            if let Some(error) = state.error {
                anyhow::bail!(error);
            }

            for semester in state.semesters.iter() {
                println!("{semester}");
            }
        }
        Commands::Leaderboard { semester, top } => {
            let store = PgUploadStore::new(pool);
            let state = LeaderboardState::new(&semester, top).update(LeaderboardEvent::FetchStarted);
            let request = state.requests.latest();
            let result = store.list_uploads().await;
            let state = state
                .update(LeaderboardEvent::FetchCompleted { request, result })
                .update(LeaderboardEvent::SemesterSelected(semester));

            if let Some(error) = state.error {
                anyhow::bail!(error);
            }

            if state.leaders.is_empty() {
                println!("No uploads for {} yet!", state.selected);
                return Ok(());
            }

            println!("Top contributors for {}:", state.selected);
            for (rank, leader) in state.leaders.iter().enumerate() {
                println!(
                    "{}. {} ({}) {} uploads",
                    rank + 1,
                    leader.name,
                    leader.email,
                    leader.count
                );
            }
        }
        Commands::Upload {
            name,
            course,
            semester,
            exam_type,
            email,
            file,
            comments,
            storage_url,
            storage_key,
            bucket,
        } => {
            let store = PgUploadStore::new(pool);
            let storage = BucketStorage::new(&storage_url, &bucket, &storage_key)?;

            let content = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let form = UploadForm {
                name,
                course: Selection::from_input(&course, KNOWN_COURSES),
                semester: Selection::from_input(&semester, KNOWN_SEMESTERS),
                exam_type,
                email,
                file_name,
                content,
                comments,
            };

            let state = UploadState::default().update(UploadEvent::Submitted);
            let request = state.requests.latest();
            let result = upload::submit(&store, &storage, form).await;
            let state = state.update(UploadEvent::Completed { request, result });

            if let Some(error) = state.error {
                anyhow::bail!(error);
            }
            if let Some(record) = state.last_upload {
                println!("Upload successful, thank you for contributing!");
                println!("{}", record.file_url);
            }
        }
        Commands::Report { semester, top, out } => {
            let store = PgUploadStore::new(pool);
            let records = store.list_uploads().await?;
            let report = report::build_report(&semester, top, &records);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
