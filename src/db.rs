use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ArchiveError, Result};
use crate::models::{ExamType, NewUpload, UploadRecord};
use crate::semester;
use crate::store::UploadStore;

const UPLOAD_COLUMNS: &str = "id, course, semester, exam_type, uploader_name, uploader_email, \
     file_name, file_url, file_size, comments, uploaded_at";

pub struct PgUploadStore {
    pool: PgPool,
}

impl PgUploadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UploadStore for PgUploadStore {
    async fn list_uploads(&self) -> Result<Vec<UploadRecord>> {
        let query = format!("SELECT {UPLOAD_COLUMNS} FROM uploads ORDER BY uploaded_at DESC");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ArchiveError::Fetch(e.to_string()))?;

        debug!(count = rows.len(), "fetched uploads");
        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn insert_upload(&self, upload: NewUpload) -> Result<UploadRecord> {
        let query = format!(
            r#"
            INSERT INTO uploads
            (id, course, semester, exam_type, uploader_name, uploader_email,
             file_name, file_url, file_size, comments)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {UPLOAD_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&upload.course)
            .bind(&upload.semester)
            .bind(upload.exam_type.as_str())
            .bind(&upload.uploader_name)
            .bind(&upload.uploader_email)
            .bind(&upload.file_name)
            .bind(&upload.file_url)
            .bind(upload.file_size)
            .bind(&upload.comments)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ArchiveError::Insert(e.to_string()))?;

        Ok(record_from_row(&row))
    }
}

fn record_from_row(row: &PgRow) -> UploadRecord {
    UploadRecord {
        id: row.get("id"),
        course: row.get("course"),
        semester: row.get("semester"),
        exam_type: row.get("exam_type"),
        uploader_name: row.get("uploader_name"),
        uploader_email: row.get("uploader_email"),
        file_name: row.get("file_name"),
        file_url: row.get("file_url"),
        file_size: row.get("file_size"),
        comments: row.get("comments"),
        uploaded_at: row.get("uploaded_at"),
    }
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn insert_dated(
    pool: &PgPool,
    source_key: &str,
    upload: &NewUpload,
    uploaded_at: DateTime<Utc>,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO uploads
        (id, course, semester, exam_type, uploader_name, uploader_email,
         file_name, file_url, file_size, comments, uploaded_at, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&upload.course)
    .bind(&upload.semester)
    .bind(upload.exam_type.as_str())
    .bind(&upload.uploader_name)
    .bind(&upload.uploader_email)
    .bind(&upload.file_name)
    .bind(&upload.file_url)
    .bind(upload.file_size)
    .bind(&upload.comments)
    .bind(uploaded_at)
    .bind(source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn seed_file_url(course: &str, semester: &str, file_name: &str) -> anyhow::Result<String> {
    let mut url = reqwest::Url::parse("https://example.com")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("seed url cannot hold a path"))?
        .pop_if_empty()
        .extend(["exam-files", course, semester, file_name]);
    Ok(url.to_string())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let uploads = vec![
        (
            "seed-001",
            "MATH 1151",
            "Fall 2025",
            ExamType::Midterm,
            "Avery Lee",
            "lee.4012@osu.edu",
            "math1151-midterm1.pdf",
            (2025, 10, 3),
        ),
        (
            "seed-002",
            "MATH 1152",
            "Fall 2025",
            ExamType::Final,
            "Avery Lee",
            "lee.4012@osu.edu",
            "math1152-final.pdf",
            (2025, 12, 12),
        ),
        (
            "seed-003",
            "PHYSICS 1248",
            "Fall 2025",
            ExamType::Midterm,
            "Jules Moreno",
            "moreno.88@osu.edu",
            "phys1248-mt2.png",
            (2025, 11, 7),
        ),
        (
            "seed-004",
            "PHYSICS 1249",
            "Spring 2025",
            ExamType::Final,
            "Kiara Patel",
            "patel.301@osu.edu",
            "phys1249-final.pdf",
            (2025, 4, 28),
        ),
        (
            "seed-005",
            "MATH 2153",
            "Summer 2025",
            ExamType::Midterm,
            "Kiara Patel",
            "patel.301@osu.edu",
            "math2153-midterm.jpg",
            (2025, 7, 14),
        ),
    ];

    for (source_key, course, semester, exam_type, name, email, file_name, (y, m, d)) in uploads {
        let uploaded_at = Utc
            .with_ymd_and_hms(y, m, d, 15, 0, 0)
            .single()
            .context("invalid date")?;
        let upload = NewUpload {
            course: course.to_string(),
            semester: semester.to_string(),
            exam_type,
            uploader_name: name.to_string(),
            uploader_email: email.to_string(),
            file_name: file_name.to_string(),
            file_url: seed_file_url(course, semester, file_name)?,
            file_size: 184_320,
            comments: None,
        };
        insert_dated(pool, source_key, &upload, uploaded_at).await?;
    }

    Ok(())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        course: String,
        semester: String,
        exam_type: String,
        uploader_name: String,
        uploader_email: String,
        file_name: String,
        file_url: String,
        file_size: i64,
        #[serde(default)]
        comments: Option<String>,
        #[serde(default)]
        uploaded_at: Option<String>,
        #[serde(default)]
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;

        let exam_type = match row.exam_type.trim() {
            "Midterm" => ExamType::Midterm,
            "Final" => ExamType::Final,
            other => {
                warn!(line = line + 2, exam_type = other, "skipping row with unknown exam type");
                continue;
            }
        };

        let uploaded_at = match row.uploaded_at.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(raw) => semester::parse_timestamp(raw)
                .with_context(|| format!("row {}: bad uploaded_at", line + 2))?,
            None => Utc::now(),
        };

        let upload = NewUpload {
            course: row.course,
            semester: row.semester,
            exam_type,
            uploader_name: row.uploader_name,
            uploader_email: row.uploader_email,
            file_name: row.file_name,
            file_url: row.file_url,
            file_size: row.file_size,
            comments: row.comments.filter(|c| !c.trim().is_empty()),
        };

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        if insert_dated(pool, &source_key, &upload, uploaded_at).await? {
            inserted += 1;
        }
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_file_url_encodes_segments() {
        let url = seed_file_url("MATH 1151", "Fall 2025", "math1151-midterm1.pdf").unwrap();
        assert_eq!(
            url,
            "https://example.com/exam-files/MATH%201151/Fall%202025/math1151-midterm1.pdf"
        );
        assert!(reqwest::Url::parse(&url).is_ok());
    }
}
