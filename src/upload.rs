use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::{ArchiveError, Result};
use crate::models::{CourseSelection, ExamType, NewUpload, SemesterSelection, UploadRecord};
use crate::store::{FileStorage, UploadStore};

pub const KNOWN_COURSES: &[&str] = &[
    "PHYSICS 1248",
    "PHYSICS 1249",
    "MATH 1151",
    "MATH 1152",
    "MATH 2153",
];

pub const KNOWN_SEMESTERS: &[&str] = &[
    "Fall 2025",
    "Spring 2025",
    "Summer 2025",
    "Fall 2024",
    "Spring 2024",
    "Summer 2024",
];

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg"];

#[derive(Debug, Clone)]
pub struct UploadForm {
    pub name: String,
    pub course: CourseSelection,
    pub semester: SemesterSelection,
    pub exam_type: ExamType,
    pub email: String,
    pub file_name: String,
    pub content: Vec<u8>,
    pub comments: Option<String>,
}

impl UploadForm {
    /// Checks required fields and returns the lowercased file extension.
    pub fn validate(&self) -> Result<String> {
        let required = [
            ("name", self.name.as_str()),
            ("course", self.course.value()),
            ("semester", self.semester.value()),
            ("email", self.email.as_str()),
            ("file", self.file_name.as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ArchiveError::InvalidUpload(format!("{field} is required")));
            }
        }

        if !self.email.contains('@') {
            return Err(ArchiveError::InvalidUpload(format!(
                "{} is not an email address",
                self.email
            )));
        }

        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ArchiveError::InvalidUpload(format!(
                "{} must be one of: {}",
                self.file_name,
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        Ok(extension)
    }
}

/// `{course}/{semester}/{millis}-{suffix}.{ext}`
pub fn storage_path(course: &str, semester: &str, extension: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(7).collect();
    format!(
        "{}/{}/{}-{}.{}",
        course.trim(),
        semester.trim(),
        Utc::now().timestamp_millis(),
        suffix,
        extension
    )
}

/// Stores the file, then records its metadata. Nothing is rolled back or retried.
pub async fn submit<S, F>(store: &S, storage: &F, form: UploadForm) -> Result<UploadRecord>
where
    S: UploadStore + ?Sized,
    F: FileStorage + ?Sized,
{
    let extension = form.validate()?;
    let course = form.course.value().trim().to_string();
    let semester = form.semester.value().trim().to_string();

    let path = storage_path(&course, &semester, &extension);
    let file_size = form.content.len() as i64;
    let handle = storage.store_file(&path, form.content).await?;
    let file_url = storage.public_url(&handle);

    let record = store
        .insert_upload(NewUpload {
            course,
            semester,
            exam_type: form.exam_type,
            uploader_name: form.name.trim().to_string(),
            uploader_email: form.email.trim().to_string(),
            file_name: form.file_name,
            file_url,
            file_size,
            comments: form.comments.filter(|c| !c.trim().is_empty()),
        })
        .await?;

    info!(id = %record.id, course = %record.course, "upload recorded");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Selection;
    use crate::store::memory::{MemoryStorage, MemoryStore};

    fn form() -> UploadForm {
        UploadForm {
            name: "Brutus Buckeye".to_string(),
            course: Selection::from_input("MATH 1151", KNOWN_COURSES),
            semester: Selection::from_input("Fall 2025", KNOWN_SEMESTERS),
            exam_type: ExamType::Midterm,
            email: "buckeye.1@osu.edu".to_string(),
            file_name: "Midterm1.PDF".to_string(),
            content: vec![7u8; 32],
            comments: Some("  ".to_string()),
        }
    }

    #[test]
    fn validate_returns_lowercased_extension() {
        assert_eq!(form().validate().unwrap(), "pdf");
    }

    #[test]
    fn validate_rejects_bad_input() {
        let mut bad_type = form();
        bad_type.file_name = "notes.docx".to_string();
        assert!(matches!(
            bad_type.validate(),
            Err(ArchiveError::InvalidUpload(_))
        ));

        let mut blank_course = form();
        blank_course.course = Selection::Custom("   ".to_string());
        assert!(blank_course.validate().is_err());

        let mut bad_email = form();
        bad_email.email = "buckeye".to_string();
        assert!(bad_email.validate().is_err());

        let mut no_extension = form();
        no_extension.file_name = "scan".to_string();
        assert!(no_extension.validate().is_err());
    }

    #[test]
    fn storage_path_has_expected_shape() {
        let path = storage_path("BIO 110", "Fall 2025", "png");
        let parts: Vec<&str> = path.split('/').collect();
        assert_eq!(parts[0], "BIO 110");
        assert_eq!(parts[1], "Fall 2025");

        let (stem, ext) = parts[2].rsplit_once('.').unwrap();
        assert_eq!(ext, "png");
        let (millis, suffix) = stem.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 7);
    }

    #[tokio::test]
    async fn submit_stores_file_then_inserts_metadata() {
        let store = MemoryStore::default();
        let storage = MemoryStorage::default();

        let mut custom = form();
        custom.course = Selection::from_input("BIO 110", KNOWN_COURSES);
        let record = submit(&store, &storage, custom).await.unwrap();

        assert_eq!(record.course, "BIO 110");
        assert_eq!(record.exam_type, "Midterm");
        assert_eq!(record.file_name, "Midterm1.PDF");
        assert_eq!(record.file_size, 32);
        assert_eq!(record.comments, None);

        let files = storage.files.lock().unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].0.starts_with("BIO 110/Fall 2025/"));
        assert_eq!(record.file_url, format!("memory://exam-files/{}", files[0].0));
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn storage_failure_skips_insert() {
        let store = MemoryStore::default();
        let storage = MemoryStorage {
            fail_with: Some("bucket not found".to_string()),
            ..Default::default()
        };

        let err = submit(&store, &storage, form()).await.unwrap_err();
        assert!(matches!(err, ArchiveError::Storage(_)));
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_failure_is_reported() {
        let store = MemoryStore {
            fail_with: Some("permission denied".to_string()),
            ..Default::default()
        };
        let storage = MemoryStorage::default();

        let err = submit(&store, &storage, form()).await.unwrap_err();
        assert_eq!(err.to_string(), "Could not save the upload: permission denied");
    }
}
