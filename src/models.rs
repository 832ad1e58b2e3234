use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct UploadRecord {
    pub id: Uuid,
    pub course: String,
    pub semester: String,
    pub exam_type: String,
    pub uploader_name: String,
    pub uploader_email: String,
    pub file_name: String,
    pub file_url: String,
    pub file_size: i64,
    pub comments: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Upload metadata before the store assigns an id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUpload {
    pub course: String,
    pub semester: String,
    pub exam_type: ExamType,
    pub uploader_name: String,
    pub uploader_email: String,
    pub file_name: String,
    pub file_url: String,
    pub file_size: i64,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub email: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    Spring,
    Summer,
    Fall,
}

impl Term {
    pub fn as_str(&self) -> &'static str {
        match self {
            Term::Spring => "Spring",
            Term::Summer => "Summer",
            Term::Fall => "Fall",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemesterLabel {
    pub term: Term,
    pub year: i32,
}

impl fmt::Display for SemesterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.term.as_str(), self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExamType {
    Midterm,
    Final,
}

impl ExamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Midterm => "Midterm",
            ExamType::Final => "Final",
        }
    }
}

/// A dropdown value, or the free-text override entered under "Other".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Known(String),
    Custom(String),
}

impl Selection {
    /// Resolves raw input against a list of known options.
    pub fn from_input(input: &str, known: &[&str]) -> Self {
        let trimmed = input.trim();
        if known.contains(&trimmed) {
            Selection::Known(trimmed.to_string())
        } else {
            Selection::Custom(trimmed.to_string())
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Selection::Known(value) | Selection::Custom(value) => value,
        }
    }
}

pub type CourseSelection = Selection;
pub type SemesterSelection = Selection;

#[derive(Debug, Clone)]
pub struct CourseSummary {
    pub course: String,
    pub count: usize,
}

#[cfg(test)]
pub fn sample_upload(name: &str, email: &str, uploaded_at: DateTime<Utc>) -> UploadRecord {
    UploadRecord {
        id: Uuid::new_v4(),
        course: "MATH 1151".to_string(),
        semester: "Fall 2025".to_string(),
        exam_type: "Midterm".to_string(),
        uploader_name: name.to_string(),
        uploader_email: email.to_string(),
        file_name: "midterm1.pdf".to_string(),
        file_url: "https://example.com/midterm1.pdf".to_string(),
        file_size: 2048,
        comments: None,
        uploaded_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_resolves_known_and_custom() {
        let known = ["MATH 1151", "MATH 1152"];
        assert_eq!(
            Selection::from_input(" MATH 1151 ", &known),
            Selection::Known("MATH 1151".to_string())
        );
        let custom = Selection::from_input("BIO 110", &known);
        assert_eq!(custom, Selection::Custom("BIO 110".to_string()));
        assert_eq!(custom.value(), "BIO 110");
    }

    #[test]
    fn semester_label_renders_term_and_year() {
        let label = SemesterLabel {
            term: Term::Summer,
            year: 2024,
        };
        assert_eq!(label.to_string(), "Summer 2024");
    }
}
