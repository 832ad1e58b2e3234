//! View state for the browse, leaderboard and upload screens.
//!
//! Each view is a plain value advanced by `update(self, event)`. Fetches are
//! tagged with a request number; a completion older than the last one applied
//! is dropped so a slow response cannot overwrite a newer snapshot.

use crate::error::ArchiveError;
use crate::leaderboard::{self, DEFAULT_TOP_N};
use crate::models::{LeaderboardEntry, UploadRecord};
use crate::search;
use crate::semester;

pub const DEFAULT_SEMESTER: &str = "Fall 2025";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestSeq {
    issued: u64,
    applied: u64,
}

impl RequestSeq {
    fn issue(self) -> Self {
        Self {
            issued: self.issued + 1,
            ..self
        }
    }

    fn accepts(&self, request: u64) -> bool {
        request > self.applied && request <= self.issued
    }

    fn apply(self, request: u64) -> Self {
        Self {
            applied: request,
            ..self
        }
    }

    /// Number of the most recently issued request.
    pub fn latest(&self) -> u64 {
        self.issued
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> bool {
        self.applied < self.issued
    }
}

#[derive(Debug)]
pub enum BrowseEvent {
    FetchStarted,
    FetchCompleted {
        request: u64,
        result: Result<Vec<UploadRecord>, ArchiveError>,
    },
    CourseQueryChanged(String),
    SemesterQueryChanged(String),
}

#[derive(Debug, Clone, Default)]
pub struct BrowseState {
    pub requests: RequestSeq,
    pub records: Vec<UploadRecord>,
    pub course_query: String,
    pub semester_query: String,
    pub visible: Vec<UploadRecord>,
    pub error: Option<String>,
}

impl BrowseState {
    pub fn update(self, event: BrowseEvent) -> Self {
        match event {
            BrowseEvent::FetchStarted => Self {
                requests: self.requests.issue(),
                ..self
            },
            BrowseEvent::FetchCompleted { request, result } => {
                if !self.requests.accepts(request) {
                    return self;
                }
                let requests = self.requests.apply(request);
                let (records, error) = match result {
                    Ok(records) => (records, None),
                    Err(err) => (Vec::new(), Some(err.to_string())),
                };
                Self {
                    requests,
                    records,
                    error,
                    ..self
                }
                .refilter()
            }
            BrowseEvent::CourseQueryChanged(course_query) => Self {
                course_query,
                ..self
            }
            .refilter(),
            BrowseEvent::SemesterQueryChanged(semester_query) => Self {
                semester_query,
                ..self
            }
            .refilter(),
        }
    }

    fn refilter(self) -> Self {
        let visible = search::filter(&self.records, &self.course_query, &self.semester_query);
        Self { visible, ..self }
    }
}

#[derive(Debug)]
pub enum LeaderboardEvent {
    FetchStarted,
    FetchCompleted {
        request: u64,
        result: Result<Vec<UploadRecord>, ArchiveError>,
    },
    SemesterSelected(String),
}

#[derive(Debug, Clone)]
pub struct LeaderboardState {
    pub requests: RequestSeq,
    pub records: Vec<UploadRecord>,
    pub semesters: Vec<String>,
    pub selected: String,
    pub top_n: usize,
    pub leaders: Vec<LeaderboardEntry>,
    pub error: Option<String>,
}

impl Default for LeaderboardState {
    fn default() -> Self {
        Self::new(DEFAULT_SEMESTER, DEFAULT_TOP_N)
    }
}

impl LeaderboardState {
    pub fn new(selected: &str, top_n: usize) -> Self {
        Self {
            requests: RequestSeq::default(),
            records: Vec::new(),
            semesters: vec![selected.to_string()],
            selected: selected.to_string(),
            top_n,
            leaders: Vec::new(),
            error: None,
        }
    }

    pub fn update(self, event: LeaderboardEvent) -> Self {
        match event {
            LeaderboardEvent::FetchStarted => Self {
                requests: self.requests.issue(),
                ..self
            },
            LeaderboardEvent::FetchCompleted { request, result } => {
                if !self.requests.accepts(request) {
                    return self;
                }
                let requests = self.requests.apply(request);
                match result {
                    Ok(records) => Self {
                        requests,
                        semesters: semester::available_semesters(&records),
                        records,
                        error: None,
                        ..self
                    }
                    .rerank(),
                    Err(err) => Self {
                        requests,
                        records: Vec::new(),
                        leaders: Vec::new(),
                        error: Some(err.to_string()),
                        ..self
                    },
                }
            }
            LeaderboardEvent::SemesterSelected(selected) => Self { selected, ..self }.rerank(),
        }
    }

    fn rerank(self) -> Self {
        let leaders = leaderboard::aggregate(&self.records, &self.selected, self.top_n);
        Self { leaders, ..self }
    }
}

#[derive(Debug)]
pub enum UploadEvent {
    Submitted,
    Completed {
        request: u64,
        result: Result<UploadRecord, ArchiveError>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct UploadState {
    pub requests: RequestSeq,
    pub last_upload: Option<UploadRecord>,
    pub error: Option<String>,
}

impl UploadState {
    pub fn update(self, event: UploadEvent) -> Self {
        match event {
            UploadEvent::Submitted => Self {
                requests: self.requests.issue(),
                error: None,
                ..self
            },
            UploadEvent::Completed { request, result } => {
                if !self.requests.accepts(request) {
                    return self;
                }
                let requests = self.requests.apply(request);
                match result {
                    Ok(record) => Self {
                        requests,
                        last_upload: Some(record),
                        error: None,
                    },
                    Err(err) => Self {
                        requests,
                        error: Some(err.to_string()),
                        ..self
                    },
                }
            }
        }
    }
}
