pub mod ao3;

use async_trait::async_trait;
use interfaces_ao3_works::{
    index::FetchWorkPageError,
    page::{parse_count, WorkPage},
};
use serde::Serialize;
use thiserror::Error;

pub use ao3::Ao3Source;

/// Engagement stats of one work, as shown on its page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkMetadata {
    pub title: String,
    pub chapters: u64,
    pub words: u64,
    pub kudos: u64,
    pub bookmarks: u64,
    pub hits: u64,
    pub comments: u64,
}

impl WorkMetadata {
    /// Title, chapters and words must be present; the engagement counters
    /// default to zero because the archive hides them until they are non-zero.
    pub fn from_page(page: WorkPage) -> Result<Self, FetchWorkError> {
        let title = page
            .title
            .ok_or(FetchWorkError::MissingField { field: "title" })?;

        Ok(Self {
            title,
            chapters: required_count("chapters", page.chapters)?,
            words: required_count("words", page.words)?,
            kudos: optional_count("kudos", page.kudos)?,
            bookmarks: optional_count("bookmarks", page.bookmarks)?,
            hits: optional_count("hits", page.hits)?,
            comments: optional_count("comments", page.comments)?,
        })
    }
}

fn required_count(field: &'static str, raw: Option<String>) -> Result<u64, FetchWorkError> {
    let raw = raw.ok_or(FetchWorkError::MissingField { field })?;
    count(field, raw)
}

fn optional_count(field: &'static str, raw: Option<String>) -> Result<u64, FetchWorkError> {
    raw.map_or(Ok(0), |raw| count(field, raw))
}

fn count(field: &'static str, raw: String) -> Result<u64, FetchWorkError> {
    parse_count(&raw).ok_or(FetchWorkError::InvalidNumber { field, value: raw })
}

/// Anything that can turn a work URL into its metadata.
#[async_trait]
pub trait WorkSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<WorkMetadata, FetchWorkError>;
}

#[derive(Debug, Error)]
pub enum FetchWorkError {
    #[error("InvalidUrl: no work id in {url:?}")]
    InvalidUrl { url: String },

    #[error("FetchWorkPage: {source}")]
    FetchWorkPage {
        #[from]
        source: FetchWorkPageError,
    },

    #[error("WorkNotFound: {work_id}")]
    NotFound { work_id: u64 },

    #[error("WorkRestricted: {work_id} requires a logged in user")]
    Restricted { work_id: u64 },

    #[error("RateLimited: archive refused work {work_id}")]
    RateLimited { work_id: u64 },

    #[error("UnexpectedStatus {status} for work {work_id}")]
    Status { work_id: u64, status: u16 },

    #[error("MissingField: {field}")]
    MissingField { field: &'static str },

    #[error("InvalidNumber: {field} = {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> WorkPage {
        WorkPage {
            title: Some("Title".to_string()),
            chapters: Some("10/?".to_string()),
            words: Some("50,000".to_string()),
            kudos: Some("500".to_string()),
            bookmarks: Some("50".to_string()),
            hits: Some("5,000".to_string()),
            comments: Some("20".to_string()),
        }
    }

    #[test]
    fn converts_displayed_counts() {
        let work = WorkMetadata::from_page(page()).unwrap();
        assert_eq!(
            work,
            WorkMetadata {
                title: "Title".to_string(),
                chapters: 10,
                words: 50_000,
                kudos: 500,
                bookmarks: 50,
                hits: 5_000,
                comments: 20,
            }
        );
    }

    #[test]
    fn hidden_engagement_counts_are_zero() {
        let work = WorkMetadata::from_page(WorkPage {
            kudos: None,
            bookmarks: None,
            hits: None,
            comments: None,
            ..page()
        })
        .unwrap();
        assert_eq!((work.kudos, work.bookmarks, work.hits, work.comments), (0, 0, 0, 0));
    }

    #[test]
    fn required_fields_must_be_present() {
        let err = WorkMetadata::from_page(WorkPage {
            words: None,
            ..page()
        })
        .unwrap_err();
        assert!(matches!(err, FetchWorkError::MissingField { field: "words" }));

        let err = WorkMetadata::from_page(WorkPage {
            title: None,
            ..page()
        })
        .unwrap_err();
        assert!(matches!(err, FetchWorkError::MissingField { field: "title" }));
    }

    #[test]
    fn garbage_counts_are_rejected() {
        let err = WorkMetadata::from_page(WorkPage {
            kudos: Some("many".to_string()),
            ..page()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            FetchWorkError::InvalidNumber { field: "kudos", ref value } if value == "many"
        ));
    }
}
