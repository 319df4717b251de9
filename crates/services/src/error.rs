//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use tutor_core::ProgressError;

/// Errors emitted by `ContentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("could not find resource file: {0}")]
    ResourceNotFound(String),
    #[error("failed to decode {resource}: {message}")]
    Decode { resource: String, message: String },
    #[error("failed to load any topics: {}", reasons.join("; "))]
    AllTopicsFailed { reasons: Vec<String> },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LearningSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LearningError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Errors emitted by a curated question source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CuratedQuestionError {
    #[error("curated questions unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
