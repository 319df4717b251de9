#![forbid(unsafe_code)]

pub mod app_services;
pub mod content_service;
pub mod curated;
pub mod error;
pub mod events;
pub mod progress_service;
pub mod sessions;

pub use tutor_core::Clock;

pub use app_services::AppServices;
pub use content_service::ContentService;
pub use curated::{CuratedQuestionService, CuratedSource, QuestionSource};
pub use error::{AppServicesError, ContentError, CuratedQuestionError, LearningError};
pub use events::{EventBus, SessionEvent};
pub use progress_service::ProgressService;
pub use sessions::{CodeExampleSession, LearningSession, LoadState, QuizCompletion, QuizSession};
