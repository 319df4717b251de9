use std::path::PathBuf;
use std::sync::Arc;

use storage::bundle::{BundleResolver, DirectoryBundle};
use storage::repository::{KeyValueStore, Storage};

use crate::content_service::ContentService;
use crate::curated::CuratedQuestionService;
use crate::error::AppServicesError;
use crate::events::EventBus;
use crate::progress_service::ProgressService;
use crate::sessions::{CodeExampleSession, LearningSession, QuizSession};
use crate::Clock;

/// Assembles the app-facing services and hands out session models wired
/// to them.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    kv: Arc<dyn KeyValueStore>,
    content: Arc<ContentService>,
    progress: Arc<ProgressService>,
    events: EventBus,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and a content directory.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        content_dir: impl Into<PathBuf>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let bundle = Arc::new(DirectoryBundle::new(content_dir));
        Ok(Self::from_parts(storage, bundle, clock))
    }

    /// Build services from already constructed storage and content.
    #[must_use]
    pub fn from_parts(storage: Storage, bundle: Arc<dyn BundleResolver>, clock: Clock) -> Self {
        let content = Arc::new(ContentService::new(bundle));
        let progress = Arc::new(ProgressService::new(Arc::clone(&storage.kv)));
        Self {
            clock,
            kv: storage.kv,
            content,
            progress,
            events: EventBus::default(),
        }
    }

    /// Replace the content service, e.g. to restrict the topic list.
    #[must_use]
    pub fn with_content(mut self, content: ContentService) -> Self {
        self.content = Arc::new(content);
        self
    }

    #[must_use]
    pub fn content(&self) -> Arc<ContentService> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    /// Shared by every session this instance hands out.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub async fn curated_questions(&self) -> CuratedQuestionService {
        CuratedQuestionService::new(Arc::clone(&self.kv), self.clock).await
    }

    pub async fn learning_session(&self) -> LearningSession {
        LearningSession::start(
            self.content(),
            self.progress(),
            self.clock,
            self.events.clone(),
        )
        .await
    }

    #[must_use]
    pub fn quiz_session(&self) -> QuizSession {
        QuizSession::new(self.content(), self.events.clone())
    }

    #[must_use]
    pub fn code_example_session(&self) -> CodeExampleSession {
        CodeExampleSession::new(self.content(), self.events.clone())
    }
}
