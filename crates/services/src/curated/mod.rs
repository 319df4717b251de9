//! Curated community questions with a local cache.

mod data;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storage::repository::KeyValueStore;
use tracing::{info, warn};
use tutor_core::Clock;
use tutor_core::model::WebQuestion;

use crate::error::CuratedQuestionError;
use crate::progress_service::{read_json, write_json};

/// Storage key of the curated-question cache.
pub const QUESTION_CACHE_KEY: &str = "tutor.web_questions";

/// Where fresh curated questions come from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `CuratedQuestionError` when the source cannot produce a list.
    async fn fetch(&self, now: DateTime<Utc>) -> Result<Vec<WebQuestion>, CuratedQuestionError>;
}

/// The list shipped with the app. Performs no I/O and never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct CuratedSource;

#[async_trait]
impl QuestionSource for CuratedSource {
    async fn fetch(&self, now: DateTime<Utc>) -> Result<Vec<WebQuestion>, CuratedQuestionError> {
        Ok(data::curated_questions(now))
    }
}

/// Hands out curated questions and keeps the last fetched list on disk.
pub struct CuratedQuestionService {
    kv: Arc<dyn KeyValueStore>,
    source: Arc<dyn QuestionSource>,
    clock: Clock,
    cached: Vec<WebQuestion>,
}

impl CuratedQuestionService {
    /// Builds the service around `CuratedSource`, preloading the disk cache.
    pub async fn new(kv: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        let cached = Self::load_from_disk(kv.as_ref()).await;
        Self {
            kv,
            source: Arc::new(CuratedSource),
            clock,
            cached,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn QuestionSource>) -> Self {
        self.source = source;
        self
    }

    /// Pulls a fresh list from the source and overwrites the disk cache.
    ///
    /// # Errors
    ///
    /// Propagates the source's error; the cache is left as it was.
    pub async fn fetch_questions(&mut self) -> Result<Vec<WebQuestion>, CuratedQuestionError> {
        let questions = self.source.fetch(self.clock.now()).await?;
        write_json(self.kv.as_ref(), QUESTION_CACHE_KEY, &questions).await;
        info!(count = questions.len(), "fetched curated questions");
        self.cached.clone_from(&questions);
        Ok(questions)
    }

    /// Whatever was last fetched or preloaded by this instance.
    #[must_use]
    pub fn cached(&self) -> &[WebQuestion] {
        &self.cached
    }

    /// Reads the persisted cache without needing a service instance.
    /// Missing or unreadable caches come back empty.
    pub async fn load_from_disk(kv: &dyn KeyValueStore) -> Vec<WebQuestion> {
        read_json(kv, QUESTION_CACHE_KEY).await.unwrap_or_default()
    }

    /// Fetches, falling back to this instance's cache and then to disk.
    pub async fn questions_with_fallback(&mut self) -> Vec<WebQuestion> {
        match self.fetch_questions().await {
            Ok(questions) => questions,
            Err(err) => {
                warn!(error = %err, "curated fetch failed; using cached questions");
                if self.cached.is_empty() {
                    Self::load_from_disk(self.kv.as_ref()).await
                } else {
                    self.cached.clone()
                }
            }
        }
    }
}
