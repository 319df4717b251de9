use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use storage::repository::KeyValueStore;
use tracing::{debug, warn};
use tutor_core::model::LearningProgress;

/// Storage key of the learner's progress record.
pub const PROGRESS_KEY: &str = "tutor.progress";

/// Loads and saves the single `LearningProgress` record.
///
/// Failures never reach the caller: a missing or unreadable record loads as
/// empty progress, and failed saves or resets are only logged.
#[derive(Clone)]
pub struct ProgressService {
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressService {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// The stored progress, or empty progress when there is none.
    pub async fn load(&self) -> LearningProgress {
        read_json(self.kv.as_ref(), PROGRESS_KEY)
            .await
            .unwrap_or_default()
    }

    /// Overwrite the stored record. Best effort.
    pub async fn save(&self, progress: &LearningProgress) {
        write_json(self.kv.as_ref(), PROGRESS_KEY, progress).await;
    }

    /// Delete the stored record so the next `load` starts empty.
    pub async fn reset(&self) {
        if let Err(err) = self.kv.remove(PROGRESS_KEY).await {
            warn!(key = PROGRESS_KEY, error = %err, "failed to reset progress");
        }
    }
}

/// Reads and decodes a JSON record. Missing, unreadable and undecodable
/// records all come back as `None`; the latter two are logged.
pub(crate) async fn read_json<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Option<T> {
    let bytes = match kv.get(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!(key, "no stored record");
            return None;
        }
        Err(err) => {
            warn!(key, error = %err, "failed to read stored record");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "discarding undecodable record");
            None
        }
    }
}

/// Encodes and stores a JSON record, logging instead of failing.
pub(crate) async fn write_json<T: Serialize + ?Sized>(
    kv: &dyn KeyValueStore,
    key: &str,
    value: &T,
) {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(key, error = %err, "failed to encode record; not saved");
            return;
        }
    };
    if let Err(err) = kv.set(key, &bytes).await {
        warn!(key, error = %err, "failed to save record");
    }
}
