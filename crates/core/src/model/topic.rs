use serde::{Deserialize, Serialize};

use crate::model::ids::{ExampleId, QuestionId, SectionId, TopicId};
use crate::model::progress::TopicProgress;

//
// ─── SECTIONS ──────────────────────────────────────────────────────────────────
//

/// One block of reading material inside a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSection {
    pub id: SectionId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub code_example_ids: Vec<ExampleId>,
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

/// A learning unit loaded from a bundled topic document.
///
/// `is_completed` and `progress` are an overlay taken from the learner's
/// `TopicProgress`. They are skipped when (de)serializing, so a topic
/// document never carries progress and a decoded topic starts at zero.
///
/// Optional-on-read defaults: `codeExampleIds` and `questionIds` are empty
/// when absent. `sections` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub description: String,
    pub sections: Vec<TopicSection>,
    #[serde(default)]
    pub code_example_ids: Vec<ExampleId>,
    #[serde(default)]
    pub question_ids: Vec<QuestionId>,
    #[serde(skip)]
    is_completed: bool,
    #[serde(skip)]
    progress: f64,
}

impl Topic {
    #[must_use]
    pub fn new(
        id: impl Into<TopicId>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            sections: Vec::new(),
            code_example_ids: Vec::new(),
            question_ids: Vec::new(),
            is_completed: false,
            progress: 0.0,
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Fraction of the topic completed, in [0, 1].
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Replaces the overlay with the given record, or with the defaults
    /// (not completed, zero progress) when there is none.
    pub fn apply_progress(&mut self, record: Option<&TopicProgress>) {
        match record {
            Some(record) => {
                self.is_completed = record.is_completed;
                self.progress = record.progress;
            }
            None => {
                self.is_completed = false;
                self.progress = 0.0;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set_overlay(&mut self, progress: f64, is_completed: bool) {
        self.progress = progress;
        self.is_completed = is_completed;
    }
}
