use std::sync::Arc;

use tracing::debug;
use tutor_core::model::{CodeExample, TopicId};

use crate::content_service::ContentService;
use crate::error::ContentError;
use crate::events::{EventBus, SessionEvent};

/// Browses a topic's code examples with a before/after toggle for
/// migration examples. The toggle starts on "before".
pub struct CodeExampleSession {
    content: Arc<ContentService>,
    events: EventBus,
    examples: Vec<CodeExample>,
    current: Option<CodeExample>,
    show_before: bool,
    error_message: Option<String>,
}

impl CodeExampleSession {
    #[must_use]
    pub fn new(content: Arc<ContentService>, events: EventBus) -> Self {
        Self {
            content,
            events,
            examples: Vec::new(),
            current: None,
            show_before: true,
            error_message: None,
        }
    }

    /// Replaces the example list with `topic_id`'s examples.
    ///
    /// # Errors
    ///
    /// Returns the content error when the example document is missing or
    /// malformed; the old list stays and `error_message` is set.
    pub async fn load_examples(&mut self, topic_id: &TopicId) -> Result<(), ContentError> {
        match self.content.load_code_examples(topic_id.as_str()).await {
            Ok(examples) => {
                debug!(topic = %topic_id, count = examples.len(), "examples loaded");
                self.events.publish(SessionEvent::ExamplesLoaded {
                    topic_id: topic_id.clone(),
                    count: examples.len(),
                });
                self.examples = examples;
                self.error_message = None;
                Ok(())
            }
            Err(err) => {
                self.error_message = Some(format!("Failed to load code examples: {err}"));
                Err(err)
            }
        }
    }

    pub fn select_example(&mut self, example: &CodeExample) {
        if example.is_migration_example {
            self.show_before = true;
        }
        self.current = Some(example.clone());
        self.events
            .publish(SessionEvent::ExampleSelected(example.id.clone()));
    }

    pub fn toggle_before_after(&mut self) {
        self.show_before = !self.show_before;
        self.events.publish(SessionEvent::BeforeAfterToggled {
            show_before: self.show_before,
        });
    }

    /// Code to show for `example` given the current toggle.
    #[must_use]
    pub fn display_code<'a>(&self, example: &'a CodeExample) -> &'a str {
        example.display_code(self.show_before)
    }

    #[must_use]
    pub fn current_code(&self) -> Option<&str> {
        self.current
            .as_ref()
            .map(|example| example.display_code(self.show_before))
    }

    #[must_use]
    pub fn current_example(&self) -> Option<&CodeExample> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn examples(&self) -> &[CodeExample] {
        &self.examples
    }

    #[must_use]
    pub fn show_before(&self) -> bool {
        self.show_before
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::bundle::InMemoryBundle;

    const EXAMPLES: &str = r#"[
        {"id":"plain","title":"t","description":"d","code":"let x = 1","relatedTopicId":"swift6Migration"},
        {"id":"mig","title":"t","description":"d","code":"primary","relatedTopicId":"swift6Migration","isMigrationExample":true,"beforeCode":"old"},
        {"id":"other","title":"t","description":"d","code":"c","relatedTopicId":"closures"}
    ]"#;

    async fn loaded() -> CodeExampleSession {
        let bundle = InMemoryBundle::new().with_file("Resources/codeExamples.json", EXAMPLES);
        let mut session = CodeExampleSession::new(
            Arc::new(ContentService::new(Arc::new(bundle))),
            EventBus::default(),
        );
        session.load_examples(&TopicId::new("swift6Migration")).await.unwrap();
        session
    }

    #[tokio::test]
    async fn loads_only_the_topic_examples() {
        let session = loaded().await;
        let ids: Vec<_> = session.examples().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["plain", "mig"]);
    }

    #[tokio::test]
    async fn migration_toggle_falls_back_to_primary_code() {
        let mut session = loaded().await;
        let migration = session.examples()[1].clone();
        session.select_example(&migration);
        assert_eq!(session.current_code(), Some("old"));

        session.toggle_before_after();
        assert!(!session.show_before());
        assert_eq!(session.display_code(&migration), "primary");
    }

    #[tokio::test]
    async fn selecting_a_migration_example_resets_the_toggle() {
        let mut session = loaded().await;
        let plain = session.examples()[0].clone();
        let migration = session.examples()[1].clone();

        session.select_example(&plain);
        session.toggle_before_after();
        assert_eq!(session.current_code(), Some("let x = 1"));
        session.select_example(&plain);
        assert!(!session.show_before());

        session.select_example(&migration);
        assert!(session.show_before());
    }

    #[tokio::test]
    async fn missing_document_sets_error_message() {
        let mut session = CodeExampleSession::new(
            Arc::new(ContentService::new(Arc::new(InMemoryBundle::new()))),
            EventBus::default(),
        );
        assert!(session.load_examples(&TopicId::new("x")).await.is_err());
        assert!(session.error_message().is_some());
    }
}
