use std::sync::Arc;

use serde::de::DeserializeOwned;
use storage::bundle::BundleResolver;
use tracing::{debug, info, warn};
use tutor_core::model::{CodeExample, Question, Topic};

use crate::error::ContentError;

/// Topic documents shipped with the app, in display order.
pub const DEFAULT_TOPIC_FILES: [&str; 15] = [
    "swiftBasics",
    "accessSpecifiers",
    "dynamicLibrary",
    "staticLibrary",
    "closures",
    "memoryManagement",
    "dispatchQueue",
    "threading",
    "serialConcurrentSyncAsync",
    "avkit",
    "observableObservableObject",
    "asyncAwait",
    "swift6Migration",
    "commonMistakes",
    "concurrency",
];

const TOPIC_DIRS: &[&str] = &["Resources/Topics", "Topics", "Resources"];
const QUESTION_DIRS: &[&str] = &["Resources/Questions", "Questions", "Resources"];
const EXAMPLE_DIRS: &[&str] = &["Resources"];

const QUESTIONS_DOCUMENT: &str = "quizQuestions";
const EXAMPLES_DOCUMENT: &str = "codeExamples";

/// Read-only access to bundled topics, questions and code examples.
///
/// Nothing is cached: every call goes back to the bundle.
#[derive(Clone)]
pub struct ContentService {
    bundle: Arc<dyn BundleResolver>,
    topic_files: Vec<String>,
}

impl ContentService {
    #[must_use]
    pub fn new(bundle: Arc<dyn BundleResolver>) -> Self {
        Self {
            bundle,
            topic_files: DEFAULT_TOPIC_FILES.iter().map(|name| (*name).to_owned()).collect(),
        }
    }

    /// Replace the list of topic documents to load.
    #[must_use]
    pub fn with_topic_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topic_files = files.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn topic_files(&self) -> &[String] {
        &self.topic_files
    }

    /// Load every configured topic, skipping the ones that fail.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::AllTopicsFailed` with one reason per document
    /// when not a single topic could be loaded.
    pub async fn load_topics(&self) -> Result<Vec<Topic>, ContentError> {
        let mut outcomes = Vec::with_capacity(self.topic_files.len());
        for name in &self.topic_files {
            let outcome = self
                .load_topic(name)
                .await
                .map_err(|err| format!("{name}.json: {err}"));
            outcomes.push(outcome);
        }

        let (topics, reasons) = partition_outcomes(outcomes);
        for reason in &reasons {
            warn!(%reason, "skipping topic");
        }

        if topics.is_empty() && !reasons.is_empty() {
            return Err(ContentError::AllTopicsFailed { reasons });
        }

        info!(loaded = topics.len(), skipped = reasons.len(), "loaded topics");
        Ok(topics)
    }

    /// Load a single topic document by name (without the `.json` suffix).
    ///
    /// # Errors
    ///
    /// Returns `ContentError::ResourceNotFound` or `ContentError::Decode`.
    pub async fn load_topic(&self, name: &str) -> Result<Topic, ContentError> {
        let bytes = self.read_document(name, TOPIC_DIRS).await?;
        decode(name, &bytes)
    }

    /// Questions belonging to `topic_id`, in document order.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::ResourceNotFound` when the question document is
    /// missing, or `ContentError::Decode` when it is malformed.
    pub async fn load_questions(&self, topic_id: &str) -> Result<Vec<Question>, ContentError> {
        let questions = self.all_questions().await?;
        Ok(questions
            .into_iter()
            .filter(|q| q.topic_id.as_str() == topic_id)
            .collect())
    }

    /// Code examples belonging to `topic_id`, in document order.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::ResourceNotFound` when the example document is
    /// missing, or `ContentError::Decode` when it is malformed.
    pub async fn load_code_examples(
        &self,
        topic_id: &str,
    ) -> Result<Vec<CodeExample>, ContentError> {
        let examples = self.all_code_examples().await?;
        Ok(examples
            .into_iter()
            .filter(|ex| ex.related_topic_id.as_str() == topic_id)
            .collect())
    }

    /// Every question in the shared question document.
    ///
    /// # Errors
    ///
    /// See [`ContentService::load_questions`].
    pub async fn all_questions(&self) -> Result<Vec<Question>, ContentError> {
        let bytes = self.read_document(QUESTIONS_DOCUMENT, QUESTION_DIRS).await?;
        decode(QUESTIONS_DOCUMENT, &bytes)
    }

    /// Every example in the shared example document.
    ///
    /// # Errors
    ///
    /// See [`ContentService::load_code_examples`].
    pub async fn all_code_examples(&self) -> Result<Vec<CodeExample>, ContentError> {
        let bytes = self.read_document(EXAMPLES_DOCUMENT, EXAMPLE_DIRS).await?;
        decode(EXAMPLES_DOCUMENT, &bytes)
    }

    async fn read_document(&self, name: &str, dirs: &[&str]) -> Result<Vec<u8>, ContentError> {
        if let Some(bytes) = self.bundle.read_json(name, dirs).await? {
            debug!(document = name, "resolved bundled document");
            return Ok(bytes);
        }

        let available = self.bundle.list_json_files().await.unwrap_or_default();
        debug!(document = name, ?available, "bundled document not found");
        if available.is_empty() {
            Err(ContentError::ResourceNotFound(format!("{name}.json")))
        } else {
            Err(ContentError::ResourceNotFound(format!(
                "{name}.json (available: {})",
                available.join(", ")
            )))
        }
    }
}

fn decode<T: DeserializeOwned>(name: &str, bytes: &[u8]) -> Result<T, ContentError> {
    serde_json::from_slice(bytes).map_err(|err| ContentError::Decode {
        resource: format!("{name}.json"),
        message: err.to_string(),
    })
}

/// Splits per-document outcomes into loaded values and failure reasons,
/// preserving order in both.
fn partition_outcomes<T>(outcomes: Vec<Result<T, String>>) -> (Vec<T>, Vec<String>) {
    outcomes
        .into_iter()
        .fold((Vec::new(), Vec::new()), |(mut ok, mut failed), outcome| {
            match outcome {
                Ok(value) => ok.push(value),
                Err(reason) => failed.push(reason),
            }
            (ok, failed)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::bundle::InMemoryBundle;

    fn topic_json(id: &str) -> String {
        format!(
            r#"{{"id":"{id}","title":"{id}","description":"about {id}","sections":[]}}"#
        )
    }

    const QUESTIONS: &str = r#"[
        {"id":"q1","topicId":"closures","type":"trueFalse","question":"?","correctAnswer":"True","explanation":""},
        {"id":"q2","topicId":"threading","type":"trueFalse","question":"?","correctAnswer":"False","explanation":""},
        {"id":"q3","topicId":"closures","type":"multipleChoice","question":"?","options":["a","b"],"correctAnswer":"a","explanation":""}
    ]"#;

    const EXAMPLES: &str = r#"[
        {"id":"e1","title":"t","description":"d","code":"c","relatedTopicId":"closures"},
        {"id":"e2","title":"t","description":"d","code":"c","relatedTopicId":"swift6Migration","isMigrationExample":true,"beforeCode":"old","afterCode":"new"}
    ]"#;

    fn service(bundle: InMemoryBundle, topics: &[&str]) -> ContentService {
        ContentService::new(Arc::new(bundle)).with_topic_files(topics.iter().copied())
    }

    #[tokio::test]
    async fn partial_success_is_not_an_error() {
        let bundle = InMemoryBundle::new()
            .with_file("Resources/Topics/closures.json", topic_json("closures"))
            .with_file("Topics/threading.json", "{ not json");

        let topics = service(bundle, &["closures", "threading", "avkit"])
            .load_topics()
            .await
            .unwrap();

        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].id.as_str(), "closures");
    }

    #[tokio::test]
    async fn all_failures_are_reported_together() {
        let bundle = InMemoryBundle::new()
            .with_file("Topics/a.json", "[]")
            .with_file("Topics/b.json", r#"{"id":"b"}"#);

        let err = service(bundle, &["a", "b", "c"])
            .load_topics()
            .await
            .unwrap_err();

        let ContentError::AllTopicsFailed { reasons } = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(reasons.len(), 3);
        let message = err.to_string();
        assert!(message.contains("a.json: failed to decode a.json"));
        assert!(message.contains("b.json: failed to decode b.json"));
        assert!(message.contains("c.json: could not find resource file: c.json"));
    }

    #[tokio::test]
    async fn empty_topic_list_loads_nothing() {
        let topics = service(InMemoryBundle::new(), &[]).load_topics().await.unwrap();
        assert!(topics.is_empty());
    }

    #[tokio::test]
    async fn questions_are_filtered_by_topic() {
        let bundle =
            InMemoryBundle::new().with_file("Resources/Questions/quizQuestions.json", QUESTIONS);
        let svc = service(bundle, &[]);

        let questions = svc.load_questions("closures").await.unwrap();
        let ids: Vec<_> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q3"]);

        assert!(svc.load_questions("avkit").await.unwrap().is_empty());
        assert_eq!(svc.all_questions().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn missing_question_document_is_not_found() {
        let err = service(InMemoryBundle::new(), &[])
            .load_questions("closures")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ContentError::ResourceNotFound(ref name) if name == "quizQuestions.json"
        ));
    }

    #[tokio::test]
    async fn not_found_lists_available_documents() {
        let bundle = InMemoryBundle::new()
            .with_file("Resources/Topics/closures.json", topic_json("closures"));
        let err = service(bundle, &[]).load_code_examples("closures").await.unwrap_err();
        assert!(err.to_string().contains("available: Resources/Topics/closures.json"));
    }

    #[tokio::test]
    async fn examples_are_filtered_by_topic() {
        let bundle = InMemoryBundle::new().with_file("codeExamples.json", EXAMPLES);
        let examples = service(bundle, &[])
            .load_code_examples("swift6Migration")
            .await
            .unwrap();
        assert_eq!(examples.len(), 1);
        assert!(examples[0].is_migration_example);
    }

    #[tokio::test]
    async fn malformed_shared_document_is_a_decode_error() {
        let bundle = InMemoryBundle::new().with_file("Resources/codeExamples.json", "{}");
        let err = service(bundle, &[]).load_code_examples("x").await.unwrap_err();
        assert!(matches!(
            err,
            ContentError::Decode { ref resource, .. } if resource == "codeExamples.json"
        ));
    }

    #[test]
    fn partition_keeps_order() {
        let (ok, failed) = partition_outcomes(vec![
            Ok(1),
            Err("x".to_owned()),
            Ok(2),
            Err("y".to_owned()),
        ]);
        assert_eq!(ok, vec![1, 2]);
        assert_eq!(failed, vec!["x".to_owned(), "y".to_owned()]);
    }
}
