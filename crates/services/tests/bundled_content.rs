use std::path::PathBuf;
use std::sync::Arc;

use services::content_service::DEFAULT_TOPIC_FILES;
use services::ContentService;
use storage::bundle::DirectoryBundle;

fn shipped_content() -> ContentService {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../content");
    ContentService::new(Arc::new(DirectoryBundle::new(root)))
}

#[tokio::test]
async fn every_default_topic_decodes() {
    let topics = shipped_content().load_topics().await.unwrap();
    let ids: Vec<_> = topics.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, DEFAULT_TOPIC_FILES.to_vec());
    assert!(topics.iter().all(|t| !t.sections.is_empty()));
}

#[tokio::test]
async fn questions_and_examples_point_at_known_topics() {
    let content = shipped_content();
    let questions = content.all_questions().await.unwrap();
    let examples = content.all_code_examples().await.unwrap();
    assert!(!questions.is_empty());
    assert!(!examples.is_empty());

    for question in &questions {
        assert!(DEFAULT_TOPIC_FILES.contains(&question.topic_id.as_str()), "{}", question.id);
        if let Some(options) = &question.options {
            assert!(options.contains(&question.correct_answer), "{}", question.id);
        }
    }
    for example in &examples {
        assert!(DEFAULT_TOPIC_FILES.contains(&example.related_topic_id.as_str()), "{}", example.id);
    }
}
