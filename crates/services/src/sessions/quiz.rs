use std::collections::HashMap;
use std::sync::Arc;

use rand::rng;
use rand::seq::SliceRandom;
use tracing::debug;
use tutor_core::model::{Question, QuestionId, TopicId};
use tutor_core::quiz::score_answers;

use crate::content_service::ContentService;
use crate::error::ContentError;
use crate::events::{EventBus, SessionEvent};

/// One attempt at a topic's quiz.
pub struct QuizSession {
    content: Arc<ContentService>,
    events: EventBus,
    shuffle: bool,
    topic_id: Option<TopicId>,
    questions: Vec<Question>,
    current_index: usize,
    answers: HashMap<QuestionId, String>,
    finished: bool,
    score: f64,
    error_message: Option<String>,
}

impl QuizSession {
    #[must_use]
    pub fn new(content: Arc<ContentService>, events: EventBus) -> Self {
        Self {
            content,
            events,
            shuffle: false,
            topic_id: None,
            questions: Vec::new(),
            current_index: 0,
            answers: HashMap::new(),
            finished: false,
            score: 0.0,
            error_message: None,
        }
    }

    /// Present questions in random order instead of document order.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Loads the quiz for `topic_id` and starts a fresh attempt.
    ///
    /// # Errors
    ///
    /// Returns the content error when the question document is missing or
    /// malformed. The current attempt is left as it was and
    /// `error_message` is set.
    pub async fn load_questions(&mut self, topic_id: &TopicId) -> Result<(), ContentError> {
        match self.content.load_questions(topic_id.as_str()).await {
            Ok(mut questions) => {
                if self.shuffle {
                    questions.as_mut_slice().shuffle(&mut rng());
                }
                self.reset();
                debug!(topic = %topic_id, count = questions.len(), "quiz loaded");
                self.events.publish(SessionEvent::QuestionsLoaded {
                    topic_id: topic_id.clone(),
                    count: questions.len(),
                });
                self.questions = questions;
                self.topic_id = Some(topic_id.clone());
                Ok(())
            }
            Err(err) => {
                self.error_message = Some(format!("Failed to load questions: {err}"));
                Err(err)
            }
        }
    }

    /// Stores `answer`, replacing any earlier answer to the same question.
    pub fn submit_answer(&mut self, question_id: &QuestionId, answer: impl Into<String>) {
        self.answers.insert(question_id.clone(), answer.into());
        self.events
            .publish(SessionEvent::AnswerSubmitted(question_id.clone()));
    }

    #[must_use]
    pub fn answer_for(&self, question_id: &QuestionId) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    /// Whether the stored answer is right. `None` when the question is
    /// unanswered or not part of this quiz.
    #[must_use]
    pub fn is_answer_correct(&self, question_id: &QuestionId) -> Option<bool> {
        let question = self.questions.iter().find(|q| &q.id == question_id)?;
        self.answer_for(question_id)
            .map(|answer| question.is_correct(answer))
    }

    /// Moves forward one question; stays put on the last one.
    pub fn next(&mut self) {
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
        }
    }

    /// Moves back one question; stays put on the first one.
    pub fn previous(&mut self) {
        self.current_index = self.current_index.saturating_sub(1);
    }

    #[must_use]
    pub fn compute_score(&self) -> f64 {
        score_answers(&self.questions, &self.answers)
    }

    /// Scores the attempt and marks it finished. Calling it again rescores.
    pub fn finish(&mut self) -> f64 {
        self.score = self.compute_score();
        self.finished = true;
        self.events
            .publish(SessionEvent::QuizFinished { score: self.score });
        self.score
    }

    /// Back to the state before any quiz was loaded.
    pub fn reset(&mut self) {
        self.topic_id = None;
        self.questions.clear();
        self.current_index = 0;
        self.answers.clear();
        self.finished = false;
        self.score = 0.0;
        self.error_message = None;
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Position through the quiz as `(index + 1) / total`; 0.0 when empty.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let fraction = (self.current_index + 1) as f64 / self.questions.len() as f64;
        fraction
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn topic_id(&self) -> Option<&TopicId> {
        self.topic_id.as_ref()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
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

    const QUESTIONS: &str = r#"[
        {"id":"q1","topicId":"closures","type":"trueFalse","question":"?","correctAnswer":"True","explanation":""},
        {"id":"q2","topicId":"closures","type":"multipleChoice","question":"?","options":["a","b"],"correctAnswer":"a","explanation":""},
        {"id":"q3","topicId":"closures","type":"codeCompletion","question":"?","correctAnswer":"weak self","explanation":""},
        {"id":"q4","topicId":"threading","type":"trueFalse","question":"?","correctAnswer":"False","explanation":""}
    ]"#;

    fn quiz(bundle: InMemoryBundle) -> QuizSession {
        QuizSession::new(Arc::new(ContentService::new(Arc::new(bundle))), EventBus::default())
    }

    async fn loaded() -> QuizSession {
        let mut session =
            quiz(InMemoryBundle::new().with_file("Questions/quizQuestions.json", QUESTIONS));
        session.load_questions(&TopicId::new("closures")).await.unwrap();
        session
    }

    fn qid(id: &str) -> QuestionId {
        QuestionId::new(id)
    }

    #[tokio::test]
    async fn navigation_is_clamped() {
        let mut session = loaded().await;
        session.previous();
        assert_eq!(session.current_index(), 0);

        session.next();
        session.next();
        assert!(session.is_last());
        session.next();
        assert_eq!(session.current_index(), 2);
        assert_eq!(session.progress(), 1.0);

        session.previous();
        assert_eq!(session.current_question().map(|q| q.id.as_str()), Some("q2"));
    }

    #[tokio::test]
    async fn answers_are_exact_and_upserted() {
        let mut session = loaded().await;
        session.submit_answer(&qid("q1"), "true");
        assert_eq!(session.is_answer_correct(&qid("q1")), Some(false));
        session.submit_answer(&qid("q1"), "True");
        assert_eq!(session.answer_for(&qid("q1")), Some("True"));
        assert_eq!(session.is_answer_correct(&qid("q1")), Some(true));
        assert_eq!(session.is_answer_correct(&qid("q2")), None);
        assert_eq!(session.is_answer_correct(&qid("q4")), None);
    }

    #[tokio::test]
    async fn finish_scores_the_attempt() {
        let mut session = loaded().await;
        session.submit_answer(&qid("q1"), "True");
        session.submit_answer(&qid("q2"), "b");
        session.submit_answer(&qid("q3"), "weak self");

        let score = session.finish();

        assert!((score - 2.0 / 3.0).abs() < 1e-9);
        assert!(session.is_finished());
        assert_eq!(session.score(), score);
    }

    #[tokio::test]
    async fn reload_starts_a_fresh_attempt() {
        let mut session = loaded().await;
        session.next();
        session.submit_answer(&qid("q1"), "True");
        session.finish();

        session.load_questions(&TopicId::new("threading")).await.unwrap();

        assert_eq!(session.questions().len(), 1);
        assert_eq!(session.current_index(), 0);
        assert!(session.answer_for(&qid("q1")).is_none());
        assert!(!session.is_finished());
        assert_eq!(session.score(), 0.0);
        assert_eq!(session.topic_id().map(TopicId::as_str), Some("threading"));
    }

    #[tokio::test]
    async fn failed_load_keeps_the_current_attempt() {
        let mut session = quiz(InMemoryBundle::new());
        let err = session.load_questions(&TopicId::new("closures")).await.unwrap_err();
        assert!(matches!(err, ContentError::ResourceNotFound(_)));
        assert!(session.error_message().unwrap().starts_with("Failed to load questions: "));
        assert!(session.questions().is_empty());
    }

    #[tokio::test]
    async fn shuffled_quiz_keeps_every_question() {
        let mut session = quiz(InMemoryBundle::new().with_file("quizQuestions.json", QUESTIONS))
            .with_shuffle(true);
        session.load_questions(&TopicId::new("closures")).await.unwrap();

        let mut ids: Vec<_> = session.questions().iter().map(|q| q.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn empty_quiz_has_no_progress() {
        let mut session = quiz(InMemoryBundle::new());
        session.next();
        session.previous();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.progress(), 0.0);
        assert!(session.is_last());
        assert_eq!(session.finish(), 0.0);
    }

    #[tokio::test]
    async fn reset_forgets_everything() {
        let mut session = loaded().await;
        session.submit_answer(&qid("q1"), "True");
        session.reset();
        assert!(session.questions().is_empty());
        assert!(session.topic_id().is_none());
        assert!(session.answer_for(&qid("q1")).is_none());
    }
}
