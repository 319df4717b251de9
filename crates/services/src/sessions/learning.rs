use std::sync::Arc;

use tracing::{debug, info};
use tutor_core::Clock;
use tutor_core::model::{Achievement, LearningProgress, Topic, TopicId, TopicProgress};
use tutor_core::quiz::{check_score, is_passing};

use crate::content_service::ContentService;
use crate::error::{ContentError, LearningError};
use crate::events::{EventBus, SessionEvent};
use crate::progress_service::ProgressService;

/// Where a `LearningSession` is in its topic-loading lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Outcome of `LearningSession::complete_quiz`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCompletion {
    pub completed: bool,
    /// Achievements unlocked by this attempt, in catalog order.
    pub unlocked: Vec<Achievement>,
}

/// Topic list, progress overlay and quiz bookkeeping for one learner.
///
/// Single owner: every mutation takes `&mut self` and nothing is locked.
pub struct LearningSession {
    content: Arc<ContentService>,
    progress_store: Arc<ProgressService>,
    clock: Clock,
    events: EventBus,
    state: LoadState,
    topics: Vec<Topic>,
    current_topic: Option<TopicId>,
    progress: LearningProgress,
    error_message: Option<String>,
}

impl LearningSession {
    /// Creates a session with the learner's stored progress. Topics are not
    /// loaded until `load_topics` is called.
    pub async fn start(
        content: Arc<ContentService>,
        progress_store: Arc<ProgressService>,
        clock: Clock,
        events: EventBus,
    ) -> Self {
        let progress = progress_store.load().await;
        Self {
            content,
            progress_store,
            clock,
            events,
            state: LoadState::Idle,
            topics: Vec::new(),
            current_topic: None,
            progress,
            error_message: None,
        }
    }

    /// Loads every topic and overlays the learner's progress onto it.
    ///
    /// # Errors
    ///
    /// Returns the content error when no topic could be loaded. The
    /// previously loaded topics stay in place and `error_message` is set.
    pub async fn load_topics(&mut self) -> Result<(), ContentError> {
        self.state = LoadState::Loading;
        self.events.publish(SessionEvent::TopicsLoading);

        match self.content.load_topics().await {
            Ok(mut topics) => {
                for topic in &mut topics {
                    topic.apply_progress(self.progress.topic(topic.id.as_str()));
                }
                info!(count = topics.len(), "topics ready");
                self.events.publish(SessionEvent::TopicsLoaded { count: topics.len() });
                self.topics = topics;
                self.error_message = None;
                self.state = LoadState::Ready;
                Ok(())
            }
            Err(err) => {
                let message = format!("Failed to load topics: {err}");
                self.events.publish(SessionEvent::TopicsFailed {
                    message: message.clone(),
                });
                self.error_message = Some(message.clone());
                self.state = LoadState::Failed(message);
                Err(err)
            }
        }
    }

    /// Marks `topic` as the one being studied.
    pub fn start_topic(&mut self, topic: &Topic) {
        self.current_topic = Some(topic.id.clone());
        self.events.publish(SessionEvent::TopicSelected(topic.id.clone()));
    }

    /// Records a finished quiz for `topic_id` and persists the result.
    /// Persistence is best effort; a failed save is only logged.
    ///
    /// The topic's progress is overwritten with `score`, the score is
    /// appended to its history and any newly earned achievements unlock.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::Progress` when `score` is not a finite value
    /// in [0, 1]; nothing changes in that case.
    pub async fn complete_quiz(
        &mut self,
        score: f64,
        topic_id: &TopicId,
    ) -> Result<QuizCompletion, LearningError> {
        let score = check_score(score)?;
        let completed = is_passing(score);

        self.progress
            .update_progress(topic_id, score, completed, self.clock.now());
        self.progress.add_quiz_score(topic_id, score);
        self.overlay(topic_id);

        let known = self.known_topic_ids();
        let earned = Achievement::evaluate(&self.progress, &known, Some(score));
        let unlocked: Vec<_> = earned
            .into_iter()
            .filter(|achievement| self.progress.unlock_achievement(*achievement))
            .collect();

        debug!(topic = %topic_id, score, completed, "quiz completed");
        self.events.publish(SessionEvent::QuizCompleted {
            topic_id: topic_id.clone(),
            score,
            completed,
        });
        for achievement in &unlocked {
            info!(achievement = achievement.id(), "achievement unlocked");
            self.events.publish(SessionEvent::AchievementUnlocked(*achievement));
        }

        self.progress_store.save(&self.progress).await;
        Ok(QuizCompletion { completed, unlocked })
    }

    /// Adds study time to `topic_id` and persists it.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::Progress` for negative or non-finite values.
    pub async fn record_time_spent(
        &mut self,
        topic_id: &TopicId,
        seconds: f64,
    ) -> Result<(), LearningError> {
        self.progress.add_time_spent(topic_id, seconds)?;
        self.events.publish(SessionEvent::TimeRecorded {
            topic_id: topic_id.clone(),
            seconds,
        });
        self.progress_store.save(&self.progress).await;
        Ok(())
    }

    /// Forgets all progress, in storage and on the loaded topics.
    pub async fn reset_progress(&mut self) {
        self.progress_store.reset().await;
        self.progress = LearningProgress::new();
        for topic in &mut self.topics {
            topic.apply_progress(None);
        }
        self.events.publish(SessionEvent::ProgressReset);
    }

    #[must_use]
    pub fn topic_progress(&self, topic_id: &str) -> Option<&TopicProgress> {
        self.progress.topic(topic_id)
    }

    #[must_use]
    pub fn progress(&self) -> &LearningProgress {
        &self.progress
    }

    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    #[must_use]
    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.id.as_str() == topic_id)
    }

    #[must_use]
    pub fn current_topic(&self) -> Option<&Topic> {
        let id = self.current_topic.as_ref()?;
        self.topic(id.as_str())
    }

    #[must_use]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Loaded topic ids, or the configured topic files when nothing has
    /// been loaded yet.
    fn known_topic_ids(&self) -> Vec<TopicId> {
        if self.topics.is_empty() {
            self.content
                .topic_files()
                .iter()
                .map(|name| TopicId::new(name.as_str()))
                .collect()
        } else {
            self.topics.iter().map(|topic| topic.id.clone()).collect()
        }
    }

    fn overlay(&mut self, topic_id: &TopicId) {
        let record = self.progress.topic(topic_id.as_str());
        if let Some(topic) = self.topics.iter_mut().find(|topic| &topic.id == topic_id) {
            topic.apply_progress(record);
        }
    }
}
