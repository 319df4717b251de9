//! Change notifications published by the session models.
//!
//! Presentation code subscribes to an `EventBus` and re-reads whatever
//! session state it renders when an event arrives.

use tokio::sync::broadcast;
use tutor_core::model::{Achievement, ExampleId, QuestionId, TopicId};

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TopicsLoading,
    TopicsLoaded { count: usize },
    TopicsFailed { message: String },
    TopicSelected(TopicId),
    QuizCompleted { topic_id: TopicId, score: f64, completed: bool },
    AchievementUnlocked(Achievement),
    TimeRecorded { topic_id: TopicId, seconds: f64 },
    ProgressReset,
    QuestionsLoaded { topic_id: TopicId, count: usize },
    AnswerSubmitted(QuestionId),
    QuizFinished { score: f64 },
    ExamplesLoaded { topic_id: TopicId, count: usize },
    ExampleSelected(ExampleId),
    BeforeAfterToggled { show_before: bool },
}

/// Fan-out channel for `SessionEvent`s.
///
/// Cloning shares the channel. Publishing with nobody subscribed is a
/// no-op, and slow subscribers lose the oldest events first.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: SessionEvent) {
        // An error only means there are no subscribers right now.
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_fine() {
        EventBus::default().publish(SessionEvent::ProgressReset);
    }

    #[test]
    fn clones_share_subscribers() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        bus.clone().publish(SessionEvent::TopicsLoaded { count: 2 });
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::TopicsLoaded { count: 2 });
    }
}
