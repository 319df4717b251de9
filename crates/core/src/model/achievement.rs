use crate::model::ids::TopicId;
use crate::model::progress::LearningProgress;

/// Milestones unlocked by quiz results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Achievement {
    /// At least one topic completed.
    FirstComplete,
    /// Every known topic completed.
    AllComplete,
    /// A quiz answered without a single mistake.
    PerfectScore,
}

impl Achievement {
    pub const ALL: [Achievement; 3] = [
        Achievement::FirstComplete,
        Achievement::AllComplete,
        Achievement::PerfectScore,
    ];

    /// Stable id used in the persisted progress record.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Achievement::FirstComplete => "first_complete",
            Achievement::AllComplete => "all_complete",
            Achievement::PerfectScore => "perfect_score",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Achievement::FirstComplete => "First Steps",
            Achievement::AllComplete => "Master Swift",
            Achievement::PerfectScore => "Perfect Score",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Achievement::FirstComplete => "Completed your first topic",
            Achievement::AllComplete => "Completed all topics",
            Achievement::PerfectScore => "Scored 100% on a quiz",
        }
    }

    /// Achievements whose condition holds for `progress`.
    ///
    /// `topic_ids` is the set of topics the learner can see; an empty set
    /// never satisfies `AllComplete`. `last_score` is the score of the quiz
    /// that was just finished, if any.
    pub fn evaluate<'a>(
        progress: &LearningProgress,
        topic_ids: impl IntoIterator<Item = &'a TopicId>,
        last_score: Option<f64>,
    ) -> Vec<Achievement> {
        let mut earned = Vec::new();

        if progress.total_topics_completed() > 0 {
            earned.push(Achievement::FirstComplete);
        }

        let mut any_topic = false;
        let all_done = topic_ids.into_iter().all(|id| {
            any_topic = true;
            progress
                .topic(id.as_str())
                .is_some_and(|record| record.is_completed)
        });
        if any_topic && all_done {
            earned.push(Achievement::AllComplete);
        }

        if last_score.is_some_and(|score| score >= 1.0) {
            earned.push(Achievement::PerfectScore);
        }

        earned
    }
}
