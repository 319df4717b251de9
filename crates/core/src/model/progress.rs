use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::ProgressError;
use crate::model::achievement::Achievement;
use crate::model::ids::TopicId;

//
// ─── TOPIC PROGRESS ────────────────────────────────────────────────────────────
//

/// Per-topic learner record.
///
/// Optional-on-read defaults: `isCompleted` false, `progress` 0,
/// `quizScores` empty, `lastAttemptDate` null, `timeSpent` 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    pub topic_id: TopicId,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub progress: f64,
    /// Every quiz score in attempt order.
    #[serde(default)]
    pub quiz_scores: Vec<f64>,
    #[serde(default)]
    pub last_attempt_date: Option<DateTime<Utc>>,
    /// Seconds.
    #[serde(default)]
    pub time_spent: f64,
}

impl TopicProgress {
    #[must_use]
    pub fn new(topic_id: TopicId) -> Self {
        Self {
            topic_id,
            is_completed: false,
            progress: 0.0,
            quiz_scores: Vec::new(),
            last_attempt_date: None,
            time_spent: 0.0,
        }
    }

    #[must_use]
    pub fn attempts(&self) -> usize {
        self.quiz_scores.len()
    }

    #[must_use]
    pub fn best_score(&self) -> Option<f64> {
        self.quiz_scores.iter().copied().reduce(f64::max)
    }
}

//
// ─── LEARNING PROGRESS ─────────────────────────────────────────────────────────
//

/// Everything the learner has done, across all topics.
///
/// `total_topics_completed` is derived: it is recounted from the records on
/// every progress update and whenever a stored record is decoded, so it
/// always equals the number of completed topics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LearningProgressRecord", into = "LearningProgressRecord")]
pub struct LearningProgress {
    topic_progress: BTreeMap<TopicId, TopicProgress>,
    total_topics_completed: usize,
    total_time_spent: f64,
    achievements: BTreeSet<String>,
}

impl LearningProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn topic(&self, topic_id: &str) -> Option<&TopicProgress> {
        self.topic_progress.get(topic_id)
    }

    pub fn topics(&self) -> impl Iterator<Item = &TopicProgress> {
        self.topic_progress.values()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topic_progress.is_empty() && self.achievements.is_empty()
    }

    #[must_use]
    pub fn total_topics_completed(&self) -> usize {
        self.total_topics_completed
    }

    /// Seconds spent across all topics.
    #[must_use]
    pub fn total_time_spent(&self) -> f64 {
        self.total_time_spent
    }

    /// Overwrites a topic's progress and completion flag, creating the
    /// record on first use.
    pub fn update_progress(
        &mut self,
        topic_id: &TopicId,
        progress: f64,
        is_completed: bool,
        at: DateTime<Utc>,
    ) {
        let record = self.record_mut(topic_id);
        record.progress = progress;
        record.is_completed = is_completed;
        record.last_attempt_date = Some(at);
        self.recount_completed();
    }

    /// Appends a score to the topic's history.
    pub fn add_quiz_score(&mut self, topic_id: &TopicId, score: f64) {
        self.record_mut(topic_id).quiz_scores.push(score);
    }

    /// Adds study time to the topic and to the running total.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidDuration` for negative or non-finite
    /// values; nothing is recorded in that case.
    pub fn add_time_spent(
        &mut self,
        topic_id: &TopicId,
        seconds: f64,
    ) -> Result<(), ProgressError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ProgressError::InvalidDuration(seconds));
        }
        self.record_mut(topic_id).time_spent += seconds;
        self.total_time_spent += seconds;
        Ok(())
    }

    /// Records an achievement. Returns `true` if it was not unlocked before.
    pub fn unlock_achievement(&mut self, achievement: Achievement) -> bool {
        self.achievements.insert(achievement.id().to_owned())
    }

    #[must_use]
    pub fn has_achievement(&self, achievement: Achievement) -> bool {
        self.achievements.contains(achievement.id())
    }

    /// Raw achievement ids, including ids this build does not know about.
    pub fn achievement_ids(&self) -> impl Iterator<Item = &str> {
        self.achievements.iter().map(String::as_str)
    }

    /// Unlocked achievements this build knows how to describe.
    #[must_use]
    pub fn achievements(&self) -> Vec<Achievement> {
        self.achievement_ids()
            .filter_map(Achievement::from_id)
            .collect()
    }

    fn record_mut(&mut self, topic_id: &TopicId) -> &mut TopicProgress {
        self.topic_progress
            .entry(topic_id.clone())
            .or_insert_with(|| TopicProgress::new(topic_id.clone()))
    }

    fn recount_completed(&mut self) {
        self.total_topics_completed = self
            .topic_progress
            .values()
            .filter(|record| record.is_completed)
            .count();
    }
}

//
// ─── PERSISTED SHAPE ───────────────────────────────────────────────────────────
//

/// Stored form of `LearningProgress`.
///
/// Optional-on-read defaults: `topicProgress` empty, `totalTimeSpent` 0,
/// `achievements` empty (records written before achievements existed).
/// `totalTopicsCompleted` is written for readers of the raw record but is
/// recounted on read.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LearningProgressRecord {
    #[serde(default)]
    topic_progress: BTreeMap<TopicId, TopicProgress>,
    #[serde(default)]
    total_topics_completed: usize,
    #[serde(default)]
    total_time_spent: f64,
    #[serde(default)]
    achievements: Vec<String>,
}

impl From<LearningProgressRecord> for LearningProgress {
    fn from(record: LearningProgressRecord) -> Self {
        let mut progress = Self {
            topic_progress: record.topic_progress,
            total_topics_completed: 0,
            total_time_spent: record.total_time_spent,
            achievements: record.achievements.into_iter().collect(),
        };
        progress.recount_completed();
        progress
    }
}

impl From<LearningProgress> for LearningProgressRecord {
    fn from(progress: LearningProgress) -> Self {
        Self {
            topic_progress: progress.topic_progress,
            total_topics_completed: progress.total_topics_completed,
            total_time_spent: progress.total_time_spent,
            achievements: progress.achievements.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use proptest::prelude::*;

    fn id(s: &str) -> TopicId {
        TopicId::new(s)
    }

    #[test]
    fn update_creates_record_lazily() {
        let mut progress = LearningProgress::new();
        assert!(progress.topic("closures").is_none());

        progress.update_progress(&id("closures"), 0.5, false, fixed_now());

        let record = progress.topic("closures").unwrap();
        assert!((record.progress - 0.5).abs() < f64::EPSILON);
        assert_eq!(record.last_attempt_date, Some(fixed_now()));
        assert!(record.quiz_scores.is_empty());
    }

    #[test]
    fn recount_drops_topics_that_regress() {
        let mut progress = LearningProgress::new();
        progress.update_progress(&id("a"), 0.9, true, fixed_now());
        progress.update_progress(&id("b"), 0.8, true, fixed_now());
        assert_eq!(progress.total_topics_completed(), 2);

        progress.update_progress(&id("a"), 0.3, false, fixed_now());
        assert_eq!(progress.total_topics_completed(), 1);
    }

    #[test]
    fn time_spent_is_summed() {
        let mut progress = LearningProgress::new();
        progress.add_time_spent(&id("a"), 30.0).unwrap();
        progress.add_time_spent(&id("b"), 15.5).unwrap();
        progress.add_time_spent(&id("a"), 10.0).unwrap();

        assert!((progress.topic("a").unwrap().time_spent - 40.0).abs() < f64::EPSILON);
        assert!((progress.total_time_spent() - 55.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_negative_time() {
        let mut progress = LearningProgress::new();
        let err = progress.add_time_spent(&id("a"), -1.0).unwrap_err();
        assert_eq!(err, ProgressError::InvalidDuration(-1.0));
        assert!(progress.topic("a").is_none());
        assert!(progress.total_time_spent().abs() < f64::EPSILON);
    }

    #[test]
    fn achievements_unlock_once() {
        let mut progress = LearningProgress::new();
        assert!(progress.unlock_achievement(Achievement::PerfectScore));
        assert!(!progress.unlock_achievement(Achievement::PerfectScore));
        assert_eq!(progress.achievements(), vec![Achievement::PerfectScore]);
    }

    #[test]
    fn json_round_trip_preserves_every_field() {
        let mut progress = LearningProgress::new();
        progress.update_progress(&id("closures"), 0.85, true, fixed_now());
        progress.add_quiz_score(&id("closures"), 0.85);
        progress.add_time_spent(&id("closures"), 120.0).unwrap();
        progress.unlock_achievement(Achievement::FirstComplete);

        let json = serde_json::to_string(&progress).unwrap();
        let back: LearningProgress = serde_json::from_str(&json).unwrap();

        assert_eq!(back, progress);
    }

    #[test]
    fn decodes_record_without_achievements() {
        let json = r#"{
            "topicProgress": {
                "x": { "topicId": "x", "isCompleted": true, "progress": 1.0,
                       "quizScores": [1.0], "lastAttemptDate": null, "timeSpent": 0 }
            },
            "totalTopicsCompleted": 1,
            "totalTimeSpent": 0
        }"#;
        let progress: LearningProgress = serde_json::from_str(json).unwrap();
        assert_eq!(progress.achievement_ids().count(), 0);
        assert_eq!(progress.total_topics_completed(), 1);
    }

    #[test]
    fn stored_completed_count_is_recounted() {
        let json = r#"{
            "topicProgress": { "x": { "topicId": "x", "isCompleted": false } },
            "totalTopicsCompleted": 7,
            "totalTimeSpent": 0,
            "achievements": ["first_complete", "from_a_newer_build"]
        }"#;
        let progress: LearningProgress = serde_json::from_str(json).unwrap();
        assert_eq!(progress.total_topics_completed(), 0);
        assert_eq!(progress.achievement_ids().count(), 2);
        assert_eq!(progress.achievements(), vec![Achievement::FirstComplete]);
    }

    proptest! {
        #[test]
        fn completed_count_matches_records(
            updates in prop::collection::vec((0usize..5, any::<bool>()), 0..40)
        ) {
            let mut progress = LearningProgress::new();
            for (topic, completed) in updates {
                let topic_id = TopicId::new(format!("t{topic}"));
                progress.update_progress(&topic_id, 0.5, completed, fixed_now());
                let expected = progress.topics().filter(|r| r.is_completed).count();
                prop_assert_eq!(progress.total_topics_completed(), expected);
            }
        }

        #[test]
        fn scores_append_in_call_order(scores in prop::collection::vec(0.0f64..=1.0, 0..20)) {
            let mut progress = LearningProgress::new();
            let topic_id = TopicId::new("t");
            for score in &scores {
                progress.add_quiz_score(&topic_id, *score);
            }
            let recorded = progress
                .topic("t")
                .map(|r| r.quiz_scores.clone())
                .unwrap_or_default();
            prop_assert_eq!(recorded, scores);
        }
    }
}
