//! Scoring rules shared by quiz sessions and progress tracking.

use std::collections::HashMap;

use crate::error::ProgressError;
use crate::model::{Question, QuestionId};

/// Minimum score that marks a topic as completed.
pub const COMPLETION_THRESHOLD: f64 = 0.70;

/// Returns true when `score` completes a topic.
#[must_use]
pub fn is_passing(score: f64) -> bool {
    score >= COMPLETION_THRESHOLD
}

/// Checks that a quiz score is a finite fraction in [0, 1].
///
/// # Errors
///
/// Returns `ProgressError::InvalidScore` otherwise.
pub fn check_score(score: f64) -> Result<f64, ProgressError> {
    if score.is_finite() && (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(ProgressError::InvalidScore(score))
    }
}

/// Fraction of `questions` whose stored answer equals the correct answer.
///
/// Unanswered questions count as wrong. No questions scores 0.0.
#[must_use]
pub fn score_answers(questions: &[Question], answers: &HashMap<QuestionId, String>) -> f64 {
    if questions.is_empty() {
        return 0.0;
    }
    let correct = questions
        .iter()
        .filter(|q| answers.get(&q.id).is_some_and(|answer| q.is_correct(answer)))
        .count();
    #[allow(clippy::cast_precision_loss)]
    let score = correct as f64 / questions.len() as f64;
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, QuestionType, TopicId};

    fn question(id: &str, answer: &str) -> Question {
        Question {
            id: QuestionId::new(id),
            topic_id: TopicId::new("t"),
            kind: QuestionType::MultipleChoice,
            question: format!("{id}?"),
            options: None,
            correct_answer: answer.to_owned(),
            explanation: String::new(),
            difficulty: Difficulty::Medium,
            code_snippet: None,
            source: None,
        }
    }

    #[test]
    fn threshold_boundaries() {
        assert!(is_passing(0.70));
        assert!(!is_passing(0.6999));
        assert!(is_passing(1.0));
        assert!(!is_passing(0.0));
    }

    #[test]
    fn check_score_rejects_out_of_range() {
        assert_eq!(check_score(0.5), Ok(0.5));
        assert!(check_score(1.01).is_err());
        assert!(check_score(-0.1).is_err());
        assert!(check_score(f64::NAN).is_err());
    }

    #[test]
    fn empty_quiz_scores_zero() {
        assert!(score_answers(&[], &HashMap::new()).abs() < f64::EPSILON);
    }

    #[test]
    fn all_correct_and_all_wrong() {
        let questions = vec![question("a", "1"), question("b", "2")];
        let mut answers = HashMap::new();
        answers.insert(QuestionId::new("a"), "1".to_owned());
        answers.insert(QuestionId::new("b"), "2".to_owned());
        assert!((score_answers(&questions, &answers) - 1.0).abs() < f64::EPSILON);

        answers.insert(QuestionId::new("a"), "x".to_owned());
        answers.insert(QuestionId::new("b"), "2 ".to_owned());
        assert!(score_answers(&questions, &answers).abs() < f64::EPSILON);
    }

    #[test]
    fn unanswered_counts_as_wrong() {
        let questions = vec![
            question("a", "1"),
            question("b", "2"),
            question("c", "3"),
            question("d", "4"),
        ];
        let mut answers = HashMap::new();
        answers.insert(QuestionId::new("a"), "1".to_owned());
        assert!((score_answers(&questions, &answers) - 0.25).abs() < f64::EPSILON);
    }
}
