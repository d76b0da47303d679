//! Per-question and whole-quiz results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{status_for_score, Question, Quiz, Status, UserAnswer};

/// The outcome of answering one question. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    /// The question that was answered.
    pub question: Question,
    /// The answer the user gave.
    pub user_answer: UserAnswer,
    /// Score in [0, 100].
    pub score: u8,
    /// Threshold classification of the score.
    pub status: Status,
    /// Feedback for the user.
    pub explanation: Option<String>,
    /// Canonical expected-answer string.
    pub expected_answer: Option<String>,
}

/// The final result of a completed quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    /// The quiz that was taken.
    pub quiz: Quiz,
    /// Per-question results, in question order.
    pub question_results: Vec<QuestionResult>,
    /// Weighted mean score, 0–100.
    pub total_score: f64,
    /// Total weighted points earned.
    pub raw_score: f64,
    /// Total weighted points possible.
    pub max_score: f64,
    /// Overall verdict against the quiz thresholds.
    pub status: Status,
    /// When the quiz was completed.
    pub completed_at: DateTime<Utc>,
}

/// Fold per-question results into the final quiz score and status.
///
/// The weighted mean is 0 when no questions were answered. Pure except for
/// capturing the completion timestamp; inputs are not mutated.
pub fn calculate_quiz_result(quiz: &Quiz, question_results: Vec<QuestionResult>) -> QuizResult {
    let mut total_weighted_score = 0.0;
    let mut total_weight = 0.0;

    for result in &question_results {
        let weight = result.question.weight();
        total_weighted_score += f64::from(result.score) * weight;
        total_weight += weight;
    }

    let total_score = if total_weight > 0.0 {
        total_weighted_score / total_weight
    } else {
        0.0
    };

    QuizResult {
        quiz: quiz.clone(),
        question_results,
        total_score,
        raw_score: total_weighted_score,
        max_score: total_weight * 100.0,
        status: status_for_score(total_score, &quiz.scoring),
        completed_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuizScoring, TrueFalseQuestion};

    fn question(weight: f64) -> Question {
        Question::TrueFalse(TrueFalseQuestion {
            prompt: "statement".into(),
            answer: true,
            weight,
        })
    }

    fn result(score: u8, weight: f64) -> QuestionResult {
        QuestionResult {
            question: question(weight),
            user_answer: UserAnswer::Bool(true),
            score,
            status: Status::Passed,
            explanation: None,
            expected_answer: None,
        }
    }

    fn quiz() -> Quiz {
        Quiz {
            title: "Test".into(),
            description: None,
            scoring: QuizScoring {
                min_score_to_pass: 80,
                min_score_to_fail: 60,
            },
            questions: vec![],
        }
    }

    #[test]
    fn unit_weights_give_arithmetic_mean() {
        let results = vec![result(100, 1.0), result(50, 1.0), result(0, 1.0)];
        let quiz_result = calculate_quiz_result(&quiz(), results);
        assert!((quiz_result.total_score - 50.0).abs() < 1e-9);
        assert!((quiz_result.raw_score - 150.0).abs() < 1e-9);
        assert!((quiz_result.max_score - 300.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_mean() {
        // Scenario E: weights 1 and 3, scores 100 and 0 -> 25.
        let results = vec![result(100, 1.0), result(0, 3.0)];
        let quiz_result = calculate_quiz_result(&quiz(), results);
        assert!((quiz_result.total_score - 25.0).abs() < 1e-9);
        assert!((quiz_result.raw_score - 100.0).abs() < 1e-9);
        assert!((quiz_result.max_score - 400.0).abs() < 1e-9);
        assert_eq!(quiz_result.status, Status::Failed);
    }

    #[test]
    fn empty_results_score_zero() {
        let quiz_result = calculate_quiz_result(&quiz(), vec![]);
        assert!(quiz_result.total_score.abs() < f64::EPSILON);
        assert!(quiz_result.max_score.abs() < f64::EPSILON);
        assert_eq!(quiz_result.status, Status::Failed);
    }

    #[test]
    fn overall_status_uses_quiz_thresholds() {
        let results = vec![result(90, 1.0), result(80, 1.0)];
        let quiz_result = calculate_quiz_result(&quiz(), results);
        assert_eq!(quiz_result.status, Status::Passed);

        let results = vec![result(70, 1.0), result(60, 1.0)];
        let quiz_result = calculate_quiz_result(&quiz(), results);
        assert_eq!(quiz_result.status, Status::Imprecise);
    }

    #[test]
    fn question_order_is_preserved() {
        let results = vec![result(10, 1.0), result(20, 1.0), result(30, 1.0)];
        let quiz_result = calculate_quiz_result(&quiz(), results);
        let scores: Vec<u8> = quiz_result.question_results.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![10, 20, 30]);
    }
}
