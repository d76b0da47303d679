//! Answer evaluation.
//!
//! One evaluator per question kind, plus the dispatcher that routes a
//! question to the matching evaluator and attaches the threshold status.
//! MCQ, slider, and true/false are pure synchronous computations; free-text
//! delegates to the configured [`Judge`] and is the only suspending path.

use crate::error::EvaluateError;
use crate::judge::Judge;
use crate::model::{
    status_for_score, McqQuestion, Question, QuizScoring, SliderQuestion, TrueFalseQuestion,
    UserAnswer,
};
use crate::results::QuestionResult;

/// Intermediate evaluator output before status classification.
struct Evaluation {
    score: u8,
    explanation: String,
    expected_answer: String,
}

/// Evaluate a user's answer to a question.
///
/// Routes to the evaluator for the question's kind, then classifies the
/// score against the quiz thresholds. A judge is required only for
/// free-text questions; judge failures propagate with the provider name
/// attached and are never retried here.
pub async fn evaluate_answer(
    question: &Question,
    user_answer: &UserAnswer,
    scoring: &QuizScoring,
    judge: Option<&dyn Judge>,
    language: &str,
) -> Result<QuestionResult, EvaluateError> {
    let evaluation = match (question, user_answer) {
        (Question::FreeText(q), UserAnswer::Text(text)) => {
            let judge = judge.ok_or(EvaluateError::JudgeRequired)?;
            let verdict = judge.evaluate(q, text, language).await.map_err(|source| {
                EvaluateError::Judge {
                    provider: judge.name().to_string(),
                    source,
                }
            })?;
            Evaluation {
                // Judge output is untrusted; clamp even though the shared
                // coercion already does.
                score: verdict.score.clamp(0.0, 100.0).round() as u8,
                explanation: verdict.explanation,
                expected_answer: verdict.expected_answer,
            }
        }
        (Question::Mcq(q), UserAnswer::Selections(selected)) => evaluate_mcq(q, selected),
        (Question::Slider(q), UserAnswer::Number(value)) => evaluate_slider(q, *value),
        (Question::TrueFalse(q), UserAnswer::Bool(value)) => evaluate_true_false(q, *value),
        (question, _) => {
            return Err(EvaluateError::AnswerShape {
                kind: question.kind(),
            })
        }
    };

    let status = status_for_score(f64::from(evaluation.score), scoring);

    Ok(QuestionResult {
        question: question.clone(),
        user_answer: user_answer.clone(),
        score: evaluation.score,
        status,
        explanation: Some(evaluation.explanation),
        expected_answer: Some(evaluation.expected_answer),
    })
}

fn evaluate_mcq(question: &McqQuestion, selected: &[String]) -> Evaluation {
    // Duplicate selections count once, in selection order.
    let mut user: Vec<&str> = Vec::new();
    for option in selected {
        if !user.contains(&option.as_str()) {
            user.push(option);
        }
    }

    let correct = &question.answer;
    let expected_answer = correct.join(", ");

    if !question.multiple {
        // Single choice: binary. Only a lone selection matching a lone
        // authored answer counts.
        let is_correct = user.len() == 1 && correct.len() == 1 && user[0] == correct[0];
        return Evaluation {
            score: if is_correct { 100 } else { 0 },
            explanation: if is_correct {
                "Correct!".to_string()
            } else {
                format!("Incorrect. You selected: {}", user.join(", "))
            },
            expected_answer,
        };
    }

    // Multiple choice: proportional. Penalizes both wrong picks and
    // omissions, floored at 0.
    let correct_selections = user
        .iter()
        .filter(|s| correct.iter().any(|c| c == *s))
        .count();
    let incorrect_selections = user.len() - correct_selections;
    let missed = correct.len() - correct_selections;

    let score = ((correct_selections as f64 - incorrect_selections as f64) / correct.len() as f64
        * 100.0)
        .round()
        .max(0.0) as u8;

    let explanation = if score == 100 {
        "Perfect! All correct answers selected.".to_string()
    } else {
        let mut parts = Vec::new();
        if correct_selections > 0 {
            parts.push(format!("{correct_selections} correct"));
        }
        if incorrect_selections > 0 {
            parts.push(format!("{incorrect_selections} incorrect"));
        }
        if missed > 0 {
            parts.push(format!("{missed} missed"));
        }
        parts.join(", ")
    };

    Evaluation {
        score,
        explanation,
        expected_answer,
    }
}

fn evaluate_slider(question: &SliderQuestion, value: f64) -> Evaluation {
    let answer = question.answer;

    match question.tolerance {
        Some(tolerance) => {
            let within = (value - answer).abs() <= tolerance;
            Evaluation {
                score: if within { 100 } else { 0 },
                explanation: if within {
                    format!(
                        "Correct! Your answer {value} is within \u{b1}{tolerance} of the correct answer."
                    )
                } else {
                    format!(
                        "Incorrect. Your answer {value} is outside the tolerance range of \u{b1}{tolerance}."
                    )
                },
                expected_answer: format!("{answer} (\u{b1}{tolerance})"),
            }
        }
        None => {
            let exact = value == answer;
            Evaluation {
                score: if exact { 100 } else { 0 },
                explanation: if exact {
                    "Perfect! Exact answer.".to_string()
                } else {
                    format!("Incorrect. You answered {value}.")
                },
                expected_answer: answer.to_string(),
            }
        }
    }
}

fn evaluate_true_false(question: &TrueFalseQuestion, value: bool) -> Evaluation {
    let is_correct = value == question.answer;
    Evaluation {
        score: if is_correct { 100 } else { 0 },
        explanation: if is_correct {
            "Correct!".to_string()
        } else {
            format!("Incorrect. You answered: {value}")
        },
        expected_answer: question.answer.to_string(),
    }
}
