//! Core data model types for quizmark.
//!
//! These are the fundamental types the entire quizmark system uses to
//! represent quizzes, questions, and user answers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A quiz definition: a title, scoring thresholds, and an ordered list of
/// questions. Produced by the parser; never constructed from raw text here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    /// Quiz title.
    pub title: String,
    /// Optional description shown before the first question.
    #[serde(default)]
    pub description: Option<String>,
    /// Pass/fail thresholds, applied per question and quiz-wide.
    #[serde(default)]
    pub scoring: QuizScoring,
    /// The questions, in authored order.
    pub questions: Vec<Question>,
}

/// Scoring thresholds for a quiz.
///
/// Invariant (enforced at parse time): `min_score_to_pass >= min_score_to_fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScoring {
    /// Scores at or above this are `Passed`.
    #[serde(default = "default_pass")]
    pub min_score_to_pass: u8,
    /// Scores at or above this (but below pass) are `Imprecise`.
    #[serde(default = "default_fail")]
    pub min_score_to_fail: u8,
}

fn default_pass() -> u8 {
    80
}

fn default_fail() -> u8 {
    60
}

impl Default for QuizScoring {
    fn default() -> Self {
        Self {
            min_score_to_pass: default_pass(),
            min_score_to_fail: default_fail(),
        }
    }
}

/// A quiz question, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Question {
    /// Open answer, graded by an external LLM judge.
    FreeText(FreeTextQuestion),
    /// Multiple choice, single- or multi-select.
    Mcq(McqQuestion),
    /// Numeric value on a range.
    Slider(SliderQuestion),
    /// Boolean statement.
    TrueFalse(TrueFalseQuestion),
}

impl Question {
    /// The question text shown to the user.
    pub fn prompt(&self) -> &str {
        match self {
            Question::FreeText(q) => &q.prompt,
            Question::Mcq(q) => &q.prompt,
            Question::Slider(q) => &q.prompt,
            Question::TrueFalse(q) => &q.prompt,
        }
    }

    /// Relative importance in the aggregate quiz score.
    pub fn weight(&self) -> f64 {
        match self {
            Question::FreeText(q) => q.weight,
            Question::Mcq(q) => q.weight,
            Question::Slider(q) => q.weight,
            Question::TrueFalse(q) => q.weight,
        }
    }

    /// The kind tag as it appears in quiz files.
    pub fn kind(&self) -> &'static str {
        match self {
            Question::FreeText(_) => "free-text",
            Question::Mcq(_) => "mcq",
            Question::Slider(_) => "slider",
            Question::TrueFalse(_) => "true-false",
        }
    }
}

/// A free-text question. The reference answer and optional context are sent
/// to the judge as grading guidance; the context is never shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeTextQuestion {
    /// Question text.
    #[serde(rename = "q")]
    pub prompt: String,
    /// Reference answer the judge grades against.
    pub answer: String,
    /// Extra grading guidance for the judge.
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqQuestion {
    /// Question text.
    #[serde(rename = "q")]
    pub prompt: String,
    /// The selectable options, in display order. At least 2, unique.
    pub options: Vec<String>,
    /// The correct options, a non-empty subset of `options` in authored order.
    pub answer: Vec<String>,
    /// Multi-select (proportional credit) vs single-select (binary).
    #[serde(default)]
    pub multiple: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// A numeric slider question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderQuestion {
    /// Question text.
    #[serde(rename = "q")]
    pub prompt: String,
    /// The correct value.
    pub answer: f64,
    /// Lower bound of the range. Must be < `max`.
    pub min: f64,
    /// Upper bound of the range.
    pub max: f64,
    /// Display granularity only; never affects scoring.
    #[serde(default = "default_step")]
    pub step: f64,
    /// Absolute window for credit. `None` means exact match required.
    #[serde(default)]
    pub tolerance: Option<f64>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// A true/false question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueFalseQuestion {
    /// Question text.
    #[serde(rename = "q")]
    pub prompt: String,
    /// The correct value.
    pub answer: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

fn default_step() -> f64 {
    1.0
}

/// A user's submitted answer. The expected shape depends on the question
/// kind; a mismatch is a caller bug and surfaces as an evaluation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserAnswer {
    /// Free-text answer.
    Text(String),
    /// Selected MCQ options.
    Selections(Vec<String>),
    /// Slider value.
    Number(f64),
    /// True/false answer.
    Bool(bool),
}

impl fmt::Display for UserAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserAnswer::Text(text) => write!(f, "{text}"),
            UserAnswer::Selections(options) => write!(f, "{}", options.join(", ")),
            UserAnswer::Number(value) => write!(f, "{value}"),
            UserAnswer::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// Three-way verdict for a score against a quiz's thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Imprecise,
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Passed => write!(f, "passed"),
            Status::Imprecise => write!(f, "imprecise"),
            Status::Failed => write!(f, "failed"),
        }
    }
}

/// Classify a score against the quiz thresholds.
///
/// `score >= pass` is `Passed`, `score >= fail` is `Imprecise`, everything
/// below is `Failed`. With `pass >= fail` the three regions partition the
/// whole score range.
pub fn status_for_score(score: f64, scoring: &QuizScoring) -> Status {
    if score >= f64::from(scoring.min_score_to_pass) {
        Status::Passed
    } else if score >= f64::from(scoring.min_score_to_fail) {
        Status::Imprecise
    } else {
        Status::Failed
    }
}
