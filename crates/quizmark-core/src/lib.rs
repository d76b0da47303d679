//! quizmark-core — Quiz data model, evaluators, and scoring.
//!
//! This crate defines the question/quiz data model, the per-kind answer
//! evaluators, the judge contract for LLM-graded free-text answers, and the
//! weighted quiz aggregation that the rest of quizmark builds on.

pub mod error;
pub mod judge;
pub mod model;
pub mod parser;
pub mod results;
pub mod scoring;
