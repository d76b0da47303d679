//! quizmark-judges — LLM judge integrations.
//!
//! Implements the `Judge` trait for OpenAI, Anthropic, and Ollama, allowing
//! quizmark to grade free-text answers with multiple LLM backends. The
//! grading prompt and verdict coercion live in `quizmark-core`; this crate
//! only translates provider wire formats.

pub mod anthropic;
pub mod config;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{create_judge, load_config, JudgeConfig, QuizmarkConfig};
