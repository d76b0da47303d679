//! Quiz definition parser.
//!
//! Quizzes are YAML embedded in markdown, either as a ```quiz fenced code
//! block or as frontmatter. Parsing goes through intermediate raw structs so
//! every structural violation gets a positioned error instead of a bare
//! serde message; `validate_quiz` reports suspect-but-legal content.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::model::{
    FreeTextQuestion, McqQuestion, Question, Quiz, QuizScoring, SliderQuestion, TrueFalseQuestion,
};

/// Intermediate YAML structure for a quiz definition.
#[derive(Debug, Deserialize)]
struct YamlQuiz {
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    scoring: Option<YamlScoring>,
    questions: Option<Vec<YamlQuestion>>,
}

#[derive(Debug, Deserialize)]
struct YamlScoring {
    min_score_to_pass: Option<u8>,
    min_score_to_fail: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct YamlQuestion {
    #[serde(rename = "type")]
    kind: Option<String>,
    q: Option<String>,
    #[serde(default)]
    answer: Option<serde_yaml::Value>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    multiple: Option<bool>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    step: Option<f64>,
    #[serde(default)]
    tolerance: Option<f64>,
    #[serde(default)]
    weight: Option<f64>,
}

/// Parse a YAML string into a validated `Quiz`.
///
/// Accepts either a `quiz:` root mapping or direct top-level keys.
pub fn parse_quiz(yaml: &str) -> Result<Quiz> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml).context("failed to parse quiz YAML")?;

    // Support both formats: with a "quiz:" root or direct properties.
    let value = match value.get("quiz") {
        Some(inner) => inner.clone(),
        None => value,
    };

    let raw: YamlQuiz = serde_yaml::from_value(value).context("failed to parse quiz YAML")?;

    let title = match raw.title {
        Some(t) if !t.trim().is_empty() => t,
        _ => bail!("quiz must have a title"),
    };

    let scoring = match raw.scoring {
        Some(s) => QuizScoring {
            min_score_to_pass: s.min_score_to_pass.unwrap_or(80),
            min_score_to_fail: s.min_score_to_fail.unwrap_or(60),
        },
        None => QuizScoring::default(),
    };
    if scoring.min_score_to_pass < scoring.min_score_to_fail {
        bail!("min_score_to_pass must be >= min_score_to_fail");
    }

    let Some(raw_questions) = raw.questions else {
        bail!("quiz must have a questions list");
    };

    let questions = raw_questions
        .into_iter()
        .enumerate()
        .map(|(index, q)| parse_question(q, index + 1))
        .collect::<Result<Vec<_>>>()?;

    Ok(Quiz {
        title,
        description: raw.description,
        scoring,
        questions,
    })
}

fn parse_question(raw: YamlQuestion, number: usize) -> Result<Question> {
    let Some(prompt) = raw.q.filter(|q| !q.trim().is_empty()) else {
        bail!("question {number} must have a \"q\" field");
    };

    let weight = raw.weight.unwrap_or(1.0);
    if weight <= 0.0 {
        bail!("question {number} weight must be positive");
    }

    match raw.kind.as_deref() {
        Some("free-text") => {
            let answer = raw
                .answer
                .as_ref()
                .and_then(|v| v.as_str())
                .filter(|a| !a.trim().is_empty());
            let Some(answer) = answer else {
                bail!("question {number} (free-text) must have a reference answer");
            };
            Ok(Question::FreeText(FreeTextQuestion {
                prompt,
                answer: answer.to_string(),
                context: raw.context,
                weight,
            }))
        }

        Some("mcq") => {
            let Some(options) = raw.options else {
                bail!("question {number} (mcq) must have at least 2 options");
            };
            if options.len() < 2 {
                bail!("question {number} (mcq) must have at least 2 options");
            }
            let unique: HashSet<&str> = options.iter().map(String::as_str).collect();
            if unique.len() != options.len() {
                bail!("question {number} (mcq) options must be unique");
            }

            let answer = match raw.answer {
                Some(serde_yaml::Value::Sequence(items)) => items
                    .into_iter()
                    .map(|item| match item {
                        serde_yaml::Value::String(s) => Ok(s),
                        other => bail!(
                            "question {number} (mcq) answer entries must be strings, got {other:?}"
                        ),
                    })
                    .collect::<Result<Vec<_>>>()?,
                _ => bail!("question {number} (mcq) answer must be a list"),
            };
            if answer.is_empty() {
                bail!("question {number} (mcq) answer must not be empty");
            }
            for a in &answer {
                if !options.contains(a) {
                    bail!("question {number} (mcq) answer \"{a}\" is not one of the options");
                }
            }

            let multiple = raw.multiple.unwrap_or(false);
            if !multiple && answer.len() > 1 {
                bail!("question {number} (mcq) is single-select but has {} correct answers; set multiple: true", answer.len());
            }

            Ok(Question::Mcq(McqQuestion {
                prompt,
                options,
                answer,
                multiple,
                weight,
            }))
        }

        Some("slider") => {
            let Some(answer) = raw.answer.as_ref().and_then(|v| v.as_f64()) else {
                bail!("question {number} (slider) answer must be a number");
            };
            let (Some(min), Some(max)) = (raw.min, raw.max) else {
                bail!("question {number} (slider) must have min and max values");
            };
            if min >= max {
                bail!("question {number} (slider) min must be < max");
            }
            Ok(Question::Slider(SliderQuestion {
                prompt,
                answer,
                min,
                max,
                step: raw.step.unwrap_or(1.0),
                tolerance: raw.tolerance,
                weight,
            }))
        }

        Some("true-false") => {
            let Some(answer) = raw.answer.as_ref().and_then(|v| v.as_bool()) else {
                bail!("question {number} (true-false) answer must be a boolean");
            };
            Ok(Question::TrueFalse(TrueFalseQuestion {
                prompt,
                answer,
                weight,
            }))
        }

        Some(other) => bail!("question {number} has invalid type: {other}"),
        None => bail!("question {number} must have a type"),
    }
}

/// Extract the quiz YAML from a markdown document.
///
/// A ```quiz fenced code block takes precedence; otherwise leading YAML
/// frontmatter is used when it looks like a quiz definition.
pub fn extract_quiz_block(content: &str) -> Option<String> {
    let mut in_block = false;
    let mut block = String::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if !in_block && trimmed == "```quiz" {
            in_block = true;
            continue;
        }
        if in_block && trimmed == "```" {
            return Some(block);
        }
        if in_block {
            if !block.is_empty() {
                block.push('\n');
            }
            block.push_str(line);
        }
    }
    // Truncated (unclosed) block — treat accumulated content as the quiz
    if in_block && !block.is_empty() {
        return Some(block);
    }

    // Fall back to YAML frontmatter between --- markers
    let mut lines = content.lines();
    if lines.next()?.trim() != "---" {
        return None;
    }
    let mut front = String::new();
    for line in lines {
        if line.trim() == "---" {
            if front.contains("quiz:") || front.contains("title:") {
                return Some(front);
            }
            return None;
        }
        if !front.is_empty() {
            front.push('\n');
        }
        front.push_str(line);
    }
    None
}

/// Load and parse a quiz from a markdown file.
pub fn load_quiz_file(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    let Some(yaml) = extract_quiz_block(&content) else {
        bail!("no quiz definition found in {}", path.display());
    };

    parse_quiz(&yaml).with_context(|| format!("failed to parse quiz: {}", path.display()))
}

/// A quiz together with the file it was loaded from.
#[derive(Debug, Clone)]
pub struct QuizFile {
    pub path: PathBuf,
    pub quiz: Quiz,
}

/// Recursively discover quizzes in all `.md` files under a directory.
///
/// Markdown without a quiz block is skipped silently; files whose quiz fails
/// to parse are skipped with a warning.
pub fn find_quizzes(dir: &Path) -> Result<Vec<QuizFile>> {
    let mut found = Vec::new();

    if !dir.is_dir() {
        bail!("not a directory: {}", dir.display());
    }

    for entry in
        std::fs::read_dir(dir).with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            found.extend(find_quizzes(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "md") {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read quiz file: {}", path.display()))?;
            let Some(yaml) = extract_quiz_block(&content) else {
                continue;
            };
            match parse_quiz(&yaml) {
                Ok(quiz) => found.push(QuizFile { path, quiz }),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(found)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based question number (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz for suspect-but-legal content.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning {
            question: None,
            message: "quiz has no questions".into(),
        });
    }

    for (index, question) in quiz.questions.iter().enumerate() {
        let number = index + 1;
        if let Question::Slider(slider) = question {
            if slider.answer < slider.min || slider.answer > slider.max {
                warnings.push(ValidationWarning {
                    question: Some(number),
                    message: "slider answer lies outside the min/max range".into(),
                });
            }
            if let Some(tolerance) = slider.tolerance {
                if tolerance >= slider.max - slider.min {
                    warnings.push(ValidationWarning {
                        question: Some(number),
                        message: "tolerance covers the entire slider range".into(),
                    });
                }
            }
            if slider.step <= 0.0 {
                warnings.push(ValidationWarning {
                    question: Some(number),
                    message: "step is not positive".into(),
                });
            }
        }
    }

    warnings
}
