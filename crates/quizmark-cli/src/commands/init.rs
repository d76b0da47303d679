//! The `quizmark init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizmark.toml
    if std::path::Path::new("quizmark.toml").exists() {
        println!("quizmark.toml already exists, skipping.");
    } else {
        std::fs::write("quizmark.toml", SAMPLE_CONFIG)?;
        println!("Created quizmark.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.md");
    if example_path.exists() {
        println!("quizzes/example.md already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.md");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizmark.toml with your API key (only needed for free-text questions)");
    println!("  2. Run: quizmark validate --quiz quizzes/example.md");
    println!("  3. Run: quizmark take --quiz quizzes/example.md");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizmark configuration

judge = "openai"
language = "English"
quiz_dir = "./quizzes"

[judges.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
model = "gpt-4o-mini"

[judges.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"
model = "claude-3-5-sonnet-20241022"

[judges.ollama]
type = "ollama"
base_url = "http://localhost:11434"
model = "llama3.2"
"#;

const EXAMPLE_QUIZ: &str = r#"# Example quiz

Answer a few questions about France.

```quiz
title: France basics
description: A short example quiz
scoring:
  min_score_to_pass: 80
  min_score_to_fail: 60
questions:
  - type: mcq
    q: What is the capital of France?
    options: [Paris, Lyon, Marseille]
    answer: [Paris]

  - type: mcq
    q: Which of these cities are in France?
    options: [Lyon, Turin, Bordeaux, Geneva]
    answer: [Lyon, Bordeaux]
    multiple: true

  - type: slider
    q: In which year did the French Revolution begin?
    answer: 1789
    min: 1700
    max: 1900
    tolerance: 5

  - type: true-false
    q: The Seine flows through Paris.
    answer: true

  - type: free-text
    q: Why is Paris sometimes called the City of Light?
    answer: Early adoption of street lighting and its role in the Age of Enlightenment.
    weight: 2
```
"#;
