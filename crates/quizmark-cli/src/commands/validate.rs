//! The `quizmark validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizmark_core::parser::{find_quizzes, load_quiz_file, validate_quiz, QuizFile};

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let quizzes: Vec<QuizFile> = if quiz_path.is_dir() {
        find_quizzes(&quiz_path)?
    } else {
        vec![QuizFile {
            quiz: load_quiz_file(&quiz_path)?,
            path: quiz_path,
        }]
    };

    if quizzes.is_empty() {
        println!("No quizzes found.");
        return Ok(());
    }

    let mut total_warnings = 0;

    for QuizFile { path, quiz } in &quizzes {
        println!(
            "Quiz: {} ({} questions) [{}]",
            quiz.title,
            quiz.questions.len(),
            path.display()
        );

        let warnings = validate_quiz(quiz);
        for w in &warnings {
            let prefix = w
                .question
                .map(|n| format!("  [question {n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
