//! The `quizmark list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use quizmark_core::parser::find_quizzes;
use quizmark_judges::config::load_config_from;

pub fn execute(dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => load_config_from(config_path.as_deref())?.quiz_dir,
    };

    let quizzes = find_quizzes(&dir)?;

    if quizzes.is_empty() {
        println!("No quizzes found in {}.", dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["File", "Title", "Questions", "Pass mark"]);
    for quiz_file in &quizzes {
        let display_path = quiz_file
            .path
            .strip_prefix(&dir)
            .unwrap_or(&quiz_file.path);
        table.add_row(vec![
            display_path.display().to_string(),
            quiz_file.quiz.title.clone(),
            quiz_file.quiz.questions.len().to_string(),
            quiz_file.quiz.scoring.min_score_to_pass.to_string(),
        ]);
    }

    println!("{table}");
    Ok(())
}
