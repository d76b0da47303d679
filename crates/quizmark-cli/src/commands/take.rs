//! The `quizmark take` command — an interactive quiz session.
//!
//! One question at a time: print the question, read an answer from stdin,
//! evaluate it to completion, show the verdict, move on. The session loop is
//! the in-flight guard; a new answer cannot be submitted while an evaluation
//! is pending.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use comfy_table::Table;

use quizmark_core::judge::Judge;
use quizmark_core::model::{McqQuestion, Question, Status, UserAnswer};
use quizmark_core::parser::load_quiz_file;
use quizmark_core::results::{calculate_quiz_result, QuestionResult, QuizResult};
use quizmark_core::scoring::evaluate_answer;
use quizmark_judges::config::{create_judge, load_config_from};

pub async fn execute(
    quiz_path: PathBuf,
    config_path: Option<PathBuf>,
    language_override: Option<String>,
) -> Result<()> {
    let quiz = load_quiz_file(&quiz_path)?;
    let config = load_config_from(config_path.as_deref())?;
    let language = language_override.unwrap_or_else(|| config.language.clone());

    // A judge is only needed (and only constructed) for free-text questions.
    let needs_judge = quiz
        .questions
        .iter()
        .any(|q| matches!(q, Question::FreeText(_)));
    let judge: Option<Box<dyn Judge>> = if needs_judge {
        let judge_config = config
            .selected_judge()
            .context("this quiz contains free-text questions")?;
        Some(create_judge(judge_config))
    } else {
        None
    };

    println!("{}", quiz.title);
    if let Some(description) = &quiz.description {
        println!("{description}");
    }
    println!(
        "{} question(s), pass at {}, fail below {}",
        quiz.questions.len(),
        quiz.scoring.min_score_to_pass,
        quiz.scoring.min_score_to_fail
    );

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let total = quiz.questions.len();
    let mut results = Vec::with_capacity(total);
    for (index, question) in quiz.questions.iter().enumerate() {
        println!("\nQuestion {}/{}: {}", index + 1, total, question.prompt());
        let user_answer = read_answer(question, &mut input)?;
        let result = evaluate_answer(
            question,
            &user_answer,
            &quiz.scoring,
            judge.as_deref(),
            &language,
        )
        .await?;
        print_question_result(&result);
        results.push(result);
    }

    let quiz_result = calculate_quiz_result(&quiz, results);
    print_summary(&quiz_result);
    Ok(())
}

fn read_answer(question: &Question, input: &mut impl BufRead) -> Result<UserAnswer> {
    match question {
        Question::FreeText(_) => {
            let line = read_line("> ", input)?;
            Ok(UserAnswer::Text(line.trim().to_string()))
        }

        Question::Mcq(q) => {
            for (i, option) in q.options.iter().enumerate() {
                println!("  {}) {}", i + 1, option);
            }
            let prompt = if q.multiple {
                "numbers, comma-separated> "
            } else {
                "number> "
            };
            loop {
                let line = read_line(prompt, input)?;
                match parse_selections(&line, q) {
                    Ok(answer) => return Ok(answer),
                    Err(message) => println!("{message}"),
                }
            }
        }

        Question::Slider(q) => loop {
            let line = read_line(&format!("number between {} and {}> ", q.min, q.max), input)?;
            match line.trim().parse::<f64>() {
                Ok(value) => return Ok(UserAnswer::Number(value)),
                Err(_) => println!("Please enter a number."),
            }
        },

        Question::TrueFalse(_) => loop {
            let line = read_line("true/false> ", input)?;
            match line.trim().to_lowercase().as_str() {
                "true" | "t" | "yes" | "y" => return Ok(UserAnswer::Bool(true)),
                "false" | "f" | "no" | "n" => return Ok(UserAnswer::Bool(false)),
                _ => println!("Please answer true or false."),
            }
        },
    }
}

fn read_line(prompt: &str, input: &mut impl BufRead) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    let bytes = input.read_line(&mut line)?;
    if bytes == 0 {
        bail!("no answer provided (end of input)");
    }
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

fn parse_selections(line: &str, question: &McqQuestion) -> std::result::Result<UserAnswer, String> {
    let mut selections = Vec::new();
    for token in line.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let number: usize = token
            .parse()
            .map_err(|_| format!("\"{token}\" is not an option number."))?;
        if number < 1 || number > question.options.len() {
            return Err(format!(
                "Please pick numbers between 1 and {}.",
                question.options.len()
            ));
        }
        selections.push(question.options[number - 1].clone());
    }

    if selections.is_empty() {
        return Err("Please select at least one option.".to_string());
    }
    if !question.multiple && selections.len() > 1 {
        return Err("Please select exactly one option.".to_string());
    }
    Ok(UserAnswer::Selections(selections))
}

fn print_question_result(result: &QuestionResult) {
    println!("Score: {}/100 ({})", result.score, result.status);
    if let Some(explanation) = &result.explanation {
        println!("{explanation}");
    }
    if result.status != Status::Passed {
        if let Some(expected) = &result.expected_answer {
            println!("Expected: {expected}");
        }
    }
}

fn print_summary(result: &QuizResult) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Score", "Status"]);
    for (index, question_result) in result.question_results.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            truncate(question_result.question.prompt(), 48),
            question_result.score.to_string(),
            question_result.status.to_string(),
        ]);
    }

    println!("\n{table}");
    println!(
        "Total: {:.1}/100 ({:.0} of {:.0} weighted points)",
        result.total_score, result.raw_score, result.max_score
    );
    println!("Result: {}", result.status);
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars - 1).collect();
        format!("{head}\u{2026}")
    }
}
