//! quizmark CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizmark", version, about = "Markdown quiz runner with LLM-graded answers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz interactively
    Take {
        /// Path to a markdown file containing a quiz
        #[arg(long)]
        quiz: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Response language override (e.g. "English")
        #[arg(long)]
        language: Option<String>,
    },

    /// Validate quiz files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// List quizzes in a folder
    List {
        /// Folder to scan (defaults to the configured quiz folder)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Test the connection to the configured judge
    Check {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizmark_core=info".parse().unwrap())
                .add_directive("quizmark_judges=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            quiz,
            config,
            language,
        } => commands::take::execute(quiz, config, language).await,
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::List { dir, config } => commands::list::execute(dir, config),
        Commands::Check { config } => commands::check::execute(config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
