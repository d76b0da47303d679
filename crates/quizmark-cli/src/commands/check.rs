//! The `quizmark check` command — judge connectivity probe.

use std::path::PathBuf;

use anyhow::Result;

use quizmark_judges::config::{create_judge, load_config_from};

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let judge_config = config.selected_judge()?;
    let judge = create_judge(judge_config);

    println!("Testing connection to {}...", judge.name());
    if judge.test_connection().await {
        println!("Connection to {} OK.", judge.name());
        Ok(())
    } else {
        anyhow::bail!("connection to {} failed", judge.name())
    }
}
