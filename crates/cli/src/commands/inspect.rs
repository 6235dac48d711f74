//! Read-only commands that print stored data as JSON.

use anyhow::{Result, bail};
use edumate_storage::{CurriculumStore, SessionStore, Storage};

use crate::config::AppConfig;

fn open(config: &AppConfig) -> Result<Storage> {
    config.ensure_db_dir()?;
    Ok(Storage::new(&config.db_path)?)
}

pub(crate) async fn sessions(config: &AppConfig) -> Result<()> {
    let sessions = open(config)?.list_sessions().await?;
    println!("{}", serde_json::to_string_pretty(&sessions)?);
    Ok(())
}

pub(crate) async fn curriculums(config: &AppConfig) -> Result<()> {
    let curricula = open(config)?.list_curricula().await?;
    println!("{}", serde_json::to_string_pretty(&curricula)?);
    Ok(())
}

pub(crate) async fn roadmap(config: &AppConfig, id: &str) -> Result<()> {
    match open(config)?.get_curriculum(id).await? {
        Some(curriculum) => {
            println!("{}", curriculum.roadmap());
            Ok(())
        },
        None => bail!("curriculum not found: {id}"),
    }
}

/// Print a curriculum and every stored step detail as Markdown.
pub(crate) async fn show(config: &AppConfig, id: &str) -> Result<()> {
    let Some(curriculum) = open(config)?.get_curriculum(id).await? else {
        bail!("curriculum not found: {id}");
    };
    print!("{}", curriculum.formatted_text());
    for detail in curriculum.detailed_steps.values() {
        println!("\n---\n");
        print!("{}", detail.formatted_text());
    }
    Ok(())
}
