use anyhow::Result;
use calnote_core::{CalNoteConfig, LocalStore};
use owo_colors::OwoColorize;

use crate::render::Render;

pub async fn run(config: &CalNoteConfig, id: &str) -> Result<()> {
    let app = super::open(config).await?;
    let id = super::resolve_id(&app, id).await?;

    let title = app
        .store()
        .get(&id)
        .await?
        .map(|item| item.title)
        .unwrap_or_default();

    let notice = app.delete(&id).await?;

    println!("{}", format!("Deleted: {title}").red());
    println!("  {}", notice.render());

    Ok(())
}
