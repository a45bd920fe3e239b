use anyhow::Result;
use calnote_core::{CalNoteConfig, ItemPatch, Priority};
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::utils::{parse_time, time_zone};

pub struct EditArgs {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub priority: Option<Priority>,
    pub content: Option<String>,
    pub clear_content: bool,
}

impl EditArgs {
    fn into_patch(self, config: &CalNoteConfig) -> Result<ItemPatch> {
        let tz = time_zone(config)?;

        let content = if self.clear_content {
            Some(None)
        } else {
            self.content.map(Some)
        };

        Ok(ItemPatch {
            title: self.title,
            content,
            start: self.start.map(|s| parse_time(&s, tz)).transpose()?,
            end: self.end.map(|s| parse_time(&s, tz)).transpose()?,
            priority: self.priority,
        })
    }
}

pub async fn run(config: &CalNoteConfig, id: &str, args: EditArgs) -> Result<()> {
    let patch = args.into_patch(config)?;
    if patch.is_empty() {
        anyhow::bail!("Nothing to change. Pass at least one of --title, --start, --end, --priority, --content.");
    }

    let app = super::open(config).await?;
    let id = super::resolve_id(&app, id).await?;
    let (item, notice) = app.update(&id, patch).await?;

    println!("{}", format!("Updated: {}", item.title).yellow());
    println!("  {}", item.render());
    println!("  {}", notice.render());

    Ok(())
}
