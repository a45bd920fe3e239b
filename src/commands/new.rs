use anyhow::Result;
use calnote_core::{CalNoteConfig, NewItem, Priority};
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::utils::{default_end, parse_time, time_zone};

pub struct NewArgs {
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub note: bool,
    pub priority: Option<Priority>,
    pub content: Option<String>,
}

pub async fn run(config: &CalNoteConfig, args: NewArgs) -> Result<()> {
    let tz = time_zone(config)?;
    let start = parse_time(&args.start, tz)?;

    let mut new = if args.note {
        NewItem::note(args.title, start.date())
    } else {
        let end = match &args.end {
            Some(end) => parse_time(end, tz)?,
            None => default_end(&start),
        };
        NewItem::event(args.title, start, end)
    };

    if let Some(priority) = args.priority {
        new = new.with_priority(priority);
    }
    if let Some(content) = args.content {
        new = new.with_content(content);
    }

    let app = super::open(config).await?;
    let (item, notice) = app.create(new).await?;

    println!("{}", format!("Created: {}", item.title).green());
    println!("  {}", item.render());
    println!("  {}", notice.render());

    Ok(())
}
