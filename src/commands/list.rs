use anyhow::Result;
use calnote_core::{CalNoteConfig, MergedView, SyncWindow};
use owo_colors::OwoColorize;

use crate::render::Render;

pub async fn run(config: &CalNoteConfig, from: Option<&str>, to: Option<&str>) -> Result<()> {
    let window = SyncWindow::from_args(from, to, config.default_window())?;
    let app = super::open(config).await?;

    let items: Vec<_> = MergedView::new(app.store())
        .current()
        .into_iter()
        .filter(|item| window.intersects(item))
        .collect();

    if items.is_empty() {
        println!("{}", "No events or notes in this range".dimmed());
        return Ok(());
    }

    let mut current_day = None;
    for item in &items {
        let day = item.start.date();
        if current_day != Some(day) {
            println!("{}", day.format("%a %Y-%m-%d").bold());
            current_day = Some(day);
        }
        println!("  {}", item.render());
    }

    Ok(())
}
