use anyhow::Result;
use calnote_core::{CalNoteConfig, SyncWindow};

use crate::render::Render;

pub async fn run(config: &CalNoteConfig, from: Option<&str>, to: Option<&str>) -> Result<()> {
    let window = SyncWindow::from_args(from, to, config.default_window())?;
    let app = super::open(config).await?;

    let report = app.sync(&window).await?;
    println!("{}", report.render());

    Ok(())
}
