use anyhow::Result;
use calnote_core::CalNoteConfig;
use owo_colors::OwoColorize;

pub async fn run(mut config: CalNoteConfig) -> Result<()> {
    let dir = calnote_provider_google::app_config::base_dir()?;
    let account = calnote_provider_google::authenticate(&dir).await?;

    config.remote.account = Some(account.clone());
    config.save()?;

    println!("{}", format!("Signed in as {account}").green());
    println!("Run {} to push pending events.", "calnote sync".bold());

    Ok(())
}
