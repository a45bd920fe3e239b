use anyhow::Result;
use calnote_core::{CalNoteConfig, Collection, LocalStore};
use owo_colors::OwoColorize;

pub async fn run(config: &CalNoteConfig) -> Result<()> {
    let app = super::open(config).await?;
    let events = app.store().list(Collection::Events).await?;
    let notes = app.store().list(Collection::Notes).await?;
    let pending = events.iter().filter(|e| !e.remote_synced).count();

    println!("{} {}", "Config:".dimmed(), CalNoteConfig::config_path()?.display());
    println!("{} {}", "Data:".dimmed(), config.data_path().display());
    println!("{} {}", "Time zone:".dimmed(), app.engine().time_zone());

    match &config.remote.account {
        Some(account) if app.engine().credentials().is_signed_in() => println!(
            "{} {} ({})",
            "Remote:".dimmed(),
            account.green(),
            config.remote.calendar_id
        ),
        Some(account) => println!(
            "{} {} {}",
            "Remote:".dimmed(),
            account,
            "(signed out, run `calnote auth`)".yellow()
        ),
        None => println!("{} {}", "Remote:".dimmed(), "not connected".yellow()),
    }

    println!();
    println!("{} events, {} notes", events.len(), notes.len());
    if pending > 0 {
        println!(
            "{}",
            format!("{pending} event(s) not yet on the remote calendar").yellow()
        );
    }

    Ok(())
}
