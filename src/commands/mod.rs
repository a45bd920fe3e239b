pub mod auth;
pub mod delete;
pub mod edit;
pub mod list;
pub mod new;
pub mod status;
pub mod sync;

use anyhow::Result;
use calnote_core::{CalNoteConfig, FileStore, LocalStore, Notebook, SyncEngine};
use calnote_provider_google::{GoogleCalendar, GoogleSession};

pub type App = Notebook<FileStore, GoogleCalendar, GoogleSession>;

/// Open the local store and wire it to the configured Google account.
pub async fn open(config: &CalNoteConfig) -> Result<App> {
    let store = FileStore::open(config.data_path()).await?;
    let calendar = GoogleCalendar::new(config.remote.calendar_id.clone());
    let session = GoogleSession::for_account(config.remote.account.clone())?;

    let engine = SyncEngine::new(calendar, session, config.resolved_time_zone()?)
        .with_timeout(config.call_timeout());

    Ok(Notebook::new(store, engine))
}

/// Find the single item whose id is `id` or starts with it.
pub async fn resolve_id(app: &App, id: &str) -> Result<String> {
    let ids = app.store().all().await?.into_iter().map(|item| item.id);
    match_id(id, ids)
}

fn match_id(id: &str, ids: impl IntoIterator<Item = String>) -> Result<String> {
    anyhow::ensure!(!id.trim().is_empty(), "Item id must not be empty");

    let mut matches = Vec::new();
    for candidate in ids {
        if candidate == id {
            return Ok(candidate);
        }
        if candidate.starts_with(id) {
            matches.push(candidate);
        }
    }

    match matches.as_slice() {
        [only] => Ok(only.clone()),
        [] => anyhow::bail!("No event or note with id '{id}'"),
        _ => anyhow::bail!("Id '{id}' is ambiguous ({} matches)", matches.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Vec<String> {
        vec!["4f2a9c".into(), "4f2b11".into(), "9e0d77".into()]
    }

    #[test]
    fn test_unique_prefix_resolves() {
        assert_eq!(match_id("9e", ids()).unwrap(), "9e0d77");
        assert_eq!(match_id("4f2a9c", ids()).unwrap(), "4f2a9c");
    }

    #[test]
    fn test_ambiguous_prefix_is_rejected() {
        let err = match_id("4f2", ids()).unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let single = vec!["4f2a9c".to_string()];
        assert!(match_id("", single.clone()).is_err());
        assert!(match_id("  ", single).is_err());
        assert!(match_id("", Vec::new()).is_err());
    }
}
