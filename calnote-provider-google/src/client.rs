//! Google Calendar v3 REST client.

use async_trait::async_trait;
use calnote_core::{
    AccessToken, CalNoteError, CalNoteResult, RemoteCalendar, RemoteEvent, SyncWindow,
};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use url::Url;

pub const API_BASE: &str = "https://www.googleapis.com/calendar/v3";

const PAGE_SIZE: &str = "250";

pub struct GoogleCalendar {
    http: reqwest::Client,
    base_url: String,
    calendar_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<serde_json::Value>,
    next_page_token: Option<String>,
}

fn failed(what: &str, e: impl std::fmt::Display) -> CalNoteError {
    CalNoteError::SyncFailed(format!("{what}: {e}"))
}

/// Turn a non-success response into `SyncFailed`, keeping Google's message.
async fn check(what: &str, response: Response) -> CalNoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(CalNoteError::SyncFailed(format!("{what}: {status} {body}")))
}

impl GoogleCalendar {
    pub fn new(calendar_id: impl Into<String>) -> Self {
        GoogleCalendar {
            http: reqwest::Client::new(),
            base_url: API_BASE.to_string(),
            calendar_id: calendar_id.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// `{base}/calendars/{calendar_id}/events[/{event_id}]`, segments escaped.
    fn events_url(&self, event_id: Option<&str>) -> CalNoteResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CalNoteError::Config(format!("invalid Google API url: {e}")))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| CalNoteError::Config("Google API url cannot be a base".into()))?;
            segments
                .pop_if_empty()
                .extend(["calendars", self.calendar_id.as_str(), "events"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl RemoteCalendar for GoogleCalendar {
    async fn list_events(
        &self,
        token: &AccessToken,
        window: &SyncWindow,
    ) -> CalNoteResult<Vec<RemoteEvent>> {
        let url = self.events_url(None)?;
        let time_min = window.from.to_rfc3339();
        let time_max = window.to.to_rfc3339();

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("maxResults", PAGE_SIZE),
            ];
            if let Some(page) = page_token.as_deref() {
                query.push(("pageToken", page));
            }

            let response = self
                .http
                .get(url.clone())
                .bearer_auth(token.as_str())
                .query(&query)
                .send()
                .await
                .map_err(|e| failed("list events", e))?;

            let page: EventsPage = check("list events", response)
                .await?
                .json()
                .await
                .map_err(|e| failed("list events", e))?;

            for item in page.items {
                match serde_json::from_value::<RemoteEvent>(item) {
                    Ok(event) => events.push(event),
                    Err(e) => tracing::warn!(error = %e, "skipping unreadable remote event"),
                }
            }

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(calendar = %self.calendar_id, count = events.len(), "listed remote events");
        Ok(events)
    }

    async fn create_event(&self, token: &AccessToken, event: &RemoteEvent) -> CalNoteResult<String> {
        let response = self
            .http
            .post(self.events_url(None)?)
            .bearer_auth(token.as_str())
            .json(event)
            .send()
            .await
            .map_err(|e| failed("create event", e))?;

        let created: RemoteEvent = check("create event", response)
            .await?
            .json()
            .await
            .map_err(|e| failed("create event", e))?;

        created
            .id
            .ok_or_else(|| CalNoteError::SyncFailed("create event: response has no id".into()))
    }

    async fn update_event(
        &self,
        token: &AccessToken,
        remote_ref: &str,
        event: &RemoteEvent,
    ) -> CalNoteResult<()> {
        let response = self
            .http
            .put(self.events_url(Some(remote_ref))?)
            .bearer_auth(token.as_str())
            .json(event)
            .send()
            .await
            .map_err(|e| failed("update event", e))?;

        check("update event", response).await?;
        Ok(())
    }

    async fn delete_event(&self, token: &AccessToken, remote_ref: &str) -> CalNoteResult<()> {
        let response = self
            .http
            .delete(self.events_url(Some(remote_ref))?)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| failed("delete event", e))?;

        // Already gone counts as deleted.
        if matches!(response.status(), StatusCode::GONE | StatusCode::NOT_FOUND) {
            tracing::debug!(%remote_ref, "remote event was already deleted");
            return Ok(());
        }

        check("delete event", response).await?;
        Ok(())
    }
}
