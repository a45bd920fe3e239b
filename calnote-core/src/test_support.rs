//! In-memory remote calendar for tests. Counts every call it receives.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::credential::AccessToken;
use crate::date_range::SyncWindow;
use crate::error::{CalNoteError, CalNoteResult};
use crate::remote::{RemoteCalendar, RemoteEvent, RemoteTime};

#[derive(Default)]
pub struct FakeRemote {
    events: Mutex<HashMap<String, RemoteEvent>>,
    last_body: Mutex<Option<RemoteEvent>>,
    next_id: AtomicUsize,
    creates: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
    lists: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, event: RemoteEvent) {
        let id = event.id.clone().expect("seeded events need an id");
        self.events.lock().unwrap().insert(id, event);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.creates() + self.updates() + self.deletes() + self.lists.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<RemoteEvent> {
        self.last_body.lock().unwrap().clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.events.lock().unwrap().contains_key(id)
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check(&self, flag: &AtomicBool) -> CalNoteResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(CalNoteError::SyncFailed("503 Service Unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteCalendar for FakeRemote {
    async fn list_events(
        &self,
        _token: &AccessToken,
        _window: &SyncWindow,
    ) -> CalNoteResult<Vec<RemoteEvent>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.check(&self.fail_reads)?;
        Ok(self.events.lock().unwrap().values().cloned().collect())
    }

    async fn create_event(&self, _token: &AccessToken, event: &RemoteEvent) -> CalNoteResult<String> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        *self.last_body.lock().unwrap() = Some(event.clone());
        self.pause().await;
        self.check(&self.fail_writes)?;

        let id = format!("g-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut stored = event.clone();
        stored.id = Some(id.clone());
        self.events.lock().unwrap().insert(id.clone(), stored);
        Ok(id)
    }

    async fn update_event(
        &self,
        _token: &AccessToken,
        remote_ref: &str,
        event: &RemoteEvent,
    ) -> CalNoteResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        *self.last_body.lock().unwrap() = Some(event.clone());
        self.pause().await;
        self.check(&self.fail_writes)?;

        let mut stored = event.clone();
        stored.id = Some(remote_ref.to_string());
        self.events.lock().unwrap().insert(remote_ref.to_string(), stored);
        Ok(())
    }

    async fn delete_event(&self, _token: &AccessToken, remote_ref: &str) -> CalNoteResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.check(&self.fail_writes)?;
        self.events.lock().unwrap().remove(remote_ref);
        Ok(())
    }
}

/// A one-day timed remote event at 10:00-11:00 UTC.
pub fn remote_event(id: &str, summary: &str, y: i32, m: u32, d: u32) -> RemoteEvent {
    let day = NaiveDate::from_ymd_opt(y, m, d).unwrap();
    RemoteEvent {
        id: Some(id.to_string()),
        summary: summary.to_string(),
        description: String::new(),
        color_id: None,
        start: RemoteTime::DateTime {
            date_time: format!("{day}T10:00:00Z"),
            time_zone: Some("UTC".into()),
        },
        end: RemoteTime::DateTime {
            date_time: format!("{day}T11:00:00Z"),
            time_zone: Some("UTC".into()),
        },
        status: Some("confirmed".into()),
    }
}
