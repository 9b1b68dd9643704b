//! Test doubles shared by the integration tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use siteup::{
    DeliveryPolicy, EventChannel, MemoryObservationStore, NotifyError, Observation,
    ObservationStore, Orchestrator, Probe, ProbeError, Site, SiteId, StaticSiteDirectory,
    StoreError, Subscriber, TransitionEvent,
};

#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Up,
    Down,
    Fail,
}

/// Probe answering from a per-URL script. An exhausted script fails.
#[derive(Default)]
pub struct ScriptedProbe {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
}

impl ScriptedProbe {
    pub fn push(&self, url: &str, replies: impl IntoIterator<Item = Reply>) {
        self.scripts.lock().unwrap().entry(url.to_string()).or_default().extend(replies);
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn probe(&self, url: &str) -> Result<bool, ProbeError> {
        let reply = self.scripts.lock().unwrap().get_mut(url).and_then(VecDeque::pop_front);
        // Give concurrent checks a chance to interleave.
        tokio::task::yield_now().await;
        match reply {
            Some(Reply::Up) => Ok(true),
            Some(Reply::Down) => Ok(false),
            Some(Reply::Fail) | None => Err(ProbeError::Unreachable(format!("{url}: connection refused"))),
        }
    }
}

#[derive(Default)]
pub struct RecordingSubscriber {
    events: Mutex<Vec<TransitionEvent>>,
}

impl RecordingSubscriber {
    pub fn events(&self) -> Vec<TransitionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, site_id: SiteId) -> Vec<bool> {
        self.events().into_iter().filter(|e| e.site.id == site_id).map(|e| e.up).collect()
    }
}

#[async_trait]
impl Subscriber for RecordingSubscriber {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn handle(&self, event: &TransitionEvent) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Subscriber that always fails.
pub struct BrokenSubscriber;

#[async_trait]
impl Subscriber for BrokenSubscriber {
    fn name(&self) -> &str {
        "broken"
    }

    async fn handle(&self, _event: &TransitionEvent) -> Result<(), NotifyError> {
        Err(NotifyError::Failed("webhook returned 500".into()))
    }
}

/// Memory store whose appends can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryObservationStore,
    pub fail_appends: AtomicBool,
}

#[async_trait]
impl ObservationStore for FlakyStore {
    async fn append(
        &self,
        site_id: SiteId,
        up: bool,
        checked_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk full".into()));
        }
        self.inner.append(site_id, up, checked_at).await
    }

    async fn most_recent(&self, site_id: SiteId) -> Result<Option<Observation>, StoreError> {
        self.inner.most_recent(site_id).await
    }

    async fn recent(&self, site_id: SiteId, limit: usize) -> Result<Vec<Observation>, StoreError> {
        self.inner.recent(site_id, limit).await
    }
}

pub fn quick_policy() -> DeliveryPolicy {
    DeliveryPolicy { max_attempts: 2, backoff: Duration::from_millis(1) }
}

pub fn site(id: SiteId) -> Site {
    Site::new(id, format!("https://site-{id}.example"))
}

pub struct Harness<S> {
    pub orchestrator: Orchestrator,
    pub probe: Arc<ScriptedProbe>,
    pub store: Arc<S>,
    pub recorder: Arc<RecordingSubscriber>,
    pub events: EventChannel,
}

impl<S: ObservationStore + 'static> Harness<S> {
    pub fn new(sites: Vec<Site>, store: S) -> Self {
        let probe = Arc::new(ScriptedProbe::default());
        let store = Arc::new(store);
        let recorder = Arc::new(RecordingSubscriber::default());
        let events = EventChannel::new();
        events.subscribe(recorder.clone(), quick_policy());

        let orchestrator = Orchestrator::new(
            Arc::new(StaticSiteDirectory::new(sites)),
            probe.clone(),
            store.clone(),
            events.clone(),
        );

        Self { orchestrator, probe, store, recorder, events }
    }

    /// Wait for every published event to reach the subscribers.
    pub async fn drain(&self) {
        self.events.close().await;
    }

    /// Persisted `up` values of a site, oldest first.
    pub async fn history(&self, site_id: SiteId) -> Vec<Observation> {
        let mut history = self.store.recent(site_id, usize::MAX).await.unwrap();
        history.reverse();
        history
    }
}

/// Transitions implied by a persisted history, starting from "up".
pub fn expected_transitions(history: &[Observation]) -> Vec<bool> {
    let mut previous = true;
    let mut transitions = Vec::new();
    for observation in history {
        if observation.up != previous {
            transitions.push(observation.up);
        }
        previous = observation.up;
    }
    transitions
}
