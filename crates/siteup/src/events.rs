//! Fan-out of transition events to notification subscribers.
//!
//! Every subscriber owns an unbounded queue drained by its own worker task, so
//! [`EventChannel::publish`] never waits on a subscriber. Workers retry failed
//! deliveries according to a [`DeliveryPolicy`], which makes delivery
//! at-least-once: a handler that fails after doing its work will see the same
//! event again. Retries are bounded by the policy's `max_attempts`; once those
//! are used up the event is logged at error level and dropped for that
//! subscriber. Events reach a subscriber in publish order.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::transition::TransitionEvent;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// For [`Subscriber`] implementations whose failure is not an HTTP call.
    #[error("Notification failed: {0}")]
    Failed(String),
}

/// A consumer of transition events, e.g. a chat notifier.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn handle(&self, event: &TransitionEvent) -> Result<(), NotifyError>;
}

/// Retry behaviour of a subscriber worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// Total attempts per event, including the first one.
    pub max_attempts: u32,
    /// Delay before retry `n` is `backoff * n`.
    pub backoff: Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, backoff: Duration::from_millis(500) }
    }
}

struct Registration {
    name: String,
    tx: mpsc::UnboundedSender<TransitionEvent>,
}

#[derive(Default)]
struct Registry {
    registrations: Vec<Registration>,
    workers: Vec<JoinHandle<()>>,
}

/// Cheaply cloneable handle to the subscriber registry.
#[derive(Clone, Default)]
pub struct EventChannel {
    registry: Arc<Mutex<Registry>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber and start its worker. Must be called inside a
    /// tokio runtime.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>, policy: DeliveryPolicy) {
        let (tx, rx) = mpsc::unbounded_channel();
        let name = subscriber.name().to_string();
        let worker = tokio::spawn(run_worker(subscriber, policy, rx));

        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.registrations.push(Registration { name: name.clone(), tx });
        registry.workers.push(worker);
        info!(subscriber = %name, "Subscriber registered");
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner).registrations.len()
    }

    /// Offer `event` to every subscriber without waiting for delivery.
    ///
    /// Returns how many subscribers accepted the event into their queue.
    pub fn publish(&self, event: TransitionEvent) -> usize {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);

        if registry.registrations.is_empty() {
            warn!(site_id = event.site.id, up = event.up, "No subscribers, transition event dropped");
            return 0;
        }

        registry.registrations.retain(|registration| {
            match registration.tx.send(event.clone()) {
                Ok(()) => true,
                Err(_) => {
                    warn!(subscriber = %registration.name, "Subscriber worker gone, unregistering");
                    false
                }
            }
        });

        debug!(
            site_id = event.site.id,
            up = event.up,
            subscribers = registry.registrations.len(),
            "Transition event published"
        );
        registry.registrations.len()
    }

    /// Stop accepting events and wait until every queued event was handled.
    pub async fn close(&self) {
        let workers = {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.registrations.clear();
            std::mem::take(&mut registry.workers)
        };

        for worker in workers {
            if let Err(e) = worker.await {
                error!("Subscriber worker terminated abnormally: {}", e);
            }
        }
    }
}

async fn run_worker(
    subscriber: Arc<dyn Subscriber>,
    policy: DeliveryPolicy,
    mut rx: mpsc::UnboundedReceiver<TransitionEvent>,
) {
    while let Some(event) = rx.recv().await {
        deliver(&subscriber, policy, event).await;
    }
    debug!(subscriber = %subscriber.name(), "Subscriber worker stopped");
}

async fn deliver(subscriber: &Arc<dyn Subscriber>, policy: DeliveryPolicy, event: TransitionEvent) {
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        // A panicking handler only takes down this attempt.
        let handler = subscriber.clone();
        let attempt_event = event.clone();
        let outcome = tokio::spawn(async move { handler.handle(&attempt_event).await }).await;

        match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => warn!(
                subscriber = %subscriber.name(),
                site_id = event.site.id,
                attempt,
                "Delivery failed: {}",
                e
            ),
            Err(e) => warn!(
                subscriber = %subscriber.name(),
                site_id = event.site.id,
                attempt,
                "Delivery panicked: {}",
                e
            ),
        }

        if attempt < max_attempts {
            tokio::time::sleep(policy.backoff * attempt).await;
        }
    }

    error!(
        subscriber = %subscriber.name(),
        site_id = event.site.id,
        up = event.up,
        "Giving up on transition event after {} attempts",
        max_attempts
    );
}
