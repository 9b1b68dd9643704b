//! siteup - site reachability monitoring
//!
//! Probes monitored sites, keeps an append-only history of observations and
//! notifies subscribers whenever a site goes down or comes back up.
//!
//! The pipeline for one site is: [`Probe`] -> [`ObservationStore::most_recent`]
//! -> [`transition::detect`] -> [`EventChannel::publish`] ->
//! [`ObservationStore::append`], driven by the [`Orchestrator`].

pub mod config;
pub mod database;
pub mod events;
pub mod monitoring;
pub mod notifier;
pub mod observation;
pub mod orchestrator;
pub mod pool;
pub mod runtime;
pub mod site;
pub mod transition;
pub mod validation;

pub use config::{Config, ConfigError};
pub use database::LibsqlObservationStore;
pub use events::{DeliveryPolicy, EventChannel, NotifyError, Subscriber};
pub use monitoring::{
    CheckAllReport, CheckError, CheckOutcome, CheckScheduler, HttpProbe, Probe, ProbeError,
};
pub use notifier::SlackNotifier;
pub use observation::{MemoryObservationStore, Observation, ObservationStore, StoreError};
pub use orchestrator::Orchestrator;
pub use runtime::{Runtime, StartupError};
pub use site::{DirectoryError, Site, SiteDirectory, SiteId, StaticSiteDirectory};
pub use transition::{Transition, TransitionEvent};
