/// Durable storage for the observation history.
///
/// The schema is a single append-only `checks` table managed by
/// [`migrations::run_migrations`].
pub mod migrations;
pub mod repository;

pub use repository::LibsqlObservationStore;
