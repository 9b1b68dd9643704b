/// Monitoring engine module - reachability probing and scheduling
///
/// - `probe`: the URL -> up/down check
/// - `scheduler`: periodic "check all" trigger
/// - `types`: check outcomes and errors
pub mod probe;
pub mod scheduler;
pub mod types;

pub use probe::{HttpProbe, Probe, ProbeError};
pub use scheduler::CheckScheduler;
pub use types::{CheckAllReport, CheckError, CheckOutcome, SiteFailure};
