//! Prioritized failover: order candidates, probe them, commit the first
//! reachable one to a time-boxed cache.

pub mod attempt;
pub mod candidate;
pub mod errors;
pub mod orchestrator;
pub mod probe;
pub mod selector;

pub use attempt::{attempt_in_order, AttemptOutcome, AttemptPolicy};
pub use candidate::{Candidate, Ranked};
pub use errors::{ProbeError, SelectionError};
pub use orchestrator::{
    FailoverOrchestrator, FailoverState, OrchestratorConfig, ProbeStrategy, Resolution,
    ResolutionSource,
};
pub use probe::{EndpointProbe, HttpProbe, HttpProbeConfig, ProbeResult};
pub use selector::{first_by_priority, select, SelectionPolicy};
