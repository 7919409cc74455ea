/// Alert lifecycle management.
///
/// Submodules:
/// - `engine` — the open/escalate/suppress/resolve state machine over a
///   caller-owned `AlertState`.
/// - `actions` — the (parameter, severity, trend direction) →
///   recommended-action lookup.

pub mod actions;
pub mod engine;

pub use engine::{process, Alert, AlertState, AlertTarget, ProcessOutcome};
