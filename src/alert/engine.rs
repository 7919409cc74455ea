/// Alert lifecycle state machine.
///
/// Per alert key `(pool_id, parameter | compound)`:
///
///   none → open → escalated ⇄ escalated → resolved → none
///
/// The open-alert set is an explicit value (`AlertState`) passed in and
/// returned updated — no global store. Successive calls for the same pool
/// must thread the previously returned state; that per-pool ordering is the
/// caller's only obligation, and calls for different pools share nothing.
/// `now` is the status timestamp, so the engine performs no clock reads.
///
/// Invariant: at most one open alert per key. A reading arriving at
/// unchanged severity is suppressed, not re-alerted; identity (`id`) is
/// stable across escalation because an escalating condition is one
/// continuing incident, not a new one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alert::actions;
use crate::config::EngineConfig;
use crate::logging::{self, Component};
use crate::model::{ChemicalParameter, ParameterResult, PoolStatus, SeverityLevel, TrendResult};

// ---------------------------------------------------------------------------
// Alert types
// ---------------------------------------------------------------------------

/// What an alert is about: one parameter, or a compound-risk condition.
/// Compound alerts are keyed independently of their constituent parameters
/// and can be open at the same time as them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertTarget {
    Parameter(ChemicalParameter),
    Compound,
}

impl std::fmt::Display for AlertTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertTarget::Parameter(p) => write!(f, "{}", p),
            AlertTarget::Compound => write!(f, "compound"),
        }
    }
}

/// One alert incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Stable across escalation; allocated from `AlertState`.
    pub id: u64,
    pub pool_id: String,
    pub target: AlertTarget,
    pub severity: SeverityLevel,
    pub opened_at: DateTime<Utc>,
    pub last_escalated_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub message: String,
    pub recommended_action: String,
    /// Compound-risk flags active when the alert was last updated, carried
    /// so the presentation layer can message the specific condition.
    pub compound_risk_flags: Vec<String>,
}

/// An open alert plus its resolution bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TrackedAlert {
    alert: Alert,
    /// When severity for this key first returned to safe, if it currently
    /// is. Cleared whenever a non-safe reading arrives, so the cooldown
    /// measures *sustained* safe time.
    safe_since: Option<DateTime<Utc>>,
}

/// Caller-owned open-alert set for any number of pools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    next_id: u64,
    open: Vec<TrackedAlert>,
}

impl AlertState {
    pub fn new() -> AlertState {
        AlertState::default()
    }

    /// All currently open alerts, in no particular order.
    pub fn open_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.open.iter().map(|t| &t.alert)
    }

    /// The open alert for a key, if one exists.
    pub fn open_alert(&self, pool_id: &str, target: &AlertTarget) -> Option<&Alert> {
        self.open
            .iter()
            .find(|t| t.alert.pool_id == pool_id && t.alert.target == *target)
            .map(|t| &t.alert)
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Result of one `process` call: the alerts that changed (opened, escalated,
/// or resolved — suppressed keys emit nothing) and the updated state to
/// thread into the next call for this pool.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    pub alerts: Vec<Alert>,
    pub state: AlertState,
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

/// Runs the alert state machine over a fresh `PoolStatus`.
///
/// Evaluates every parameter in the status plus the compound key, applying
/// for each: open (severity entered caution or worse with no open alert),
/// escalate (severity strictly above the alert's recorded severity),
/// suppress (unchanged or lower-but-not-safe severity), or resolve (safe
/// severity sustained for at least the configured cooldown). Keys with no
/// information in this status (parameter missing or excluded) are left
/// untouched — no data is not evidence of recovery.
pub fn process(
    status: &PoolStatus,
    trends: &[TrendResult],
    mut state: AlertState,
    config: &EngineConfig,
) -> ProcessOutcome {
    let now = status.timestamp;
    let mut emitted = Vec::new();

    for result in &status.parameter_results {
        let target = AlertTarget::Parameter(result.parameter);
        let trend = trends.iter().find(|t| t.parameter == result.parameter);
        let message = parameter_message(result);
        let action = actions::for_parameter(result, result.severity, trend);
        step_key(
            &mut state,
            &mut emitted,
            status,
            &target,
            result.severity,
            message,
            action,
            &[],
            now,
            config,
        );
    }

    // Compound key: alive while any compound rule fires, safe otherwise.
    let compound_severity = if status.compound_risk_flags.is_empty() {
        SeverityLevel::Safe
    } else {
        status.overall_severity
    };
    let message = compound_message(status);
    let action = actions::for_compound(&status.compound_risk_flags);
    step_key(
        &mut state,
        &mut emitted,
        status,
        &AlertTarget::Compound,
        compound_severity,
        message,
        action,
        &status.compound_risk_flags,
        now,
        config,
    );

    ProcessOutcome {
        alerts: emitted,
        state,
    }
}

#[allow(clippy::too_many_arguments)]
fn step_key(
    state: &mut AlertState,
    emitted: &mut Vec<Alert>,
    status: &PoolStatus,
    target: &AlertTarget,
    severity: SeverityLevel,
    message: String,
    recommended_action: String,
    flags: &[String],
    now: DateTime<Utc>,
    config: &EngineConfig,
) {
    let pool_id = &status.pool_id;
    let existing = state
        .open
        .iter()
        .position(|t| t.alert.pool_id == *pool_id && t.alert.target == *target);

    match existing {
        None => {
            if severity >= SeverityLevel::Caution {
                let alert = Alert {
                    id: state.allocate_id(),
                    pool_id: pool_id.clone(),
                    target: target.clone(),
                    severity,
                    opened_at: now,
                    last_escalated_at: None,
                    resolved_at: None,
                    message,
                    recommended_action,
                    compound_risk_flags: flags.to_vec(),
                };
                logging::warn(
                    Component::Alert,
                    Some(pool_id),
                    &format!("opened {} alert for {}", severity, target),
                );
                emitted.push(alert.clone());
                state.open.push(TrackedAlert {
                    alert,
                    safe_since: None,
                });
            }
        }
        Some(idx) => {
            if severity == SeverityLevel::Safe {
                // Start (or continue) the resolution cooldown. The alert
                // resolves only after severity has stayed safe for the full
                // cooldown — readings minutes apart while chemicals
                // stabilize must not flap it closed and open again.
                let safe_since = *state.open[idx].safe_since.get_or_insert(now);
                if now - safe_since >= config.resolution_cooldown() {
                    let mut done = state.open.remove(idx);
                    done.alert.resolved_at = Some(now);
                    logging::info(
                        Component::Alert,
                        Some(pool_id),
                        &format!("resolved alert for {}", target),
                    );
                    emitted.push(done.alert);
                }
            } else if severity > state.open[idx].alert.severity {
                let tracked = &mut state.open[idx];
                tracked.alert.severity = severity;
                tracked.alert.last_escalated_at = Some(now);
                tracked.alert.message = message;
                tracked.alert.recommended_action = recommended_action;
                tracked.alert.compound_risk_flags = flags.to_vec();
                tracked.safe_since = None;
                logging::warn(
                    Component::Alert,
                    Some(pool_id),
                    &format!("escalated alert for {} to {}", target, severity),
                );
                emitted.push(tracked.alert.clone());
            } else {
                // Unchanged or lower-but-not-safe: suppressed. A non-safe
                // reading interrupts any accumulating safe time.
                state.open[idx].safe_since = None;
            }
        }
    }
}

fn parameter_message(result: &ParameterResult) -> String {
    if result.distance_to_safe == 0.0 {
        format!("{} at {} is in range", result.parameter, result.value)
    } else {
        let side = if result.distance_to_safe < 0.0 {
            "below"
        } else {
            "above"
        };
        format!(
            "{} at {} is {} ({:.2} {} safe range)",
            result.parameter,
            result.value,
            result.severity,
            result.distance_to_safe.abs(),
            side
        )
    }
}

fn compound_message(status: &PoolStatus) -> String {
    if status.compound_risk_flags.is_empty() {
        "no compound risk conditions".to_string()
    } else {
        format!(
            "compound risk conditions active: {}",
            status.compound_risk_flags.join(", ")
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
