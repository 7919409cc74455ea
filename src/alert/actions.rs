/// Recommended-action lookup for alerts.
///
/// Actions are derived from (parameter, severity, trend direction) plus the
/// compound-risk flags, as a lookup rather than free-form logic, so the
/// guidance for a given condition is stable and reviewable in one place.
/// Exact wording is a presentation concern — the alert also carries the
/// structured fields (target, severity, flags) so a renderer can build its
/// own copy without re-deriving domain logic.

use chrono::{DateTime, Utc};

use crate::model::{ChemicalParameter, ParameterResult, SeverityLevel, TrendDirection, TrendResult};
use crate::status::{
    FLAG_CHLORAMINE_BUILDUP, FLAG_DISINFECTION_COMPROMISED, FLAG_ZERO_DISINFECTANT,
};

// ---------------------------------------------------------------------------
// Parameter actions
// ---------------------------------------------------------------------------

/// Recommended action for a single-parameter alert.
pub fn for_parameter(
    result: &ParameterResult,
    severity: SeverityLevel,
    trend: Option<&TrendResult>,
) -> String {
    let direction = trend.map(|t| t.direction).unwrap_or(TrendDirection::Stable);
    let low = result.distance_to_safe < 0.0;
    let base = parameter_action(result.parameter, severity, low, direction);

    match trend.and_then(|t| t.projected_critical_at) {
        Some(at) if severity < SeverityLevel::Critical => {
            format!("{}; check again before {}", base, format_check_by(at))
        }
        _ => base.to_string(),
    }
}

fn parameter_action(
    parameter: ChemicalParameter,
    severity: SeverityLevel,
    low: bool,
    direction: TrendDirection,
) -> &'static str {
    use ChemicalParameter::*;
    use SeverityLevel::*;
    match (parameter, low) {
        (FreeChlorine, true) => match (severity, direction) {
            (Critical | Emergency, _) => "close pool; shock to breakpoint and hold until residual is back in range",
            (_, TrendDirection::Decreasing) => "add shock treatment; re-test in 1 hour",
            _ => "add chlorine; re-test in 1 hour",
        },
        (FreeChlorine, false) => match severity {
            Critical | Emergency => "close pool; stop chlorine feed and dilute or dechlorinate before reopening",
            _ => "stop chlorine feed; re-test before next session",
        },
        (Ph, true) => match severity {
            Critical | Emergency => "close pool; dose soda ash and recirculate until pH recovers",
            _ => "add pH increaser; re-test in 1 hour",
        },
        (Ph, false) => match severity {
            Critical | Emergency => "close pool; dose acid and recirculate until pH recovers",
            _ => "add pH decreaser; re-test in 1 hour",
        },
        (CombinedChlorine, _) => "superchlorinate to breakpoint; increase fresh-air ventilation",
        (TotalAlkalinity, true) => "add sodium bicarbonate; re-test in 4 hours",
        (TotalAlkalinity, false) => "dose acid gradually; re-test in 4 hours",
        (CalciumHardness, true) => "add calcium chloride to protect plaster and fittings",
        (CalciumHardness, false) => "partially drain and refill with fresh water",
        (CyanuricAcid, _) => "partially drain and refill to dilute stabilizer",
        (Temperature, true) => "raise heater setpoint; verify heater operation",
        (Temperature, false) => match severity {
            Critical | Emergency => "close pool; shut off heater until temperature is back in range",
            _ => "lower heater setpoint; re-check within the hour",
        },
        (Orp, true) => "verify ORP probe calibration and chlorine feed operation",
        (Orp, false) => "verify ORP probe calibration; check for over-feeding",
    }
}

// ---------------------------------------------------------------------------
// Compound actions
// ---------------------------------------------------------------------------

/// Recommended action for a compound-risk alert. The first (most severe)
/// matching flag drives the instruction; rules are ordered by urgency.
pub fn for_compound(flags: &[String]) -> String {
    for flag in flags {
        match flag.as_str() {
            FLAG_ZERO_DISINFECTANT => {
                return "close pool immediately: no disinfectant residual; \
                        shock and hold closed until free chlorine is back in range"
                    .to_string();
            }
            FLAG_DISINFECTION_COMPROMISED => {
                return "close pool immediately: disinfection compromised; \
                        lower pH and raise free chlorine before reopening"
                    .to_string();
            }
            FLAG_CHLORAMINE_BUILDUP => {
                return "superchlorinate to breakpoint and increase ventilation; \
                        chloramine levels elevated"
                    .to_string();
            }
            _ => {}
        }
    }
    "review combined parameter conditions against operating procedures".to_string()
}

fn format_check_by(at: DateTime<Utc>) -> String {
    at.format("%H:%M UTC on %b %-d").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
