/// Cross-parameter aggregation into a single pool status.
///
/// The base rule is the minimum safety bar regulators expect: the worst
/// single parameter dominates. On top of that, an ordered table of
/// compound-risk rules catches conjunctions that are jointly dangerous even
/// when no single parameter is — low chlorine plus high pH means the
/// disinfectant that is present barely works, which no per-parameter check
/// can see.
///
/// Determinism: results are normalized (sorted by parameter) before rule
/// matching, so aggregation of the same results in any order produces an
/// identical `PoolStatus`.

use chrono::{DateTime, Utc};

use crate::catalog::RangeCatalog;
use crate::logging::{self, Component};
use crate::model::{
    ChemicalParameter, ChemicalReading, EngineError, ExcludedParameter, ExclusionReason,
    ParameterResult, PoolStatus, SeverityLevel,
};
use crate::validate;

// ---------------------------------------------------------------------------
// Compound-risk rules
// ---------------------------------------------------------------------------

/// Stable flag for the exact-zero free chlorine rule.
pub const FLAG_ZERO_DISINFECTANT: &str = "zero-disinfectant";
/// Stable flag for the low-chlorine + high-pH conjunction.
pub const FLAG_DISINFECTION_COMPROMISED: &str = "disinfection-compromised";
/// Stable flag for chloramine buildup with adequate free chlorine.
pub const FLAG_CHLORAMINE_BUILDUP: &str = "chloramine-buildup";

/// One compound-risk rule: a predicate over the normalized results, a stable
/// flag appended when it fires, and an optional severity floor.
///
/// Rules are independent — adding a new compound risk is a new table entry,
/// not a change to existing rule logic. Every rule that fires appends its
/// flag, whether or not it escalates, so alerting can message the specific
/// compound condition distinctly from a single-parameter breach.
struct CompoundRule {
    flag: &'static str,
    escalate_to: Option<SeverityLevel>,
    applies: fn(&[ParameterResult]) -> bool,
}

static COMPOUND_RULES: &[CompoundRule] = &[
    // Exact zero free chlorine: no disinfection at all, regardless of every
    // other parameter. MAHC-style immediate closure.
    CompoundRule {
        flag: FLAG_ZERO_DISINFECTANT,
        escalate_to: Some(SeverityLevel::Emergency),
        applies: |results| {
            find(results, ChemicalParameter::FreeChlorine).is_some_and(|r| r.value == 0.0)
        },
    },
    // Free chlorine low (caution-low or critical) while pH is high
    // (caution-high or critical): disinfection compromised from two
    // directions at once — little chlorine, and what remains is ineffective
    // at high pH. Neither parameter alone need be critical.
    CompoundRule {
        flag: FLAG_DISINFECTION_COMPROMISED,
        escalate_to: Some(SeverityLevel::Emergency),
        applies: |results| {
            let chlorine_low = find(results, ChemicalParameter::FreeChlorine)
                .is_some_and(|r| {
                    r.severity == SeverityLevel::Critical
                        || (r.severity == SeverityLevel::Caution && r.distance_to_safe < 0.0)
                });
            let ph_high = find(results, ChemicalParameter::Ph).is_some_and(|r| {
                r.severity == SeverityLevel::Critical
                    || (r.severity == SeverityLevel::Caution && r.distance_to_safe > 0.0)
            });
            chlorine_low && ph_high
        },
    },
    // Critical combined chlorine while free chlorine is adequate: chloramine
    // buildup. An air-quality and comfort problem, not an acute drowning-
    // adjacent risk, so it flags without escalating beyond critical.
    CompoundRule {
        flag: FLAG_CHLORAMINE_BUILDUP,
        escalate_to: None,
        applies: |results| {
            let chloramine_critical = find(results, ChemicalParameter::CombinedChlorine)
                .is_some_and(|r| r.severity == SeverityLevel::Critical);
            let chlorine_adequate = find(results, ChemicalParameter::FreeChlorine)
                .is_some_and(|r| {
                    matches!(r.severity, SeverityLevel::Safe | SeverityLevel::Caution)
                });
            chloramine_critical && chlorine_adequate
        },
    },
];

fn find(results: &[ParameterResult], parameter: ChemicalParameter) -> Option<&ParameterResult> {
    results.iter().find(|r| r.parameter == parameter)
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Combines per-parameter results and exclusions into one `PoolStatus`.
///
/// Excluded parameters carry no severity — they are surfaced in
/// `PoolStatus::excluded` so "no data" can never read as "safe".
pub fn aggregate(
    pool_id: &str,
    timestamp: DateTime<Utc>,
    mut results: Vec<ParameterResult>,
    mut excluded: Vec<ExcludedParameter>,
) -> PoolStatus {
    results.sort_by_key(|r| r.parameter);
    excluded.sort_by_key(|e| e.parameter);

    let per_parameter_max = results
        .iter()
        .map(|r| r.severity)
        .max()
        .unwrap_or(SeverityLevel::Safe);

    let mut overall = per_parameter_max;
    let mut flags = Vec::new();
    for rule in COMPOUND_RULES {
        if (rule.applies)(&results) {
            flags.push(rule.flag.to_string());
            if let Some(floor) = rule.escalate_to {
                overall = overall.max(floor);
            }
        }
    }

    if overall > per_parameter_max {
        logging::warn(
            Component::Aggregator,
            Some(pool_id),
            &format!(
                "compound risk escalated status from {} to {} ({})",
                per_parameter_max,
                overall,
                flags.join(", ")
            ),
        );
    }

    PoolStatus {
        pool_id: pool_id.to_string(),
        timestamp,
        overall_severity: overall,
        parameter_results: results,
        compound_risk_flags: flags,
        excluded,
    }
}

/// Classifies every parameter present in a reading and aggregates the
/// results.
///
/// Per-parameter failures do not abort the reading: an implausible value is
/// excluded (with its reason) and the remaining parameters still classify.
/// Only `ConfigError` propagates — a catalog hole is misconfiguration and
/// producing a status that silently skips the affected parameter could mask
/// an unsafe pool.
pub fn evaluate_reading(
    reading: &ChemicalReading,
    catalog: &RangeCatalog,
) -> Result<PoolStatus, EngineError> {
    evaluate_reading_expecting(reading, &[], catalog)
}

/// Like `evaluate_reading`, but additionally treats every parameter in
/// `expected` as required: an expected parameter absent from the reading is
/// recorded as a `Missing` exclusion. It cannot silently count as safe, and
/// it cannot abort classification of the parameters that are present.
///
/// Facilities differ in which parameters a routine check covers (ORP only
/// exists where there is a controller probe), so the expected set comes
/// from the caller's facility configuration.
pub fn evaluate_reading_expecting(
    reading: &ChemicalReading,
    expected: &[ChemicalParameter],
    catalog: &RangeCatalog,
) -> Result<PoolStatus, EngineError> {
    let mut results = Vec::with_capacity(reading.values.len());
    let mut excluded = Vec::new();

    for &parameter in expected {
        if reading.value(parameter).is_none() {
            let reason = ExclusionReason::Missing;
            logging::log_exclusion(
                &reading.pool_id,
                &reason,
                &EngineError::MissingParameter(parameter),
            );
            excluded.push(ExcludedParameter { parameter, reason });
        }
    }

    for (&parameter, &value) in &reading.values {
        match validate::classify_value(value, parameter, reading.category, catalog) {
            Ok(result) => results.push(result),
            Err(err @ EngineError::ImplausibleReading { .. }) => {
                let reason = ExclusionReason::Implausible { value };
                logging::log_exclusion(&reading.pool_id, &reason, &err);
                excluded.push(ExcludedParameter { parameter, reason });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(aggregate(
        &reading.pool_id,
        reading.timestamp,
        results,
        excluded,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
