/// Core data types for the pool chemistry compliance engine.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic and no I/O — only types (plus chrono timestamps and
/// serde derives so collaborators can persist engine output).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Chemical parameters
// ---------------------------------------------------------------------------

/// A measurable water chemistry parameter.
///
/// The derived `Ord` follows declaration order and is used only to give
/// collections of results a stable, canonical ordering — it carries no
/// chemical meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChemicalParameter {
    Ph,
    FreeChlorine,
    CombinedChlorine,
    TotalAlkalinity,
    CalciumHardness,
    CyanuricAcid,
    Temperature,
    Orp,
}

impl ChemicalParameter {
    /// All parameters, in canonical order.
    pub const ALL: [ChemicalParameter; 8] = [
        ChemicalParameter::Ph,
        ChemicalParameter::FreeChlorine,
        ChemicalParameter::CombinedChlorine,
        ChemicalParameter::TotalAlkalinity,
        ChemicalParameter::CalciumHardness,
        ChemicalParameter::CyanuricAcid,
        ChemicalParameter::Temperature,
        ChemicalParameter::Orp,
    ];

    /// Human-readable name for log and alert messages.
    pub fn label(&self) -> &'static str {
        match self {
            ChemicalParameter::Ph => "pH",
            ChemicalParameter::FreeChlorine => "free chlorine",
            ChemicalParameter::CombinedChlorine => "combined chlorine",
            ChemicalParameter::TotalAlkalinity => "total alkalinity",
            ChemicalParameter::CalciumHardness => "calcium hardness",
            ChemicalParameter::CyanuricAcid => "cyanuric acid",
            ChemicalParameter::Temperature => "temperature",
            ChemicalParameter::Orp => "ORP",
        }
    }
}

impl fmt::Display for ChemicalParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Pool categories
// ---------------------------------------------------------------------------

/// Facility category a pool belongs to. Determines which range catalog
/// entries apply — e.g. spas carry a hard 104°F temperature ceiling and
/// higher minimum disinfectant levels than standard pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoolCategory {
    Standard,
    Spa,
    Therapy,
    Kiddie,
}

impl PoolCategory {
    pub const ALL: [PoolCategory; 4] = [
        PoolCategory::Standard,
        PoolCategory::Spa,
        PoolCategory::Therapy,
        PoolCategory::Kiddie,
    ];
}

impl fmt::Display for PoolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolCategory::Standard => write!(f, "standard"),
            PoolCategory::Spa => write!(f, "spa"),
            PoolCategory::Therapy => write!(f, "therapy"),
            PoolCategory::Kiddie => write!(f, "kiddie"),
        }
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Classification severity, in ascending order.
///
/// The derived `Ord` is load-bearing: aggregation takes `max()` over
/// parameter severities and the alert lifecycle compares severities to
/// decide escalation. Keep this a plain ordered enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeverityLevel {
    Safe,
    Caution,
    Critical,
    Emergency,
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeverityLevel::Safe => write!(f, "safe"),
            SeverityLevel::Caution => write!(f, "caution"),
            SeverityLevel::Critical => write!(f, "critical"),
            SeverityLevel::Emergency => write!(f, "emergency"),
        }
    }
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// One technician submission of chemical measurements for a pool.
///
/// Immutable after creation: the engine only derives results from a reading,
/// it never mutates one. Values are keyed by parameter; a parameter the
/// technician did not measure is simply absent from the map (the validator
/// reports it as missing rather than defaulting it to safe).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalReading {
    pub pool_id: String,
    pub category: PoolCategory,
    pub timestamp: DateTime<Utc>,
    pub technician_id: String,
    /// BTreeMap keeps iteration in canonical parameter order, which keeps
    /// derived results deterministic.
    pub values: BTreeMap<ChemicalParameter, f64>,
}

impl ChemicalReading {
    /// The measured value for a parameter, if present in this reading.
    pub fn value(&self, parameter: ChemicalParameter) -> Option<f64> {
        self.values.get(&parameter).copied()
    }
}

// ---------------------------------------------------------------------------
// Range catalog types
// ---------------------------------------------------------------------------

/// Regulatory bounds for one (parameter, category) pair.
///
/// Band levels in ascending order:
///   critical_min ≤ caution_min ≤ safe_min ≤ safe_max ≤ caution_max ≤ critical_max
///
/// Asymmetric ranges are allowed, and parameters with only an upper bound
/// (combined chlorine, cyanuric acid) use `f64::NEG_INFINITY` for the lower
/// bounds. Reference data: created at catalog load, never mutated at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRange {
    pub parameter: ChemicalParameter,
    pub category: PoolCategory,
    pub safe_min: f64,
    pub safe_max: f64,
    pub caution_min: f64,
    pub caution_max: f64,
    pub critical_min: f64,
    pub critical_max: f64,
    pub unit: String,
}

impl ParameterRange {
    /// True if the band bounds satisfy the required ordering.
    pub fn is_ordered(&self) -> bool {
        self.critical_min <= self.caution_min
            && self.caution_min <= self.safe_min
            && self.safe_min <= self.safe_max
            && self.safe_max <= self.caution_max
            && self.caution_max <= self.critical_max
    }
}

// ---------------------------------------------------------------------------
// Classification results
// ---------------------------------------------------------------------------

/// Classification of a single parameter from a single reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterResult {
    pub parameter: ChemicalParameter,
    pub value: f64,
    pub severity: SeverityLevel,
    /// Signed gap to the nearest safe-range boundary: negative below
    /// `safe_min`, positive above `safe_max`, 0.0 when already safe.
    pub distance_to_safe: f64,
}

/// A parameter that could not be classified and was therefore excluded from
/// aggregation. Surfaced explicitly so downstream consumers cannot mistake
/// "no data" for "safe".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedParameter {
    pub parameter: ChemicalParameter,
    pub reason: ExclusionReason,
}

/// Why a parameter was excluded from aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ExclusionReason {
    /// The parameter was absent from the reading's value map.
    Missing,
    /// The value failed the physical-plausibility check — likely a sensor or
    /// data-entry fault, not a chemical emergency.
    Implausible { value: f64 },
}

/// Aggregated status of one pool, derived fresh from one reading.
///
/// Not persisted by the engine itself; storage is an external collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStatus {
    pub pool_id: String,
    pub timestamp: DateTime<Utc>,
    pub overall_severity: SeverityLevel,
    /// Sorted by parameter (canonical order), so identical inputs always
    /// produce an identical status regardless of input ordering.
    pub parameter_results: Vec<ParameterResult>,
    /// Stable identifiers of triggered compound-risk rules, e.g.
    /// `"zero-disinfectant"`.
    pub compound_risk_flags: Vec<String>,
    /// Parameters excluded from aggregation, with reasons.
    pub excluded: Vec<ExcludedParameter>,
}

// ---------------------------------------------------------------------------
// Trend types
// ---------------------------------------------------------------------------

/// Direction of drift for one parameter over a reading window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "increasing"),
            TrendDirection::Decreasing => write!(f, "decreasing"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

/// Trend analysis output for one pool/parameter window.
///
/// `projected_critical_at` is advisory only: it informs recommended-action
/// text and "check again by" guidance, never severity escalation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub parameter: ChemicalParameter,
    pub direction: TrendDirection,
    pub rate_per_hour: f64,
    pub projected_critical_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when classifying readings against the catalog.
///
/// All variants are recoverable at the caller level: skip or flag the
/// affected parameter and continue with the others. No exclusion is silent —
/// every parameter dropped from aggregation appears in `PoolStatus::excluded`.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The range catalog has no entry for the requested pair, or an entry
    /// violates the band ordering invariant. Misconfiguration is fatal for
    /// the affected parameter/category — never silently defaulted, because a
    /// guessed range could mask an unsafe pool.
    ConfigError(String),
    /// A required parameter was absent from a reading. Treated as unknown,
    /// not safe.
    MissingParameter(ChemicalParameter),
    /// A value outside physically possible bounds (negative chlorine, pH
    /// beyond 0–14). Surfaced distinctly from `critical` so the caller can
    /// flag a likely sensor or data-entry fault.
    ImplausibleReading {
        parameter: ChemicalParameter,
        value: f64,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::ConfigError(msg) => write!(f, "Range catalog error: {}", msg),
            EngineError::MissingParameter(p) => {
                write!(f, "Missing parameter in reading: {}", p)
            }
            EngineError::ImplausibleReading { parameter, value } => {
                write!(
                    f,
                    "Implausible {} reading: {} is outside physical bounds",
                    parameter, value
                )
            }
        }
    }
}

impl std::error::Error for EngineError {}
