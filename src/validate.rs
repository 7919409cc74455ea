/// Per-parameter classification against the range catalog.
///
/// `classify` is a pure function: same reading, same catalog, same result.
/// No side effects, no clock, no I/O — everything the alerting layer needs
/// from a single measurement is in the returned `ParameterResult`.
///
/// Band walk: start at the safe band and move outward. Ties at a band
/// boundary resolve to the safer side, so a pool sitting exactly at a
/// regulatory minimum (pH exactly 7.2) reads safe, not caution — otherwise
/// every facility holding the legal minimum would alert continuously.

use crate::catalog::{plausible_bounds, RangeCatalog};
use crate::model::{
    ChemicalParameter, ChemicalReading, EngineError, ParameterRange, ParameterResult,
    PoolCategory, SeverityLevel,
};

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classifies one parameter of a reading.
///
/// Errors:
/// - `MissingParameter` if the reading has no value for `parameter` —
///   unknown is not safe, so the caller must exclude it visibly.
/// - `ImplausibleReading` if the value is non-finite or outside physical
///   bounds (negative chlorine, pH beyond 0–14). Never clamped: a physically
///   impossible value means the measurement itself is suspect.
/// - `ConfigError` if the catalog has no range for the pair.
pub fn classify(
    reading: &ChemicalReading,
    parameter: ChemicalParameter,
    category: PoolCategory,
    catalog: &RangeCatalog,
) -> Result<ParameterResult, EngineError> {
    let value = reading
        .value(parameter)
        .ok_or(EngineError::MissingParameter(parameter))?;
    classify_value(value, parameter, category, catalog)
}

/// Classifies a raw value directly. `classify` delegates here after pulling
/// the value out of the reading; the status facade calls this while
/// iterating a reading's value map.
pub fn classify_value(
    value: f64,
    parameter: ChemicalParameter,
    category: PoolCategory,
    catalog: &RangeCatalog,
) -> Result<ParameterResult, EngineError> {
    let (plausible_lo, plausible_hi) = plausible_bounds(parameter);
    if !value.is_finite() || value < plausible_lo || value > plausible_hi {
        return Err(EngineError::ImplausibleReading { parameter, value });
    }

    let range = catalog.lookup(parameter, category)?;
    Ok(ParameterResult {
        parameter,
        value,
        severity: severity_for(value, range),
        distance_to_safe: distance_to_safe(value, range),
    })
}

/// Walks the bands from safe outward. Each band is inclusive at its own
/// outer boundary, which is what makes boundary ties resolve safer-side.
fn severity_for(value: f64, range: &ParameterRange) -> SeverityLevel {
    if value >= range.safe_min && value <= range.safe_max {
        SeverityLevel::Safe
    } else if value >= range.caution_min && value <= range.caution_max {
        SeverityLevel::Caution
    } else {
        // Everything beyond the caution band is critical, including values
        // outside [critical_min, critical_max] — there is no "worse than
        // critical" per-parameter state. (Emergency is reserved for
        // compound-risk aggregation.)
        SeverityLevel::Critical
    }
}

/// Signed gap to the nearest safe boundary: 0.0 inside the safe band,
/// negative below it, positive above it.
fn distance_to_safe(value: f64, range: &ParameterRange) -> f64 {
    if value < range.safe_min {
        value - range.safe_min
    } else if value > range.safe_max {
        value - range.safe_max
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn catalog() -> RangeCatalog {
        RangeCatalog::mahc().expect("built-in catalog should load")
    }

    fn reading_with(parameter: ChemicalParameter, value: f64) -> ChemicalReading {
        let mut values = BTreeMap::new();
        values.insert(parameter, value);
        ChemicalReading {
            pool_id: "P1".to_string(),
            category: PoolCategory::Standard,
            timestamp: Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap(),
            technician_id: "T-100".to_string(),
            values,
        }
    }

    fn severity_of(parameter: ChemicalParameter, value: f64) -> SeverityLevel {
        classify_value(value, parameter, PoolCategory::Standard, &catalog())
            .expect("value should classify")
            .severity
    }

    // --- Band placement -----------------------------------------------------

    #[test]
    fn test_safe_midpoint_classifies_safe() {
        assert_eq!(severity_of(ChemicalParameter::Ph, 7.5), SeverityLevel::Safe);
        assert_eq!(
            severity_of(ChemicalParameter::FreeChlorine, 2.0),
            SeverityLevel::Safe
        );
    }

    #[test]
    fn test_caution_band_classifies_caution() {
        // Standard pH: safe 7.2–7.8, caution 7.0–8.0.
        assert_eq!(severity_of(ChemicalParameter::Ph, 7.1), SeverityLevel::Caution);
        assert_eq!(severity_of(ChemicalParameter::Ph, 7.9), SeverityLevel::Caution);
    }

    #[test]
    fn test_outside_caution_classifies_critical() {
        assert_eq!(severity_of(ChemicalParameter::Ph, 6.8), SeverityLevel::Critical);
        assert_eq!(severity_of(ChemicalParameter::Ph, 8.2), SeverityLevel::Critical);
    }

    #[test]
    fn test_beyond_critical_band_still_classifies_critical() {
        // pH 8.9 is above critical_max (8.5) but still physically plausible.
        // There is no distinct "worse than critical" state.
        assert_eq!(severity_of(ChemicalParameter::Ph, 8.9), SeverityLevel::Critical);
        assert_eq!(
            severity_of(ChemicalParameter::FreeChlorine, 50.0),
            SeverityLevel::Critical
        );
    }

    // --- Boundary inclusivity -----------------------------------------------

    #[test]
    fn test_value_exactly_at_safe_min_is_safe() {
        // pH exactly at the regulatory minimum must not over-alert.
        assert_eq!(severity_of(ChemicalParameter::Ph, 7.2), SeverityLevel::Safe);
        assert_eq!(
            severity_of(ChemicalParameter::FreeChlorine, 1.0),
            SeverityLevel::Safe
        );
    }

    #[test]
    fn test_value_exactly_at_safe_max_is_safe() {
        assert_eq!(severity_of(ChemicalParameter::Ph, 7.8), SeverityLevel::Safe);
        assert_eq!(
            severity_of(ChemicalParameter::FreeChlorine, 4.0),
            SeverityLevel::Safe
        );
    }

    #[test]
    fn test_value_exactly_at_caution_boundary_is_caution_not_critical() {
        // Ties at the caution/critical boundary resolve to the safer side too.
        assert_eq!(severity_of(ChemicalParameter::Ph, 7.0), SeverityLevel::Caution);
        assert_eq!(severity_of(ChemicalParameter::Ph, 8.0), SeverityLevel::Caution);
        assert_eq!(
            severity_of(ChemicalParameter::FreeChlorine, 0.5),
            SeverityLevel::Caution
        );
    }

    #[test]
    fn test_spa_temperature_at_104_is_safe_above_is_critical() {
        let catalog = catalog();
        let at_ceiling =
            classify_value(104.0, ChemicalParameter::Temperature, PoolCategory::Spa, &catalog)
                .unwrap();
        assert_eq!(at_ceiling.severity, SeverityLevel::Safe);
        let above =
            classify_value(104.5, ChemicalParameter::Temperature, PoolCategory::Spa, &catalog)
                .unwrap();
        assert_eq!(above.severity, SeverityLevel::Critical);
    }

    // --- Monotonicity -------------------------------------------------------

    #[test]
    fn test_severity_non_decreasing_away_from_safe_midpoint() {
        // Sweep pH from the safe midpoint outward in both directions and
        // check there is no island of lower severity past a worse band.
        let catalog = catalog();
        let range = catalog
            .lookup(ChemicalParameter::Ph, PoolCategory::Standard)
            .unwrap()
            .clone();
        let midpoint = (range.safe_min + range.safe_max) / 2.0;
        for direction in [-1.0, 1.0] {
            let mut last = SeverityLevel::Safe;
            for step in 0..140 {
                let value = midpoint + direction * (step as f64) * 0.05;
                if !(0.0..=14.0).contains(&value) {
                    break;
                }
                let severity =
                    severity_of(ChemicalParameter::Ph, (value * 1000.0).round() / 1000.0);
                assert!(
                    severity >= last,
                    "severity decreased from {:?} to {:?} at pH {}",
                    last,
                    severity,
                    value
                );
                last = severity;
            }
        }
    }

    // --- Distance to safe ---------------------------------------------------

    #[test]
    fn test_distance_to_safe_is_zero_inside_safe_band() {
        let result = classify_value(7.5, ChemicalParameter::Ph, PoolCategory::Standard, &catalog())
            .unwrap();
        assert_eq!(result.distance_to_safe, 0.0);
    }

    #[test]
    fn test_distance_to_safe_is_signed() {
        let low = classify_value(0.4, ChemicalParameter::FreeChlorine, PoolCategory::Standard, &catalog())
            .unwrap();
        assert!((low.distance_to_safe - (-0.6)).abs() < 1e-9); // 0.4 - 1.0
        let high = classify_value(8.2, ChemicalParameter::Ph, PoolCategory::Standard, &catalog())
            .unwrap();
        assert!((high.distance_to_safe - 0.4).abs() < 1e-9); // 8.2 - 7.8
    }

    // --- Errors -------------------------------------------------------------

    #[test]
    fn test_missing_parameter_is_an_error_not_safe() {
        let reading = reading_with(ChemicalParameter::Ph, 7.4);
        let err = classify(
            &reading,
            ChemicalParameter::FreeChlorine,
            PoolCategory::Standard,
            &catalog(),
        )
        .unwrap_err();
        assert_eq!(err, EngineError::MissingParameter(ChemicalParameter::FreeChlorine));
    }

    #[test]
    fn test_negative_chlorine_is_implausible_not_critical() {
        let err = classify_value(
            -0.5,
            ChemicalParameter::FreeChlorine,
            PoolCategory::Standard,
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::ImplausibleReading { .. }));
    }

    #[test]
    fn test_ph_outside_0_to_14_is_implausible() {
        for value in [-1.0, 14.7] {
            let err = classify_value(value, ChemicalParameter::Ph, PoolCategory::Standard, &catalog())
                .unwrap_err();
            assert!(
                matches!(err, EngineError::ImplausibleReading { .. }),
                "pH {} should be implausible",
                value
            );
        }
    }

    #[test]
    fn test_non_finite_value_is_implausible() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = classify_value(value, ChemicalParameter::Ph, PoolCategory::Standard, &catalog())
                .unwrap_err();
            assert!(matches!(err, EngineError::ImplausibleReading { .. }));
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let catalog = catalog();
        let reading = reading_with(ChemicalParameter::Ph, 7.9);
        let first = classify(&reading, ChemicalParameter::Ph, PoolCategory::Standard, &catalog)
            .unwrap();
        let second = classify(&reading, ChemicalParameter::Ph, PoolCategory::Standard, &catalog)
            .unwrap();
        assert_eq!(first, second);
    }
}
