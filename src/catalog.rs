/// Range catalog for the pool chemistry compliance engine.
///
/// Defines the canonical MAHC-derived safe/caution/critical bounds for every
/// (parameter, category) pair, along with physical-plausibility limits.
/// This is the single source of truth for regulatory ranges — all other
/// modules look ranges up here rather than hardcoding thresholds, so a
/// regulatory update or a new pool category is a data change, not a code
/// change.
///
/// The catalog is immutable after construction. Construction validates the
/// band ordering invariant
/// (critical_min ≤ caution_min ≤ safe_min ≤ safe_max ≤ caution_max ≤ critical_max)
/// once and fails fast with `ConfigError` on violation; `lookup` fails with
/// `ConfigError` for a missing pair instead of silently defaulting, because
/// a guessed range could mask an unsafe pool.

use crate::model::{ChemicalParameter, EngineError, ParameterRange, PoolCategory};
use serde::Deserialize;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Built-in MAHC-derived ranges
// ---------------------------------------------------------------------------

/// One row of the built-in range table. A row may apply to several
/// categories; the builder expands it into one `ParameterRange` per category.
struct RangeRow {
    parameter: ChemicalParameter,
    categories: &'static [PoolCategory],
    /// critical_min, caution_min, safe_min, safe_max, caution_max, critical_max
    bands: [f64; 6],
    unit: &'static str,
}

const NEG_INF: f64 = f64::NEG_INFINITY;
const INF: f64 = f64::INFINITY;

const ALL_CATEGORIES: &[PoolCategory] = &PoolCategory::ALL;
const BATHER_POOLS: &[PoolCategory] = &[PoolCategory::Standard, PoolCategory::Kiddie];
const HOT_WATER: &[PoolCategory] = &[PoolCategory::Spa, PoolCategory::Therapy];

/// MAHC-derived range table.
///
/// Sources: CDC Model Aquatic Health Code §5.7 (disinfection and water
/// balance) plus common industry practice for the parameters the MAHC
/// leaves to the operator (calcium hardness, ORP targets).
///
/// Notes on specific rows:
///   - Combined chlorine and cyanuric acid have only upper bounds; their
///     lower band edges are negative infinity.
///   - Spa and therapy temperature encodes the MAHC 104°F hard ceiling by
///     making the upper caution band empty (safe_max == caution_max), so
///     anything above 104 classifies critical immediately.
///   - Kiddie pools carry a tighter chlorine band than standard pools:
///     shallow water and high bather density deplete disinfectant quickly.
static MAHC_RANGES: &[RangeRow] = &[
    RangeRow {
        parameter: ChemicalParameter::Ph,
        categories: ALL_CATEGORIES,
        bands: [6.5, 7.0, 7.2, 7.8, 8.0, 8.5],
        unit: "pH",
    },
    RangeRow {
        parameter: ChemicalParameter::FreeChlorine,
        categories: &[PoolCategory::Standard],
        bands: [0.0, 0.5, 1.0, 4.0, 6.0, 10.0],
        unit: "ppm",
    },
    RangeRow {
        parameter: ChemicalParameter::FreeChlorine,
        categories: &[PoolCategory::Kiddie],
        bands: [0.0, 1.0, 1.5, 3.0, 5.0, 10.0],
        unit: "ppm",
    },
    RangeRow {
        parameter: ChemicalParameter::FreeChlorine,
        categories: HOT_WATER,
        bands: [0.0, 2.0, 3.0, 6.0, 8.0, 10.0],
        unit: "ppm",
    },
    RangeRow {
        parameter: ChemicalParameter::CombinedChlorine,
        categories: ALL_CATEGORIES,
        bands: [NEG_INF, NEG_INF, NEG_INF, 0.4, 0.8, 4.0],
        unit: "ppm",
    },
    RangeRow {
        parameter: ChemicalParameter::TotalAlkalinity,
        categories: ALL_CATEGORIES,
        bands: [40.0, 60.0, 80.0, 120.0, 180.0, 240.0],
        unit: "ppm",
    },
    RangeRow {
        parameter: ChemicalParameter::CalciumHardness,
        categories: BATHER_POOLS,
        bands: [100.0, 150.0, 200.0, 400.0, 500.0, 1000.0],
        unit: "ppm",
    },
    RangeRow {
        parameter: ChemicalParameter::CalciumHardness,
        categories: HOT_WATER,
        bands: [50.0, 100.0, 150.0, 250.0, 400.0, 800.0],
        unit: "ppm",
    },
    RangeRow {
        parameter: ChemicalParameter::CyanuricAcid,
        categories: ALL_CATEGORIES,
        bands: [NEG_INF, NEG_INF, NEG_INF, 50.0, 90.0, 300.0],
        unit: "ppm",
    },
    RangeRow {
        parameter: ChemicalParameter::Temperature,
        categories: &[PoolCategory::Standard],
        bands: [60.0, 70.0, 77.0, 84.0, 90.0, 100.0],
        unit: "°F",
    },
    RangeRow {
        parameter: ChemicalParameter::Temperature,
        categories: &[PoolCategory::Kiddie],
        bands: [65.0, 75.0, 82.0, 90.0, 95.0, 100.0],
        unit: "°F",
    },
    RangeRow {
        parameter: ChemicalParameter::Temperature,
        categories: &[PoolCategory::Spa],
        bands: [80.0, 90.0, 95.0, 104.0, 104.0, 110.0],
        unit: "°F",
    },
    RangeRow {
        parameter: ChemicalParameter::Temperature,
        categories: &[PoolCategory::Therapy],
        bands: [80.0, 88.0, 92.0, 104.0, 104.0, 110.0],
        unit: "°F",
    },
    RangeRow {
        parameter: ChemicalParameter::Orp,
        categories: ALL_CATEGORIES,
        bands: [500.0, 600.0, 650.0, 850.0, 900.0, 950.0],
        unit: "mV",
    },
];

// ---------------------------------------------------------------------------
// Physical plausibility
// ---------------------------------------------------------------------------

/// Physically possible bounds for a parameter, independent of category.
///
/// Values outside these bounds indicate a sensor or data-entry fault, not a
/// chemical condition; the validator raises `ImplausibleReading` for them
/// rather than classifying them critical.
pub fn plausible_bounds(parameter: ChemicalParameter) -> (f64, f64) {
    match parameter {
        ChemicalParameter::Ph => (0.0, 14.0),
        ChemicalParameter::FreeChlorine => (0.0, 100.0),
        ChemicalParameter::CombinedChlorine => (0.0, 100.0),
        ChemicalParameter::TotalAlkalinity => (0.0, 1000.0),
        ChemicalParameter::CalciumHardness => (0.0, 2000.0),
        ChemicalParameter::CyanuricAcid => (0.0, 1000.0),
        ChemicalParameter::Temperature => (32.0, 212.0),
        ChemicalParameter::Orp => (-2000.0, 2000.0),
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable lookup structure over validated `ParameterRange` entries.
#[derive(Debug, Clone)]
pub struct RangeCatalog {
    entries: HashMap<(ChemicalParameter, PoolCategory), ParameterRange>,
}

impl RangeCatalog {
    /// Builds the catalog from the built-in MAHC-derived table.
    pub fn mahc() -> Result<RangeCatalog, EngineError> {
        let mut ranges = Vec::new();
        for row in MAHC_RANGES {
            for &category in row.categories {
                let [critical_min, caution_min, safe_min, safe_max, caution_max, critical_max] =
                    row.bands;
                ranges.push(ParameterRange {
                    parameter: row.parameter,
                    category,
                    safe_min,
                    safe_max,
                    caution_min,
                    caution_max,
                    critical_min,
                    critical_max,
                    unit: row.unit.to_string(),
                });
            }
        }
        Self::from_ranges(ranges)
    }

    /// Builds a catalog from explicit ranges, validating each entry's band
    /// ordering and rejecting duplicate (parameter, category) pairs.
    pub fn from_ranges(ranges: Vec<ParameterRange>) -> Result<RangeCatalog, EngineError> {
        let mut entries = HashMap::new();
        for range in ranges {
            if !range.is_ordered() {
                return Err(EngineError::ConfigError(format!(
                    "band ordering violated for {} / {}: \
                     critical_min ≤ caution_min ≤ safe_min ≤ safe_max ≤ caution_max ≤ critical_max \
                     does not hold",
                    range.parameter, range.category
                )));
            }
            let key = (range.parameter, range.category);
            if entries.insert(key, range).is_some() {
                return Err(EngineError::ConfigError(format!(
                    "duplicate range entry for {} / {}",
                    key.0, key.1
                )));
            }
        }
        Ok(RangeCatalog { entries })
    }

    /// Builds the MAHC catalog with override entries from a TOML document
    /// layered on top (override wins per (parameter, category) pair).
    ///
    /// Regulatory updates and facility-specific variances land here as data
    /// changes rather than code changes.
    pub fn mahc_with_overrides(toml_text: &str) -> Result<RangeCatalog, EngineError> {
        let mut catalog = Self::mahc()?;
        let file: RangeFile = toml::from_str(toml_text)
            .map_err(|e| EngineError::ConfigError(format!("range file parse error: {}", e)))?;
        for entry in file.range {
            let range = entry.into_range();
            if !range.is_ordered() {
                return Err(EngineError::ConfigError(format!(
                    "band ordering violated in override for {} / {}",
                    range.parameter, range.category
                )));
            }
            catalog
                .entries
                .insert((range.parameter, range.category), range);
        }
        Ok(catalog)
    }

    /// Looks up the range for a (parameter, category) pair.
    ///
    /// A missing pair is a `ConfigError`, never a silent default.
    pub fn lookup(
        &self,
        parameter: ChemicalParameter,
        category: PoolCategory,
    ) -> Result<&ParameterRange, EngineError> {
        self.entries.get(&(parameter, category)).ok_or_else(|| {
            EngineError::ConfigError(format!(
                "no range configured for {} / {}",
                parameter, category
            ))
        })
    }

    /// Number of configured (parameter, category) pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Override file format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RangeFile {
    #[serde(default)]
    range: Vec<RangeFileEntry>,
}

/// One `[[range]]` table in an override file. Omitted lower bounds mean
/// "unbounded below" (combined chlorine style); omitted upper bounds mean
/// "unbounded above".
#[derive(Debug, Deserialize)]
struct RangeFileEntry {
    parameter: ChemicalParameter,
    category: PoolCategory,
    unit: String,
    #[serde(default = "neg_inf")]
    safe_min: f64,
    #[serde(default = "inf")]
    safe_max: f64,
    #[serde(default = "neg_inf")]
    caution_min: f64,
    #[serde(default = "inf")]
    caution_max: f64,
    #[serde(default = "neg_inf")]
    critical_min: f64,
    #[serde(default = "inf")]
    critical_max: f64,
}

fn neg_inf() -> f64 {
    NEG_INF
}

fn inf() -> f64 {
    INF
}

impl RangeFileEntry {
    fn into_range(self) -> ParameterRange {
        ParameterRange {
            parameter: self.parameter,
            category: self.category,
            safe_min: self.safe_min,
            safe_max: self.safe_max,
            caution_min: self.caution_min,
            caution_max: self.caution_max,
            critical_min: self.critical_min,
            critical_max: self.critical_max,
            unit: self.unit,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mahc_catalog_builds_without_error() {
        let catalog = RangeCatalog::mahc().expect("built-in table should validate");
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_mahc_catalog_covers_every_parameter_category_pair() {
        // The facade classifies every parameter present in a reading, so a
        // hole in the built-in table would turn valid readings into
        // ConfigErrors at runtime.
        let catalog = RangeCatalog::mahc().expect("built-in table should validate");
        for parameter in ChemicalParameter::ALL {
            for category in PoolCategory::ALL {
                assert!(
                    catalog.lookup(parameter, category).is_ok(),
                    "missing built-in range for {} / {}",
                    parameter,
                    category
                );
            }
        }
        assert_eq!(catalog.len(), 8 * 4);
    }

    #[test]
    fn test_all_builtin_ranges_are_ordered() {
        let catalog = RangeCatalog::mahc().expect("built-in table should validate");
        for parameter in ChemicalParameter::ALL {
            for category in PoolCategory::ALL {
                let range = catalog.lookup(parameter, category).unwrap();
                assert!(
                    range.is_ordered(),
                    "band ordering violated for {} / {}",
                    parameter,
                    category
                );
            }
        }
    }

    #[test]
    fn test_spa_temperature_ceiling_is_104() {
        let catalog = RangeCatalog::mahc().unwrap();
        let range = catalog
            .lookup(ChemicalParameter::Temperature, PoolCategory::Spa)
            .unwrap();
        assert_eq!(range.safe_max, 104.0);
        // Empty upper caution band: above 104 goes straight to critical.
        assert_eq!(range.caution_max, 104.0);
    }

    #[test]
    fn test_kiddie_chlorine_band_is_tighter_than_standard() {
        let catalog = RangeCatalog::mahc().unwrap();
        let standard = catalog
            .lookup(ChemicalParameter::FreeChlorine, PoolCategory::Standard)
            .unwrap();
        let kiddie = catalog
            .lookup(ChemicalParameter::FreeChlorine, PoolCategory::Kiddie)
            .unwrap();
        assert!(kiddie.safe_min > standard.safe_min);
        assert!(kiddie.safe_max < standard.safe_max);
    }

    #[test]
    fn test_combined_chlorine_has_no_lower_bound() {
        let catalog = RangeCatalog::mahc().unwrap();
        let range = catalog
            .lookup(ChemicalParameter::CombinedChlorine, PoolCategory::Standard)
            .unwrap();
        assert_eq!(range.safe_min, f64::NEG_INFINITY);
        assert_eq!(range.caution_min, f64::NEG_INFINITY);
        assert_eq!(range.critical_min, f64::NEG_INFINITY);
    }

    #[test]
    fn test_lookup_missing_pair_is_config_error() {
        let catalog = RangeCatalog::from_ranges(vec![]).unwrap();
        let err = catalog
            .lookup(ChemicalParameter::Ph, PoolCategory::Standard)
            .unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }

    #[test]
    fn test_unordered_range_rejected_at_load() {
        let mut broken = RangeCatalog::mahc()
            .unwrap()
            .lookup(ChemicalParameter::Ph, PoolCategory::Standard)
            .unwrap()
            .clone();
        broken.safe_min = broken.caution_max + 1.0; // safe_min above caution_max
        let err = RangeCatalog::from_ranges(vec![broken]).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }

    #[test]
    fn test_duplicate_entry_rejected_at_load() {
        let range = RangeCatalog::mahc()
            .unwrap()
            .lookup(ChemicalParameter::Ph, PoolCategory::Standard)
            .unwrap()
            .clone();
        let err = RangeCatalog::from_ranges(vec![range.clone(), range]).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }

    #[test]
    fn test_toml_override_replaces_builtin_entry() {
        let toml_text = r#"
            [[range]]
            parameter = "freeChlorine"
            category = "standard"
            unit = "ppm"
            safe_min = 2.0
            safe_max = 4.0
            caution_min = 1.0
            caution_max = 6.0
            critical_min = 0.0
            critical_max = 10.0
        "#;
        let catalog = RangeCatalog::mahc_with_overrides(toml_text)
            .expect("valid override file should load");
        let range = catalog
            .lookup(ChemicalParameter::FreeChlorine, PoolCategory::Standard)
            .unwrap();
        assert_eq!(range.safe_min, 2.0);
        // Untouched entries survive the overlay.
        assert!(catalog
            .lookup(ChemicalParameter::Ph, PoolCategory::Standard)
            .is_ok());
        assert_eq!(catalog.len(), 8 * 4);
    }

    #[test]
    fn test_toml_override_with_bad_ordering_rejected() {
        let toml_text = r#"
            [[range]]
            parameter = "ph"
            category = "spa"
            unit = "pH"
            safe_min = 9.0
            safe_max = 7.0
        "#;
        let err = RangeCatalog::mahc_with_overrides(toml_text).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }

    #[test]
    fn test_unparseable_toml_is_config_error() {
        let err = RangeCatalog::mahc_with_overrides("not [ valid toml").unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }

    #[test]
    fn test_plausible_bounds_cover_regulatory_ranges() {
        // A value inside any configured band must never be implausible.
        let catalog = RangeCatalog::mahc().unwrap();
        for parameter in ChemicalParameter::ALL {
            let (lo, hi) = plausible_bounds(parameter);
            for category in PoolCategory::ALL {
                let range = catalog.lookup(parameter, category).unwrap();
                if range.critical_min.is_finite() {
                    assert!(lo <= range.critical_min, "{} lower bound too tight", parameter);
                }
                if range.critical_max.is_finite() {
                    assert!(hi >= range.critical_max, "{} upper bound too tight", parameter);
                }
            }
        }
    }
}
