/// Trend analysis over a pool's reading history.
///
/// Consumes a caller-supplied, ascending-timestamp window of readings for
/// one pool and produces drift direction, rate, and an advisory
/// time-to-critical projection for a single parameter. Stateless per call.
///
/// # Clock injection
/// `analyze` accepts `now` rather than calling `Utc::now()` internally, so
/// trend output is purely deterministic in tests.
///
/// # Numeric semantics
/// Timestamps are normalized to hours since the window start before the
/// regression, avoiding float precision loss on large epoch values. A window
/// of fewer than two usable samples, or one with no timestamp spread
/// (duplicate timestamps), is "insufficient evidence": the result is
/// `Stable` with no projection, never an error.

use chrono::{DateTime, Duration, Utc};

use crate::catalog::{plausible_bounds, RangeCatalog};
use crate::config::EngineConfig;
use crate::model::{
    ChemicalParameter, ChemicalReading, EngineError, ParameterRange, PoolCategory, TrendDirection,
    TrendResult,
};

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Analyzes the drift of one parameter across a reading window.
///
/// Rate is the least-squares slope of value over elapsed hours. Direction is
/// `Increasing`/`Decreasing` only when |rate| exceeds the configured noise
/// threshold; below it, measurement noise and real drift are
/// indistinguishable and the direction is `Stable`.
///
/// `projected_critical_at` linearly extrapolates from the latest value at
/// `now` to the critical band onset in the direction of travel. It is `None`
/// when the direction is stable, when the rate moves away from the boundary,
/// or when the boundary is unbounded (combined chlorine has no lower
/// critical onset). The projection is advisory — it feeds recommended-action
/// text, never severity.
///
/// Only `ConfigError` is possible: a missing catalog entry for the pair.
pub fn analyze(
    history: &[ChemicalReading],
    parameter: ChemicalParameter,
    category: PoolCategory,
    now: DateTime<Utc>,
    catalog: &RangeCatalog,
    config: &EngineConfig,
) -> Result<TrendResult, EngineError> {
    let samples = collect_samples(history, parameter);
    if samples.len() < 2 {
        return Ok(stable(parameter, 0.0));
    }

    let start = samples[0].0;
    let points: Vec<(f64, f64)> = samples
        .iter()
        .map(|&(t, v)| (hours_between(start, t), v))
        .collect();

    let Some(rate) = least_squares_slope(&points) else {
        // No timestamp spread — duplicate timestamps collapse the regression.
        return Ok(stable(parameter, 0.0));
    };

    if rate.abs() <= config.noise_threshold_per_hour {
        return Ok(stable(parameter, rate));
    }

    let direction = if rate > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    let range = catalog.lookup(parameter, category)?;
    let latest_value = samples[samples.len() - 1].1;
    let projected_critical_at = project_critical(latest_value, rate, direction, range, now);

    Ok(TrendResult {
        parameter,
        direction,
        rate_per_hour: rate,
        projected_critical_at,
    })
}

fn stable(parameter: ChemicalParameter, rate: f64) -> TrendResult {
    TrendResult {
        parameter,
        direction: TrendDirection::Stable,
        rate_per_hour: rate,
        projected_critical_at: None,
    }
}

/// Pulls (timestamp, value) pairs for the parameter out of the window,
/// dropping values that fail the plausibility check — a sensor glitch in the
/// middle of a window would otherwise swing the slope wildly.
fn collect_samples(
    history: &[ChemicalReading],
    parameter: ChemicalParameter,
) -> Vec<(DateTime<Utc>, f64)> {
    let (lo, hi) = plausible_bounds(parameter);
    history
        .iter()
        .filter_map(|r| r.value(parameter).map(|v| (r.timestamp, v)))
        .filter(|&(_, v)| v.is_finite() && v >= lo && v <= hi)
        .collect()
}

fn hours_between(start: DateTime<Utc>, t: DateTime<Utc>) -> f64 {
    (t - start).num_milliseconds() as f64 / 3_600_000.0
}

/// Least-squares slope of y over x. Returns `None` when the x values have no
/// spread (zero variance), which would otherwise divide by zero.
fn least_squares_slope(points: &[(f64, f64)]) -> Option<f64> {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for &(x, y) in points {
        numerator += (x - mean_x) * (y - mean_y);
        denominator += (x - mean_x) * (x - mean_x);
    }

    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Where the value crosses into the critical band if it keeps drifting at
/// `rate`. The onset is the caution band's outer edge: above `caution_max`
/// or below `caution_min` classification turns critical.
fn project_critical(
    latest_value: f64,
    rate: f64,
    direction: TrendDirection,
    range: &ParameterRange,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let onset = match direction {
        TrendDirection::Increasing => range.caution_max,
        TrendDirection::Decreasing => range.caution_min,
        TrendDirection::Stable => return None,
    };
    if !onset.is_finite() {
        return None;
    }

    // Already at or past the onset: critical now.
    let hours = ((onset - latest_value) / rate).max(0.0);
    Some(now + Duration::milliseconds((hours * 3_600_000.0) as i64))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
