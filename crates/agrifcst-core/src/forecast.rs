//! Recursive multi-step forecasting.
//!
//! Each step appends its prediction to a composite history (observed values
//! followed by earlier predictions) and the next step's lag and rolling
//! features are read from that history, so a horizon of `h` months costs
//! `h` single-row model calls.

use crate::error::{ForecastError, Result};
use crate::features::{
    month_occurrences, rolling_stat, FeatureRow, FeatureTable, LAGS, ROLLING_WINDOWS,
};
use crate::series::{add_months, quarter, CropSeries};
use crate::training::TrainedModel;
use chrono::{Datelike, NaiveDate};

/// Longest horizon accepted by [`recursive_forecast`], in months.
pub const MAX_HORIZON: usize = 1200;

/// One forecast month with its naive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    /// Predicted price, never negative
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ForecastPoint {
    /// Point with bounds at `value * (1 -/+ ratio)`; the lower bound is
    /// clamped at zero.
    pub fn with_ratio(date: NaiveDate, value: f64, ratio: f64) -> Self {
        Self {
            date,
            value,
            lower: (value * (1.0 - ratio)).max(0.0),
            upper: value * (1.0 + ratio),
        }
    }
}

/// A single iteration of the recursive loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastStep {
    /// 1-based step number
    pub step: usize,
    /// Inputs given to the model
    pub row: FeatureRow,
    /// Model output before clamping
    pub raw: f64,
    pub point: ForecastPoint,
}

/// Forecast for one crop, ordered by date.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub crop: String,
    pub points: Vec<ForecastPoint>,
}

impl ForecastResult {
    pub fn from_steps(crop: &str, steps: &[ForecastStep]) -> Self {
        Self {
            crop: crop.to_string(),
            points: steps.iter().map(|s| s.point).collect(),
        }
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Build the row for a future month.
///
/// Uses the shared derivation when the history covers every lag and
/// window; otherwise each missing lag or window keeps the value from
/// `previous`.
fn step_row(
    date: NaiveDate,
    history: &[f64],
    trend: usize,
    month_trend: usize,
    previous: &FeatureRow,
) -> FeatureRow {
    if let Some(row) = FeatureRow::derive(date, history, trend, month_trend) {
        return row;
    }

    let n = history.len();
    let mut lags = previous.lags;
    for (slot, &k) in lags.iter_mut().zip(LAGS.iter()) {
        if n >= k {
            *slot = history[n - k];
        }
    }
    let mut rolling = previous.rolling;
    for (slot, &w) in rolling.iter_mut().zip(ROLLING_WINDOWS.iter()) {
        if let Some(stat) = rolling_stat(history, w) {
            *slot = stat;
        }
    }

    FeatureRow {
        date,
        year: date.year(),
        month: date.month(),
        quarter: quarter(date),
        day_of_year: date.ordinal(),
        lags,
        rolling,
        trend,
        month_trend,
    }
}

/// Forecast `horizon` months past the end of `series`.
///
/// `table` must be the feature table the model was trained on; its last
/// row seeds the fallback for features the history cannot supply.
/// Predictions are clamped at zero before they are fed back.
pub fn recursive_forecast(
    series: &CropSeries,
    table: &FeatureTable,
    model: &TrainedModel,
    horizon: usize,
    interval_ratio: f64,
) -> Result<Vec<ForecastStep>> {
    if horizon == 0 {
        return Err(ForecastError::invalid_parameter(
            "months_ahead",
            horizon,
            "must be at least 1",
        ));
    }
    if horizon > MAX_HORIZON {
        return Err(ForecastError::invalid_parameter(
            "months_ahead",
            horizon,
            format!("must be at most {}", MAX_HORIZON),
        ));
    }
    let last_date = series
        .last_date()
        .ok_or_else(|| ForecastError::DataUnavailable(series.crop().to_string()))?;
    let mut previous = table
        .last_row()
        .cloned()
        .ok_or_else(|| ForecastError::InsufficientHistory {
            crop: series.crop().to_string(),
            needed: crate::features::MIN_HISTORY,
            got: series.len(),
        })?;

    let mut history = series.values();
    let mut dates = series.dates();
    let mut steps = Vec::with_capacity(horizon);

    for step in 1..=horizon {
        let offset = u32::try_from(step)
            .map_err(|_| ForecastError::invalid_parameter("months_ahead", horizon, "too large"))?;
        let date = add_months(last_date, offset)?;
        let trend = series.len() + step;
        let month_trend = month_occurrences(&dates, date.month());
        let row = step_row(date, &history, trend, month_trend, &previous);

        let raw = model.predict_row(&row)?;
        if !raw.is_finite() {
            return Err(ForecastError::InferenceFailure(format!(
                "{} returned {} for {} at step {}",
                model.kind(),
                raw,
                series.crop(),
                step
            )));
        }
        let value = raw.max(0.0);

        tracing::debug!(crop = series.crop(), step, %date, value, "forecast step");

        history.push(value);
        dates.push(date);
        previous = row.clone();
        steps.push(ForecastStep {
            step,
            row,
            raw,
            point: ForecastPoint::with_ratio(date, value, interval_ratio),
        });
    }

    Ok(steps)
}
