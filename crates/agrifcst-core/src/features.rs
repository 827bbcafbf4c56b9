//! Supervised-learning features for monthly price series.
//!
//! Every row is derived from its date and the values strictly before it:
//! calendar fields, lags at [`LAGS`], rolling mean/std over
//! [`ROLLING_WINDOWS`], a trend index and a same-month occurrence count.
//! The same derivation is used for training rows and for recursive
//! forecast steps, so both always see [`FEATURE_COLUMNS`] in the same order.

use crate::series::{quarter, CropSeries};
use chrono::{Datelike, NaiveDate};
use statrs::statistics::Statistics;

/// Lag offsets in months.
pub const LAGS: [usize; 5] = [1, 2, 3, 6, 12];

/// Trailing window lengths for rolling statistics.
pub const ROLLING_WINDOWS: [usize; 3] = [3, 6, 12];

/// Deepest history any feature needs.
pub const MAX_LAG: usize = 12;

/// Shortest series that yields at least one feature row.
pub const MIN_HISTORY: usize = MAX_LAG + 1;

/// Model input columns, in vector order.
pub const FEATURE_COLUMNS: [&str; 17] = [
    "year",
    "month_num",
    "quarter",
    "day_of_year",
    "lag_1",
    "lag_2",
    "lag_3",
    "lag_6",
    "lag_12",
    "rolling_mean_3",
    "rolling_std_3",
    "rolling_mean_6",
    "rolling_std_6",
    "rolling_mean_12",
    "rolling_std_12",
    "trend",
    "month_trend",
];

/// Mean and sample standard deviation over one trailing window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingStat {
    pub mean: f64,
    pub std: f64,
}

/// One row of model inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Month the row describes
    pub date: NaiveDate,
    pub year: i32,
    /// Month of year, 1-12
    pub month: u32,
    /// Quarter, 1-4
    pub quarter: u32,
    /// Day of year of `date`, 1-366
    pub day_of_year: u32,
    /// Values at [`LAGS`] offsets
    pub lags: [f64; 5],
    /// Statistics for each of [`ROLLING_WINDOWS`]
    pub rolling: [RollingStat; 3],
    /// Zero-based position in the series
    pub trend: usize,
    /// Earlier occurrences of the same calendar month
    pub month_trend: usize,
}

impl FeatureRow {
    /// Derive a row from its date and the values that precede it.
    ///
    /// Returns `None` when `history` is too short for any lag or window.
    pub fn derive(
        date: NaiveDate,
        history: &[f64],
        trend: usize,
        month_trend: usize,
    ) -> Option<Self> {
        let lags = lag_values(history)?;
        let rolling = [
            rolling_stat(history, ROLLING_WINDOWS[0])?,
            rolling_stat(history, ROLLING_WINDOWS[1])?,
            rolling_stat(history, ROLLING_WINDOWS[2])?,
        ];
        Some(Self {
            date,
            year: date.year(),
            month: date.month(),
            quarter: quarter(date),
            day_of_year: date.ordinal(),
            lags,
            rolling,
            trend,
            month_trend,
        })
    }

    /// Value at lag `k`, if `k` is one of [`LAGS`].
    pub fn lag(&self, k: usize) -> Option<f64> {
        LAGS.iter().position(|&l| l == k).map(|i| self.lags[i])
    }

    /// Rolling statistics for `window`, if it is one of [`ROLLING_WINDOWS`].
    pub fn rolling(&self, window: usize) -> Option<RollingStat> {
        ROLLING_WINDOWS
            .iter()
            .position(|&w| w == window)
            .map(|i| self.rolling[i])
    }

    /// Flatten into model input order (see [`FEATURE_COLUMNS`]).
    pub fn to_vector(&self) -> Vec<f64> {
        let mut v = Vec::with_capacity(FEATURE_COLUMNS.len());
        v.push(self.year as f64);
        v.push(self.month as f64);
        v.push(self.quarter as f64);
        v.push(self.day_of_year as f64);
        v.extend_from_slice(&self.lags);
        for stat in &self.rolling {
            v.push(stat.mean);
            v.push(stat.std);
        }
        v.push(self.trend as f64);
        v.push(self.month_trend as f64);
        v
    }
}

/// Lag values read from the end of `history`.
pub fn lag_values(history: &[f64]) -> Option<[f64; 5]> {
    let n = history.len();
    if n < MAX_LAG {
        return None;
    }
    Some(LAGS.map(|k| history[n - k]))
}

/// Mean and sample standard deviation of the last `window` values.
pub fn rolling_stat(history: &[f64], window: usize) -> Option<RollingStat> {
    if window < 2 || history.len() < window {
        return None;
    }
    let tail = &history[history.len() - window..];
    Some(RollingStat {
        mean: tail.mean(),
        std: tail.std_dev(),
    })
}

/// Number of dates in `dates` that fall in `month` (1-12).
pub fn month_occurrences(dates: &[NaiveDate], month: u32) -> usize {
    dates.iter().filter(|d| d.month() == month).count()
}

/// Feature rows with their aligned targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
    targets: Vec<f64>,
}

impl FeatureTable {
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn last_row(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    /// Row-major design matrix.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(FeatureRow::to_vector).collect()
    }
}

/// Build the feature table for a series.
///
/// Yields `len - MAX_LAG` rows; a series shorter than [`MIN_HISTORY`]
/// gives an empty table.
pub fn build_features(series: &CropSeries) -> FeatureTable {
    let values = series.values();
    let mut month_counts = [0usize; 12];
    let mut table = FeatureTable::default();

    for (i, record) in series.records().iter().enumerate() {
        let slot = record.date.month0() as usize;
        let month_trend = month_counts[slot];
        month_counts[slot] += 1;

        if let Some(row) = FeatureRow::derive(record.date, &values[..i], i, month_trend) {
            table.rows.push(row);
            table.targets.push(record.value);
        }
    }

    table
}
