//! Monthly price series for a single crop.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate};

/// One monthly observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesRecord {
    /// Month the price refers to (any day within the month)
    pub date: NaiveDate,
    /// Observed price, non-negative
    pub value: f64,
}

impl TimeSeriesRecord {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Validated, immutable price history of one crop.
///
/// Records are sorted ascending by date with no duplicate dates and
/// finite, non-negative values.
#[derive(Debug, Clone, PartialEq)]
pub struct CropSeries {
    crop: String,
    records: Vec<TimeSeriesRecord>,
}

impl CropSeries {
    /// Build a series from records that must already be in ascending order.
    pub fn new(crop: &str, records: Vec<TimeSeriesRecord>) -> Result<Self> {
        for (i, record) in records.iter().enumerate() {
            if !record.value.is_finite() || record.value < 0.0 {
                return Err(ForecastError::InvalidInput(format!(
                    "{}: value at {} must be finite and non-negative, got {}",
                    crop, record.date, record.value
                )));
            }
            if i > 0 && records[i - 1].date >= record.date {
                return Err(ForecastError::InvalidInput(format!(
                    "{}: dates must be strictly ascending ({} follows {})",
                    crop,
                    record.date,
                    records[i - 1].date
                )));
            }
        }

        if let Some(pos) = first_gap(&records) {
            tracing::warn!(
                crop,
                after = %records[pos].date,
                before = %records[pos + 1].date,
                "series is not one calendar month apart; lags are positional"
            );
        }

        Ok(Self {
            crop: crop.to_string(),
            records,
        })
    }

    /// Sort records by date before validating.
    pub fn from_unsorted(crop: &str, mut records: Vec<TimeSeriesRecord>) -> Result<Self> {
        records.sort_by_key(|r| r.date);
        Self::new(crop, records)
    }

    pub fn crop(&self) -> &str {
        &self.crop
    }

    pub fn records(&self) -> &[TimeSeriesRecord] {
        &self.records
    }

    pub fn values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Records strictly after `last_date - months`, i.e. the most recent
    /// `months` observations of a gap-free series.
    pub fn tail_months(&self, months: u32) -> Vec<TimeSeriesRecord> {
        let Some(last) = self.last_date() else {
            return Vec::new();
        };
        match last.checked_sub_months(Months::new(months)) {
            Some(cutoff) => self
                .records
                .iter()
                .filter(|r| r.date > cutoff)
                .copied()
                .collect(),
            None => self.records.clone(),
        }
    }
}

/// Add calendar months, clamping the day to the end of shorter months.
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| ForecastError::InvalidDateFormat(format!("{} + {} months", date, months)))
}

/// Calendar quarter (1-4) of a date.
pub fn quarter(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Number of whole calendar months from `from` to `to`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32
}

/// Index of the first record followed by something other than the next month.
fn first_gap(records: &[TimeSeriesRecord]) -> Option<usize> {
    records
        .windows(2)
        .position(|w| months_between(w[0].date, w[1].date) != 1)
}
