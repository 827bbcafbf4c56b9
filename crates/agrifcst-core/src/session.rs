//! Per-crop state for a forecasting session.

use crate::error::{ForecastError, Result};
use crate::features::{build_features, FeatureTable};
use crate::forecast::{recursive_forecast, ForecastResult, ForecastStep};
use crate::options::PredictorOptions;
use crate::series::{CropSeries, TimeSeriesRecord};
use crate::training::{train_model, TrainedModel, TrainingReport};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A crop as shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropInfo {
    /// Normalised crop key
    pub value: String,
    /// Display name
    pub label: String,
}

/// The most recent records of one crop.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSlice {
    pub crop: String,
    pub points: Vec<TimeSeriesRecord>,
    pub data_points: usize,
}

impl HistoricalSlice {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|r| r.date).collect()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|r| r.value).collect()
    }
}

/// Lowercase, trimmed crop key.
pub fn normalize_crop(crop: &str) -> String {
    crop.trim().to_lowercase()
}

/// Capitalise the first letter of each whitespace- or underscore-separated word.
pub fn title_case(crop: &str) -> String {
    crop.split(|c: char| c.is_whitespace() || c == '_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Owns every crop's series, feature table and trained model.
///
/// Crop names are matched case-insensitively after trimming.
#[derive(Debug, Default)]
pub struct PricePredictor {
    options: PredictorOptions,
    series: BTreeMap<String, CropSeries>,
    tables: BTreeMap<String, FeatureTable>,
    models: BTreeMap<String, TrainedModel>,
}

impl PricePredictor {
    pub fn new(options: PredictorOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            ..Self::default()
        })
    }

    pub fn options(&self) -> &PredictorOptions {
        &self.options
    }

    /// Store (or replace) a crop's history and rebuild its feature table.
    ///
    /// An existing model for the crop is kept until it is retrained.
    /// Returns the number of feature rows.
    pub fn load_series(&mut self, crop: &str, records: Vec<TimeSeriesRecord>) -> Result<usize> {
        let key = normalize_crop(crop);
        if key.is_empty() {
            return Err(ForecastError::InvalidInput(
                "crop name must not be empty".to_string(),
            ));
        }
        let series = CropSeries::new(&key, records)?;
        let table = build_features(&series);
        let rows = table.len();
        tracing::debug!(crop = %key, records = series.len(), rows, "series loaded");

        self.series.insert(key.clone(), series);
        self.tables.insert(key, table);
        Ok(rows)
    }

    /// Loaded crops in name order.
    pub fn crop_list(&self) -> Vec<CropInfo> {
        self.series
            .keys()
            .map(|k| CropInfo {
                value: k.clone(),
                label: title_case(k),
            })
            .collect()
    }

    /// The records of the last `months` months, ascending.
    pub fn historical(&self, crop: &str, months: u32) -> Result<HistoricalSlice> {
        if months == 0 {
            return Err(ForecastError::invalid_parameter(
                "months",
                months,
                "must be at least 1",
            ));
        }
        let series = self.lookup_series(crop)?;
        let points = series.tail_months(months);
        Ok(HistoricalSlice {
            crop: series.crop().to_string(),
            data_points: points.len(),
            points,
        })
    }

    /// Train and select a model for one crop, replacing any previous model.
    pub fn train(&mut self, crop: &str) -> Result<TrainingReport> {
        let key = normalize_crop(crop);
        let series = self
            .series
            .get(&key)
            .ok_or_else(|| ForecastError::DataUnavailable(key.clone()))?;
        let table = self
            .tables
            .get(&key)
            .ok_or_else(|| ForecastError::DataUnavailable(key.clone()))?;

        let model = train_model(series, table, &self.options)?;
        let report = model.report().clone();
        self.models.insert(key, model);
        Ok(report)
    }

    /// Train every loaded crop; one failure does not stop the rest.
    pub fn train_all(&mut self) -> Vec<(String, Result<TrainingReport>)> {
        let crops: Vec<String> = self.series.keys().cloned().collect();
        crops
            .into_iter()
            .map(|crop| {
                let outcome = self.train(&crop);
                if let Err(e) = &outcome {
                    tracing::warn!(crop = %crop, error = %e, "training failed");
                }
                (crop, outcome)
            })
            .collect()
    }

    /// Forecast `months_ahead` months, one step at a time.
    pub fn predict(&self, crop: &str, months_ahead: usize) -> Result<ForecastResult> {
        let steps = self.forecast_steps(crop, months_ahead)?;
        Ok(ForecastResult::from_steps(&normalize_crop(crop), &steps))
    }

    /// Like [`PricePredictor::predict`] but returns the feature row behind each step.
    pub fn forecast_steps(&self, crop: &str, months_ahead: usize) -> Result<Vec<ForecastStep>> {
        let key = normalize_crop(crop);
        let model = self
            .models
            .get(&key)
            .ok_or_else(|| ForecastError::ModelNotTrained(key.clone()))?;
        let series = self.lookup_series(&key)?;
        let table = self
            .tables
            .get(&key)
            .ok_or_else(|| ForecastError::DataUnavailable(key.clone()))?;
        recursive_forecast(series, table, model, months_ahead, self.options.interval_ratio)
    }

    pub fn is_trained(&self, crop: &str) -> bool {
        self.models.contains_key(&normalize_crop(crop))
    }

    pub fn series(&self, crop: &str) -> Option<&CropSeries> {
        self.series.get(&normalize_crop(crop))
    }

    pub fn feature_table(&self, crop: &str) -> Option<&FeatureTable> {
        self.tables.get(&normalize_crop(crop))
    }

    pub fn model(&self, crop: &str) -> Option<&TrainedModel> {
        self.models.get(&normalize_crop(crop))
    }

    fn lookup_series(&self, crop: &str) -> Result<&CropSeries> {
        let key = normalize_crop(crop);
        self.series
            .get(&key)
            .ok_or(ForecastError::DataUnavailable(key))
    }
}
