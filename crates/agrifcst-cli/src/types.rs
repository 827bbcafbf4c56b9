//! JSON response shapes.
//!
//! Field names are part of the command-line contract; dates are
//! `YYYY-MM-DD` strings.

use crate::conversion::{format_date, format_dates};
use agrifcst_core::{
    CandidateReport, CropInfo, ForecastResult, HistoricalSlice, ModelMetrics, TrainingReport,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CropEntry {
    pub value: String,
    pub label: String,
}

impl From<CropInfo> for CropEntry {
    fn from(info: CropInfo) -> Self {
        Self {
            value: info.value,
            label: info.label,
        }
    }
}

/// Output of `crops`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CropsResponse {
    pub crops: Vec<CropEntry>,
    pub total: usize,
}

impl CropsResponse {
    pub fn new(crops: Vec<CropInfo>) -> Self {
        let crops: Vec<CropEntry> = crops.into_iter().map(CropEntry::from).collect();
        Self {
            total: crops.len(),
            crops,
        }
    }
}

/// Output of `historical`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoricalResponse {
    pub crop: String,
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
    pub data_points: usize,
}

impl From<&HistoricalSlice> for HistoricalResponse {
    fn from(slice: &HistoricalSlice) -> Self {
        Self {
            crop: slice.crop.clone(),
            dates: format_dates(&slice.dates()),
            prices: slice.prices(),
            data_points: slice.data_points,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct IntervalEntry {
    pub lower: f64,
    pub upper: f64,
}

/// Output of `predict`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictResponse {
    pub crop: String,
    pub predictions: Vec<f64>,
    pub dates: Vec<String>,
    pub confidence_intervals: Vec<IntervalEntry>,
}

impl From<&ForecastResult> for PredictResponse {
    fn from(result: &ForecastResult) -> Self {
        Self {
            crop: result.crop.clone(),
            predictions: result.values(),
            dates: format_dates(&result.dates()),
            confidence_intervals: result
                .points
                .iter()
                .map(|p| IntervalEntry {
                    lower: p.lower,
                    upper: p.upper,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MetricsEntry {
    pub mae: f64,
    pub rmse: f64,
    /// None when undefined (constant held-out targets)
    pub r2: Option<f64>,
}

impl From<ModelMetrics> for MetricsEntry {
    fn from(m: ModelMetrics) -> Self {
        Self {
            mae: m.mae,
            rmse: m.rmse,
            r2: m.r2.is_finite().then_some(m.r2),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CandidateEntry {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&CandidateReport> for CandidateEntry {
    fn from(c: &CandidateReport) -> Self {
        match &c.outcome {
            Ok(metrics) => Self {
                model: c.kind.to_string(),
                metrics: Some((*metrics).into()),
                error: None,
            },
            Err(e) => Self {
                model: c.kind.to_string(),
                metrics: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Training outcome for one crop.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrainEntry {
    pub crop: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<CandidateEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrainEntry {
    pub fn trained(report: &TrainingReport) -> Self {
        Self {
            crop: report.crop.clone(),
            status: "trained",
            selected_model: Some(report.selected.to_string()),
            metrics: Some(report.metrics.into()),
            candidates: report.candidates.iter().map(CandidateEntry::from).collect(),
            train_rows: Some(report.train_rows),
            test_rows: Some(report.test_rows),
            test_start: Some(format_date(report.test_start)),
            error: None,
        }
    }

    pub fn failed(crop: &str, error: String) -> Self {
        Self {
            crop: crop.to_string(),
            status: "failed",
            selected_model: None,
            metrics: None,
            candidates: Vec::new(),
            train_rows: None,
            test_rows: None,
            test_start: None,
            error: Some(error),
        }
    }
}

/// Output of `train`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrainResponse {
    pub results: Vec<TrainEntry>,
    pub trained: usize,
    pub failed: usize,
}

impl TrainResponse {
    pub fn new(results: Vec<TrainEntry>) -> Self {
        let trained = results.iter().filter(|r| r.status == "trained").count();
        Self {
            failed: results.len() - trained,
            trained,
            results,
        }
    }
}
