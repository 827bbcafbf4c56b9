//! Model selection on a chronological hold-out.
//!
//! The feature table is split in time order, every candidate is fitted on
//! the older rows and scored on the newer ones, and the candidate with the
//! lowest held-out RMSE becomes the crop's [`TrainedModel`].

use crate::error::{ForecastError, Result};
use crate::features::{FeatureRow, FeatureTable, MAX_LAG};
use crate::metrics::{mae, r2, rmse};
use crate::options::PredictorOptions;
use crate::regressors::{ModelKind, ModelParams, Regressor};
use crate::scaler::StandardScaler;
use crate::series::CropSeries;
use chrono::NaiveDate;

#[cfg(feature = "native")]
use rayon::prelude::*;

/// Held-out scores of one fitted model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

/// Outcome of one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateReport {
    pub kind: ModelKind,
    /// Scores, or the reason the candidate was skipped
    pub outcome: std::result::Result<ModelMetrics, ForecastError>,
}

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub crop: String,
    pub selected: ModelKind,
    pub metrics: ModelMetrics,
    /// Every candidate, in evaluation order
    pub candidates: Vec<CandidateReport>,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Date of the last training row
    pub train_end: NaiveDate,
    /// Date of the first held-out row
    pub test_start: NaiveDate,
}

/// The selected regressor for a crop, with its scaler when the model
/// needs standardised inputs.
#[derive(Debug)]
pub struct TrainedModel {
    regressor: Box<dyn Regressor>,
    scaler: Option<StandardScaler>,
    report: TrainingReport,
}

impl TrainedModel {
    pub fn kind(&self) -> ModelKind {
        self.regressor.kind()
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    /// Predict the target for one feature row.
    pub fn predict_row(&self, row: &FeatureRow) -> Result<f64> {
        let features = row.to_vector();
        match &self.scaler {
            Some(scaler) => {
                let scaled = scaler.transform_row(&features).map_err(|e| {
                    ForecastError::InferenceFailure(format!("{}: {}", self.kind(), e))
                })?;
                self.regressor.predict_row(&scaled)
            }
            None => self.regressor.predict_row(&features),
        }
    }
}

/// Number of leading rows that go to the training side.
pub fn split_index(rows: usize, train_fraction: f64) -> usize {
    (rows as f64 * train_fraction).floor() as usize
}

/// Smallest table that leaves at least one row on each side of the split.
fn min_rows_for_split(train_fraction: f64) -> Result<usize> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(ForecastError::invalid_parameter(
            "train_fraction",
            train_fraction,
            "must be in (0, 1)",
        ));
    }
    // floor(n * fraction) first reaches 1 at n = 1 / fraction, give or take rounding
    let start = ((1.0 / train_fraction).floor() as usize).max(2);
    (start..start.saturating_add(3))
        .find(|&n| {
            let split = split_index(n, train_fraction);
            split > 0 && split < n
        })
        .ok_or_else(|| {
            ForecastError::invalid_parameter(
                "train_fraction",
                train_fraction,
                "leaves no rows on one side of the split",
            )
        })
}

type FitOutcome = Result<(Box<dyn Regressor>, ModelMetrics)>;

/// Standardised copies of both splits, built once for every scaled candidate.
struct ScaledSplit {
    scaler: StandardScaler,
    train_x: Vec<Vec<f64>>,
    test_x: Vec<Vec<f64>>,
}

fn scale_split(train_x: &[Vec<f64>], test_x: &[Vec<f64>]) -> Result<ScaledSplit> {
    let scaler = StandardScaler::fit(train_x)?;
    Ok(ScaledSplit {
        train_x: scaler.transform(train_x)?,
        test_x: scaler.transform(test_x)?,
        scaler,
    })
}

fn evaluate(
    kind: ModelKind,
    train: (&[Vec<f64>], &[f64]),
    test: (&[Vec<f64>], &[f64]),
    params: &ModelParams,
) -> FitOutcome {
    let model = kind.fit(train.0, train.1, params)?;
    let predicted = model.predict(test.0)?;
    let metrics = ModelMetrics {
        mae: mae(test.1, &predicted)?,
        rmse: rmse(test.1, &predicted)?,
        r2: r2(test.1, &predicted)?,
    };
    if !metrics.rmse.is_finite() {
        return Err(ForecastError::ComputationError(format!(
            "{} produced a non-finite RMSE",
            kind
        )));
    }
    Ok((model, metrics))
}

/// Fit every configured candidate and keep the one with the lowest RMSE.
///
/// A candidate that fails is logged and skipped; training fails only when
/// none succeed.
pub fn train_model(
    series: &CropSeries,
    table: &FeatureTable,
    options: &PredictorOptions,
) -> Result<TrainedModel> {
    let crop = series.crop();
    let rows = table.len();
    let needed_rows = min_rows_for_split(options.train_fraction)?;
    if rows < needed_rows {
        return Err(ForecastError::InsufficientHistory {
            crop: crop.to_string(),
            needed: needed_rows.saturating_add(MAX_LAG),
            got: series.len(),
        });
    }

    let split = split_index(rows, options.train_fraction);
    let x = table.matrix();
    let (train_x, test_x) = x.split_at(split);
    let (train_y, test_y) = table.targets().split_at(split);

    let scaled = if options.candidates.iter().any(ModelKind::requires_scaling) {
        Some(scale_split(train_x, test_x))
    } else {
        None
    };

    let params = options.model_params();
    let run = |kind: &ModelKind| -> FitOutcome {
        if !kind.requires_scaling() {
            return evaluate(*kind, (train_x, train_y), (test_x, test_y), &params);
        }
        match &scaled {
            Some(Ok(s)) => evaluate(*kind, (&s.train_x, train_y), (&s.test_x, test_y), &params),
            Some(Err(e)) => Err(e.clone()),
            None => Err(ForecastError::ComputationError(
                "scaler was not fitted".to_string(),
            )),
        }
    };

    #[cfg(feature = "native")]
    let outcomes: Vec<FitOutcome> = options.candidates.par_iter().map(run).collect();
    #[cfg(not(feature = "native"))]
    let outcomes: Vec<FitOutcome> = options.candidates.iter().map(run).collect();

    let mut candidates = Vec::with_capacity(outcomes.len());
    let mut best: Option<(Box<dyn Regressor>, ModelMetrics)> = None;
    for (kind, outcome) in options.candidates.iter().copied().zip(outcomes) {
        match outcome {
            Ok((model, metrics)) => {
                tracing::info!(
                    crop,
                    model = %kind,
                    mae = metrics.mae,
                    rmse = metrics.rmse,
                    r2 = metrics.r2,
                    "candidate evaluated"
                );
                candidates.push(CandidateReport {
                    kind,
                    outcome: Ok(metrics),
                });
                let better = best
                    .as_ref()
                    .map_or(true, |(_, b)| metrics.rmse < b.rmse);
                if better {
                    best = Some((model, metrics));
                }
            }
            Err(e) => {
                tracing::warn!(crop, model = %kind, error = %e, "candidate skipped");
                candidates.push(CandidateReport {
                    kind,
                    outcome: Err(e),
                });
            }
        }
    }

    let Some((regressor, metrics)) = best else {
        let reasons: Vec<String> = candidates
            .iter()
            .filter_map(|c| c.outcome.as_ref().err().map(|e| format!("{}: {}", c.kind, e)))
            .collect();
        return Err(ForecastError::TrainingFailure {
            crop: crop.to_string(),
            reason: format!("all candidates failed ({})", reasons.join("; ")),
        });
    };

    let selected = regressor.kind();
    let scaler = if selected.requires_scaling() {
        match scaled {
            Some(Ok(s)) => Some(s.scaler),
            _ => None,
        }
    } else {
        None
    };

    tracing::info!(crop, model = %selected, rmse = metrics.rmse, "model selected");

    let table_rows = table.rows();
    Ok(TrainedModel {
        regressor,
        scaler,
        report: TrainingReport {
            crop: crop.to_string(),
            selected,
            metrics,
            candidates,
            train_rows: split,
            test_rows: rows - split,
            train_end: table_rows[split - 1].date,
            test_start: table_rows[split].date,
        },
    })
}
