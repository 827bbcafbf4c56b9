//! Core library for monthly crop price forecasting.
//!
//! A [`PricePredictor`] holds each crop's price history, turns it into
//! lag, rolling and calendar features, selects the best of several
//! regressors on a chronological hold-out, and forecasts future months
//! recursively.

pub mod error;
pub mod features;
pub mod forecast;
pub mod metrics;
pub mod options;
pub mod regressors;
pub mod scaler;
pub mod series;
pub mod session;
pub mod training;

// Re-exports for convenience
pub use error::{ForecastError, Result};
pub use features::{
    build_features, FeatureRow, FeatureTable, RollingStat, FEATURE_COLUMNS, LAGS, MAX_LAG,
    MIN_HISTORY, ROLLING_WINDOWS,
};
pub use forecast::{recursive_forecast, ForecastPoint, ForecastResult, ForecastStep, MAX_HORIZON};
pub use metrics::{mae, mse, r2, rmse};
pub use options::PredictorOptions;
pub use regressors::{ModelKind, ModelParams, Regressor};
pub use scaler::StandardScaler;
pub use series::{add_months, CropSeries, TimeSeriesRecord};
pub use session::{normalize_crop, title_case, CropInfo, HistoricalSlice, PricePredictor};
pub use training::{
    split_index, train_model, CandidateReport, ModelMetrics, TrainedModel, TrainingReport,
};
