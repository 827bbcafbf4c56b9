//! End-to-end behaviour of the predictor session.

use agrifcst_core::{
    add_months, ForecastError, PredictorOptions, PricePredictor, TimeSeriesRecord, MAX_LAG,
};
use approx::assert_relative_eq;
use chrono::NaiveDate;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monthly(start: NaiveDate, values: &[f64]) -> Vec<TimeSeriesRecord> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| TimeSeriesRecord::new(add_months(start, i as u32).unwrap(), v))
        .collect()
}

/// Trend plus a yearly cycle and a small deterministic wobble.
fn price_curve(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let season = (i as f64 / 12.0 * std::f64::consts::TAU).sin();
            320.0 + 2.5 * i as f64 + 30.0 * season + ((i * 7) % 5) as f64
        })
        .collect()
}

fn quick_options() -> PredictorOptions {
    let mut opts = PredictorOptions::default();
    opts.forest.n_estimators = 25;
    opts.boosting.n_estimators = 40;
    opts
}

#[test]
fn test_historical_returns_last_six_months() {
    let mut p = PricePredictor::default();
    let values = price_curve(24);
    p.load_series("arecanut", monthly(ymd(2022, 1, 1), &values))
        .unwrap();

    let slice = p.historical("arecanut", 6).unwrap();
    assert_eq!(slice.data_points, 6);
    assert_eq!(slice.crop, "arecanut");
    assert_eq!(
        slice.dates(),
        vec![
            ymd(2023, 7, 1),
            ymd(2023, 8, 1),
            ymd(2023, 9, 1),
            ymd(2023, 10, 1),
            ymd(2023, 11, 1),
            ymd(2023, 12, 1),
        ]
    );
    assert_eq!(slice.prices(), values[18..].to_vec());
}

#[test]
fn test_predict_three_months_after_last_date() {
    let mut p = PricePredictor::new(quick_options()).unwrap();
    p.load_series("coconut", monthly(ymd(2021, 1, 1), &price_curve(36)))
        .unwrap();
    p.train("coconut").unwrap();

    let forecast = p.predict("coconut", 3).unwrap();
    assert_eq!(forecast.crop, "coconut");
    assert_eq!(
        forecast.dates(),
        vec![ymd(2024, 1, 1), ymd(2024, 2, 1), ymd(2024, 3, 1)]
    );
}

#[test]
fn test_forecast_is_deterministic_and_bounded() {
    let mut p = PricePredictor::new(quick_options()).unwrap();
    p.load_series("pepper", monthly(ymd(2019, 6, 1), &price_curve(48)))
        .unwrap();
    p.train("pepper").unwrap();

    let first = p.predict("pepper", 6).unwrap();
    let second = p.predict("pepper", 6).unwrap();
    assert_eq!(first, second);

    for point in &first.points {
        assert!(point.value >= 0.0);
        assert!(point.lower >= 0.0);
        assert!(point.lower <= point.value);
        assert!(point.value <= point.upper);
        assert_relative_eq!(point.upper, point.value * 1.2, epsilon = 1e-9);
    }
}

#[test]
fn test_later_steps_use_earlier_predictions_as_lags() {
    let mut p = PricePredictor::new(quick_options()).unwrap();
    p.load_series("cardamom", monthly(ymd(2020, 1, 1), &price_curve(40)))
        .unwrap();
    p.train("cardamom").unwrap();

    let steps = p.forecast_steps("cardamom", 3).unwrap();
    assert_eq!(steps[2].row.lag(1), Some(steps[1].point.value));
    assert_eq!(steps[2].row.lag(2), Some(steps[0].point.value));
    assert_eq!(steps[0].row.lag(12), Some(price_curve(40)[28]));
}

#[test]
fn test_predictions_are_clamped_at_zero() {
    // Prices collapsing towards zero
    let values: Vec<f64> = (0..30)
        .map(|i| (290.0 - 10.0 * i as f64 + ((i * 3) % 4) as f64).max(0.0))
        .collect();
    let mut p = PricePredictor::new(quick_options()).unwrap();
    p.load_series("rubber", monthly(ymd(2020, 1, 1), &values))
        .unwrap();
    p.train("rubber").unwrap();

    let steps = p.forecast_steps("rubber", 6).unwrap();
    for step in &steps {
        assert_eq!(step.point.value, step.raw.max(0.0));
        assert!(step.point.lower >= 0.0);
    }
}

#[test]
fn test_feature_rows_are_finite() {
    let mut p = PricePredictor::default();
    let rows = p
        .load_series("tea", monthly(ymd(2018, 3, 1), &price_curve(30)))
        .unwrap();
    assert_eq!(rows, 30 - MAX_LAG);

    let table = p.feature_table("tea").unwrap();
    for row in table.matrix() {
        assert!(row.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn test_training_split_is_chronological() {
    let mut p = PricePredictor::new(quick_options()).unwrap();
    p.load_series("coffee", monthly(ymd(2020, 1, 1), &price_curve(37)))
        .unwrap();
    let report = p.train("coffee").unwrap();

    assert_eq!(report.train_rows, 20);
    assert_eq!(report.test_rows, 5);
    assert!(report.train_end < report.test_start);
    assert_eq!(report.test_start, ymd(2022, 9, 1));
}

#[test]
fn test_predict_unknown_crop_names_the_crop() {
    let p = PricePredictor::default();
    let err = p.predict("saffron", 3).unwrap_err();
    assert_eq!(err, ForecastError::ModelNotTrained("saffron".into()));
    assert!(err.to_string().contains("saffron"));
}

#[test]
fn test_too_short_series_cannot_train() {
    let mut p = PricePredictor::default();
    p.load_series("ginger", monthly(ymd(2023, 1, 1), &price_curve(12)))
        .unwrap();
    assert!(matches!(
        p.train("ginger"),
        Err(ForecastError::InsufficientHistory { .. })
    ));
    assert!(!p.is_trained("ginger"));
}

#[test]
fn test_train_all_reports_each_crop() {
    let mut p = PricePredictor::new(quick_options()).unwrap();
    p.load_series("arecanut", monthly(ymd(2021, 1, 1), &price_curve(30)))
        .unwrap();
    p.load_series("ginger", monthly(ymd(2023, 1, 1), &price_curve(10)))
        .unwrap();

    let outcomes = p.train_all();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].0, "arecanut");
    assert!(outcomes[0].1.is_ok());
    assert!(outcomes[1].1.is_err());
    assert!(p.is_trained("arecanut"));
}
