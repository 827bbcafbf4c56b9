//! Long-format price CSV loading.
//!
//! Expected header (any column order, case-insensitive): `crop,month,value`.

use crate::conversion::{parse_month, parse_value};
use crate::error_handling::{CliError, CliResult};
use agrifcst_core::{normalize_crop, PredictorOptions, PricePredictor, TimeSeriesRecord};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Records per normalised crop name, sorted by date.
pub type CropRecords = BTreeMap<String, Vec<TimeSeriesRecord>>;

fn column(headers: &csv::StringRecord, name: &'static str) -> CliResult<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or(CliError::MissingColumn(name))
}

/// Read price rows from any reader.
///
/// Rows with an empty or non-numeric value are dropped. Each crop's rows
/// are sorted by date; duplicate dates are left for the caller to reject.
pub fn read_prices<R: Read>(reader: R) -> CliResult<CropRecords> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let crop_idx = column(&headers, "crop")?;
    let month_idx = column(&headers, "month")?;
    let value_idx = column(&headers, "value")?;

    let mut crops = CropRecords::new();
    let mut dropped = 0usize;
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());

        let crop = normalize_crop(record.get(crop_idx).unwrap_or_default());
        if crop.is_empty() {
            dropped += 1;
            continue;
        }
        let Some(value) = record.get(value_idx).and_then(parse_value) else {
            dropped += 1;
            continue;
        };
        let raw_month = record.get(month_idx).unwrap_or_default();
        let date = parse_month(raw_month).ok_or_else(|| CliError::InvalidMonth {
            value: raw_month.to_string(),
            line,
        })?;

        crops
            .entry(crop)
            .or_default()
            .push(TimeSeriesRecord::new(date, value));
    }

    if dropped > 0 {
        tracing::debug!(dropped, "skipped rows without a usable crop or value");
    }

    for records in crops.values_mut() {
        records.sort_by_key(|r| r.date);
    }

    Ok(crops)
}

fn check_unique_dates(crop: &str, records: &[TimeSeriesRecord]) -> CliResult<()> {
    match records.windows(2).find(|w| w[0].date == w[1].date) {
        Some(pair) => Err(CliError::DuplicateDate {
            crop: crop.to_string(),
            date: pair[0].date,
        }),
        None => Ok(()),
    }
}

/// Read a price CSV from disk.
pub fn load_prices(path: &Path) -> CliResult<CropRecords> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_prices(BufReader::new(file))
}

/// Build a session from a price CSV.
///
/// Crops are loaded independently: a crop with duplicate dates or invalid
/// prices is logged and left out, the others stay available.
pub fn load_predictor(path: &Path, options: PredictorOptions) -> CliResult<PricePredictor> {
    let mut predictor = PricePredictor::new(options)?;
    for (crop, records) in load_prices(path)? {
        let count = records.len();
        let loaded = check_unique_dates(&crop, &records)
            .and_then(|()| predictor.load_series(&crop, records).map_err(CliError::from));
        match loaded {
            Ok(_) => tracing::info!(crop = %crop, records = count, "loaded {} records", count),
            Err(e) => tracing::warn!(crop = %crop, error = %e, "crop skipped"),
        }
    }
    Ok(predictor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    #[test]
    fn test_groups_and_sorts_by_crop() {
        let csv = "crop,month,value\n\
                   Pepper,2023-02-01,510\n\
                   coffee,2023-01,300\n\
                   pepper,2023-01-01,500\n";
        let crops = read_prices(csv.as_bytes()).unwrap();

        assert_eq!(crops.keys().collect::<Vec<_>>(), vec!["coffee", "pepper"]);
        let pepper = &crops["pepper"];
        assert_eq!(pepper[0].date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(pepper[1].value, 510.0);
    }

    #[test]
    fn test_drops_missing_values() {
        let csv = "month,crop,value\n2023-01-01,tea,\n2023-02-01,tea,abc\n2023-03-01,tea,12.5\n";
        let crops = read_prices(csv.as_bytes()).unwrap();
        assert_eq!(crops["tea"].len(), 1);
        assert_eq!(crops["tea"][0].value, 12.5);
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let csv = "crop,month,value\ntea,2023-01-01,1\ntea,2023-01,2\n";
        let crops = read_prices(csv.as_bytes()).unwrap();
        assert!(matches!(
            check_unique_dates("tea", &crops["tea"]),
            Err(CliError::DuplicateDate { .. })
        ));
    }

    #[test]
    fn test_bad_crop_does_not_block_the_others() {
        let mut csv = String::from("crop,month,value\n");
        for i in 0..24 {
            csv.push_str(&format!("pepper,{}-{:02}-01,{}\n", 2020 + i / 12, i % 12 + 1, 500 + i));
        }
        csv.push_str("tea,2020-01-01,-5\n");
        csv.push_str("coffee,2020-01-01,300\ncoffee,2020-01,310\n");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(csv.as_bytes()).unwrap();

        let predictor = load_predictor(file.path(), PredictorOptions::default()).unwrap();
        let crops: Vec<String> = predictor.crop_list().into_iter().map(|c| c.value).collect();
        assert_eq!(crops, vec!["pepper"]);
        assert_eq!(predictor.historical("pepper", 6).unwrap().data_points, 6);
    }

    #[test]
    fn test_bad_header_and_month() {
        let csv = "crop,date,value\ntea,2023-01-01,1\n";
        assert!(matches!(
            read_prices(csv.as_bytes()),
            Err(CliError::MissingColumn("month"))
        ));

        let csv = "crop,month,value\ntea,January,1\n";
        assert!(matches!(
            read_prices(csv.as_bytes()),
            Err(CliError::InvalidMonth { line: 2, .. })
        ));
    }
}
