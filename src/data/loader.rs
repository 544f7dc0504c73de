use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Date64Array, Float32Array, Float64Array,
    Int32Array, Int64Array, StringArray, TimestampMicrosecondArray, TimestampMillisecondArray,
    TimestampNanosecondArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{ClaimRecord, ClaimsDataset, Value, DATE_COLUMNS};

// ---------------------------------------------------------------------------
// LoadError
// ---------------------------------------------------------------------------

/// Why a dataset could not be loaded.
///
/// Callers that want the dashboard's fail-open behavior (missing or corrupt
/// file → empty dataset, never a crash) go through [`load_or_empty`];
/// [`load_file`] keeps the reason assertable.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("unexpected data shape: {0}")]
    Shape(String),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a claims dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – delimited with a header row (the default `Claims.csv`)
/// * `.json`    – records-oriented: `[{ "claim_number": ..., ... }, ...]`
/// * `.parquet` – scalar columns; temporal columns map to calendar dates
///
/// Whatever the format, the columns named in [`DATE_COLUMNS`] are coerced
/// to calendar dates afterwards; a cell that fails to parse becomes
/// missing, never an error.
pub fn load_file(path: &Path) -> Result<ClaimsDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

/// Fail-open wrapper around [`load_file`]: any failure is logged and
/// surfaced as an empty dataset, so the report degrades to a "no data"
/// state instead of crashing.
pub fn load_or_empty(path: &Path) -> ClaimsDataset {
    match load_file(path) {
        Ok(dataset) => {
            log::info!(
                "loaded {} claim records ({} columns) from {}",
                dataset.len(),
                dataset.column_names.len(),
                path.display()
            );
            dataset
        }
        Err(err) => {
            log::error!("failed to load claims data from {}: {err}", path.display());
            ClaimsDataset::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Date coercion
// ---------------------------------------------------------------------------

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Lenient free-form date parsing; time-of-day is discarded.
pub fn parse_date_lenient(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    None
}

/// Normalise the named date columns of one record in place.
fn coerce_dates(record: &mut ClaimRecord) {
    for col in DATE_COLUMNS {
        let Some(value) = record.values.get_mut(col) else {
            continue;
        };
        *value = match value {
            Value::Date(_) | Value::Null => continue,
            Value::String(s) => match parse_date_lenient(s) {
                Some(d) => Value::Date(d),
                None => Value::Null,
            },
            // Numeric or boolean cells carry no usable calendar date.
            _ => Value::Null,
        };
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one claim record per row.
/// Cell types are guessed (int → float → bool → string, empty → missing)
/// before date coercion.
fn load_csv(path: &Path) -> Result<ClaimsDataset, LoadError> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let mut values = BTreeMap::new();
        for (col_idx, cell) in row.iter().enumerate() {
            let Some(col) = headers.get(col_idx) else {
                continue;
            };
            values.insert(col.clone(), guess_value(cell));
        }
        let mut rec = ClaimRecord::new(values);
        coerce_dates(&mut rec);
        records.push(rec);
    }

    Ok(ClaimsDataset::from_records_with_columns(records, headers))
}

fn guess_value(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "claim_number": "CLM-1001",
///     "claim_status": "Open",
///     "claim_received_date": "2024-03-05",
///     ...
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<ClaimsDataset, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::Shape("expected a top-level JSON array of records".into()))?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| LoadError::Shape(format!("row {i} is not a JSON object")))?;

        let mut values = BTreeMap::new();
        for (key, val) in obj {
            values.insert(key.clone(), json_to_value(val));
        }
        let mut rec = ClaimRecord::new(values);
        coerce_dates(&mut rec);
        records.push(rec);
    }

    Ok(ClaimsDataset::from_records(records))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of claim records.
///
/// Scalar columns only: Utf8, Int, Float and Boolean map directly;
/// Date32/Date64 and timestamp columns map to calendar dates (time-of-day
/// dropped). String-typed date columns are coerced afterwards like CSV.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<ClaimsDataset, LoadError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    let mut column_names: Vec<String> = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        if column_names.is_empty() {
            column_names = schema.fields().iter().map(|f| f.name().clone()).collect();
        }

        for row in 0..batch.num_rows() {
            let mut values = BTreeMap::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                let value = extract_value(batch.column(col_idx), row);
                values.insert(field.name().clone(), value);
            }
            let mut rec = ClaimRecord::new(values);
            coerce_dates(&mut rec);
            records.push(rec);
        }
    }

    Ok(ClaimsDataset::from_records_with_columns(records, column_names))
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                Value::String(s.value(row).to_string())
            } else {
                // LargeStringArray
                let s = col.as_string::<i64>();
                Value::String(s.value(row).to_string())
            }
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Value::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Value::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Value::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Value::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            Value::Bool(arr.value(row))
        }
        DataType::Date32 => {
            let arr = col.as_any().downcast_ref::<Date32Array>().unwrap();
            match arr.value_as_date(row) {
                Some(d) => Value::Date(d),
                None => Value::Null,
            }
        }
        DataType::Date64 => {
            let arr = col.as_any().downcast_ref::<Date64Array>().unwrap();
            match arr.value_as_date(row) {
                Some(d) => Value::Date(d),
                None => Value::Null,
            }
        }
        DataType::Timestamp(unit, _) => {
            let dt = match unit {
                TimeUnit::Second => col
                    .as_any()
                    .downcast_ref::<TimestampSecondArray>()
                    .and_then(|a| a.value_as_datetime(row)),
                TimeUnit::Millisecond => col
                    .as_any()
                    .downcast_ref::<TimestampMillisecondArray>()
                    .and_then(|a| a.value_as_datetime(row)),
                TimeUnit::Microsecond => col
                    .as_any()
                    .downcast_ref::<TimestampMicrosecondArray>()
                    .and_then(|a| a.value_as_datetime(row)),
                TimeUnit::Nanosecond => col
                    .as_any()
                    .downcast_ref::<TimestampNanosecondArray>()
                    .and_then(|a| a.value_as_datetime(row)),
            };
            match dt {
                Some(dt) => Value::Date(dt.date()),
                None => Value::Null,
            }
        }
        _ => Value::String(format!("{:?}", col.data_type())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const SAMPLE_CSV: &str = "\
claim_number,claim_status,line_of_business,claim_received_date,claim_finalised_date
CLM-1001,Open,Motor,2024-01-15,
CLM-1002,Closed,Home,2024-02-03,2024-03-01
CLM-1002,Closed,Home,not a date,2024-03-01
";

    #[test]
    fn csv_load_guesses_types_and_coerces_dates() {
        let file = write_temp(".csv", SAMPLE_CSV);
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.column_names,
            vec![
                "claim_number",
                "claim_status",
                "line_of_business",
                "claim_received_date",
                "claim_finalised_date"
            ]
        );
        assert_eq!(
            ds.records[0].get("claim_status"),
            &Value::String("Open".into())
        );
        assert_eq!(
            ds.records[0].date("claim_received_date"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        // Empty cell and unparseable date both read as missing.
        assert!(ds.records[0].get("claim_finalised_date").is_null());
        assert!(ds.records[2].get("claim_received_date").is_null());
    }

    #[test]
    fn loading_the_same_file_twice_is_identical() {
        let file = write_temp(".csv", SAMPLE_CSV);
        let first = load_file(file.path()).unwrap();
        let second = load_file(file.path()).unwrap();
        assert_eq!(first.records, second.records);
        assert_eq!(first.column_names, second.column_names);
    }

    #[test]
    fn json_records_load() {
        let file = write_temp(
            ".json",
            r#"[
                {"claim_number": "CLM-9", "claim_status": "Open",
                 "claim_received_date": "2024-03-05T14:30:00"},
                {"claim_number": "CLM-10", "claim_status": null,
                 "claim_received_date": "nope"}
            ]"#,
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.records[0].date("claim_received_date"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert!(ds.records[1].get("claim_status").is_null());
        assert!(ds.records[1].get("claim_received_date").is_null());
    }

    #[test]
    fn missing_file_degrades_to_empty_dataset() {
        let path = Path::new("/definitely/not/here/Claims.csv");
        let err = load_file(path).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));

        let ds = load_or_empty(path);
        assert!(ds.is_empty());
        assert!(ds.unique_values.is_empty());
        assert!(ds.date_bounds.is_empty());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("claims.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ext) if ext == "xlsx"));
    }

    #[test]
    fn lenient_date_parsing() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_date_lenient("2024-03-05"), d);
        assert_eq!(parse_date_lenient(" 2024-03-05 "), d);
        assert_eq!(parse_date_lenient("2024-03-05 08:15:00"), d);
        assert_eq!(parse_date_lenient("2024-03-05T08:15:00.250"), d);
        assert_eq!(parse_date_lenient("2024-03-05T08:15:00+02:00"), d);
        assert_eq!(parse_date_lenient("03/05/2024"), d);
        assert_eq!(parse_date_lenient(""), None);
        assert_eq!(parse_date_lenient("soon"), None);
    }
}
