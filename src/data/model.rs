use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Schema – column names of the claims dataset
// ---------------------------------------------------------------------------

/// Claim identifier. Not unique per row (a claim can appear more than once),
/// so claim counts are distinct counts.
pub const CLAIM_NUMBER: &str = "claim_number";

/// Categorical columns offered as multi-select filters.
pub const CATEGORICAL_COLUMNS: [&str; 6] = [
    "source_system",
    "general_nature_of_loss",
    "line_of_business",
    "claim_status",
    "fault_rating",
    "fault_categorisation",
];

/// Columns normalised to calendar dates on load.
pub const DATE_COLUMNS: [&str; 8] = [
    "claim_received_date",
    "claim_loss_date",
    "claim_finalised_date",
    "original_verified_date_of_loss_time",
    "last_verified_date_of_loss_time",
    "catastrophe_valid_from_date_time",
    "catastrophe_valid_to_date_time",
    "update_date",
];

/// Columns offered as date-range filters. `update_date` is normalised on
/// load but carries no range filter.
pub const DATE_FILTER_COLUMNS: [&str; 7] = [
    "claim_received_date",
    "claim_loss_date",
    "claim_finalised_date",
    "original_verified_date_of_loss_time",
    "last_verified_date_of_loss_time",
    "catastrophe_valid_from_date_time",
    "catastrophe_valid_to_date_time",
];

/// Columns used by the auxiliary report breakdowns.
pub const LOSS_LOCATION_CITY: &str = "loss_location_city";
pub const CLAIM_OWNER_FIRST_NAME: &str = "claim_owner_first_name";
pub const CLAIM_OWNER_LAST_NAME: &str = "claim_owner_last_name";

// ---------------------------------------------------------------------------
// Value – a single cell of a claim record
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common tabular dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Calendar date; time-of-day is dropped during load.
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Whether the cell is missing.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The calendar date, if this cell holds one.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ClaimRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single claim record (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRecord {
    /// Dynamic columns: column_name → value.
    pub values: BTreeMap<String, Value>,
}

impl ClaimRecord {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        ClaimRecord { values }
    }

    /// Cell for `column`; an absent column reads as missing.
    pub fn get(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&Value::Null)
    }

    /// Date cell for `column`, if present and parsed.
    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        self.get(column).as_date()
    }
}

// ---------------------------------------------------------------------------
// DateBounds – observed [min, max] of a date column
// ---------------------------------------------------------------------------

/// Dataset-wide minimum and maximum of a date column, over non-missing
/// cells only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

// ---------------------------------------------------------------------------
// ClaimsDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
#[derive(Debug, Clone, Default)]
pub struct ClaimsDataset {
    /// All claim records (rows).
    pub records: Vec<ClaimRecord>,
    /// Ordered list of column names.
    pub column_names: Vec<String>,
    /// For each column the sorted set of distinct non-missing values.
    /// This is the selectable-option universe for categorical filters; rows
    /// with a missing value stay in `records` but contribute nothing here.
    pub unique_values: BTreeMap<String, BTreeSet<Value>>,
    /// Observed [min, max] per date column; absent when every cell of the
    /// column failed to parse.
    pub date_bounds: BTreeMap<String, DateBounds>,
}

impl ClaimsDataset {
    /// Build column indices from loaded records, with column order taken
    /// from the sorted union of observed columns.
    pub fn from_records(records: Vec<ClaimRecord>) -> Self {
        let mut column_names: BTreeSet<String> = BTreeSet::new();
        for rec in &records {
            for col in rec.values.keys() {
                column_names.insert(col.clone());
            }
        }
        Self::from_records_with_columns(records, column_names.into_iter().collect())
    }

    /// Build column indices from loaded records, keeping the given column
    /// order (the source file's header order).
    pub fn from_records_with_columns(records: Vec<ClaimRecord>, column_names: Vec<String>) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<Value>> = BTreeMap::new();
        for rec in &records {
            for (col, val) in &rec.values {
                if val.is_null() {
                    continue;
                }
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }

        let mut date_bounds = BTreeMap::new();
        for col in DATE_COLUMNS {
            let mut dates = records.iter().filter_map(|r| r.date(col));
            if let Some(first) = dates.next() {
                let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
                date_bounds.insert(col.to_string(), DateBounds { min, max });
            }
        }

        ClaimsDataset {
            records,
            column_names,
            unique_values,
            date_bounds,
        }
    }

    /// Number of claim records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, Value)]) -> ClaimRecord {
        ClaimRecord::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unique_values_exclude_missing_cells() {
        let ds = ClaimsDataset::from_records(vec![
            record(&[("claim_status", Value::String("Open".into()))]),
            record(&[("claim_status", Value::Null)]),
            record(&[("claim_status", Value::String("Closed".into()))]),
        ]);

        let options = &ds.unique_values["claim_status"];
        assert_eq!(options.len(), 2);
        assert!(!options.contains(&Value::Null));
        // The row with the missing status is still part of the dataset.
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn date_bounds_span_observed_dates_only() {
        let ds = ClaimsDataset::from_records(vec![
            record(&[("claim_received_date", Value::Date(date(2024, 3, 5)))]),
            record(&[("claim_received_date", Value::Null)]),
            record(&[("claim_received_date", Value::Date(date(2023, 11, 20)))]),
        ]);

        let bounds = ds.date_bounds["claim_received_date"];
        assert_eq!(bounds.min, date(2023, 11, 20));
        assert_eq!(bounds.max, date(2024, 3, 5));
        // A column with no parsed date at all has no bounds entry.
        assert!(!ds.date_bounds.contains_key("claim_finalised_date"));
    }

    #[test]
    fn absent_column_reads_as_missing() {
        let rec = record(&[("claim_status", Value::String("Open".into()))]);
        assert!(rec.get("fault_rating").is_null());
        assert_eq!(rec.date("claim_loss_date"), None);
    }

    #[test]
    fn value_ordering_is_total_across_types() {
        let mut set = BTreeSet::new();
        set.insert(Value::String("b".into()));
        set.insert(Value::Null);
        set.insert(Value::Integer(3));
        set.insert(Value::Date(date(2024, 1, 1)));
        set.insert(Value::String("a".into()));
        let ordered: Vec<Value> = set.into_iter().collect();
        assert_eq!(ordered[0], Value::Null);
        assert_eq!(ordered[1], Value::Integer(3));
        assert_eq!(ordered[2], Value::String("a".into()));
        assert_eq!(ordered[4], Value::Date(date(2024, 1, 1)));
    }
}
