use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::model::{
    ClaimRecord, ClaimsDataset, DateBounds, Value, CLAIM_NUMBER, CATEGORICAL_COLUMNS,
    DATE_FILTER_COLUMNS,
};

// ---------------------------------------------------------------------------
// Selection – one categorical column's multi-select state
// ---------------------------------------------------------------------------

/// Multi-select state for a categorical column.
///
/// `Unrestricted` is an explicit variant rather than an "All" entry in the
/// selected set, so a real category value spelled "All" cannot collide
/// with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// No restriction; rows with a missing value pass too.
    Unrestricted,
    /// Keep rows whose value is a member of the set. An empty set matches
    /// nothing (every value de-selected is a valid state, not an error).
    Subset(BTreeSet<Value>),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Unrestricted
    }
}

impl Selection {
    pub fn subset<I: IntoIterator<Item = Value>>(values: I) -> Self {
        Selection::Subset(values.into_iter().collect())
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Selection::Unrestricted)
    }

    /// Whether a row with this cell value passes the selection.
    pub fn allows(&self, value: &Value) -> bool {
        match self {
            Selection::Unrestricted => true,
            // Missing values are never part of the option universe, so a
            // concrete subset excludes them.
            Selection::Subset(selected) => !value.is_null() && selected.contains(value),
        }
    }
}

// ---------------------------------------------------------------------------
// DateRange – inclusive [start, end] over one date column
// ---------------------------------------------------------------------------

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Full observed range of a column, the default widget state.
    pub fn from_bounds(bounds: &DateBounds) -> Self {
        DateRange {
            start: bounds.min,
            end: bounds.max,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria – the full request-scoped filter state
// ---------------------------------------------------------------------------

/// Everything the user has selected, rebuilt from widget state on each
/// interaction. Filters compose conjunctively; within a column the
/// selected values compose disjunctively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Exact-match claim-number allow-list; empty = no restriction.
    pub claim_numbers: BTreeSet<String>,
    /// Per categorical column multi-select state. An absent column is
    /// unrestricted.
    pub categorical: BTreeMap<String, Selection>,
    /// Per date column inclusive range. An absent column is unrestricted;
    /// a present range excludes rows with a missing date in that column.
    pub date_ranges: BTreeMap<String, DateRange>,
}

impl FilterCriteria {
    /// No restriction at all; `apply` returns every row.
    pub fn unrestricted() -> Self {
        FilterCriteria::default()
    }

    /// The dashboard's default state: every categorical filter
    /// unrestricted, every filterable date column ranged to its observed
    /// [min, max]. Columns with no valid date at all get no range.
    pub fn default_for(dataset: &ClaimsDataset) -> Self {
        let mut criteria = FilterCriteria::default();
        for col in CATEGORICAL_COLUMNS {
            criteria
                .categorical
                .insert(col.to_string(), Selection::Unrestricted);
        }
        for col in DATE_FILTER_COLUMNS {
            if let Some(bounds) = dataset.date_bounds.get(col) {
                criteria
                    .date_ranges
                    .insert(col.to_string(), DateRange::from_bounds(bounds));
            }
        }
        criteria
    }

    /// Parse free-text claim-number input ("A1, A2, ...") into the
    /// allow-list: comma-separated, whitespace trimmed, empty tokens
    /// discarded.
    pub fn parse_claim_numbers(input: &str) -> BTreeSet<String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|tok| !tok.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Replace the allow-list from free-text input.
    pub fn set_claim_number_input(&mut self, input: &str) {
        self.claim_numbers = Self::parse_claim_numbers(input);
    }

    fn passes(&self, record: &ClaimRecord) -> bool {
        if !self.claim_numbers.is_empty() {
            let number = record.get(CLAIM_NUMBER);
            if number.is_null() || !self.claim_numbers.contains(&number.to_string()) {
                return false;
            }
        }
        for (col, selection) in &self.categorical {
            if !selection.allows(record.get(col)) {
                return false;
            }
        }
        for (col, range) in &self.date_ranges {
            // "between" on a missing date is false.
            match record.date(col) {
                Some(d) if range.contains(d) => {}
                _ => return false,
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// FilteredView – the rows surviving the current criteria
// ---------------------------------------------------------------------------

/// A non-destructive view over the dataset: the source records are never
/// mutated, only indexed.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a ClaimsDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn dataset(&self) -> &'a ClaimsDataset {
        self.dataset
    }

    /// Indices into the source dataset, in row order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn columns(&self) -> &[String] {
        &self.dataset.column_names
    }

    /// Surviving records, in source order.
    pub fn records(&self) -> impl Iterator<Item = &'a ClaimRecord> + '_ {
        self.indices.iter().map(|&i| &self.dataset.records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Materialise the view as an independent dataset (same schema).
    pub fn to_dataset(&self) -> ClaimsDataset {
        ClaimsDataset::from_records_with_columns(
            self.records().cloned().collect(),
            self.dataset.column_names.clone(),
        )
    }
}

/// Apply the criteria to the dataset, keeping rows that pass every active
/// filter. Per-column predicates are independent, so application order
/// cannot change the result; an empty result is a legitimate outcome.
pub fn apply<'a>(dataset: &'a ClaimsDataset, criteria: &FilterCriteria) -> FilteredView<'a> {
    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.passes(rec))
        .map(|(i, _)| i)
        .collect();
    FilteredView { dataset, indices }
}
