use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use super::filter::FilteredView;
use super::model::Value;

// ---------------------------------------------------------------------------
// Count tables over a filtered view
// ---------------------------------------------------------------------------
//
// Every function here is a pure read of the view: recomputed on demand
// whenever the criteria change, never cached, never mutating its input.
// An empty view yields empty mappings and zero counts.

/// Number of distinct non-missing values in `column` (the "Total Claims"
/// metric over `claim_number`, which is not unique per row).
pub fn distinct_count(view: &FilteredView, column: &str) -> usize {
    view.records()
        .map(|rec| rec.get(column))
        .filter(|v| !v.is_null())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Row count per distinct value of `column`. Missing cells are counted
/// under [`Value::Null`], so a chart can show them when present.
pub fn count_by_category(view: &FilteredView, column: &str) -> BTreeMap<Value, usize> {
    let mut counts = BTreeMap::new();
    for rec in view.records() {
        *counts.entry(rec.get(column).clone()).or_insert(0) += 1;
    }
    counts
}

/// Row count per distinct date of `column`, ascending by date (the
/// time-series chart). Rows with a missing date are excluded.
pub fn count_by_date(view: &FilteredView, column: &str) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for rec in view.records() {
        if let Some(d) = rec.date(column) {
            *counts.entry(d).or_insert(0) += 1;
        }
    }
    counts
}

/// Year-month bucket key, e.g. "2024-03". Sorts chronologically.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Two-level monthly trend: per-month row counts split by a status column,
/// plus the per-month total across all statuses (the overlaid trend line).
///
/// Sparse by construction: a (month, status) pair with no rows is absent,
/// not zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyStatusTrend {
    /// month → status value → row count.
    pub counts: BTreeMap<String, BTreeMap<Value, usize>>,
    /// month → row count across all statuses.
    pub totals: BTreeMap<String, usize>,
}

/// Bucket `date_column` to year-month and count rows per (month, status).
/// Rows with a missing date are excluded; a missing status counts under
/// [`Value::Null`].
pub fn count_by_month(
    view: &FilteredView,
    date_column: &str,
    status_column: &str,
) -> MonthlyStatusTrend {
    let mut trend = MonthlyStatusTrend::default();
    for rec in view.records() {
        let Some(d) = rec.date(date_column) else {
            continue;
        };
        let month = month_key(d);
        *trend
            .counts
            .entry(month.clone())
            .or_default()
            .entry(rec.get(status_column).clone())
            .or_insert(0) += 1;
        *trend.totals.entry(month).or_insert(0) += 1;
    }
    trend
}

/// Multi-column group-by count (e.g. claims per owner first+last name).
/// Group keys keep the column order given.
pub fn count_by_group(view: &FilteredView, columns: &[&str]) -> BTreeMap<Vec<Value>, usize> {
    let mut counts = BTreeMap::new();
    for rec in view.records() {
        let key: Vec<Value> = columns.iter().map(|col| rec.get(col).clone()).collect();
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterCriteria};
    use crate::data::model::{ClaimRecord, ClaimsDataset};

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn dataset(rows: Vec<Vec<(&str, Value)>>) -> ClaimsDataset {
        ClaimsDataset::from_records(
            rows.into_iter()
                .map(|pairs| {
                    ClaimRecord::new(
                        pairs
                            .into_iter()
                            .map(|(k, v)| (k.to_string(), v))
                            .collect(),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn distinct_count_ignores_duplicates_and_missing() {
        let ds = dataset(vec![
            vec![("claim_number", s("A1"))],
            vec![("claim_number", s("A1"))],
            vec![("claim_number", s("B2"))],
            vec![("claim_number", Value::Null)],
        ]);
        let view = apply(&ds, &FilterCriteria::unrestricted());
        assert_eq!(distinct_count(&view, "claim_number"), 2);
    }

    #[test]
    fn category_counts_match_row_counts() {
        let ds = dataset(vec![
            vec![("claim_status", s("Open"))],
            vec![("claim_status", s("Open"))],
            vec![("claim_status", s("Closed"))],
            vec![("claim_status", s("Closed"))],
            vec![("claim_status", s("Closed"))],
        ]);
        let view = apply(&ds, &FilterCriteria::unrestricted());
        let counts = count_by_category(&view, "claim_status");
        assert_eq!(counts[&s("Open")], 2);
        assert_eq!(counts[&s("Closed")], 3);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn category_counts_surface_missing_values() {
        let ds = dataset(vec![
            vec![("fault_rating", s("At Fault"))],
            vec![("fault_rating", Value::Null)],
        ]);
        let view = apply(&ds, &FilterCriteria::unrestricted());
        let counts = count_by_category(&view, "fault_rating");
        assert_eq!(counts[&Value::Null], 1);
    }

    #[test]
    fn date_counts_are_ascending_and_skip_missing() {
        let ds = dataset(vec![
            vec![("claim_received_date", date(2024, 2, 1))],
            vec![("claim_received_date", date(2024, 1, 1))],
            vec![("claim_received_date", date(2024, 2, 1))],
            vec![("claim_received_date", Value::Null)],
        ]);
        let view = apply(&ds, &FilterCriteria::unrestricted());
        let counts = count_by_date(&view, "claim_received_date");
        let days: Vec<(NaiveDate, usize)> = counts.into_iter().collect();
        assert_eq!(
            days,
            vec![
                (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 1),
                (NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), 2),
            ]
        );
    }

    #[test]
    fn monthly_trend_is_sparse_with_totals() {
        let ds = dataset(vec![
            vec![("claim_received_date", date(2024, 1, 3)), ("claim_status", s("Open"))],
            vec![("claim_received_date", date(2024, 1, 20)), ("claim_status", s("Closed"))],
            vec![("claim_received_date", date(2024, 3, 7)), ("claim_status", s("Open"))],
            vec![("claim_received_date", Value::Null), ("claim_status", s("Open"))],
        ]);
        let view = apply(&ds, &FilterCriteria::unrestricted());
        let trend = count_by_month(&view, "claim_received_date", "claim_status");

        assert_eq!(trend.counts["2024-01"][&s("Open")], 1);
        assert_eq!(trend.counts["2024-01"][&s("Closed")], 1);
        assert_eq!(trend.counts["2024-03"][&s("Open")], 1);
        // No zero-filled buckets: February and (2024-03, Closed) are absent.
        assert!(!trend.counts.contains_key("2024-02"));
        assert!(!trend.counts["2024-03"].contains_key(&s("Closed")));
        assert_eq!(trend.totals["2024-01"], 2);
        assert_eq!(trend.totals["2024-03"], 1);
    }

    #[test]
    fn group_counts_pair_columns_in_order() {
        let ds = dataset(vec![
            vec![
                ("claim_owner_first_name", s("Dana")),
                ("claim_owner_last_name", s("Reid")),
            ],
            vec![
                ("claim_owner_first_name", s("Dana")),
                ("claim_owner_last_name", s("Reid")),
            ],
            vec![
                ("claim_owner_first_name", s("Lee")),
                ("claim_owner_last_name", s("Okafor")),
            ],
        ]);
        let view = apply(&ds, &FilterCriteria::unrestricted());
        let counts = count_by_group(&view, &["claim_owner_first_name", "claim_owner_last_name"]);
        assert_eq!(counts[&vec![s("Dana"), s("Reid")]], 2);
        assert_eq!(counts[&vec![s("Lee"), s("Okafor")]], 1);
    }

    #[test]
    fn empty_view_yields_empty_aggregates() {
        let ds = ClaimsDataset::default();
        let view = apply(&ds, &FilterCriteria::unrestricted());
        assert_eq!(distinct_count(&view, "claim_number"), 0);
        assert!(count_by_category(&view, "claim_status").is_empty());
        assert!(count_by_date(&view, "claim_received_date").is_empty());
        let trend = count_by_month(&view, "claim_received_date", "claim_status");
        assert!(trend.counts.is_empty() && trend.totals.is_empty());
        assert!(count_by_group(&view, &["loss_location_city"]).is_empty());
    }
}
