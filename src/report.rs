use std::collections::BTreeMap;
use std::io::Write;

use chrono::NaiveDate;

use crate::data::aggregate::{
    count_by_category, count_by_date, count_by_group, count_by_month, distinct_count,
    MonthlyStatusTrend,
};
use crate::data::filter::FilteredView;
use crate::data::model::{
    Value, CLAIM_NUMBER, CLAIM_OWNER_FIRST_NAME, CLAIM_OWNER_LAST_NAME, LOSS_LOCATION_CITY,
};

// ---------------------------------------------------------------------------
// ReportSummary – everything the claim report renders
// ---------------------------------------------------------------------------

/// The aggregate bundle behind the claim report: a renderer turns these
/// into metric cards and charts; the bundled CLI prints them as text.
///
/// Built fresh from the current [`FilteredView`] on every criteria change;
/// nothing here is incrementally maintained.
#[derive(Debug, Clone, Default)]
pub struct ReportSummary {
    /// Distinct `claim_number` count ("Total Claims").
    pub total_claims: usize,
    /// Claims by status (bar and pie charts).
    pub status_counts: BTreeMap<Value, usize>,
    /// Claims per received date (time-series line chart).
    pub claims_over_time: BTreeMap<NaiveDate, usize>,
    /// Claims by line of business (horizontal bar chart).
    pub line_of_business_counts: BTreeMap<Value, usize>,
    /// Monthly status trend with per-month totals (grouped bars + line).
    pub monthly_status_trend: MonthlyStatusTrend,
    /// Claims by loss-location city.
    pub city_counts: BTreeMap<Value, usize>,
    /// Claims per owner (first name, last name).
    pub owner_counts: BTreeMap<Vec<Value>, usize>,
}

impl ReportSummary {
    pub fn build(view: &FilteredView) -> Self {
        ReportSummary {
            total_claims: distinct_count(view, CLAIM_NUMBER),
            status_counts: count_by_category(view, "claim_status"),
            claims_over_time: count_by_date(view, "claim_received_date"),
            line_of_business_counts: count_by_category(view, "line_of_business"),
            monthly_status_trend: count_by_month(view, "claim_received_date", "claim_status"),
            city_counts: count_by_category(view, LOSS_LOCATION_CITY),
            owner_counts: count_by_group(
                view,
                &[CLAIM_OWNER_FIRST_NAME, CLAIM_OWNER_LAST_NAME],
            ),
        }
    }

    /// Plain-text rendering for the CLI consumer.
    pub fn write_text<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "Filtered Claims Statistics")?;
        writeln!(out, "Total Claims: {}", self.total_claims)?;

        writeln!(out, "\nClaims by Status")?;
        write_counts(&mut out, &self.status_counts)?;

        writeln!(out, "\nClaims Over Time")?;
        for (date, count) in &self.claims_over_time {
            writeln!(out, "  {date}  {count}")?;
        }

        writeln!(out, "\nClaims by Line of Business")?;
        write_counts(&mut out, &self.line_of_business_counts)?;

        writeln!(out, "\nMonthly Claim Status Trend")?;
        for (month, by_status) in &self.monthly_status_trend.counts {
            let total = self.monthly_status_trend.totals.get(month).copied().unwrap_or(0);
            let parts: Vec<String> = by_status
                .iter()
                .map(|(status, count)| format!("{}: {count}", label(status)))
                .collect();
            writeln!(out, "  {month}  total {total}  ({})", parts.join(", "))?;
        }

        writeln!(out, "\nClaims by Loss Location (City)")?;
        write_counts(&mut out, &self.city_counts)?;

        writeln!(out, "\nClaims by Claim Owner")?;
        for (owner, count) in &self.owner_counts {
            let name: Vec<String> = owner.iter().map(label).collect();
            writeln!(out, "  {}  {count}", name.join(" "))?;
        }
        Ok(())
    }
}

fn label(value: &Value) -> String {
    if value.is_null() {
        "(missing)".to_string()
    } else {
        value.to_string()
    }
}

fn write_counts<W: Write>(out: &mut W, counts: &BTreeMap<Value, usize>) -> std::io::Result<()> {
    for (value, count) in counts {
        writeln!(out, "  {}  {count}", label(value))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterCriteria};
    use crate::data::model::{ClaimRecord, ClaimsDataset};

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    fn dataset() -> ClaimsDataset {
        let mut records = Vec::new();
        for (number, status, day) in [
            ("A1", "Open", 3),
            ("A1", "Open", 3),
            ("B2", "Closed", 20),
        ] {
            records.push(ClaimRecord::new(
                [
                    ("claim_number".to_string(), s(number)),
                    ("claim_status".to_string(), s(status)),
                    ("line_of_business".to_string(), s("Motor")),
                    (
                        "claim_received_date".to_string(),
                        Value::Date(NaiveDate::from_ymd_opt(2024, 1, day).unwrap()),
                    ),
                    ("loss_location_city".to_string(), s("Perth")),
                    ("claim_owner_first_name".to_string(), s("Dana")),
                    ("claim_owner_last_name".to_string(), s("Reid")),
                ]
                .into(),
            ));
        }
        ClaimsDataset::from_records(records)
    }

    #[test]
    fn summary_bundles_every_report_aggregate() {
        let ds = dataset();
        let view = apply(&ds, &FilterCriteria::unrestricted());
        let summary = ReportSummary::build(&view);

        assert_eq!(summary.total_claims, 2);
        assert_eq!(summary.status_counts[&s("Open")], 2);
        assert_eq!(summary.status_counts[&s("Closed")], 1);
        assert_eq!(summary.line_of_business_counts[&s("Motor")], 3);
        assert_eq!(summary.claims_over_time.len(), 2);
        assert_eq!(summary.monthly_status_trend.totals["2024-01"], 3);
        assert_eq!(summary.city_counts[&s("Perth")], 3);
        assert_eq!(summary.owner_counts[&vec![s("Dana"), s("Reid")]], 3);
    }

    #[test]
    fn empty_view_renders_without_failing() {
        let ds = ClaimsDataset::default();
        let view = apply(&ds, &FilterCriteria::unrestricted());
        let summary = ReportSummary::build(&view);
        assert_eq!(summary.total_claims, 0);

        let mut buf = Vec::new();
        summary.write_text(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Total Claims: 0"));
    }
}
