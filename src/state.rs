use std::collections::BTreeSet;

use crate::data::filter::{apply, DateRange, FilterCriteria, FilteredView, Selection};
use crate::data::model::{ClaimsDataset, Value};

// ---------------------------------------------------------------------------
// Report session state
// ---------------------------------------------------------------------------

/// Interaction state for one report session, independent of rendering.
///
/// A renderer mutates this through the methods below; every mutation
/// recomputes the surviving row indices, since all aggregates are stale
/// the instant any criterion changes. The dataset itself is never
/// mutated and can be shared read-only across sessions.
pub struct ReportState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<ClaimsDataset>,

    /// Current filter criteria, rebuilt from widget state.
    pub criteria: FilterCriteria,

    /// Indices of records passing the current criteria (cached).
    pub visible_indices: Vec<usize>,
}

impl Default for ReportState {
    fn default() -> Self {
        Self {
            dataset: None,
            criteria: FilterCriteria::unrestricted(),
            visible_indices: Vec::new(),
        }
    }
}

impl ReportState {
    /// Ingest a newly loaded dataset and seed the default criteria
    /// (unrestricted selections, full observed date ranges).
    pub fn set_dataset(&mut self, dataset: ClaimsDataset) {
        self.criteria = FilterCriteria::default_for(&dataset);
        self.dataset = Some(dataset);
        self.refilter();
    }

    /// Recompute `visible_indices` after a criteria change.
    pub fn refilter(&mut self) {
        self.visible_indices = match &self.dataset {
            Some(ds) => apply(ds, &self.criteria).indices().to_vec(),
            None => Vec::new(),
        };
    }

    /// The current filtered view, if a dataset is loaded.
    pub fn current_view(&self) -> Option<FilteredView<'_>> {
        self.dataset
            .as_ref()
            .map(|ds| apply(ds, &self.criteria))
    }

    /// Replace the claim-number allow-list from free-text input.
    pub fn set_claim_number_input(&mut self, input: &str) {
        self.criteria.set_claim_number_input(input);
        self.refilter();
    }

    /// Lift the restriction on a categorical column ("All").
    pub fn select_all(&mut self, column: &str) {
        self.criteria
            .categorical
            .insert(column.to_string(), Selection::Unrestricted);
        self.refilter();
    }

    /// De-select every value in a column ("None"); matches nothing.
    pub fn select_none(&mut self, column: &str) {
        self.criteria
            .categorical
            .insert(column.to_string(), Selection::Subset(BTreeSet::new()));
        self.refilter();
    }

    /// Toggle a single value in a column's selection. Toggling from
    /// `Unrestricted` materialises the column's full option universe minus
    /// the value; re-selecting every option collapses back to
    /// `Unrestricted`.
    pub fn toggle_value(&mut self, column: &str, value: &Value) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let universe = ds.unique_values.get(column).cloned().unwrap_or_default();

        let selection = self
            .criteria
            .categorical
            .entry(column.to_string())
            .or_default();
        let mut selected = match selection {
            Selection::Unrestricted => universe.clone(),
            Selection::Subset(s) => s.clone(),
        };
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        *selection = if !universe.is_empty() && selected == universe {
            Selection::Unrestricted
        } else {
            Selection::Subset(selected)
        };
        self.refilter();
    }

    /// Narrow (or widen) one date column's inclusive range.
    pub fn set_date_range(&mut self, column: &str, range: DateRange) {
        self.criteria.date_ranges.insert(column.to_string(), range);
        self.refilter();
    }

    /// Reset one date column to its observed-bounds default. A column
    /// with no valid dates loses its range entirely.
    pub fn reset_date_range(&mut self, column: &str) {
        let bounds = self
            .dataset
            .as_ref()
            .and_then(|ds| ds.date_bounds.get(column).copied());
        match bounds {
            Some(b) => {
                self.criteria
                    .date_ranges
                    .insert(column.to_string(), DateRange::from_bounds(&b));
            }
            None => {
                self.criteria.date_ranges.remove(column);
            }
        }
        self.refilter();
    }
}
