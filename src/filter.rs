//! Filter State and the Filter Engine.
//!
//! A [`FilterState`] holds, per column, the set of accepted display values.
//! Selections for different columns combine with logical AND; values within
//! one column combine with logical OR. Missing cells participate under
//! their rendered form `"None"`, so they are ordinary filter options.
//!
//! Empty-selection convention: a column the user never touched imposes no
//! restriction. Once a column has been touched, an empty selection excludes
//! every row. `clear()` both empties the selection and marks the column
//! touched; `reset_for()` returns it to the untouched pass-through state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::dataset::{Column, Dataset, Record};

pub type Selection = BTreeSet<String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    selections: BTreeMap<Column, Selection>,
    touched: BTreeSet<Column>,
}

impl FilterState {
    /// Initializes every column's selection to all values present in the
    /// dataset, with nothing touched: the full passthrough state.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let mut selections = BTreeMap::new();
        for column in Column::ALL {
            selections.insert(column, distinct_values(dataset.records(), column));
        }
        Self {
            selections,
            touched: BTreeSet::new(),
        }
    }

    /// Replaces a column's selection wholesale and marks it touched.
    pub fn set<I, S>(&mut self, column: Column, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selection = values.into_iter().map(Into::into).collect();
        self.selections.insert(column, selection);
        self.touched.insert(column);
    }

    /// Toggles a single value in or out of a column's selection.
    pub fn toggle(&mut self, column: Column, value: &str) {
        let selection = self.selections.entry(column).or_default();
        if !selection.remove(value) {
            selection.insert(value.to_string());
        }
        self.touched.insert(column);
    }

    /// Selects every value the dataset holds for the column ("All" checkbox).
    pub fn select_all(&mut self, column: Column, dataset: &Dataset) {
        self.selections
            .insert(column, distinct_values(dataset.records(), column));
        self.touched.insert(column);
    }

    /// Empties a column's selection; with the column now touched, no row
    /// passes it.
    pub fn clear(&mut self, column: Column) {
        self.selections.insert(column, Selection::new());
        self.touched.insert(column);
    }

    /// The "All Clear" panel action: every column touched and emptied.
    pub fn clear_all(&mut self) {
        for column in Column::ALL {
            self.clear(column);
        }
    }

    /// Returns a column to the untouched pass-through state.
    pub fn reset_for(&mut self, column: Column) {
        self.selections.remove(&column);
        self.touched.remove(&column);
    }

    /// The active restriction for a column: `None` means pass-through.
    pub fn restriction(&self, column: Column) -> Option<&Selection> {
        if self.touched.contains(&column) {
            self.selections.get(&column)
        } else {
            None
        }
    }

    pub fn is_touched(&self, column: Column) -> bool {
        self.touched.contains(&column)
    }

    /// The selectable values a filter widget would offer for a column.
    pub fn options(&self, column: Column) -> Option<&Selection> {
        self.selections.get(&column)
    }
}

/// Distinct display values for a column, as a sorted set.
pub fn distinct_values(records: &[Record], column: Column) -> Selection {
    records
        .iter()
        .map(|record| record.display(column).to_string())
        .collect()
}

/// The Filter Engine: intersects the dataset against the filter state.
///
/// Pure and order-preserving; the result is always a subsequence of
/// `records`. With no touched columns this is the identity.
pub fn apply_filters(records: &[Record], filters: &FilterState) -> Vec<Record> {
    records
        .iter()
        .filter(|record| record_passes(record, filters))
        .cloned()
        .collect()
}

fn record_passes(record: &Record, filters: &FilterState) -> bool {
    Column::ALL.into_iter().all(|column| {
        match filters.restriction(column) {
            Some(selection) => selection.contains(record.display(column)),
            None => true,
        }
    })
}
