//! The coordinator that owns all mutable dashboard state.
//!
//! Dataset and filter selections live here and nowhere else; every
//! consumer receives read-only views. The filtered view and the chart
//! aggregations are recomputed on demand from (Dataset, FilterState) —
//! they are never cached across dataset replacements.

use std::path::{Path, PathBuf};

use log::warn;

use crate::{
    dataset::{Dataset, LoadError},
    filter::{FilterState, apply_filters},
    timeline::MonthlyHistory,
};

#[derive(Debug, Default)]
pub struct Dashboard {
    dataset: Dataset,
    filters: FilterState,
    history: Option<(PathBuf, MonthlyHistory)>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the dataset wholesale and re-initializes every filter to
    /// the all-selected, untouched state.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        self.filters = FilterState::for_dataset(&dataset);
        self.dataset = dataset;
    }

    /// Loads a new dataset from a file. On rejection the previous dataset
    /// and filter selections stay exactly as they were.
    pub fn try_load(
        &mut self,
        path: &Path,
        delimiter: Option<u8>,
        encoding: Option<&str>,
    ) -> Result<(), LoadError> {
        match Dataset::load(path, delimiter, encoding) {
            Ok(dataset) => {
                self.replace_dataset(dataset);
                Ok(())
            }
            Err(err) => {
                warn!("Keeping previous dataset: {err}");
                Err(err)
            }
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    /// The derived Filtered View: a pure function of the current dataset
    /// and selections, recomputed on every call.
    pub fn filtered_view(&self) -> Vec<crate::dataset::Record> {
        apply_filters(self.dataset.records(), &self.filters)
    }

    /// The monthly history, fetched once per directory and cached. Repeat
    /// calls with the same directory never re-read the files, even across
    /// filter changes; asking for a different directory reloads.
    pub fn history(&mut self, dir: &Path) -> &MonthlyHistory {
        let stale = !matches!(&self.history, Some((cached, _)) if cached == dir);
        if stale {
            self.history = Some((dir.to_path_buf(), MonthlyHistory::load(dir)));
        }
        &self.history.as_ref().expect("history loaded above").1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Record};

    fn dataset(brands: &[&str]) -> Dataset {
        Dataset::new(
            brands
                .iter()
                .map(|brand| {
                    let mut r = Record::new();
                    r.set(Column::Brand, brand);
                    r
                })
                .collect(),
        )
    }

    #[test]
    fn rejected_load_keeps_previous_state() {
        let mut dashboard = Dashboard::new();
        dashboard.replace_dataset(dataset(&["Samsung", "LG"]));
        dashboard.filters_mut().set(Column::Brand, ["Samsung"]);

        let temp = tempfile::tempdir().expect("temp dir");
        let bad = temp.path().join("bad.csv");
        std::fs::write(&bad, "Brand,Price\nSamsung,100\n").expect("write file");
        let err = dashboard.try_load(&bad, None, None);
        assert!(matches!(err, Err(LoadError::MissingColumns { .. })));

        assert_eq!(dashboard.dataset().len(), 2);
        assert_eq!(dashboard.filtered_view().len(), 1);
    }

    #[test]
    fn history_cache_is_keyed_by_directory() {
        let mut dashboard = Dashboard::new();
        let first = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            first.path().join("Product_Data_Jan.csv"),
            "Brand,Model Name,Price\nSamsung,QN90C,100\n",
        )
        .expect("write month");
        assert_eq!(dashboard.history(first.path()).series().len(), 1);
        assert_eq!(dashboard.history(first.path()).series().len(), 1);

        let second = tempfile::tempdir().expect("temp dir");
        assert!(dashboard.history(second.path()).is_empty());
    }

    #[test]
    fn replace_dataset_resets_filters_to_pass_through() {
        let mut dashboard = Dashboard::new();
        dashboard.replace_dataset(dataset(&["Samsung", "LG"]));
        dashboard.filters_mut().clear(Column::Brand);
        assert!(dashboard.filtered_view().is_empty());

        dashboard.replace_dataset(dataset(&["TCL"]));
        assert_eq!(dashboard.filtered_view().len(), 1);
    }
}
