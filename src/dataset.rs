//! Row Store: the parsed listing dataset and its loading rules.
//!
//! A [`Dataset`] is an ordered sequence of immutable [`Record`]s sharing the
//! fixed column set in [`Column`]. Datasets are replaced wholesale on
//! re-load, never patched in place; a file whose header row is missing any
//! required column is rejected as a whole via [`LoadError`], so callers can
//! keep the previously loaded dataset intact.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::io_utils;

/// The thirteen required listing columns, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    ShoppingMall,
    Brand,
    ModelName,
    ScreenSize,
    DisplayType,
    Resolution,
    RefreshRate,
    Brightness,
    Platform,
    Price,
    Features,
    Image,
    Url,
}

impl Column {
    pub const ALL: [Column; 13] = [
        Column::ShoppingMall,
        Column::Brand,
        Column::ModelName,
        Column::ScreenSize,
        Column::DisplayType,
        Column::Resolution,
        Column::RefreshRate,
        Column::Brightness,
        Column::Platform,
        Column::Price,
        Column::Features,
        Column::Image,
        Column::Url,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::ShoppingMall => "Shopping Mall",
            Column::Brand => "Brand",
            Column::ModelName => "Model Name",
            Column::ScreenSize => "Screen Size",
            Column::DisplayType => "Display Type",
            Column::Resolution => "Resolution",
            Column::RefreshRate => "Refresh Rate",
            Column::Brightness => "Brightness",
            Column::Platform => "Platform",
            Column::Price => "Price",
            Column::Features => "Features",
            Column::Image => "Image",
            Column::Url => "URL",
        }
    }

    /// Matches a header cell by exact string, case-sensitive, post-trim.
    pub fn from_header(header: &str) -> Option<Column> {
        let trimmed = header.trim();
        Column::ALL.into_iter().find(|c| c.header() == trimmed)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One product listing. Empty and "nan"-like cells are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    values: Vec<Option<String>>,
}

impl Record {
    pub fn new() -> Self {
        Self {
            values: vec![None; Column::ALL.len()],
        }
    }

    pub fn set(&mut self, column: Column, raw: &str) {
        let trimmed = raw.trim();
        self.values[column.index()] = if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
        {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    pub fn get(&self, column: Column) -> Option<&str> {
        self.values[column.index()].as_deref()
    }

    /// Rendering form used by the table, export, and filter options:
    /// missing cells become the literal string `None`.
    pub fn display(&self, column: Column) -> &str {
        self.get(column).unwrap_or("None")
    }
}

/// Builds a record from pairs of (matched column, raw cell).
impl FromIterator<(Column, String)> for Record {
    fn from_iter<T: IntoIterator<Item = (Column, String)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (column, raw) in iter {
            record.set(column, &raw);
        }
        record
    }
}

/// Why a file could not become the current dataset. Callers keep the
/// previous dataset on any of these; see `state::Dashboard::try_load`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset rejected: missing required column(s): {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },
    #[error("dataset rejected: {0:?} has no header row")]
    Empty(PathBuf),
    #[error("unsupported dataset file extension: {0:?}")]
    UnsupportedExtension(PathBuf),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Ordered, immutable collection of listing records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Loads a dataset, dispatching on file extension: workbook formats go
    /// through calamine (first sheet only), everything else is read as CSV.
    pub fn load(path: &Path, delimiter: Option<u8>, encoding: Option<&str>) -> Result<Self, LoadError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if matches!(ext.to_ascii_lowercase().as_str(), "xlsx" | "xls" | "xlsm" | "xlsb") => {
                Self::from_workbook_path(path)
            }
            Some(_) | None => Self::from_csv_path(path, delimiter, encoding),
        }
    }

    pub fn from_csv_path(
        path: &Path,
        delimiter: Option<u8>,
        encoding: Option<&str>,
    ) -> Result<Self, LoadError> {
        let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
        let encoding = io_utils::resolve_encoding(encoding)?;
        let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
        let headers = io_utils::reader_headers(&mut reader, encoding)
            .with_context(|| format!("Reading header row of {path:?}"))?;
        if headers.is_empty() {
            return Err(LoadError::Empty(path.to_path_buf()));
        }
        let layout = resolve_layout(&headers)?;

        let mut records = Vec::new();
        for (row_idx, record) in reader.byte_records().enumerate() {
            let record =
                record.with_context(|| format!("Reading row {} in {path:?}", row_idx + 2))?;
            let decoded = io_utils::decode_record(&record, encoding)
                .with_context(|| format!("Decoding row {} in {path:?}", row_idx + 2))?;
            if decoded.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            records.push(build_record(&layout, &decoded));
        }
        info!("Loaded {} listing(s) from {:?}", records.len(), path);
        Ok(Self::new(records))
    }

    /// Reads the first worksheet of an Excel workbook; the first row is the
    /// header row.
    pub fn from_workbook_path(path: &Path) -> Result<Self, LoadError> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Opening workbook {path:?}"))?;
        let sheet_names = workbook.sheet_names().to_vec();
        let Some(first_sheet) = sheet_names.first() else {
            return Err(LoadError::Empty(path.to_path_buf()));
        };
        let range = workbook
            .worksheet_range(first_sheet)
            .with_context(|| format!("Reading sheet '{first_sheet}' in {path:?}"))?;
        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Err(LoadError::Empty(path.to_path_buf()));
        };
        let headers = header_row.iter().map(cell_to_string).collect::<Vec<_>>();
        let layout = resolve_layout(&headers)?;

        let mut records = Vec::new();
        for row in rows {
            let decoded = row.iter().map(cell_to_string).collect::<Vec<_>>();
            if decoded.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            records.push(build_record(&layout, &decoded));
        }
        info!(
            "Loaded {} listing(s) from sheet '{}' in {:?}",
            records.len(),
            first_sheet,
            path
        );
        Ok(Self::new(records))
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => calamine::DataType::as_string(other).unwrap_or_else(|| other.to_string()),
    }
}

/// Maps each physical column position to the required column it carries.
/// Extra columns are ignored; any missing required column rejects the file.
fn resolve_layout(headers: &[String]) -> Result<Vec<Option<Column>>, LoadError> {
    let layout = headers
        .iter()
        .map(|h| Column::from_header(h))
        .collect::<Vec<_>>();
    let missing = Column::ALL
        .into_iter()
        .filter(|required| !layout.contains(&Some(*required)))
        .map(|c| c.header().to_string())
        .collect::<Vec<_>>();
    if missing.is_empty() {
        Ok(layout)
    } else {
        Err(LoadError::MissingColumns { missing })
    }
}

fn build_record(layout: &[Option<Column>], decoded: &[String]) -> Record {
    layout
        .iter()
        .zip(decoded)
        .filter_map(|(slot, cell)| slot.map(|column| (column, cell.clone())))
        .collect()
}

/// Default dataset discovery: among `*.csv` files in `dir`, picks the one
/// with the lexicographically greatest embedded date stamp, preferring an
/// 8-digit stamp over a 6-digit one within a single file name.
pub fn latest_dataset_path(dir: &Path) -> Result<Option<PathBuf>> {
    let eight = Regex::new(r"\d{8}").expect("static regex");
    let six = Regex::new(r"\d{6}").expect("static regex");
    let mut dated = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Listing directory {dir:?}"))? {
        let entry = entry.with_context(|| format!("Listing directory {dir:?}"))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.to_ascii_lowercase().ends_with(".csv") {
            continue;
        }
        let stamp = eight
            .find(name)
            .or_else(|| six.find(name))
            .map(|m| m.as_str().to_string());
        if let Some(stamp) = stamp {
            dated.push((stamp, path));
        }
    }
    dated.sort_by(|a, b| b.0.cmp(&a.0));
    if let Some((stamp, path)) = dated.first() {
        debug!("Latest dated dataset: {path:?} (stamp {stamp})");
    }
    Ok(dated.into_iter().next().map(|(_, path)| path))
}
