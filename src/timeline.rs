//! Price-over-time aggregation across the twelve monthly history files.
//!
//! Unlike the per-chart aggregations, this one has an external data
//! dependency: a fixed set of monthly CSVs (`Product_Data_Jan.csv` ..
//! `Product_Data_Dec.csv`) holding historical prices keyed by
//! (Brand, Model Name). The files are loaded once per session and cached;
//! a missing or unreadable month is a gap in every series, never an error.

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;

use crate::{
    dataset::{Column, Record},
    io_utils,
    numeric::parse_numeric,
};

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const BRAND_HEADER: &str = "Brand";
const MODEL_HEADER: &str = "Model Name";
const PRICE_HEADER: &str = "Price";

/// Historical prices for one (Brand, Model Name) key. `prices` maps
/// 1-based month index to the price observed that month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSeries {
    pub brand: String,
    pub model: String,
    pub screen_size: Option<String>,
    pub display_type: Option<String>,
    pub prices: BTreeMap<usize, f64>,
}

impl ModelSeries {
    fn key(&self) -> (String, String) {
        (self.brand.clone(), self.model.clone())
    }
}

/// The session cache of all monthly sources, built once and never
/// re-fetched on filter changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyHistory {
    series: Vec<ModelSeries>,
}

impl MonthlyHistory {
    /// Loads every monthly file found under `dir`. Months that are absent,
    /// unreadable, or missing the Brand/Model Name/Price headers are
    /// skipped; their prices simply never appear in any series.
    pub fn load(dir: &Path) -> Self {
        let mut series: Vec<ModelSeries> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        let mut loaded = 0usize;

        for (month_idx, month) in MONTHS.iter().enumerate() {
            let path = dir.join(format!("Product_Data_{month}.csv"));
            match ingest_month(&path, month_idx + 1, &mut series, &mut index) {
                Ok(()) => loaded += 1,
                Err(err) => debug!("Skipping month {month}: {err:#}"),
            }
        }
        info!(
            "Loaded {loaded} monthly history file(s) covering {} model(s)",
            series.len()
        );
        Self { series }
    }

    pub fn series(&self) -> &[ModelSeries] {
        &self.series
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Month labels that contributed at least one price, in calendar order.
    pub fn months_present(&self) -> Vec<&'static str> {
        self.series
            .iter()
            .flat_map(|s| s.prices.keys().copied())
            .unique()
            .sorted()
            .map(|idx| MONTHS[idx - 1])
            .collect()
    }

    /// Chart data: every series, with the ones whose (Brand, Model Name)
    /// key appears in the filtered view flagged `selected`. The
    /// presentation layer dims unselected series rather than dropping
    /// them, so toggling filters never changes the axis extents.
    pub fn chart(&self, filtered_view: &[Record]) -> TimelineChart {
        let selected_keys = view_keys(filtered_view);
        let series = self
            .series
            .iter()
            .map(|s| TimelineSeries {
                brand: s.brand.clone(),
                model: s.model.clone(),
                selected: selected_keys.contains(&(s.brand.clone(), s.model.clone())),
                points: s
                    .prices
                    .iter()
                    .map(|(month_idx, price)| TimelinePoint {
                        month: MONTHS[month_idx - 1],
                        month_index: *month_idx,
                        price: *price,
                    })
                    .collect(),
            })
            .collect();
        TimelineChart { series }
    }

    /// Quarterly summary rows, restricted to the keys present in the
    /// filtered view; an empty view means no restriction.
    pub fn summary(&self, filtered_view: &[Record]) -> Vec<SummaryRow> {
        let selected_keys = view_keys(filtered_view);
        self.series
            .iter()
            .filter(|s| selected_keys.is_empty() || selected_keys.contains(&s.key()))
            .map(summarize)
            .collect()
    }
}

fn view_keys(filtered_view: &[Record]) -> Vec<(String, String)> {
    filtered_view
        .iter()
        .filter_map(|row| {
            let brand = row.get(Column::Brand)?;
            let model = row.get(Column::ModelName)?;
            Some((brand.to_string(), model.to_string()))
        })
        .unique()
        .collect()
}

fn ingest_month(
    path: &Path,
    month_idx: usize,
    series: &mut Vec<ModelSeries>,
    index: &mut HashMap<(String, String), usize>,
) -> anyhow::Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(path, None);
    let encoding = io_utils::resolve_encoding(None)?;
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;

    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (Some(brand_idx), Some(model_idx), Some(price_idx)) = (
        position(BRAND_HEADER),
        position(MODEL_HEADER),
        position(PRICE_HEADER),
    ) else {
        anyhow::bail!("missing Brand/Model Name/Price header in {path:?}");
    };
    let size_idx = position("Screen Size");
    let display_idx = position("Display Type");

    for record in reader.byte_records() {
        let record = record?;
        let decoded = io_utils::decode_record(&record, encoding)?;
        let field = |idx: usize| decoded.get(idx).map(|s| s.trim()).unwrap_or("");
        let brand = field(brand_idx);
        let model = field(model_idx);
        if brand.is_empty() || model.is_empty() {
            continue;
        }
        let Some(price) = parse_numeric(field(price_idx)) else {
            continue;
        };
        let key = (brand.to_string(), model.to_string());
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            series.push(ModelSeries {
                brand: key.0.clone(),
                model: key.1.clone(),
                screen_size: size_idx.map(|i| field(i).to_string()).filter(|s| !s.is_empty()),
                display_type: display_idx
                    .map(|i| field(i).to_string())
                    .filter(|s| !s.is_empty()),
                prices: BTreeMap::new(),
            });
            series.len() - 1
        });
        series[slot].prices.insert(month_idx, price);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineChart {
    pub series: Vec<TimelineSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSeries {
    pub brand: String,
    pub model: String,
    pub selected: bool,
    pub points: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub month: &'static str,
    pub month_index: usize,
    pub price: f64,
}

/// One quarterly summary row per model: Q1..Q4 mean prices plus the
/// price movement against the previous month and previous quarter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub brand: String,
    pub model: String,
    pub screen_size: Option<String>,
    pub display_type: Option<String>,
    pub quarters: [Option<f64>; 4],
    pub prev_month_diff: Option<f64>,
    pub prev_quarter_diff: Option<f64>,
    /// Always `None`: the history covers a single year, so there is no
    /// prior-year price to diff against.
    pub prev_year_diff: Option<f64>,
}

fn summarize(series: &ModelSeries) -> SummaryRow {
    let quarters: [Option<f64>; 4] = std::array::from_fn(|q| {
        let months = (q * 3 + 1)..=(q * 3 + 3);
        let values: Vec<f64> = months
            .filter_map(|m| series.prices.get(&m).copied())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    });

    let last_month = series.prices.keys().max().copied();
    let prev_month_diff = last_month.and_then(|last| {
        let previous = series.prices.get(&last.checked_sub(1)?)?;
        Some(series.prices[&last] - previous)
    });
    let prev_quarter_diff = last_month.and_then(|last| {
        let quarter = last.div_ceil(3);
        if quarter < 2 {
            return None;
        }
        Some(quarters[quarter - 1]? - quarters[quarter - 2]?)
    });

    SummaryRow {
        brand: series.brand.clone(),
        model: series.model.clone(),
        screen_size: series.screen_size.clone(),
        display_type: series.display_type.clone(),
        quarters,
        prev_month_diff,
        prev_quarter_diff,
        prev_year_diff: None,
    }
}
