//! Aggregation functions: one pure reduction per chart.
//!
//! Every function here maps a filtered view (`&[Record]`) to a
//! serializable chart-data structure and nothing else. They share no
//! state, may run in any order, and return their empty structure for an
//! empty view — the presentation layer renders the "no data" placeholder.
//!
//! Missing values are handled per chart: the count charts skip rows
//! lacking a grouped column (so group counts always sum to the rows that
//! have them), while the price charts fold missing categories into an
//! `"Unknown"` group. Prices and sizes go through
//! [`numeric::parse_numeric`]; rows whose value fails to parse are
//! excluded from that chart only.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    dataset::{Column, Record},
    numeric::parse_numeric,
};

pub const UNKNOWN_LABEL: &str = "Unknown";

/// Bubble markers never shrink below this size so that near-zero groups
/// stay clickable.
pub const MIN_BUBBLE_SIZE: f64 = 10.0;
const BUBBLE_SCALE: f64 = 100.0;

/// One named series of per-category counts, aligned with the owning
/// chart's category list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountSeries {
    pub name: String,
    pub counts: Vec<usize>,
    pub total: usize,
}

/// Shopping Mall × Brand stacked-bar data. Brands are ordered by total
/// count descending, ties by first encounter in the view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MallBrandChart {
    pub malls: Vec<String>,
    pub brands: Vec<CountSeries>,
}

pub fn mall_brand_counts(rows: &[Record]) -> MallBrandChart {
    let mut malls: Vec<String> = Vec::new();
    let mut mall_index: HashMap<String, usize> = HashMap::new();
    let mut brands: Vec<CountSeries> = Vec::new();
    let mut brand_index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let (Some(mall), Some(brand)) = (row.get(Column::ShoppingMall), row.get(Column::Brand))
        else {
            continue;
        };
        let mall_slot = *mall_index.entry(mall.to_string()).or_insert_with(|| {
            malls.push(mall.to_string());
            malls.len() - 1
        });
        let brand_slot = *brand_index.entry(brand.to_string()).or_insert_with(|| {
            brands.push(CountSeries {
                name: brand.to_string(),
                counts: Vec::new(),
                total: 0,
            });
            brands.len() - 1
        });
        let series = &mut brands[brand_slot];
        if series.counts.len() < malls.len() {
            series.counts.resize(malls.len(), 0);
        }
        series.counts[mall_slot] += 1;
        series.total += 1;
    }
    for series in &mut brands {
        series.counts.resize(malls.len(), 0);
    }
    // Stable sort keeps first-encounter order for equal totals.
    brands.sort_by(|a, b| b.total.cmp(&a.total));
    MallBrandChart { malls, brands }
}

/// Brand × Display Type grouped-bar data (one series per display type,
/// categories are brands in first-encounter order).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrandDisplayChart {
    pub brands: Vec<String>,
    pub display_types: Vec<CountSeries>,
}

pub fn brand_display_counts(rows: &[Record]) -> BrandDisplayChart {
    let mut brands: Vec<String> = Vec::new();
    let mut brand_index: HashMap<String, usize> = HashMap::new();
    let mut display_types: Vec<CountSeries> = Vec::new();
    let mut display_index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let (Some(brand), Some(display)) = (row.get(Column::Brand), row.get(Column::DisplayType))
        else {
            continue;
        };
        let brand_slot = *brand_index.entry(brand.to_string()).or_insert_with(|| {
            brands.push(brand.to_string());
            brands.len() - 1
        });
        let display_slot = *display_index.entry(display.to_string()).or_insert_with(|| {
            display_types.push(CountSeries {
                name: display.to_string(),
                counts: Vec::new(),
                total: 0,
            });
            display_types.len() - 1
        });
        let series = &mut display_types[display_slot];
        if series.counts.len() < brands.len() {
            series.counts.resize(brands.len(), 0);
        }
        series.counts[brand_slot] += 1;
        series.total += 1;
    }
    for series in &mut display_types {
        series.counts.resize(brands.len(), 0);
    }
    BrandDisplayChart {
        brands,
        display_types,
    }
}

/// One pie per brand: Display Type slice counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandPie {
    pub brand: String,
    pub total: usize,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PieGridChart {
    pub pies: Vec<BrandPie>,
}

/// Per-brand Display Type pies, sorted by brand total descending (ties by
/// first encounter), optionally truncated to the top `limit` brands.
pub fn brand_display_pies(rows: &[Record], limit: Option<usize>) -> PieGridChart {
    let mut pies: Vec<BrandPie> = Vec::new();
    let mut pie_index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let (Some(brand), Some(display)) = (row.get(Column::Brand), row.get(Column::DisplayType))
        else {
            continue;
        };
        let slot = *pie_index.entry(brand.to_string()).or_insert_with(|| {
            pies.push(BrandPie {
                brand: brand.to_string(),
                total: 0,
                slices: Vec::new(),
            });
            pies.len() - 1
        });
        let pie = &mut pies[slot];
        pie.total += 1;
        match pie.slices.iter_mut().find(|s| s.label == display) {
            Some(slice) => slice.count += 1,
            None => pie.slices.push(PieSlice {
                label: display.to_string(),
                count: 1,
            }),
        }
    }
    pies.sort_by(|a, b| b.total.cmp(&a.total));
    if let Some(limit) = limit {
        pies.truncate(limit);
    }
    PieGridChart { pies }
}

/// Prices grouped by exact Screen Size value, sorted numerically ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeGroup {
    pub size: f64,
    pub label: String,
    pub prices: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SizePriceChart {
    pub groups: Vec<SizeGroup>,
}

pub fn size_price_boxes(rows: &[Record]) -> SizePriceChart {
    let mut groups: Vec<SizeGroup> = Vec::new();
    for row in rows {
        let Some(size) = row.get(Column::ScreenSize).and_then(parse_numeric) else {
            continue;
        };
        let Some(price) = row.get(Column::Price).and_then(parse_numeric) else {
            continue;
        };
        match groups.iter_mut().find(|g| g.size == size) {
            Some(group) => group.prices.push(price),
            None => groups.push(SizeGroup {
                size,
                label: format_size_label(size),
                prices: vec![price],
            }),
        }
    }
    groups.sort_by(|a, b| a.size.total_cmp(&b.size));
    SizePriceChart { groups }
}

fn format_size_label(size: f64) -> String {
    if size.fract() == 0.0 {
        format!("{size:.0}\"")
    } else {
        format!("{size}\"")
    }
}

/// One scatter series per brand of (price, display type) points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub brand: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub price: f64,
    pub display_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayPriceChart {
    pub series: Vec<ScatterSeries>,
}

pub fn display_price_scatter(rows: &[Record]) -> DisplayPriceChart {
    let mut series: Vec<ScatterSeries> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let Some(price) = row.get(Column::Price).and_then(parse_numeric) else {
            continue;
        };
        let brand = row.get(Column::Brand).unwrap_or(UNKNOWN_LABEL);
        let display = row.get(Column::DisplayType).unwrap_or(UNKNOWN_LABEL);
        let slot = *index.entry(brand.to_string()).or_insert_with(|| {
            series.push(ScatterSeries {
                brand: brand.to_string(),
                points: Vec::new(),
            });
            series.len() - 1
        });
        series[slot].points.push(ScatterPoint {
            price,
            display_type: display.to_string(),
        });
    }
    DisplayPriceChart { series }
}

/// (Brand, Resolution) bubble markers: count, mean price, and a marker
/// size proportional to the group's share of the total count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleMarker {
    pub brand: String,
    pub resolution: String,
    pub count: usize,
    pub avg_price: f64,
    pub size: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolutionPriceChart {
    pub resolutions: Vec<String>,
    pub markers: Vec<BubbleMarker>,
}

pub fn resolution_price_bubbles(rows: &[Record]) -> ResolutionPriceChart {
    struct Accumulator {
        brand: String,
        resolution: String,
        price_sum: f64,
        count: usize,
    }

    let mut resolutions: Vec<String> = Vec::new();
    let mut groups: Vec<Accumulator> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for row in rows {
        if let Some(resolution) = row.get(Column::Resolution)
            && !resolutions.iter().any(|r| r == resolution)
        {
            resolutions.push(resolution.to_string());
        }
        let Some(price) = row.get(Column::Price).and_then(parse_numeric) else {
            continue;
        };
        let brand = row.get(Column::Brand).unwrap_or(UNKNOWN_LABEL).to_string();
        let resolution = row
            .get(Column::Resolution)
            .unwrap_or(UNKNOWN_LABEL)
            .to_string();
        let slot = *index
            .entry((brand.clone(), resolution.clone()))
            .or_insert_with(|| {
                groups.push(Accumulator {
                    brand,
                    resolution,
                    price_sum: 0.0,
                    count: 0,
                });
                groups.len() - 1
            });
        groups[slot].price_sum += price;
        groups[slot].count += 1;
    }

    let total: usize = groups.iter().map(|g| g.count).sum();
    let markers = groups
        .into_iter()
        .map(|g| {
            let share = g.count as f64 / total as f64;
            BubbleMarker {
                avg_price: g.price_sum / g.count as f64,
                size: (share * BUBBLE_SCALE).max(MIN_BUBBLE_SIZE),
                brand: g.brand,
                resolution: g.resolution,
                count: g.count,
            }
        })
        .collect();
    ResolutionPriceChart {
        resolutions,
        markers,
    }
}
