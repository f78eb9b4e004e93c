pub mod charts;
pub mod cli;
pub mod dataset;
pub mod export;
pub mod filter;
pub mod io_utils;
pub mod numeric;
pub mod state;
pub mod table;
pub mod timeline;

use std::{env, fs, path::PathBuf, sync::OnceLock};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde_json::json;

use crate::{
    cli::{ChartArgs, ChartKind, Cli, Commands, DatasetArgs, ExportArgs, TableArgs, TimelineArgs},
    dataset::Record,
    state::Dashboard,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("mall_dashboard", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Table(args) => handle_table(&args),
        Commands::Chart(args) => handle_chart(&args),
        Commands::Export(args) => handle_export(&args),
        Commands::Timeline(args) => handle_timeline(&args),
    }
}

/// Loads the dataset named by the shared args (falling back to the latest
/// date-stamped CSV), applies the facet selections, and returns the
/// coordinator plus its filtered view.
fn prepare(args: &DatasetArgs) -> Result<(Dashboard, Vec<Record>)> {
    let path = match &args.input {
        Some(path) => path.clone(),
        None => dataset::latest_dataset_path(&args.data_dir)?.ok_or_else(|| {
            anyhow!(
                "No date-stamped CSV found in {:?}; pass --input explicitly",
                args.data_dir
            )
        })?,
    };
    let mut dashboard = Dashboard::new();
    dashboard
        .try_load(&path, args.delimiter, args.input_encoding.as_deref())
        .with_context(|| format!("Loading dataset from {path:?}"))?;

    for raw in &args.selections {
        let (column, values) = cli::parse_selection(raw)?;
        debug!("Selecting {:?} for {}", values, column.header());
        dashboard.filters_mut().set(column, values);
    }
    for raw in &args.clears {
        let column = cli::parse_column(raw)?;
        dashboard.filters_mut().clear(column);
    }

    let view = dashboard.filtered_view();
    info!(
        "Filtered view: {} of {} listing(s)",
        view.len(),
        dashboard.dataset().len()
    );
    Ok((dashboard, view))
}

fn handle_table(args: &TableArgs) -> Result<()> {
    let (_, view) = prepare(&args.dataset)?;
    let page = table::paginate(&view, args.page, args.per_page);
    table::print_page(&table::listing_headers(), &page);
    Ok(())
}

fn handle_chart(args: &ChartArgs) -> Result<()> {
    let (_, view) = prepare(&args.dataset)?;
    let pie_limit = (args.limit > 0).then_some(args.limit);
    let payload = match args.kind {
        ChartKind::MallBrand => json!(charts::mall_brand_counts(&view)),
        ChartKind::BrandDisplayPie => json!(charts::brand_display_pies(&view, pie_limit)),
        ChartKind::BrandDisplayBar => json!(charts::brand_display_counts(&view)),
        ChartKind::SizePrice => json!(charts::size_price_boxes(&view)),
        ChartKind::DisplayPrice => json!(charts::display_price_scatter(&view)),
        ChartKind::ResolutionPrice => json!(charts::resolution_price_bubbles(&view)),
        ChartKind::All => json!({
            "mall_brand": charts::mall_brand_counts(&view),
            "brand_display_pies": charts::brand_display_pies(&view, pie_limit),
            "brand_display_bars": charts::brand_display_counts(&view),
            "size_price": charts::size_price_boxes(&view),
            "display_price": charts::display_price_scatter(&view),
            "resolution_price": charts::resolution_price_bubbles(&view),
        }),
    };
    emit_json(&payload, args.output.as_deref(), args.pretty)
}

fn handle_export(args: &ExportArgs) -> Result<()> {
    let (_, view) = prepare(&args.dataset)?;
    let output = match &args.output {
        Some(path) => path.clone(),
        None => PathBuf::from(export::export_filename(
            chrono::Local::now().date_naive(),
        )),
    };
    export::write_workbook(&view, &output)
        .with_context(|| format!("Export failed; no workbook written to {output:?}"))?;
    println!("{}", output.display());
    Ok(())
}

fn handle_timeline(args: &TimelineArgs) -> Result<()> {
    let (mut dashboard, view) = prepare(&args.dataset)?;
    let history = dashboard.history(&args.history_dir);

    if args.summary {
        let rows = history
            .summary(&view)
            .iter()
            .map(summary_row_cells)
            .collect::<Vec<_>>();
        let headers = [
            "Brand", "Model Name", "Screen Size", "Display Type", "Q1", "Q2", "Q3", "Q4",
            "MoM", "QoQ", "YoY",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
        print!("{}", table::render_table(&headers, &rows));
        return Ok(());
    }

    let chart = history.chart(&view);
    let payload = json!({
        "months": history.months_present(),
        "series": chart.series,
    });
    emit_json(&payload, args.output.as_deref(), args.pretty)
}

fn summary_row_cells(row: &timeline::SummaryRow) -> Vec<String> {
    let mut cells = vec![
        row.brand.clone(),
        row.model.clone(),
        row.screen_size.clone().unwrap_or_else(|| "None".to_string()),
        row.display_type.clone().unwrap_or_else(|| "None".to_string()),
    ];
    cells.extend(row.quarters.iter().map(|q| format_metric(*q)));
    cells.push(format_diff(row.prev_month_diff));
    cells.push(format_diff(row.prev_quarter_diff));
    cells.push(format_diff(row.prev_year_diff));
    cells
}

fn format_metric(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

/// Price drops render with the dashboard's `△` marker instead of a minus.
fn format_diff(value: Option<f64>) -> String {
    match value {
        Some(v) if v < 0.0 => format!("△{:.2}", v.abs()),
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

fn emit_json(
    payload: &serde_json::Value,
    output: Option<&std::path::Path>,
    pretty: bool,
) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    match output {
        Some(path) => {
            fs::write(path, rendered.as_bytes())
                .with_context(|| format!("Writing chart data to {path:?}"))?;
            info!("Wrote chart data to {path:?}");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_diff_marks_price_drops() {
        assert_eq!(format_diff(Some(-12.5)), "△12.50");
        assert_eq!(format_diff(Some(12.5)), "12.50");
        assert_eq!(format_diff(None), "-");
    }
}
