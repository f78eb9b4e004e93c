use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::dataset::Column;

#[derive(Debug, Parser)]
#[command(author, version, about = "Explore shopping-mall TV listings from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print one page of the filtered listing table
    Table(TableArgs),
    /// Emit chart-ready aggregation JSON for the filtered view
    Chart(ChartArgs),
    /// Export the filtered view to a styled Excel workbook
    Export(ExportArgs),
    /// Build price-over-time series from the monthly history files
    Timeline(TimelineArgs),
}

#[derive(Debug, Args)]
pub struct DatasetArgs {
    /// Input listing file (.csv, .tsv, or Excel workbook); defaults to the
    /// most recently date-stamped CSV in --data-dir
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Directory scanned for date-stamped CSV files when --input is omitted
    #[arg(long = "data-dir", default_value = ".")]
    pub data_dir: PathBuf,
    /// Facet selection such as `Brand=Samsung,LG` (repeatable; values OR
    /// within a column, selections AND across columns)
    #[arg(short = 's', long = "select", action = clap::ArgAction::Append)]
    pub selections: Vec<String>,
    /// Empty a column's selection so that no row passes it (repeatable)
    #[arg(long = "clear", action = clap::ArgAction::Append)]
    pub clears: Vec<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct TableArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page
    #[arg(long = "per-page", default_value_t = 30)]
    pub per_page: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum ChartKind {
    /// Shopping Mall × Brand stacked bars
    MallBrand,
    /// Per-brand Display Type pies
    BrandDisplayPie,
    /// Brand × Display Type grouped bars
    BrandDisplayBar,
    /// Screen Size × Price box groups
    SizePrice,
    /// Display Type × Price scatter
    DisplayPrice,
    /// Resolution × Price bubbles
    ResolutionPrice,
    /// All of the above in one JSON object
    All,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Which aggregation to emit
    #[arg(long = "kind", value_enum, default_value = "all")]
    pub kind: ChartKind,
    /// Maximum brands in the pie grid (0 = all)
    #[arg(long, default_value_t = 7)]
    pub limit: usize,
    /// Output JSON file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Output workbook path; defaults to mall-listings_YYMMDD.xlsx in the
    /// current directory
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct TimelineArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Directory holding the Product_Data_<Mon>.csv monthly files
    #[arg(long = "history-dir")]
    pub history_dir: PathBuf,
    /// Print the quarterly summary table instead of series JSON
    #[arg(long)]
    pub summary: bool,
    /// Output JSON file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Parses a `--select` argument of the form `Column=v1,v2`.
pub fn parse_selection(raw: &str) -> Result<(Column, Vec<String>)> {
    let (column, values) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Selection '{raw}' must have the form Column=value1,value2"))?;
    let column = parse_column(column)?;
    let values = values
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    Ok((column, values))
}

pub fn parse_column(raw: &str) -> Result<Column> {
    Column::from_header(raw).ok_or_else(|| {
        let known = Column::ALL
            .iter()
            .map(|c| c.header())
            .collect::<Vec<_>>()
            .join(", ");
        anyhow!("Unknown column '{raw}' (expected one of: {known})")
    })
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_selection_splits_column_and_values() {
        let (column, values) = parse_selection("Brand=Samsung, LG").unwrap();
        assert_eq!(column, Column::Brand);
        assert_eq!(values, vec!["Samsung".to_string(), "LG".to_string()]);
    }

    #[test]
    fn parse_selection_allows_empty_value_list() {
        let (column, values) = parse_selection("Display Type=").unwrap();
        assert_eq!(column, Column::DisplayType);
        assert!(values.is_empty());
    }

    #[test]
    fn parse_selection_rejects_unknown_columns() {
        assert!(parse_selection("Color=Red").is_err());
        assert!(parse_selection("no-equals-sign").is_err());
    }

    #[test]
    fn parse_delimiter_accepts_names_and_single_characters() {
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
    }
}
