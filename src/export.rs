//! Spreadsheet export of the currently filtered table.
//!
//! Reproduces the dashboard download: a single "Data" sheet with a bold,
//! green-filled header row, thin borders on every cell, hyperlink cells
//! for Image/URL values, and a filename stamped with the current date.
//! Failures propagate before the workbook is saved, so no partial file is
//! left behind.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;
use rust_xlsxwriter::{Color, Format, FormatBorder, Url, Workbook};

use crate::dataset::{Column, Record};

const SHEET_NAME: &str = "Data";
const HEADER_FILL: u32 = 0xA6DDA8;
const COLUMN_WIDTH: f64 = 20.0;

/// `mall-listings_YYMMDD.xlsx` for the given date.
pub fn export_filename(date: NaiveDate) -> String {
    format!("mall-listings_{}.xlsx", date.format("%y%m%d"))
}

/// Writes the filtered view to `path` as a styled workbook.
pub fn write_workbook(records: &[Record], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin);
    let body_format = Format::new().set_border(FormatBorder::Thin);

    for (col_idx, column) in Column::ALL.iter().enumerate() {
        let col = col_idx as u16;
        worksheet.set_column_width(col, COLUMN_WIDTH)?;
        worksheet.write_string_with_format(0, col, column.header(), &header_format)?;
    }

    for (row_idx, record) in records.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col_idx, column) in Column::ALL.iter().enumerate() {
            let col = col_idx as u16;
            let value = record.display(*column);
            let is_link = matches!(column, Column::Image | Column::Url)
                && (value.starts_with("http://") || value.starts_with("https://"));
            if is_link {
                worksheet.write_url_with_format(row, col, Url::new(value), &body_format)?;
            } else {
                worksheet.write_string_with_format(row, col, value, &body_format)?;
            }
        }
    }

    if !records.is_empty() {
        worksheet.autofilter(
            0,
            0,
            records.len() as u32,
            (Column::ALL.len() - 1) as u16,
        )?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Writing workbook to {path:?}"))?;
    info!("Exported {} row(s) to {:?}", records.len(), path);
    Ok(())
}
