//! Paginated text rendering of the filtered listing table.
//!
//! The dashboard table shows 30 rows per page; the same pagination
//! arithmetic drives the CLI `table` subcommand. URL cells are shortened
//! to host + path capped at 30 characters so rows stay readable.

use std::fmt::Write as _;

use crate::dataset::{Column, Record};

pub const DEFAULT_PAGE_SIZE: usize = 30;
const URL_DISPLAY_LIMIT: usize = 30;

/// One page of the filtered view, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number after clamping into range.
    pub number: usize,
    pub page_count: usize,
    pub total_rows: usize,
    pub rows: Vec<Vec<String>>,
}

pub fn listing_headers() -> Vec<String> {
    Column::ALL.iter().map(|c| c.header().to_string()).collect()
}

/// Display cells for one record; missing values render as "None" and the
/// URL column is shortened.
pub fn listing_row(record: &Record) -> Vec<String> {
    Column::ALL
        .iter()
        .map(|column| match column {
            Column::Url => shorten_url(record.display(*column)),
            other => record.display(*other).to_string(),
        })
        .collect()
}

/// Slices the filtered view into the requested page. Page numbers clamp
/// into `1..=page_count`; an empty view yields a single empty page.
pub fn paginate(records: &[Record], page: usize, per_page: usize) -> Page {
    let per_page = per_page.max(1);
    let page_count = records.len().div_ceil(per_page).max(1);
    let number = page.clamp(1, page_count);
    let start = (number - 1) * per_page;
    let rows = records
        .iter()
        .skip(start)
        .take(per_page)
        .map(listing_row)
        .collect();
    Page {
        number,
        page_count,
        total_rows: records.len(),
        rows,
    }
}

/// Reduces a URL to host + path, truncated with an ellipsis. Values that
/// do not look like URLs pass through untouched.
pub fn shorten_url(value: &str) -> String {
    let Some(rest) = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
    else {
        return value.to_string();
    };
    let host_and_path = rest
        .split_once(['?', '#'])
        .map(|(left, _)| left)
        .unwrap_or(rest);
    if host_and_path.chars().count() > URL_DISPLAY_LIMIT {
        let truncated: String = host_and_path.chars().take(URL_DISPLAY_LIMIT).collect();
        format!("{truncated}…")
    } else {
        host_and_path.to_string()
    }
}

/// Renders a page with elastic column widths, a dashed separator, and a
/// pagination footer.
pub fn render_page(headers: &[String], page: &Page) -> String {
    let mut output = render_table(headers, &page.rows);
    let _ = writeln!(
        output,
        "page {} / {} ({} row(s))",
        page.number, page.page_count, page.total_rows
    );
    output
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count())
        .collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(cell.chars().count()).max(1);
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let separator = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_page(headers: &[String], page: &Page) {
    print!("{}", render_page(headers, page));
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        let Some(width) = widths.get(idx) else {
            break;
        };
        let sanitized: String = value
            .chars()
            .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
            .collect();
        let padding = width.saturating_sub(sanitized.chars().count());
        cells.push(format!("{sanitized}{}", " ".repeat(padding)));
    }
    let mut line = cells.join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}
