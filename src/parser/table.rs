//! HTML table markup to grid reconstruction.

use crate::model::{SourceCell, TableGrid};
use scraper::{ElementRef, Html, Selector};

/// Largest column span honoured; browsers clamp `colspan` to the same value.
pub const MAX_COLSPAN: usize = 1000;

/// Parse table markup into a grid.
///
/// Returns `None` when the markup has no `<table>` element or the table has
/// no cells. Malformed markup never fails: whatever the HTML parser recovers
/// is placed on the grid.
pub fn parse_table(markup: &str) -> Option<TableGrid> {
    let table_selector = Selector::parse("table").ok()?;
    let row_selector = Selector::parse("tr").ok()?;
    let cell_selector = Selector::parse("td, th").ok()?;

    let document = Html::parse_document(markup);
    let table = document.select(&table_selector).next()?;

    let rows: Vec<Vec<SourceCell>> = table
        .select(&row_selector)
        .map(|row| row.select(&cell_selector).map(source_cell).collect())
        .collect();

    if rows.is_empty() {
        log::debug!("Table markup has no rows");
        return None;
    }

    let grid = TableGrid::build(rows);
    if grid.is_empty() {
        log::debug!("Table markup has no cells");
        return None;
    }
    Some(grid)
}

fn source_cell(cell: ElementRef<'_>) -> SourceCell {
    SourceCell {
        text: cell_text(cell),
        colspan: colspan(cell),
        header_tag: cell.value().name().eq_ignore_ascii_case("th"),
    }
}

fn colspan(cell: ElementRef<'_>) -> usize {
    cell.value()
        .attr("colspan")
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|span| *span >= 1)
        .map(|span| span.min(MAX_COLSPAN))
        .unwrap_or(1)
}

/// Text of an element: every text node trimmed, empty ones dropped, the
/// rest joined without separator.
pub fn cell_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}
