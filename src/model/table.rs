//! Table grid types.

use serde::{Deserialize, Serialize};

/// A cell as it appears in the source markup, before placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCell {
    /// Cell text
    pub text: String,
    /// Declared column span (at least 1)
    pub colspan: usize,
    /// Whether the markup tags the cell as a header cell
    pub header_tag: bool,
}

impl SourceCell {
    /// Create a plain data cell.
    pub fn data(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            colspan: 1,
            header_tag: false,
        }
    }

    /// Create a cell tagged as a header.
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            header_tag: true,
            ..Self::data(text)
        }
    }

    /// Set colspan and return self. Values below 1 are raised to 1.
    pub fn colspan(mut self, span: usize) -> Self {
        self.colspan = span.max(1);
        self
    }
}

/// A rectangular table derived from one table block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGrid {
    /// Number of grid columns
    pub width: usize,

    /// Rows, top to bottom
    pub rows: Vec<GridRow>,
}

/// A row of placed cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRow {
    /// Cells, left to right
    pub cells: Vec<GridCell>,
}

/// A cell placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    /// Cell text
    pub text: String,

    /// First grid column covered by the cell
    pub column: usize,

    /// Number of columns the cell covers
    pub column_span: usize,

    /// Whether the cell text is emphasized as a header
    pub is_header: bool,
}

impl GridCell {
    /// Check if the cell covers more than one column.
    pub fn is_merged(&self) -> bool {
        self.column_span > 1
    }

    /// Check if the grid column falls inside this cell.
    pub fn covers(&self, column: usize) -> bool {
        column >= self.column && column < self.column + self.column_span
    }
}

impl GridRow {
    /// Number of grid columns this row fills.
    pub fn filled_columns(&self) -> usize {
        self.cells.iter().map(|c| c.column_span).sum()
    }
}

impl TableGrid {
    /// Place source rows on a grid.
    ///
    /// The width is the widest row's summed column span. Each row's cells
    /// are laid out left to right from column 0; rows that fill fewer
    /// columns leave the trailing ones empty. A cell counts as a header when
    /// its markup says so, or when it sits in the second row and that row
    /// has more than one cell.
    pub fn build(source: Vec<Vec<SourceCell>>) -> Self {
        let width = source
            .iter()
            .map(|row| row.iter().map(|c| c.colspan.max(1)).sum::<usize>())
            .max()
            .unwrap_or(0);

        let rows = source
            .into_iter()
            .enumerate()
            .map(|(row_index, cells)| {
                let multi_cell = cells.len() > 1;
                let mut next_column = 0;
                let cells = cells
                    .into_iter()
                    .map(|cell| {
                        let span = cell.colspan.max(1);
                        let placed = GridCell {
                            is_header: cell.header_tag || (row_index == 1 && multi_cell),
                            text: cell.text,
                            column: next_column,
                            column_span: span,
                        };
                        next_column += span;
                        placed
                    })
                    .collect();
                GridRow { cells }
            })
            .collect();

        Self { width, rows }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the grid has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.width == 0
    }

    /// Cell covering the given grid position, if any.
    pub fn cell_at(&self, row: usize, column: usize) -> Option<&GridCell> {
        self.rows
            .get(row)?
            .cells
            .iter()
            .find(|cell| cell.covers(column))
    }

    /// Check if any cell spans several columns.
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .any(GridCell::is_merged)
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|c| c.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_is_widest_row() {
        let grid = TableGrid::build(vec![
            vec![SourceCell::data("a"), SourceCell::data("b")],
            vec![
                SourceCell::data("c"),
                SourceCell::data("d"),
                SourceCell::data("e"),
            ],
        ]);
        assert_eq!(grid.width, 3);
        assert_eq!(grid.row_count(), 2);
        assert!(grid.cell_at(0, 2).is_none());
        assert_eq!(grid.cell_at(1, 2).unwrap().text, "e");
    }

    #[test]
    fn test_span_covers_columns() {
        let grid = TableGrid::build(vec![
            vec![SourceCell::data("Merged").colspan(2)],
            vec![SourceCell::data("x"), SourceCell::data("y")],
        ]);
        assert_eq!(grid.width, 2);
        assert_eq!(grid.cell_at(0, 0), grid.cell_at(0, 1));
        assert_eq!(grid.cell_at(0, 1).unwrap().text, "Merged");
        assert!(grid.has_merged_cells());
        assert_eq!(grid.rows[1].cells[1].column, 1);
    }

    #[test]
    fn test_header_rules() {
        let grid = TableGrid::build(vec![
            vec![SourceCell::header("H"), SourceCell::data("plain")],
            vec![SourceCell::data("a"), SourceCell::data("b")],
            vec![SourceCell::data("c"), SourceCell::data("d")],
            vec![SourceCell::data("single")],
        ]);
        assert!(grid.rows[0].cells[0].is_header);
        assert!(!grid.rows[0].cells[1].is_header);
        assert!(grid.rows[1].cells.iter().all(|c| c.is_header));
        assert!(grid.rows[2].cells.iter().all(|c| !c.is_header));

        let lone = TableGrid::build(vec![vec![SourceCell::data("a")], vec![SourceCell::data("b")]]);
        assert!(!lone.rows[1].cells[0].is_header);
    }

    #[test]
    fn test_empty_grid() {
        let grid = TableGrid::build(Vec::new());
        assert!(grid.is_empty());
        assert_eq!(grid.width, 0);
    }
}
