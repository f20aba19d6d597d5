use serde::{Deserialize, Serialize};

use crate::cell::CellValue;

static EMPTY: CellValue = CellValue::Empty;

/// One sheet's cells, row-major. Row 0 is the header row.
///
/// Rows may be ragged; any position past the end of a row reads as
/// `CellValue::Empty`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Matrix {
    rows: Vec<Vec<CellValue>>,
}

impl Matrix {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Build from string rows, mapping `""` to `Empty`. Handy for CSV data
    /// and tests.
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|s| CellValue::from(s.as_ref())).collect())
                .collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row, never less than 1.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0).max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Cells of `row` as stored (may be shorter than `column_count`).
    pub fn row(&self, row: usize) -> &[CellValue] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn header(&self) -> &[CellValue] {
        self.row(0)
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Write a cell, growing the matrix with empty cells as needed.
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }

    /// Append a blank record as wide as the header row (at least one cell).
    pub fn push_blank_row(&mut self) {
        let width = self.header().len().max(1);
        self.rows.push(vec![CellValue::Empty; width]);
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.rows
    }
}

impl From<Vec<Vec<CellValue>>> for Matrix {
    fn from(rows: Vec<Vec<CellValue>>) -> Self {
        Self::new(rows)
    }
}
