// Per-column statistics that drive row classification and control inference.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::cell::{is_boolean_token, CellValue};
use crate::matrix::Matrix;

/// Statistics for one column, computed over rows 1..N (the header row is
/// excluded).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnProfile {
    /// Distinct string forms in first-seen order, capped.
    pub unique_values: Vec<String>,
    /// Exact count of non-empty cells, unaffected by the cap.
    pub total_non_empty: usize,
    /// Exact count of non-empty boolean-like cells.
    pub boolean_like_count: usize,
}

impl ColumnProfile {
    /// One or two distinct values, all of them boolean-like.
    pub fn is_boolean_column(&self) -> bool {
        (1..=2).contains(&self.unique_values.len())
            && self.unique_values.iter().all(|v| is_boolean_token(v))
    }

    /// At least one value repeats.
    pub fn has_repeats(&self) -> bool {
        self.unique_values.len() < self.total_non_empty
    }
}

#[derive(Default)]
struct ProfileBuilder {
    seen: FxHashSet<String>,
    profile: ColumnProfile,
}

impl ProfileBuilder {
    fn observe(&mut self, value: &CellValue, cap: usize) {
        if value.is_empty() {
            return;
        }
        self.profile.total_non_empty += 1;
        if value.is_boolean_like() {
            self.profile.boolean_like_count += 1;
        }
        if self.profile.unique_values.len() < cap {
            let key = value.to_text();
            if !self.seen.contains(key.as_ref()) {
                self.seen.insert(key.to_string());
                self.profile.unique_values.push(key.into_owned());
            }
        }
    }
}

pub fn profile_column(matrix: &Matrix, col: usize, cap: usize) -> ColumnProfile {
    let mut builder = ProfileBuilder::default();
    for row in 1..matrix.row_count() {
        builder.observe(matrix.get(row, col), cap);
    }
    builder.profile
}

/// Profile every column in a single pass over the matrix.
pub fn profile_columns(matrix: &Matrix, cap: usize) -> Vec<ColumnProfile> {
    let cols = matrix.column_count();
    let mut builders: Vec<ProfileBuilder> = (0..cols).map(|_| ProfileBuilder::default()).collect();
    for row in matrix.rows().iter().skip(1) {
        for (col, value) in row.iter().enumerate() {
            builders[col].observe(value, cap);
        }
    }
    builders.into_iter().map(|b| b.profile).collect()
}
