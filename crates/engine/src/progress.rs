use serde::{Deserialize, Serialize};

use crate::matrix::Matrix;

/// Checked vs. total boolean-like cells of a sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Rounded percentage, or `None` when the sheet tracks nothing.
    pub fn percent(&self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        Some(((self.completed as f64 / self.total as f64) * 100.0).round() as u8)
    }

    pub fn is_tracked(&self) -> bool {
        self.total > 0
    }
}

/// Count boolean-like cells below the header row. Other cells never
/// contribute to either number.
pub fn compute_progress(matrix: &Matrix) -> Progress {
    let mut progress = Progress::default();
    for row in matrix.rows().iter().skip(1) {
        for value in row {
            if value.is_boolean_like() {
                progress.total += 1;
                if value.is_truthy() {
                    progress.completed += 1;
                }
            }
        }
    }
    progress
}
