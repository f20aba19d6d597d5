use serde::{Deserialize, Serialize};

/// Tunable thresholds for column profiling, section detection and control
/// inference. The defaults are the values the editor has always shipped with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Heuristics {
    /// Distinct values remembered per column.
    pub unique_value_cap: usize,
    /// A row with at most this many non-empty values may be a section header.
    pub section_max_non_empty: usize,
    /// ...or one whose filled fraction of touched columns is at most this.
    pub section_ratio_max: f64,
    /// Every column a section header touches must hold at most this many
    /// values sheet-wide.
    pub sparse_column_max: usize,
    /// Columns with more distinct values never become dropdowns.
    pub dropdown_max_options: usize,
    /// Text longer than this (in chars) gets a multi-line editor.
    pub multiline_threshold: usize,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            unique_value_cap: 12,
            section_max_non_empty: 2,
            section_ratio_max: 0.3,
            sparse_column_max: 2,
            dropdown_max_options: 10,
            multiline_threshold: 30,
        }
    }
}
