// Section header detection.
//
// A section header is a data row that acts as a label or banner for the rows
// below it ("Act 1", "Side quests"). The grid renders it as static text
// instead of editors.

use rustc_hash::FxHashSet;

use crate::cell::CellValue;
use crate::heuristics::Heuristics;
use crate::layout::LayoutHints;
use crate::matrix::Matrix;
use crate::profile::ColumnProfile;

/// Decide whether data row `row` is a section header.
///
/// Rules, in order:
/// 1. any boolean-like cell vetoes (checklists are data);
/// 2. any text ending in `:` vetoes (form prompts such as "Player Name:");
/// 3. the same label twice in the row accepts (a repeated sub-table header);
/// 4. otherwise the row must be sparse (few values, a low filled ratio, or a
///    wide merge starting on it) and every column it touches must be sparse
///    sheet-wide.
///
/// Row 0, blank rows and rows crossed by a multi-row merge are never
/// section headers.
pub fn is_section_header(
    matrix: &Matrix,
    row: usize,
    hints: &LayoutHints,
    profiles: &[ColumnProfile],
    heuristics: &Heuristics,
) -> bool {
    if row == 0 || hints.has_tall_merge_through(row) {
        return false;
    }

    let mut non_empty = 0usize;
    let mut touched = 0usize;
    let mut positions = Vec::new();
    let mut labels: FxHashSet<&str> = FxHashSet::default();
    let mut has_colon_label = false;
    let mut has_duplicate_label = false;

    for (col, value) in matrix.row(row).iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        if value.is_boolean_like() {
            return false;
        }
        touched = col + 1;
        non_empty += 1;
        positions.push(col);

        if let CellValue::Text(s) = value {
            let label = s.trim();
            if label.ends_with(':') {
                has_colon_label = true;
            }
            if !label.is_empty() && !labels.insert(label) {
                has_duplicate_label = true;
            }
        }
    }

    if non_empty == 0 || has_colon_label {
        return false;
    }
    if has_duplicate_label {
        return true;
    }

    let ratio = non_empty as f64 / touched as f64;
    let merged = hints.has_wide_merge_on_row(row);
    let sparse_row = non_empty <= heuristics.section_max_non_empty
        || ratio <= heuristics.section_ratio_max
        || merged;

    let sparse_columns = positions.iter().all(|&col| {
        profiles
            .get(col)
            .map_or(true, |p| p.total_non_empty <= heuristics.sparse_column_max)
    });

    sparse_row && sparse_columns
}
