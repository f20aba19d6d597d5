// Layout hints: column widths, row heights and merged ranges.
//
// Source files size columns in characters or pixels and rows in pixels or
// points. The editor works in whole characters (columns) and whole pixels
// (rows), clamped to ranges the grid can display.

use serde::{Deserialize, Serialize};

pub const MIN_COLUMN_CHARS: u16 = 6;
pub const MAX_COLUMN_CHARS: u16 = 60;
pub const MIN_ROW_PIXELS: u16 = 22;
pub const MAX_ROW_PIXELS: u16 = 200;

/// Pixels per editor character.
const PIXELS_PER_CHAR: f64 = 8.0;

/// Screen pixels per typographic point (96 dpi / 72 pt).
const PIXELS_PER_POINT: f64 = 96.0 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthUnit {
    Characters,
    Pixels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    Pixels,
    Points,
}

/// Convert a source column width to editor characters.
/// Absent or non-finite input yields `None` (the grid auto-measures instead).
pub fn column_width_from_source(value: Option<f64>, unit: WidthUnit) -> Option<u16> {
    let value = value.filter(|v| v.is_finite())?;
    let chars = match unit {
        WidthUnit::Characters => value,
        WidthUnit::Pixels => value / PIXELS_PER_CHAR,
    };
    Some(clamp_round(chars, MIN_COLUMN_CHARS, MAX_COLUMN_CHARS))
}

/// Convert a source row height to editor pixels.
pub fn row_height_from_source(value: Option<f64>, unit: HeightUnit) -> Option<u16> {
    let value = value.filter(|v| v.is_finite())?;
    let pixels = match unit {
        HeightUnit::Pixels => value,
        HeightUnit::Points => value * PIXELS_PER_POINT,
    };
    Some(clamp_round(pixels, MIN_ROW_PIXELS, MAX_ROW_PIXELS))
}

/// Inverse of `column_width_from_source`.
pub fn column_width_to_source(chars: u16, unit: WidthUnit) -> f64 {
    match unit {
        WidthUnit::Characters => chars as f64,
        WidthUnit::Pixels => chars as f64 * PIXELS_PER_CHAR,
    }
}

/// Inverse of `row_height_from_source`.
pub fn row_height_to_source(pixels: u16, unit: HeightUnit) -> f64 {
    match unit {
        HeightUnit::Pixels => pixels as f64,
        HeightUnit::Points => pixels as f64 / PIXELS_PER_POINT,
    }
}

fn clamp_round(value: f64, min: u16, max: u16) -> u16 {
    value.round().clamp(min as f64, max as f64) as u16
}

// ============================================================================
// Merges
// ============================================================================

/// Inclusive rectangular merged range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl MergeRange {
    /// Corners may be given in any order.
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self {
            start_row: start_row.min(end_row),
            start_col: start_col.min(end_col),
            end_row: start_row.max(end_row),
            end_col: start_col.max(end_col),
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    pub fn row_span(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn col_span(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    pub fn area(&self) -> usize {
        self.row_span() * self.col_span()
    }

    pub fn is_single_cell(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }
}

/// How a grid position relates to the merged ranges of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergeCoverage {
    /// Top-left cell of a range spanning more than one cell.
    Anchor { row_span: usize, col_span: usize },
    /// Inside a range but not its anchor; not rendered.
    Covered,
    None,
}

/// Resolve `(row, col)` against `merges` in a single scan.
///
/// Single-cell ranges are ignored. If malformed input has several ranges
/// containing the position, the smallest by area wins; equal areas go to
/// the earliest in the list.
pub fn merge_coverage(merges: &[MergeRange], row: usize, col: usize) -> MergeCoverage {
    let mut best: Option<&MergeRange> = None;
    for m in merges {
        if m.is_single_cell() || !m.contains(row, col) {
            continue;
        }
        if best.map_or(true, |b| m.area() < b.area()) {
            best = Some(m);
        }
    }

    match best {
        Some(m) if m.start_row == row && m.start_col == col => MergeCoverage::Anchor {
            row_span: m.row_span(),
            col_span: m.col_span(),
        },
        Some(_) => MergeCoverage::Covered,
        None => MergeCoverage::None,
    }
}

// ============================================================================
// Source layout <-> editor hints
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnSize {
    pub value: f64,
    pub unit: WidthUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowSize {
    pub value: f64,
    pub unit: HeightUnit,
}

/// Layout exactly as a decoder read it from a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceLayout {
    pub column_sizes: Vec<Option<ColumnSize>>,
    pub row_sizes: Vec<Option<RowSize>>,
    pub merges: Vec<MergeRange>,
}

/// Layout in editor units, parallel to a `Matrix`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutHints {
    /// Characters per column, `None` = auto-measure.
    pub column_widths: Vec<Option<u16>>,
    /// Pixels per row, `None` = default height.
    pub row_heights: Vec<Option<u16>>,
    pub merges: Vec<MergeRange>,
}

impl LayoutHints {
    pub fn from_source(source: &SourceLayout) -> Self {
        let column_widths = source
            .column_sizes
            .iter()
            .map(|size| size.and_then(|s| column_width_from_source(Some(s.value), s.unit)))
            .collect();
        let row_heights = source
            .row_sizes
            .iter()
            .map(|size| size.and_then(|s| row_height_from_source(Some(s.value), s.unit)))
            .collect();

        let mut merges = Vec::with_capacity(source.merges.len());
        for m in &source.merges {
            let m = MergeRange::new(m.start_row, m.start_col, m.end_row, m.end_col);
            if m.is_single_cell() {
                log::debug!("ignoring single-cell merge at ({}, {})", m.start_row, m.start_col);
                continue;
            }
            merges.push(m);
        }

        Self { column_widths, row_heights, merges }
    }

    /// Express the hints in a file's native units for write-back.
    pub fn to_source(&self, width_unit: WidthUnit, height_unit: HeightUnit) -> SourceLayout {
        SourceLayout {
            column_sizes: self
                .column_widths
                .iter()
                .map(|w| {
                    w.map(|chars| ColumnSize {
                        value: column_width_to_source(chars, width_unit),
                        unit: width_unit,
                    })
                })
                .collect(),
            row_sizes: self
                .row_heights
                .iter()
                .map(|h| {
                    h.map(|px| RowSize {
                        value: row_height_to_source(px, height_unit),
                        unit: height_unit,
                    })
                })
                .collect(),
            merges: self.merges.clone(),
        }
    }

    pub fn column_width(&self, col: usize) -> Option<u16> {
        self.column_widths.get(col).copied().flatten()
    }

    pub fn row_height(&self, row: usize) -> Option<u16> {
        self.row_heights.get(row).copied().flatten()
    }

    pub fn coverage(&self, row: usize, col: usize) -> MergeCoverage {
        merge_coverage(&self.merges, row, col)
    }

    /// True if a merge starting on `row` spans two or more columns.
    pub fn has_wide_merge_on_row(&self, row: usize) -> bool {
        self.merges
            .iter()
            .any(|m| m.start_row == row && m.end_col > m.start_col)
    }

    /// True if a merge spanning two or more rows covers `row`.
    pub fn has_tall_merge_through(&self, row: usize) -> bool {
        self.merges
            .iter()
            .any(|m| m.end_row > m.start_row && (m.start_row..=m.end_row).contains(&row))
    }

    /// True if any real merge (more than one cell) touches `row`.
    pub fn row_has_merge(&self, row: usize) -> bool {
        self.merges
            .iter()
            .any(|m| !m.is_single_cell() && (m.start_row..=m.end_row).contains(&row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_width_characters() {
        assert_eq!(column_width_from_source(Some(15.4), WidthUnit::Characters), Some(15));
        assert_eq!(column_width_from_source(Some(15.5), WidthUnit::Characters), Some(16));
        assert_eq!(column_width_from_source(Some(2.0), WidthUnit::Characters), Some(6));
        assert_eq!(column_width_from_source(Some(400.0), WidthUnit::Characters), Some(60));
        assert_eq!(column_width_from_source(None, WidthUnit::Characters), None);
        assert_eq!(column_width_from_source(Some(f64::NAN), WidthUnit::Characters), None);
    }

    #[test]
    fn test_column_width_pixels() {
        assert_eq!(column_width_from_source(Some(160.0), WidthUnit::Pixels), Some(20));
        assert_eq!(column_width_from_source(Some(12.0), WidthUnit::Pixels), Some(6));
        assert_eq!(column_width_from_source(Some(1000.0), WidthUnit::Pixels), Some(60));
    }

    #[test]
    fn test_row_height() {
        assert_eq!(row_height_from_source(Some(30.0), HeightUnit::Pixels), Some(30));
        assert_eq!(row_height_from_source(Some(30.0), HeightUnit::Points), Some(40));
        assert_eq!(row_height_from_source(Some(15.0), HeightUnit::Points), Some(22));
        assert_eq!(row_height_from_source(Some(500.0), HeightUnit::Pixels), Some(200));
        assert_eq!(row_height_from_source(Some(f64::INFINITY), HeightUnit::Points), None);
    }

    #[test]
    fn test_round_trip_representable_values() {
        for chars in [6u16, 12, 60] {
            let px = column_width_to_source(chars, WidthUnit::Pixels);
            assert_eq!(column_width_from_source(Some(px), WidthUnit::Pixels), Some(chars));
        }
        for px in [22u16, 40, 200] {
            let pt = row_height_to_source(px, HeightUnit::Points);
            assert_eq!(row_height_from_source(Some(pt), HeightUnit::Points), Some(px));
        }
    }

    #[test]
    fn test_hints_round_trip() {
        let source = SourceLayout {
            column_sizes: vec![
                Some(ColumnSize { value: 12.0, unit: WidthUnit::Characters }),
                None,
            ],
            row_sizes: vec![None, Some(RowSize { value: 30.0, unit: HeightUnit::Points })],
            merges: vec![MergeRange::new(0, 0, 0, 1)],
        };
        let hints = LayoutHints::from_source(&source);
        assert_eq!(hints.column_widths, vec![Some(12), None]);
        assert_eq!(hints.row_heights, vec![None, Some(40)]);

        let back = hints.to_source(WidthUnit::Characters, HeightUnit::Points);
        assert_eq!(back.column_sizes, source.column_sizes);
        assert_eq!(back.row_sizes, source.row_sizes);
        assert_eq!(back.merges, source.merges);
    }

    #[test]
    fn test_merge_coverage_basic() {
        let merges = vec![MergeRange::new(1, 1, 2, 3)];
        assert_eq!(
            merge_coverage(&merges, 1, 1),
            MergeCoverage::Anchor { row_span: 2, col_span: 3 }
        );
        assert_eq!(merge_coverage(&merges, 2, 3), MergeCoverage::Covered);
        assert_eq!(merge_coverage(&merges, 1, 2), MergeCoverage::Covered);
        assert_eq!(merge_coverage(&merges, 0, 0), MergeCoverage::None);
        assert_eq!(merge_coverage(&merges, 3, 1), MergeCoverage::None);
    }

    #[test]
    fn test_reversed_corners_normalize() {
        let m = MergeRange::new(4, 5, 2, 1);
        assert_eq!((m.start_row, m.start_col, m.end_row, m.end_col), (2, 1, 4, 5));
    }

    #[test]
    fn test_single_cell_merge_ignored() {
        let merges = vec![MergeRange::new(3, 3, 3, 3)];
        assert_eq!(merge_coverage(&merges, 3, 3), MergeCoverage::None);

        let hints = LayoutHints::from_source(&SourceLayout {
            merges: merges.clone(),
            ..Default::default()
        });
        assert!(hints.merges.is_empty());
    }

    #[test]
    fn test_overlap_smallest_area_wins() {
        // Big range first, small one nested inside it.
        let merges = vec![MergeRange::new(0, 0, 3, 3), MergeRange::new(1, 1, 1, 2)];
        assert_eq!(
            merge_coverage(&merges, 1, 1),
            MergeCoverage::Anchor { row_span: 1, col_span: 2 }
        );
        assert_eq!(merge_coverage(&merges, 1, 2), MergeCoverage::Covered);
        assert_eq!(
            merge_coverage(&merges, 0, 0),
            MergeCoverage::Anchor { row_span: 4, col_span: 4 }
        );
    }

    #[test]
    fn test_overlap_equal_area_first_wins() {
        let merges = vec![MergeRange::new(0, 1, 0, 2), MergeRange::new(0, 0, 0, 1)];
        // (0,1) is the anchor of the first range and covered by the second.
        assert_eq!(
            merge_coverage(&merges, 0, 1),
            MergeCoverage::Anchor { row_span: 1, col_span: 2 }
        );
    }

    #[test]
    fn test_wide_merge_on_row() {
        let hints = LayoutHints {
            merges: vec![MergeRange::new(2, 0, 4, 0), MergeRange::new(5, 0, 5, 2)],
            ..Default::default()
        };
        assert!(!hints.has_wide_merge_on_row(2));
        assert!(hints.has_wide_merge_on_row(5));
        assert!(!hints.has_wide_merge_on_row(0));
    }

    #[test]
    fn test_row_merge_queries() {
        let hints = LayoutHints {
            merges: vec![
                MergeRange::new(2, 0, 4, 0),
                MergeRange::new(5, 0, 5, 2),
                MergeRange::new(7, 1, 7, 1),
            ],
            ..Default::default()
        };
        assert!(!hints.has_tall_merge_through(1));
        assert!(hints.has_tall_merge_through(2));
        assert!(hints.has_tall_merge_through(4));
        assert!(!hints.has_tall_merge_through(5));

        assert!(hints.row_has_merge(3));
        assert!(hints.row_has_merge(5));
        assert!(!hints.row_has_merge(6));
        assert!(!hints.row_has_merge(7));
    }
}
