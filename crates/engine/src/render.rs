// Grid renderer: turns a matrix plus layout hints into a render plan the UI
// layer can draw without further decisions.
//
// Presentation (sticky header, isolated styles, striping) is a strategy
// chosen once when the renderer is built.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classify::is_section_header;
use crate::heuristics::Heuristics;
use crate::infer::{infer_control, Alignment, CellControl};
use crate::layout::{LayoutHints, MergeCoverage};
use crate::matrix::Matrix;
use crate::profile::{profile_columns, ColumnProfile};

const AUTO_MIN_CHARS: f64 = 8.0;
const AUTO_MAX_CHARS: f64 = 36.0;
/// Sampling a column stops once its estimate passes this.
const AUTO_SAMPLE_LIMIT: f64 = 80.0;
/// Extra width counted for each visually wide glyph.
const WIDE_GLYPH_BUMP: f64 = 0.4;

// ============================================================================
// Presentation strategies
// ============================================================================

/// Table-level decoration flags carried by a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Decor {
    pub sticky_header: bool,
    pub sticky_first_column: bool,
    /// Styles must not leak in or out of the grid (e.g. rendered in a
    /// shadow root).
    pub isolated: bool,
}

pub trait Presentation {
    fn name(&self) -> &'static str;

    fn decor(&self) -> Decor {
        Decor::default()
    }

    /// Whether the `nth` visible body row (0-based) gets a striped background.
    fn zebra(&self, _nth: usize) -> bool {
        false
    }
}

pub struct PlainPresentation;

impl Presentation for PlainPresentation {
    fn name(&self) -> &'static str {
        "plain"
    }
}

pub struct StickyHeaderPresentation;

impl Presentation for StickyHeaderPresentation {
    fn name(&self) -> &'static str {
        "sticky-header"
    }

    fn decor(&self) -> Decor {
        Decor { sticky_header: true, sticky_first_column: true, isolated: false }
    }
}

pub struct ShadowIsolatedPresentation;

impl Presentation for ShadowIsolatedPresentation {
    fn name(&self) -> &'static str {
        "shadow-isolated"
    }

    fn decor(&self) -> Decor {
        Decor { sticky_header: true, sticky_first_column: true, isolated: true }
    }

    fn zebra(&self, nth: usize) -> bool {
        nth % 2 == 1
    }
}

/// Serializable selector for the built-in presentations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresentationKind {
    #[default]
    Plain,
    StickyHeader,
    ShadowIsolated,
}

impl PresentationKind {
    pub fn build(self) -> Box<dyn Presentation> {
        match self {
            PresentationKind::Plain => Box::new(PlainPresentation),
            PresentationKind::StickyHeader => Box::new(StickyHeaderPresentation),
            PresentationKind::ShadowIsolated => Box::new(ShadowIsolatedPresentation),
        }
    }
}

impl FromStr for PresentationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" => Ok(PresentationKind::Plain),
            "sticky-header" | "sticky" => Ok(PresentationKind::StickyHeader),
            "shadow-isolated" | "shadow" => Ok(PresentationKind::ShadowIsolated),
            other => Err(format!("unknown presentation: {other}")),
        }
    }
}

// ============================================================================
// Render plan
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Heuristic controls (checkboxes, dropdowns, section headers). When off
    /// every cell is a text/number field.
    pub smart: bool,
    pub heuristics: Heuristics,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { smart: true, heuristics: Heuristics::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// Display width in characters.
    pub width: u16,
    /// Measured from content rather than taken from the file.
    pub auto: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub col: usize,
    pub text: String,
    pub row_span: usize,
    pub col_span: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyCell {
    pub col: usize,
    pub value: String,
    pub row_span: usize,
    pub col_span: usize,
    pub alignment: Alignment,
    pub control: CellControl,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowKind {
    /// One static cell across the whole table.
    Section { text: String, col_span: usize },
    Cells { cells: Vec<BodyCell> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRow {
    /// Matrix row index.
    pub index: usize,
    /// Pixel height from the file, if any.
    pub height: Option<u16>,
    pub zebra: bool,
    #[serde(flatten)]
    pub kind: RowKind,
}

impl RenderRow {
    pub fn is_section(&self) -> bool {
        matches!(self.kind, RowKind::Section { .. })
    }

    pub fn cells(&self) -> &[BodyCell] {
        match &self.kind {
            RowKind::Cells { cells } => cells,
            RowKind::Section { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub presentation: &'static str,
    pub decor: Decor,
    pub columns: Vec<ColumnSpec>,
    pub header: Vec<HeaderCell>,
    pub rows: Vec<RenderRow>,
}

impl RenderPlan {
    pub fn section_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_section()).count()
    }

    /// Find the rendered cell at a matrix position (anchors only).
    pub fn cell(&self, row: usize, col: usize) -> Option<&BodyCell> {
        self.rows
            .iter()
            .find(|r| r.index == row)
            .and_then(|r| r.cells().iter().find(|c| c.col == col))
    }
}

// ============================================================================
// Renderer
// ============================================================================

pub struct GridRenderer {
    options: RenderOptions,
    presentation: Box<dyn Presentation>,
}

impl Default for GridRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default(), Box::new(PlainPresentation))
    }
}

impl GridRenderer {
    pub fn new(options: RenderOptions, presentation: Box<dyn Presentation>) -> Self {
        Self { options, presentation }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Every render is a full render, so toggling takes effect on the next
    /// call.
    pub fn set_smart(&mut self, smart: bool) {
        self.options.smart = smart;
    }

    pub fn render(&self, matrix: &Matrix, hints: &LayoutHints) -> RenderPlan {
        self.render_with(matrix, hints, &self.options)
    }

    /// Render with options other than the renderer's own, keeping its
    /// presentation.
    pub fn render_with(&self, matrix: &Matrix, hints: &LayoutHints, options: &RenderOptions) -> RenderPlan {
        let cols = matrix.column_count();
        let heuristics = &options.heuristics;
        let smart = options.smart;

        let columns = (0..cols)
            .map(|c| match hints.column_width(c) {
                Some(width) => ColumnSpec { width, auto: false },
                None => ColumnSpec { width: auto_column_width(matrix, c), auto: true },
            })
            .collect();

        let header = render_header(matrix, hints, cols);

        let profiles = profile_columns(matrix, heuristics.unique_value_cap);
        let fallback = ColumnProfile::default();

        let mut rows = Vec::with_capacity(matrix.row_count().saturating_sub(1));
        for r in 1..matrix.row_count() {
            let nth = rows.len();
            let height = hints.row_height(r);
            let zebra = self.presentation.zebra(nth);

            if smart && is_section_header(matrix, r, hints, &profiles, heuristics) {
                let text = matrix
                    .row(r)
                    .iter()
                    .filter(|v| !v.is_empty())
                    .map(|v| v.to_text().into_owned())
                    .collect::<Vec<_>>()
                    .join(" ");
                rows.push(RenderRow {
                    index: r,
                    height,
                    zebra,
                    kind: RowKind::Section { text, col_span: cols },
                });
                continue;
            }

            let mut cells = Vec::with_capacity(cols);
            for c in 0..cols {
                let (row_span, col_span) = match hints.coverage(r, c) {
                    MergeCoverage::Covered => continue,
                    MergeCoverage::Anchor { row_span, col_span } => (row_span, col_span),
                    MergeCoverage::None => (1, 1),
                };
                let value = matrix.get(r, c);
                let profile = profiles.get(c).unwrap_or(&fallback);
                let control = infer_control(value, profile, smart, heuristics);
                cells.push(BodyCell {
                    col: c,
                    value: value.to_text().into_owned(),
                    row_span,
                    col_span,
                    alignment: control.alignment(),
                    control,
                });
            }
            rows.push(RenderRow { index: r, height, zebra, kind: RowKind::Cells { cells } });
        }

        // A sheet with no records still needs somewhere to type the first one.
        if matrix.row_count() <= 1 {
            let cells = (0..cols)
                .map(|c| BodyCell {
                    col: c,
                    value: String::new(),
                    row_span: 1,
                    col_span: 1,
                    alignment: Alignment::Left,
                    control: CellControl::MultiLine { numeric: false },
                })
                .collect();
            rows.push(RenderRow {
                index: 1,
                height: hints.row_height(1),
                zebra: false,
                kind: RowKind::Cells { cells },
            });
        }

        let plan = RenderPlan {
            presentation: self.presentation.name(),
            decor: self.presentation.decor(),
            columns,
            header,
            rows,
        };
        log::debug!(
            "rendered {} body rows x {} cols ({} section headers, smart={}, presentation={})",
            plan.rows.len(),
            cols,
            plan.section_count(),
            smart,
            plan.presentation
        );
        plan
    }
}

fn render_header(matrix: &Matrix, hints: &LayoutHints, cols: usize) -> Vec<HeaderCell> {
    let mut header = Vec::with_capacity(cols);
    for c in 0..cols {
        let (row_span, col_span) = match hints.coverage(0, c) {
            MergeCoverage::Covered => continue,
            MergeCoverage::Anchor { row_span, col_span } => (row_span, col_span),
            MergeCoverage::None => (1, 1),
        };
        header.push(HeaderCell {
            col: c,
            text: matrix.get(0, c).to_text().into_owned(),
            row_span,
            col_span,
        });
    }
    header
}

/// Estimate a column's width in characters from its content.
pub fn auto_column_width(matrix: &Matrix, col: usize) -> u16 {
    let mut longest = 0.0f64;
    for r in 0..matrix.row_count() {
        let text = matrix.get(r, col).to_text();
        let wide = text.chars().filter(|ch| matches!(ch, 'M' | 'W' | '@' | '#')).count();
        let estimate = text.chars().count() as f64 + wide as f64 * WIDE_GLYPH_BUMP;
        if estimate > longest {
            longest = estimate;
        }
        if longest > AUTO_SAMPLE_LIMIT {
            break;
        }
    }
    (longest * 0.9 + 2.0).ceil().clamp(AUTO_MIN_CHARS, AUTO_MAX_CHARS) as u16
}
