use crate::infer::{commit_value, infer_control, CellEdit};
use crate::layout::LayoutHints;
use crate::matrix::Matrix;
use crate::profile::profile_column;
use crate::progress::{compute_progress, Progress};
use crate::render::{GridRenderer, RenderOptions, RenderPlan};
use crate::sort::{sort_matrix, SortOptions, SortOutcome};

/// One open sheet being edited: the matrix, its layout and the render
/// options in effect.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    pub matrix: Matrix,
    pub hints: LayoutHints,
    pub options: RenderOptions,
}

impl EditSession {
    pub fn new(matrix: Matrix, hints: LayoutHints, options: RenderOptions) -> Self {
        Self { matrix, hints, options }
    }

    /// Render with the session's options; the renderer supplies only the
    /// presentation.
    pub fn render(&self, renderer: &GridRenderer) -> RenderPlan {
        renderer.render_with(&self.matrix, &self.hints, &self.options)
    }

    /// Apply a user edit and return the updated progress.
    ///
    /// The control is inferred from the current column profile so the edit is
    /// converted exactly as the grid displayed it. Positions past the end of
    /// the matrix grow it.
    pub fn commit(&mut self, row: usize, col: usize, edit: CellEdit) -> Progress {
        let heuristics = &self.options.heuristics;
        let profile = profile_column(&self.matrix, col, heuristics.unique_value_cap);
        let control = infer_control(self.matrix.get(row, col), &profile, self.options.smart, heuristics);
        let value = commit_value(&control, edit);
        log::debug!("commit ({row}, {col}) via {}: {value:?}", control.name());
        self.matrix.set(row, col, value);
        self.progress()
    }

    /// Append an empty record as wide as the header. Returns its row index.
    pub fn add_row(&mut self) -> usize {
        self.matrix.push_blank_row();
        self.matrix.row_count() - 1
    }

    pub fn set_smart_mode(&mut self, smart: bool) {
        self.options.smart = smart;
    }

    pub fn progress(&self) -> Progress {
        compute_progress(&self.matrix)
    }

    pub fn sort(&mut self, options: &SortOptions) -> SortOutcome {
        sort_matrix(&mut self.matrix, &self.hints, options, &self.options.heuristics)
    }
}
