// Terminal and JSON output for inspect/progress

use serde::Serialize;

use gamesheets_engine::cell_id::col_to_letters;
use gamesheets_engine::infer::CellControl;
use gamesheets_engine::matrix::Matrix;
use gamesheets_engine::progress::Progress;
use gamesheets_engine::render::{BodyCell, RenderPlan, RowKind};

/// One sheet in `inspect --json` output.
#[derive(Debug, Serialize)]
pub struct SheetReport<'a> {
    pub sheet: &'a str,
    pub rows: usize,
    pub columns: usize,
    pub progress: ProgressReport<'a>,
    pub plan: RenderPlan,
}

/// One sheet in `progress --json` output.
#[derive(Debug, Serialize)]
pub struct ProgressReport<'a> {
    pub sheet: &'a str,
    pub completed: usize,
    pub total: usize,
    pub percent: Option<u8>,
}

impl<'a> ProgressReport<'a> {
    pub fn new(sheet: &'a str, progress: Progress) -> Self {
        Self {
            sheet,
            completed: progress.completed,
            total: progress.total,
            percent: progress.percent(),
        }
    }
}

/// "Quests (67%)", or just the name for sheets without checkboxes.
pub fn progress_line(name: &str, progress: &Progress) -> String {
    match progress.percent() {
        Some(pct) => format!("{} ({}%)", name, pct),
        None => name.to_string(),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ControlCounts {
    checkbox: usize,
    dropdown: usize,
    multiline: usize,
    input: usize,
}

impl ControlCounts {
    fn tally(plan: &RenderPlan) -> Self {
        let mut counts = Self::default();
        for cell in plan.rows.iter().flat_map(|r| r.cells()) {
            match cell.control {
                CellControl::Checkbox { .. } => counts.checkbox += 1,
                CellControl::Dropdown { .. } => counts.dropdown += 1,
                CellControl::MultiLine { .. } => counts.multiline += 1,
                CellControl::SingleLine { .. } => counts.input += 1,
            }
        }
        counts
    }
}

fn cell_label(cell: &BodyCell) -> String {
    let mut label = match &cell.control {
        CellControl::Checkbox { checked: true } => "[x]".to_string(),
        CellControl::Checkbox { checked: false } => "[ ]".to_string(),
        CellControl::Dropdown { selected, .. } => format!("<{}>", selected),
        CellControl::MultiLine { .. } | CellControl::SingleLine { .. } => cell.value.replace('\n', "\\n"),
    };
    if cell.row_span > 1 || cell.col_span > 1 {
        label.push_str(&format!(" ({}x{})", cell.row_span, cell.col_span));
    }
    label
}

/// Human-readable summary of one rendered sheet followed by its rows.
pub fn plan_summary(name: &str, matrix: &Matrix, plan: &RenderPlan, smart: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Sheet: {}", name));
    lines.push(format!("Size: {} rows x {} cols", matrix.row_count(), matrix.column_count()));
    lines.push(format!(
        "Presentation: {} (smart {})",
        plan.presentation,
        if smart { "on" } else { "off" }
    ));

    let columns: Vec<String> = plan
        .columns
        .iter()
        .enumerate()
        .map(|(col, spec)| {
            format!("{}={}{}", col_to_letters(col), spec.width, if spec.auto { "*" } else { "" })
        })
        .collect();
    lines.push(format!("Columns: {}", columns.join(" ")));
    lines.push(format!("Sections: {}", plan.section_count()));

    let counts = ControlCounts::tally(plan);
    lines.push(format!(
        "Controls: {} checkbox, {} dropdown, {} multiline, {} input",
        counts.checkbox, counts.dropdown, counts.multiline, counts.input
    ));

    let progress = gamesheets_engine::progress::compute_progress(matrix);
    lines.push(match progress.percent() {
        Some(pct) => format!("Progress: {}/{} ({}%)", progress.completed, progress.total, pct),
        None => "Progress: untracked".to_string(),
    });

    lines.push(String::new());
    let header: Vec<&str> = plan.header.iter().map(|h| h.text.as_str()).collect();
    lines.push(format!("{:>4} | {}", 1, header.join(" | ")));
    for row in &plan.rows {
        let body = match &row.kind {
            RowKind::Section { text, .. } => format!("== {} ==", text),
            RowKind::Cells { cells } => cells.iter().map(cell_label).collect::<Vec<_>>().join(" | "),
        };
        lines.push(format!("{:>4} | {}", row.index + 1, body));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamesheets_engine::layout::LayoutHints;
    use gamesheets_engine::render::GridRenderer;

    fn quest_log() -> Matrix {
        Matrix::from_strings([
            vec!["Act", "Quest", "Done", "Gold"],
            vec!["Act 1", "", "", ""],
            vec!["", "Cave", "yes", "10"],
            vec!["", "Lake", "no", "7"],
            vec!["", "Forest", "yes", "12"],
        ])
    }

    #[test]
    fn test_progress_line() {
        assert_eq!(progress_line("Quests", &Progress { completed: 2, total: 3 }), "Quests (67%)");
        assert_eq!(progress_line("Notes", &Progress::default()), "Notes");
    }

    #[test]
    fn test_plan_summary_lists_sections_and_controls() {
        let matrix = quest_log();
        let plan = GridRenderer::default().render(&matrix, &LayoutHints::default());
        let text = plan_summary("Quests", &matrix, &plan, true);

        assert!(text.contains("Size: 5 rows x 4 cols"));
        assert!(text.contains("Presentation: plain (smart on)"));
        assert!(text.contains("Sections: 1"));
        assert!(text.contains("Controls: 3 checkbox, 0 dropdown, 0 multiline, 9 input"));
        assert!(text.contains("Progress: 2/3 (67%)"));
        assert!(text.contains("   1 | Act | Quest | Done | Gold"));
        assert!(text.contains("   2 | == Act 1 =="));
        assert!(text.contains("   3 |  | Cave | [x] | 10"));
    }

    #[test]
    fn test_merged_cells_show_span() {
        let cell = BodyCell {
            col: 0,
            value: "Boss".into(),
            row_span: 2,
            col_span: 1,
            alignment: Default::default(),
            control: CellControl::SingleLine { numeric: false },
        };
        assert_eq!(cell_label(&cell), "Boss (2x1)");
    }
}
