// Column sorting that keeps section headers and merged rows in place.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::classify::is_section_header;
use crate::heuristics::Heuristics;
use crate::layout::LayoutHints;
use crate::matrix::Matrix;
use crate::profile::profile_columns;

/// Share of a column's non-empty values that must agree for a kind to be
/// inferred.
const KIND_RATIO: f64 = 0.7;

const COMPLETED_TOKENS: &[&str] = &["true", "yes", "y", "x", "✓", "✔", "done", "completed", "1"];
const PENDING_TOKENS: &[&str] = &["false", "no", "n", "0"];
const COMPLETION_HEADER_WORDS: &[&str] = &["done", "complete", "status", "check"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Header click cycle: unsorted -> ascending -> descending -> unsorted.
    pub fn cycle(current: Option<SortDirection>) -> Option<SortDirection> {
        match current {
            None => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortScope {
    /// Sort each run of rows between section headers on its own.
    #[default]
    Sections,
    Sheet,
}

impl FromStr for SortScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sections" | "section" => Ok(SortScope::Sections),
            "sheet" => Ok(SortScope::Sheet),
            other => Err(format!("unknown sort scope: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKind {
    Alpha,
    Numeric,
    Completed,
}

impl FromStr for SortKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alpha" => Ok(SortKind::Alpha),
            "numeric" => Ok(SortKind::Numeric),
            "completed" => Ok(SortKind::Completed),
            other => Err(format!("unknown sort kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptions {
    pub col: usize,
    pub direction: SortDirection,
    pub scope: SortScope,
    /// Forced comparator; inferred from the column when `None`.
    pub kind: Option<SortKind>,
}

impl SortOptions {
    pub fn new(col: usize) -> Self {
        Self { col, direction: SortDirection::Ascending, scope: SortScope::Sections, kind: None }
    }
}

/// What a sort actually did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortOutcome {
    pub col: usize,
    pub direction: SortDirection,
    pub scope: SortScope,
    pub kind: SortKind,
    /// Number of independently sorted row blocks.
    pub blocks: usize,
}

/// -1 unknown, 0 pending, 1 completed.
fn completion_rank(value: &CellValue) -> i8 {
    if let CellValue::Boolean(b) = value {
        return *b as i8;
    }
    let text = value.to_text().trim().to_lowercase();
    if text.is_empty() {
        -1
    } else if COMPLETED_TOKENS.contains(&text.as_str()) {
        1
    } else if PENDING_TOKENS.contains(&text.as_str()) {
        0
    } else {
        -1
    }
}

/// Number with currency symbols and thousands separators stripped.
fn sort_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
        CellValue::Empty | CellValue::Boolean(_) => None,
        CellValue::Text(s) => {
            let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
        }
    }
}

/// Pick a comparator from the column contents and its header text.
pub fn infer_sort_kind(matrix: &Matrix, col: usize) -> SortKind {
    let mut total = 0usize;
    let mut completion = 0usize;
    let mut numeric = 0usize;
    for row in 1..matrix.row_count() {
        let value = matrix.get(row, col);
        if value.to_text().trim().is_empty() {
            continue;
        }
        total += 1;
        if completion_rank(value) != -1 {
            completion += 1;
        }
        if sort_number(value).is_some() {
            numeric += 1;
        }
    }

    let ratio = |n: usize| if total > 0 { n as f64 / total as f64 } else { 0.0 };
    if ratio(completion) >= KIND_RATIO {
        return SortKind::Completed;
    }
    let header = matrix.get(0, col).to_text().to_lowercase();
    if COMPLETION_HEADER_WORDS.iter().any(|w| header.contains(w)) {
        return SortKind::Completed;
    }
    if ratio(numeric) >= KIND_RATIO {
        return SortKind::Numeric;
    }
    SortKind::Alpha
}

fn compare(kind: SortKind, a: &CellValue, b: &CellValue) -> Ordering {
    match kind {
        SortKind::Completed => completion_rank(a).cmp(&completion_rank(b)),
        SortKind::Numeric => match (sort_number(a), sort_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKind::Alpha => a.to_text().to_lowercase().cmp(&b.to_text().to_lowercase()),
    }
}

/// Row ranges (half-open) that may be reordered. Merges are positional, so
/// rows touched by one are fixed in both scopes. Section headers are fixed
/// only in section scope.
fn sortable_blocks(
    matrix: &Matrix,
    hints: &LayoutHints,
    scope: SortScope,
    heuristics: &Heuristics,
) -> Vec<(usize, usize)> {
    let rows = matrix.row_count();
    let profiles = match scope {
        SortScope::Sections => profile_columns(matrix, heuristics.unique_value_cap),
        SortScope::Sheet => Vec::new(),
    };
    let fixed = |r: usize| {
        hints.row_has_merge(r)
            || (scope == SortScope::Sections && is_section_header(matrix, r, hints, &profiles, heuristics))
    };

    let mut blocks = Vec::new();
    let mut start = 1;
    for r in 1..rows {
        if fixed(r) {
            if r > start {
                blocks.push((start, r));
            }
            start = r + 1;
        }
    }
    if start < rows {
        blocks.push((start, rows));
    }
    blocks
}

/// Sort body rows by one column in place. Row 0 never moves, layout hints are
/// left untouched and rows covered by a merge keep their position.
pub fn sort_matrix(
    matrix: &mut Matrix,
    hints: &LayoutHints,
    options: &SortOptions,
    heuristics: &Heuristics,
) -> SortOutcome {
    let col = options.col;
    let kind = options.kind.unwrap_or_else(|| infer_sort_kind(matrix, col));

    let blocks = sortable_blocks(matrix, hints, options.scope, heuristics);

    let rows = matrix.rows_mut();
    for &(start, end) in &blocks {
        let block = &mut rows[start..end];
        block.sort_by(|a, b| {
            let left = a.get(col).unwrap_or(&CellValue::Empty);
            let right = b.get(col).unwrap_or(&CellValue::Empty);
            compare(kind, left, right)
        });
        if options.direction == SortDirection::Descending {
            block.reverse();
        }
    }

    log::debug!(
        "sorted column {} {:?} as {:?} ({:?}, {} blocks)",
        col,
        options.direction,
        kind,
        options.scope,
        blocks.len()
    );

    SortOutcome {
        col,
        direction: options.direction,
        scope: options.scope,
        kind,
        blocks: blocks.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MergeRange;

    fn m(rows: &[&[&str]]) -> Matrix {
        Matrix::from_strings(rows.iter().map(|r| r.iter().copied()))
    }

    fn column(matrix: &Matrix, col: usize) -> Vec<String> {
        (0..matrix.row_count()).map(|r| matrix.get(r, col).to_text().into_owned()).collect()
    }

    fn quest_log() -> Matrix {
        m(&[
            &["Act", "Quest", "Gold"],
            &["Act 1", "", ""],
            &["", "Zeta", "30"],
            &["", "Alpha", "10"],
            &["", "Mid", "20"],
            &["Act 2", "", ""],
            &["", "Beta", "5"],
            &["", "Aardvark", "7"],
        ])
    }

    #[test]
    fn test_infer_kind() {
        let matrix = quest_log();
        assert_eq!(infer_sort_kind(&matrix, 1), SortKind::Alpha);
        assert_eq!(infer_sort_kind(&matrix, 2), SortKind::Numeric);

        let prices = m(&[&["Price"], &["$1,200"], &["$30"], &["n/a"], &["5"]]);
        assert_eq!(infer_sort_kind(&prices, 0), SortKind::Numeric);

        let status = m(&[&["Status"], &["started"], &["later"]]);
        assert_eq!(infer_sort_kind(&status, 0), SortKind::Completed);

        let ticks = m(&[&["Got it"], &["x"], &["✓"], &["no"], &["later"]]);
        assert_eq!(infer_sort_kind(&ticks, 0), SortKind::Completed);
    }

    #[test]
    fn test_sections_sort_independently() {
        let mut matrix = quest_log();
        let outcome = sort_matrix(
            &mut matrix,
            &LayoutHints::default(),
            &SortOptions::new(1),
            &Heuristics::default(),
        );
        assert_eq!(outcome.kind, SortKind::Alpha);
        assert_eq!(outcome.blocks, 2);
        assert_eq!(
            column(&matrix, 1),
            vec!["Quest", "", "Alpha", "Mid", "Zeta", "", "Aardvark", "Beta"]
        );
        assert_eq!(column(&matrix, 0)[1], "Act 1");
        assert_eq!(column(&matrix, 0)[5], "Act 2");
        // Whole rows move together.
        assert_eq!(column(&matrix, 2)[2], "10");
    }

    #[test]
    fn test_sheet_scope_sorts_everything_below_header() {
        let mut matrix = quest_log();
        let options = SortOptions { scope: SortScope::Sheet, ..SortOptions::new(1) };
        let outcome = sort_matrix(&mut matrix, &LayoutHints::default(), &options, &Heuristics::default());
        assert_eq!(outcome.blocks, 1);
        assert_eq!(
            column(&matrix, 1),
            vec!["Quest", "", "", "Aardvark", "Alpha", "Beta", "Mid", "Zeta"]
        );
        // Stable: the two act rows keep their relative order.
        assert_eq!(column(&matrix, 0)[1..3], ["Act 1".to_string(), "Act 2".to_string()]);
    }

    #[test]
    fn test_merged_rows_stay_put_in_sheet_scope() {
        let mut matrix = m(&[
            &["Name", "Note"],
            &["Zed", "merged note"],
            &["Amy", "amy's note"],
            &["Bob", "bob's note"],
            &["Cat", "cat's note"],
        ]);
        let hints = LayoutHints {
            merges: vec![MergeRange::new(1, 1, 2, 1)],
            ..Default::default()
        };
        let options = SortOptions { scope: SortScope::Sheet, direction: SortDirection::Descending, ..SortOptions::new(0) };
        let outcome = sort_matrix(&mut matrix, &hints, &options, &Heuristics::default());

        assert_eq!(outcome.blocks, 1);
        assert_eq!(column(&matrix, 0), vec!["Name", "Zed", "Amy", "Cat", "Bob"]);
        // The merge anchor still holds the merged text and nothing lands under it.
        assert_eq!(matrix.get(1, 1).to_text(), "merged note");
        assert_eq!(matrix.get(2, 0).to_text(), "Amy");
        assert_eq!(
            column(&matrix, 1)[3..],
            ["cat's note".to_string(), "bob's note".to_string()]
        );
    }

    #[test]
    fn test_merge_splits_section_blocks() {
        let mut matrix = quest_log();
        // A wide note merged across the "Alpha" row splits the first act.
        let hints = LayoutHints {
            merges: vec![MergeRange::new(3, 1, 3, 2)],
            ..Default::default()
        };
        let outcome = sort_matrix(&mut matrix, &hints, &SortOptions::new(1), &Heuristics::default());
        assert_eq!(outcome.blocks, 3);
        assert_eq!(
            column(&matrix, 1),
            vec!["Quest", "", "Zeta", "Alpha", "Mid", "", "Aardvark", "Beta"]
        );
    }

    #[test]
    fn test_numeric_descending_strips_symbols() {
        let mut matrix = m(&[&["Cost"], &["$30"], &["1,200"], &["n/a"], &["5"]]);
        let options = SortOptions {
            scope: SortScope::Sheet,
            direction: SortDirection::Descending,
            ..SortOptions::new(0)
        };
        sort_matrix(&mut matrix, &LayoutHints::default(), &options, &Heuristics::default());
        // Ascending puts "n/a" last; descending reverses the whole block.
        assert_eq!(column(&matrix, 0), vec!["Cost", "n/a", "1,200", "$30", "5"]);
    }

    #[test]
    fn test_completed_sort() {
        let mut matrix = Matrix::new(vec![
            vec!["Done".into()],
            vec![CellValue::Boolean(true)],
            vec!["maybe".into()],
            vec!["no".into()],
            vec![CellValue::Boolean(false)],
        ]);
        let options = SortOptions { scope: SortScope::Sheet, ..SortOptions::new(0) };
        let outcome = sort_matrix(&mut matrix, &LayoutHints::default(), &options, &Heuristics::default());
        assert_eq!(outcome.kind, SortKind::Completed);
        assert_eq!(column(&matrix, 0), vec!["Done", "maybe", "no", "false", "true"]);
    }

    #[test]
    fn test_forced_kind_and_short_rows() {
        let mut matrix = Matrix::new(vec![
            vec!["Name".into(), "Level".into()],
            vec!["a".into(), "10".into()],
            vec!["b".into()],
            vec!["c".into(), "9".into()],
        ]);
        let options = SortOptions {
            scope: SortScope::Sheet,
            kind: Some(SortKind::Alpha),
            ..SortOptions::new(1)
        };
        sort_matrix(&mut matrix, &LayoutHints::default(), &options, &Heuristics::default());
        // Alphabetic: "" < "10" < "9".
        assert_eq!(column(&matrix, 0), vec!["Name", "b", "a", "c"]);
    }

    #[test]
    fn test_header_only_matrix() {
        let mut matrix = m(&[&["A"]]);
        let outcome = sort_matrix(
            &mut matrix,
            &LayoutHints::default(),
            &SortOptions { scope: SortScope::Sheet, ..SortOptions::new(0) },
            &Heuristics::default(),
        );
        assert_eq!(outcome.blocks, 0);
        assert_eq!(column(&matrix, 0), vec!["A"]);
    }

    #[test]
    fn test_direction_cycle() {
        let mut state = None;
        state = SortDirection::cycle(state);
        assert_eq!(state, Some(SortDirection::Ascending));
        state = SortDirection::cycle(state);
        assert_eq!(state, Some(SortDirection::Descending));
        state = SortDirection::cycle(state);
        assert_eq!(state, None);
    }

    #[test]
    fn test_parse_scope_and_kind() {
        assert_eq!("sheet".parse::<SortScope>().unwrap(), SortScope::Sheet);
        assert_eq!("Sections".parse::<SortScope>().unwrap(), SortScope::Sections);
        assert_eq!("numeric".parse::<SortKind>().unwrap(), SortKind::Numeric);
        assert!("random".parse::<SortKind>().is_err());
    }
}
