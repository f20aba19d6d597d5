// Cell control inference: which editor a cell gets in the grid.

use serde::{Deserialize, Serialize};

use crate::cell::{parse_number, CellValue};
use crate::heuristics::Heuristics;
use crate::profile::ColumnProfile;

/// Horizontal text alignment of an editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

/// Editor chosen for a body cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellControl {
    Checkbox { checked: bool },
    /// `options` starts with the blank choice; `selected` is always one of
    /// `options`.
    Dropdown { options: Vec<String>, selected: String },
    MultiLine { numeric: bool },
    SingleLine { numeric: bool },
}

impl CellControl {
    pub fn alignment(&self) -> Alignment {
        match self {
            CellControl::MultiLine { numeric: true } | CellControl::SingleLine { numeric: true } => {
                Alignment::Right
            }
            _ => Alignment::Left,
        }
    }

    /// Short name for logs and text output.
    pub fn name(&self) -> &'static str {
        match self {
            CellControl::Checkbox { .. } => "checkbox",
            CellControl::Dropdown { .. } => "dropdown",
            CellControl::MultiLine { .. } => "multiline",
            CellControl::SingleLine { .. } => "input",
        }
    }
}

/// Pick the control for one cell.
///
/// With `smart` off only the text editors are used; the choice between
/// single- and multi-line still follows the value.
pub fn infer_control(
    value: &CellValue,
    profile: &ColumnProfile,
    smart: bool,
    heuristics: &Heuristics,
) -> CellControl {
    if smart {
        let boolean_column = profile.is_boolean_column();
        if value.is_boolean_like() || boolean_column {
            return CellControl::Checkbox { checked: value.is_truthy() };
        }

        let uniques = profile.unique_values.len();
        if (1..=heuristics.dropdown_max_options).contains(&uniques)
            && profile.has_repeats()
            && profile.boolean_like_count == 0
        {
            let current = value.to_text();
            let selected = if profile.unique_values.iter().any(|u| *u == current) {
                current.into_owned()
            } else {
                String::new()
            };
            let mut options = Vec::with_capacity(uniques + 1);
            options.push(String::new());
            options.extend(profile.unique_values.iter().cloned());
            return CellControl::Dropdown { options, selected };
        }
    }

    let text = value.to_text();
    let numeric = value.is_numeric();
    if text.contains('\n') || text.chars().count() > heuristics.multiline_threshold {
        CellControl::MultiLine { numeric }
    } else {
        CellControl::SingleLine { numeric }
    }
}

/// A user edit as delivered by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellEdit {
    Toggle(bool),
    Select(String),
    Text(String),
}

/// Convert an edit into the value stored in the matrix.
///
/// Checkboxes store native booleans. Text typed into a numeric single-line
/// input is stored as a number when it parses; everything else is text,
/// with `""` stored as `Empty`.
pub fn commit_value(control: &CellControl, edit: CellEdit) -> CellValue {
    match edit {
        CellEdit::Toggle(checked) => CellValue::Boolean(checked),
        CellEdit::Select(choice) => CellValue::from(choice),
        CellEdit::Text(input) => match control {
            CellControl::SingleLine { numeric: true } => match parse_number(&input) {
                Some(n) => CellValue::Number(n),
                None => CellValue::from(input),
            },
            _ => CellValue::from(input),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use crate::profile::profile_column;

    fn profile(values: &[&str]) -> ColumnProfile {
        let rows = std::iter::once(vec!["header"]).chain(values.iter().map(|v| vec![*v]));
        profile_column(&Matrix::from_strings(rows), 0, 12)
    }

    fn infer(value: &str, p: &ColumnProfile) -> CellControl {
        infer_control(&CellValue::from(value), p, true, &Heuristics::default())
    }

    #[test]
    fn test_distinct_numbers_are_inputs() {
        let p = profile(&["10", "7"]);
        let c = infer("10", &p);
        assert_eq!(c, CellControl::SingleLine { numeric: true });
        assert_eq!(c.alignment(), Alignment::Right);
    }

    #[test]
    fn test_boolean_column_checkboxes() {
        let p = profile(&["TRUE", "FALSE", "TRUE"]);
        assert_eq!(infer("TRUE", &p), CellControl::Checkbox { checked: true });
        assert_eq!(infer("FALSE", &p), CellControl::Checkbox { checked: false });
        // Blank cells in a boolean column are unchecked boxes.
        assert_eq!(infer("", &p), CellControl::Checkbox { checked: false });
    }

    #[test]
    fn test_boolean_cell_in_text_column() {
        let p = profile(&["alpha", "beta", "gamma", "yes"]);
        assert_eq!(infer("yes", &p), CellControl::Checkbox { checked: true });
        assert_eq!(infer("alpha", &p), CellControl::SingleLine { numeric: false });
    }

    #[test]
    fn test_dropdown_for_repeated_values() {
        let p = profile(&["Fire", "Ice", "Fire", "Wind"]);
        let c = infer("Ice", &p);
        assert_eq!(
            c,
            CellControl::Dropdown {
                options: vec!["".into(), "Fire".into(), "Ice".into(), "Wind".into()],
                selected: "Ice".into(),
            }
        );
        match infer("", &p) {
            CellControl::Dropdown { selected, .. } => assert_eq!(selected, ""),
            other => panic!("expected dropdown, got {other:?}"),
        }
    }

    #[test]
    fn test_no_dropdown_when_booleans_present() {
        // Three distinct values, one boolean-like: not a boolean column, and
        // the boolean count blocks the dropdown.
        let p = profile(&["Fire", "Fire", "no", "Ice"]);
        assert_eq!(infer("Fire", &p), CellControl::SingleLine { numeric: false });
    }

    #[test]
    fn test_no_dropdown_over_option_limit() {
        let mut values: Vec<String> = (0..11).map(|i| format!("opt{i}")).collect();
        values.push("opt0".into());
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let p = profile(&refs);
        assert_eq!(p.unique_values.len(), 11);
        assert_eq!(infer("opt3", &p), CellControl::SingleLine { numeric: false });
    }

    #[test]
    fn test_multiline() {
        let p = profile(&["a", "b"]);
        assert_eq!(infer("line one\nline two", &p), CellControl::MultiLine { numeric: false });
        let long = "x".repeat(31);
        assert_eq!(infer(&long, &p), CellControl::MultiLine { numeric: false });
        let exact = "x".repeat(30);
        assert_eq!(infer(&exact, &p), CellControl::SingleLine { numeric: false });
    }

    #[test]
    fn test_plain_mode_skips_smart_controls() {
        let p = profile(&["TRUE", "FALSE"]);
        let h = Heuristics::default();
        assert_eq!(
            infer_control(&CellValue::from("TRUE"), &p, false, &h),
            CellControl::SingleLine { numeric: false }
        );
        assert_eq!(
            infer_control(&CellValue::Number(5.0), &p, false, &h),
            CellControl::SingleLine { numeric: true }
        );
    }

    #[test]
    fn test_commit_conversions() {
        let numeric = CellControl::SingleLine { numeric: true };
        let text = CellControl::SingleLine { numeric: false };
        assert_eq!(commit_value(&numeric, CellEdit::Text("42".into())), CellValue::Number(42.0));
        assert_eq!(commit_value(&numeric, CellEdit::Text("".into())), CellValue::Empty);
        assert_eq!(commit_value(&numeric, CellEdit::Text("n/a".into())), CellValue::Text("n/a".into()));
        assert_eq!(commit_value(&text, CellEdit::Text("42".into())), CellValue::Text("42".into()));
        assert_eq!(
            commit_value(&CellControl::Checkbox { checked: false }, CellEdit::Toggle(true)),
            CellValue::Boolean(true)
        );
        assert_eq!(
            commit_value(&CellControl::MultiLine { numeric: true }, CellEdit::Text("12".into())),
            CellValue::Text("12".into())
        );
    }
}
