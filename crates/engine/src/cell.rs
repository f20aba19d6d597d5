use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Tokens (trimmed, lower-cased) that read as a checkbox value.
const BOOLEAN_TOKENS: &[&str] = &["true", "false", "yes", "no", "y", "n", "1", "0", "☑", "☐"];

/// Subset of `BOOLEAN_TOKENS` that reads as checked.
const TRUTHY_TOKENS: &[&str] = &["true", "yes", "y", "1", "☑"];

/// A single cell of a sheet.
///
/// Serializes untagged so a matrix round-trips through JSON as plain
/// `null` / bool / number / string values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Empty for every heuristic: no value, or a zero-length string.
    /// Whitespace-only text is deliberately not empty.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// String form used for display, profiling and comparisons.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Empty => Cow::Borrowed(""),
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
            CellValue::Boolean(true) => Cow::Borrowed("true"),
            CellValue::Boolean(false) => Cow::Borrowed("false"),
            CellValue::Number(n) => Cow::Owned(format_number(*n)),
        }
    }

    /// Native booleans, or a string form in the checkbox grammar.
    pub fn is_boolean_like(&self) -> bool {
        match self {
            CellValue::Boolean(_) => true,
            CellValue::Empty => false,
            other => is_boolean_token(&other.to_text()),
        }
    }

    /// Checked state of a boolean-like value. Anything outside the truthy
    /// tokens (including non-boolean text) reads as unchecked.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Boolean(b) => *b,
            CellValue::Empty => false,
            other => is_truthy_token(&other.to_text()),
        }
    }

    /// Numeric when the trimmed string form is non-empty and parses fully
    /// as a finite number.
    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Number(_) | CellValue::Empty => None,
            other => parse_number(&other.to_text()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Integers print without decimals; everything else uses the shortest
/// representation that round-trips.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub fn is_boolean_token(s: &str) -> bool {
    let s = s.trim().to_lowercase();
    BOOLEAN_TOKENS.contains(&s.as_str())
}

pub fn is_truthy_token(s: &str) -> bool {
    let s = s.trim().to_lowercase();
    TRUTHY_TOKENS.contains(&s.as_str())
}

/// Full-string number parse. Rejects NaN and infinities, which `f64::from_str`
/// would otherwise accept as words.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_grammar() {
        for token in ["TRUE", " false ", "Yes", "no", "Y", "n", "1", "0", "☑", "☐"] {
            assert!(CellValue::from(token).is_boolean_like(), "{token:?}");
        }
        for token in ["maybe", "2", "on", "x", ""] {
            assert!(!CellValue::from(token).is_boolean_like(), "{token:?}");
        }
        assert!(CellValue::Boolean(false).is_boolean_like());
        assert!(CellValue::Number(1.0).is_boolean_like());
        assert!(!CellValue::Number(1.5).is_boolean_like());
        assert!(!CellValue::Empty.is_boolean_like());
    }

    #[test]
    fn test_truthy() {
        assert!(CellValue::from("YES").is_truthy());
        assert!(CellValue::from("☑").is_truthy());
        assert!(CellValue::Number(1.0).is_truthy());
        assert!(CellValue::Boolean(true).is_truthy());
        assert!(!CellValue::from("☐").is_truthy());
        assert!(!CellValue::from("maybe").is_truthy());
        assert!(!CellValue::Empty.is_truthy());
    }

    #[test]
    fn test_numeric_detection() {
        assert!(CellValue::from("10").is_numeric());
        assert!(CellValue::from(" -3.5 ").is_numeric());
        assert!(CellValue::from("1e3").is_numeric());
        assert!(!CellValue::from("10 apples").is_numeric());
        assert!(!CellValue::from("NaN").is_numeric());
        assert!(!CellValue::from("inf").is_numeric());
        assert!(!CellValue::from("   ").is_numeric());
        assert!(!CellValue::Boolean(true).is_numeric());
        assert_eq!(CellValue::from("7").as_number(), Some(7.0));
    }

    #[test]
    fn test_to_text() {
        assert_eq!(CellValue::Number(10.0).to_text(), "10");
        assert_eq!(CellValue::Number(2.25).to_text(), "2.25");
        assert_eq!(CellValue::Boolean(true).to_text(), "true");
        assert_eq!(CellValue::Empty.to_text(), "");
    }

    #[test]
    fn test_emptiness() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::from("").is_empty());
        assert!(!CellValue::Text("  ".into()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_json_untagged() {
        let row: Vec<CellValue> = serde_json::from_str(r#"[null, true, 3, "x"]"#).unwrap();
        assert_eq!(
            row,
            vec![
                CellValue::Empty,
                CellValue::Boolean(true),
                CellValue::Number(3.0),
                CellValue::Text("x".into()),
            ]
        );
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"[null,true,3.0,"x"]"#);
    }
}
