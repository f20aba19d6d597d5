//! A1-style cell addresses.
//!
//! Snapshots and the CLI name cells the way users see them ("B7"), while the
//! engine works with 0-based `(row, col)` pairs.

use std::str::FromStr;

/// 0-based position of a cell in a matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddr {
    pub row: usize,
    pub col: usize,
}

impl CellAddr {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for CellAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", col_to_letters(self.col), self.row + 1)
    }
}

impl FromStr for CellAddr {
    type Err = String;

    /// Parse "B5" into row 4, col 1. Lower-case letters are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .ok_or_else(|| format!("missing row number in '{s}'"))?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() {
            return Err(format!("missing column letters in '{s}'"));
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid row number in '{s}'"));
        }

        let mut col: usize = 0;
        for ch in letters.chars() {
            col = col
                .checked_mul(26)
                .and_then(|c| c.checked_add(ch.to_ascii_uppercase() as usize - 'A' as usize + 1))
                .ok_or_else(|| format!("column out of range in '{s}'"))?;
        }
        let row: usize = digits
            .parse()
            .map_err(|_| format!("row out of range in '{s}'"))?;
        if row == 0 {
            return Err(format!("row numbers start at 1 in '{s}'"));
        }

        Ok(CellAddr::new(row - 1, col - 1))
    }
}

/// Convert 0-based column index to Excel-style letter(s).
pub fn col_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}
