// CSV/TSV decode and encode

use std::io::Read;
use std::path::Path;

use gamesheets_engine::layout::{LayoutHints, MergeCoverage};
use gamesheets_engine::matrix::Matrix;

use crate::error::IoError;

pub fn import(path: &Path) -> Result<Matrix, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    decode_str(&content, delimiter)
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Matrix, IoError> {
    let content = read_file_as_utf8(path)?;
    decode_str(&content, delimiter)
}

/// Delimiters tried by [`sniff_delimiter`]; earlier entries win ties.
const DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

/// Lines read when guessing the delimiter.
const SNIFF_LINES: usize = 10;

/// Guess the field delimiter of exported sheet text.
///
/// The sample is parsed once per candidate. A candidate scores the number of
/// records as wide as the first one, times that width; a first record with a
/// single field scores nothing. Comma is the fallback.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: String = content.lines().take(SNIFF_LINES).collect::<Vec<_>>().join("\n");

    let mut best = (b',', 0usize);
    for delimiter in DELIMITERS {
        let score = consistency_score(&record_widths(&sample, delimiter));
        if score > best.1 {
            best = (delimiter, score);
        }
    }
    best.0
}

fn record_widths(sample: &str, delimiter: u8) -> Vec<usize> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(sample.as_bytes())
        .records()
        .map_while(Result::ok)
        .map(|record| record.len())
        .collect()
}

fn consistency_score(widths: &[usize]) -> usize {
    match widths.first() {
        Some(&width) if width > 1 => width * widths.iter().filter(|&&w| w == width).count(),
        _ => 0,
    }
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |e: std::io::Error| IoError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    match String::from_utf8(bytes) {
        Ok(mut s) => {
            if s.starts_with('\u{feff}') {
                s.drain(..'\u{feff}'.len_utf8());
            }
            Ok(s)
        }
        Err(e) => {
            let bytes = e.into_bytes();
            // Excel-exported CSVs are commonly Windows-1252
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            log::debug!("{} is not UTF-8, decoded as Windows-1252", path.display());
            Ok(decoded.into_owned())
        }
    }
}

/// Parse delimited text into a matrix. Every field is kept as text; blank
/// lines are skipped.
pub fn decode_str(content: &str, delimiter: u8) -> Result<Matrix, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(|field| field.to_string()).collect::<Vec<_>>());
    }
    Ok(Matrix::from_strings(rows))
}

/// Serialize a matrix as delimited text.
///
/// Cells hidden under a merge are written empty, trailing empty fields are
/// dropped and rows without data are skipped.
pub fn encode(matrix: &Matrix, hints: &LayoutHints, delimiter: u8) -> Result<String, IoError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(Vec::new());

    for (row, cells) in matrix.rows().iter().enumerate() {
        let mut record: Vec<String> = Vec::with_capacity(cells.len());
        let mut last_non_empty = 0;

        for (col, value) in cells.iter().enumerate() {
            let text = if hints.coverage(row, col) == MergeCoverage::Covered {
                String::new()
            } else {
                value.to_text().into_owned()
            };
            if !text.is_empty() {
                last_non_empty = col + 1;
            }
            record.push(text);
        }

        if last_non_empty > 0 {
            record.truncate(last_non_empty);
            writer.write_record(&record)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| IoError::Write(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| IoError::Write(e.to_string()))
}

pub fn export(matrix: &Matrix, hints: &LayoutHints, path: &Path, delimiter: u8) -> Result<(), IoError> {
    let content = encode(matrix, hints, delimiter)?;
    std::fs::write(path, content).map_err(|e| IoError::Write(format!("{}: {}", path.display(), e)))
}
