// File I/O: CSV and spreadsheet files to and from the grid model

pub mod csv;
pub mod error;
pub mod xlsx;
pub mod xlsx_layout;

use std::path::Path;

use gamesheets_engine::layout::LayoutHints;
use gamesheets_engine::matrix::Matrix;

pub use error::IoError;

/// Sheet name used for formats without named sheets.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// One sheet as read from a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedSheet {
    pub name: String,
    pub matrix: Matrix,
    pub hints: LayoutHints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Delimiter sniffed from content.
    Csv,
    Tsv,
    /// Zip-based workbook with readable layout (xlsx, xlsm).
    Xlsx,
    /// Other workbooks calamine reads (xls, xlsb, ods); values only.
    Spreadsheet,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(FileFormat::Csv),
            "tsv" | "tab" => Ok(FileFormat::Tsv),
            "xlsx" | "xlsm" => Ok(FileFormat::Xlsx),
            "xls" | "xlsb" | "ods" => Ok(FileFormat::Spreadsheet),
            _ => Err(IoError::UnsupportedFormat(ext)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedWorkbook {
    pub format: FileFormat,
    pub sheets: Vec<DecodedSheet>,
}

impl DecodedWorkbook {
    pub fn sheet(&self, name: &str) -> Option<&DecodedSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Read a file, dispatching on its extension.
pub fn decode_path(path: &Path) -> Result<DecodedWorkbook, IoError> {
    let format = FileFormat::from_path(path)?;
    let sheets = match format {
        FileFormat::Csv => vec![single_sheet(csv::import(path)?)],
        FileFormat::Tsv => vec![single_sheet(csv::import_with_delimiter(path, b'\t')?)],
        FileFormat::Xlsx => xlsx::import(path, true)?,
        FileFormat::Spreadsheet => xlsx::import(path, false)?,
    };
    if sheets.is_empty() {
        return Err(IoError::NoSheets);
    }
    Ok(DecodedWorkbook { format, sheets })
}

/// Decode CSV text with a sniffed delimiter.
pub fn decode_csv_str(content: &str) -> Result<DecodedSheet, IoError> {
    let matrix = csv::decode_str(content, csv::sniff_delimiter(content))?;
    Ok(single_sheet(matrix))
}

/// Comma-separated text for one sheet.
pub fn encode_csv(sheet: &DecodedSheet) -> Result<String, IoError> {
    csv::encode(&sheet.matrix, &sheet.hints, b',')
}

pub fn export_xlsx(sheets: &[DecodedSheet], path: &Path) -> Result<xlsx::ExportResult, IoError> {
    xlsx::export(sheets, path)
}

/// Write sheets to a file, dispatching on its extension. Delimited formats
/// hold a single sheet; only the first is written.
pub fn encode_path(path: &Path, sheets: &[DecodedSheet]) -> Result<(), IoError> {
    let first = sheets.first().ok_or(IoError::NoSheets)?;
    match FileFormat::from_path(path)? {
        FileFormat::Csv | FileFormat::Tsv if sheets.len() > 1 => {
            log::warn!(
                "{} holds one sheet; writing '{}' and dropping {} more",
                path.display(),
                first.name,
                sheets.len() - 1
            );
            encode_delimited(path, first)
        }
        FileFormat::Csv | FileFormat::Tsv => encode_delimited(path, first),
        FileFormat::Xlsx => xlsx::export(sheets, path).map(|_| ()),
        FileFormat::Spreadsheet => Err(IoError::UnsupportedFormat(
            path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_string(),
        )),
    }
}

fn encode_delimited(path: &Path, sheet: &DecodedSheet) -> Result<(), IoError> {
    let delimiter = match FileFormat::from_path(path)? {
        FileFormat::Tsv => b'\t',
        _ => b',',
    };
    csv::export(&sheet.matrix, &sheet.hints, path, delimiter)
}

fn single_sheet(matrix: Matrix) -> DecodedSheet {
    DecodedSheet { name: DEFAULT_SHEET_NAME.to_string(), matrix, hints: LayoutHints::default() }
}
