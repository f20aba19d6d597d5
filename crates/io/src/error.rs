use std::fmt;

#[derive(Debug)]
pub enum IoError {
    /// File extension not handled.
    UnsupportedFormat(String),
    /// File could not be opened or read.
    Read { path: String, message: String },
    /// Malformed delimited text.
    Csv(String),
    /// Spreadsheet container could not be parsed.
    Workbook(String),
    /// Workbook has no sheets to edit.
    NoSheets,
    /// Output could not be produced or saved.
    Write(String),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat(ext) => write!(f, "unsupported file format: '{ext}'"),
            Self::Read { path, message } => write!(f, "cannot read '{path}': {message}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Workbook(msg) => write!(f, "workbook error: {msg}"),
            Self::NoSheets => write!(f, "workbook contains no sheets"),
            Self::Write(msg) => write!(f, "write error: {msg}"),
        }
    }
}

impl std::error::Error for IoError {}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for IoError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Self::Write(e.to_string())
    }
}
