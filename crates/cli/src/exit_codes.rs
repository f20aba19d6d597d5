//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts rely on them.
//!
//! | Code | Description                                        |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (bad settings file, empty workbook)  |
//! | 2    | Usage error (bad args, unknown sheet or format)    |
//! | 3    | I/O error (unreadable input, failed write)         |

use gamesheets_io::IoError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown sheet, unsupported extension.
/// clap exits with the same code for malformed command lines.
pub const EXIT_USAGE: u8 = 2;

/// Reading or writing a file failed.
pub const EXIT_IO: u8 = 3;

/// Map an io-crate error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::UnsupportedFormat(_) => EXIT_USAGE,
        IoError::NoSheets => EXIT_ERROR,
        IoError::Read { .. } | IoError::Csv(_) | IoError::Workbook(_) | IoError::Write(_) => EXIT_IO,
    }
}
