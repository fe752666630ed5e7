//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success, difference within permissible error              |
//! | 1    | General error (unspecified)                               |
//! | 2    | CLI usage error (bad args, missing area)                  |
//! | 3    | Difference exceeds permissible error (result still shown) |
//! | 4    | Invalid input (non-positive area, bad job/CSV file)       |
//! | 5    | I/O error (cannot read input, cannot write output)        |

use parcelgrid_io::IoError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// |registered - calculated| is larger than the permissible error.
/// Parcels were left unscaled; output was still written.
pub const EXIT_TOLERANCE_EXCEEDED: u8 = 3;

/// Input rejected: zero/negative/non-finite area, malformed job or CSV.
pub const EXIT_INVALID_INPUT: u8 = 4;

/// Filesystem or stream failure.
pub const EXIT_IO: u8 = 5;

/// Map an import/export error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Read { .. } | IoError::Write(_) => EXIT_IO,
        IoError::Csv(_) => EXIT_INVALID_INPUT,
        IoError::Json(_) => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_TOLERANCE_EXCEEDED,
            EXIT_INVALID_INPUT,
            EXIT_IO,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn read_failures_are_io() {
        let err = IoError::Read {
            path: "x.csv".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(io_exit_code(&err), EXIT_IO);
    }
}
