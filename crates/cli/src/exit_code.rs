//! Process exit codes of the b2 CLI
//!
//! Scripts depend on these values; never renumber an existing code.

use std::fmt;

/// Outcome of a command, as seen by the calling shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// Anything without a more specific code, including local I/O failures
    GeneralError = 1,
    /// Bad arguments, malformed paths, unreadable config
    UsageError = 2,
    /// The service could not be reached
    NetworkError = 3,
    /// Key rejected or not allowed to do this
    AuthError = 4,
    /// Unknown account, bucket, or file
    NotFound = 5,
    /// Bucket name taken, or bucket still holds files
    Conflict = 6,
    /// Downloaded bytes differ from what the service declared
    IntegrityError = 8,
}

impl ExitCode {
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Exit code for a library error
    pub const fn from_error(error: &b2_core::Error) -> Self {
        match error.exit_code() {
            2 => Self::UsageError,
            3 => Self::NetworkError,
            4 => Self::AuthError,
            5 => Self::NotFound,
            6 => Self::Conflict,
            8 => Self::IntegrityError,
            _ => Self::GeneralError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", self.as_i32())
    }
}
