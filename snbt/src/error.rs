// SPDX-License-Identifier: Apache-2.0

use crate::input_buffer;

/// What went wrong, independent of the operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An index or range fell outside the input buffer.
    OutOfRange,
    /// The cursor ran past the last significant token.
    StopIteration,
    /// The scanner reached a state its invariants rule out.
    Unexpected,
}

/// An error from a scanner operation: the operation name plus its cause.
///
/// Renders as `snbt <op>: <cause>`. Match on [`Error::kind`] to tell causes
/// apart; [`core::error::Error::source`] also yields the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    op: &'static str,
    kind: ErrorKind,
}

impl Error {
    pub fn new<T>(op: &'static str, kind: ErrorKind) -> Result<T, Self> {
        Err(Self { op, kind })
    }

    /// Builds the error value without wrapping it in `Err`, for `map_err`.
    pub const fn with_op(op: &'static str, kind: ErrorKind) -> Self {
        Self { op, kind }
    }

    pub const fn op(&self) -> &'static str {
        self.op
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<input_buffer::Error> for ErrorKind {
    fn from(err: input_buffer::Error) -> Self {
        match err {
            input_buffer::Error::IndexOutOfBounds | input_buffer::Error::InvalidSliceBounds => {
                ErrorKind::OutOfRange
            }
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ErrorKind::OutOfRange => f.write_str("out of range"),
            ErrorKind::StopIteration => f.write_str("stop iteration"),
            ErrorKind::Unexpected => f.write_str("unexpected"),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "snbt {}: {}", self.op, self.kind)
    }
}

impl core::error::Error for ErrorKind {}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.kind)
    }
}
