//! `sqlext` error types.
use std::{backtrace::Backtrace, borrow::Cow, fmt, io};

use crate::config::ParseError;

mod codec;

pub use codec::{FormatError, NumericError, RangeError};

/// A specialized [`Result`] type for `sqlext` operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All possible error from `sqlext` library.
pub struct Error {
    context: Cow<'static, str>,
    backtrace: Backtrace,
    kind: ErrorKind,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Set the context shown before the error message, replacing any previous context.
    pub fn context(mut self, context: impl Into<Cow<'static, str>>) -> Self {
        self.context = context.into();
        self
    }

    /// Returns `true` if input did not match the expected grammar or layout.
    pub fn is_format(&self) -> bool {
        matches!(self.kind, ErrorKind::Format(_))
    }

    /// Returns `true` if a number failed to parse or arithmetic overflowed.
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, ErrorKind::Numeric(_))
    }

    /// Returns `true` if a value is outside its representable range.
    pub fn is_range(&self) -> bool {
        matches!(self.kind, ErrorKind::Range(_))
    }
}

/// All possible error kind from `sqlext` library.
pub enum ErrorKind {
    Format(FormatError),
    Numeric(NumericError),
    Range(RangeError),
    Config(ParseError),
    Io(io::Error),
}

macro_rules! from {
    (<$ty:ty>$pat:pat => $body:expr) => {
        impl From<$ty> for Error {
            fn from($pat: $ty) -> Self {
                let backtrace = std::backtrace::Backtrace::capture();
                Self { context: Cow::Borrowed(""), backtrace, kind: $body }
            }
        }
    };
}

from!(<ErrorKind>e => e);
from!(<FormatError>e => ErrorKind::Format(e));
from!(<NumericError>e => ErrorKind::Numeric(e));
from!(<RangeError>e => ErrorKind::Range(e));
from!(<ParseError>e => ErrorKind::Config(e));
from!(<io::Error>e => ErrorKind::Io(e));

impl std::error::Error for Error { }

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.context.is_empty() {
            write!(f, "{}: ", self.context)?;
        }

        fmt::Display::fmt(&self.kind, f)?;

        if let std::backtrace::BacktraceStatus::Captured = self.backtrace.status() {
            let mut backtrace = self.backtrace.to_string();
            write!(f, "\n\n")?;
            writeln!(f, "Stack backtrace:")?;
            backtrace.truncate(backtrace.trim_end().len());
            write!(f, "{}", backtrace)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl std::error::Error for ErrorKind { }

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(e) => fmt::Display::fmt(e, f),
            Self::Numeric(e) => fmt::Display::fmt(e, f),
            Self::Range(e) => fmt::Display::fmt(e, f),
            Self::Config(e) => fmt::Display::fmt(e, f),
            Self::Io(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
