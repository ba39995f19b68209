use std::{borrow::Cow, fmt};

/// Input does not match the expected text grammar or binary layout.
pub struct FormatError {
    reason: Cow<'static, str>,
    input: Option<String>,
    offset: Option<usize>,
}

impl FormatError {
    pub(crate) fn new(reason: impl Into<Cow<'static, str>>) -> FormatError {
        Self { reason: reason.into(), input: None, offset: None }
    }

    /// Attach the offending byte offset.
    pub(crate) fn at(mut self, offset: usize) -> FormatError {
        self.offset = Some(offset);
        self
    }

    /// Attach the offending input text.
    pub(crate) fn input(mut self, input: &str) -> FormatError {
        self.input = Some(input.to_owned());
        self
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Byte offset into the input where the error was detected, if known.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// The offending input, if captured.
    pub fn source_input(&self) -> Option<&str> {
        self.input.as_deref()
    }
}

impl std::error::Error for FormatError { }

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid format, {}", self.reason)?;
        if let Some(offset) = self.offset {
            write!(f, " at offset {offset}")?;
        }
        if let Some(input) = &self.input {
            write!(f, " in {input:?}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// A numeric token failed to parse, or arithmetic overflowed.
pub enum NumericError {
    /// Token is not a valid number.
    Invalid(String),
    /// Intermediate computation overflowed.
    Overflow,
}

impl std::error::Error for NumericError { }

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(token) => write!(f, "invalid number: {token:?}"),
            Self::Overflow => f.write_str("numeric overflow"),
        }
    }
}

impl fmt::Debug for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// A value is outside its representable range.
pub enum RangeError {
    /// Nanosecond magnitude exceeds `999_999_999`.
    Nanos(i64),
    /// Negative nanos with nonzero seconds.
    NegativeNanos,
    /// Too many fractional second digits for the requested precision.
    FractionDigits { digits: usize, max: usize },
    /// Nanos is not representable at microsecond precision.
    Precision(i32),
}

impl std::error::Error for RangeError { }

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("value out of range, ")?;
        match self {
            Self::Nanos(n) => write!(f, "nanos magnitude exceeds 999999999: {n}"),
            Self::NegativeNanos => f.write_str("negative nanos requires zero seconds"),
            Self::FractionDigits { digits, max } => {
                write!(f, "{digits} fractional digits, at most {max} allowed")
            },
            Self::Precision(n) => write!(f, "nanos {n} is not a whole microsecond"),
        }
    }
}

impl fmt::Debug for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
