//! SQL interval value.
//!
//! [`Interval`] holds a normalized `(years, months, days, seconds, nanos)` value, converted from
//! and to the `[-]P[nY][nM][nD][T[nH][nM][n[.f]S]]` text form.
//!
//! ```
//! use sqlext::interval::{Interval, Precision};
//!
//! # fn app() -> sqlext::Result<()> {
//! let interval = Interval::parse("P1Y2M3DT4H5M6.5S", Precision::Nano)?;
//! assert_eq!(interval.years(), 1);
//! assert_eq!(interval.seconds(), 4 * 3600 + 5 * 60 + 6);
//! assert_eq!(interval.nanos(), 500_000_000);
//! assert_eq!(interval.to_string(), "P1Y2M3DT4H5M6.5S");
//! # Ok(())
//! # }
//! # app().unwrap();
//! ```
use crate::{
    Result,
    error::RangeError,
};

mod parse;
mod format;

#[cfg(feature = "time")]
mod time;
#[cfg(feature = "serde")]
mod serde;

pub use parse::parse_interval;
pub use format::format_interval;

pub(crate) const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub(crate) const MAX_NANOS: i32 = 999_999_999;

/// Fractional second precision of interval text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Precision {
    /// Up to 9 fractional digits.
    #[default]
    Nano,
    /// Up to 6 fractional digits.
    Micro,
}

impl Precision {
    /// Maximum fractional digit count.
    pub const fn digits(self) -> usize {
        match self {
            Precision::Nano => 9,
            Precision::Micro => 6,
        }
    }

    /// Returns [`Precision::Micro`] if `micro` is `true`.
    pub const fn from_micro(micro: bool) -> Precision {
        match micro {
            true => Precision::Micro,
            false => Precision::Nano,
        }
    }
}

/// Normalized SQL interval.
///
/// Hours and minutes are folded into [`seconds`][Interval::seconds]. The fractional part is kept
/// as a magnitude following the sign of `seconds`, except when `seconds` is zero, where `nanos`
/// carries the sign itself. Thus `nanos < 0` implies `seconds == 0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Interval {
    years: i32,
    months: i32,
    days: i32,
    seconds: i64,
    nanos: i32,
}

impl Interval {
    /// Interval with all components zero.
    pub const ZERO: Interval = Interval { years: 0, months: 0, days: 0, seconds: 0, nanos: 0 };

    /// Create new interval.
    ///
    /// Returns [`RangeError`] if `|nanos| > 999_999_999`, or `nanos` is negative while `seconds`
    /// is nonzero.
    pub fn new(years: i32, months: i32, days: i32, seconds: i64, nanos: i32) -> Result<Interval> {
        if nanos.unsigned_abs() > MAX_NANOS as u32 {
            return Err(RangeError::Nanos(nanos.into()).into());
        }
        if nanos < 0 && seconds != 0 {
            return Err(RangeError::NegativeNanos.into());
        }
        Ok(Self { years, months, days, seconds, nanos })
    }

    /// Create interval with date components only.
    pub const fn of_period(years: i32, months: i32, days: i32) -> Interval {
        Self { years, months, days, seconds: 0, nanos: 0 }
    }

    /// Create interval with time components only.
    pub fn of_duration(seconds: i64, nanos: i32) -> Result<Interval> {
        Self::new(0, 0, 0, seconds, nanos)
    }

    /// Parse interval text, see [`parse_interval`].
    pub fn parse(text: &str, precision: Precision) -> Result<Interval> {
        parse_interval(text, precision)
    }

    /// Format interval text, see [`format_interval`].
    pub fn format(&self, precision: Precision) -> String {
        format_interval(self, precision)
    }

    pub const fn years(&self) -> i32 {
        self.years
    }

    pub const fn months(&self) -> i32 {
        self.months
    }

    pub const fn days(&self) -> i32 {
        self.days
    }

    /// Whole seconds, including hours and minutes.
    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    pub const fn nanos(&self) -> i32 {
        self.nanos
    }

    /// Returns `true` if all components are zero.
    pub const fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0 && self.seconds == 0 && self.nanos == 0
    }

    /// Returns `true` if there is no date component.
    pub const fn is_duration(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }

    /// Returns `true` if there is no time component.
    pub const fn is_period(&self) -> bool {
        self.seconds == 0 && self.nanos == 0
    }

    /// Returns `true` if the time component is negative.
    pub const fn is_negative_time(&self) -> bool {
        self.seconds < 0 || self.nanos < 0
    }

    /// Total signed nanoseconds of the time component.
    pub fn total_nanos(&self) -> Option<i128> {
        let seconds = self.seconds as i128;
        let nanos = self.nanos.unsigned_abs() as i128;
        let total = seconds.checked_mul(NANOS_PER_SECOND as i128)?;
        Some(match (self.seconds < 0, self.nanos < 0) {
            (true, _) => total - nanos,
            (false, true) => -nanos,
            (false, false) => total + nanos,
        })
    }

    /// Split signed total nanoseconds into `(seconds, nanos)` upholding the sign invariant.
    pub(crate) fn split_nanos(total: i128) -> Option<(i64, i32)> {
        let seconds = i64::try_from(total / NANOS_PER_SECOND as i128).ok()?;
        let rem = (total % NANOS_PER_SECOND as i128) as i32;
        Some(match seconds {
            0 => (0, rem),
            _ => (seconds, rem.abs()),
        })
    }
}

impl std::str::FromStr for Interval {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_interval(s, Precision::Nano)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_interval(self, Precision::Nano))
    }
}
