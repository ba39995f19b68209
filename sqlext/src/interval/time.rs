//! Conversion with [`time::Duration`][::time::Duration].
use ::time::Duration;

use super::{Interval, NANOS_PER_SECOND};
use crate::{
    Error,
    error::{FormatError, NumericError},
};

const SECONDS_PER_DAY: i128 = 86_400;

impl From<Duration> for Interval {
    fn from(duration: Duration) -> Self {
        let seconds = duration.whole_seconds();
        let nanos = duration.subsec_nanoseconds();
        Interval {
            years: 0,
            months: 0,
            days: 0,
            seconds,
            nanos: match seconds {
                0 => nanos,
                _ => nanos.abs(),
            },
        }
    }
}

/// Days are counted as 86400 seconds.
///
/// Returns [`FormatError`] if the interval have years or months component, which have no fixed
/// duration.
impl TryFrom<Interval> for Duration {
    type Error = Error;

    fn try_from(interval: Interval) -> Result<Self, Self::Error> {
        if interval.years != 0 || interval.months != 0 {
            return Err(FormatError::new("interval with years or months has no fixed duration").into());
        }

        let total = (interval.days as i128 * SECONDS_PER_DAY)
            .checked_mul(NANOS_PER_SECOND as i128)
            .zip(interval.total_nanos())
            .and_then(|(days, time)| days.checked_add(time))
            .ok_or(NumericError::Overflow)?;

        let seconds = i64::try_from(total / NANOS_PER_SECOND as i128)
            .map_err(|_| NumericError::Overflow)?;
        let nanos = (total % NANOS_PER_SECOND as i128) as i32;

        Ok(Duration::new(seconds, nanos))
    }
}
