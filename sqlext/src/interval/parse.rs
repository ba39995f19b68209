use super::{Interval, NANOS_PER_SECOND, Precision};
use crate::{
    Result,
    common::{span, verbose},
    error::{FormatError, NumericError, RangeError},
};

/// Parse interval text.
///
/// Grammar is `[-]P[nY][nM][nD][T[nH][nM][n[.f]S]]`, where each `n` may carry its own `-` sign.
/// A leading `-` negates every component.
///
/// Hours and minutes are folded into seconds. The fractional seconds is limited to
/// [`Precision::digits`] digits.
///
/// An `M` after `T` is minutes, while a `Y` or `D` after `T` is an error.
pub fn parse_interval(text: &str, precision: Precision) -> Result<Interval> {
    span!("parse_interval", text);

    let interval = Parser { text, bytes: text.as_bytes(), pos: 0, negative: false, precision }
        .parse()?;

    verbose!(?interval, "parsed");

    Ok(interval)
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    negative: bool,
    precision: Precision,
}

/// A signed amount followed by its marker letter.
struct Component<'a> {
    negative: bool,
    digits: &'a str,
    fraction: Option<&'a str>,
    marker: u8,
    offset: usize,
}

const DATE_MARKERS: &[u8] = b"YMD";
const TIME_MARKERS: &[u8] = b"HMS";

impl<'a> Parser<'a> {
    fn error(&self, reason: &'static str, offset: usize) -> FormatError {
        FormatError::new(reason).at(offset).input(self.text)
    }

    fn parse(mut self) -> Result<Interval> {
        if self.bytes.first() == Some(&b'-') {
            self.negative = true;
            self.pos += 1;
        }

        if self.bytes.get(self.pos) != Some(&b'P') {
            return Err(self.error("expected 'P'", self.pos).into());
        }
        self.pos += 1;

        let time_marker = self.bytes[self.pos..]
            .iter()
            .position(|&b| b == b'T')
            .map(|i| self.pos + i);
        let date_end = time_marker.unwrap_or(self.bytes.len());

        let mut date = [0i64; 3];
        let mut any = self.components(date_end, DATE_MARKERS, &mut date)?;

        let mut time = [0i64; 3];
        let mut fraction = None;

        if let Some(t) = time_marker {
            self.pos = t + 1;
            if self.pos == self.bytes.len() {
                return Err(self.error("expected time component after 'T'", self.pos).into());
            }
            let mut slot = 0;
            while self.pos < self.bytes.len() {
                let c = self.component()?;
                let Some(idx) = TIME_MARKERS.iter().position(|&m| m == c.marker) else {
                    return Err(self.error("unknown time marker", c.offset).into());
                };
                if idx < slot {
                    return Err(self.error("time component out of order", c.offset).into());
                }
                slot = idx + 1;

                if c.fraction.is_some() && c.marker != b'S' {
                    return Err(self.error("fraction only allowed in seconds", c.offset).into());
                }

                let negative = c.negative != self.negative;
                time[idx] = parse_signed(c.digits, negative)?;

                if let Some(digits) = c.fraction {
                    fraction = Some((scale_fraction(digits, self.precision)?, negative));
                } else if c.marker == b'S' {
                    fraction = Some((0, negative));
                }
            }
            any = true;
        }

        if !any {
            return Err(self.error("expected at least one component", self.pos).into());
        }

        let years = narrow(date[0])?;
        let months = narrow(date[1])?;
        let days = narrow(date[2])?;

        let second_left = time[2];
        let second_right = match fraction {
            Some((magnitude, true)) if second_left == 0 => -magnitude,
            Some((magnitude, _)) => magnitude,
            None => 0,
        };

        let (seconds, nanos) = carry(time[0], time[1], second_left, second_right)?;

        Interval::new(years, months, days, seconds, nanos)
    }

    /// Parse date components until `end`, returns `true` if any component found.
    fn components(&mut self, end: usize, markers: &[u8], out: &mut [i64; 3]) -> Result<bool> {
        let mut slot = 0;
        let mut any = false;
        while self.pos < end {
            let c = self.component()?;
            if self.pos > end {
                return Err(self.error("date component crosses 'T'", c.offset).into());
            }
            let Some(idx) = markers.iter().position(|&m| m == c.marker) else {
                return Err(self.error("unknown date marker", c.offset).into());
            };
            if idx < slot {
                return Err(self.error("date component out of order", c.offset).into());
            }
            if c.fraction.is_some() {
                return Err(self.error("fraction only allowed in seconds", c.offset).into());
            }
            slot = idx + 1;
            out[idx] = parse_signed(c.digits, c.negative != self.negative)?;
            any = true;
        }
        Ok(any)
    }

    /// Read `[-]digits[.digits]marker`.
    fn component(&mut self) -> Result<Component<'a>> {
        let offset = self.pos;
        let bytes = self.bytes;

        let negative = bytes.get(self.pos) == Some(&b'-');
        if negative {
            self.pos += 1;
        }

        let start = self.pos;
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected digits", self.pos).into());
        }
        let digits = &self.text[start..self.pos];

        let mut fraction = None;
        if bytes.get(self.pos) == Some(&b'.') {
            self.pos += 1;
            let start = self.pos;
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
            if start == self.pos {
                return Err(self.error("expected fraction digits", self.pos).into());
            }
            fraction = Some(&self.text[start..self.pos]);
        }

        let Some(&marker) = bytes.get(self.pos) else {
            return Err(self.error("missing component marker", self.pos).into());
        };
        self.pos += 1;

        Ok(Component { negative, digits, fraction, marker, offset })
    }
}

/// Parse ascii digits with the sign applied, so `i64::MIN` is reachable.
fn parse_signed(digits: &str, negative: bool) -> Result<i64, NumericError> {
    // only ascii digits reach here, the only failure is overflow
    let magnitude: u64 = digits.parse().map_err(|_| NumericError::Overflow)?;
    match negative {
        true => 0i64.checked_sub_unsigned(magnitude),
        false => i64::try_from(magnitude).ok(),
    }
    .ok_or(NumericError::Overflow)
}

fn narrow(value: i64) -> Result<i32, NumericError> {
    i32::try_from(value).map_err(|_| NumericError::Overflow)
}

/// Scale fractional digits to nanoseconds magnitude.
fn scale_fraction(digits: &str, precision: Precision) -> Result<i64> {
    let max = precision.digits();
    if digits.len() > max {
        return Err(RangeError::FractionDigits { digits: digits.len(), max }.into());
    }
    let value = parse_signed(digits, false)?;
    Ok(value * 10i64.pow((9 - digits.len()) as u32))
}

/// Combine hours, minutes, and the split seconds token into `(seconds, nanos)`.
///
/// `second_right` is a magnitude following the sign of `second_left`, it is only negative when
/// `second_left` is zero. The fraction carries no sign of its own in the grammar, so a negative
/// fraction after a nonzero integer part is rejected by the scanner before reaching here.
fn carry(hours: i64, minutes: i64, second_left: i64, second_right: i64) -> Result<(i64, i32), NumericError> {

    let sec_of_hm = hours
        .checked_mul(3600)
        .zip(minutes.checked_mul(60))
        .and_then(|(h, m)| h.checked_add(m))
        .ok_or(NumericError::Overflow)?;
    let mut seconds = sec_of_hm.checked_add(second_left).ok_or(NumericError::Overflow)?;

    let second_sign = match second_left {
        0 => second_right.signum(),
        left => left.signum(),
    };

    let nanos = if second_right != 0
        && sec_of_hm != 0
        && second_sign != sec_of_hm.signum()
        && second_left.unsigned_abs() < sec_of_hm.unsigned_abs()
    {
        // borrow a whole second from the hours and minutes part
        if sec_of_hm < 0 {
            seconds = seconds.checked_add(1).ok_or(NumericError::Overflow)?;
            let nanos = NANOS_PER_SECOND - second_right;
            match seconds {
                0 => -nanos,
                _ => nanos,
            }
        } else {
            seconds = seconds.checked_sub(1).ok_or(NumericError::Overflow)?;
            match second_right < 0 {
                true => NANOS_PER_SECOND + second_right,
                false => NANOS_PER_SECOND - second_right,
            }
        }
    } else if (seconds == 0 && second_left < 0) || (seconds < 0 && second_right < 0) {
        -second_right
    } else {
        second_right
    };

    // |nanos| < NANOS_PER_SECOND on every branch
    Ok((seconds, nanos as i32))
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(text: &str) -> Interval {
        parse_interval(text, Precision::Nano).unwrap()
    }

    fn fields(i: Interval) -> (i32, i32, i32, i64, i32) {
        (i.years(), i.months(), i.days(), i.seconds(), i.nanos())
    }

    #[test]
    fn parse_zero() {
        assert_eq!(parse("PT0S"), Interval::ZERO);
        assert_eq!(parse("P0D"), Interval::ZERO);
    }

    #[test]
    fn parse_date() {
        assert_eq!(fields(parse("P1Y2M3D")), (1, 2, 3, 0, 0));
        assert_eq!(fields(parse("P1Y3D")), (1, 0, 3, 0, 0));
        assert_eq!(fields(parse("-P1Y2M")), (-1, -2, 0, 0, 0));
        assert_eq!(fields(parse("P-1Y2M")), (-1, 2, 0, 0, 0));
    }

    #[test]
    fn parse_time() {
        assert_eq!(fields(parse("PT1H2M3S")), (0, 0, 0, 3723, 0));
        assert_eq!(fields(parse("PT1.5S")), (0, 0, 0, 1, 500_000_000));
        assert_eq!(fields(parse("PT0.000000001S")), (0, 0, 0, 0, 1));
        assert_eq!(fields(parse("P1DT12H")), (0, 0, 1, 43200, 0));
    }

    #[test]
    fn parse_negative_fraction() {
        assert_eq!(fields(parse("PT-0.5S")), (0, 0, 0, 0, -500_000_000));
        assert_eq!(fields(parse("-PT0.5S")), (0, 0, 0, 0, -500_000_000));
        assert_eq!(fields(parse("PT-1.5S")), (0, 0, 0, -1, 500_000_000));
        assert_eq!(fields(parse("-PT1.5S")), (0, 0, 0, -1, 500_000_000));
        assert_eq!(fields(parse("-PT-1.5S")), (0, 0, 0, 1, 500_000_000));
    }

    #[test]
    fn carry_into_minutes() {
        // -120 + 119.9 = -0.1
        assert_eq!(fields(parse("PT-2M119.9S")), (0, 0, 0, 0, -100_000_000));
        // 60 - 59.5 = 0.5
        assert_eq!(fields(parse("PT1M-59.5S")), (0, 0, 0, 0, 500_000_000));
        // 60 - 0.5 = 59.5
        assert_eq!(fields(parse("PT1M-0.5S")), (0, 0, 0, 59, 500_000_000));
        // -60 + 0.5 = -59.5
        assert_eq!(fields(parse("PT-1M0.5S")), (0, 0, 0, -59, 500_000_000));
        // -120 + 1.5 = -118.5
        assert_eq!(fields(parse("PT-2M1.5S")), (0, 0, 0, -118, 500_000_000));
        // 60 - 60.5 = -0.5
        assert_eq!(fields(parse("PT1M-60.5S")), (0, 0, 0, 0, -500_000_000));
        // 60 - 61.5 = -1.5
        assert_eq!(fields(parse("PT1M-61.5S")), (0, 0, 0, -1, 500_000_000));
        // -60 - 0.5 = -60.5
        assert_eq!(fields(parse("PT-1M-0.5S")), (0, 0, 0, -60, 500_000_000));
        // whole seconds never borrow
        assert_eq!(fields(parse("PT1M-30S")), (0, 0, 0, 30, 0));
    }

    #[test]
    fn micro_precision() {
        let i = parse_interval("PT1.123456S", Precision::Micro).unwrap();
        assert_eq!(i.nanos(), 123_456_000);

        let err = parse_interval("PT1.1234567S", Precision::Micro).unwrap_err();
        assert!(err.is_range());
        let err = parse_interval("PT1.1234567891S", Precision::Nano).unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn month_marker_asymmetry() {
        // `M` after `T` is minutes, month stays zero
        assert_eq!(fields(parse("PT5M")), (0, 0, 0, 300, 0));
        // `Y` and `D` after `T` is an error
        assert!(parse_interval("PT1Y", Precision::Nano).unwrap_err().is_format());
        assert!(parse_interval("PT1D", Precision::Nano).unwrap_err().is_format());
    }

    #[test]
    fn reject_malformed() {
        for text in [
            "", "P", "-P", "PT", "1Y", "-1Y", "p1Y", "P1", "P1H", "P1S", "P1D2Y", "P1M1Y",
            "PT1S1M", "P1.5Y", "PT1.5M", "PT1.S", "PT.5S", "P1Y ", " P1Y", "P--1Y", "PT1H1H",
        ] {
            let err = parse_interval(text, Precision::Nano).unwrap_err();
            assert!(err.is_format(), "{text:?}: {err}");
        }
    }

    #[test]
    fn reject_overflow() {
        let err = parse_interval("P9999999999Y", Precision::Nano).unwrap_err();
        assert!(err.is_numeric());
        let err = parse_interval("PT99999999999999999999S", Precision::Nano).unwrap_err();
        assert!(err.is_numeric());
        let err = parse_interval("PT9223372036854775807H", Precision::Nano).unwrap_err();
        assert!(err.is_numeric());
    }

    #[test]
    fn seconds_bounds() {
        assert_eq!(fields(parse("PT-9223372036854775808S")), (0, 0, 0, i64::MIN, 0));
        assert_eq!(fields(parse("-PT9223372036854775808S")), (0, 0, 0, i64::MIN, 0));
        assert_eq!(fields(parse("PT9223372036854775807S")), (0, 0, 0, i64::MAX, 0));
        assert_eq!(fields(parse("P-2147483648Y")), (i32::MIN, 0, 0, 0, 0));

        let err = parse_interval("PT9223372036854775808S", Precision::Nano).unwrap_err();
        assert!(err.is_numeric());
        let err = parse_interval("-PT-9223372036854775808S", Precision::Nano).unwrap_err();
        assert!(err.is_numeric());
    }

    #[test]
    fn fraction_has_no_sign() {
        for text in ["PT1.-5S", "PT-1.-5S", "PT0.-5S", "PT1.+5S"] {
            let err = parse_interval(text, Precision::Nano).unwrap_err();
            assert!(err.is_format(), "{text:?}: {err}");
        }
        assert_eq!(fields(parse("PT-1.5S")), (0, 0, 0, -1, 500_000_000));
    }

    #[test]
    fn sign_invariant() {
        for text in ["PT-2M119.9S", "PT1M-60.5S", "PT-0.1S", "PT-1H59M59.9S", "-PT1H-3600.5S"] {
            let i = parse(text);
            assert!(i.nanos() >= 0 || i.seconds() == 0, "{text:?}: {i:?}");
        }
    }
}
