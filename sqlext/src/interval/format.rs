use std::fmt::Write;

use super::{Interval, Precision};

/// Format interval text, the inverse of [`parse_interval`][super::parse_interval].
///
/// Zero interval is `PT0S`. Only nonzero components are rendered, hours and minutes are derived
/// from [`Interval::seconds`]. Fractional seconds are rendered up to [`Precision::digits`]
/// digits with trailing zeros stripped, [`Precision::Micro`] truncates sub-microsecond nanos.
pub fn format_interval(interval: &Interval, precision: Precision) -> String {
    if interval.is_zero() {
        return String::from("PT0S");
    }

    let mut int = itoa::Buffer::new();
    let mut out = String::with_capacity(24);
    out.push('P');

    for (value, marker) in [
        (interval.years, 'Y'),
        (interval.months, 'M'),
        (interval.days, 'D'),
    ] {
        if value != 0 {
            out.push_str(int.format(value));
            out.push(marker);
        }
    }

    let date_len = out.len();
    out.push('T');

    let hours = interval.seconds / 3600;
    let rem = interval.seconds % 3600;
    let minutes = rem / 60;
    let secs = rem % 60;

    if hours != 0 {
        out.push_str(int.format(hours));
        out.push('H');
    }
    if minutes != 0 {
        out.push_str(int.format(minutes));
        out.push('M');
    }

    let fraction = match precision {
        Precision::Nano => interval.nanos.unsigned_abs(),
        Precision::Micro => interval.nanos.unsigned_abs() / 1000,
    };

    if secs != 0 || fraction != 0 {
        if secs == 0 && interval.is_negative_time() {
            out.push('-');
        }
        out.push_str(int.format(secs));
        if fraction != 0 {
            out.push('.');
            let start = out.len();
            // writing to `String` is infallible
            let _ = write!(out, "{fraction:0width$}", width = precision.digits());
            let end = out[start..].trim_end_matches('0').len();
            out.truncate(start + end);
        }
        out.push('S');
    }

    match (out.len() == date_len + 1, date_len == 1) {
        // nothing rendered at all, only happen when truncated by precision
        (true, true) => out.push_str("0S"),
        // date only
        (true, false) => out.truncate(date_len),
        _ => { },
    }

    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::interval::parse_interval;

    fn format(y: i32, m: i32, d: i32, s: i64, n: i32) -> String {
        format_interval(&Interval::new(y, m, d, s, n).unwrap(), Precision::Nano)
    }

    #[test]
    fn format_zero() {
        assert_eq!(Interval::ZERO.to_string(), "PT0S");
        assert_eq!(format(0, 0, 0, 0, 0), "PT0S");
    }

    #[test]
    fn format_components() {
        assert_eq!(format(1, 2, 3, 0, 0), "P1Y2M3D");
        assert_eq!(format(0, 0, 1, 0, 0), "P1D");
        assert_eq!(format(0, 0, 0, 3723, 0), "PT1H2M3S");
        assert_eq!(format(0, 0, 0, 3600, 0), "PT1H");
        assert_eq!(format(0, 0, 1, 60, 0), "P1DT1M");
        assert_eq!(format(0, 0, 0, -3661, 0), "PT-1H-1M-1S");
    }

    #[test]
    fn format_fraction() {
        assert_eq!(format(0, 0, 0, 1, 500_000_000), "PT1.5S");
        assert_eq!(format(0, 0, 0, 0, 1), "PT0.000000001S");
        assert_eq!(format(0, 0, 0, 0, -100_000_000), "PT-0.1S");
        assert_eq!(format(0, 0, 0, -1, 500_000_000), "PT-1.5S");
        assert_eq!(format(0, 0, 0, -60, 500_000_000), "PT-1M-0.5S");
        assert_eq!(format(0, 0, 0, 60, 500_000_000), "PT1M0.5S");
    }

    #[test]
    fn format_micro() {
        let i = Interval::new(0, 0, 0, 1, 123_456_789).unwrap();
        assert_eq!(format_interval(&i, Precision::Micro), "PT1.123456S");
        assert_eq!(format_interval(&i, Precision::Nano), "PT1.123456789S");

        let i = Interval::new(0, 0, 0, 0, 500).unwrap();
        assert_eq!(format_interval(&i, Precision::Micro), "PT0S");
        let i = Interval::new(0, 0, 2, 0, 500).unwrap();
        assert_eq!(format_interval(&i, Precision::Micro), "P2D");
    }

    #[test]
    fn reparse_canonical() {
        for text in [
            "PT0S", "P1Y2M3D", "PT-2M119.9S", "P1Y3D", "PT1M-0.5S", "-P1Y2M3DT4H5M6.789S",
            "PT-1M-0.5S", "PT36H", "P-1DT-0.000000001S", "PT1M-61.5S",
        ] {
            let first = parse_interval(text, Precision::Nano).unwrap();
            let canonical = format_interval(&first, Precision::Nano);
            let second = parse_interval(&canonical, Precision::Nano).unwrap();
            assert_eq!(first, second, "{text:?} -> {canonical:?}");
        }
    }
}
