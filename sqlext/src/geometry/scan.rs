use crate::{
    Result,
    error::{FormatError, NumericError},
    ext::SkipExt,
};

/// Scan a sequence of `(x,y)` pairs starting at byte index `start`.
///
/// Whitespace between tokens is skipped. After each point, a `,` followed by another `(`
/// continues the scan, any other character ends it. Each pair is passed to `on_pair`.
///
/// Returns the index right after the last consumed `)`.
///
/// # Errors
///
/// Returns [`FormatError`] if there is no `(` at the start, a `(` is unmatched, the `,` is not
/// strictly inside the parentheses, or a trailing `,` is not followed by any point. Returns
/// [`NumericError`] if a coordinate is not a valid number.
///
/// ```
/// # fn app() -> sqlext::Result<()> {
/// let mut points = vec![];
/// let end = sqlext::geometry::scan_points("[(0,0), (1.5, -2)]", 1, |x, y| points.push((x, y)))?;
/// assert_eq!(points, [(0.0, 0.0), (1.5, -2.0)]);
/// assert_eq!(end, 17);
/// # Ok(())
/// # }
/// # app().unwrap();
/// ```
pub fn scan_points<F>(text: &str, start: usize, mut on_pair: F) -> Result<usize>
where
    F: FnMut(f64, f64),
{
    let bytes = text.as_bytes();
    let error = |reason: &'static str, offset: usize| FormatError::new(reason).at(offset).input(text);

    let mut pos = bytes.skip_ws(start);

    loop {
        match bytes.get(pos) {
            Some(b'(') => { },
            Some(b')') => return Err(error("unexpected ')' before '('", pos).into()),
            _ => return Err(error("expected '('", pos).into()),
        }

        let open = pos;
        let Some(close) = find(bytes, open + 1, b')') else {
            return Err(error("unmatched '('", open).into());
        };
        if let Some(nested) = find(&bytes[..close], open + 1, b'(') {
            return Err(error("unmatched '('", nested).into());
        }
        let Some(comma) = find(&bytes[..close], open + 1, b',') else {
            return Err(error("expected ',' inside point", close).into());
        };
        if let Some(extra) = find(&bytes[..close], comma + 1, b',') {
            return Err(error("unexpected ',' inside point", extra).into());
        }

        let x = coordinate(&text[open + 1..comma])?;
        let y = coordinate(&text[comma + 1..close])?;
        on_pair(x, y);

        pos = close + 1;

        let next = bytes.skip_ws(pos);
        if bytes.get(next) != Some(&b',') {
            return Ok(pos);
        }

        let after = bytes.skip_ws(next + 1);
        match bytes.get(after) {
            Some(b'(') => pos = after,
            None => return Err(error("trailing ',' without point", next).into()),
            // not a point, e.g. circle radius
            Some(_) => return Ok(pos),
        }
    }
}

fn find(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes.get(from..)?.iter().position(|&b| b == needle).map(|i| from + i)
}

/// Parse a coordinate token, surrounding whitespace is ignored.
pub(crate) fn coordinate(token: &str) -> Result<f64, NumericError> {
    let token = token.trim();
    token.parse().map_err(|_| NumericError::Invalid(token.to_owned()))
}

#[cfg(test)]
mod test {
    use super::*;

    fn scan(text: &str, start: usize) -> Result<(Vec<(f64, f64)>, usize)> {
        let mut points = vec![];
        let end = scan_points(text, start, |x, y| points.push((x, y)))?;
        Ok((points, end))
    }

    #[test]
    fn scan_single() {
        let (points, end) = scan("( 1 , 2 )", 0).unwrap();
        assert_eq!(points, [(1.0, 2.0)]);
        assert_eq!(end, 9);
    }

    #[test]
    fn scan_list() {
        let (points, end) = scan("((0,0), (1,1) ,(2e1,-3.5))", 1).unwrap();
        assert_eq!(points, [(0.0, 0.0), (1.0, 1.0), (20.0, -3.5)]);
        assert_eq!(end, 25);
    }

    #[test]
    fn stop_before_non_point() {
        let text = "<(1,2), 3>";
        let (points, end) = scan(text, 1).unwrap();
        assert_eq!(points, [(1.0, 2.0)]);
        assert_eq!(&text[end..], ", 3>");
    }

    #[test]
    fn special_numbers() {
        let (points, _) = scan("(NaN,inf)", 0).unwrap();
        assert!(points[0].0.is_nan());
        assert_eq!(points[0].1, f64::INFINITY);
    }

    #[test]
    fn reject_malformed() {
        for text in [
            "0,9", "", "   ", ")(1,2)", "(1,2", "(1 2)", "(1,(2)", "(1,2,3)", "(0, 0 ) , (1, 1) ,",
            "(1,2),",
        ] {
            let err = scan(text, 0).unwrap_err();
            assert!(err.is_format(), "{text:?}: {err}");
        }
    }

    #[test]
    fn reject_number() {
        let err = scan("(1,x)", 0).unwrap_err();
        assert!(err.is_numeric());
        let err = scan("(,1)", 0).unwrap_err();
        assert!(err.is_numeric());
    }
}
