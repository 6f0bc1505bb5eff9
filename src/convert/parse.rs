//! Parsers for the string forms of leaf values.

use std::{str::FromStr, time::Duration};

use chrono::{
    format::ParseErrorKind, DateTime, FixedOffset, NaiveDate, NaiveDateTime,
};
use num_complex::Complex;
use url::Url;

use crate::{reflect::Scalar, tags::RFC3339};


/// Why a literal could not be parsed.
#[derive(Debug)]
pub(crate) enum Failure {
    Invalid(Box<dyn std::error::Error + Send + Sync>),

    /// The literal is well formed, but its value is out of range.
    Overflow,
}

fn invalid(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Failure {
    Failure::Invalid(err.into())
}

pub(crate) fn bool(s: &str) -> Result<bool, Failure> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(invalid(format!("invalid boolean literal \"{s}\""))),
    }
}

/// Parses an integer with base prefix detection: `0x`, `0o`, `0b` and a
/// leading `0` select base 16, 8, 2 and 8. `_` may separate digits, and may
/// follow a prefix. Negative values are only accepted if `signed`.
pub(crate) fn int(s: &str, signed: bool) -> Result<Scalar, Failure> {
    let (neg, unsigned) = match s.as_bytes().first() {
        Some(b'-') if signed => (true, &s[1..]),
        Some(b'+') if signed => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits, prefixed) = split_radix(unsigned);
    let digits = strip_underscores(digits, prefixed)?;
    if digits.starts_with(['+', '-']) {
        return Err(invalid(format!("invalid integer literal \"{s}\"")));
    }
    let mag = u128::from_str_radix(&digits, radix).map_err(invalid)?;

    if !neg {
        return Ok(Scalar::Uint(mag));
    }
    if mag > i128::MAX as u128 + 1 {
        return Err(Failure::Overflow);
    }
    Ok(Scalar::Int((mag as i128).wrapping_neg()))
}

fn split_radix(s: &str) -> (u32, &str, bool) {
    let lower = |i: usize| s.as_bytes().get(i).map(u8::to_ascii_lowercase);
    match (lower(0), lower(1)) {
        (Some(b'0'), Some(b'x')) => (16, &s[2..], true),
        (Some(b'0'), Some(b'o')) => (8, &s[2..], true),
        (Some(b'0'), Some(b'b')) => (2, &s[2..], true),
        (Some(b'0'), Some(_)) => (8, &s[1..], true),
        _ => (10, s, false),
    }
}

fn strip_underscores(digits: &str, prefixed: bool) -> Result<String, Failure> {
    let digits = match prefixed {
        true => digits.strip_prefix('_').unwrap_or(digits),
        false => digits,
    };
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return Err(invalid(format!("misplaced '_' in \"{digits}\"")));
    }
    Ok(digits.replace('_', ""))
}

pub(crate) fn float(s: &str) -> Result<f64, Failure> {
    let v = f64::from_str(s).map_err(invalid)?;
    if v.is_infinite() && !names_infinity(s) {
        return Err(Failure::Overflow);
    }
    Ok(v)
}

fn names_infinity(s: &str) -> bool {
    s.to_ascii_lowercase().contains("inf")
}

/// Parses `a+bi`, `a-bi`, `bi` or `a`, optionally in parentheses.
pub(crate) fn complex(s: &str) -> Result<Complex<f64>, Failure> {
    let inner = s.strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(s);
    let c = Complex::<f64>::from_str(inner).map_err(|e| invalid(e.to_string()))?;
    if (c.re.is_infinite() || c.im.is_infinite()) && !names_infinity(inner) {
        return Err(Failure::Overflow);
    }
    Ok(c)
}

pub(crate) fn duration(s: &str) -> Result<Duration, Failure> {
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(s).map_err(invalid)
}

/// Parses a timestamp with the `chrono` layout `format`. Layouts without an
/// offset are read as UTC, date-only layouts as midnight UTC.
pub(crate) fn timestamp(s: &str, format: &str) -> Result<DateTime<FixedOffset>, Failure> {
    if format == RFC3339 {
        return DateTime::parse_from_rfc3339(s).map_err(invalid);
    }

    let err = match DateTime::parse_from_str(s, format) {
        Ok(t) => return Ok(t),
        Err(e) => e,
    };
    if err.kind() != ParseErrorKind::NotEnough {
        return Err(invalid(err));
    }

    match NaiveDateTime::parse_from_str(s, format) {
        Ok(t) => return Ok(t.and_utc().fixed_offset()),
        Err(e) if e.kind() != ParseErrorKind::NotEnough => return Err(invalid(e)),
        Err(_) => {}
    }

    NaiveDate::parse_from_str(s, format)
        .map_err(invalid)?
        .and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc().fixed_offset())
        .ok_or_else(|| invalid("date out of range"))
}

pub(crate) fn url(s: &str) -> Result<Url, Failure> {
    Url::parse(s).map_err(invalid)
}
