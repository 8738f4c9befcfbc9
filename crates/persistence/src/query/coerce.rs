//! Type coercion of query-string literals.
//!
//! Query parameters arrive as strings; [`coerce`] applies ordered,
//! first-match-wins heuristics to recover the type the caller most
//! likely meant. A literal that looks typed but fails to parse falls
//! back to the raw string: malformed input degrades to string equality
//! instead of failing the request.

use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use tracing::warn;

use super::value::ScalarValue;

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+$").unwrap());
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+\.\d+$").unwrap());
static EXPONENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+\.\d+e-?\d+$").unwrap());
static DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap());

/// Converts a raw query-string literal into a typed value.
///
/// Heuristics, in order: integer, decimal (plain or exponent), calendar
/// date (local midnight), date-time (local timezone unless an offset is
/// given), boolean, and finally the unchanged string.
///
/// Never fails: an internal parse error is logged and the raw string is
/// returned instead.
pub fn coerce(raw: &str) -> ScalarValue {
    match try_coerce(raw) {
        Ok(value) => value,
        Err(reason) => {
            warn!(value = raw, %reason, "unable to convert filter value, using raw string");
            ScalarValue::String(raw.to_string())
        }
    }
}

fn try_coerce(raw: &str) -> Result<ScalarValue, String> {
    if INTEGER.is_match(raw) || DECIMAL.is_match(raw) || EXPONENT.is_match(raw) {
        return raw
            .parse::<f64>()
            .map(ScalarValue::Number)
            .map_err(|e| e.to_string());
    }

    if DATE.is_match(raw) {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| e.to_string())?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| "invalid midnight".to_string())?;
        return local_to_utc(midnight).map(ScalarValue::Date);
    }

    if DATE_PREFIX.is_match(raw) {
        return parse_datetime(raw).map(ScalarValue::Date);
    }

    if raw.eq_ignore_ascii_case("true") {
        return Ok(ScalarValue::Boolean(true));
    }
    if raw.eq_ignore_ascii_case("false") {
        return Ok(ScalarValue::Boolean(false));
    }

    Ok(ScalarValue::String(raw.to_string()))
}

/// Parses a point in time from a stored-document string, accepting the
/// same calendar shapes coercion does. Used by query evaluation when an
/// ordering or equality check targets a date.
pub fn parse_point_in_time(raw: &str) -> Option<DateTime<Utc>> {
    if DATE.is_match(raw) {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        return local_to_utc(date.and_hms_opt(0, 0, 0)?).ok();
    }
    parse_datetime(raw).ok()
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    // Offset-qualified timestamps carry their own timezone.
    if let Ok(fixed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(fixed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return local_to_utc(naive);
        }
    }

    Err(format!("unparseable date-time: '{}'", raw))
}

fn local_to_utc(naive: NaiveDateTime) -> Result<DateTime<Utc>, String> {
    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("no local time for {}", naive))
}
