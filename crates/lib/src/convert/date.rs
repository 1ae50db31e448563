//! Date converters over the grammars commonly seen in service payloads.
//!
//! Native dates are `DateTime<Utc>`. Each field picks a preferred
//! [`DateFormat`] used for output; on input the preferred grammar is tried
//! first and the others follow in [`DateFormat::ALL`] order. Parsing goes
//! through the model's [`ConversionService`](super::ConversionService),
//! which memoizes results.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

use super::{Converter, Nesting};
use crate::{
    constants::{MAX_INTEGER_DATE, MIN_INTEGER_DATE},
    field::Emit,
};

const OFFSET_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";
const LONG_FORM: &str = "%a %b %d %Y %H:%M:%S";
const LONG_FORM_ZONES: [&str; 3] = ["GMT", "UTC", "Z"];

/// A date grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// `2017-02-05T17:03:13.000-03:00`
    OffsetMillis,
    /// `Tue Jun 3 2008 11:05:30 GMT`
    LongForm,
    /// `2016-11-01T21:14:33Z`
    Iso8601,
    /// `2018/02/15`
    Slashes,
    /// `2018-02-15`
    Dashes,
    /// `20180215`
    Compact,
}

impl DateFormat {
    /// Every grammar, in fallback order.
    pub const ALL: [DateFormat; 6] = [
        DateFormat::OffsetMillis,
        DateFormat::LongForm,
        DateFormat::Iso8601,
        DateFormat::Slashes,
        DateFormat::Dashes,
        DateFormat::Compact,
    ];

    /// Parses `text` with this grammar only.
    pub fn parse(self, text: &str) -> Option<DateTime<Utc>> {
        match self {
            DateFormat::OffsetMillis => DateTime::parse_from_str(text, OFFSET_MILLIS)
                .ok()
                .map(|at| at.with_timezone(&Utc)),
            DateFormat::LongForm => parse_long_form(text),
            DateFormat::Iso8601 => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|at| at.with_timezone(&Utc)),
            DateFormat::Slashes => parse_day(text, "%Y/%m/%d"),
            DateFormat::Dashes => parse_day(text, "%Y-%m-%d"),
            DateFormat::Compact => parse_compact(text),
        }
    }

    /// Renders `at` in this grammar. Offsets are always written as UTC.
    pub fn format(self, at: &DateTime<Utc>) -> String {
        match self {
            DateFormat::OffsetMillis => at.format(OFFSET_MILLIS).to_string(),
            DateFormat::LongForm => at.format("%a %b %-d %Y %H:%M:%S GMT").to_string(),
            DateFormat::Iso8601 => at.to_rfc3339_opts(SecondsFormat::Secs, true),
            DateFormat::Slashes => at.format("%Y/%m/%d").to_string(),
            DateFormat::Dashes => at.format("%Y-%m-%d").to_string(),
            DateFormat::Compact => at.format("%Y%m%d").to_string(),
        }
    }
}

fn midnight(day: NaiveDate) -> Option<DateTime<Utc>> {
    day.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_day(text: &str, pattern: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(text, pattern).ok().and_then(midnight)
}

fn parse_compact(text: &str) -> Option<DateTime<Utc>> {
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = text[..4].parse().ok()?;
    let month = text[4..6].parse().ok()?;
    let day = text[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).and_then(midnight)
}

fn parse_long_form(text: &str) -> Option<DateTime<Utc>> {
    let (stamp, zone) = text.trim().rsplit_once(' ')?;
    if !LONG_FORM_ZONES.contains(&zone) {
        return None;
    }
    NaiveDateTime::parse_from_str(stamp, LONG_FORM)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Converter for optional dates in a preferred grammar.
///
/// Integers in `19000101..=99991231` are read as compact dates.
#[derive(Debug, Clone, Copy)]
pub struct DateConverter(pub DateFormat);

impl Converter<Option<DateTime<Utc>>> for DateConverter {
    fn to_native(&self, value: &Value, scope: &Nesting<'_>) -> Option<Option<DateTime<Utc>>> {
        let parsed = match value {
            Value::String(text) => scope.conversions().parse_date(text, self.0),
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|n| n.trunc() as i64))
                .filter(|n| (MIN_INTEGER_DATE..=MAX_INTEGER_DATE).contains(n))
                .and_then(|n| DateFormat::Compact.parse(&n.to_string())),
            _ => None,
        };
        parsed.map(Some)
    }

    fn to_document(&self, native: &Option<DateTime<Utc>>, _emit: Emit) -> Option<Value> {
        native
            .as_ref()
            .map(|at| Value::String(self.0.format(at)))
    }

    fn is_nothing(&self, native: &Option<DateTime<Utc>>) -> bool {
        native.is_none()
    }
}
