//! Conversions between the clock strings the feeds send and whole seconds.
//!
//! Game clocks arrive either as ISO-8601 style durations (`PT11M38.00S`) or as colon separated
//! `MM:SS` values, while start times arrive as wall clock strings (`7:30 PM`, `23:00 UTC`).
//! Game clocks are parsed with [`parse_clock`], which never fails loudly: an unparseable value
//! is `None` so the caller can keep showing what it already had.

use log::debug;
use thiserror::Error;
use time::{Time, UtcOffset, macros::format_description};

const MINUTES_PER_DAY: i32 = 24 * 60;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Clock string is empty")]
    Empty,
    #[error("Unrecognized clock format {0:?}")]
    Unrecognized(String),
    #[error("Invalid number {0:?} in clock string")]
    InvalidNumber(String),
    #[error("Seconds value {0} is out of range")]
    SecondsOutOfRange(u32),
}

/// Returns the number of seconds on a game clock, or `None` if `raw` can't be interpreted
pub fn parse_clock(raw: &str) -> Option<u32> {
    try_parse_clock(raw)
        .map_err(|e| debug!("Ignoring clock value {raw:?}: {e}"))
        .ok()
}

pub fn try_parse_clock(raw: &str) -> Result<u32, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Some(body) = raw.strip_prefix("PT") {
        return parse_iso_duration(raw, body);
    }

    if raw.contains(':') {
        return parse_colon_clock(raw);
    }

    Err(ParseError::Unrecognized(raw.to_string()))
}

fn parse_iso_duration(raw: &str, body: &str) -> Result<u32, ParseError> {
    let (minutes, rest) = match body.split_once('M') {
        Some((minutes, rest)) => (parse_whole_number(minutes)?, rest),
        None => (0, body),
    };

    let seconds = match rest.split_once('S') {
        Some((seconds, "")) => parse_whole_number(seconds)?,
        None if rest.is_empty() => 0,
        _ => return Err(ParseError::Unrecognized(raw.to_string())),
    };

    total_seconds(raw, minutes, seconds)
}

fn parse_colon_clock(raw: &str) -> Result<u32, ParseError> {
    // Anything after the first space ("7:30 PM", "4:12 Q3") is not part of the clock
    let clock = raw.split_whitespace().next().ok_or(ParseError::Empty)?;

    let (minutes, seconds) = clock
        .split_once(':')
        .filter(|(_, seconds)| !seconds.contains(':'))
        .ok_or_else(|| ParseError::Unrecognized(raw.to_string()))?;

    let minutes = parse_whole_number(minutes)?;
    let seconds = parse_whole_number(seconds)?;
    if seconds >= 60 {
        return Err(ParseError::SecondsOutOfRange(seconds));
    }

    total_seconds(raw, minutes, seconds)
}

fn total_seconds(raw: &str, minutes: u32, seconds: u32) -> Result<u32, ParseError> {
    minutes
        .checked_mul(60)
        .and_then(|s| s.checked_add(seconds))
        .ok_or_else(|| ParseError::InvalidNumber(raw.to_string()))
}

/// Parses an unsigned number, discarding any fractional part. An empty field counts as zero.
fn parse_whole_number(field: &str) -> Result<u32, ParseError> {
    let (whole, fraction) = field.split_once('.').unwrap_or((field, ""));

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(ParseError::InvalidNumber(field.to_string()));
    }

    if whole.is_empty() {
        return Ok(0);
    }
    whole
        .parse()
        .map_err(|_| ParseError::InvalidNumber(field.to_string()))
}

/// Formats a number of seconds as `MM:SS`. Negative values are shown as `00:00`, and the
/// minutes are not wrapped into hours.
pub fn format_clock(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parses a wall clock time into minutes since midnight.
///
/// Accepts `H:MM AM`/`H:MM PM` in any case and 24 hour `HH:MM`. A trailing timezone word
/// (`23:00 UTC`, `7:00 pm ET`) is ignored, the caller is expected to know which zone the feed
/// uses.
pub fn parse_time_of_day(raw: &str) -> Option<u16> {
    let normalized = raw.trim().to_uppercase();
    let mut tokens = normalized.split_whitespace();
    let clock = tokens.next()?;

    let time = match tokens.next() {
        Some(period @ ("AM" | "PM")) => Time::parse(
            &format!("{clock} {period}"),
            format_description!("[hour repr:12 padding:none]:[minute] [period]"),
        ),
        _ => Time::parse(clock, format_description!("[hour padding:none]:[minute]")),
    }
    .map_err(|e| debug!("Ignoring time of day {raw:?}: {e}"))
    .ok()?;

    Some(u16::from(time.hour()) * 60 + u16::from(time.minute()))
}

/// Formats minutes since midnight as a 12 hour wall clock time, e.g. `7:05 PM`
pub fn format_time_of_day(minutes: u16) -> String {
    let minutes = minutes % MINUTES_PER_DAY as u16;
    let hour = minutes / 60;
    let period = if hour < 12 { "AM" } else { "PM" };
    let hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour}:{:02} {period}", minutes % 60)
}

/// Moves a UTC time of day into `offset`, wrapping around midnight
pub fn shift_time_of_day(minutes: u16, offset: UtcOffset) -> u16 {
    let shifted = i32::from(minutes) + i32::from(offset.whole_minutes());
    shifted.rem_euclid(MINUTES_PER_DAY) as u16
}
