use time::Duration;

use crate::DomainError;

/// Duration used when a text line leaves the field empty.
pub const DEFAULT_DURATION: &str = "0:00";

/// Parses an interval duration written as `ss`, `m:ss` or `h:mm:ss`.
///
/// Minutes are unbounded in the two-part form (`90:00` is an hour and a half);
/// seconds, and minutes in the three-part form, must stay below 60.
pub fn parse_duration(text: &str) -> Result<Duration, DomainError> {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix('-') {
        return match parse_unsigned(rest) {
            Some(seconds) if seconds > 0 => Err(DomainError::NegativeDuration(text.to_string())),
            Some(_) => Ok(Duration::ZERO),
            None => Err(DomainError::InvalidDuration(text.to_string())),
        };
    }
    parse_unsigned(trimmed)
        .and_then(|seconds| i64::try_from(seconds).ok())
        .map(Duration::seconds)
        .ok_or_else(|| DomainError::InvalidDuration(text.to_string()))
}

fn parse_unsigned(text: &str) -> Option<u64> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut numbers = Vec::with_capacity(parts.len());
    for part in &parts {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        numbers.push(part.parse::<u64>().ok()?);
    }
    match numbers.as_slice() {
        [seconds] => Some(*seconds),
        [minutes, seconds] if *seconds < 60 => minutes.checked_mul(60)?.checked_add(*seconds),
        [hours, minutes, seconds] if *minutes < 60 && *seconds < 60 => hours
            .checked_mul(3600)?
            .checked_add(minutes * 60 + seconds),
        _ => None,
    }
}

/// Formats a duration as `m:ss`, or `h:mm:ss` once it reaches an hour.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.whole_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{sign}{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{minutes}:{seconds:02}")
    }
}
