//! Duration parsing for reminder commands.
//!
//! Users type durations like `1d2h30m` or `1.5h`. Every `<number><unit>` token in
//! the text is summed; anything else in the string is ignored.

use crate::errors::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_MINUTE: u64 = 60;

/// Longest duration accepted, roughly 100 years.
pub const MAX_DURATION_SECS: u64 = 100 * 365 * SECONDS_PER_DAY;

#[allow(clippy::expect_used)]
static DURATION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+\.?\d*)([dhms])").expect("duration pattern is a valid regex")
});

/// Parses a free-text duration into whole seconds, rounding up.
///
/// Units are `d`, `h`, `m` and `s` in either case. Repeated units are summed
/// (`1h2h` is three hours) and a zero total is allowed.
///
/// # Errors
/// Returns [`Error::InvalidDuration`] if the text holds no `<number><unit>` token
/// or the total exceeds [`MAX_DURATION_SECS`].
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn parse_duration(text: &str) -> Result<u64> {
    let invalid = || Error::InvalidDuration {
        input: text.to_string(),
    };

    let mut matched = false;
    let mut total = 0.0_f64;

    for caps in DURATION_TOKEN.captures_iter(text) {
        let value: f64 = caps[1].parse().map_err(|_| invalid())?;
        let unit_seconds = match caps[2].to_ascii_lowercase().as_str() {
            "d" => SECONDS_PER_DAY,
            "h" => SECONDS_PER_HOUR,
            "m" => SECONDS_PER_MINUTE,
            _ => 1,
        };
        total += value * unit_seconds as f64;
        matched = true;
    }

    if !matched {
        return Err(invalid());
    }

    let total = total.ceil();
    if !total.is_finite() || total > MAX_DURATION_SECS as f64 {
        return Err(invalid());
    }

    Ok(total as u64)
}

/// Renders seconds left as `1d 2h 3m 4s`, or `Overdue!` once negative.
#[must_use]
pub fn format_remaining(seconds: i64) -> String {
    if seconds < 0 {
        return "Overdue!".to_string();
    }

    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;
    format!("{days}d {hours}h {minutes}m {secs}s")
}
