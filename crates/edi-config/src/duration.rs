//! Duration strings such as `15s`, `1m`, `1h30m` or `250ms`.
//!
//! Durations are written as a sequence of `<integer><unit>` pairs where the
//! unit is one of `ms`, `s`, `m`, `h`. The `serde_format` and `option`
//! modules plug the parser into `#[serde(with = ...)]` attributes.

use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Parse a duration string.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidDuration`] when the input is empty, contains
/// a component without a number or unit, or uses an unknown unit.
pub fn parse_duration(input: &str) -> ConfigResult<Duration> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid(input, "empty"));
    }

    let mut total = Duration::ZERO;
    let mut rest = trimmed;
    while !rest.is_empty() {
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        if digits == 0 {
            return Err(invalid(input, "missing_number"));
        }
        let (number, tail) = rest.split_at(digits);
        let value: u64 = number.parse().map_err(|_| invalid(input, "number_overflow"))?;

        let unit_len = tail
            .chars()
            .take_while(char::is_ascii_alphabetic)
            .map(char::len_utf8)
            .sum::<usize>();
        let (unit, remainder) = tail.split_at(unit_len);
        let component = match unit {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value.saturating_mul(60)),
            "h" => Duration::from_secs(value.saturating_mul(3600)),
            "" => return Err(invalid(input, "missing_unit")),
            _ => return Err(invalid(input, "unknown_unit")),
        };
        total = total.saturating_add(component);
        rest = remainder;
    }

    Ok(total)
}

/// Render a duration in the compact form accepted by [`parse_duration`].
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis % 1000 != 0 {
        return format!("{millis}ms");
    }

    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    let mut rendered = String::new();
    if hours > 0 {
        rendered.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        rendered.push_str(&format!("{minutes}m"));
    }
    if seconds > 0 || rendered.is_empty() {
        rendered.push_str(&format!("{seconds}s"));
    }
    rendered
}

fn invalid(input: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidDuration {
        value: input.to_string(),
        reason,
    }
}

/// Serde adapter for required `Duration` fields stored as strings.
pub mod serde_format {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Serialize a duration as a compact string.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_duration(*duration))
    }

    /// Deserialize a duration from a string.
    ///
    /// # Errors
    ///
    /// Fails when the string is not a valid duration.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_duration(&raw)
            .map_err(|_| D::Error::custom(format!("invalid duration '{raw}'")))
    }
}

/// Serde adapter for optional `Duration` fields stored as strings.
pub mod option {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Serialize an optional duration as a compact string or `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(duration) => serializer.serialize_str(&super::format_duration(*duration)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional duration; empty strings count as absent.
    ///
    /// # Errors
    ///
    /// Fails when a non-empty string is not a valid duration.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => super::parse_duration(value)
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid duration '{value}'"))),
        }
    }
}
