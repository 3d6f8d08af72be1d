//! TTL hint and remote expiry parsing
//!
//! Malformed values never fail a call: callers fall back to [`DEFAULT_TTL`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// TTL assumed when no usable hint or expiry is available
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

static TTL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]*\.?[0-9]+)s$").expect("valid TTL pattern"));

/// Parses a duration string such as `"3600s"` or `"1.5s"`
pub fn parse_ttl(value: &str) -> Option<Duration> {
    let captures = TTL_PATTERN.captures(value.trim())?;
    let seconds: f64 = captures.get(1)?.as_str().parse().ok()?;

    Duration::try_from_secs_f64(seconds).ok()
}

/// Parses an optional TTL hint, falling back to `default` when absent or malformed
pub fn ttl_or_default(value: Option<&str>, default: Duration) -> Duration {
    match value {
        Some(raw) => parse_ttl(raw).unwrap_or_else(|| {
            tracing::debug!(ttl = raw, "Unparseable TTL hint, using default");
            default
        }),
        None => default,
    }
}

/// Formats a duration the way the remote API expects TTL strings
pub fn format_ttl(ttl: Duration) -> String {
    let secs = ttl.as_secs_f64();
    if secs.fract() == 0.0 {
        format!("{}s", ttl.as_secs())
    } else {
        format!("{}s", secs)
    }
}

/// Interpretation of a remote-reported expiry timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteExpiry {
    /// Still valid for the given duration
    Remaining(Duration),
    /// Already in the past
    Expired,
    /// Missing or not a valid RFC 3339 timestamp
    Unknown,
}

impl RemoteExpiry {
    /// Parses an RFC 3339 timestamp (`Z` or explicit offset) relative to `now`
    pub fn parse_at(value: Option<&str>, now: DateTime<Utc>) -> Self {
        let Some(raw) = value.filter(|v| !v.is_empty()) else {
            return Self::Unknown;
        };

        let expire_time = match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(e) => {
                tracing::debug!(expire_time = raw, error = %e, "Unparseable remote expiry");
                return Self::Unknown;
            }
        };

        match (expire_time - now).to_std() {
            Ok(remaining) if !remaining.is_zero() => Self::Remaining(remaining),
            _ => Self::Expired,
        }
    }

    pub fn parse(value: Option<&str>) -> Self {
        Self::parse_at(value, Utc::now())
    }

    /// Remaining TTL to assume locally, `None` when the remote entry is expired
    pub fn remaining_or(&self, default: Duration) -> Option<Duration> {
        match self {
            Self::Remaining(remaining) => Some(*remaining),
            Self::Expired => None,
            Self::Unknown => Some(default),
        }
    }
}
