//! Format detection for string values

use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Detected string format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    /// ISO 8601 date (YYYY-MM-DD)
    Date,
    /// ISO 8601 date-time (YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD HH:MM:SS)
    DateTime,
    /// UUID in canonical 8-4-4-4-12 form
    Uuid,
    /// Email address
    Email,
    /// Absolute URL with scheme and host
    Url,
    /// Time (HH:MM:SS)
    Time,
    /// ISO 8601 duration (P1DT2H)
    Duration,
    /// Hex color (#RRGGBB)
    Color,
    /// Dotted hostname
    Hostname,
    /// IPv4 address
    Ipv4,
    /// IPv6 address
    Ipv6,
}

impl Format {
    /// Priority used when two observations of one property disagree.
    /// Higher wins; equal priorities keep the earlier format.
    pub fn priority(&self) -> u8 {
        match self {
            Format::DateTime => 10,
            Format::Date => 9,
            Format::Time => 8,
            Format::Uuid => 7,
            Format::Email => 6,
            Format::Url => 5,
            Format::Hostname => 4,
            Format::Ipv4 | Format::Ipv6 => 3,
            Format::Color => 2,
            Format::Duration => 1,
        }
    }

    /// Format name as written into a property definition
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Date => "date",
            Format::DateTime => "date-time",
            Format::Uuid => "uuid",
            Format::Email => "email",
            Format::Url => "url",
            Format::Time => "time",
            Format::Duration => "duration",
            Format::Color => "color",
            Format::Hostname => "hostname",
            Format::Ipv4 => "ipv4",
            Format::Ipv6 => "ipv6",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Regex patterns for format detection
static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static DATETIME_T_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})?$").unwrap()
});

static DATETIME_SPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static TIME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}$").unwrap());

static DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(\d+Y)?(\d+M)?(\d+W)?(\d+D)?(T(\d+H)?(\d+M)?(\d+(\.\d+)?S)?)?$").unwrap()
});

static COLOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

// Final label must start with a letter so dotted quads fall through to ipv4
static HOSTNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?\.)+[a-zA-Z]([a-zA-Z0-9-]*[a-zA-Z0-9])?$",
    )
    .unwrap()
});

fn is_date(value: &str) -> bool {
    DATE_REGEX.is_match(value)
        && NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|d| d.format("%Y-%m-%d").to_string() == value)
            .unwrap_or(false)
}

fn is_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| u.has_host() && !u.scheme().is_empty())
        .unwrap_or(false)
}

fn is_duration(value: &str) -> bool {
    // The grammar alone accepts the bare designators "P" and "P..T"
    DURATION_REGEX.is_match(value) && value != "P" && !value.ends_with('T')
}

/// Detect the format of a string value
///
/// Checks run in a fixed order and the first match wins, so a value is
/// never labelled with more than one format.
pub fn detect_format(value: &str) -> Option<Format> {
    if value.is_empty() {
        return None;
    }

    if is_date(value) {
        return Some(Format::Date);
    }

    if DATETIME_T_REGEX.is_match(value) || DATETIME_SPACE_REGEX.is_match(value) {
        return Some(Format::DateTime);
    }

    if UUID_REGEX.is_match(value) {
        return Some(Format::Uuid);
    }

    if EMAIL_REGEX.is_match(value) {
        return Some(Format::Email);
    }

    if is_url(value) {
        return Some(Format::Url);
    }

    if TIME_REGEX.is_match(value) {
        return Some(Format::Time);
    }

    if is_duration(value) {
        return Some(Format::Duration);
    }

    if COLOR_REGEX.is_match(value) {
        return Some(Format::Color);
    }

    if HOSTNAME_REGEX.is_match(value) {
        return Some(Format::Hostname);
    }

    if value.parse::<Ipv4Addr>().is_ok() {
        return Some(Format::Ipv4);
    }

    if value.parse::<Ipv6Addr>().is_ok() {
        return Some(Format::Ipv6);
    }

    None
}
