//! String pattern detection
//!
//! Unlike formats, any number of patterns can hold for one value: `"42"` is
//! both an integer string and nothing else, while `"user_id"` is snake_case.
//! Integer, float and boolean patterns feed type recommendation; the rest only
//! surface as pattern suggestions.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A recognised shape of a string value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringPattern {
    IntegerString,
    FloatString,
    BooleanString,
    CamelCase,
    PascalCase,
    SnakeCase,
    ScreamingSnakeCase,
    Filename,
    Path,
}

const BOOLEAN_TOKENS: &[&str] = &["true", "false", "yes", "no", "on", "off"];

const INTEGER_PATTERN: &str = r"^-?\d+$";
const FLOAT_PATTERN: &str = r"^-?\d+\.\d+$";
const BOOLEAN_PATTERN: &str = r"^(?i:true|false|yes|no|on|off)$";
const CAMEL_PATTERN: &str = r"^[a-z][a-z0-9]*(?:[A-Z][a-z0-9]*)+$";
const PASCAL_PATTERN: &str = r"^[A-Z][a-z0-9]+(?:[A-Z][a-z0-9]*)*$";
const SNAKE_PATTERN: &str = r"^[a-z][a-z0-9]*(?:_[a-z0-9]+)+$";
const SCREAMING_SNAKE_PATTERN: &str = r"^[A-Z][A-Z0-9]*(?:_[A-Z0-9]+)+$";
const FILENAME_PATTERN: &str = r"^[\w\-. ]+\.[A-Za-z][A-Za-z0-9]{0,4}$";
const PATH_PATTERN: &str = r"^(?:~|\.{1,2})?/(?:[\w.\-]+/?)*$|^[\w.\-]+(?:/[\w.\-]+)+/?$";

static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(INTEGER_PATTERN).unwrap());
static FLOAT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(FLOAT_PATTERN).unwrap());
static CAMEL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(CAMEL_PATTERN).unwrap());
static PASCAL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(PASCAL_PATTERN).unwrap());
static SNAKE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(SNAKE_PATTERN).unwrap());
static SCREAMING_SNAKE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(SCREAMING_SNAKE_PATTERN).unwrap());
static FILENAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(FILENAME_PATTERN).unwrap());
static PATH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(PATH_PATTERN).unwrap());

impl StringPattern {
    /// Regular expression proposed as a `pattern` constraint
    pub fn regex(&self) -> &'static str {
        match self {
            StringPattern::IntegerString => INTEGER_PATTERN,
            StringPattern::FloatString => FLOAT_PATTERN,
            StringPattern::BooleanString => BOOLEAN_PATTERN,
            StringPattern::CamelCase => CAMEL_PATTERN,
            StringPattern::PascalCase => PASCAL_PATTERN,
            StringPattern::SnakeCase => SNAKE_PATTERN,
            StringPattern::ScreamingSnakeCase => SCREAMING_SNAKE_PATTERN,
            StringPattern::Filename => FILENAME_PATTERN,
            StringPattern::Path => PATH_PATTERN,
        }
    }
}

impl std::fmt::Display for StringPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StringPattern::IntegerString => "integer-string",
            StringPattern::FloatString => "float-string",
            StringPattern::BooleanString => "boolean-string",
            StringPattern::CamelCase => "camel-case",
            StringPattern::PascalCase => "pascal-case",
            StringPattern::SnakeCase => "snake-case",
            StringPattern::ScreamingSnakeCase => "screaming-snake-case",
            StringPattern::Filename => "filename",
            StringPattern::Path => "path",
        };
        write!(f, "{}", name)
    }
}

/// Detect every pattern a string value matches
pub fn detect_patterns(value: &str) -> BTreeSet<StringPattern> {
    let mut patterns = BTreeSet::new();
    if value.is_empty() {
        return patterns;
    }

    if INTEGER_REGEX.is_match(value) {
        patterns.insert(StringPattern::IntegerString);
    }
    if FLOAT_REGEX.is_match(value) {
        patterns.insert(StringPattern::FloatString);
    }
    // "1" and "0" stay integer strings
    if BOOLEAN_TOKENS
        .iter()
        .any(|token| value.eq_ignore_ascii_case(token))
    {
        patterns.insert(StringPattern::BooleanString);
    }
    if CAMEL_REGEX.is_match(value) {
        patterns.insert(StringPattern::CamelCase);
    }
    if PASCAL_REGEX.is_match(value) {
        patterns.insert(StringPattern::PascalCase);
    }
    if SNAKE_REGEX.is_match(value) {
        patterns.insert(StringPattern::SnakeCase);
    }
    if SCREAMING_SNAKE_REGEX.is_match(value) {
        patterns.insert(StringPattern::ScreamingSnakeCase);
    }
    if FILENAME_REGEX.is_match(value) {
        patterns.insert(StringPattern::Filename);
    }
    if PATH_REGEX.is_match(value) {
        patterns.insert(StringPattern::Path);
    }

    patterns
}
