//! Sanitizers and value checks applied to submitted values.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)[^>]*?>.*?</(script|style)>")
        .expect("Failed to compile script/style regex")
});

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("Failed to compile tag regex"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

static INLINE_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("Failed to compile whitespace regex"));

static COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("Failed to compile color regex")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$",
    )
    .expect("Failed to compile email regex")
});

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?")
        .expect("Failed to compile number regex")
});

fn strip_tags(input: &str) -> String {
    let without_blocks = SCRIPT_STYLE.replace_all(input, "");
    TAG.replace_all(&without_blocks, "").into_owned()
}

/// Single-line plain text: tags removed, whitespace runs collapsed, trimmed.
pub fn sanitize_text(input: &str) -> String {
    WHITESPACE
        .replace_all(&strip_tags(input), " ")
        .trim()
        .to_string()
}

/// Plain text keeping line breaks.
pub fn sanitize_textarea(input: &str) -> String {
    let stripped = strip_tags(input).replace("\r\n", "\n").replace('\r', "\n");
    stripped
        .lines()
        .map(|line| INLINE_WHITESPACE.replace_all(line, " ").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// `#RGB` or `#RRGGBB`.
pub fn is_color(input: &str) -> bool {
    COLOR.is_match(input)
}

pub fn is_email(input: &str) -> bool {
    input.len() >= 6 && EMAIL.is_match(input)
}

/// Parse a submitted value as a float the way a lenient host would: the
/// leading numeric part of a string counts, anything else is `0`.
pub fn parse_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        Value::String(s) => LEADING_NUMBER
            .find(s)
            .and_then(|m| m.as_str().trim().parse::<f64>().ok())
            .unwrap_or(0.0),
        _ => 0.0,
    };
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// A float as a JSON number; integral values stay integers.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::from(0))
    }
}

/// Loose emptiness: null, `""`, `"0"`, `false`, zero, and empty lists or maps.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
