//! Schema-driven example value generation, shared by the request builder
//! and the mutator's optional-field injection.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::rng::FuzzRng;

const DEFAULT_INT_MIN: i64 = 0;
const DEFAULT_INT_MAX: i64 = 9_999_999_999;
const DEFAULT_NUM_MIN: f64 = 0.0;
const DEFAULT_NUM_MAX: f64 = 9_999_999.99;

/// Generates a value conforming to `schema`, recursing into `properties`
/// and `items`.
///
/// Returns `None` only when the caller should omit the field entirely —
/// currently this never happens at the top level (every branch produces a
/// value), but nested `object` properties that themselves resolve to
/// `None` are dropped rather than inserted as `null`.
#[must_use]
pub fn generate_example_value(schema: &Value, rng: &mut FuzzRng) -> Option<Value> {
    if let Some(example) = schema.get("example") {
        return Some(example.clone());
    }

    match schema.get("type").and_then(Value::as_str) {
        Some("string") => Some(Value::String(generate_string_example(schema, rng))),
        Some("integer") => Some(Value::from(generate_integer_example(schema))),
        Some("number") => Some(
            serde_json::Number::from_f64(generate_number_example(schema))
                .map_or(Value::Null, Value::Number),
        ),
        Some("boolean") => Some(Value::Bool(true)),
        Some("array") => {
            let items_schema = schema.get("items").cloned().unwrap_or(Value::Object(Map::new()));
            let item = generate_example_value(&items_schema, rng);
            Some(Value::Array(item.into_iter().collect()))
        }
        Some("object") => {
            let mut object = Map::new();
            if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                for (name, property_schema) in properties {
                    if let Some(value) = generate_example_value(property_schema, rng) {
                        object.insert(name.clone(), value);
                    }
                }
            }
            Some(Value::Object(object))
        }
        _ => Some(Value::String("fallback".to_string())),
    }
}

fn generate_string_example(schema: &Value, rng: &mut FuzzRng) -> String {
    if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
        return generate_matching_string(pattern, rng);
    }
    match schema.get("format").and_then(Value::as_str) {
        Some("email") => "user@example.com".to_string(),
        Some("date") => "2025-01-01".to_string(),
        Some("date-time") => "2025-01-01T00:00:00Z".to_string(),
        _ => "example-string".to_string(),
    }
}

fn generate_integer_example(schema: &Value) -> i64 {
    let minimum = schema.get("minimum").and_then(Value::as_i64).unwrap_or(DEFAULT_INT_MIN);
    let maximum = schema.get("maximum").and_then(Value::as_i64).unwrap_or(DEFAULT_INT_MAX);
    123.max(minimum).min(maximum)
}

fn generate_number_example(schema: &Value) -> f64 {
    let minimum = schema.get("minimum").and_then(Value::as_f64).unwrap_or(DEFAULT_NUM_MIN);
    let maximum = schema.get("maximum").and_then(Value::as_f64).unwrap_or(DEFAULT_NUM_MAX);
    let clamped = 123.45_f64.max(minimum).min(maximum);
    (clamped * 100.0).round() / 100.0
}

static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
static BARE_DIGIT_BRACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d\{\d+,\d+\}$").expect("valid regex"));
static ANCHORED_DIGIT_BRACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\^\\d\{(\d+),?(\d*)\}\$$").expect("valid regex"));

/// Generates a digit string matching one of two recognized pattern shapes,
/// falling back to a fixed digit string or the literal `"example"`.
///
/// Recognizes `\d{m,n}`-shaped literals (via a leading-digit heuristic
/// inherited from the source this was ported from — it rarely fires on
/// real-world patterns) and the far more common `^\d{m,n}$` anchored form.
/// Any other pattern starting with `^\d` gets a fixed 6-digit string;
/// anything else falls back to `"example"`.
#[must_use]
pub fn generate_matching_string(pattern: &str, rng: &mut FuzzRng) -> String {
    if BARE_DIGIT_BRACE_RE.is_match(pattern) {
        let digits: Vec<usize> = DIGIT_RUN_RE
            .find_iter(pattern)
            .filter_map(|m| m.as_str().parse().ok())
            .collect();
        if let [min_len, max_len] = digits[..] {
            let length = rng.range_inclusive(min_len, max_len);
            return rng.random_digits(length);
        }
    }

    if let Some(caps) = ANCHORED_DIGIT_BRACE_RE.captures(pattern) {
        let min_digits: usize = caps[1].parse().unwrap_or(0);
        let max_group = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let max_digits: usize = if max_group.is_empty() {
            min_digits
        } else {
            max_group.parse().unwrap_or(min_digits)
        };
        let length = rng.range_inclusive(min_digits, max_digits);
        return rng.random_digits(length);
    }

    if pattern.starts_with("^\\d") {
        return "123456".to_string();
    }

    "example".to_string()
}
