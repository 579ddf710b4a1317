//! Shallow, single-field body mutation: every variant differs from the
//! original request in exactly one body field.

use serde_json::Value;

use crate::request::generate_example_value;
use crate::rng::FuzzRng;
use crate::sender::FuzzRequest;
use crate::spec::RequestBodySchema;

/// Produces one variant per existing body field (value replaced by
/// [`mutate_value`]) plus one variant per not-yet-present optional schema
/// property (added with a fresh example value).
///
/// Returns `vec![request.clone()]` unchanged if the body is absent, not an
/// object, or empty — there is nothing to mutate.
#[must_use]
pub fn mutate_request(
    request: &FuzzRequest,
    schema: &RequestBodySchema,
    rng: &mut FuzzRng,
) -> Vec<FuzzRequest> {
    let Some(Value::Object(original_body)) = &request.body else {
        return vec![request.clone()];
    };
    if original_body.is_empty() {
        return vec![request.clone()];
    }

    let mut variants = Vec::new();

    for field in original_body.keys() {
        let mut mutated = original_body.clone();
        if let Some(value) = mutated.get(field).cloned() {
            mutated.insert(field.clone(), mutate_value(&value, rng));
        }
        variants.push(with_body(request, Value::Object(mutated)));
    }

    let required: std::collections::HashSet<&str> =
        schema.required.iter().map(String::as_str).collect();
    for (field, definition) in &schema.properties {
        if original_body.contains_key(field) || required.contains(field.as_str()) {
            continue;
        }
        if let Some(example_value) = generate_example_value(definition, rng) {
            let mut mutated = original_body.clone();
            mutated.insert(field.clone(), example_value);
            variants.push(with_body(request, Value::Object(mutated)));
        }
    }

    variants
}

fn with_body(request: &FuzzRequest, body: Value) -> FuzzRequest {
    FuzzRequest {
        body: Some(body),
        ..request.clone()
    }
}

/// Mutates a single JSON value into a boundary/edge variant based on its
/// runtime type. Objects, null, and anything else are returned unchanged.
#[must_use]
pub fn mutate_value(value: &Value, rng: &mut FuzzRng) -> Value {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            let v = n.as_i64().unwrap_or_else(|| n.as_u64().unwrap_or(0) as i64);
            let options = [0, -1, v.wrapping_add(1), v.wrapping_sub(1), 999_999];
            rng.choose(&options).copied().map(Value::from).unwrap_or(value.clone())
        }
        Value::Number(n) if n.is_f64() => {
            let v = n.as_f64().unwrap_or(0.0);
            let options = [0.0, -1.1, v * 2.0, 99_999.99];
            rng.choose(&options)
                .copied()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(value.clone())
        }
        Value::String(s) => {
            let triple = format!("{s}\n{s}\n{s}");
            let mutated = s.clone() + "_mutated";
            let random = rng.random_string(50);
            let options = ["".to_string(), mutated, triple, random];
            rng.choose(&options).cloned().map(Value::String).unwrap_or_else(|| value.clone())
        }
        Value::Bool(b) => Value::Bool(!b),
        Value::Array(items) => {
            let mut doubled = items.clone();
            doubled.extend(items.iter().cloned());
            Value::Array(doubled)
        }
        _ => value.clone(),
    }
}
