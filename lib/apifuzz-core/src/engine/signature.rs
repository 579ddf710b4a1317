//! Sequence signatures: the `(method, normalized path)` tuple list used to
//! detect structurally duplicate sequences and drive the stagnation counter.

use crate::sender::FuzzRequest;

/// A structural fingerprint of a sequence: one `(method, normalized path)`
/// pair per request.
pub type Signature = Vec<(String, String)>;

/// Normalizes a single path segment: a segment that is all-digits, or
/// contains any character that isn't an ASCII-lowercase letter or digit,
/// becomes the literal placeholder `{param}`; a purely lowercase-alphanumeric
/// segment (including a mix of letters and digits, so long as it isn't
/// *all* digits) is left as-is.
///
/// This is deliberately idiosyncratic — it's inherited from the source this
/// behavior was distilled from, not a general-purpose template matcher —
/// but it is idempotent: normalizing an already-normalized segment is a
/// no-op, since `{param}` itself contains non-lowercase characters.
#[must_use]
pub fn normalize_path_segment(segment: &str) -> String {
    if segment.is_empty() {
        return segment.to_string();
    }

    let all_digits = segment.chars().all(|c| c.is_ascii_digit());
    let has_non_lowercase_alnum = segment
        .chars()
        .any(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit()));

    if all_digits || has_non_lowercase_alnum {
        "{param}".to_string()
    } else {
        segment.to_string()
    }
}

/// Normalizes every segment of a path independently.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let stripped = path.trim_start_matches('/');
    let normalized: Vec<String> = stripped.split('/').map(normalize_path_segment).collect();
    format!("/{}", normalized.join("/"))
}

/// Computes the structural signature of a sequence: one `(method,
/// normalized path)` pair per request, in order.
#[must_use]
pub fn sequence_signature(sequence: &[FuzzRequest]) -> Signature {
    sequence
        .iter()
        .map(|request| (request.method.clone(), normalize_path(request.path_without_query())))
        .collect()
}
