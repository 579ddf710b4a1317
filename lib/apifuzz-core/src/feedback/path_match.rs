//! Path-template matching: lets path/operation coverage credit a concrete
//! request like `/posts/123` against the spec template `/posts/{postId}`
//! without round-tripping through a regex engine.

use std::collections::BTreeSet;

/// True iff `concrete` and `template` have the same segment count and every
/// non-placeholder segment matches literally.
///
/// A template segment is a placeholder iff it starts with `{` and ends with
/// `}`; any such segment matches any concrete value.
#[must_use]
pub fn match_path(concrete: &str, template: &str) -> bool {
    let concrete_parts: Vec<&str> = concrete.trim_matches('/').split('/').collect();
    let template_parts: Vec<&str> = template.trim_matches('/').split('/').collect();

    if concrete_parts.len() != template_parts.len() {
        return false;
    }

    concrete_parts
        .iter()
        .zip(template_parts.iter())
        .all(|(concrete_segment, template_segment)| {
            let is_placeholder =
                template_segment.starts_with('{') && template_segment.ends_with('}');
            is_placeholder || concrete_segment == template_segment
        })
}

/// For every concrete path actually covered, finds every spec template it
/// matches and returns the set of matched templates.
///
/// Used to credit path coverage against the dynamic-id-bearing templates a
/// harvested id resolves to, not just paths seen verbatim.
#[must_use]
pub fn match_paths_with_dependencies(
    concrete_paths: &BTreeSet<String>,
    spec_paths: &BTreeSet<String>,
) -> BTreeSet<String> {
    let mut matched = BTreeSet::new();
    for concrete in concrete_paths {
        for template in spec_paths {
            if match_path(concrete, template) {
                matched.insert(template.clone());
            }
        }
    }
    matched
}

/// As [`match_paths_with_dependencies`], but pairs the path match with an
/// exact method match.
#[must_use]
pub fn match_operations_with_dependencies(
    actual_ops: &BTreeSet<(String, String)>,
    spec_ops: &BTreeSet<(String, String)>,
) -> BTreeSet<(String, String)> {
    let mut matched = BTreeSet::new();
    for (method, concrete_path) in actual_ops {
        for (spec_method, spec_path) in spec_ops {
            if method == spec_method && match_path(concrete_path, spec_path) {
                matched.insert((spec_method.clone(), spec_path.clone()));
            }
        }
    }
    matched
}
