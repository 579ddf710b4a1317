//! Test Coverage Level scoring: the sum of partial coverage ratios across
//! six dimensions, used to pick which corpus entry mutation starts from.

use super::coverage::Coverage;
use super::path_match::{match_operations_with_dependencies, match_paths_with_dependencies};
use crate::spec::SpecInfo;

/// Sums the partial coverage ratio (matched / expected) across paths,
/// operations, parameters, status codes, response fields, and input content
/// types.
///
/// Paths and operations are matched against templated spec entries via
/// [`match_paths_with_dependencies`]/[`match_operations_with_dependencies`]
/// so a concrete `/posts/123` credits the `/posts/{postId}` dimension;
/// the remaining dimensions use plain set intersection. A dimension with an
/// empty expected set contributes nothing (not a perfect score), matching
/// the asymmetry in the ratio-of-non-empty-sets formula.
#[must_use]
pub fn calculate_tcl_score(coverage: &Coverage, spec_info: &SpecInfo) -> f64 {
    let mut score = 0.0;

    if !spec_info.paths.is_empty() {
        let matched = match_paths_with_dependencies(&coverage.paths, &spec_info.paths);
        score += matched.len() as f64 / spec_info.paths.len() as f64;
    }

    if !spec_info.operations.is_empty() {
        let matched =
            match_operations_with_dependencies(&coverage.operations, &spec_info.operations);
        score += matched.len() as f64 / spec_info.operations.len() as f64;
    }

    if !spec_info.parameters.is_empty() {
        let matched = coverage.parameters.intersection(&spec_info.parameters).count();
        score += matched as f64 / spec_info.parameters.len() as f64;
    }

    if !spec_info.status_codes.is_empty() {
        let matched = coverage.status_codes.intersection(&spec_info.status_codes).count();
        score += matched as f64 / spec_info.status_codes.len() as f64;
    }

    if !spec_info.response_fields.is_empty() {
        let matched = coverage
            .response_fields
            .intersection(&spec_info.response_fields)
            .count();
        score += matched as f64 / spec_info.response_fields.len() as f64;
    }

    if !spec_info.input_content_types.is_empty() {
        let matched = coverage
            .input_content_types
            .intersection(&spec_info.input_content_types)
            .count();
        score += matched as f64 / spec_info.input_content_types.len() as f64;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn single_path_spec() -> SpecInfo {
        let mut info = SpecInfo::default();
        info.paths.insert("/posts/{postId}".to_string());
        info.operations
            .insert(("GET".to_string(), "/posts/{postId}".to_string()));
        info
    }

    #[test]
    fn test_score_is_zero_for_empty_coverage() {
        let spec_info = single_path_spec();
        let coverage = Coverage::default();
        assert_eq!(calculate_tcl_score(&coverage, &spec_info), 0.0);
    }

    #[test]
    fn test_score_credits_templated_path_match() {
        let spec_info = single_path_spec();
        let mut coverage = Coverage::default();
        coverage.paths.insert("/posts/123".to_string());
        coverage
            .operations
            .insert(("GET".to_string(), "/posts/123".to_string()));
        assert_eq!(calculate_tcl_score(&coverage, &spec_info), 2.0);
    }

    #[test]
    fn test_empty_expected_dimension_contributes_nothing() {
        let mut spec_info = SpecInfo::default();
        spec_info.parameters = BTreeSet::new();
        spec_info.paths.insert("/a".to_string());
        let mut coverage = Coverage::default();
        coverage.paths.insert("/a".to_string());
        assert_eq!(calculate_tcl_score(&coverage, &spec_info), 1.0);
    }
}
