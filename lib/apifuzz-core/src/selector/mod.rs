//! Test and endpoint selection: ε-greedy corpus sampling, compatible-endpoint
//! ranking, and seed classification.

use std::collections::HashSet;

use crate::dependency::{has_matching_id, DynamicIdTable};
use crate::engine::corpus::TestEntry;
use crate::error::FuzzError;
use crate::feedback::match_path;
use crate::rng::FuzzRng;
use crate::sender::FuzzRequest;
use crate::spec::Endpoint;

/// A corpus entry longer than this is ineligible to be picked as a base for
/// further extension (it may still be extended *into*, just not selected
/// *from* again).
pub const MAX_SEQUENCE_LENGTH: usize = 8;

/// Probability of an ε-greedy uniform pick over the weighted score pick.
pub const EPSILON: f64 = 0.2;

/// Selector scoring weights: `score = α·tcl + β·diversity − γ·length`.
pub const ALPHA: f64 = 1.0;
/// See [`ALPHA`].
pub const BETA: f64 = 1.0;
/// See [`ALPHA`].
pub const GAMMA: f64 = 0.3;

/// No entry's weighted-selection score is allowed to drop below this floor,
/// so a long, low-coverage entry still has a nonzero chance of extension.
pub const SCORE_FLOOR: f64 = 0.01;

/// The number of fallback seed endpoints picked when no endpoint qualifies
/// as a true seed (see [`is_seed_endpoint`]).
const FALLBACK_SEED_COUNT: usize = 3;

/// ε-greedy selection of a base test to extend.
///
/// # Errors
///
/// Returns [`FuzzError::EmptyCorpus`] if `corpus` is empty, or
/// [`FuzzError::NoViableTests`] if every entry is already at or past
/// [`MAX_SEQUENCE_LENGTH`].
pub fn select_test(corpus: &[TestEntry], rng: &mut FuzzRng) -> Result<usize, FuzzError> {
    if corpus.is_empty() {
        return Err(FuzzError::EmptyCorpus);
    }

    let viable: Vec<usize> = corpus
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.sequence.len() < MAX_SEQUENCE_LENGTH)
        .map(|(index, _)| index)
        .collect();

    if viable.is_empty() {
        return Err(FuzzError::NoViableTests);
    }

    if rng.uniform() < EPSILON {
        return Ok(*rng.choose(&viable).unwrap_or(&viable[0]));
    }

    let weights: Vec<f64> = viable
        .iter()
        .map(|&index| {
            let entry = &corpus[index];
            let raw = ALPHA * entry.tcl + BETA * entry.diversity - GAMMA * entry.sequence.len() as f64;
            raw.max(SCORE_FLOOR)
        })
        .collect();

    let picked = rng.weighted_index(&weights);
    Ok(viable[picked])
}

/// True iff `endpoint` needs no dynamic state to call: no required path
/// parameters, and no required header other than `content-type`/`accept`.
#[must_use]
pub fn is_seed_endpoint(endpoint: &Endpoint) -> bool {
    let no_required_path_params = endpoint.path_params().all(|p| !p.required);
    let no_required_headers = endpoint
        .header_params()
        .filter(|p| p.required)
        .all(|p| p.name.eq_ignore_ascii_case("content-type") || p.name.eq_ignore_ascii_case("accept"));
    no_required_path_params && no_required_headers
}

/// Indices of the endpoints to seed the corpus with.
///
/// Prefers every true [`is_seed_endpoint`]; if none qualify, falls back to
/// the [`FALLBACK_SEED_COUNT`] endpoints with the fewest required path
/// parameters (ties broken by document order via a stable sort).
#[must_use]
pub fn choose_seed_indices(endpoints: &[Endpoint]) -> Vec<usize> {
    let seeds: Vec<usize> = endpoints
        .iter()
        .enumerate()
        .filter(|(_, endpoint)| is_seed_endpoint(endpoint))
        .map(|(index, _)| index)
        .collect();

    if !seeds.is_empty() {
        return seeds;
    }

    let mut by_required_path_params: Vec<usize> = (0..endpoints.len()).collect();
    by_required_path_params.sort_by_key(|&index| {
        endpoints[index].path_params().filter(|p| p.required).count()
    });
    by_required_path_params.truncate(FALLBACK_SEED_COUNT);
    by_required_path_params
}

/// Ranks a candidate next endpoint against the endpoint the base sequence
/// is currently anchored on.
#[must_use]
pub fn score_candidate(base: &Endpoint, candidate: &Endpoint) -> i32 {
    let mut score = 0;

    if candidate.path == base.path {
        score += 3;
    } else if candidate.path.starts_with(&format!("{}/", base.path)) {
        score += 2;
    } else if first_segment(&candidate.path) == first_segment(&base.path) {
        score += 1;
    }

    if candidate.method != base.method {
        score += 1;
    }

    score
}

fn first_segment(path: &str) -> &str {
    path.trim_start_matches('/').split('/').next().unwrap_or("")
}

fn find_endpoint_for_request<'a>(request: &FuzzRequest, endpoints: &'a [Endpoint]) -> Option<&'a Endpoint> {
    let path = request.path_without_query();
    endpoints
        .iter()
        .find(|ep| ep.method.eq_ignore_ascii_case(&request.method) && match_path(path, &ep.path))
}

/// Picks the index of the best next endpoint to extend `sequence` with.
///
/// A candidate is compatible iff its `(method, path)` isn't already used
/// anywhere in `sequence`, and every required path/header parameter it
/// declares has a matching entry in `table` (the §4.3 prefix/suffix rule).
/// Among compatible candidates, the highest-scoring one (via
/// [`score_candidate`], anchored on the endpoint of the sequence's last
/// request) wins; ties go to the first in enumeration order.
///
/// # Errors
///
/// Returns [`FuzzError::NoCompatibleEndpoint`] if no endpoint qualifies.
pub fn choose_compatible_endpoint(
    sequence: &[FuzzRequest],
    endpoints: &[Endpoint],
    table: &DynamicIdTable,
) -> Result<usize, FuzzError> {
    let used: HashSet<(String, String)> = sequence
        .iter()
        .filter_map(|request| find_endpoint_for_request(request, endpoints))
        .map(|ep| (ep.method.clone(), ep.path.clone()))
        .collect();

    let anchor = sequence
        .last()
        .and_then(|request| find_endpoint_for_request(request, endpoints));

    let mut best: Option<(usize, i32)> = None;

    for (index, candidate) in endpoints.iter().enumerate() {
        if used.contains(&(candidate.method.clone(), candidate.path.clone())) {
            continue;
        }

        let path_params_satisfied = candidate
            .path_params()
            .filter(|p| p.required)
            .all(|p| has_matching_id(&p.name, table));
        let header_params_satisfied = candidate
            .header_params()
            .filter(|p| p.required)
            .all(|p| has_matching_id(&p.name, table));
        if !path_params_satisfied || !header_params_satisfied {
            continue;
        }

        let score = anchor.map_or(0, |anchor| score_candidate(anchor, candidate));
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }

    best.map(|(index, _)| index).ok_or(FuzzError::NoCompatibleEndpoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::FuzzResponse;
    use crate::spec::{Parameter, ParameterLocation};
    use indexmap::{IndexMap, IndexSet};

    fn endpoint(path: &str, method: &str, path_param_required: bool) -> Endpoint {
        Endpoint {
            path: path.to_string(),
            method: method.to_string(),
            parameters: if path.contains('{') {
                vec![Parameter {
                    name: "id".to_string(),
                    location: ParameterLocation::Path,
                    required: path_param_required,
                    schema: serde_json::json!({"type": "string"}),
                }]
            } else {
                Vec::new()
            },
            request_body: None,
            request_body_content_types: Vec::new(),
            responses: indexmap::IndexMap::new(),
        }
    }

    fn request(method: &str, url: &str) -> FuzzRequest {
        FuzzRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: IndexMap::new(),
            body: None,
            parameters: Vec::new(),
        }
    }

    fn entry(sequence: Vec<FuzzRequest>, tcl: f64, diversity: f64) -> TestEntry {
        let responses = sequence
            .iter()
            .map(|_| FuzzResponse { status: 200, body: "{}".to_string(), headers: IndexMap::new() })
            .collect();
        TestEntry { sequence, responses, tcl, diversity }
    }

    #[test]
    fn test_select_test_empty_corpus_errors() {
        let mut rng = FuzzRng::from_seed(1);
        assert!(matches!(select_test(&[], &mut rng), Err(FuzzError::EmptyCorpus)));
    }

    #[test]
    fn test_select_test_no_viable_entries_errors() {
        let long_sequence = vec![request("GET", "/a"); MAX_SEQUENCE_LENGTH];
        let corpus = vec![entry(long_sequence, 1.0, 0.0)];
        let mut rng = FuzzRng::from_seed(1);
        assert!(matches!(select_test(&corpus, &mut rng), Err(FuzzError::NoViableTests)));
    }

    #[test]
    fn test_select_test_returns_viable_index() {
        let corpus = vec![entry(vec![request("GET", "/a")], 1.0, 0.0)];
        let mut rng = FuzzRng::from_seed(1);
        assert_eq!(select_test(&corpus, &mut rng).unwrap(), 0);
    }

    #[test]
    fn test_is_seed_endpoint_true_without_required_path_params() {
        assert!(is_seed_endpoint(&endpoint("/pets", "GET", false)));
    }

    #[test]
    fn test_is_seed_endpoint_false_with_required_path_param() {
        assert!(!is_seed_endpoint(&endpoint("/pets/{id}", "GET", true)));
    }

    #[test]
    fn test_choose_seed_indices_prefers_true_seeds() {
        let endpoints = vec![endpoint("/pets", "GET", false), endpoint("/pets/{id}", "GET", true)];
        assert_eq!(choose_seed_indices(&endpoints), vec![0]);
    }

    #[test]
    fn test_choose_seed_indices_falls_back_to_fewest_required_params() {
        let endpoints = vec![endpoint("/pets/{id}", "GET", true)];
        assert_eq!(choose_seed_indices(&endpoints), vec![0]);
    }

    #[test]
    fn test_score_candidate_same_path_scores_three() {
        let base = endpoint("/pets", "GET", false);
        let candidate = endpoint("/pets", "POST", false);
        assert_eq!(score_candidate(&base, &candidate), 3 + 1);
    }

    #[test]
    fn test_score_candidate_nested_path_scores_two() {
        let base = endpoint("/pets", "GET", false);
        let candidate = endpoint("/pets/{id}", "GET", true);
        assert_eq!(score_candidate(&base, &candidate), 2);
    }

    #[test]
    fn test_choose_compatible_endpoint_excludes_used_operations() {
        let endpoints = vec![endpoint("/pets", "GET", false)];
        let sequence = vec![request("GET", "/pets")];
        let table = IndexMap::new();
        assert!(matches!(
            choose_compatible_endpoint(&sequence, &endpoints, &table),
            Err(FuzzError::NoCompatibleEndpoint)
        ));
    }

    #[test]
    fn test_choose_compatible_endpoint_requires_satisfied_path_param() {
        let endpoints = vec![endpoint("/pets", "GET", false), endpoint("/pets/{id}", "GET", true)];
        let sequence = vec![request("GET", "/pets")];
        let table = IndexMap::new();
        assert!(matches!(
            choose_compatible_endpoint(&sequence, &endpoints, &table),
            Err(FuzzError::NoCompatibleEndpoint)
        ));
    }

    #[test]
    fn test_choose_compatible_endpoint_accepts_once_id_harvested() {
        let endpoints = vec![endpoint("/pets", "GET", false), endpoint("/pets/{id}", "GET", true)];
        let sequence = vec![request("GET", "/pets")];
        let mut table = IndexMap::new();
        let mut values = IndexSet::new();
        values.insert("1".to_string());
        table.insert("id".to_string(), values);
        assert_eq!(choose_compatible_endpoint(&sequence, &endpoints, &table).unwrap(), 1);
    }
}
