//! `FuzzEngine`: the top-level control loop — corpus, cumulative feedback
//! state, the harvested-ID table, and the one-way exploration→mutation state
//! machine described in spec §4.8.

pub mod corpus;
pub mod signature;

use std::collections::{BTreeSet, HashSet};
use std::time::{Duration, Instant};

use crate::dependency::{resolve_dependencies, DynamicIdTable};
use crate::feedback::{calculate_diversity, calculate_tcl_score, extract_seq_coverage, Coverage};
use crate::harvest::extract_ids;
use crate::mutation::{deep_mutation, mutate_request};
use crate::report::{classify_sequence, BugFinding, ReportSink};
use crate::request::build_request;
use crate::rng::FuzzRng;
use crate::selector;
use crate::sender::{FuzzRequest, FuzzResponse, RequestSender};
use crate::spec::SpecModel;

pub use self::corpus::TestEntry;
pub use self::signature::Signature;

/// Number of consecutive duplicate-signature or non-improving iterations
/// before the engine gives up on exploration and switches to mutation mode.
pub const STAGNATION_WINDOW: f64 = 25.0;

/// Probability that exploration replaces a freshly built request with a
/// random shallow mutant of itself before sending.
pub const MUTATION_PROBABILITY: f64 = 0.4;

/// Consecutive `NoCompatibleEndpoint` failures before exploration falls back
/// to starting a fresh sequence from a random unused endpoint.
const NO_COMPATIBLE_LIMIT: u32 = 5;

/// The engine's current exploration strategy.
///
/// The transition from `Exploration` to `Mutation` is one-way for the
/// remainder of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Extending sequences with compatible next endpoints, gated by
    /// signature novelty and cumulative-score progress.
    Exploration,
    /// Deep-mutating an existing sequence's bodies, unconditionally.
    Mutation,
}

/// The stateful fuzzing control loop.
///
/// Owns the corpus, the harvested dynamic-ID table, cumulative coverage,
/// the seen-fields and seen-signatures sets, and the single RNG every
/// stochastic step in the engine draws from.
pub struct FuzzEngine {
    spec: SpecModel,
    dynamic_param_names: BTreeSet<String>,
    corpus: Vec<TestEntry>,
    dynamic_ids: DynamicIdTable,
    cumulative: Coverage,
    seen_fields: BTreeSet<String>,
    seen_signatures: HashSet<Signature>,
    mode: Mode,
    stagnation: f64,
    no_compatible_count: u32,
    last_total_score: f64,
    rng: FuzzRng,
}

impl FuzzEngine {
    /// Builds a new engine over `spec`, seeded from `rng_seed` for
    /// reproducible runs.
    #[must_use]
    pub fn new(spec: SpecModel, rng_seed: u64) -> Self {
        let dynamic_param_names = spec.dynamic_param_names();
        Self {
            spec,
            dynamic_param_names,
            corpus: Vec::new(),
            dynamic_ids: DynamicIdTable::new(),
            cumulative: Coverage::default(),
            seen_fields: BTreeSet::new(),
            seen_signatures: HashSet::new(),
            mode: Mode::Exploration,
            stagnation: 0.0,
            no_compatible_count: 0,
            last_total_score: 0.0,
            rng: FuzzRng::from_seed(rng_seed),
        }
    }

    /// The engine's current corpus.
    #[must_use]
    pub fn corpus(&self) -> &[TestEntry] {
        &self.corpus
    }

    /// The engine's current exploration/mutation mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Cumulative coverage accreted across every executed sequence so far.
    #[must_use]
    pub fn cumulative_coverage(&self) -> &Coverage {
        &self.cumulative
    }

    /// The harvested dynamic-ID table.
    #[must_use]
    pub fn dynamic_ids(&self) -> &DynamicIdTable {
        &self.dynamic_ids
    }

    /// Runs seed initialization, then iterates the exploration/mutation
    /// control loop until `budget` has elapsed, checked only between
    /// iterations (never mid-sequence).
    ///
    /// # Errors
    ///
    /// Propagates any error surfaced while building or resolving a request.
    /// Selector exhaustion (`EmptyCorpus`/`NoViableTests`) ends the run
    /// cleanly rather than propagating.
    pub async fn run(
        &mut self,
        sender: &dyn RequestSender,
        base_url: &str,
        auth_header: Option<(&str, &str)>,
        budget: Duration,
        report: &mut dyn ReportSink,
    ) -> Result<(), crate::error::FuzzError> {
        let deadline = Instant::now() + budget;

        self.initialize(sender, base_url, auth_header, report).await;

        while Instant::now() < deadline {
            let should_continue = match self.mode {
                Mode::Exploration => self.exploration_step(sender, base_url, auth_header, report).await,
                Mode::Mutation => self.mutation_step(sender, base_url, auth_header, report).await,
            };
            if !should_continue {
                break;
            }
        }

        report.finish();
        Ok(())
    }

    /// Builds and sends one request per seed endpoint, seeding the corpus.
    async fn initialize(
        &mut self,
        sender: &dyn RequestSender,
        base_url: &str,
        auth_header: Option<(&str, &str)>,
        report: &mut dyn ReportSink,
    ) {
        let seed_indices = selector::choose_seed_indices(self.spec.endpoints());

        for index in seed_indices {
            let endpoint = self.spec.endpoints()[index].clone();
            let request = build_request(&endpoint, &mut self.rng);
            let resolved = resolve_dependencies(&request, &self.dynamic_ids, &mut self.rng);
            self.execute_and_record(vec![resolved], sender, base_url, auth_header, report).await;
        }
    }

    /// One exploration iteration. Returns `false` iff the run should stop
    /// (the corpus/selector is exhausted).
    async fn exploration_step(
        &mut self,
        sender: &dyn RequestSender,
        base_url: &str,
        auth_header: Option<(&str, &str)>,
        report: &mut dyn ReportSink,
    ) -> bool {
        let base_index = match selector::select_test(&self.corpus, &mut self.rng) {
            Ok(index) => index,
            Err(_) => return false,
        };

        let extended_sequence = match self.next_sequence(base_index) {
            Some(sequence) => sequence,
            None => return true,
        };

        let signature = signature::sequence_signature(&extended_sequence);
        let cumulative_tcl = calculate_tcl_score(&self.cumulative, self.spec.spec_info());

        let is_duplicate = self.seen_signatures.contains(&signature);
        if is_duplicate {
            self.stagnation += 1.0;
        } else if cumulative_tcl <= self.last_total_score {
            self.stagnation += 0.2;
            self.seen_signatures.insert(signature);
        } else {
            self.stagnation = 0.0;
            self.seen_signatures.insert(signature);
        }
        self.last_total_score = cumulative_tcl;

        if self.stagnation >= STAGNATION_WINDOW {
            self.mode = Mode::Mutation;
            return true;
        }

        if is_duplicate {
            return true;
        }

        self.execute_and_record(extended_sequence, sender, base_url, auth_header, report).await;
        true
    }

    /// Extends the sequence at `base_index` with a compatible next request,
    /// or falls back to a fresh unused-endpoint sequence after enough
    /// consecutive `NoCompatibleEndpoint` failures. Returns `None` to mean
    /// "skip this iteration, nothing to send".
    fn next_sequence(&mut self, base_index: usize) -> Option<Vec<FuzzRequest>> {
        let base_sequence = self.corpus[base_index].sequence.clone();

        match selector::choose_compatible_endpoint(&base_sequence, self.spec.endpoints(), &self.dynamic_ids) {
            Ok(endpoint_index) => {
                self.no_compatible_count = 0;
                let endpoint = self.spec.endpoints()[endpoint_index].clone();
                let mut request = build_request(&endpoint, &mut self.rng);

                if self.rng.uniform() < MUTATION_PROBABILITY {
                    if let Some(schema) = &endpoint.request_body {
                        let variants = mutate_request(&request, schema, &mut self.rng);
                        if let Some(chosen) = self.rng.choose(&variants) {
                            request = chosen.clone();
                        }
                    }
                }

                let resolved = resolve_dependencies(&request, &self.dynamic_ids, &mut self.rng);
                let mut extended = base_sequence;
                extended.push(resolved);
                Some(extended)
            }
            Err(_) => {
                self.no_compatible_count += 1;
                if self.no_compatible_count < NO_COMPATIBLE_LIMIT {
                    return None;
                }
                self.no_compatible_count = 0;

                let covered_templates: HashSet<&str> = self
                    .spec
                    .endpoints()
                    .iter()
                    .filter(|endpoint| {
                        self.corpus.iter().flat_map(|entry| entry.sequence.iter()).any(|request| {
                            crate::feedback::match_path(request.path_without_query(), &endpoint.path)
                        })
                    })
                    .map(|endpoint| endpoint.path.as_str())
                    .collect();

                let candidates: Vec<usize> = self
                    .spec
                    .endpoints()
                    .iter()
                    .enumerate()
                    .filter(|(_, endpoint)| !covered_templates.contains(endpoint.path.as_str()))
                    .map(|(index, _)| index)
                    .collect();

                let endpoint_index = *self.rng.choose(&candidates)?;
                let endpoint = self.spec.endpoints()[endpoint_index].clone();
                let request = build_request(&endpoint, &mut self.rng);
                let resolved = resolve_dependencies(&request, &self.dynamic_ids, &mut self.rng);
                Some(vec![resolved])
            }
        }
    }

    /// One mutation-mode iteration: always sends, no compatibility check,
    /// no signature gating.
    async fn mutation_step(
        &mut self,
        sender: &dyn RequestSender,
        base_url: &str,
        auth_header: Option<(&str, &str)>,
        report: &mut dyn ReportSink,
    ) -> bool {
        let base_index = match selector::select_test(&self.corpus, &mut self.rng) {
            Ok(index) => index,
            Err(_) => return false,
        };

        let base_sequence = self.corpus[base_index].sequence.clone();
        let mutated = deep_mutation(&base_sequence, self.spec.endpoints(), &mut self.rng);
        self.execute_and_record(mutated, sender, base_url, auth_header, report).await;
        true
    }

    /// Sends `sequence` strictly in order, then runs the full feedback
    /// pipeline: bug classification, cumulative coverage, seen-fields,
    /// TCL/diversity scoring, ID harvesting, and corpus append.
    async fn execute_and_record(
        &mut self,
        sequence: Vec<FuzzRequest>,
        sender: &dyn RequestSender,
        base_url: &str,
        auth_header: Option<(&str, &str)>,
        report: &mut dyn ReportSink,
    ) {
        let mut responses = Vec::with_capacity(sequence.len());
        for request in &sequence {
            responses.push(sender.send(request, base_url, auth_header).await);
        }

        report.record_iteration(&sequence, &responses);

        let findings: Vec<BugFinding> =
            classify_sequence(&sequence, &responses, self.spec.endpoints(), self.spec.spec_info());
        if !findings.is_empty() {
            report.record_bugs(&findings);
        }

        let seq_coverage = extract_seq_coverage(&sequence, &responses);
        self.cumulative.merge(&seq_coverage);
        let tcl = calculate_tcl_score(&seq_coverage, self.spec.spec_info());

        let (diversity, new_fields) = match responses.last() {
            Some(last) => calculate_diversity(last, &self.seen_fields),
            None => (0.0, BTreeSet::new()),
        };
        self.seen_fields.extend(new_fields);

        for response in &responses {
            let harvested = extract_ids(&response.body, &self.dynamic_param_names);
            for (token, values) in harvested {
                self.dynamic_ids.entry(token).or_default().extend(values);
            }
        }

        self.corpus.push(TestEntry { sequence, responses, tcl, diversity });
    }
}
