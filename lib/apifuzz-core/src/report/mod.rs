//! Bug classification and the `ReportSink` collaborator traits.
//!
//! Classification needs the normalized [`crate::spec::Endpoint`] list and
//! [`crate::spec::SpecInfo`] to know what a response *should* have looked
//! like, so it lives in the core crate; actually formatting and persisting
//! the grouped report and the iteration log is the host binary's job.

use crate::sender::{FuzzRequest, FuzzResponse};
use crate::spec::{Endpoint, SpecInfo};

/// The stack-trace substring markers carried over verbatim from the
/// prototype — Java-biased, and `"at "` is a broad substring that will
/// false-positive on ordinary prose. Preserved as-is, not fixed.
const STACK_TRACE_MARKERS: &[&str] = &["NullPointerException", "StackTrace", "java.lang", "at "];

/// Status codes that legitimately carry no body, excluded from the
/// `empty_body` bug category.
const NO_BODY_STATUSES: &[u16] = &[204, 205, 304];

/// One of the five bug categories a response can be grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BugCategory {
    /// The response status code is not among the endpoint's declared
    /// responses.
    StatusCode,
    /// A 5xx response.
    ServerError,
    /// The body contains a stack-trace-shaped substring.
    StackTrace,
    /// The spec promises a body for this status but the response body is
    /// blank, and the status isn't one of the no-body exceptions.
    EmptyBody,
    /// A 2xx response whose `Content-Type` is not `application/json`.
    InvalidContentType,
}

/// A single classified anomaly, carrying enough context to format a report
/// line without re-deriving it from the raw request/response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugFinding {
    /// Which bucket this finding belongs to.
    pub category: BugCategory,
    /// The request's HTTP method.
    pub method: String,
    /// The request's URL (post-resolution, so no `{…}` placeholders).
    pub url: String,
    /// The response status code observed.
    pub status: u16,
    /// A short human-readable explanation, for the grouped log.
    pub detail: String,
}

/// Classifies every response in a finished sequence into zero or more
/// [`BugFinding`]s.
#[must_use]
pub fn classify_sequence(
    sequence: &[FuzzRequest],
    responses: &[FuzzResponse],
    endpoints: &[Endpoint],
    spec_info: &SpecInfo,
) -> Vec<BugFinding> {
    let mut findings = Vec::new();

    for (request, response) in sequence.iter().zip(responses.iter()) {
        let endpoint = find_endpoint(request, endpoints);
        findings.extend(classify_one(request, response, endpoint, spec_info));
    }

    findings
}

fn find_endpoint<'a>(request: &FuzzRequest, endpoints: &'a [Endpoint]) -> Option<&'a Endpoint> {
    let path = request.path_without_query();
    endpoints
        .iter()
        .find(|ep| ep.method.eq_ignore_ascii_case(&request.method) && crate::feedback::match_path(path, &ep.path))
}

fn classify_one(
    request: &FuzzRequest,
    response: &FuzzResponse,
    endpoint: Option<&Endpoint>,
    spec_info: &SpecInfo,
) -> Vec<BugFinding> {
    let mut findings = Vec::new();
    let status_str = response.status.to_string();

    if let Some(endpoint) = endpoint {
        if !spec_info.status_codes.contains(&status_str) {
            findings.push(finding(
                request,
                response,
                BugCategory::StatusCode,
                format!("status {} not declared anywhere in the spec ({} {})", response.status, endpoint.method, endpoint.path),
            ));
        }
    }

    if (500..600).contains(&response.status) {
        findings.push(finding(request, response, BugCategory::ServerError, "server error".to_string()));
    }

    if let Some(marker) = STACK_TRACE_MARKERS.iter().find(|marker| response.body.contains(**marker)) {
        findings.push(finding(
            request,
            response,
            BugCategory::StackTrace,
            format!("body contains stack-trace marker {marker:?}"),
        ));
    }

    if let Some(endpoint) = endpoint {
        let expects_body = spec_info.response_expectations.contains(&(
            endpoint.method.clone(),
            endpoint.path.clone(),
            status_str.clone(),
        ));
        if expects_body
            && response.body.trim().is_empty()
            && !NO_BODY_STATUSES.contains(&response.status)
        {
            findings.push(finding(request, response, BugCategory::EmptyBody, "expected body was empty".to_string()));
        }
    }

    if (200..300).contains(&response.status) {
        let content_type = response.header("content-type").unwrap_or_default();
        if !content_type.contains("application/json") {
            findings.push(finding(
                request,
                response,
                BugCategory::InvalidContentType,
                format!("content-type {content_type:?} on a 2xx response"),
            ));
        }
    }

    findings
}

fn finding(request: &FuzzRequest, response: &FuzzResponse, category: BugCategory, detail: String) -> BugFinding {
    BugFinding {
        category,
        method: request.method.clone(),
        url: request.url.clone(),
        status: response.status,
        detail,
    }
}

/// External collaborator that persists bug findings and per-iteration
/// request/response logs. Implementations decide storage medium and
/// timestamp/path conventions.
pub trait ReportSink: Send {
    /// Records one finished iteration's full request/response sequence.
    fn record_iteration(&mut self, sequence: &[FuzzRequest], responses: &[FuzzResponse]);

    /// Records bug findings surfaced by [`classify_sequence`] for one
    /// iteration. Called only when `findings` is non-empty.
    fn record_bugs(&mut self, findings: &[BugFinding]);

    /// Called once after the run loop ends. Implementations that buffer
    /// output in memory (e.g. a grouped bug report) should flush it here;
    /// the default does nothing, which is correct for sinks that write
    /// incrementally or discard everything.
    fn finish(&mut self) {}
}

/// A [`ReportSink`] that discards everything, useful for tests and for
/// callers that only care about the corpus/coverage side effects.
#[derive(Debug, Default)]
pub struct NullReportSink;

impl ReportSink for NullReportSink {
    fn record_iteration(&mut self, _sequence: &[FuzzRequest], _responses: &[FuzzResponse]) {}
    fn record_bugs(&mut self, _findings: &[BugFinding]) {}
}
