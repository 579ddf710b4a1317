//! Filesystem [`ReportSink`]: a grouped bug-findings log and a per-iteration
//! request/response trace, one timestamped pair of files per run under
//! `feedback/logs/` and `logger/logs/`.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, Write as _};
use std::path::PathBuf;

use apifuzz_core::report::{BugCategory, BugFinding, ReportSink};
use apifuzz_core::sender::{FuzzRequest, FuzzResponse};
use indexmap::IndexMap;

/// Every bug category, in the fixed order the grouped report lists them.
const CATEGORIES: [BugCategory; 5] = [
    BugCategory::StatusCode,
    BugCategory::ServerError,
    BugCategory::StackTrace,
    BugCategory::EmptyBody,
    BugCategory::InvalidContentType,
];

fn category_label(category: BugCategory) -> &'static str {
    match category {
        BugCategory::StatusCode => "undeclared status code",
        BugCategory::ServerError => "server error",
        BugCategory::StackTrace => "stack trace leak",
        BugCategory::EmptyBody => "unexpectedly empty body",
        BugCategory::InvalidContentType => "invalid content type",
    }
}

fn format_headers(headers: &IndexMap<String, String>) -> String {
    headers.iter().map(|(name, value)| format!("{name}: {value}")).collect::<Vec<_>>().join("; ")
}

fn write_request(out: &mut String, request: &FuzzRequest) {
    let body = request.body.as_ref().map_or_else(String::new, std::string::ToString::to_string);
    let _ = writeln!(
        out,
        "{} {}\n  headers: {}\n  body: {body}",
        request.method,
        request.url,
        format_headers(&request.headers)
    );
}

fn write_response(out: &mut String, response: &FuzzResponse) {
    let _ = writeln!(
        out,
        "  -> status {}\n  headers: {}\n  body: {}\n",
        response.status,
        format_headers(&response.headers),
        response.body
    );
}

/// Persists bug findings and per-iteration traces to the local filesystem.
pub struct FileReportSink {
    bugs_path: PathBuf,
    iteration_log: File,
    iteration_count: usize,
    findings: Vec<BugFinding>,
}

impl FileReportSink {
    /// Creates `feedback/logs/` and `logger/logs/` under the current
    /// directory (if absent) and opens a fresh timestamped pair of report
    /// files for this run.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if either directory or the iteration log
    /// file cannot be created.
    pub fn new() -> io::Result<Self> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();

        fs::create_dir_all("feedback/logs")?;
        fs::create_dir_all("logger/logs")?;

        Self::new_at(
            PathBuf::from("feedback/logs").join(format!("{timestamp}_bugs_grouped.log")),
            PathBuf::from("logger/logs").join(format!("{timestamp}_iteration_log.txt")),
        )
    }

    fn new_at(bugs_path: PathBuf, iteration_log_path: PathBuf) -> io::Result<Self> {
        let iteration_log = File::create(iteration_log_path)?;
        Ok(Self { bugs_path, iteration_log, iteration_count: 0, findings: Vec::new() })
    }
}

impl ReportSink for FileReportSink {
    fn record_iteration(&mut self, sequence: &[FuzzRequest], responses: &[FuzzResponse]) {
        self.iteration_count += 1;

        let mut out = String::new();
        let _ = writeln!(out, "=== iteration {} ===", self.iteration_count);
        for (request, response) in sequence.iter().zip(responses.iter()) {
            write_request(&mut out, request);
            write_response(&mut out, response);
        }

        if let Err(error) = self.iteration_log.write_all(out.as_bytes()) {
            tracing::warn!(%error, "failed to write iteration log entry");
        }
    }

    fn record_bugs(&mut self, findings: &[BugFinding]) {
        self.findings.extend_from_slice(findings);
    }

    fn finish(&mut self) {
        if self.findings.is_empty() {
            return;
        }

        let mut out = String::new();
        for category in CATEGORIES {
            let matching: Vec<&BugFinding> = self.findings.iter().filter(|finding| finding.category == category).collect();
            if matching.is_empty() {
                continue;
            }

            let _ = writeln!(out, "## {} ({})", category_label(category), matching.len());
            for finding in &matching {
                let _ = writeln!(out, "{} {} -> {} : {}", finding.method, finding.url, finding.status, finding.detail);
            }
            let _ = writeln!(out);
        }

        if let Err(error) = fs::write(&self.bugs_path, out) {
            tracing::warn!(%error, "failed to write grouped bug report");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink_at(name: &str) -> FileReportSink {
        let dir = std::env::temp_dir();
        FileReportSink::new_at(dir.join(format!("{name}_bugs.log")), dir.join(format!("{name}_iter.txt"))).unwrap()
    }

    fn request() -> FuzzRequest {
        FuzzRequest {
            method: "GET".to_string(),
            url: "/pets".to_string(),
            headers: IndexMap::new(),
            body: None,
            parameters: Vec::new(),
        }
    }

    fn response(status: u16, body: &str) -> FuzzResponse {
        FuzzResponse { status, body: body.to_string(), headers: IndexMap::new() }
    }

    #[test]
    fn test_record_iteration_increments_count() {
        let mut sink = sink_at("apifuzz_test_count");
        sink.record_iteration(&[request()], &[response(200, "{}")]);
        sink.record_iteration(&[request()], &[response(200, "{}")]);
        assert_eq!(sink.iteration_count, 2);
    }

    #[test]
    fn test_finish_without_findings_does_not_error() {
        let mut sink = sink_at("apifuzz_test_empty");
        sink.finish();
    }

    #[test]
    fn test_finish_writes_grouped_report_for_findings() {
        let mut sink = sink_at("apifuzz_test_grouped");
        let finding = BugFinding {
            category: BugCategory::ServerError,
            method: "GET".to_string(),
            url: "/pets".to_string(),
            status: 500,
            detail: "server error".to_string(),
        };
        sink.record_bugs(std::slice::from_ref(&finding));
        sink.finish();
        let contents = fs::read_to_string(&sink.bugs_path).unwrap();
        assert!(contents.contains("server error"));
        assert!(contents.contains("GET /pets -> 500"));
    }

    #[test]
    fn test_category_label_covers_every_variant() {
        for category in CATEGORIES {
            assert!(!category_label(category).is_empty());
        }
    }
}
