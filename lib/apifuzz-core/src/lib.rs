//! # apifuzz-core
//!
//! A stateful, feedback-driven black-box fuzzer for HTTP APIs described by
//! OpenAPI/Swagger. Given a [`spec::SpecModel`] and a [`sender::RequestSender`],
//! [`engine::FuzzEngine`] autonomously explores the target service: it
//! synthesizes sequences of requests, observes responses, harvests runtime
//! resource identifiers, and iteratively builds longer, dependency-resolved
//! sequences that maximize a coverage-plus-diversity objective.
//!
//! Transport, the auth handshake, and report formatting are external
//! collaborators — [`sender::RequestSender`], [`sender::AuthProvider`], and
//! [`report::ReportSink`] — so this crate has no opinion on HTTP client,
//! logging sink, or file layout. `apifuzz-cli` wires concrete
//! implementations of each.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use apifuzz_core::engine::FuzzEngine;
//! use apifuzz_core::spec::SpecModel;
//! # use apifuzz_core::sender::{RequestSender, AuthProvider, FuzzRequest, FuzzResponse};
//! # use apifuzz_core::report::ReportSink;
//! # struct NullSender;
//! # #[async_trait::async_trait]
//! # impl RequestSender for NullSender {
//! #     async fn send(&self, _r: &FuzzRequest, _b: &str, _a: Option<(&str, &str)>) -> FuzzResponse {
//! #         FuzzResponse { status: 200, body: String::new(), headers: Default::default() }
//! #     }
//! # }
//! # struct NullSink;
//! # impl ReportSink for NullSink {
//! #     fn record_iteration(&mut self, _: &[FuzzRequest], _: &[FuzzResponse]) {}
//! #     fn record_bugs(&mut self, _: &[apifuzz_core::report::BugFinding]) {}
//! # }
//! # async fn run() -> Result<(), apifuzz_core::error::FuzzError> {
//! let spec = SpecModel::parse(r#"{"openapi":"3.0.0","paths":{"/pets":{"get":{"responses":{"200":{"description":"ok"}}}}}}"#)?;
//! let mut engine = FuzzEngine::new(spec, 42);
//! let mut sink = NullSink;
//! engine
//!     .run(&NullSender, "http://localhost:8080", None, std::time::Duration::from_secs(1), &mut sink)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod dependency;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod harvest;
pub mod mutation;
pub mod report;
pub mod request;
pub mod rng;
pub mod selector;
pub mod sender;
pub mod spec;

pub use self::engine::FuzzEngine;
pub use self::error::FuzzError;
pub use self::spec::SpecModel;
