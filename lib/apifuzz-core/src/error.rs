//! Error types for the fuzzing engine.

/// Errors that can occur while loading a specification, building requests,
/// or driving the fuzzing control loop.
///
/// All variants implement `std::error::Error`. Recoverable conditions used
/// internally by the selector (`NoViableTests`, `EmptyCorpus`,
/// `NoCompatibleEndpoint`) are ordinary `Result` returns the engine matches
/// on; only `UnknownSpecVersion` and I/O-adjacent variants are meant to
/// reach `main`.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum FuzzError {
    /// JSON parsing/serialization error.
    JsonError(serde_json::Error),

    /// Regex compilation error (pattern-based example generation).
    RegexError(regex::Error),

    /// The spec document has neither a `swagger` nor an `openapi` top-level
    /// key, or an unrecognized `openapi` major version.
    #[display("unknown spec version: top-level keys were {keys:?}")]
    #[from(skip)]
    UnknownSpecVersion {
        /// Top-level keys observed in the document, for diagnostics.
        keys: Vec<String>,
    },

    /// The spec document exceeded the maximum accepted size.
    #[display("spec file too large: {size} bytes (max {max} bytes)")]
    #[from(skip)]
    SpecTooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Configured maximum.
        max: u64,
    },

    /// YAML parsing error (only constructible with the `yaml` feature).
    #[cfg(feature = "yaml")]
    #[display("failed to parse YAML spec: {message}")]
    #[from(skip)]
    YamlError {
        /// Underlying parser message.
        message: String,
    },

    /// Reading the spec file from disk failed.
    #[display("failed to read spec file {path}: {source}")]
    #[from(skip)]
    SpecIoError {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The corpus contains no entry short enough to extend.
    #[display("no viable tests under the max sequence length")]
    NoViableTests,

    /// The corpus is empty.
    #[display("corpus is empty")]
    EmptyCorpus,

    /// No endpoint can currently be reached given the dynamic ID table.
    #[display("no compatible endpoint found to extend sequence")]
    NoCompatibleEndpoint,
}
