//! `SpecModel`: loads an OpenAPI/Swagger document and exposes its
//! normalized endpoints and aggregate expected-coverage sets.

pub mod coverage;
pub mod load;
pub mod model;
pub mod parse;
pub mod resolve;
pub mod security;

use std::collections::BTreeSet;

use serde_json::Value;

pub use self::coverage::SpecInfo;
pub use self::load::SpecVersion;
pub use self::model::{Endpoint, Parameter, ParameterLocation, RequestBodySchema, ResponseSpec};
pub use self::security::SecuritySchemeInfo;

use crate::error::FuzzError;

/// A parsed, normalized OpenAPI/Swagger specification.
///
/// Constructed once per run; [`Endpoint`] values are immutable thereafter.
#[derive(Debug, Clone)]
pub struct SpecModel {
    version: SpecVersion,
    endpoints: Vec<Endpoint>,
    spec_info: SpecInfo,
    requires_auth: bool,
    security_scheme: Option<SecuritySchemeInfo>,
}

impl SpecModel {
    /// Parses `text` as a spec document (JSON or, with the `yaml` feature,
    /// YAML) and normalizes it.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzError::UnknownSpecVersion`] if the document has neither
    /// a `swagger` nor a recognized `openapi` key, or a parse error if the
    /// text is not valid JSON/YAML.
    pub fn parse(text: &str) -> Result<Self, FuzzError> {
        let document = load::parse_spec_document(text)?;
        let version = load::detect_version(&document)?;
        let endpoints = parse::parse_endpoints(&document, version);
        let spec_info = SpecInfo::from_endpoints(&endpoints, &document, version == SpecVersion::Swagger2);
        let requires_auth = security::requires_auth(&document);
        let security_scheme = security::first_security_scheme(&document, version);

        Ok(Self {
            version,
            endpoints,
            spec_info,
            requires_auth,
            security_scheme,
        })
    }

    /// The detected spec version.
    #[must_use]
    pub fn version(&self) -> SpecVersion {
        self.version
    }

    /// Every normalized endpoint, in document order.
    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// The aggregate expected-coverage universe.
    #[must_use]
    pub fn spec_info(&self) -> &SpecInfo {
        &self.spec_info
    }

    /// True iff the document declares a top-level `security` requirement.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    /// The first declared security scheme, if any.
    #[must_use]
    pub fn security_scheme(&self) -> Option<&SecuritySchemeInfo> {
        self.security_scheme.as_ref()
    }

    /// The union of every path-parameter name declared anywhere in the
    /// spec, lowercased — widens the ID harvester's matching tokens beyond
    /// the defaults `{id, key, token}`.
    #[must_use]
    pub fn dynamic_param_names(&self) -> BTreeSet<String> {
        coverage::dynamic_param_names(&self.endpoints)
    }

    /// Finds the endpoint matching a concrete `(method, path)` request by
    /// comparing HTTP method and segment-wise path template.
    #[must_use]
    pub fn find_endpoint(&self, method: &str, concrete_path: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|ep| {
            ep.method.eq_ignore_ascii_case(method)
                && crate::feedback::path_match::match_path(concrete_path, &ep.path)
        })
    }
}

/// Raw document value, exposed for components that need it directly (the
/// request builder resolves path-parameter schemas by endpoint, not the
/// document, so this is rarely needed outside of tests).
pub type RawDocument = Value;
