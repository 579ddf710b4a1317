//! Security-scheme detection, used by the CLI to decide whether to attempt
//! the auth handshake before fuzzing.

use serde_json::Value;

use super::load::SpecVersion;

/// The first declared security scheme's name and declared `type`.
///
/// Only the first scheme is honored, mirroring the prototype's
/// `for name, scheme in security_schemes.items(): ...; break`. Multiple
/// simultaneous schemes are a known simplification, not a bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecuritySchemeInfo {
    /// The scheme's name in `securitySchemes`/`securityDefinitions`.
    pub name: String,
    /// The scheme's `type` field (`http`, `basic`, `apiKey`, `bearer`, ...).
    pub scheme_type: String,
}

/// True iff the document declares any top-level `security` requirement.
#[must_use]
pub fn requires_auth(document: &Value) -> bool {
    document
        .get("security")
        .and_then(Value::as_array)
        .is_some_and(|requirements| !requirements.is_empty())
}

/// The first declared security scheme, if any.
#[must_use]
pub fn first_security_scheme(document: &Value, version: SpecVersion) -> Option<SecuritySchemeInfo> {
    let schemes = match version {
        SpecVersion::OpenApi3 => document
            .get("components")
            .and_then(|c| c.get("securitySchemes")),
        SpecVersion::Swagger2 => document.get("securityDefinitions"),
    }?;

    let (name, scheme) = schemes.as_object()?.iter().next()?;
    let scheme_type = scheme.get("type")?.as_str()?.to_string();

    Some(SecuritySchemeInfo {
        name: name.clone(),
        scheme_type,
    })
}
