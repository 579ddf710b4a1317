//! The prefix/suffix token-matching rule shared by dependency resolution,
//! compatible-endpoint selection, and (via the harvested token name) ID
//! harvesting.

use super::DynamicIdTable;

/// True iff `name` and `key` share a prefix or suffix relationship in
/// either direction, compared case-insensitively.
///
/// E.g. `"ownerId"` matches table key `"id"` (suffix) and `"petId"`
/// matches `"pet"` (prefix), and vice versa.
#[must_use]
pub fn tokens_match(name: &str, key: &str) -> bool {
    let name = name.to_lowercase();
    let key = key.to_lowercase();
    name.starts_with(&key) || name.ends_with(&key) || key.starts_with(&name) || key.ends_with(&name)
}

/// True iff `param_name` matches any key currently in `table`.
#[must_use]
pub fn has_matching_id(param_name: &str, table: &DynamicIdTable) -> bool {
    table.keys().any(|key| tokens_match(param_name, key))
}

/// The first table key matching `param_name`, in table iteration order.
#[must_use]
pub fn matching_key<'a>(param_name: &str, table: &'a DynamicIdTable) -> Option<&'a str> {
    table
        .keys()
        .find(|key| tokens_match(param_name, key))
        .map(String::as_str)
}
