//! Dynamic dependency resolution between sequence steps: the harvested-ID
//! table and the logic that substitutes it into later placeholders.

pub mod matching;
pub mod resolve;

use indexmap::{IndexMap, IndexSet};

pub use self::matching::{has_matching_id, matching_key, tokens_match};
pub use self::resolve::resolve_dependencies;

/// Token name (lowercased, e.g. `id`, `ownerid`, `token`) → the set of
/// distinct string values harvested for it so far, in discovery order.
///
/// Values never expire; the table only grows across a run.
pub type DynamicIdTable = IndexMap<String, IndexSet<String>>;
