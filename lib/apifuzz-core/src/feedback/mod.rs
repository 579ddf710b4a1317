//! Feedback extraction: turns a finished test sequence into the coverage,
//! TCL score, and diversity signal the selector and engine use to decide
//! what to do next.

pub mod coverage;
pub mod diversity;
pub mod path_match;
pub mod tcl;

pub use self::coverage::{extract_seq_coverage, Coverage};
pub use self::diversity::{calculate_diversity, flatten_json};
pub use self::path_match::{match_operations_with_dependencies, match_path, match_paths_with_dependencies};
pub use self::tcl::calculate_tcl_score;
