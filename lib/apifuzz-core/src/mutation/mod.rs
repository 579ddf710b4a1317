//! Request and sequence mutation: the fuzz-value generators the engine
//! draws on once exploration stagnates.

pub mod deep;
pub mod shallow;

pub use self::deep::{deep_mutation, generate_fuzz_value};
pub use self::shallow::{mutate_request, mutate_value};
