//! Request synthesis: turns a normalized [`crate::spec::Endpoint`] into a
//! concrete, sendable (modulo dependency resolution) request.

pub mod builder;
pub mod example;

pub use self::builder::build_request;
pub use self::example::{generate_example_value, generate_matching_string};
