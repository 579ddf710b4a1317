//! `TestEntry`: one corpus member — a sequence of requests, the responses
//! they produced, and the feedback scores computed for that sequence.

use crate::sender::{FuzzRequest, FuzzResponse};

/// A single corpus member.
///
/// Invariant: `sequence.len() == responses.len()` and both are non-empty.
#[derive(Debug, Clone)]
pub struct TestEntry {
    /// The requests sent, in send order.
    pub sequence: Vec<FuzzRequest>,
    /// The responses received, paired by index with `sequence`.
    pub responses: Vec<FuzzResponse>,
    /// This sequence's own TCL score (not the engine's cumulative score).
    pub tcl: f64,
    /// This sequence's diversity score (new fields in its last response).
    pub diversity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_test_entry_sequence_and_responses_stay_paired() {
        let request = FuzzRequest {
            method: "GET".to_string(),
            url: "/pets".to_string(),
            headers: IndexMap::new(),
            body: None,
            parameters: Vec::new(),
        };
        let response = FuzzResponse { status: 200, body: "{}".to_string(), headers: IndexMap::new() };
        let entry = TestEntry {
            sequence: vec![request],
            responses: vec![response],
            tcl: 1.0,
            diversity: 0.0,
        };
        assert_eq!(entry.sequence.len(), entry.responses.len());
    }
}
