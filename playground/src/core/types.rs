//! Shared deterministic types for the playground core.
//!
//! These types define the contracts between the editor, the example catalog
//! and the I/O layer. They carry no I/O of their own.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One named snippet offered by the example catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleEntry {
    /// Display label.
    pub name: String,
    /// Literal text installed into the editor when chosen.
    pub value: String,
}

impl ExampleEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Identity of one evaluation request.
///
/// Tokens are issued in strictly increasing order by the editor, so comparing
/// two tokens tells which submission was issued later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which evaluation response is allowed to update the result pane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePolicy {
    /// Only the response to the most recently issued request is applied.
    #[default]
    LatestIssued,
    /// Every successful response is applied; whichever arrives last wins.
    LastArrival,
}

/// Why an outbound request produced no usable value.
///
/// All variants are reported to the diagnostic channel and otherwise leave
/// state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    /// The request never produced a response (connect, timeout, body read).
    Transport(String),
    /// The server answered with a non-success status code.
    Status(u16),
    /// The body was not the JSON shape we expected.
    Decode(String),
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestFailure::Transport(detail) => write!(f, "transport failure: {detail}"),
            RequestFailure::Status(code) => write!(f, "unexpected status {code}"),
            RequestFailure::Decode(detail) => write!(f, "malformed response body: {detail}"),
        }
    }
}

impl std::error::Error for RequestFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_order_by_issue() {
        assert!(RequestToken::new(1) < RequestToken::new(2));
        assert_eq!(RequestToken::new(7).to_string(), "#7");
    }

    #[test]
    fn response_policy_uses_snake_case_names() {
        let policy: ResponsePolicy = serde_json::from_str("\"last_arrival\"").expect("parse");
        assert_eq!(policy, ResponsePolicy::LastArrival);
        assert_eq!(ResponsePolicy::default(), ResponsePolicy::LatestIssued);
    }

    #[test]
    fn example_entry_requires_name_and_value() {
        let err = serde_json::from_str::<ExampleEntry>(r#"{"name":"id"}"#);
        assert!(err.is_err());
    }
}
