//! Editor panel state: the text being edited, the last result, and the
//! bookkeeping for evaluation requests that are still in flight.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::core::types::{RequestFailure, RequestToken, ResponsePolicy};

/// Where the editor is in its submission cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    AwaitingResponse,
}

/// What happened to an evaluation response handed to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseDisposition {
    /// The decoded value replaced `result`.
    Applied,
    /// A newer request was issued; the value was dropped.
    Stale { latest: RequestToken },
    /// The request failed; `result` is unchanged.
    Failed(RequestFailure),
}

#[derive(Debug, Clone)]
pub struct EditorState {
    text: String,
    result: Option<Value>,
    policy: ResponsePolicy,
    next_token: u64,
    latest: Option<RequestToken>,
    in_flight: BTreeSet<RequestToken>,
}

impl EditorState {
    pub fn new(policy: ResponsePolicy) -> Self {
        Self {
            text: String::new(),
            result: None,
            policy,
            next_token: 1,
            latest: None,
            in_flight: BTreeSet::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn policy(&self) -> ResponsePolicy {
        self.policy
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn submission_state(&self) -> SubmissionState {
        if self.in_flight.is_empty() {
            SubmissionState::Idle
        } else {
            SubmissionState::AwaitingResponse
        }
    }

    /// Replace the text unconditionally. Returns whether anything changed.
    pub fn set_text(&mut self, text: String) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text;
        true
    }

    /// Issue a new request token for the current text.
    ///
    /// Never refuses: overlapping submissions are allowed and each gets its own
    /// token.
    pub fn begin_submit(&mut self) -> (RequestToken, String) {
        let token = RequestToken::new(self.next_token);
        self.next_token += 1;
        self.latest = Some(token);
        self.in_flight.insert(token);
        (token, self.text.clone())
    }

    /// Settle a request and decide whether its outcome reaches `result`.
    pub fn finish_submit(
        &mut self,
        token: RequestToken,
        outcome: Result<Value, RequestFailure>,
    ) -> ResponseDisposition {
        self.in_flight.remove(&token);
        let value = match outcome {
            Ok(value) => value,
            Err(failure) => return ResponseDisposition::Failed(failure),
        };
        if self.policy == ResponsePolicy::LatestIssued {
            if let Some(latest) = self.latest.filter(|latest| *latest != token) {
                return ResponseDisposition::Stale { latest };
            }
        }
        self.result = Some(value);
        ResponseDisposition::Applied
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(ResponsePolicy::default())
    }
}
