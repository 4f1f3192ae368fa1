//! The single transition function for the whole playground.
//!
//! Every mutation of [`Playground`] goes through [`update`]. It is pure: side
//! effects come back as [`Effect`] values for the session to perform, and
//! anything worth logging comes back as a [`Note`].

use serde_json::Value;

use crate::core::catalog::{CatalogEvent, CatalogState, LoadDisposition};
use crate::core::editor::{EditorState, ResponseDisposition};
use crate::core::types::{ExampleEntry, RequestFailure, RequestToken, ResponsePolicy};

/// Composed state of both components.
#[derive(Debug, Clone, Default)]
pub struct Playground {
    pub editor: EditorState,
    pub catalog: CatalogState,
}

impl Playground {
    pub fn new(policy: ResponsePolicy) -> Self {
        Self {
            editor: EditorState::new(policy),
            catalog: CatalogState::new(),
        }
    }
}

/// Discrete events fed to [`update`].
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the text.
    TextChanged(String),
    /// User asked for an evaluation of the current text.
    Submit,
    /// An evaluation request settled.
    EvalFinished {
        token: RequestToken,
        outcome: Result<Value, RequestFailure>,
    },
    /// The catalog component was activated.
    CatalogMounted,
    /// The catalog request settled.
    CatalogLoaded(Result<Vec<ExampleEntry>, RequestFailure>),
    /// User picked a catalog entry by its value.
    SelectionChanged(String),
}

/// Work the session performs on behalf of [`update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Evaluate { token: RequestToken, text: String },
    FetchCatalog,
}

/// Diagnostics produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    EvalFailed {
        token: RequestToken,
        failure: RequestFailure,
    },
    StaleResponse {
        token: RequestToken,
        latest: RequestToken,
    },
    CatalogFailed(RequestFailure),
    CatalogEmpty,
    CatalogAlreadySettled,
    AlreadyMounted,
}

/// Output of one transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub effects: Vec<Effect>,
    /// Whether observable state changed and a redraw is due.
    pub changed: bool,
    pub note: Option<Note>,
}

impl Transition {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed(changed: bool) -> Self {
        Self {
            changed,
            ..Self::default()
        }
    }

    fn note(mut self, note: Note) -> Self {
        self.note = Some(note);
        self
    }
}

/// Apply `msg` to `state`.
pub fn update(state: &mut Playground, msg: Msg) -> Transition {
    match msg {
        Msg::TextChanged(text) => Transition::changed(state.editor.set_text(text)),
        Msg::Submit => {
            let (token, text) = state.editor.begin_submit();
            Transition {
                effects: vec![Effect::Evaluate { token, text }],
                changed: true,
                note: None,
            }
        }
        Msg::EvalFinished { token, outcome } => {
            match state.editor.finish_submit(token, outcome) {
                ResponseDisposition::Applied => Transition::changed(true),
                ResponseDisposition::Stale { latest } => {
                    Transition::changed(true).note(Note::StaleResponse { token, latest })
                }
                ResponseDisposition::Failed(failure) => {
                    Transition::changed(true).note(Note::EvalFailed { token, failure })
                }
            }
        }
        Msg::CatalogMounted => {
            if state.catalog.mount() {
                Transition {
                    effects: vec![Effect::FetchCatalog],
                    changed: true,
                    note: None,
                }
            } else {
                Transition::unchanged().note(Note::AlreadyMounted)
            }
        }
        Msg::CatalogLoaded(outcome) => match state.catalog.finish_load(outcome) {
            LoadDisposition::Loaded {
                auto_selected: Some(event),
            } => {
                deliver(&mut state.editor, event);
                Transition::changed(true)
            }
            LoadDisposition::Loaded {
                auto_selected: None,
            } => Transition::changed(true).note(Note::CatalogEmpty),
            LoadDisposition::Failed(failure) => {
                Transition::changed(true).note(Note::CatalogFailed(failure))
            }
            LoadDisposition::Ignored => Transition::unchanged().note(Note::CatalogAlreadySettled),
        },
        Msg::SelectionChanged(value) => {
            let event = state.catalog.select(value);
            deliver(&mut state.editor, event);
            Transition::changed(true)
        }
    }
}

/// Route a catalog message to the editor.
fn deliver(editor: &mut EditorState, event: CatalogEvent) {
    match event {
        CatalogEvent::ExampleChosen { value } => {
            editor.set_text(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loaded(entries: Vec<ExampleEntry>) -> Playground {
        let mut state = Playground::default();
        update(&mut state, Msg::CatalogMounted);
        update(&mut state, Msg::CatalogLoaded(Ok(entries)));
        state
    }

    fn identity_examples() -> Vec<ExampleEntry> {
        vec![
            ExampleEntry::new("id", "\\x -> x"),
            ExampleEntry::new("const", "\\x y -> x"),
        ]
    }

    #[test]
    fn mount_requests_catalog_once() {
        let mut state = Playground::default();
        let first = update(&mut state, Msg::CatalogMounted);
        assert_eq!(first.effects, vec![Effect::FetchCatalog]);
        let second = update(&mut state, Msg::CatalogMounted);
        assert!(second.effects.is_empty());
        assert_eq!(second.note, Some(Note::AlreadyMounted));
    }

    #[test]
    fn catalog_load_installs_first_example() {
        let state = loaded(identity_examples());
        assert_eq!(state.editor.text(), "\\x -> x");
    }

    #[test]
    fn selecting_second_example_replaces_text() {
        let mut state = loaded(identity_examples());
        update(&mut state, Msg::TextChanged("unsaved edit".to_string()));
        update(&mut state, Msg::SelectionChanged("\\x y -> x".to_string()));
        assert_eq!(state.editor.text(), "\\x y -> x");
    }

    #[test]
    fn empty_catalog_leaves_text_alone() {
        let mut state = Playground::default();
        update(&mut state, Msg::CatalogMounted);
        let transition = update(&mut state, Msg::CatalogLoaded(Ok(Vec::new())));
        assert_eq!(transition.note, Some(Note::CatalogEmpty));
        assert_eq!(state.editor.text(), "");
    }

    #[test]
    fn failed_catalog_does_not_touch_editor() {
        let mut state = Playground::default();
        update(&mut state, Msg::TextChanged("typed".to_string()));
        update(&mut state, Msg::CatalogMounted);
        let transition = update(
            &mut state,
            Msg::CatalogLoaded(Err(RequestFailure::Transport("refused".to_string()))),
        );
        assert!(matches!(transition.note, Some(Note::CatalogFailed(_))));
        assert_eq!(state.editor.text(), "typed");
        assert!(state.catalog.items().is_empty());
    }

    #[test]
    fn submit_emits_one_request_with_current_text() {
        let mut state = Playground::default();
        update(&mut state, Msg::TextChanged("(".to_string()));
        let transition = update(&mut state, Msg::Submit);
        assert_eq!(transition.effects.len(), 1);
        match &transition.effects[0] {
            Effect::Evaluate { text, .. } => assert_eq!(text, "("),
            other => panic!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn error_payload_is_stored_as_result() {
        let mut state = Playground::default();
        update(&mut state, Msg::TextChanged("(".to_string()));
        let token = match update(&mut state, Msg::Submit).effects.pop() {
            Some(Effect::Evaluate { token, .. }) => token,
            other => panic!("unexpected effect {other:?}"),
        };
        update(
            &mut state,
            Msg::EvalFinished {
                token,
                outcome: Ok(json!({"error": "parse error"})),
            },
        );
        assert_eq!(state.editor.result(), Some(&json!({"error": "parse error"})));
    }

    #[test]
    fn stale_response_is_reported() {
        let mut state = Playground::new(ResponsePolicy::LatestIssued);
        let a = update(&mut state, Msg::Submit).effects;
        let b = update(&mut state, Msg::Submit).effects;
        let (Effect::Evaluate { token: a, .. }, Effect::Evaluate { token: b, .. }) =
            (&a[0], &b[0])
        else {
            panic!("expected evaluate effects");
        };
        update(
            &mut state,
            Msg::EvalFinished {
                token: *b,
                outcome: Ok(json!("B")),
            },
        );
        let transition = update(
            &mut state,
            Msg::EvalFinished {
                token: *a,
                outcome: Ok(json!("A")),
            },
        );
        assert_eq!(
            transition.note,
            Some(Note::StaleResponse {
                token: *a,
                latest: *b
            })
        );
        assert_eq!(state.editor.result(), Some(&json!("B")));
    }
}
