//! Stateless rendering of the playground into a frame.
//!
//! [`render`] is a pure function of [`Playground`]: calling it any number of
//! times on unchanged state yields equal frames.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::core::editor::SubmissionState;
use crate::core::update::Playground;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub selector: SelectorView,
    pub editor: EditorView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorView {
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub label: String,
    pub value: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorView {
    pub text: String,
    pub pending: bool,
    /// Result pane contents, absent until the first successful response.
    pub result: Option<String>,
}

pub fn render(state: &Playground) -> Frame {
    let selected = state.catalog.selected();
    let options = state
        .catalog
        .items()
        .iter()
        .enumerate()
        .map(|(index, entry)| OptionView {
            label: entry.name.clone(),
            value: entry.value.clone(),
            selected: selected == Some(index),
        })
        .collect();

    Frame {
        selector: SelectorView { options },
        editor: EditorView {
            text: state.editor.text().to_string(),
            pending: state.editor.submission_state() == SubmissionState::AwaitingResponse,
            result: state.editor.result().map(format_result),
        },
    }
}

/// Render an evaluation result for the result pane.
///
/// Strings are shown as-is; any other JSON value is pretty-printed.
pub fn format_result(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "── examples ──")?;
        if self.selector.options.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for option in &self.selector.options {
            let marker = if option.selected { '>' } else { ' ' };
            writeln!(f, "{marker} {}", option.label)?;
        }

        writeln!(f, "── editor ──")?;
        writeln!(f, "{}", self.editor.text)?;

        if self.editor.pending {
            writeln!(f, "── result (evaluating) ──")?;
        } else {
            writeln!(f, "── result ──")?;
        }
        match &self.editor.result {
            Some(result) => writeln!(f, "{result}"),
            None => writeln!(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ExampleEntry;
    use crate::core::update::{Msg, update};
    use serde_json::json;

    fn populated() -> Playground {
        let mut state = Playground::default();
        update(&mut state, Msg::CatalogMounted);
        update(
            &mut state,
            Msg::CatalogLoaded(Ok(vec![
                ExampleEntry::new("id", "\\x -> x"),
                ExampleEntry::new("const", "\\x y -> x"),
            ])),
        );
        state
    }

    #[test]
    fn render_is_idempotent() {
        let state = populated();
        let first = render(&state);
        for _ in 0..10 {
            assert_eq!(render(&state), first);
        }
        assert_eq!(render(&state).to_string(), first.to_string());
    }

    #[test]
    fn selection_marks_option() {
        let mut state = populated();
        update(&mut state, Msg::SelectionChanged("\\x y -> x".to_string()));
        let frame = render(&state);
        let marks: Vec<bool> = frame.selector.options.iter().map(|o| o.selected).collect();
        assert_eq!(marks, vec![false, true]);
        assert_eq!(frame.editor.text, "\\x y -> x");
    }

    #[test]
    fn string_results_are_shown_raw() {
        assert_eq!(format_result(&json!("1 : Int")), "1 : Int");
    }

    #[test]
    fn structured_results_are_pretty_printed() {
        let rendered = format_result(&json!({"error": "parse error"}));
        assert_eq!(rendered, "{\n  \"error\": \"parse error\"\n}");
    }

    #[test]
    fn pending_submission_is_visible() {
        let mut state = populated();
        update(&mut state, Msg::Submit);
        let frame = render(&state);
        assert!(frame.editor.pending);
        assert!(frame.to_string().contains("result (evaluating)"));
    }
}
