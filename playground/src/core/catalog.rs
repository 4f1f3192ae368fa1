//! Example catalog state: loaded once on mount, read-only afterwards.

use serde::Serialize;

use crate::core::types::{ExampleEntry, RequestFailure};

/// Message the catalog emits toward the editor.
///
/// This is the only channel between the two components; the editor never
/// reads catalog state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CatalogEvent {
    ExampleChosen { value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogPhase {
    Unmounted,
    Loading,
    Loaded,
    Failed,
}

/// Result of handing a load response to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadDisposition {
    /// Items were installed; carries the auto-selection, if any.
    Loaded { auto_selected: Option<CatalogEvent> },
    Failed(RequestFailure),
    /// A load result arrived after the catalog was already settled.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct CatalogState {
    phase: CatalogPhase,
    items: Vec<ExampleEntry>,
    selected: Option<usize>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self {
            phase: CatalogPhase::Unmounted,
            items: Vec::new(),
            selected: None,
        }
    }

    pub fn phase(&self) -> CatalogPhase {
        self.phase
    }

    pub fn items(&self) -> &[ExampleEntry] {
        &self.items
    }

    /// Index of the entry currently shown as selected.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn find_by_name(&self, name: &str) -> Option<&ExampleEntry> {
        self.items.iter().find(|entry| entry.name == name)
    }

    /// Start the one and only load. Returns `false` when already mounted.
    pub fn mount(&mut self) -> bool {
        if self.phase != CatalogPhase::Unmounted {
            return false;
        }
        self.phase = CatalogPhase::Loading;
        true
    }

    /// Install the load response.
    ///
    /// A non-empty catalog auto-selects its first entry exactly once; an empty
    /// one emits nothing.
    pub fn finish_load(
        &mut self,
        outcome: Result<Vec<ExampleEntry>, RequestFailure>,
    ) -> LoadDisposition {
        if self.phase != CatalogPhase::Loading {
            return LoadDisposition::Ignored;
        }
        match outcome {
            Ok(items) => {
                self.items = items;
                self.phase = CatalogPhase::Loaded;
                let auto_selected = self.items.first().map(|first| CatalogEvent::ExampleChosen {
                    value: first.value.clone(),
                });
                if auto_selected.is_some() {
                    self.selected = Some(0);
                }
                LoadDisposition::Loaded { auto_selected }
            }
            Err(failure) => {
                self.phase = CatalogPhase::Failed;
                LoadDisposition::Failed(failure)
            }
        }
    }

    /// Forward a user pick to the editor unchanged.
    pub fn select(&mut self, value: String) -> CatalogEvent {
        self.selected = self.items.iter().position(|entry| entry.value == value);
        CatalogEvent::ExampleChosen { value }
    }
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::new()
    }
}
