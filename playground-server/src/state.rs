//! Shared application state for the playground server.

use std::sync::Arc;

use anyhow::{Context, Result};
use playground::core::types::ExampleEntry;

use crate::evaluator::CommandEvaluator;

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<CommandEvaluator>,
    /// Catalog serialized once at startup; served unchanged for the process
    /// lifetime.
    pub examples_json: Arc<str>,
}

impl AppState {
    pub fn new(evaluator: CommandEvaluator, examples: &[ExampleEntry]) -> Result<Self> {
        let examples_json = serde_json::to_string(examples).context("serialize examples")?;
        Ok(Self {
            evaluator: Arc::new(evaluator),
            examples_json: Arc::from(examples_json),
        })
    }
}
