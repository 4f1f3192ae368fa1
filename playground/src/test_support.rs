//! Test-only backends and renderers.
//!
//! [`ScriptedBackend`] parks every request until the test answers it, so tests
//! decide the exact order in which responses arrive.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::core::types::{ExampleEntry, RequestFailure};
use crate::io::client::Backend;
use crate::io::render::Renderer;
use crate::view::Frame;

/// Build catalog entries from `(name, value)` pairs.
pub fn examples(pairs: &[(&str, &str)]) -> Vec<ExampleEntry> {
    pairs
        .iter()
        .map(|(name, value)| ExampleEntry::new(*name, *value))
        .collect()
}

/// An evaluation request waiting for the test to answer it.
#[derive(Debug)]
pub struct PendingEval {
    pub text: String,
    reply: oneshot::Sender<Result<Value, RequestFailure>>,
}

impl PendingEval {
    pub fn respond(self, outcome: Result<Value, RequestFailure>) {
        let _ = self.reply.send(outcome);
    }
}

/// A catalog request waiting for the test to answer it.
#[derive(Debug)]
pub struct PendingCatalog {
    reply: oneshot::Sender<Result<Vec<ExampleEntry>, RequestFailure>>,
}

impl PendingCatalog {
    pub fn respond(self, outcome: Result<Vec<ExampleEntry>, RequestFailure>) {
        let _ = self.reply.send(outcome);
    }
}

/// Receiving side of a [`ScriptedBackend`], in request issue order.
pub struct ScriptedRequests {
    evals: mpsc::UnboundedReceiver<PendingEval>,
    catalogs: mpsc::UnboundedReceiver<PendingCatalog>,
}

impl ScriptedRequests {
    pub async fn next_eval(&mut self) -> PendingEval {
        self.evals.recv().await.expect("backend dropped")
    }

    pub async fn next_catalog(&mut self) -> PendingCatalog {
        self.catalogs.recv().await.expect("backend dropped")
    }

    /// Number of evaluation requests issued but not yet taken.
    pub fn queued_evals(&self) -> usize {
        self.evals.len()
    }

    /// Number of catalog requests issued but not yet taken.
    pub fn queued_catalogs(&self) -> usize {
        self.catalogs.len()
    }
}

pub struct ScriptedBackend {
    evals: mpsc::UnboundedSender<PendingEval>,
    catalogs: mpsc::UnboundedSender<PendingCatalog>,
}

impl ScriptedBackend {
    pub fn channel() -> (Arc<Self>, ScriptedRequests) {
        let (eval_tx, eval_rx) = mpsc::unbounded_channel();
        let (catalog_tx, catalog_rx) = mpsc::unbounded_channel();
        let backend = Arc::new(Self {
            evals: eval_tx,
            catalogs: catalog_tx,
        });
        let requests = ScriptedRequests {
            evals: eval_rx,
            catalogs: catalog_rx,
        };
        (backend, requests)
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn evaluate(&self, text: String) -> Result<Value, RequestFailure> {
        let (reply, rx) = oneshot::channel();
        self.evals
            .send(PendingEval { text, reply })
            .map_err(|_| RequestFailure::Transport("script closed".to_string()))?;
        rx.await
            .unwrap_or_else(|_| Err(RequestFailure::Transport("no reply".to_string())))
    }

    async fn fetch_examples(&self) -> Result<Vec<ExampleEntry>, RequestFailure> {
        let (reply, rx) = oneshot::channel();
        self.catalogs
            .send(PendingCatalog { reply })
            .map_err(|_| RequestFailure::Transport("script closed".to_string()))?;
        rx.await
            .unwrap_or_else(|_| Err(RequestFailure::Transport("no reply".to_string())))
    }
}

/// Renderer that keeps every frame it is asked to draw.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().expect("frames lock").clone()
    }

    pub fn last(&self) -> Option<Frame> {
        self.frames.lock().expect("frames lock").last().cloned()
    }
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, frame: &Frame) {
        self.frames.lock().expect("frames lock").push(frame.clone());
    }
}
