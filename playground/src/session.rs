//! Event loop that owns the playground state.
//!
//! The session is the only place where [`update`] runs. Inputs arrive on a
//! single channel (user commands, network completions), effects are spawned
//! as tasks that report back on the same channel, and a fixed-cadence ticker
//! redraws the current state. State is therefore only ever touched from one
//! task, one input at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::core::update::{Effect, Msg, Note, Playground, update};
use crate::io::client::Backend;
use crate::io::config::PlaygroundConfig;
use crate::io::render::Renderer;
use crate::view::render;

/// Line-level commands understood by an interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Append a line (plus newline) to the editor text.
    Append(String),
    Clear,
    Submit,
    /// Pick a catalog entry by its display name.
    Select(String),
    /// Redraw the current frame even if nothing changed.
    Show,
    Quit,
}

impl Command {
    /// Parse one input line. Lines not starting with `:` are text.
    pub fn parse(line: &str) -> Command {
        let Some(rest) = line.strip_prefix(':') else {
            return Command::Append(line.to_string());
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest.trim_end(), ""),
        };
        match name {
            "clear" => Command::Clear,
            "submit" | "eval" => Command::Submit,
            "select" if !arg.is_empty() => Command::Select(arg.to_string()),
            "show" => Command::Show,
            "quit" | "q" => Command::Quit,
            _ => Command::Append(line.to_string()),
        }
    }
}

#[derive(Debug)]
pub enum Input {
    Msg(Msg),
    Command(Command),
}

/// Cloneable sender for feeding a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Input>,
}

impl SessionHandle {
    /// Returns `false` once the session has ended.
    pub fn send(&self, msg: Msg) -> bool {
        self.tx.send(Input::Msg(msg)).is_ok()
    }

    pub fn command(&self, command: Command) -> bool {
        self.tx.send(Input::Command(command)).is_ok()
    }
}

pub struct Session<B, R> {
    state: Playground,
    backend: Arc<B>,
    renderer: R,
    redraw_interval: Duration,
    tx: mpsc::UnboundedSender<Input>,
    rx: mpsc::UnboundedReceiver<Input>,
}

impl<B: Backend, R: Renderer> Session<B, R> {
    pub fn new(backend: Arc<B>, renderer: R, cfg: &PlaygroundConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: Playground::new(cfg.response_policy),
            backend,
            renderer,
            redraw_interval: cfg.redraw_interval(),
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &Playground {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            tx: self.tx.clone(),
        }
    }

    /// Activate the example catalog.
    pub fn mount(&mut self) {
        self.dispatch(Msg::CatalogMounted);
    }

    /// Apply one message, start its effects, and redraw if state changed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&mut self, msg: Msg) {
        let transition = update(&mut self.state, msg);
        if let Some(note) = transition.note {
            report(note);
        }
        for effect in transition.effects {
            self.spawn_effect(effect);
        }
        if transition.changed {
            self.redraw();
        }
    }

    /// Paint the current state. Read-only with respect to the playground.
    pub fn redraw(&mut self) {
        let frame = render(&self.state);
        self.renderer.draw(&frame);
    }

    /// Wait for the next input and apply it.
    ///
    /// Returns `false` when the input was [`Command::Quit`].
    pub async fn settle_one(&mut self) -> bool {
        match self.rx.recv().await {
            Some(input) => self.handle_input(input),
            None => false,
        }
    }

    /// Process inputs and fixed-cadence redraws until [`Command::Quit`].
    pub async fn run(mut self) -> Playground {
        let mut ticker = tokio::time::interval(self.redraw_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            policy = ?self.state.editor.policy(),
            redraw_ms = self.redraw_interval.as_millis() as u64,
            "session started"
        );
        loop {
            tokio::select! {
                input = self.rx.recv() => {
                    let Some(input) = input else { break };
                    if !self.handle_input(input) {
                        break;
                    }
                }
                _ = ticker.tick() => self.redraw(),
            }
        }
        self.redraw();
        info!(in_flight = self.state.editor.in_flight(), "session ended");
        self.state
    }

    fn handle_input(&mut self, input: Input) -> bool {
        match input {
            Input::Msg(msg) => self.dispatch(msg),
            Input::Command(command) => return self.apply_command(command),
        }
        true
    }

    fn apply_command(&mut self, command: Command) -> bool {
        debug!(?command, "command");
        match command {
            Command::Append(line) => {
                let mut text = self.state.editor.text().to_string();
                text.push_str(&line);
                text.push('\n');
                self.dispatch(Msg::TextChanged(text));
            }
            Command::Clear => self.dispatch(Msg::TextChanged(String::new())),
            Command::Submit => self.dispatch(Msg::Submit),
            Command::Select(name) => match self.state.catalog.find_by_name(&name) {
                Some(entry) => {
                    let value = entry.value.clone();
                    self.dispatch(Msg::SelectionChanged(value));
                }
                None => warn!(name = %name, "no example with that name"),
            },
            Command::Show => {
                self.renderer.invalidate();
                self.redraw();
            }
            Command::Quit => return false,
        }
        true
    }

    fn spawn_effect(&self, effect: Effect) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        match effect {
            Effect::Evaluate { token, text } => {
                debug!(%token, bytes = text.len(), "submitting evaluation");
                tokio::spawn(async move {
                    let outcome = backend.evaluate(text).await;
                    let _ = tx.send(Input::Msg(Msg::EvalFinished { token, outcome }));
                });
            }
            Effect::FetchCatalog => {
                debug!("fetching example catalog");
                tokio::spawn(async move {
                    let outcome = backend.fetch_examples().await;
                    let _ = tx.send(Input::Msg(Msg::CatalogLoaded(outcome)));
                });
            }
        }
    }
}

/// Diagnostic channel for failures that never reach the UI.
fn report(note: Note) {
    match note {
        Note::EvalFailed { token, failure } => {
            warn!(%token, error = %failure, "evaluation failed");
        }
        Note::StaleResponse { token, latest } => {
            debug!(%token, %latest, "discarding response to superseded request");
        }
        Note::CatalogFailed(failure) => {
            warn!(error = %failure, "failed to load example catalog");
        }
        Note::CatalogEmpty => info!("example catalog is empty"),
        Note::CatalogAlreadySettled => debug!("ignoring late catalog response"),
        Note::AlreadyMounted => debug!("catalog already mounted"),
    }
}
