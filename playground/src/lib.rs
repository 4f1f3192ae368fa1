//! Core of a browser-style "try it" playground.
//!
//! An editor submits snippets to a remote evaluator and shows the returned
//! JSON; an example catalog is fetched once and pushes the chosen snippet into
//! the editor. The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure state and the single [`core::update::update`]
//!   transition. No I/O, fully testable in isolation.
//! - **[`io`]**: HTTP backend, configuration, and frame sinks.
//! - **[`view`]**: Pure rendering of state into a [`view::Frame`].
//!
//! [`session`] ties them together: one task owns the state, effects run as
//! spawned tasks, and a fixed-cadence ticker redraws.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod view;
