//! Deterministic, pure logic for the playground.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! state and return effects for the session to run.

pub mod catalog;
pub mod editor;
pub mod types;
pub mod update;
