//! Bubble Pop (workspace facade crate).
//!
//! Exposes the engine as `bubble_pop::{core, types}` while the implementation
//! lives in dedicated crates under `crates/`, plus the environment-driven
//! runner configuration used by the `bubble-pop` binary.

pub mod config;

pub use bubble_pop_core as core;
pub use bubble_pop_types as types;
