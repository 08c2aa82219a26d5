//! Block Gate (workspace facade crate).
//!
//! Re-exports the workspace crates under one roof as
//! `block_gate::{types, core, engine, adapter}`; the implementation lives in
//! dedicated crates under `crates/`.

pub use block_gate_adapter as adapter;
pub use block_gate_core as core;
pub use block_gate_engine as engine;
pub use block_gate_types as types;
