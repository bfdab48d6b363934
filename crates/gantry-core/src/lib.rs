//! Decision core for the Gantry CI event gate.
//!
//! Normalizes GitHub workflow events into one canonical context record,
//! detects human-authored engagement triggers, and dispatches the go/no-go
//! decision through pluggable modes. All network-facing work lives behind
//! the collaborator traits in [`collaborators`] and is implemented by the
//! runtime crate.

pub mod collaborators;
pub mod context;
pub mod event_payload;
pub mod inputs;
pub mod modes;
pub mod trigger;
