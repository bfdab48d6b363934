//! Mapping from mode name to mode implementation.
//!
//! The registry is an owned, injectable component: callers construct one per
//! process and pass it wherever modes are resolved. Built-ins are seeded on
//! first lookup; `reset` returns the instance to the unseeded state.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};

use super::tag::TagMode;
use super::Mode;

pub const DEFAULT_MODE: &str = "tag";

/// Names the shipped configuration surface accepts. Deliberately narrower
/// than the runtime registry, which also answers for dynamically registered
/// modes; this static set is what early input validation checks against.
pub const VALID_MODES: &[&str] = &["tag"];

pub fn is_valid_mode(name: &str) -> bool {
    VALID_MODES.contains(&name)
}

#[derive(Default)]
/// Public struct `ModeRegistry` used across Gantry components.
pub struct ModeRegistry {
    bindings: HashMap<String, Arc<dyn Mode>>,
    initialized: bool,
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the binding for the mode's name. Last write wins.
    pub fn register(&mut self, mode: Arc<dyn Mode>) {
        self.bindings.insert(mode.name().to_string(), mode);
    }

    /// Seeds built-ins on first use, then returns the bound implementation.
    /// Failure enumerates the currently valid names to aid diagnosing
    /// workflow misconfiguration.
    pub fn get(&mut self, name: &str) -> Result<Arc<dyn Mode>> {
        self.seed_builtins();
        match self.bindings.get(name) {
            Some(mode) => Ok(Arc::clone(mode)),
            None => {
                let mut known: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
                known.sort_unstable();
                bail!(
                    "invalid mode '{name}'; valid modes are: {}",
                    known.join(", ")
                );
            }
        }
    }

    /// Clears all bindings and the seed flag so the next `get` re-seeds
    /// built-ins from scratch.
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.initialized = false;
    }

    fn seed_builtins(&mut self) {
        if self.initialized {
            return;
        }
        self.bindings
            .insert(DEFAULT_MODE.to_string(), Arc::new(TagMode));
        self.initialized = true;
    }
}
