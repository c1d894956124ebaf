//! Named collections of independent state machines and their bootstrap.

mod bootstrap;
mod loader;

pub use bootstrap::{Bootstrap, BootstrapMode, BootstrapSettings, Bootstrapped, StateMachineSettings};
pub use loader::{DirectoryLoader, MemoryLoader, ResourceLoader};

use crate::error::{Result, StateMachineError};
use crate::machine::StateMachine;
use std::collections::{BTreeMap, BTreeSet};

/// Name-keyed, immutable collection of state machines.
#[derive(Debug, Clone, Default)]
pub struct StateMachineRegistry {
    machines: BTreeMap<String, StateMachine>,
}

impl StateMachineRegistry {
    pub(crate) fn new(machines: BTreeMap<String, StateMachine>) -> Self {
        Self { machines }
    }

    /// Look up a machine by name.
    ///
    /// An unknown name fails with `UnknownStateMachine`, listing every
    /// registered name in sorted order.
    pub fn get(&self, name: &str) -> Result<&StateMachine> {
        self.machines
            .get(name)
            .ok_or_else(|| StateMachineError::UnknownStateMachine {
                name: name.to_string(),
                available: self.machines.keys().cloned().collect(),
            })
    }

    pub fn names(&self) -> BTreeSet<&str> {
        self.machines.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Machines in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateMachine)> {
        self.machines.iter().map(|(name, m)| (name.as_str(), m))
    }
}
