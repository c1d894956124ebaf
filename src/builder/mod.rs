//! Builder API for assembling state machines and registries.
//!
//! [`StateMachineBuilder`] pairs a configuration document with the
//! evaluator and publisher a machine should use. [`RegistryBuilder`] does
//! the same for many named machines sharing one evaluator and publisher.
//! [`ConfigBuilder`] assembles a configuration in code instead of parsing
//! one.

pub mod config;
pub mod error;
pub mod machine;
pub mod macros;
pub mod registry;

pub use config::{ConfigBuilder, TransitionBuilder};
pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use registry::RegistryBuilder;

use crate::core::{DocumentFormat, StateMachineConfig};
use crate::error::ConfigError;

/// Where a machine's configuration comes from.
#[derive(Debug, Clone)]
pub(crate) enum DocumentSource {
    Parsed(StateMachineConfig),
    Raw {
        bytes: Vec<u8>,
        format: DocumentFormat,
    },
}

impl DocumentSource {
    pub(crate) fn into_config(self) -> Result<StateMachineConfig, ConfigError> {
        match self {
            Self::Parsed(config) => Ok(config),
            Self::Raw { bytes, format } => StateMachineConfig::from_slice(&bytes, format),
        }
    }
}
