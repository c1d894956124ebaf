//! Settings-driven construction of a single machine or a registry.
//!
//! A host settings document carries one of two keys under
//! `simple-state-machine`:
//!
//! ```yaml
//! simple-state-machine:
//!   definition: classpath:machines/order.json   # single machine
//! ```
//!
//! ```yaml
//! simple-state-machine:
//!   definitions:                                # one machine per name
//!     order: classpath:machines/order.json
//!     payment: classpath:machines/payment.yaml
//! ```
//!
//! Setting neither leaves bootstrap disabled. Setting both is an error.

use super::{ResourceLoader, StateMachineRegistry};
use crate::builder::{RegistryBuilder, StateMachineBuilder};
use crate::core::DocumentFormat;
use crate::error::ConfigError;
use crate::events::EventPublisher;
use crate::expression::ExpressionEvaluator;
use crate::machine::StateMachine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

const ROOT_KEY: &str = "simple-state-machine";

/// Host settings relevant to bootstrap. Unrelated keys are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapSettings {
    #[serde(rename = "simple-state-machine", default)]
    pub state_machine: StateMachineSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMachineSettings {
    /// Resource path of the single machine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    /// Logical name to resource path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, String>,
}

/// Which bootstrap the settings ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapMode<'a> {
    Disabled,
    Single(&'a str),
    Multi(&'a BTreeMap<String, String>),
}

impl BootstrapSettings {
    pub fn single(path: impl Into<String>) -> Self {
        Self {
            state_machine: StateMachineSettings {
                definition: Some(path.into()),
                definitions: BTreeMap::new(),
            },
        }
    }

    pub fn multi<I, K, V>(definitions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            state_machine: StateMachineSettings {
                definition: None,
                definitions: definitions
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            },
        }
    }

    pub fn from_yaml_str(document: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(document).map_err(|e| ConfigError::Parse {
            format: DocumentFormat::Yaml,
            reason: e.to_string(),
        })
    }

    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(document).map_err(|e| ConfigError::Parse {
            format: DocumentFormat::Json,
            reason: e.to_string(),
        })
    }

    /// Read flat, dotted properties such as
    /// `simple-state-machine.definitions.order=machines/order.json`.
    /// Keys outside `simple-state-machine` are ignored.
    pub fn from_properties<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut settings = StateMachineSettings::default();
        for (key, value) in properties {
            let Some(rest) = key
                .as_ref()
                .strip_prefix(ROOT_KEY)
                .and_then(|k| k.strip_prefix('.'))
            else {
                continue;
            };

            if rest == "definition" {
                settings.definition = Some(value.into());
            } else if let Some(name) = rest.strip_prefix("definitions.") {
                if !name.is_empty() {
                    settings.definitions.insert(name.to_string(), value.into());
                }
            }
        }
        Self {
            state_machine: settings,
        }
    }

    /// Blank `definition` values and empty `definitions` maps count as
    /// unset.
    pub fn mode(&self) -> Result<BootstrapMode<'_>, ConfigError> {
        let single = self
            .state_machine
            .definition
            .as_deref()
            .filter(|path| !path.trim().is_empty());
        let multi = &self.state_machine.definitions;

        match (single, multi.is_empty()) {
            (Some(_), false) => Err(ConfigError::ConflictingModes),
            (Some(path), true) => Ok(BootstrapMode::Single(path)),
            (None, false) => Ok(BootstrapMode::Multi(multi)),
            (None, true) => Ok(BootstrapMode::Disabled),
        }
    }
}

/// Outcome of [`Bootstrap::run`].
#[derive(Debug, Clone)]
pub enum Bootstrapped {
    Disabled,
    Single(StateMachine),
    Multi(StateMachineRegistry),
}

impl Bootstrapped {
    pub fn into_single(self) -> Option<StateMachine> {
        match self {
            Self::Single(machine) => Some(machine),
            _ => None,
        }
    }

    pub fn into_registry(self) -> Option<StateMachineRegistry> {
        match self {
            Self::Multi(registry) => Some(registry),
            _ => None,
        }
    }
}

/// Builds machines from settings, loading documents through a
/// [`ResourceLoader`].
///
/// The document format follows the resource extension (`.yaml`/`.yml`
/// for YAML, JSON otherwise).
pub struct Bootstrap<L> {
    loader: L,
    evaluator: Option<Arc<dyn ExpressionEvaluator>>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl<L: ResourceLoader> Bootstrap<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            evaluator: None,
            publisher: None,
        }
    }

    pub fn evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn run(&self, settings: &BootstrapSettings) -> Result<Bootstrapped, ConfigError> {
        match settings.mode()? {
            BootstrapMode::Disabled => {
                tracing::info!("no state machine definitions configured");
                Ok(Bootstrapped::Disabled)
            }
            BootstrapMode::Single(path) => self.single(path).map(Bootstrapped::Single),
            BootstrapMode::Multi(definitions) => self.multi(definitions).map(Bootstrapped::Multi),
        }
    }

    fn single(&self, path: &str) -> Result<StateMachine, ConfigError> {
        let bytes = self.loader.load(path)?;
        tracing::info!(resource = %path, "bootstrapping single state machine");

        let mut builder = StateMachineBuilder::new().document(bytes, DocumentFormat::from_path(path));
        if let Some(evaluator) = &self.evaluator {
            builder = builder.evaluator(Arc::clone(evaluator));
        }
        if let Some(publisher) = &self.publisher {
            builder = builder.publisher(Arc::clone(publisher));
        }
        builder.build()
    }

    fn multi(&self, definitions: &BTreeMap<String, String>) -> Result<StateMachineRegistry, ConfigError> {
        let mut builder = RegistryBuilder::new();
        for (name, path) in definitions {
            let bytes = self.loader.load(path).map_err(|source| ConfigError::Machine {
                name: name.clone(),
                source: Box::new(source),
            })?;
            builder = builder.document(name.as_str(), bytes, DocumentFormat::from_path(path));
        }

        if let Some(evaluator) = &self.evaluator {
            builder = builder.evaluator(Arc::clone(evaluator));
        }
        if let Some(publisher) = &self.publisher {
            builder = builder.publisher(Arc::clone(publisher));
        }
        builder.build()
    }
}
