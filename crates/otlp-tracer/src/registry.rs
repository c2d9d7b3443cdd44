//! Tracer registry.
//!
//! Tracer types are registered on an explicit [`TracerRegistry`] value
//! created during startup, rather than through process-wide side effects.
//! Each entry pairs a constructor with a [`ComponentSpec`] describing its
//! config fields for documentation.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::config::TracerConfig;
use crate::error::{BuildError, RegistryError};
use crate::exporter::TransportClient;

/// Builds a tracer's export client from the tracer config section.
pub type TracerConstructor = fn(&TracerConfig) -> Result<TransportClient, BuildError>;

/// Maturity of a registered component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Stable,
    Beta,
    Experimental,
}

/// Value type of a config field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    /// Map of string keys to values of the field's type.
    Map,
}

/// Documentation for one config field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Hidden from basic documentation views.
    pub advanced: bool,
}

impl FieldSpec {
    /// A string field with no default.
    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::String,
            description,
            examples: Vec::new(),
            default: None,
            advanced: false,
        }
    }

    /// Turns the field into a map of its current type.
    pub fn map(mut self) -> Self {
        self.kind = FieldKind::Map;
        self
    }

    pub fn with_examples(mut self, examples: impl IntoIterator<Item = serde_json::Value>) -> Self {
        self.examples = examples.into_iter().collect();
        self
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn advanced(mut self) -> Self {
        self.advanced = true;
        self
    }
}

/// Documentation for a registered component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSpec {
    pub name: &'static str,
    pub status: ComponentStatus,
    pub summary: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl ComponentSpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

struct Registration {
    spec: ComponentSpec,
    constructor: TracerConstructor,
}

/// Registered tracer types, keyed by name.
///
/// Populated once at startup and read-only afterwards.
#[derive(Default)]
pub struct TracerRegistry {
    tracers: BTreeMap<&'static str, Registration>,
}

impl TracerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tracer under `spec.name`.
    pub fn add(&mut self, spec: ComponentSpec, constructor: TracerConstructor) -> Result<(), RegistryError> {
        if self.tracers.contains_key(spec.name) {
            return Err(RegistryError::AlreadyRegistered(spec.name.to_string()));
        }
        debug!(tracer = spec.name, "registered tracer");
        self.tracers.insert(spec.name, Registration { spec, constructor });
        Ok(())
    }

    pub fn spec(&self, name: &str) -> Option<&ComponentSpec> {
        self.tracers.get(name).map(|r| &r.spec)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tracers.keys().copied()
    }

    pub fn specs(&self) -> impl Iterator<Item = &ComponentSpec> {
        self.tracers.values().map(|r| &r.spec)
    }

    pub fn len(&self) -> usize {
        self.tracers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracers.is_empty()
    }

    /// Builds the tracer named by `config.kind`.
    pub fn build(&self, config: &TracerConfig) -> Result<TransportClient, RegistryError> {
        let registration = self
            .tracers
            .get(config.kind.as_str())
            .ok_or_else(|| RegistryError::UnknownTracer(config.kind.clone()))?;
        (registration.constructor)(config).map_err(RegistryError::Build)
    }
}

impl std::fmt::Debug for TracerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracerRegistry")
            .field("tracers", &self.tracers.keys().collect::<Vec<_>>())
            .finish()
    }
}
