//! Configuration for the OTLP tracer.
//!
//! [`ExporterConfig`] is a plain record of what the operator asked for. It is
//! not validated here: the exporter factory is the validation point, because
//! only it knows which fields matter for the chosen transport. The one
//! exception is deserialization, which rejects an unknown `protocol` early.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BuildError;

/// Protocol assumed when a config document omits the field.
pub const DEFAULT_PROTOCOL: &str = "http";

/// OTLP transports the factory can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportProtocol {
    /// OTLP/HTTP with protobuf-encoded bodies.
    Http,
    /// OTLP/gRPC over a multiplexed HTTP/2 connection.
    Grpc,
}

impl TransportProtocol {
    /// The identifier used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Grpc => "grpc",
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportProtocol {
    type Err = BuildError;

    /// Case-insensitive. Anything else, including the empty string, is
    /// [`BuildError::UnsupportedProtocol`] holding the input as written.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "grpc" => Ok(Self::Grpc),
            _ => Err(BuildError::UnsupportedProtocol(s.to_string())),
        }
    }
}

/// Where and how to send spans.
///
/// `ExporterConfig::new()` is the canonical empty baseline: every field is
/// empty and the transport defaults apply. Deserializing fills missing
/// fields from the documented defaults instead, so a document that only
/// sets `endpoint` still selects the `http` transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Collector address, `host[:port][/path]` or a full URI. Empty selects
    /// the transport default.
    #[serde(default)]
    pub endpoint: String,

    /// Transport identifier, `http` or `grpc` in any letter case.
    #[serde(
        default = "default_protocol",
        deserialize_with = "deserialize_protocol"
    )]
    pub protocol: String,

    /// Attached to every exported span as resource attributes.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Per-export timeout such as `"5s"`. Empty selects the transport
    /// default.
    #[serde(default)]
    pub timeout: String,
}

fn default_protocol() -> String {
    DEFAULT_PROTOCOL.to_string()
}

/// Keeps the protocol as written but refuses values the factory would
/// reject anyway.
fn deserialize_protocol<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    TransportProtocol::from_str(&s).map_err(serde::de::Error::custom)?;
    Ok(s)
}

impl ExporterConfig {
    /// Creates the empty baseline configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the collector endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the transport protocol identifier.
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Adds a span tag, replacing any previous value for `key`.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Sets the export timeout string.
    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = timeout.into();
        self
    }

    /// Resolves `protocol` to a transport.
    pub fn transport(&self) -> Result<TransportProtocol, BuildError> {
        self.protocol.parse()
    }
}

/// The tracer section of a platform config: which tracer to build, plus the
/// settings for each tracer type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    /// Registered tracer name, e.g. `"otlp"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Settings for the `otlp` tracer. A missing section gets the same
    /// documented defaults as a missing field.
    #[serde(default = "default_otlp")]
    pub otlp: ExporterConfig,
}

fn default_otlp() -> ExporterConfig {
    ExporterConfig::new().with_protocol(DEFAULT_PROTOCOL)
}

impl TracerConfig {
    /// Creates a config selecting the `otlp` tracer.
    pub fn otlp(config: ExporterConfig) -> Self {
        Self {
            kind: "otlp".to_string(),
            otlp: config,
        }
    }
}
