//! Error types for exporter construction and tracer registration.

use opentelemetry_otlp::ExporterBuildError;
use thiserror::Error;

use crate::config::TransportProtocol;

/// Errors produced while parsing a duration string such as `"5s"`.
///
/// Every variant carries the offending input so messages can be shown to
/// operators unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// The input was empty.
    #[error("empty duration")]
    Empty,

    /// A segment had no digits, or a malformed fraction.
    #[error("invalid duration '{0}'")]
    InvalidNumber(String),

    /// A number was not followed by a unit suffix.
    #[error("missing unit in duration '{0}'")]
    MissingUnit(String),

    /// The unit suffix is not one of `ns`, `us`, `µs`, `ms`, `s`, `m`, `h`.
    #[error("unknown unit '{unit}' in duration '{input}'")]
    UnknownUnit { unit: String, input: String },

    /// Negative durations cannot be represented.
    #[error("negative duration '{0}'")]
    Negative(String),

    /// The total does not fit in 64-bit nanoseconds.
    #[error("duration '{0}' overflows")]
    Overflow(String),
}

/// Errors returned by [`build_exporter`](crate::exporter::build_exporter).
///
/// None of these are transient. They describe a configuration the operator
/// has to fix before the tracer subsystem can start.
#[derive(Debug, Error)]
pub enum BuildError {
    /// `protocol` did not name a known transport. Holds the value exactly as
    /// it was configured.
    #[error("unsupported OTLP protocol value '{0}'")]
    UnsupportedProtocol(String),

    /// `timeout` could not be parsed as a duration.
    #[error("invalid timeout value '{raw}': {source}")]
    InvalidTimeout {
        raw: String,
        #[source]
        source: DurationError,
    },

    /// The OpenTelemetry SDK rejected the exporter options.
    #[error("failed to construct OTLP {protocol} client: {source}")]
    ClientConstructionFailed {
        protocol: TransportProtocol,
        #[source]
        source: ExporterBuildError,
    },

    /// No Tokio runtime was current and the background runtime for gRPC
    /// connection workers could not be started.
    #[error("failed to start runtime for OTLP gRPC client: {0}")]
    RuntimeUnavailable(#[source] std::io::Error),
}

impl BuildError {
    /// Returns `true` if the error comes from a configured value rather than
    /// from the SDK client builder.
    #[inline]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedProtocol(_) | Self::InvalidTimeout { .. }
        )
    }
}

/// Errors from [`TracerRegistry`](crate::registry::TracerRegistry).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A tracer with this name was added twice.
    #[error("tracer '{0}' is already registered")]
    AlreadyRegistered(String),

    /// The tracer config named a type no one registered.
    #[error("tracer type '{0}' was not recognised")]
    UnknownTracer(String),

    /// The tracer's constructor failed.
    #[error(transparent)]
    Build(#[from] BuildError),
}
