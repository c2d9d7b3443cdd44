//! OTLP Tracer
//!
//! Builds OpenTelemetry span exporters from declarative tracer configuration.
//! An [`ExporterConfig`] names a collector endpoint, a transport (`http` or
//! `grpc`), span tags and an optional timeout; [`build_exporter`] turns it into
//! a configured [`TransportClient`] or a [`BuildError`] that says exactly
//! which value was wrong.
//!
//! ```no_run
//! use otlp_tracer::{build_exporter, ExporterConfig};
//!
//! let config = ExporterConfig::new()
//!     .with_protocol("http")
//!     .with_endpoint("collector:4318")
//!     .with_tag("service.name", "ingest")
//!     .with_timeout("5s");
//!
//! let client = build_exporter(&config)?;
//! let exporter = client.into_exporter();
//! # drop(exporter);
//! # Ok::<(), otlp_tracer::BuildError>(())
//! ```
//!
//! Batching, sampling, retries and provider shutdown are left to the
//! OpenTelemetry SDK that wraps the exporter.

pub mod component;
pub mod config;
pub mod duration;
pub mod error;
pub mod exporter;
pub mod registry;

// Re-export main types
pub use config::{ExporterConfig, TracerConfig, TransportProtocol};
pub use error::{BuildError, DurationError, RegistryError};
pub use exporter::{build_exporter, build_grpc_client, build_http_client, ClientOptions, TransportClient};
pub use registry::{ComponentSpec, ComponentStatus, FieldKind, FieldSpec, TracerConstructor, TracerRegistry};

/// Creates a registry holding every built-in tracer.
pub fn init_registry() -> Result<TracerRegistry, RegistryError> {
    let mut registry = TracerRegistry::new();
    component::register(&mut registry)?;
    Ok(registry)
}
