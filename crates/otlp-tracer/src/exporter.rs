//! OTLP exporter factory.
//!
//! [`build_exporter`] validates the configured protocol and hands the config
//! to one of two transport builders:
//!
//! - [`build_http_client`]: OTLP/HTTP with protobuf bodies
//! - [`build_grpc_client`]: OTLP/gRPC via tonic
//!
//! Both resolve the same [`ClientOptions`] first (endpoint, timeout, tags),
//! so they honor the same fields and fail the same way. Nothing here does
//! network I/O; the SDK clients connect on first export.

use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_otlp::{ExporterBuildError, Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::SpanExporter as _;
use opentelemetry_sdk::Resource;
use serde::Serialize;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, info};

use crate::config::{ExporterConfig, TransportProtocol};
use crate::duration::parse_duration;
use crate::error::BuildError;

/// Endpoint used by the HTTP transport when none is configured.
pub const DEFAULT_HTTP_ENDPOINT: &str = "http://localhost:4318/v1/traces";

/// Endpoint used by the gRPC transport when none is configured.
pub const DEFAULT_GRPC_ENDPOINT: &str = "http://localhost:4317";

/// Export timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Path the HTTP transport posts traces to when the endpoint has none.
pub const HTTP_TRACES_PATH: &str = "/v1/traces";

// =============================================================================
// CLIENT OPTIONS
// =============================================================================

/// Options resolved from an [`ExporterConfig`] and applied to the SDK builder.
///
/// `None` means the field was left empty and the transport default is in
/// effect. Equal configs always resolve to equal options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientOptions {
    pub protocol: TransportProtocol,
    /// Normalized endpoint URI.
    pub endpoint: Option<String>,
    pub timeout: Option<Duration>,
    pub tags: BTreeMap<String, String>,
}

impl ClientOptions {
    /// Resolves `config` for the given transport.
    ///
    /// Fails with [`BuildError::InvalidTimeout`] if `timeout` is set but
    /// unparsable. The protocol string in `config` is not consulted.
    pub fn resolve(protocol: TransportProtocol, config: &ExporterConfig) -> Result<Self, BuildError> {
        let endpoint = if config.endpoint.is_empty() {
            None
        } else {
            Some(normalize_endpoint(protocol, &config.endpoint))
        };

        let timeout = if config.timeout.is_empty() {
            None
        } else {
            let parsed = parse_duration(&config.timeout).map_err(|source| {
                BuildError::InvalidTimeout {
                    raw: config.timeout.clone(),
                    source,
                }
            })?;
            Some(parsed)
        };

        Ok(Self {
            protocol,
            endpoint,
            timeout,
            tags: config.tags.clone(),
        })
    }

    /// The endpoint the client targets, assuming no `OTEL_EXPORTER_OTLP_*`
    /// environment override.
    pub fn effective_endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(match self.protocol {
            TransportProtocol::Http => DEFAULT_HTTP_ENDPOINT,
            TransportProtocol::Grpc => DEFAULT_GRPC_ENDPOINT,
        })
    }

    pub fn effective_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Tags as an OpenTelemetry resource, without SDK-detected attributes.
    pub fn resource(&self) -> Resource {
        Resource::builder_empty()
            .with_attributes(
                self.tags
                    .iter()
                    .map(|(key, value)| KeyValue::new(key.clone(), value.clone())),
            )
            .build()
    }
}

/// Turns a configured endpoint into a URI the SDK accepts.
///
/// A missing scheme defaults to `http://`. The HTTP transport uses the URI
/// verbatim as the traces URL, so a bare `host:port` gets the OTLP traces
/// path appended.
fn normalize_endpoint(protocol: TransportProtocol, raw: &str) -> String {
    let mut endpoint = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    if protocol == TransportProtocol::Http {
        let authority_start = endpoint.find("://").map_or(0, |i| i + 3);
        let authority_end = endpoint[authority_start..]
            .find(|c: char| matches!(c, '/' | '?' | '#'))
            .map_or(endpoint.len(), |i| authority_start + i);
        let path_end = endpoint[authority_end..]
            .find(|c: char| matches!(c, '?' | '#'))
            .map_or(endpoint.len(), |i| authority_end + i);
        if endpoint[authority_end..path_end].trim_matches('/').is_empty() {
            endpoint.replace_range(authority_end..path_end, HTTP_TRACES_PATH);
        }
    }

    endpoint
}

// =============================================================================
// TRANSPORT CLIENT
// =============================================================================

/// A configured OTLP span exporter, ready to be wrapped in a span processor.
///
/// The exporter already carries the tag resource. Ownership passes to the
/// caller; the factory keeps no reference to it.
#[derive(Debug)]
pub struct TransportClient {
    options: ClientOptions,
    resource: Resource,
    exporter: SpanExporter,
}

impl TransportClient {
    pub fn protocol(&self) -> TransportProtocol {
        self.options.protocol
    }

    /// Options the exporter was built with.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Resource attached to every exported span.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn exporter(&self) -> &SpanExporter {
        &self.exporter
    }

    /// Releases the SDK exporter.
    pub fn into_exporter(self) -> SpanExporter {
        self.exporter
    }

    /// Releases the SDK exporter together with its resource, for tracer
    /// providers that set the resource themselves.
    pub fn into_parts(self) -> (SpanExporter, Resource) {
        (self.exporter, self.resource)
    }

    fn new(options: ClientOptions, mut exporter: SpanExporter) -> Self {
        let resource = options.resource();
        exporter.set_resource(&resource);
        Self {
            options,
            resource,
            exporter,
        }
    }
}

// =============================================================================
// FACTORY
// =============================================================================

/// Builds an OTLP exporter for `config`.
///
/// The protocol is matched case-insensitively. Builder errors are returned
/// as they are; nothing is retried.
///
/// # Errors
///
/// - [`BuildError::UnsupportedProtocol`] if `protocol` is not `http` or
///   `grpc`. No client is constructed.
/// - [`BuildError::InvalidTimeout`] if `timeout` does not parse.
/// - [`BuildError::ClientConstructionFailed`] if the SDK rejects the options.
/// - [`BuildError::RuntimeUnavailable`] if a gRPC client is built outside a
///   Tokio runtime and the background runtime cannot start.
pub fn build_exporter(config: &ExporterConfig) -> Result<TransportClient, BuildError> {
    let protocol = config.transport()?;
    debug!(%protocol, endpoint = %config.endpoint, timeout = %config.timeout, "building OTLP exporter");

    let client = match protocol {
        TransportProtocol::Http => build_http_client(config)?,
        TransportProtocol::Grpc => build_grpc_client(config)?,
    };

    info!(
        %protocol,
        endpoint = client.options().effective_endpoint(),
        timeout = ?client.options().effective_timeout(),
        tags = client.options().tags.len(),
        "OTLP exporter ready"
    );
    Ok(client)
}

/// Builds an OTLP/HTTP exporter. `config.protocol` is ignored.
pub fn build_http_client(config: &ExporterConfig) -> Result<TransportClient, BuildError> {
    let options = ClientOptions::resolve(TransportProtocol::Http, config)?;

    let mut builder = SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary);
    if let Some(endpoint) = &options.endpoint {
        builder = builder.with_endpoint(endpoint.clone());
    }
    if let Some(timeout) = options.timeout {
        builder = builder.with_timeout(timeout);
    }

    let exporter = builder
        .build()
        .map_err(construction_failed(TransportProtocol::Http))?;
    Ok(TransportClient::new(options, exporter))
}

/// Builds an OTLP/gRPC exporter. `config.protocol` is ignored.
///
/// The channel connects lazily, but tonic spawns its connection worker on
/// the current Tokio runtime. Called from plain synchronous code, the
/// worker goes to a background runtime shared by all such clients.
pub fn build_grpc_client(config: &ExporterConfig) -> Result<TransportClient, BuildError> {
    let options = ClientOptions::resolve(TransportProtocol::Grpc, config)?;

    let _guard = match Handle::try_current() {
        Ok(_) => None,
        Err(_) => Some(background_runtime()?.enter()),
    };

    let mut builder = SpanExporter::builder().with_tonic();
    if let Some(endpoint) = &options.endpoint {
        builder = builder.with_endpoint(endpoint.clone());
    }
    if let Some(timeout) = options.timeout {
        builder = builder.with_timeout(timeout);
    }

    let exporter = builder
        .build()
        .map_err(construction_failed(TransportProtocol::Grpc))?;
    Ok(TransportClient::new(options, exporter))
}

/// Runtime hosting gRPC connection workers for callers without one.
fn background_runtime() -> Result<&'static Runtime, BuildError> {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();

    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }
    let runtime = Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("otlp-grpc")
        .enable_all()
        .build()
        .map_err(BuildError::RuntimeUnavailable)?;
    debug!("started background runtime for OTLP/gRPC");
    Ok(RUNTIME.get_or_init(|| runtime))
}

fn construction_failed(protocol: TransportProtocol) -> impl FnOnce(ExporterBuildError) -> BuildError {
    move |source| BuildError::ClientConstructionFailed { protocol, source }
}
