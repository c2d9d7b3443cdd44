//! The `otlp` tracer component.

use serde_json::json;

use crate::config::TracerConfig;
use crate::error::{BuildError, RegistryError};
use crate::exporter::{build_exporter, TransportClient};
use crate::registry::{ComponentSpec, ComponentStatus, FieldSpec, TracerRegistry};

/// Name the component is registered under.
pub const OTLP_TRACER: &str = "otlp";

/// Endpoint shown in the docs. Matches what the `http` transport resolves an
/// empty endpoint to, minus the traces path.
pub const DOCUMENTED_ENDPOINT: &str = "http://localhost:4318";

/// Documentation for the `otlp` tracer's config fields.
pub fn otlp_spec() -> ComponentSpec {
    ComponentSpec {
        name: OTLP_TRACER,
        status: ComponentStatus::Stable,
        summary: "Send tracing events to an [OpenTelemetry Collector](https://opentelemetry.io/docs/collector/).",
        fields: vec![
            FieldSpec::string(
                "endpoint",
                "Target to which the exporter sends traces. A URI with scheme (http or https) and host, optionally with a port and path. The scheme defaults to http when omitted.",
            )
            .with_examples([json!(DOCUMENTED_ENDPOINT)])
            .with_default(json!(DOCUMENTED_ENDPOINT)),
            FieldSpec::string(
                "protocol",
                "The OTLP transport protocol used to reach the collector, `http` or `grpc`.",
            )
            .with_examples([json!("http"), json!("grpc")])
            .with_default(json!("http")),
            FieldSpec::string("tags", "A map of tags added to every tracing span.")
                .map()
                .advanced()
                .with_default(json!({})),
            FieldSpec::string(
                "timeout",
                "Max time to wait for the backend to accept a batch, e.g. `5s` or `500ms`.",
            )
            .with_examples([json!("5s")]),
        ],
    }
}

fn build_otlp(config: &TracerConfig) -> Result<TransportClient, BuildError> {
    build_exporter(&config.otlp)
}

/// Adds the `otlp` tracer to `registry`.
pub fn register(registry: &mut TracerRegistry) -> Result<(), RegistryError> {
    registry.add(otlp_spec(), build_otlp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_fields() {
        let spec = otlp_spec();
        assert_eq!(spec.name, "otlp");
        assert_eq!(spec.status, ComponentStatus::Stable);

        let names: Vec<_> = spec.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, ["endpoint", "protocol", "tags", "timeout"]);

        assert_eq!(spec.field("protocol").unwrap().default, Some(json!("http")));
        assert_eq!(spec.field("endpoint").unwrap().default, Some(json!(DOCUMENTED_ENDPOINT)));
        assert!(spec.field("tags").unwrap().advanced);
        assert!(spec.field("timeout").unwrap().default.is_none());
    }

    #[test]
    fn test_register_twice_fails() {
        let mut registry = TracerRegistry::new();
        register(&mut registry).unwrap();
        assert!(matches!(
            register(&mut registry),
            Err(RegistryError::AlreadyRegistered(_))
        ));
    }
}
