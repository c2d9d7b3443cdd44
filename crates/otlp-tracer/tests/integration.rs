use otlp_tracer::component::{OTLP_TRACER, DOCUMENTED_ENDPOINT};
use otlp_tracer::exporter::{DEFAULT_GRPC_ENDPOINT, DEFAULT_HTTP_ENDPOINT, DEFAULT_TIMEOUT};
use otlp_tracer::{
    build_exporter, init_registry, BuildError, ExporterConfig, RegistryError, TracerConfig,
    TransportProtocol,
};
use proptest::prelude::*;
use std::time::Duration;

fn flip_case(word: &str, upper: &[bool]) -> String {
    word.chars()
        .zip(upper)
        .map(|(c, &up)| if up { c.to_ascii_uppercase() } else { c })
        .collect()
}

#[test]
fn test_registry_has_otlp() {
    let registry = init_registry().unwrap();
    assert_eq!(registry.names().collect::<Vec<_>>(), vec![OTLP_TRACER]);

    let spec = registry.spec(OTLP_TRACER).unwrap();
    assert!(spec.summary.contains("OpenTelemetry Collector"));
    assert_eq!(
        spec.field("endpoint").unwrap().default,
        Some(serde_json::json!(DOCUMENTED_ENDPOINT))
    );
}

#[test]
fn test_documented_endpoint_matches_http_default() {
    let documented = ExporterConfig::new()
        .with_protocol("http")
        .with_endpoint(DOCUMENTED_ENDPOINT);
    let client = build_exporter(&documented).unwrap();
    assert_eq!(client.options().effective_endpoint(), DEFAULT_HTTP_ENDPOINT);

    let empty = build_exporter(&ExporterConfig::new().with_protocol("http")).unwrap();
    assert_eq!(empty.options().effective_endpoint(), DEFAULT_HTTP_ENDPOINT);
}

#[test]
fn test_registry_builds_from_parsed_config() {
    let registry = init_registry().unwrap();
    let config: TracerConfig = serde_json::from_str(
        r#"{
            "type": "otlp",
            "otlp": {
                "endpoint": "collector:4318",
                "protocol": "Http",
                "tags": { "service.name": "ingest", "env": "prod" },
                "timeout": "5s"
            }
        }"#,
    )
    .unwrap();

    let client = registry.build(&config).unwrap();
    assert_eq!(client.protocol(), TransportProtocol::Http);
    assert_eq!(client.options().timeout, Some(Duration::from_secs(5)));
    assert_eq!(client.options().tags.len(), 2);
    assert_eq!(client.resource().len(), 2);
}

#[test]
fn test_registry_builds_config_without_otlp_section() {
    let registry = init_registry().unwrap();
    let config: TracerConfig = serde_json::from_str(r#"{"type": "otlp"}"#).unwrap();

    let client = registry.build(&config).unwrap();
    assert_eq!(client.protocol(), TransportProtocol::Http);
    assert_eq!(client.options().effective_endpoint(), DEFAULT_HTTP_ENDPOINT);
}

#[test]
fn test_grpc_from_synchronous_caller() {
    let registry = init_registry().unwrap();
    let config = TracerConfig::otlp(ExporterConfig::new().with_protocol("grpc"));

    let client = registry.build(&config).unwrap();
    assert_eq!(client.options().effective_endpoint(), DEFAULT_GRPC_ENDPOINT);
    assert_eq!(client.options().effective_timeout(), DEFAULT_TIMEOUT);
}

#[test]
fn test_registry_surfaces_build_errors() {
    let registry = init_registry().unwrap();
    let config = TracerConfig::otlp(ExporterConfig::new().with_protocol("http").with_timeout("5 seconds"));

    match registry.build(&config) {
        Err(RegistryError::Build(BuildError::InvalidTimeout { raw, .. })) => assert_eq!(raw, "5 seconds"),
        other => panic!("expected InvalidTimeout, got {other:?}"),
    }
}

#[test]
fn test_registry_rejects_unknown_tracer() {
    let registry = init_registry().unwrap();
    let config = TracerConfig {
        kind: "zipkin".to_string(),
        otlp: ExporterConfig::new().with_protocol("http"),
    };
    assert!(matches!(
        registry.build(&config),
        Err(RegistryError::UnknownTracer(kind)) if kind == "zipkin"
    ));
}

#[test]
fn test_http_defaults_for_empty_fields() {
    let client = build_exporter(&ExporterConfig::new().with_protocol("http")).unwrap();
    let options = client.options();
    assert_eq!(options.endpoint, None);
    assert_eq!(options.timeout, None);
    assert_eq!(options.effective_timeout(), DEFAULT_TIMEOUT);
    assert!(client.resource().is_empty());
}

#[test]
fn test_builds_are_independent() {
    let config = ExporterConfig::new()
        .with_protocol("http")
        .with_endpoint("localhost:4318")
        .with_tag("env", "test")
        .with_timeout("3s");

    let first = build_exporter(&config).unwrap();
    let second = build_exporter(&config).unwrap();
    assert_eq!(first.options(), second.options());
    assert_eq!(first.resource().len(), second.resource().len());

    // Consuming one client leaves the other untouched.
    let (_exporter, resource) = first.into_parts();
    assert_eq!(resource.len(), 1);
    assert_eq!(second.options().timeout, Some(Duration::from_secs(3)));
}

#[tokio::test]
async fn test_grpc_through_registry() {
    let registry = init_registry().unwrap();
    let config = TracerConfig::otlp(ExporterConfig::new().with_protocol("gRPC"));

    let client = registry.build(&config).unwrap();
    assert_eq!(client.protocol(), TransportProtocol::Grpc);
    assert_eq!(client.options().effective_endpoint(), DEFAULT_GRPC_ENDPOINT);
    let _exporter = client.into_exporter();
}

proptest! {
    #[test]
    fn prop_protocol_case_is_ignored(upper in prop::collection::vec(any::<bool>(), 4)) {
        let http = flip_case("http", &upper);
        let grpc = flip_case("grpc", &upper);
        prop_assert_eq!(http.parse::<TransportProtocol>().unwrap(), TransportProtocol::Http);
        prop_assert_eq!(grpc.parse::<TransportProtocol>().unwrap(), TransportProtocol::Grpc);
    }

    #[test]
    fn prop_unknown_protocol_reported_verbatim(raw in "[a-zA-Z0-9/_-]{0,12}") {
        let lower = raw.to_ascii_lowercase();
        prop_assume!(lower != "http" && lower != "grpc");

        match build_exporter(&ExporterConfig::new().with_protocol(raw.clone())) {
            Err(BuildError::UnsupportedProtocol(value)) => prop_assert_eq!(value, raw),
            other => prop_assert!(false, "expected UnsupportedProtocol, got {:?}", other),
        }
    }
}
