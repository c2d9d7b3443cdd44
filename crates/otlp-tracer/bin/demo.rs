//! # OTLP Tracer Demo
//!
//! Builds an OTLP exporter from a JSON tracer config and prints the options
//! it resolved to. No spans are sent.
//!
//! ## Running
//!
//! ```bash
//! # Documented defaults (otlp over http to localhost:4318)
//! cargo run -p otlp-tracer --features demo --bin demo
//!
//! # From a config file
//! cargo run -p otlp-tracer --features demo --bin demo -- tracer.json
//!
//! # Print the registered component docs
//! cargo run -p otlp-tracer --features demo --bin demo -- --describe
//!
//! # See what the factory logs
//! RUST_LOG=otlp_tracer=debug cargo run -p otlp-tracer --features demo --bin demo
//! ```
//!
//! A config file looks like:
//!
//! ```json
//! {
//!   "type": "otlp",
//!   "otlp": {
//!     "endpoint": "localhost:4317",
//!     "protocol": "grpc",
//!     "tags": { "service.name": "ingest" },
//!     "timeout": "5s"
//!   }
//! }
//! ```

use anyhow::Context;
use otlp_tracer::{init_registry, TracerConfig};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let registry = init_registry()?;
    let arg = std::env::args().nth(1);

    if arg.as_deref() == Some("--describe") {
        let specs: Vec<_> = registry.specs().collect();
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }

    let config: TracerConfig = match arg {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading tracer config {path}"))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing tracer config {path}"))?
        }
        None => serde_json::from_str(r#"{"type": "otlp"}"#)?,
    };

    let client = registry
        .build(&config)
        .with_context(|| format!("building tracer '{}'", config.kind))?;

    let options = client.options();
    println!("=== {} exporter ===", options.protocol);
    println!("endpoint: {}", options.effective_endpoint());
    println!("timeout:  {:?}", options.effective_timeout());
    for (key, value) in &options.tags {
        println!("tag:      {key}={value}");
    }

    Ok(())
}
