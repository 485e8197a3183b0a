//! Observability helpers shared by Next Step services.
//!
//! Logging goes through `tracing`; when an OTLP endpoint is configured the
//! subscriber also exports spans through `opentelemetry-otlp`.

pub mod logging;
