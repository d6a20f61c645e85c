//! ## irrbloss-telemetry::logging
//! **Structured logging with tracing and OpenTelemetry**

use opentelemetry::KeyValue;
use tracing::{info_span, Instrument};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    pub fn init() {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_thread_names(true)
            .with_span_events(FmtSpan::ENTER)
            .init()
    }

    /// Configured variant: level from config unless `RUST_LOG` overrides,
    /// optional JSON output.
    pub fn init_with(level: &str, json: bool) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
        let builder = fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .with_span_events(FmtSpan::ENTER);
        if json {
            builder.json().init();
        } else {
            builder.init();
        }
    }

    #[inline]
    pub async fn log_event(event_type: &str, metadata: Vec<KeyValue>) {
        let span = info_span!("chaff_event", event_type = event_type, otel.kind = "INTERNAL");

        async {
            tracing::info!(
                metadata = ?metadata,
                "Chaff event occurred"
            );
        }
        .instrument(span)
        .await
    }
}
