//! Statement metrics and tracing spans.
//!
//! `METRICS` records every executor round trip through an opentelemetry meter
//! whose readings are exported to a dedicated prometheus registry. Both halves
//! are feature-gated (`metrics`, `tracing`).

#[cfg(feature = "metrics")]
pub use self::statement_metrics::{FinderMetrics, METRICS};

#[cfg(feature = "metrics")]
mod statement_metrics {
    use once_cell::sync::Lazy;
    use opentelemetry::metrics::{Counter, Histogram, MeterProvider as _};
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::{Registry, TextEncoder};
    use std::time::Duration;

    pub static METRICS: Lazy<FinderMetrics> = Lazy::new(FinderMetrics::init);

    pub struct FinderMetrics {
        pub registry: Registry,
        provider: SdkMeterProvider,
        pub statements_total: Counter<u64>,
        pub statement_errors_total: Counter<u64>,
        pub statement_duration: Histogram<f64>,
    }

    impl FinderMetrics {
        pub fn init() -> Self {
            let registry = Registry::new();
            let provider = match opentelemetry_prometheus::exporter()
                .with_registry(registry.clone())
                .build()
            {
                Ok(exporter) => SdkMeterProvider::builder().with_reader(exporter).build(),
                Err(e) => {
                    log::warn!("Prometheus exporter unavailable, statement metrics are not exported: {e}");
                    SdkMeterProvider::builder().build()
                }
            };
            let meter = provider.meter("repomap");

            let statements_total = meter
                .u64_counter("repomap_statements_total")
                .with_description("Total statements executed")
                .build();

            let statement_errors_total = meter
                .u64_counter("repomap_statement_errors_total")
                .with_description("Statements that failed to execute")
                .build();

            let statement_duration = meter
                .f64_histogram("repomap_statement_duration_seconds")
                .with_description("Duration of statement round trips")
                .build();

            Self {
                registry,
                provider,
                statements_total,
                statement_errors_total,
                statement_duration,
            }
        }

        /// Count one statement of `kind` (`execute`, `query`, `count`) and its duration.
        pub fn record_statement(&self, kind: &'static str, elapsed: Duration) {
            let attributes = [KeyValue::new("kind", kind)];
            self.statements_total.add(1, &attributes);
            self.statement_duration.record(elapsed.as_secs_f64(), &attributes);
        }

        pub fn record_statement_error(&self, kind: &'static str) {
            self.statement_errors_total.add(1, &[KeyValue::new("kind", kind)]);
        }

        /// Prometheus text exposition of the registry.
        pub fn gather(&self) -> String {
            if let Err(e) = self.provider.force_flush() {
                log::debug!("Meter provider flush failed: {e}");
            }
            TextEncoder::new()
                .encode_to_string(&self.registry.gather())
                .unwrap_or_else(|e| {
                    log::warn!("Failed to encode statement metrics: {e}");
                    String::new()
                })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_recorded_statements_are_exported() {
            METRICS.record_statement("execute", Duration::from_millis(3));
            METRICS.record_statement_error("execute");
            let text = METRICS.gather();
            assert!(text.contains("repomap_statements_total"));
            assert!(text.contains("repomap_statement_errors_total"));
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    /// Span around one executor round trip.
    pub fn execute_statement_span(sql: &str) -> tracing::Span {
        tracing::info_span!("repomap.execute_statement", sql = %sql)
    }

    /// Span around establishing a connection.
    pub fn connect_span() -> tracing::Span {
        tracing::info_span!("repomap.connect")
    }
}
