use anyhow::{Context as _, Result};
use opentelemetry::{
    Context, KeyValue,
    global::{self, BoxedTracer},
    trace::{Span, SpanKind, TraceContextExt, Tracer},
};
use opentelemetry_otlp::{LogExporter, MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    Resource, logs::SdkLoggerProvider, metrics::SdkMeterProvider, trace::SdkTracerProvider,
};
use tokio::time::Instant;
use tracing::{error, info, warn};

use super::metrics::{Method, Metrics, Status};

pub struct Telemetry {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
    logger_provider: SdkLoggerProvider,
}

impl Telemetry {
    /// Builds OTLP/gRPC exporters and installs the tracer and meter providers globally.
    pub fn init(service_name: &str, otel_endpoint: &str) -> Result<Self> {
        let resource = Resource::builder()
            .with_service_name(service_name.to_string())
            .build();

        let span_exporter = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(otel_endpoint)
            .build()
            .context("Failed to create span exporter")?;

        let tracer_provider = SdkTracerProvider::builder()
            .with_resource(resource.clone())
            .with_batch_exporter(span_exporter)
            .build();

        let metric_exporter = MetricExporter::builder()
            .with_tonic()
            .with_endpoint(otel_endpoint)
            .build()
            .context("Failed to create metric exporter")?;

        let meter_provider = SdkMeterProvider::builder()
            .with_resource(resource.clone())
            .with_periodic_exporter(metric_exporter)
            .build();

        let log_exporter = LogExporter::builder()
            .with_tonic()
            .with_endpoint(otel_endpoint)
            .build()
            .context("Failed to create log exporter")?;

        let logger_provider = SdkLoggerProvider::builder()
            .with_resource(resource)
            .with_batch_exporter(log_exporter)
            .build();

        global::set_tracer_provider(tracer_provider.clone());
        global::set_meter_provider(meter_provider.clone());

        Ok(Self {
            tracer_provider,
            meter_provider,
            logger_provider,
        })
    }

    pub fn logger_provider(&self) -> &SdkLoggerProvider {
        &self.logger_provider
    }

    pub fn shutdown(self) -> Result<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.tracer_provider.shutdown() {
            errors.push(format!("tracer provider: {e}"));
        }
        if let Err(e) = self.meter_provider.shutdown() {
            errors.push(format!("meter provider: {e}"));
        }
        if let Err(e) = self.logger_provider.shutdown() {
            errors.push(format!("logger provider: {e}"));
        }

        if !errors.is_empty() {
            anyhow::bail!("Failed to shutdown providers:\n{}", errors.join("\n"));
        }

        Ok(())
    }
}

/// Span plus timing for a single service operation. Falls back to the no-op
/// tracer when no provider is installed.
pub struct TracingContext {
    pub cx: Context,
    pub start_time: Instant,
    operation: String,
    method: Method,
}

impl TracingContext {
    pub fn start(
        tracer_name: &'static str,
        operation: &str,
        method: Method,
        attributes: Vec<KeyValue>,
    ) -> Self {
        let start_time = Instant::now();
        let tracer: BoxedTracer = global::tracer(tracer_name);
        let mut span = tracer
            .span_builder(operation.to_string())
            .with_kind(SpanKind::Server)
            .with_attributes(attributes)
            .start(&tracer);

        span.add_event(
            "Operation started",
            vec![KeyValue::new("operation", operation.to_string())],
        );

        Self {
            cx: Context::current_with_span(span),
            start_time,
            operation: operation.to_string(),
            method,
        }
    }

    pub fn success(self, metrics: &Metrics, message: &str) {
        info!("✅ {}: {message}", self.operation);
        self.complete(metrics, Status::Success, message);
    }

    /// The caller did something wrong; the service itself is healthy.
    pub fn rejected(self, metrics: &Metrics, message: &str) {
        warn!("⚠️ {} rejected: {message}", self.operation);
        self.complete(metrics, Status::Rejected, message);
    }

    pub fn failure(self, metrics: &Metrics, message: &str) {
        error!("❌ {} failed: {message}", self.operation);
        self.complete(metrics, Status::Error, message);
    }

    fn complete(self, metrics: &Metrics, status: Status, message: &str) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let status_str = match status {
            Status::Success => "SUCCESS",
            Status::Rejected => "REJECTED",
            Status::Error => "ERROR",
        };

        let span = self.cx.span();
        span.add_event(
            "Operation completed",
            vec![
                KeyValue::new("status", status_str),
                KeyValue::new("duration_secs", elapsed.to_string()),
                KeyValue::new("message", message.to_string()),
            ],
        );
        span.end();

        metrics.record(&self.operation, self.method, status, elapsed);
    }
}
