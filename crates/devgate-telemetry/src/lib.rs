//! Logging and tracing for devgate
//!
//! Always installs a `tracing-subscriber` fmt layer; adds OTLP trace export
//! when an exporter is configured.

mod metadata;

use devgate_config::{ExportProtocol, ExporterConfig, TelemetryConfig, TracingConfig};
use opentelemetry::global;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};

/// Guard that flushes and shuts down the tracer provider on drop
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("failed to shutdown tracer provider: {e}");
        }
    }
}

/// Initialize telemetry from configuration
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns a guard that
/// must be held for the lifetime of the application.
///
/// # Errors
///
/// Returns an error if the OTLP span exporter cannot be built
pub fn init(config: Option<&TelemetryConfig>, default_filter: &str) -> anyhow::Result<TelemetryGuard> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Terminal output for a developer's shell
    let fmt_layer = tracing_subscriber::fmt::layer().compact().with_target(false);

    let exporter = config.and_then(|c| c.trace_exporter().map(|exporter| (c, exporter)));

    let Some((telemetry_config, exporter_config)) = exporter else {
        tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        return Ok(TelemetryGuard { tracer_provider: None });
    };

    let tracer_provider = init_tracer(telemetry_config, exporter_config)?;
    let tracer = tracer_provider.tracer("devgate");
    global::set_tracer_provider(tracer_provider.clone());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .init();

    tracing::debug!(endpoint = %exporter_config.endpoint, "OTLP trace export enabled");

    Ok(TelemetryGuard {
        tracer_provider: Some(tracer_provider),
    })
}

fn init_tracer(config: &TelemetryConfig, exporter_config: &ExporterConfig) -> anyhow::Result<SdkTracerProvider> {
    Ok(SdkTracerProvider::builder()
        .with_resource(metadata::build_resource(config))
        .with_sampler(sampler(&config.tracing))
        .with_batch_exporter(span_exporter(exporter_config)?)
        .build())
}

fn sampler(config: &TracingConfig) -> Sampler {
    let root = match config.sampling_rate {
        rate if rate >= 1.0 => Sampler::AlwaysOn,
        rate if rate <= 0.0 => Sampler::AlwaysOff,
        rate => Sampler::TraceIdRatioBased(rate),
    };

    if config.parent_based {
        Sampler::ParentBased(Box::new(root))
    } else {
        root
    }
}

fn span_exporter(config: &ExporterConfig) -> anyhow::Result<SpanExporter> {
    let endpoint = config.endpoint.as_str();
    let timeout = config.timeout_duration()?;

    let built = match config.protocol {
        ExportProtocol::Grpc => SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .with_timeout(timeout)
            .build(),
        ExportProtocol::HttpProto => SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .with_timeout(timeout)
            .build(),
    };

    built.map_err(|e| anyhow::anyhow!("failed to build {:?} span exporter for {endpoint}: {e}", config.protocol))
}
