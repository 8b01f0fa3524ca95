use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Timeout applied to OTLP exports when none is configured
const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Optional OpenTelemetry trace export
///
/// Console logging is always on; this section only controls whether spans
/// also leave the process.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// `service.name` resource attribute
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Extra resource attributes attached to every span
    #[serde(default)]
    pub resource_attributes: HashMap<String, String>,
    /// Exporter shared by every signal unless overridden
    #[serde(default)]
    pub exporter: Option<ExporterConfig>,
    #[serde(default)]
    pub tracing: TracingConfig,
}

impl TelemetryConfig {
    /// Exporter used for spans; `tracing.exporter` wins over `exporter`
    pub fn trace_exporter(&self) -> Option<&ExporterConfig> {
        self.tracing.exporter.as_ref().or(self.exporter.as_ref())
    }
}

/// Where and how spans are shipped
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub endpoint: Url,
    #[serde(default)]
    pub protocol: ExportProtocol,
    /// Export timeout, e.g. `"5s"`
    #[serde(default)]
    pub timeout: Option<String>,
}

impl ExporterConfig {
    /// Parsed export timeout, defaulting to ten seconds
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout` is not a valid duration string
    pub fn timeout_duration(&self) -> anyhow::Result<Duration> {
        match self.timeout {
            Some(ref raw) => duration_str::parse(raw)
                .map_err(|e| anyhow::anyhow!("invalid telemetry exporter timeout '{raw}': {e}")),
            None => Ok(DEFAULT_EXPORT_TIMEOUT),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportProtocol {
    #[default]
    Grpc,
    HttpProto,
}

/// Span sampling
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TracingConfig {
    /// Fraction of root spans kept, between 0.0 and 1.0
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
    /// Follow the sampling decision of an incoming parent span
    #[serde(default = "default_parent_based")]
    pub parent_based: bool,
    #[serde(default)]
    pub exporter: Option<ExporterConfig>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            sampling_rate: default_sampling_rate(),
            parent_based: default_parent_based(),
            exporter: None,
        }
    }
}

fn default_service_name() -> String {
    "devgate".to_string()
}

const fn default_sampling_rate() -> f64 {
    1.0
}

const fn default_parent_based() -> bool {
    true
}
