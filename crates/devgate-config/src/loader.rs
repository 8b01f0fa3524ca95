use std::path::Path;

use http::{HeaderName, HeaderValue};

use crate::{Config, HeaderRuleConfig, ProxyRuleConfig, TelemetryConfig};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the listen port is zero, any proxy rule is
    /// invalid, or the telemetry section is out of range
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be greater than 0");
        }

        if !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        for (context, rule) in &self.server.proxy {
            validate_rule(context, rule)?;
        }

        if let Some(ref telemetry) = self.telemetry {
            validate_telemetry(telemetry)?;
        }

        Ok(())
    }
}

fn validate_telemetry(telemetry: &TelemetryConfig) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&telemetry.tracing.sampling_rate) {
        anyhow::bail!("telemetry.tracing.sampling_rate must be between 0.0 and 1.0");
    }

    if let Some(exporter) = telemetry.trace_exporter() {
        exporter.timeout_duration()?;
    }

    Ok(())
}

fn validate_rule(context: &str, rule: &ProxyRuleConfig) -> anyhow::Result<()> {
    if context.is_empty() {
        anyhow::bail!("proxy context must not be empty");
    }

    if context.starts_with('^') {
        regex::Regex::new(context).map_err(|e| anyhow::anyhow!("invalid proxy context pattern '{context}': {e}"))?;
    }

    if !matches!(rule.target.scheme(), "http" | "https") {
        anyhow::bail!(
            "proxy target for '{context}' must use http or https, got '{}'",
            rule.target.scheme()
        );
    }

    if rule.target.host_str().is_none() {
        anyhow::bail!("proxy target for '{context}' has no host");
    }

    if let Some(ref rewrite) = rule.rewrite {
        regex::Regex::new(&rewrite.pattern)
            .map_err(|e| anyhow::anyhow!("invalid rewrite pattern for '{context}': {e}"))?;
    }

    rule.timeout_duration()
        .map_err(|e| anyhow::anyhow!("proxy rule '{context}': {e}"))?;

    for header in &rule.headers {
        validate_header_rule(context, header)?;
    }

    Ok(())
}

fn validate_header_rule(context: &str, rule: &HeaderRuleConfig) -> anyhow::Result<()> {
    let check_name = |name: &str| {
        HeaderName::try_from(name).map_err(|e| anyhow::anyhow!("invalid header name '{name}' for '{context}': {e}"))
    };
    let check_value = |value: &str| {
        HeaderValue::try_from(value)
            .map_err(|e| anyhow::anyhow!("invalid header value '{value}' for '{context}': {e}"))
    };

    match rule {
        HeaderRuleConfig::Insert { name, value } => {
            check_name(name)?;
            check_value(value)?;
        }
        HeaderRuleConfig::Remove { name } if name.starts_with('^') => {
            regex::Regex::new(name)
                .map_err(|e| anyhow::anyhow!("invalid header pattern '{name}' for '{context}': {e}"))?;
        }
        HeaderRuleConfig::Remove { name } => {
            check_name(name)?;
        }
        HeaderRuleConfig::RenameDuplicate { name, rename, default } => {
            check_name(name)?;
            check_name(rename)?;
            if let Some(default) = default {
                check_value(default)?;
            }
        }
    }

    Ok(())
}
