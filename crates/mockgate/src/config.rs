//! Configuration loading and validation for the mock server.
//!
//! All values are read from `MOCKGATE_`-prefixed environment variables at
//! startup. The process exits with a clear error message if a required
//! variable is missing or invalid.

use anyhow::{Context, Result};
use common::{MockConfig, MockSetting, RequestConfig};
use serde::Deserialize;

/// Prefix shared by every environment variable the service reads.
pub const ENV_PREFIX: &str = "MOCKGATE";

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the OpenAPI document (YAML or JSON). **Required.**
    pub spec_path: String,

    /// Address the HTTP server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Serve the catch-all behind a permissive CORS layer.
    #[serde(default = "default_true")]
    pub cors: bool,

    /// Produce mocked responses. When off, no request can turn mocking back on.
    #[serde(default = "default_true")]
    pub mock: bool,

    /// Generate mock bodies from schemas rather than static examples.
    #[serde(default)]
    pub dynamic: bool,

    #[serde(default = "default_true")]
    pub validate_request: bool,

    #[serde(default = "default_true")]
    pub validate_response: bool,

    #[serde(default = "default_true")]
    pub check_security: bool,

    /// Treat output-validation violations as errors.
    #[serde(default)]
    pub errors: bool,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// OTLP/gRPC collector endpoint. Span export is off when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    4010
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_builder(config::Config::builder().add_source(
            config::Environment::with_prefix(ENV_PREFIX).try_parsing(true),
        ))
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let cfg = builder
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.spec_path, "MOCKGATE_SPEC_PATH")?;
        ensure_non_empty(&self.host, "MOCKGATE_HOST")?;

        if self.port == 0 {
            anyhow::bail!("MOCKGATE_PORT must be a non-zero port");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            ensure_non_empty(endpoint, "MOCKGATE_OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }
        Ok(())
    }

    /// Process-wide defaults handed to the processor, before per-request overrides.
    pub fn request_config(&self) -> RequestConfig {
        let mock = if self.mock {
            MockSetting::Enabled(MockConfig {
                dynamic: self.dynamic,
                ..MockConfig::default()
            })
        } else {
            MockSetting::Disabled
        };
        RequestConfig {
            mock,
            validate_request: self.validate_request,
            validate_response: self.validate_response,
            check_security: self.check_security,
            errors: self.errors,
        }
    }

    /// `host:port` string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            spec_path: "openapi.yaml".into(),
            host: default_host(),
            port: default_port(),
            cors: true,
            mock: true,
            dynamic: false,
            validate_request: true,
            validate_response: true,
            check_security: true,
            errors: false,
            log_level: default_log_level(),
            otel_exporter_otlp_endpoint: None,
        }
    }

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let mut builder = config::Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value)?;
        }
        Config::from_builder(builder)
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_host(), "0.0.0.0");
        assert_eq!(default_port(), 4010);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn only_spec_path_is_required() {
        let cfg = load(&[("spec_path", "petstore.yaml")]).unwrap();
        assert_eq!(cfg.spec_path, "petstore.yaml");
        assert_eq!(cfg.bind_address(), "0.0.0.0:4010");
        assert!(cfg.cors && cfg.mock && !cfg.dynamic && !cfg.errors);
        assert!(cfg.otel_exporter_otlp_endpoint.is_none());
    }

    #[test]
    fn missing_spec_path_fails() {
        assert!(load(&[]).is_err());
    }

    #[test]
    fn validate_rejects_empty_spec_path() {
        let cfg = Config {
            spec_path: "  ".into(),
            ..base()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_port() {
        let cfg = Config { port: 0, ..base() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn request_config_follows_flags() {
        let cfg = Config {
            dynamic: true,
            check_security: false,
            errors: true,
            ..base()
        };
        let rc = cfg.request_config();
        assert_eq!(
            rc.mock,
            MockSetting::Enabled(MockConfig {
                dynamic: true,
                code: None,
                example_key: None,
            })
        );
        assert!(rc.validate_request && rc.validate_response);
        assert!(!rc.check_security);
        assert!(rc.errors);
    }

    #[test]
    fn mock_off_disables_mocking() {
        let cfg = Config {
            mock: false,
            dynamic: true,
            ..base()
        };
        assert_eq!(cfg.request_config().mock, MockSetting::Disabled);
    }
}
