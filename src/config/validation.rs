// src/config/validation.rs

use crate::config::{ConnectionConfig, TronConfig};
use crate::error::{AppError, Result};
use tracing::{debug, warn};
use url::Url;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &TronConfig) -> Result<()> {
        debug!("Starting configuration validation");

        if let Err(e) = Self::validate_connections(config) {
            warn!("Connection validation failed: {}", e);
            return Err(e);
        }
        debug!("Connection validation passed");

        if let Err(e) = Self::validate_redis_config(config) {
            warn!("Redis config validation failed: {}", e);
            return Err(e);
        }
        debug!("Redis config validation passed");

        debug!("Configuration validation completed successfully");
        Ok(())
    }

    fn validate_connections(config: &TronConfig) -> Result<()> {
        debug!("Validating {} connections", config.connections.len());

        if config.connections.is_empty() {
            return Err(AppError::configuration(
                "At least one connection must be configured",
            ));
        }

        if !config.connections.contains_key(&config.default) {
            return Err(AppError::configuration(format!(
                "Default connection '{}' is not configured",
                config.default
            )));
        }

        for (name, connection) in &config.connections {
            Self::validate_connection(name, connection)?;
        }
        Ok(())
    }

    fn validate_connection(name: &str, connection: &ConnectionConfig) -> Result<()> {
        if name.trim().is_empty() {
            return Err(AppError::configuration("Connection name cannot be empty"));
        }

        if connection.timeout_ms == 0 {
            return Err(AppError::configuration(format!(
                "Connection '{name}': timeout_ms must be greater than 0"
            )));
        }

        for (label, host) in connection.endpoints.hosts() {
            Self::validate_http_url(host, &format!("{name}.endpoints.{label}"))?;
        }

        if connection.headers.keys().any(|h| h.trim().is_empty()) {
            return Err(AppError::configuration(format!(
                "Connection '{name}' contains an empty header name"
            )));
        }

        if !connection.has_keys() {
            debug!("Connection '{}' has no API keys configured", name);
        }
        Ok(())
    }

    fn validate_redis_config(config: &TronConfig) -> Result<()> {
        if let Some(redis_url) = &config.redis_url {
            Url::parse(redis_url).map_err(|e| {
                AppError::configuration(format!("Invalid URL in redis_url: {redis_url} - {e}"))
            })?;
        }
        Ok(())
    }

    fn validate_http_url(url_str: &str, field_name: &str) -> Result<()> {
        let url = Url::parse(url_str).map_err(|e| {
            AppError::configuration(format!("Invalid URL in {field_name}: {url_str} - {e}"))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AppError::configuration(format!(
                "Unsupported scheme '{scheme}' in {field_name}. Supported: http, https"
            ))),
        }
    }
}
