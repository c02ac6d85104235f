//! Application settings loaded via OrthoConfig.
//!
//! Values come from `COMMISSIONS_*` environment variables, command-line flags
//! or a configuration file. Every field is optional; accessors supply the
//! defaults.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{DEFAULT_NOTIFIER_TIMEOUT, DEFAULT_OPERATION_TIMEOUT, ServiceTimeouts};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Settings rejected after loading.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// `notifier_url` is not an absolute URL.
    #[error("invalid notifier url '{value}': {source}")]
    NotifierUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Server, storage and notifier configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COMMISSIONS")]
pub struct AppSettings {
    /// Address the HTTP listener binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it the in-process store is used.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub database_max_connections: Option<u32>,
    /// Deadline for each repository call, in milliseconds.
    pub operation_timeout_ms: Option<u64>,
    /// Checkout webhook receiving lifecycle events.
    pub notifier_url: Option<String>,
    /// Deadline for each webhook delivery, in milliseconds.
    pub notifier_timeout_ms: Option<u64>,
}

impl AppSettings {
    /// The listener address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Examples
    /// ```
    /// use commission_backend::settings::AppSettings;
    ///
    /// let settings = AppSettings {
    ///     bind_addr: None,
    ///     database_url: None,
    ///     database_max_connections: None,
    ///     operation_timeout_ms: None,
    ///     notifier_url: None,
    ///     notifier_timeout_ms: None,
    /// };
    /// assert_eq!(settings.bind_addr().expect("default parses").port(), 8080);
    /// ```
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// The configured database URL, ignoring blank values.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    #[must_use]
    pub fn database_max_connections(&self) -> u32 {
        self.database_max_connections
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
            .max(1)
    }

    /// Deadlines handed to the marketplace services.
    #[must_use]
    pub fn timeouts(&self) -> ServiceTimeouts {
        ServiceTimeouts {
            repository: self
                .operation_timeout_ms
                .map_or(DEFAULT_OPERATION_TIMEOUT, Duration::from_millis),
            notifier: self.notifier_timeout(),
        }
    }

    #[must_use]
    pub fn notifier_timeout(&self) -> Duration {
        self.notifier_timeout_ms
            .map_or(DEFAULT_NOTIFIER_TIMEOUT, Duration::from_millis)
    }

    /// The webhook endpoint, if one is configured.
    pub fn notifier_url(&self) -> Result<Option<Url>, SettingsError> {
        self.notifier_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|value| {
                Url::parse(value).map_err(|source| SettingsError::NotifierUrl {
                    value: value.to_owned(),
                    source,
                })
            })
            .transpose()
    }
}
