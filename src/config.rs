//! Connection configuration.
//!
//! [`ConnectOptions`] collects everything needed to reach a cluster: the host,
//! the credentials, and the transport knobs (port, TLS verification, optional
//! timeout). Values can come from code or from `PVE_*` environment variables
//! via [`ConnectOptions::from_env`], which loads a `.env` file first if one is
//! present.

use std::time::Duration;

use crate::api::{ApiError, Result};

/// Management port Proxmox VE listens on by default.
pub const DEFAULT_PORT: u16 = 8006;

/// Connection options for [`ProxmoxClient`](crate::ProxmoxClient).
///
/// TLS certificate verification defaults to enabled; clusters running on
/// self-signed certificates must opt out with [`verify_tls(false)`](Self::verify_tls).
/// No request timeout is set by default - callers needing bounded latency
/// set one with [`timeout`](Self::timeout).
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub(crate) host: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) port: u16,
    pub(crate) verify_tls: bool,
    pub(crate) timeout: Option<Duration>,
}

impl ConnectOptions {
    /// Create options for the given host and credentials.
    ///
    /// The username is expected to carry its realm suffix (`root@pam`,
    /// `automation@pve`); a missing realm is rejected by the server, not here.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            port: DEFAULT_PORT,
            verify_tls: true,
            timeout: None,
        }
    }

    /// Read options from the environment: `PVE_HOST`, `PVE_USERNAME`,
    /// `PVE_PASSWORD`, and optionally `PVE_PORT` and `PVE_VERIFY_TLS`
    /// (`0`/`false` to disable verification).
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| ApiError::InvalidOptions(format!("{name} is not set")))
        };

        let mut options = Self::new(var("PVE_HOST")?, var("PVE_USERNAME")?, var("PVE_PASSWORD")?);

        if let Ok(port) = std::env::var("PVE_PORT") {
            options.port = port
                .parse()
                .map_err(|_| ApiError::InvalidOptions(format!("invalid PVE_PORT: {port}")))?;
        }
        if let Ok(verify) = std::env::var("PVE_VERIFY_TLS") {
            options.verify_tls = !matches!(
                verify.to_ascii_lowercase().as_str(),
                "0" | "false" | "no"
            );
        }

        Ok(options)
    }

    /// Override the management port (default 8006).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable TLS certificate verification (default enabled).
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Set a request timeout. Without one, a call blocks until the server
    /// responds or the connection drops.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("host", &self.host),
            ("username", &self.username),
            ("password", &self.password),
        ] {
            if value.is_empty() {
                return Err(ApiError::InvalidOptions(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Base URL builder for API paths.
///
/// Every resource path is relative; the endpoint pins the scheme, host, port,
/// and the `api2/json` prefix.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    base: String,
}

impl Endpoint {
    pub(crate) fn new(host: &str, port: u16) -> Self {
        Self {
            base: format!("https://{host}:{port}/api2/json"),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_base(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}
