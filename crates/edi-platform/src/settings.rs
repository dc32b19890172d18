//! Connection inputs for [`crate::PlatformClient`].

use std::path::PathBuf;

use edi_config::ConnectorConfig;

/// Proxy environment variables, in precedence order.
pub const PROXY_ENV_VARS: [&str; 4] = ["HTTPS_PROXY", "HTTP_PROXY", "https_proxy", "http_proxy"];

/// Base URL, credentials, TLS material, and proxy for the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformSettings {
    /// Platform base URL.
    pub base_url: String,
    /// Basic-auth user name.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// PEM bundle with client certificate and private key.
    pub client_certificate: Option<PathBuf>,
    /// PEM bundle replacing the built-in trust roots.
    pub ca_file: Option<PathBuf>,
    /// Explicit proxy URL.
    pub proxy: Option<String>,
}

impl PlatformSettings {
    /// Extract the platform section of a connector configuration.
    #[must_use]
    pub fn from_config(config: &ConnectorConfig) -> Self {
        Self {
            base_url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            client_certificate: config.client_certificate.clone(),
            ca_file: config.ca_file.clone(),
            proxy: config.proxy.clone(),
        }
    }

    /// Resolve the proxy to use: explicit setting first, then
    /// `HTTPS_PROXY`, `HTTP_PROXY`, and their lowercase forms.
    pub fn resolve_proxy<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.proxy
            .clone()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| {
                PROXY_ENV_VARS
                    .iter()
                    .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
            })
    }
}
