//! Connection configuration resolved from the process environment
//!
//! Recognised variables:
//! - `AWS_S3_ENDPOINT` - custom service endpoint (MinIO, Ceph, LocalStack, ...)
//! - `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` - explicit credentials, custom endpoint only
//! - `AWS_REGION` - region, defaults to `us-east-1`
//! - `HTTP_PROXY` / `HTTPS_PROXY` - proxy for plain and secure transport
//! - `IGNORE_SSL` - `true` (any case) disables certificate verification
//! - `AWS_S3_FORCE_PATH_STYLE` - path-style addressing, on by default with a custom endpoint
//! - `AWS_S3_OPERATION_TIMEOUT` - per-call timeout in seconds

use std::time::Duration;

pub const ENV_ENDPOINT: &str = "AWS_S3_ENDPOINT";
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_HTTP_PROXY: &str = "HTTP_PROXY";
pub const ENV_HTTPS_PROXY: &str = "HTTPS_PROXY";
pub const ENV_IGNORE_SSL: &str = "IGNORE_SSL";
pub const ENV_FORCE_PATH_STYLE: &str = "AWS_S3_FORCE_PATH_STYLE";
pub const ENV_OPERATION_TIMEOUT: &str = "AWS_S3_OPERATION_TIMEOUT";

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Explicit access key pair
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .finish()
    }
}

/// Proxy URLs per transport scheme.
///
/// Only ever constructed with at least one side set; "no proxy" is `None`
/// at the [`ClientConfig`] level. `Debug` hides any `user:pass@` part.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("http", &self.http.as_deref().map(redact_userinfo))
            .field("https", &self.https.as_deref().map(redact_userinfo))
            .finish()
    }
}

/// Immutable connection configuration, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint_url: Option<String>,
    pub credentials: Option<StaticCredentials>,
    pub region: String,
    pub proxy: Option<ProxyConfig>,
    pub verify_tls: bool,
    pub force_path_style: bool,
    pub operation_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            credentials: None,
            region: DEFAULT_REGION.to_string(),
            proxy: None,
            verify_tls: true,
            force_path_style: false,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Resolve configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration from an arbitrary variable source.
    ///
    /// Never fails: missing or malformed values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let endpoint_url = var(ENV_ENDPOINT).and_then(|v| parse_url(ENV_ENDPOINT, v));

        let credentials = match (var(ENV_ACCESS_KEY_ID), var(ENV_SECRET_ACCESS_KEY)) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
            }),
            _ => None,
        };

        let region = var(ENV_REGION).unwrap_or_else(|| DEFAULT_REGION.to_string());

        let http_proxy = var(ENV_HTTP_PROXY).and_then(|v| parse_url(ENV_HTTP_PROXY, v));
        let https_proxy = var(ENV_HTTPS_PROXY).and_then(|v| parse_url(ENV_HTTPS_PROXY, v));
        let proxy = match (http_proxy, https_proxy) {
            (None, None) => None,
            (http, https) => Some(ProxyConfig { http, https }),
        };

        let verify_tls = !var(ENV_IGNORE_SSL).is_some_and(|v| is_truthy(&v));

        let force_path_style = match var(ENV_FORCE_PATH_STYLE) {
            Some(v) => is_truthy(&v),
            None => endpoint_url.is_some(),
        };

        let operation_timeout = var(ENV_OPERATION_TIMEOUT)
            .and_then(|v| match v.parse::<u64>() {
                Ok(0) | Err(_) => {
                    tracing::warn!("Ignoring invalid {}={:?}", ENV_OPERATION_TIMEOUT, v);
                    None
                }
                Ok(secs) => Some(Duration::from_secs(secs)),
            })
            .unwrap_or(DEFAULT_OPERATION_TIMEOUT);

        let config = Self {
            endpoint_url,
            credentials,
            region,
            proxy,
            verify_tls,
            force_path_style,
            operation_timeout,
        };

        tracing::debug!(
            "Resolved client config: endpoint={:?}, region={}, proxy={:?}, verify_tls={}",
            config.endpoint_url.as_deref().map(redact_userinfo),
            config.region,
            config.proxy,
            config.verify_tls
        );

        config
    }

    /// Credentials to hand to the SDK explicitly.
    ///
    /// `None` unless a custom endpoint is configured, so the default
    /// credential chain is never overridden for the standard service.
    pub fn explicit_credentials(&self) -> Option<&StaticCredentials> {
        self.endpoint_url.as_ref().and(self.credentials.as_ref())
    }

    /// Whether the SDK's stock HTTP client can be used as is
    pub fn uses_default_transport(&self) -> bool {
        self.proxy.is_none() && self.verify_tls
    }
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Strip userinfo from a URL for logging
fn redact_userinfo(value: &str) -> String {
    match url::Url::parse(value) {
        Ok(mut url) if !url.username().is_empty() || url.password().is_some() => {
            let _ = url.set_username("");
            let _ = url.set_password(None);
            url.to_string()
        }
        _ => value.to_string(),
    }
}

fn parse_url(name: &str, value: String) -> Option<String> {
    match url::Url::parse(&value) {
        Ok(_) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring invalid URL in {}: {}", name, e);
            None
        }
    }
}
