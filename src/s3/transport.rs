//! HTTP transport honouring proxy and certificate verification settings
//!
//! The SDK's stock client knows nothing about `HTTP_PROXY`/`HTTPS_PROXY`
//! or disabled certificate checks, so when either is configured requests
//! are sent through a `reqwest` client instead.

use aws_smithy_runtime_api::client::http::{
    HttpClient, HttpConnector, HttpConnectorFuture, HttpConnectorSettings, SharedHttpClient,
    SharedHttpConnector,
};
use aws_smithy_runtime_api::client::orchestrator::{HttpRequest, HttpResponse};
use aws_smithy_runtime_api::client::result::ConnectorError;
use aws_smithy_runtime_api::client::runtime_components::RuntimeComponents;
use aws_smithy_runtime_api::http::StatusCode;
use aws_smithy_types::body::SdkBody;

use crate::s3::config::ClientConfig;

/// SDK HTTP client backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Build a client for the proxy and TLS settings in `config`.
    ///
    /// Environment proxy variables are never read here; only the
    /// resolved [`ClientConfig::proxy`] applies.
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().no_proxy();

        if let Some(proxy) = &config.proxy {
            if let Some(http) = &proxy.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(https) = &proxy.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        if !config.verify_tls {
            tracing::warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn http_connector(
        &self,
        _settings: &HttpConnectorSettings,
        _components: &RuntimeComponents,
    ) -> SharedHttpConnector {
        SharedHttpConnector::new(ReqwestConnector {
            client: self.client.clone(),
        })
    }
}

#[derive(Debug, Clone)]
struct ReqwestConnector {
    client: reqwest::Client,
}

impl HttpConnector for ReqwestConnector {
    fn call(&self, request: HttpRequest) -> HttpConnectorFuture {
        let client = self.client.clone();
        HttpConnectorFuture::new(async move { send(client, request).await })
    }
}

async fn send(client: reqwest::Client, request: HttpRequest) -> Result<HttpResponse, ConnectorError> {
    let method = reqwest::Method::from_bytes(request.method().as_bytes())
        .map_err(|e| ConnectorError::other(e.into(), None))?;
    let body = request.body().bytes().ok_or_else(|| {
        ConnectorError::other("streaming request bodies are not supported".into(), None)
    })?;

    tracing::debug!("{} {}", method, request.uri());

    let mut builder = client.request(method, request.uri());
    for (name, value) in request.headers().iter() {
        builder = builder.header(name, value);
    }

    let response = builder
        .body(body.to_vec())
        .send()
        .await
        .map_err(connector_error)?;

    let status = StatusCode::try_from(response.status().as_u16())
        .map_err(|e| ConnectorError::other(e.into(), None))?;
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    let body = SdkBody::from_body_1_x(reqwest::Body::from(response));
    let mut converted = HttpResponse::new(status, body);
    for (name, value) in headers {
        converted.headers_mut().append(name, value);
    }
    Ok(converted)
}

fn connector_error(error: reqwest::Error) -> ConnectorError {
    if error.is_timeout() {
        ConnectorError::timeout(error.into())
    } else if error.is_connect() {
        ConnectorError::io(error.into())
    } else {
        ConnectorError::other(error.into(), None)
    }
}

/// HTTP client to install on the SDK, or `None` to keep the SDK default
pub fn http_client(config: &ClientConfig) -> Result<Option<SharedHttpClient>, reqwest::Error> {
    if config.uses_default_transport() {
        return Ok(None);
    }
    Ok(Some(SharedHttpClient::new(ReqwestHttpClient::new(config)?)))
}
