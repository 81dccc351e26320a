//! WeChat HTTP Client
//!
//! Provides the HTTP transport used by the OAuth exchanges.

use log::warn;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

use crate::error::WechatError;

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

type MiddlewareFuture =
    Pin<Box<dyn Future<Output = Result<reqwest::Response, reqwest::Error>> + Send>>;
pub(crate) type MiddlewareExecutor =
    Arc<dyn Fn(reqwest::Request) -> MiddlewareFuture + Send + Sync>;

/// WeChat HTTP Client
///
/// Sends GET requests to absolute WeChat endpoints and enforces the
/// response contract shared by the token and userinfo APIs.
#[derive(Clone)]
pub struct WechatClient {
    http: Client,
    middleware_executor: Option<MiddlewareExecutor>,
}

impl std::fmt::Debug for WechatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatClient")
            .field(
                "middleware_executor",
                &self.middleware_executor.as_ref().map(|_| ".."),
            )
            .finish_non_exhaustive()
    }
}

impl WechatClient {
    /// Create a new client builder
    pub fn builder() -> WechatClientBuilder {
        WechatClientBuilder::default()
    }

    /// Wrap an existing [`reqwest::Client`].
    pub fn from_http(http: Client) -> Self {
        Self {
            http,
            middleware_executor: None,
        }
    }

    pub(crate) fn with_middleware_executor(mut self, executor: MiddlewareExecutor) -> Self {
        self.middleware_executor = Some(executor);
        self
    }

    pub(crate) async fn send_request(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, reqwest::Error> {
        if let Some(executor) = &self.middleware_executor {
            (executor)(request).await
        } else {
            self.http.execute(request).await
        }
    }

    /// Make a GET request to a WeChat endpoint
    ///
    /// The whole body is read before the status is inspected.
    ///
    /// # Errors
    /// - `WechatError::Http` when the request cannot be sent or the body cannot be read
    /// - `WechatError::Status` for any status other than 200, carrying the
    ///   endpoint (without query) and the raw body
    /// - `WechatError::Api` when WeChat answers 200 with errcode != 0
    /// - `WechatError::Json` when the body does not decode into `T`
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &Url,
        query: &[(&str, &str)],
    ) -> Result<T, WechatError> {
        let request = self.http.get(endpoint.clone()).query(query).build()?;
        let response = self.send_request(request).await?;

        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            warn!("[WechatOAuth] {} answered {}", endpoint, status.as_u16());
            return Err(WechatError::Status {
                status: status.as_u16(),
                url: endpoint.to_string(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let value: serde_json::Value = serde_json::from_slice(&body)?;

        if let Some(errcode) = value.get("errcode").and_then(|v| v.as_i64()) {
            if errcode != 0 {
                let errmsg = value
                    .get("errmsg")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown error");
                warn!("[WechatOAuth] {} returned errcode {}", endpoint, errcode);
                return Err(WechatError::Api {
                    code: errcode,
                    message: errmsg.to_string(),
                });
            }
        }

        Ok(serde_json::from_value(value)?)
    }
}

impl Service<reqwest::Request> for WechatClient {
    type Response = reqwest::Response;
    type Error = reqwest::Error;
    type Future = MiddlewareFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: reqwest::Request) -> Self::Future {
        let client = self.http.clone();
        Box::pin(async move { client.execute(req).await })
    }
}

/// Builder for WechatClient
#[derive(Debug, Default)]
pub struct WechatClientBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl WechatClientBuilder {
    /// Set the total timeout for requests
    ///
    /// Default: 30 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    ///
    /// Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Build the WechatClient
    ///
    /// # Errors
    /// Returns an error if the underlying reqwest client cannot be built
    pub fn build(self) -> Result<WechatClient, WechatError> {
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let connect_timeout = self
            .connect_timeout
            .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(WechatClient::from_http(client))
    }
}
