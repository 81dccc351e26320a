use std::sync::Arc;
use std::time::Duration;

use reqwest::{Request as ReqwestRequest, Response as ReqwestResponse};
use tower::layer::util::Identity;
use tower::{Layer, Service};

use crate::api::WechatContext;
use crate::config::{ProviderConfig, ResolvedConfig};
use crate::error::WechatError;

use super::wechat_client::{MiddlewareExecutor, WechatClient};
use super::WechatProvider;

#[must_use]
#[derive(Default)]
pub struct WechatProviderBuilder<M = Identity> {
    config: Option<ProviderConfig>,
    http: Option<reqwest::Client>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    middleware: Option<M>,
}

impl<M> std::fmt::Debug for WechatProviderBuilder<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatProviderBuilder")
            .field("config", &self.config)
            .field("http", &self.http.as_ref().map(|_| ".."))
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("middleware", &self.middleware.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

impl<M> WechatProviderBuilder<M> {
    pub fn config(mut self, config: ProviderConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a caller-built reqwest client; `timeout` and `connect_timeout`
    /// are ignored in that case.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_middleware<M2>(self, middleware: M2) -> WechatProviderBuilder<M2>
    where
        M2: Layer<WechatClient> + Clone + Send + Sync + 'static,
    {
        WechatProviderBuilder {
            config: self.config,
            http: self.http,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            middleware: Some(middleware),
        }
    }

    pub fn build(self) -> Result<WechatProvider, WechatError>
    where
        M: Layer<WechatClient> + Clone + Send + Sync + 'static,
        M::Service: Service<ReqwestRequest, Response = ReqwestResponse, Error = reqwest::Error>
            + Clone
            + Send
            + Sync
            + 'static,
        <M::Service as Service<ReqwestRequest>>::Future: Send + 'static,
    {
        let config = self
            .config
            .ok_or_else(|| WechatError::Config("provider config is required".to_string()))?;
        let config = ResolvedConfig::try_from(config)?;

        let mut client = match self.http {
            Some(http) => WechatClient::from_http(http),
            None => {
                let mut builder = WechatClient::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(connect_timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(connect_timeout);
                }
                builder.build()?
            }
        };

        if let Some(middleware) = self.middleware {
            let service = middleware.layer(client.clone());
            let executor = make_middleware_executor(service);
            client = client.with_middleware_executor(executor);
        }

        let context = Arc::new(WechatContext::new(Arc::new(client), Arc::new(config)));

        Ok(WechatProvider::from(context))
    }
}

fn make_middleware_executor<S>(service: S) -> MiddlewareExecutor
where
    S: Service<ReqwestRequest, Response = ReqwestResponse, Error = reqwest::Error>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    let service = Arc::new(service);

    Arc::new(move |request: ReqwestRequest| {
        let mut service = (*service).clone();
        Box::pin(async move { service.call(request).await })
    })
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};

    use tower::{Layer, Service};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn token_body() -> serde_json::Value {
        serde_json::json!({
            "access_token": "AT1",
            "refresh_token": "RT1",
            "expires_in": 7200,
            "openid": "OID1"
        })
    }

    fn mock_config(server: &MockServer) -> ProviderConfig {
        ProviderConfig {
            redeem_url: Some(format!("{}/sns/oauth2/access_token", server.uri())),
            ..ProviderConfig::new("APP1", "secret")
        }
    }

    #[test]
    fn test_builder_default_values() {
        let provider = WechatProvider::builder()
            .config(ProviderConfig::new("APP1", "secret"))
            .build()
            .unwrap();

        assert_eq!(provider.client_id(), "APP1");
        assert_eq!(provider.provider_name(), "Wechat");
        assert_eq!(
            provider.config().redeem_url().as_str(),
            crate::config::DEFAULT_REDEEM_URL
        );
    }

    #[test]
    fn test_builder_custom_timeouts() {
        let provider = WechatProvider::builder()
            .config(ProviderConfig::new("APP1", "secret"))
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(provider.client_id(), "APP1");
    }

    #[test]
    fn test_missing_config() {
        let result = WechatProvider::builder().build();
        assert!(matches!(result, Err(WechatError::Config(_))));
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = ProviderConfig {
            login_url: Some("::not a url::".to_string()),
            ..ProviderConfig::new("APP1", "secret")
        };
        let result = WechatProvider::builder().config(config).build();
        assert!(matches!(result, Err(WechatError::Config(_))));
    }

    #[tokio::test]
    async fn test_custom_http_client_is_used() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sns/oauth2/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = WechatProvider::builder()
            .config(mock_config(&mock_server))
            .http_client(reqwest::Client::new())
            .build()
            .unwrap();

        let session = provider.redeem("code1").await.unwrap();
        assert_eq!(session.access_token(), "AT1");
    }

    #[tokio::test]
    async fn test_middleware_configured_and_executes() {
        #[derive(Clone)]
        struct FlagLayer {
            flag: Arc<AtomicBool>,
        }

        impl Layer<WechatClient> for FlagLayer {
            type Service = FlagService;

            fn layer(&self, inner: WechatClient) -> Self::Service {
                FlagService {
                    inner,
                    flag: Arc::clone(&self.flag),
                }
            }
        }

        #[derive(Clone)]
        struct FlagService {
            inner: WechatClient,
            flag: Arc<AtomicBool>,
        }

        impl Service<ReqwestRequest> for FlagService {
            type Response = ReqwestResponse;
            type Error = reqwest::Error;
            type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

            fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
                Poll::Ready(Ok(()))
            }

            fn call(&mut self, req: ReqwestRequest) -> Self::Future {
                self.flag.store(true, Ordering::SeqCst);
                let mut inner = self.inner.clone();
                Box::pin(async move { inner.call(req).await })
            }
        }

        let middleware_invoked = Arc::new(AtomicBool::new(false));
        let layer = FlagLayer {
            flag: Arc::clone(&middleware_invoked),
        };

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sns/oauth2/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .mount(&mock_server)
            .await;

        let provider = WechatProvider::builder()
            .config(mock_config(&mock_server))
            .with_middleware(layer)
            .build()
            .unwrap();

        let _ = provider.redeem("code1").await.unwrap();

        assert!(middleware_invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_builder_with_logging_middleware_builds() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sns/oauth2/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .mount(&mock_server)
            .await;

        let provider = WechatProvider::builder()
            .config(mock_config(&mock_server))
            .with_middleware(crate::middleware::LoggingMiddleware::new())
            .build()
            .unwrap();

        let result = provider.redeem("code1").await;
        assert!(result.is_ok());
    }
}
