use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use log::{debug, info};
use reqwest::{Request, Response, Url};
use tower::{Layer, Service};

/// Tower layer that logs every outgoing OAuth request and its status.
///
/// Credentials in the query string are replaced with `[REDACTED]`.
#[derive(Clone)]
pub struct LoggingMiddleware {
    verbose: bool,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for LoggingMiddleware
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Service = LoggingMiddlewareService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddlewareService {
            inner,
            verbose: self.verbose,
        }
    }
}

#[derive(Clone)]
pub struct LoggingMiddlewareService<S> {
    inner: S,
    verbose: bool,
}

const REDACTED: &str = "[REDACTED]";

/// Query keys whose values never reach the log: the redeem call carries the
/// app secret and the authorization code, the profile call the access token.
const SENSITIVE_FIELDS: &[&str] = &[
    "access_token",
    "refresh_token",
    "secret",
    "appsecret",
    "code",
    "id_token",
    "token",
    "authorization",
];

impl<S> LoggingMiddlewareService<S> {
    fn is_sensitive(key: &str) -> bool {
        SENSITIVE_FIELDS.iter().any(|s| key.eq_ignore_ascii_case(s))
    }

    fn redact_url(url: &Url) -> String {
        if url.query().is_none() {
            return url.to_string();
        }

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(key, value)| {
                let value = if Self::is_sensitive(&key) {
                    REDACTED.to_string()
                } else {
                    value.into_owned()
                };
                (key.into_owned(), value)
            })
            .collect();

        let mut redacted = url.clone();
        redacted.set_query(None);
        let query: Vec<String> = pairs
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        format!("{}?{}", redacted, query.join("&"))
    }

    fn log_request(method: &str, url: &Url, verbose: bool) {
        let safe_url = Self::redact_url(url);
        if verbose {
            debug!("[WechatOAuth] >>> {} {}", method, safe_url);
        } else {
            info!("[WechatOAuth] {} {}", method, safe_url);
        }
    }

    fn log_response(status: u16, duration: Duration, verbose: bool) {
        if verbose {
            debug!(
                "[WechatOAuth] <<< {} {} ({:?})",
                status,
                Self::status_text(status),
                duration
            );
        } else {
            info!("[WechatOAuth] {} ({:?})", status, duration);
        }
    }

    fn status_text(status: u16) -> &'static str {
        match status {
            200 => "OK",
            301 => "Moved Permanently",
            302 => "Found",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "",
        }
    }
}

impl<S, Error> Service<Request> for LoggingMiddlewareService<S>
where
    S: Service<Request, Response = Response, Error = Error> + Send + Clone + 'static,
    S::Future: Send,
    Error: Send + 'static,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let method = req.method().as_str().to_string();
        let url = req.url().clone();
        let verbose = self.verbose;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            Self::log_request(&method, &url, verbose);

            let start = Instant::now();
            let response = inner.call(req).await?;
            let duration = start.elapsed();

            Self::log_response(response.status().as_u16(), duration, verbose);

            Ok(response)
        })
    }
}
