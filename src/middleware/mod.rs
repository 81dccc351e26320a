//! Middleware components for the OAuth transport.
//!
//! Layers wrap the [`WechatClient`](crate::client::WechatClient) and are
//! installed with `WechatProviderBuilder::with_middleware`.
//!
//! ## Middleware Types
//!
//! - [`LoggingMiddleware`] - Logs request/response information with credentials redacted
//!
//! ## Usage
//!
//! ```ignore
//! use wechat_oauth_provider::{middleware::LoggingMiddleware, ProviderConfig, WechatProvider};
//!
//! let provider = WechatProvider::builder()
//!     .config(ProviderConfig::new("wx1234567890abcdef", "secret"))
//!     .with_middleware(LoggingMiddleware::new().verbose())
//!     .build()?;
//! ```

// Re-export tower types for convenience
pub use tower::{Layer, Service, ServiceBuilder};

mod logging;

pub use logging::LoggingMiddleware;
