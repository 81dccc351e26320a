//! WeChat web OAuth provider for Rust
//!
//! Adapts WeChat's web authorization flow to the operations a generic
//! authentication proxy expects from an identity provider.
//!
//! ## Operations
//!
//! | Operation | Upstream call |
//! |-----------|---------------|
//! | [`WechatProvider::login_url`] | none |
//! | [`WechatProvider::redeem`] | `GET /sns/oauth2/access_token` |
//! | [`WechatProvider::resolve_profile`] | `GET /sns/userinfo` |
//! | [`WechatProvider::email_address`] | none |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wechat_oauth_provider::{ProviderConfig, WechatProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = WechatProvider::builder()
//!         .config(ProviderConfig::new("wx1234567890abcdef", "your_secret"))
//!         .build()?;
//!
//!     let redirect = provider.login_url("https://proxy.example.com/oauth2/callback", "csrf");
//!     println!("Send the browser to {}", redirect);
//!
//!     let session = provider.redeem("code_from_callback").await?;
//!     println!("Principal: {}", session.email());
//!
//!     match provider.resolve_profile(&session).await {
//!         Ok(profile) => println!("Hello {}", profile.name),
//!         Err(e) => eprintln!("profile unavailable ({}), using {}", e, e.fallback_name()),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - OAuth and user info API implementations
//! - [`client`] - HTTP client and the provider facade
//! - [`config`] - Provider configuration and WeChat defaults
//! - [`error`] - Error types
//! - [`middleware`] - Tower layers for the transport
//! - [`provider`] - The provider trait host frameworks call through
//! - [`types`] - Session state and synthetic identity
//!
//! ## Error Handling
//!
//! ```rust,ignore
//! use wechat_oauth_provider::WechatError;
//!
//! match provider.redeem(code).await {
//!     Ok(session) => { /* store session */ }
//!     Err(WechatError::Status { status, body, .. }) => {
//!         eprintln!("WeChat answered {}: {}", status, body);
//!     }
//!     Err(e) => eprintln!("login failed: {}", e),
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod provider;
pub mod types;

pub use client::{WechatClient, WechatClientBuilder, WechatProvider, WechatProviderBuilder};
pub use config::{ProviderConfig, ResolvedConfig};
pub use error::{ProfileError, WechatError};
pub use provider::OAuthProvider;
pub use types::{SessionState, SyntheticIdentity};
