//! WeChat API trait and context
//!
//! Provides the base trait and context for the OAuth API implementations.

use std::sync::Arc;

use crate::client::WechatClient;
use crate::config::ResolvedConfig;

/// Context holding shared resources for WeChat API implementations.
///
/// Contains the HTTP client and the resolved provider configuration.
/// Both are read-only after construction, so one context can serve any
/// number of concurrent flows.
#[derive(Clone)]
pub struct WechatContext {
    /// The WeChat HTTP client for making API requests
    pub(crate) client: Arc<WechatClient>,
    /// Credentials, endpoints and scope
    pub(crate) config: Arc<ResolvedConfig>,
}

impl std::fmt::Debug for WechatContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatContext")
            .field("client", &"WechatClient { .. }")
            .field("config", &self.config)
            .finish()
    }
}

impl WechatContext {
    /// Create a new WechatContext
    pub fn new(client: Arc<WechatClient>, config: Arc<ResolvedConfig>) -> Self {
        Self { client, config }
    }

    /// Get a reference to the WeChat HTTP client.
    pub fn client(&self) -> &WechatClient {
        &self.client
    }

    /// Get a reference to the resolved configuration.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }
}

/// Trait for WeChat API implementations.
pub trait WechatApi: Send + Sync {
    /// Get a reference to the WeChat context
    fn context(&self) -> &WechatContext;

    /// Get the name of this API for logging and error context.
    fn api_name(&self) -> &'static str {
        "unknown"
    }
}
