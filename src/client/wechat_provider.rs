//! WeChat web OAuth provider

use std::sync::Arc;

use crate::api::{OAuthApi, Profile, UserInfoApi, UserInfoResponse, WechatContext};
use crate::config::ResolvedConfig;
use crate::error::{ProfileError, WechatError};
use crate::types::SessionState;

/// WeChat web OAuth provider
///
/// This is the main entry point of the crate. It holds no mutable state and
/// is cheap to clone, so one instance can serve concurrent login flows.
///
/// # Example
///
/// ```rust,ignore
/// use wechat_oauth_provider::{ProviderConfig, WechatProvider};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = WechatProvider::builder()
///         .config(ProviderConfig::new("wx1234567890abcdef", "your_secret"))
///         .build()?;
///
///     let redirect = provider.login_url("https://proxy.example.com/oauth2/callback", "state");
///     // ... user consents, WeChat redirects back with ?code=...
///     let session = provider.redeem("code_from_callback").await?;
///     println!("principal: {}", session.email());
///
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct WechatProvider {
    context: Arc<WechatContext>,
}

impl WechatProvider {
    pub fn builder() -> super::builder::WechatProviderBuilder {
        super::builder::WechatProviderBuilder::default()
    }

    pub fn config(&self) -> &ResolvedConfig {
        self.context.config()
    }

    pub fn client_id(&self) -> &str {
        self.context.config().client_id()
    }

    pub fn provider_name(&self) -> &'static str {
        self.context.config().provider_name()
    }

    // OAuth API

    pub fn login_url(&self, redirect_uri: &str, state: &str) -> String {
        OAuthApi::new(self.context.clone()).login_url(redirect_uri, state)
    }

    pub async fn redeem(&self, code: &str) -> Result<SessionState, WechatError> {
        OAuthApi::new(self.context.clone()).redeem(code).await
    }

    /// Principal identifier of the session; never touches the network.
    pub fn email_address(&self, session: &SessionState) -> String {
        session.email()
    }

    // User info API

    pub async fn get_user_info(
        &self,
        session: &SessionState,
    ) -> Result<UserInfoResponse, WechatError> {
        UserInfoApi::new(self.context.clone())
            .get_user_info(session)
            .await
    }

    pub async fn resolve_profile(&self, session: &SessionState) -> Result<Profile, ProfileError> {
        UserInfoApi::new(self.context.clone())
            .resolve_profile(session)
            .await
    }
}

impl From<Arc<WechatContext>> for WechatProvider {
    fn from(context: Arc<WechatContext>) -> Self {
        Self { context }
    }
}
