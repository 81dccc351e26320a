//! Provider interface consumed by the host authentication proxy.

use async_trait::async_trait;

use crate::client::WechatProvider;
use crate::error::{ProfileError, WechatError};
use crate::types::SessionState;

/// Operations an authentication proxy needs from an identity provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Label used in principal identities and logs.
    fn provider_name(&self) -> &str;

    /// Redirect target that starts the consent flow.
    fn login_url(&self, redirect_uri: &str, state: &str) -> String;

    /// Exchange the callback's authorization code for a session.
    async fn redeem(&self, code: &str) -> Result<SessionState, WechatError>;

    /// Principal identifier the proxy stores sessions under.
    fn email_address(&self, session: &SessionState) -> String;

    /// Display profile serialized as `{"name":...,"avatar":...}`.
    ///
    /// On failure, [`ProfileError::fallback_name`] holds a best-effort name.
    async fn user_name(&self, session: &SessionState) -> Result<String, ProfileError>;
}

#[async_trait]
impl OAuthProvider for WechatProvider {
    fn provider_name(&self) -> &str {
        WechatProvider::provider_name(self)
    }

    fn login_url(&self, redirect_uri: &str, state: &str) -> String {
        WechatProvider::login_url(self, redirect_uri, state)
    }

    async fn redeem(&self, code: &str) -> Result<SessionState, WechatError> {
        WechatProvider::redeem(self, code).await
    }

    fn email_address(&self, session: &SessionState) -> String {
        WechatProvider::email_address(self, session)
    }

    async fn user_name(&self, session: &SessionState) -> Result<String, ProfileError> {
        let profile = self.resolve_profile(session).await?;
        profile
            .to_json()
            .map_err(|e| ProfileError::new(session.identity().open_id(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let provider: Box<dyn OAuthProvider> = Box::new(
            WechatProvider::builder()
                .config(ProviderConfig::new("APP1", "secret"))
                .build()
                .unwrap(),
        );

        assert_eq!(provider.provider_name(), "Wechat");
        assert!(provider
            .login_url("https://cb.example/cb", "xyz")
            .contains("response_type=code"));
        assert!(matches!(
            provider.redeem("").await,
            Err(WechatError::MissingCode)
        ));
    }
}
