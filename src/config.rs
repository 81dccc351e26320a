//! Provider configuration
//!
//! Endpoints left unset (or set to an empty string) fall back to WeChat's
//! published web OAuth endpoints.

use std::fmt;

use reqwest::Url;
use serde::Deserialize;

use crate::error::WechatError;

pub const DEFAULT_LOGIN_URL: &str = "https://open.weixin.qq.com/connect/oauth2/authorize";
pub const DEFAULT_REDEEM_URL: &str = "https://api.weixin.qq.com/sns/oauth2/access_token";
pub const DEFAULT_PROFILE_URL: &str = "https://api.weixin.qq.com/sns/userinfo";
pub const DEFAULT_PROTECTED_RESOURCE_URL: &str = "https://api.weixin.qq.com";
pub const DEFAULT_SCOPE: &str = "snsapi_userinfo";

/// Label embedded in every synthetic identity this provider issues.
pub const PROVIDER_NAME: &str = "Wechat";

/// Caller-supplied provider configuration.
///
/// `client_id` and `client_secret` are never defaulted or validated here;
/// bad credentials surface as upstream errors on the first exchange.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub login_url: Option<String>,
    pub redeem_url: Option<String>,
    pub profile_url: Option<String>,
    pub protected_resource_url: Option<String>,
    pub scope: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("login_url", &self.login_url)
            .field("redeem_url", &self.redeem_url)
            .field("profile_url", &self.profile_url)
            .field("protected_resource_url", &self.protected_resource_url)
            .field("scope", &self.scope)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    /// Fill every unset or empty endpoint and the scope with WeChat defaults.
    #[must_use]
    pub fn with_defaults(self) -> Self {
        Self {
            login_url: or_default(self.login_url, DEFAULT_LOGIN_URL),
            redeem_url: or_default(self.redeem_url, DEFAULT_REDEEM_URL),
            profile_url: or_default(self.profile_url, DEFAULT_PROFILE_URL),
            protected_resource_url: or_default(
                self.protected_resource_url,
                DEFAULT_PROTECTED_RESOURCE_URL,
            ),
            scope: or_default(self.scope, DEFAULT_SCOPE),
            ..self
        }
    }
}

/// Configuration with every default applied and every endpoint parsed.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    client_id: String,
    client_secret: String,
    login_url: Url,
    redeem_url: Url,
    profile_url: Url,
    protected_resource_url: Url,
    scope: String,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("login_url", &self.login_url.as_str())
            .field("redeem_url", &self.redeem_url.as_str())
            .field("profile_url", &self.profile_url.as_str())
            .field("protected_resource_url", &self.protected_resource_url.as_str())
            .field("scope", &self.scope)
            .finish()
    }
}

impl ResolvedConfig {
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    pub fn redeem_url(&self) -> &Url {
        &self.redeem_url
    }

    pub fn profile_url(&self) -> &Url {
        &self.profile_url
    }

    pub fn protected_resource_url(&self) -> &Url {
        &self.protected_resource_url
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

impl TryFrom<ProviderConfig> for ResolvedConfig {
    type Error = WechatError;

    fn try_from(config: ProviderConfig) -> Result<Self, Self::Error> {
        let config = config.with_defaults();

        Ok(Self {
            login_url: parse_endpoint("login_url", config.login_url)?,
            redeem_url: parse_endpoint("redeem_url", config.redeem_url)?,
            profile_url: parse_endpoint("profile_url", config.profile_url)?,
            protected_resource_url: parse_endpoint(
                "protected_resource_url",
                config.protected_resource_url,
            )?,
            scope: config.scope.unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            client_id: config.client_id,
            client_secret: config.client_secret,
        })
    }
}

fn parse_endpoint(field: &str, value: Option<String>) -> Result<Url, WechatError> {
    let raw = value.unwrap_or_default();
    let url = Url::parse(&raw)
        .map_err(|e| WechatError::Config(format!("{field} is not a valid URL ({raw}): {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(WechatError::Config(format!(
            "{field} must start with http:// or https://, got: {raw}"
        )));
    }

    Ok(url)
}

fn or_default(value: Option<String>, default: &str) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v),
        _ => Some(default.to_string()),
    }
}
