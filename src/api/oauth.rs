//! WeChat Web OAuth API
//!
//! Builds the authorization redirect and exchanges authorization codes
//! for session state.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::api::r#trait::{WechatApi, WechatContext};
use crate::error::WechatError;
use crate::types::{SessionState, SyntheticIdentity};

/// Response from `/sns/oauth2/access_token`
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessTokenResponse {
    /// Web authorization access token
    pub access_token: String,
    /// Token used to refresh `access_token`
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    /// Never issued by WeChat, kept for OIDC-shaped callers
    #[serde(default)]
    pub id_token: Option<String>,
    /// User's unique ID under this app
    pub openid: String,
    /// User's unique ID across apps of the same owner
    #[serde(default)]
    pub unionid: Option<String>,
    /// Granted scopes, comma separated
    #[serde(default)]
    pub scope: Option<String>,
}

/// Go `url.Values`-style query map: keys sorted on encode, values of one
/// key kept in insertion order.
#[derive(Debug, Default)]
struct QueryValues(BTreeMap<String, Vec<String>>);

impl QueryValues {
    fn parse(url: &reqwest::Url) -> Self {
        let mut values = Self::default();
        for (key, value) in url.query_pairs() {
            values.add(&key, &value);
        }
        values
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), vec![value.to_string()]);
    }

    fn add(&mut self, key: &str, value: &str) {
        self.0
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    fn write_to(&self, url: &mut reqwest::Url) {
        url.query_pairs_mut().clear().extend_pairs(
            self.0
                .iter()
                .flat_map(|(key, values)| values.iter().map(move |value| (key, value))),
        );
    }
}

/// WeChat web OAuth API
pub struct OAuthApi {
    context: Arc<WechatContext>,
}

impl OAuthApi {
    /// Create a new OAuthApi instance
    pub fn new(context: Arc<WechatContext>) -> Self {
        Self { context }
    }

    /// Build the URL the user agent is redirected to for consent.
    ///
    /// Query parameters already present on the configured login URL are
    /// kept. `redirect_uri`, `appid` and `response_type` replace existing
    /// values; `scope` and `state` are appended.
    pub fn login_url(&self, redirect_uri: &str, state: &str) -> String {
        let config = self.context.config();
        let mut url = config.login_url().clone();

        let mut params = QueryValues::parse(&url);
        params.set("redirect_uri", redirect_uri);
        params.add("scope", config.scope());
        params.set("appid", config.client_id());
        params.set("response_type", "code");
        params.add("state", state);
        params.write_to(&mut url);

        url.into()
    }

    /// Exchange an authorization code for a session
    ///
    /// GET /sns/oauth2/access_token
    ///
    /// # Arguments
    /// * `code` - The code WeChat appended to the redirect callback
    ///
    /// # Errors
    /// `WechatError::MissingCode` for an empty code (no request is made),
    /// otherwise whatever the exchange itself fails with.
    pub async fn redeem(&self, code: &str) -> Result<SessionState, WechatError> {
        if code.is_empty() {
            return Err(WechatError::MissingCode);
        }

        let config = self.context.config();
        let query = [
            ("appid", config.client_id()),
            ("secret", config.client_secret()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];

        debug!("[WechatOAuth] redeeming code at {}", config.redeem_url());
        let response: AccessTokenResponse =
            self.context.client.get(config.redeem_url(), &query).await?;

        // an empty open id would yield an identity that cannot be parsed back
        if response.openid.is_empty() {
            return Err(WechatError::InvalidIdentity(format!(
                "empty openid from {}",
                config.redeem_url()
            )));
        }

        let identity = SyntheticIdentity::new(
            response.openid,
            config.client_id(),
            config.provider_name(),
        );

        Ok(SessionState::new(
            response.access_token,
            response.refresh_token,
            identity,
            response.expires_in,
        )
        .with_id_token(response.id_token)
        .with_union_id(response.unionid)
        .with_scope(response.scope))
    }
}

impl WechatApi for OAuthApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "oauth"
    }
}
