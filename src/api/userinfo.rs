use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::api::r#trait::{WechatApi, WechatContext};
use crate::error::{ProfileError, WechatError};
use crate::types::SessionState;

/// Profile locale requested from WeChat
const PROFILE_LANG: &str = "zh_CN";

/// Response from `/sns/userinfo`
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserInfoResponse {
    /// User's unique ID under this app
    pub openid: String,
    /// User's nickname
    #[serde(default)]
    pub nickname: Option<String>,
    /// Gender: 0=unknown, 1=male, 2=female
    #[serde(default)]
    pub sex: Option<i32>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    /// Country code, e.g. CN
    #[serde(default)]
    pub country: Option<String>,
    /// Avatar URL; the trailing number selects the square size (0 means 640x640)
    #[serde(default)]
    pub headimgurl: Option<String>,
    #[serde(default)]
    pub privilege: Option<Vec<String>>,
    /// Only present once the app is bound to a WeChat Open Platform account
    #[serde(default)]
    pub unionid: Option<String>,
}

/// Display profile handed back to the host framework
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    pub name: String,
    pub avatar: String,
}

impl Profile {
    /// JSON form `{"name":...,"avatar":...}`.
    pub fn to_json(&self) -> Result<String, WechatError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<UserInfoResponse> for Profile {
    fn from(info: UserInfoResponse) -> Self {
        Self {
            name: info.nickname.unwrap_or_default(),
            avatar: info.headimgurl.unwrap_or_default(),
        }
    }
}

/// WeChat user info API
pub struct UserInfoApi {
    context: Arc<WechatContext>,
}

impl UserInfoApi {
    /// Create a new UserInfoApi instance
    pub fn new(context: Arc<WechatContext>) -> Self {
        Self { context }
    }

    /// Fetch the raw user info for a session
    ///
    /// GET /sns/userinfo
    pub async fn get_user_info(
        &self,
        session: &SessionState,
    ) -> Result<UserInfoResponse, WechatError> {
        let config = self.context.config();
        let query = [
            ("access_token", session.access_token()),
            ("openid", session.identity().open_id()),
            ("lang", PROFILE_LANG),
        ];

        debug!("[WechatOAuth] fetching profile at {}", config.profile_url());
        self.context.client.get(config.profile_url(), &query).await
    }

    /// Fetch the user's display name and avatar
    ///
    /// # Errors
    /// Any failure is wrapped in a [`ProfileError`] whose fallback name is
    /// the session's open id.
    pub async fn resolve_profile(&self, session: &SessionState) -> Result<Profile, ProfileError> {
        let open_id = session.identity().open_id();

        self.get_user_info(session)
            .await
            .map(Profile::from)
            .map_err(|e| ProfileError::new(open_id, e))
    }
}

impl WechatApi for UserInfoApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "userinfo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_info_response_full_parse() {
        let json = r#"{
            "openid": "OID1",
            "nickname": "小明",
            "sex": 1,
            "city": "Shenzhen",
            "province": "Guangdong",
            "country": "CN",
            "headimgurl": "http://x/a.jpg",
            "privilege": ["chinaunicom"],
            "unionid": "UID1"
        }"#;

        let info: UserInfoResponse = serde_json::from_str(json).unwrap();
        assert_eq!(info.openid, "OID1");
        assert_eq!(info.nickname.as_deref(), Some("小明"));
        assert_eq!(info.sex, Some(1));
        assert_eq!(info.country.as_deref(), Some("CN"));
        assert_eq!(info.privilege, Some(vec!["chinaunicom".to_string()]));
        assert_eq!(info.unionid.as_deref(), Some("UID1"));
    }

    #[test]
    fn test_user_info_response_sex_outside_byte_range() {
        let info: UserInfoResponse =
            serde_json::from_str(r#"{"openid": "OID1", "nickname": "n", "sex": 300}"#).unwrap();
        assert_eq!(info.sex, Some(300));

        let info: UserInfoResponse =
            serde_json::from_str(r#"{"openid": "OID1", "sex": -1}"#).unwrap();
        assert_eq!(info.sex, Some(-1));
    }

    #[test]
    fn test_user_info_response_minimal_parse() {
        let json = r#"{"openid": "OID1"}"#;

        let info: UserInfoResponse = serde_json::from_str(json).unwrap();
        assert!(info.nickname.is_none());
        assert!(info.sex.is_none());
        assert!(info.headimgurl.is_none());
        assert!(info.privilege.is_none());
    }

    #[test]
    fn test_user_info_response_absent_vs_empty_avatar() {
        let present: UserInfoResponse =
            serde_json::from_str(r#"{"openid": "OID1", "headimgurl": ""}"#).unwrap();
        let absent: UserInfoResponse = serde_json::from_str(r#"{"openid": "OID1"}"#).unwrap();

        assert_eq!(present.headimgurl.as_deref(), Some(""));
        assert!(absent.headimgurl.is_none());
        // both render the same avatar
        assert_eq!(Profile::from(present).avatar, Profile::from(absent).avatar);
    }

    #[test]
    fn test_profile_json_has_exactly_name_and_avatar() {
        let profile = Profile {
            name: "小明".to_string(),
            avatar: "http://x/a.jpg".to_string(),
        };

        let json = profile.to_json().unwrap();
        assert_eq!(json, r#"{"name":"小明","avatar":"http://x/a.jpg"}"#);
    }

    #[test]
    fn test_profile_json_escapes_quotes() {
        let profile = Profile {
            name: "say \"hi\"".to_string(),
            avatar: String::new(),
        };

        let value: serde_json::Value = serde_json::from_str(&profile.to_json().unwrap()).unwrap();
        assert_eq!(value["name"], "say \"hi\"");
        assert_eq!(value["avatar"], "");
    }
}
