use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::SyntheticIdentity;

/// Seconds shaved off the upstream `expires_in` so the session reads as
/// expired slightly before WeChat invalidates the token.
pub const EXPIRY_BUFFER_SECS: i64 = 10;

/// Authenticated session produced by a successful code exchange.
///
/// Serializes with the identity flattened into the `email` key, which is the
/// form the host framework stores and looks sessions up by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    access_token: String,
    refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id_token: Option<String>,
    created_at: DateTime<Utc>,
    expires_on: DateTime<Utc>,
    #[serde(rename = "email")]
    identity: SyntheticIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    union_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
}

impl SessionState {
    /// Create a session issued now.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        identity: SyntheticIdentity,
        expires_in: i64,
    ) -> Self {
        Self::issued_at(Utc::now(), access_token, refresh_token, identity, expires_in)
    }

    /// Create a session issued at `created_at`.
    ///
    /// The expiry buffer is applied unconditionally: an `expires_in` below
    /// the buffer yields an `expires_on` at or before `created_at`.
    pub fn issued_at(
        created_at: DateTime<Utc>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        identity: SyntheticIdentity,
        expires_in: i64,
    ) -> Self {
        let seconds = expires_in.saturating_sub(EXPIRY_BUFFER_SECS);
        // out-of-range lifetimes clamp towards their own sign
        let lifetime = Duration::try_seconds(seconds).unwrap_or(if seconds < 0 {
            Duration::MIN
        } else {
            Duration::MAX
        });
        let expires_on = created_at.checked_add_signed(lifetime).unwrap_or(if seconds < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });

        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            id_token: None,
            created_at,
            expires_on,
            identity,
            union_id: None,
            scope: None,
        }
    }

    pub fn with_id_token(mut self, id_token: Option<String>) -> Self {
        self.id_token = id_token;
        self
    }

    pub fn with_union_id(mut self, union_id: Option<String>) -> Self {
        self.union_id = union_id;
        self
    }

    pub fn with_scope(mut self, scope: Option<String>) -> Self {
        self.scope = scope;
        self
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_on(&self) -> DateTime<Utc> {
        self.expires_on
    }

    pub fn identity(&self) -> &SyntheticIdentity {
        &self.identity
    }

    /// Flat identity string the host framework uses as the principal key.
    pub fn email(&self) -> String {
        self.identity.to_string()
    }

    pub fn union_id(&self) -> Option<&str> {
        self.union_id.as_deref()
    }

    /// Scopes granted by the user, comma separated as returned by WeChat.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_on
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> SyntheticIdentity {
        SyntheticIdentity::new("OID1", "APP1", "Wechat")
    }

    #[test]
    fn test_expiry_buffer_applied() {
        let now = Utc::now();
        let session = SessionState::issued_at(now, "AT1", "RT1", identity(), 7200);
        assert_eq!(session.created_at(), now);
        assert_eq!(session.expires_on() - now, Duration::seconds(7190));
        assert!(!session.is_expired_at(now));
    }

    #[test]
    fn test_expiry_buffer_not_clamped_for_short_lifetimes() {
        let now = Utc::now();
        let session = SessionState::issued_at(now, "AT1", "RT1", identity(), 5);
        assert_eq!(session.expires_on() - now, Duration::seconds(-5));
        assert!(session.is_expired_at(now));

        let session = SessionState::issued_at(now, "AT1", "RT1", identity(), 10);
        assert_eq!(session.expires_on(), now);
        assert!(session.is_expired_at(now));

        let session = SessionState::issued_at(now, "AT1", "RT1", identity(), 0);
        assert_eq!(session.expires_on() - now, Duration::seconds(-10));
    }

    #[test]
    fn test_expiry_overflow_clamps_by_sign() {
        let now = Utc::now();

        for expires_in in [i64::MIN, -9_000_000_000_000] {
            let session = SessionState::issued_at(now, "AT1", "RT1", identity(), expires_in);
            assert_eq!(session.expires_on(), DateTime::<Utc>::MIN_UTC);
            assert!(session.is_expired_at(now));
        }

        for expires_in in [i64::MAX, 9_000_000_000_000] {
            let session = SessionState::issued_at(now, "AT1", "RT1", identity(), expires_in);
            assert_eq!(session.expires_on(), DateTime::<Utc>::MAX_UTC);
            assert!(!session.is_expired_at(now));
        }
    }

    #[test]
    fn test_email_is_flat_identity() {
        let session = SessionState::new("AT1", "RT1", identity(), 7200);
        assert_eq!(session.email(), "OID1@APP1.Wechat");
        assert_eq!(session.identity().open_id(), "OID1");
    }

    #[test]
    fn test_optional_fields_default_to_none() {
        let session = SessionState::new("AT1", "RT1", identity(), 7200);
        assert!(session.id_token().is_none());
        assert!(session.union_id().is_none());
        assert!(session.scope().is_none());

        let session = session
            .with_union_id(Some("UID1".to_string()))
            .with_scope(Some("snsapi_userinfo".to_string()));
        assert_eq!(session.union_id(), Some("UID1"));
        assert_eq!(session.scope(), Some("snsapi_userinfo"));
    }

    #[test]
    fn test_serialize_uses_email_key() {
        let session = SessionState::new("AT1", "RT1", identity(), 7200);
        let value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["email"], "OID1@APP1.Wechat");
        assert_eq!(value["access_token"], "AT1");
        assert!(value.get("id_token").is_none());

        let back: SessionState = serde_json::from_value(value).unwrap();
        assert_eq!(back, session);
    }
}
