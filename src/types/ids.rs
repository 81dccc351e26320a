use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WechatError;

/// Principal identity issued for a WeChat login.
///
/// WeChat has no email concept, so the host framework keys sessions by the
/// flat form `{open_id}@{app_id}.{provider}`. That string is persisted by
/// other components and must stay byte-stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntheticIdentity {
    open_id: String,
    app_id: String,
    provider: String,
}

impl SyntheticIdentity {
    pub fn new(
        open_id: impl Into<String>,
        app_id: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            open_id: open_id.into(),
            app_id: app_id.into(),
            provider: provider.into(),
        }
    }

    pub fn open_id(&self) -> &str {
        &self.open_id
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}

impl fmt::Display for SyntheticIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}.{}", self.open_id, self.app_id, self.provider)
    }
}

impl FromStr for SyntheticIdentity {
    type Err = WechatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WechatError::InvalidIdentity(s.to_string());

        let (open_id, rest) = s.split_once('@').ok_or_else(invalid)?;
        // provider labels never contain '.', app ids might
        let (app_id, provider) = rest.rsplit_once('.').ok_or_else(invalid)?;

        if open_id.is_empty() || app_id.is_empty() || provider.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(open_id, app_id, provider))
    }
}

impl Serialize for SyntheticIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SyntheticIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
