use thiserror::Error;

/// WeChat OAuth provider error types
#[derive(Debug, Error)]
pub enum WechatError {
    #[error("missing code")]
    MissingCode,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("got {status} from {url:?} {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("WeChat API error (code={code}): {message}")]
    Api { code: i64, message: String },

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid session identity: {0}")]
    InvalidIdentity(String),
}

impl WechatError {
    /// Upstream status code when the error came from a non-200 response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Profile lookup failure.
///
/// Carries the open id derived from the session as a best-effort display name.
/// The error itself is authoritative; the fallback name is only a hint.
#[derive(Debug, Error)]
#[error("failed to resolve profile for {fallback_name}: {source}")]
pub struct ProfileError {
    fallback_name: String,
    #[source]
    source: WechatError,
}

impl ProfileError {
    pub(crate) fn new(fallback_name: impl Into<String>, source: WechatError) -> Self {
        Self {
            fallback_name: fallback_name.into(),
            source,
        }
    }

    pub fn fallback_name(&self) -> &str {
        &self.fallback_name
    }

    pub fn error(&self) -> &WechatError {
        &self.source
    }

    pub fn into_error(self) -> WechatError {
        self.source
    }
}
