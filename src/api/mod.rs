//! WeChat web OAuth API modules
//!
//! - [`oauth`] - Authorization URL and authorization-code exchange
//! - [`userinfo`] - Profile lookup for an authenticated session

pub mod oauth;
pub mod r#trait;
pub mod userinfo;

pub use oauth::{AccessTokenResponse, OAuthApi};
pub use r#trait::{WechatApi, WechatContext};
pub use userinfo::{Profile, UserInfoApi, UserInfoResponse};
