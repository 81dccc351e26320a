//! WeChat HTTP Client module
//!
//! This module contains the WechatClient transport and the WechatProvider facade.

mod wechat_client;
pub use wechat_client::{WechatClient, WechatClientBuilder};

mod wechat_provider;
pub use wechat_provider::WechatProvider;

mod builder;
pub use builder::WechatProviderBuilder;
