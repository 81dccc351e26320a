//! Complete login flow example
//!
//! This example demonstrates the full web OAuth flow:
//! 1. Redirect the browser to the WeChat consent page
//! 2. Exchange the code from the callback for a session
//! 3. Resolve the user's display profile
//!
//! Run with: cargo run --example login_flow

use wechat_oauth_provider::{middleware::LoggingMiddleware, ProviderConfig, WechatProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let provider = WechatProvider::builder()
        .config(ProviderConfig::new("wx1234567890abcdef", "your_app_secret_here"))
        .with_middleware(LoggingMiddleware::new())
        .build()?;

    let redirect = provider.login_url("https://proxy.example.com/oauth2/callback", "csrf-token");
    println!("Send the browser to: {}", redirect);

    let code = "code_from_callback";

    let session = match provider.redeem(code).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Login error: {}", e);
            return Ok(());
        }
    };

    println!("Login successful!");
    println!("Principal: {}", session.email());
    println!("Expires on: {}", session.expires_on());
    if let Some(unionid) = session.union_id() {
        println!("UnionID: {}", unionid);
    }

    match provider.resolve_profile(&session).await {
        Ok(profile) => println!("Hello, {} ({})", profile.name, profile.avatar),
        Err(e) => eprintln!("Profile error: {} (showing {})", e, e.fallback_name()),
    }

    Ok(())
}
