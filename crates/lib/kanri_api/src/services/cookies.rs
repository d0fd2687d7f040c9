//! Cookie service: build and clear the httpOnly auth cookies.

use axum_extra::extract::cookie::Cookie;
use time::Duration;

use crate::config::ApiConfig;

/// Cookie name for the access token.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie name for the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Build the httpOnly cookie carrying the access token.
pub fn access_cookie(token: &str, config: &ApiConfig) -> Cookie<'static> {
    build(
        ACCESS_COOKIE,
        token,
        Duration::seconds(config.access_token_expiry_secs),
        config,
    )
}

/// Build the httpOnly cookie carrying the refresh token.
pub fn refresh_cookie(token: &str, config: &ApiConfig) -> Cookie<'static> {
    build(
        REFRESH_COOKIE,
        token,
        Duration::days(config.refresh_token_expiry_days),
        config,
    )
}

/// Build an expired cookie that clears the access token.
pub fn clear_access_cookie(config: &ApiConfig) -> Cookie<'static> {
    build(ACCESS_COOKIE, "", Duration::ZERO, config)
}

/// Build an expired cookie that clears the refresh token.
pub fn clear_refresh_cookie(config: &ApiConfig) -> Cookie<'static> {
    build(REFRESH_COOKIE, "", Duration::ZERO, config)
}

fn build(name: &str, value: &str, max_age: Duration, config: &ApiConfig) -> Cookie<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(config.cookie_same_site)
        .path("/".to_string())
        .max_age(max_age)
        .build()
}
