//! Services: auth orchestration and cookie construction.

pub mod auth;
pub mod cookies;
