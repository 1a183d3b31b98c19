mod auth;
mod client;
mod rest_url;

pub use auth::*;
pub use client::*;
pub use rest_url::*;
