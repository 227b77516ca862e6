//! Marketplace API Client
//!
//! Client-side session handling for the marketplace API:
//! - `http` - `reqwest` client with bearer injection, GET retries and a
//!   short-lived response cache
//! - `store` - where the `{token, user, timestamp}` session lives
//! - `cache` - whether a stored session can be trusted without a request
//! - `session` - login, register, logout and "who am I" with an offline
//!   fallback

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod response_cache;
pub mod session;
pub mod store;

#[cfg(test)]
mod tests;

pub use cache::{AuthCache, token_expiry};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{ApiClient, into_data};
pub use session::{Identity, LOGIN_PATH, SessionManager};
pub use store::{FileSessionStore, MemorySessionStore, SessionEntry, SessionStore, SessionUser};
