//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id with tunable cost)
//! - Signed session tokens (HS256 JWT)
//! - Cookie and bearer token extraction
//! - Client IP extraction
//! - Rate limiting infrastructure

pub mod client;
pub mod cookie;
pub mod password;
pub mod rate_limit;
pub mod token;
