//! # Contact Book
//!
//! Authentication core of the contacts API.
//!
//! ## Core Modules
//!
//! - [`auth`]: Credential hashing, token codec and the session manager
//! - [`db`]: User directory contract, PostgreSQL and in-memory implementations

/// Signup, login, logout and request authorization.
pub mod auth;
pub use auth::{AuthConfig, AuthError, AuthManager, AuthResult, User};

/// Database pool and user directory.
pub mod db;
