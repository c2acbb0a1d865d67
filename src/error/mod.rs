//! The unified error handling system for the application.
//!
//! Each component owns a narrow `thiserror` enum ([`ConfigError`],
//! [`AuthError`], [`TokenError`], [`StoreError`], [`DispatchError`],
//! [`PublishError`]). [`GocialError`] wraps all of them for the boundary layer
//! and the binary.

// 1. Core Types
pub use auth::AuthError;
pub use config::ConfigError;
pub use share::{DispatchError, PublishError};
pub use store::StoreError;
pub use token::TokenError;
pub use types::GocialError;

/// A unified `Result` type for the entire application.
pub type Result<T> = std::result::Result<T, GocialError>;

// 2. Module declarations
pub mod auth;
pub mod config;
pub mod share;
pub mod store;
pub mod token;
pub mod types;

// 3. Context Trait for adding context to errors.
/// Attaches a human-readable context line to any error convertible into [`GocialError`].
pub trait Context<T, E> {
    /// 附加固定的上下文
    #[track_caller]
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display;

    /// 仅在出错时才计算上下文
    #[track_caller]
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E> Context<T, E> for std::result::Result<T, E>
where
    E: Into<GocialError>,
{
    #[track_caller]
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display,
    {
        self.with_context(|| context)
    }

    #[track_caller]
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|error| GocialError::Context {
            context: context().to_string(),
            source: Box::new(error.into()),
        })
    }
}

// 4. Error Category for monitoring and alerting.
/// Who is at fault for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Errors caused by the client (bad input, stale or forged credentials).
    /// Corresponds to 4xx HTTP status codes.
    Client,
    /// Errors caused by the server or its upstream providers.
    /// Corresponds to 5xx HTTP status codes.
    Server,
}
