//! # logibot-core
//!
//! Shared building blocks for the logibot workspace: the [`LogibotError`] error type,
//! tracing initialization, and the HTTP value types consumed by the webhook router.

pub mod error;
pub mod logger;
pub mod types;

pub use error::{LogibotError, Result};
pub use logger::init_tracing;
pub use types::{Method, Request, Response};
