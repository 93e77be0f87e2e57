//! Account management module
//!
//! Account rows hold a balance and an optimistic-lock version. Storage lives
//! behind [`crate::store::AccountStore`].

pub mod models;
pub mod service;

// Re-export commonly used types
pub use models::{Account, CreateAccountRequest};
pub use service::AccountService;
