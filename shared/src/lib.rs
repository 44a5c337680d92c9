//! Shared library for BAAC Lambda functions.
//!
//! This crate provides the chatbot core (intent routing, conversation
//! context, curated knowledge, document workflow) plus the common
//! utilities and clients used across all Lambda functions.

pub mod auth;
pub mod completion;
pub mod config;
pub mod context;
pub mod db;
pub mod documents;
pub mod error;
pub mod format;
pub mod http;
pub mod intent;
pub mod knowledge;
pub mod models;
pub mod places;

pub use auth::{decode_token, optional_user, require_user, AuthenticatedUser};
pub use completion::CompletionClient;
pub use config::{admin_credentials, AdminCredentials, Config};
pub use context::{ChatStore, ConversationContext, SessionStore, CONTEXT_CAPACITY};
pub use error::{Error, Result};
pub use intent::{classify, Hints, Intent};
pub use models::{ChatRequest, ChatResponse};
