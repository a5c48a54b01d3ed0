//! # bookforge-provider
//!
//! AI text service abstraction for BookForge.
//!
//! ## Features
//! - SSE streaming against the Codex Responses endpoint
//! - Per-attempt timeout with retry and exponential backoff
//! - Scripted service for offline pipelines and tests

pub mod error;
pub mod providers;
pub mod retry;
pub mod r#trait;

// Core traits and types
pub use r#trait::{complete_with_policy, CallPolicy, CompletionRequest, ImagePayload, TextService};

// Error and retry
pub use error::ProviderError;
pub use retry::{with_retry, RetryClassification, RetryConfig, RetryableError};

// Implementations
pub use providers::codex::CodexProvider;
pub use providers::scripted::ScriptedService;
