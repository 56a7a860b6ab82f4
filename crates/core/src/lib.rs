//! # todobot Core
//!
//! Domain types, traits, and error definitions for the todobot assistant.
//! This crate has **no framework dependencies**. It defines the domain model
//! that all other crates implement against: providers, stores and tools are
//! traits here, implementations live in their own crates.

pub mod envelope;
pub mod error;
pub mod message;
pub mod provider;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use envelope::{Envelope, ParseError};
pub use error::{ProviderError, StoreError, ToolError};
pub use message::{Conversation, ConversationId, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use store::{TodoItem, TodoStore};
pub use tool::{TodoOperation, Tool, ToolRegistry};
