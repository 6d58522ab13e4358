//! # UIGen Core
//!
//! Domain types, traits, and error definitions shared by every UIGen crate.
//! Conversations, content blocks, and the seams the runtime is assembled
//! from (`Provider`, `Tool`, `ProjectStore`) live here; implementations live
//! in their own crates and depend inward on this one.

pub mod context;
pub mod error;
pub mod message;
pub mod provider;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use context::RequestContext;
pub use error::{Error, ProviderError, Result, StoreError, ToolError};
pub use message::{ClientMessage, ContentBlock, Conversation, MessageContent, Role, Turn};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StopReason, ToolDefinition, Usage};
pub use store::{ProjectRecord, ProjectStore};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
