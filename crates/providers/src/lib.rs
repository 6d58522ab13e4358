//! Model provider implementations for UIGen.
//!
//! All providers implement the `uigen_core::Provider` trait.

pub mod anthropic;

pub use anthropic::AnthropicProvider;
