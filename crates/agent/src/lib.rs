//! The UIGen agent: a bounded tool-calling loop over a virtual file tree.
//!
//! One chat request runs as one session:
//!
//! 1. **Rehydrate** the client's snapshot into a fresh `FileTree`
//! 2. **Bind** the editing tools to that tree
//! 3. **Loop**: call the model, forward its text, run the first tool it asks
//!    for, feed the result back, repeat
//! 4. **Finish** with one snapshot of the tree, then persist the project
//!
//! The loop stops when the model stops asking for tools, when it asks for a
//! tool that does not exist, when the client hangs up, or after
//! [`AgentLoop::DEFAULT_MAX_ITERATIONS`] model calls.

pub mod loop_runner;
pub mod prompt;
pub mod session;
pub mod stream_event;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use loop_runner::{AgentLoop, LoopOutcome, LoopStop};
pub use session::{ChatRequest, SessionDeps, spawn_session};
pub use stream_event::AgentStreamEvent;
