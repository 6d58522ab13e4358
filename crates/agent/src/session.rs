//! One chat request, from client payload to final snapshot.
//!
//! [`spawn_session`] owns everything a request needs: a fresh file tree
//! rebuilt from the client's snapshot, tool executors bound to it, and the
//! conversation. It reports back over a bounded channel and persists the
//! project once the loop is over.

use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Instrument, error, info, warn};
use uigen_core::context::RequestContext;
use uigen_core::message::{ClientMessage, Conversation, Turn};
use uigen_core::store::{ProjectRecord, ProjectStore};
use uigen_vfs::{FileTree, Snapshot};

use crate::loop_runner::{AgentLoop, LoopStop};
use crate::stream_event::AgentStreamEvent;

/// Events buffered between the session task and the HTTP body.
pub const EVENT_BUFFER: usize = 32;

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ClientMessage>,

    /// The client's current tree. Kept as raw JSON so a malformed snapshot
    /// degrades to an empty tree instead of rejecting the request.
    #[serde(default)]
    pub files: Option<serde_json::Value>,

    #[serde(default)]
    pub project_id: Option<String>,
}

/// Shared, long-lived collaborators of every session.
#[derive(Clone)]
pub struct SessionDeps {
    pub agent: Arc<AgentLoop>,
    pub store: Arc<dyn ProjectStore>,
}

/// Start a session on its own task and return its event stream.
///
/// Dropping the receiver cancels the session: no further model calls or
/// tool executions start, and the snapshot is not sent.
pub fn spawn_session(
    request: ChatRequest,
    deps: SessionDeps,
) -> (RequestContext, mpsc::Receiver<AgentStreamEvent>) {
    let ctx = RequestContext::new(request.project_id.clone());
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let span = ctx.span.clone();
    tokio::spawn(run_session(request, deps, ctx.clone(), tx).instrument(span));
    (ctx, rx)
}

async fn run_session(
    request: ChatRequest,
    deps: SessionDeps,
    ctx: RequestContext,
    tx: mpsc::Sender<AgentStreamEvent>,
) {
    let tree = uigen_vfs::shared(rehydrate(request.files.as_ref()));
    let tools = uigen_tools::registry(tree.clone());
    let mut conversation = Conversation::from_client(&request.messages);
    let client_turns = conversation.turns().to_vec();

    info!(
        turns = conversation.len(),
        dropped = request.messages.len() - conversation.len(),
        "Chat session started"
    );

    let outcome = match deps.agent.run(&mut conversation, &tools, &tx, &ctx).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Agent loop failed");
            let _ = tx.send(AgentStreamEvent::Error(e.to_string())).await;
            return;
        }
    };

    let snapshot = tree.lock().unwrap_or_else(|e| e.into_inner()).serialize();
    if outcome.stop == LoopStop::Cancelled {
        info!("Client disconnected before the snapshot was sent");
    } else if tx.send(AgentStreamEvent::Snapshot(snapshot.clone())).await.is_err() {
        info!("Client disconnected before the snapshot was delivered");
    }
    drop(tx);

    if let Some(project_id) = &ctx.project_id {
        persist(deps.store.as_ref(), project_id, client_turns, &outcome.text, snapshot).await;
    }
}

/// Rebuild the client's tree. Anything unusable yields an empty tree.
fn rehydrate(files: Option<&serde_json::Value>) -> FileTree {
    let Some(value) = files.filter(|v| !v.is_null()) else {
        return FileTree::new();
    };
    let tree = Snapshot::from_value(value.clone())
        .map_err(|e| e.to_string())
        .and_then(|snapshot| FileTree::from_snapshot(&snapshot).map_err(|e| e.to_string()));
    match tree {
        Ok(tree) => tree,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed file snapshot");
            FileTree::new()
        }
    }
}

/// Save the client's turns plus the assistant's text. Failures are logged.
async fn persist(
    store: &dyn ProjectStore,
    project_id: &str,
    mut messages: Vec<Turn>,
    text: &str,
    files: Snapshot,
) {
    if !text.is_empty() {
        messages.push(Turn::assistant(text));
    }
    let record = ProjectRecord::new(project_id, messages, files);
    match store.save(record).await {
        Ok(()) => info!(store = store.name(), "Project saved"),
        Err(e) => warn!(store = store.name(), error = %e, "Failed to save project"),
    }
}
