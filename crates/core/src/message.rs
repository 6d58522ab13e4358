//! Conversation domain types.
//!
//! A [`Turn`] carries either plain text or an ordered list of typed
//! [`ContentBlock`]s. The block set is closed: text, a model's request to
//! run a tool, and a tool's result. Client payloads are checked into these
//! types once at the HTTP boundary via [`Conversation::from_client`].

use serde::{Deserialize, Serialize};

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user, or a tool result relayed on the user's side
    User,
    /// The model
    Assistant,
}

/// One typed block of turn content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool_use(
        id: impl Into<String>,
        name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: None,
        }
    }
}

/// Turn content: a bare string or a list of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    /// Concatenated text of the content, ignoring tool blocks.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }
}

/// A single turn in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: MessageContent,
}

impl Turn {
    /// A plain-text user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// A plain-text assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// An assistant turn replaying a model response verbatim.
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }

    /// A user turn carrying one tool result back to the model.
    pub fn tool_result(
        tool_use_id: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                content: content.into(),
                is_error: is_error.then_some(true),
            }]),
        }
    }

    /// Build a turn from an untrusted client message.
    ///
    /// Returns `None` when the content is empty. Any role other than `user`
    /// is treated as `assistant`. Array content that parses as content
    /// blocks is kept; any other non-string JSON is stringified.
    pub fn from_client(message: &ClientMessage) -> Option<Self> {
        let role = if message.role == "user" {
            Role::User
        } else {
            Role::Assistant
        };

        let content = match &message.content {
            serde_json::Value::Null => return None,
            serde_json::Value::String(text) => {
                if text.trim().is_empty() {
                    return None;
                }
                MessageContent::Text(text.clone())
            }
            serde_json::Value::Array(items) if items.is_empty() => return None,
            other @ serde_json::Value::Array(_) => {
                match serde_json::from_value::<Vec<ContentBlock>>(other.clone()) {
                    Ok(blocks) => MessageContent::Blocks(blocks),
                    Err(_) => MessageContent::Text(other.to_string()),
                }
            }
            other => MessageContent::Text(other.to_string()),
        };

        Some(Self { role, content })
    }
}

/// A message exactly as a client posted it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: serde_json::Value,
}

/// An ordered sequence of turns, replayed to the model in full on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a client's message list, dropping empty messages.
    pub fn from_client(messages: &[ClientMessage]) -> Self {
        Self {
            turns: messages.iter().filter_map(Turn::from_client).collect(),
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}
