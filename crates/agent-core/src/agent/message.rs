use serde::{Deserialize, Serialize};

/// One tool invocation requested by the model inside an AI turn.
///
/// `arguments` is whatever the model produced: a JSON object, a raw string
/// (possibly malformed JSON), or something else entirely. It is resolved by
/// [`crate::agent::args::normalize_args`] right before execution, never here.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ToolCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// Output of one executed tool call.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ToolCallResult {
    pub name: String,
    pub content: String,
}

/// An assistant turn: free text plus zero or more tool-call requests,
/// processed strictly in the order the model emitted them.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct AiMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRequest>,
}

impl AiMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum Message {
    System(String),
    Human(String),
    Ai(AiMessage),
    ToolResult(ToolCallResult),
}

/// Append-only conversation state for one loop execution.
///
/// Messages are never mutated or removed once pushed; the only way in is
/// [`Conversation::push`] and the only way out is a shared slice.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Starts a conversation with an optional system message and the user prompt.
    pub fn start(system: Option<&str>, prompt: &str) -> Self {
        let mut conv = Self::default();
        if let Some(system) = system {
            conv.push(Message::System(system.to_string()));
        }
        conv.push(Message::Human(prompt.to_string()));
        conv
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_orders_system_before_prompt() {
        let conv = Conversation::start(Some("be helpful"), "find the answer");
        assert_eq!(
            conv.messages(),
            &[
                Message::System("be helpful".to_string()),
                Message::Human("find the answer".to_string()),
            ]
        );
    }

    #[test]
    fn start_without_system_begins_with_prompt() {
        let conv = Conversation::start(None, "hi");
        assert_eq!(conv.messages(), &[Message::Human("hi".to_string())]);
    }
}
