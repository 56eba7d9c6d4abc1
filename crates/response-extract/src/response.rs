//! Provider-neutral shape of a model response.
//!
//! Providers disagree on almost everything, so the engine only relies on an
//! ordered message list where each message may carry tool invocations and/or
//! text parts. Anything richer stays with the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An opaque model response: the full ordered message list of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawModelOutput {
    #[serde(default)]
    pub messages: Vec<ModelMessage>,
}

impl RawModelOutput {
    pub fn new(messages: Vec<ModelMessage>) -> Self {
        Self { messages }
    }

    /// A single-message response holding one text part.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![ModelMessage::text(text)])
    }

    pub fn last_message(&self) -> Option<&ModelMessage> {
        self.messages.last()
    }
}

/// One message of a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMessage {
    #[serde(default)]
    pub tool_calls: Vec<ToolInvocation>,
    #[serde(default)]
    pub parts: Vec<String>,
}

impl ModelMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            tool_calls: Vec::new(),
            parts: vec![text.into()],
        }
    }

    pub fn tool_call(name: impl Into<String>, arguments: ToolArguments) -> Self {
        Self {
            tool_calls: vec![ToolInvocation::new(name, arguments)],
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, text: impl Into<String>) -> Self {
        self.parts.push(text.into());
        self
    }

    pub fn first_part(&self) -> Option<&str> {
        self.parts.first().map(String::as_str)
    }
}

/// A tool/function invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: ToolArguments,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: ToolArguments) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Tool arguments arrive either already decoded or as a (possibly broken) JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolArguments {
    Map(Map<String, Value>),
    Text(String),
}

impl ToolArguments {
    pub fn text(raw: impl Into<String>) -> Self {
        Self::Text(raw.into())
    }

    /// Build mapping arguments from a JSON object; non-objects become text.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Map(map),
            Value::String(s) => Self::Text(s),
            other => Self::Text(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_deserialize_untagged() {
        let msg: ModelMessage = serde_json::from_str(
            r#"{"tool_calls":[{"name":"write_code","arguments":{"code":"x = 1"}},
                              {"name":"write_code","arguments":"{\"code\": \"y = 2\"}"}]}"#,
        )
        .expect("deserialize");
        assert!(matches!(msg.tool_calls[0].arguments, ToolArguments::Map(_)));
        assert!(matches!(msg.tool_calls[1].arguments, ToolArguments::Text(_)));
        assert!(msg.parts.is_empty());
    }

    #[test]
    fn test_from_text_builds_single_part() {
        let out = RawModelOutput::from_text("hello");
        assert_eq!(out.messages.len(), 1);
        assert_eq!(out.last_message().and_then(|m| m.first_part()), Some("hello"));
    }
}
