//! Task and response payloads exchanged with collaborators.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Collaborator verdict vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    Success,
    Fail,
    Retry,
    Pending,
}

/// Feedback carried from a rejected attempt into the next GENERATE call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskContext {
    /// Data of the most recent rejected generation.
    pub previous_output: Option<Value>,
    #[serde(default)]
    pub test_feedback: Vec<String>,
    #[serde(default)]
    pub review_feedback: Vec<String>,
}

impl TaskContext {
    pub fn is_empty(&self) -> bool {
        self.previous_output.is_none()
            && self.test_feedback.is_empty()
            && self.review_feedback.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTask {
    pub id: String,
    pub kind: String,
    /// Opaque caller payload, forwarded untouched to every collaborator.
    pub payload: Value,
    /// Generator output under test or review; absent for generation tasks.
    #[serde(default)]
    pub candidate: Option<Value>,
    #[serde(default)]
    pub context: TaskContext,
}

impl AgentTask {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, payload: Value) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            payload,
            candidate: None,
            context: TaskContext::default(),
        }
    }

    /// Derived task handed to a checking stage for one attempt.
    pub fn follow_up(&self, kind: &str, attempt: u32, candidate: Value) -> Self {
        Self {
            id: format!("{}_{kind}_{attempt}", self.id),
            kind: kind.to_string(),
            payload: self.payload.clone(),
            candidate: Some(candidate),
            context: self.context.clone(),
        }
    }
}

/// One tool invocation made by a collaborator while handling a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCallRecord {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub status: AgentStatus,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub reasoning_trace: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl AgentResponse {
    pub fn success(data: Value) -> Self {
        Self {
            status: AgentStatus::Success,
            data,
            reasoning_trace: String::new(),
            tool_calls: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn fail<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status: AgentStatus::Fail,
            data: Value::Null,
            reasoning_trace: String::new(),
            tool_calls: Vec::new(),
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.reasoning_trace = trace.into();
        self
    }

    pub fn with_tool_call(mut self, call: ToolCallRecord) -> Self {
        self.tool_calls.push(call);
        self
    }
}
