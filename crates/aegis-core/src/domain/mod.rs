//! Domain types shared by the cycle and its collaborators.

pub mod error;
pub mod task;

pub use error::{AegisError, Result};
pub use task::{AgentResponse, AgentStatus, AgentTask, TaskContext, ToolCallRecord};
