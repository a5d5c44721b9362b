//! Agent framework primitives: conversation state, argument normalization,
//! tool contracts, and the bounded tool-invocation loop.
//!
//! The loop itself lives in [`run`]; everything else here is the data model
//! and the seams it drives.

pub mod args;
pub mod message;
pub mod prompt;
pub mod run;
pub mod tools;

pub use args::normalize_args;
pub use message::{AiMessage, Conversation, Message, ToolCallRequest, ToolCallResult};
pub use run::{ModelClient, RunConfig, RunReport, Termination, ToolLoop, run_with_tools};
pub use tools::{Tool, ToolSet, ToolSpec, UnknownTool};
