mod core;

pub use self::core::{Agent, AgentConfig, AgentOutput, ToolExecution};
pub(crate) use self::core::emit;
