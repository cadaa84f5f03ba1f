pub mod error;
pub mod constants;
pub mod llm;
pub mod tools;
pub mod config;
pub mod agent;
pub mod task;
pub mod crew;
pub mod pipeline;

// Re-export key types
pub use error::CrewError;
pub use agent::{Agent, AgentConfig, AgentOutput, ToolExecution};
pub use llm::{LlmClient, LlmResponse, Message, Role};
pub use tools::{Tool, ToolDefinition, ToolRegistry, ToolResult};
pub use task::{Task, TaskOutput};
pub use crew::{Crew, CrewEvent, CrewOutput};
pub use pipeline::{analyze_topic, analyze_topic_with_events, DataScienceCrew};
pub use config::Settings;
