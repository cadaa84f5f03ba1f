use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrewError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Tool error: {tool}: {message}")]
    Tool { tool: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Agent exceeded maximum iterations ({0})")]
    MaxIterations(usize),

    #[error("Task {task} failed: {message}")]
    Task { task: usize, message: String },

}

impl CrewError {
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Wrap a failure of the task at `task` (1-based, as shown to users).
    pub fn task(task: usize, message: impl Into<String>) -> Self {
        Self::Task {
            task,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CrewError>;
