use crate::constants::limits;
use crate::crew::CrewEvent;
use crate::error::CrewError;
use crate::llm::{LlmClient, Message, ToolCall, Usage};
use crate::tools::{Tool, ToolDefinition, ToolRegistry};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Who an agent is: the role, what it is after, and the persona behind it.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub verbose: bool,
    pub max_iterations: usize,
}

impl AgentConfig {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            verbose: false,
            max_iterations: limits::AGENT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ToolExecution {
    pub tool_name: String,
    pub params: Value,
    pub success: bool,
    pub result_summary: String,
}

#[derive(Debug, Clone)]
pub struct AgentOutput {
    pub content: String,
    pub tool_calls: Vec<ToolExecution>,
    pub iterations: usize,
    pub usage: Usage,
}

/// An LLM-backed worker. Each agent owns its client, so sampling settings
/// such as temperature are chosen per role.
pub struct Agent {
    config: AgentConfig,
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
}

impl Agent {
    pub fn new(config: AgentConfig, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            config,
            llm,
            tools: ToolRegistry::new(),
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn register_tool(&mut self, tool: Box<dyn Tool>) {
        self.tools.register(tool);
    }

    pub fn role(&self) -> &str {
        &self.config.role
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.config.role, self.config.backstory, self.config.goal
        )
    }

    /// Run a task prompt to completion without emitting events.
    pub async fn execute(&self, prompt: &str) -> Result<AgentOutput, CrewError> {
        self.execute_with_events(0, prompt, None).await
    }

    /// Tool-calling loop: ask the model, run whatever tools it requests, feed
    /// the results back, and stop at the first reply without tool calls.
    pub async fn execute_with_events(
        &self,
        task_index: usize,
        prompt: &str,
        event_tx: Option<&UnboundedSender<CrewEvent>>,
    ) -> Result<AgentOutput, CrewError> {
        let mut messages = vec![Message::system(self.system_prompt()), Message::user(prompt)];
        let tool_definitions: Vec<ToolDefinition> = self.tools.definitions();
        let mut tool_executions = Vec::new();
        let mut usage = Usage::default();
        let mut iterations = 0;

        loop {
            if iterations >= self.config.max_iterations {
                return Err(CrewError::MaxIterations(self.config.max_iterations));
            }
            iterations += 1;

            if self.config.verbose {
                tracing::info!(agent = %self.config.role, iteration = iterations, "thinking");
            }

            let response = self.llm.chat(&messages, &tool_definitions).await?;
            if let Some(u) = response.usage {
                usage.add(u);
            }

            let message = response.message;
            if !message.has_tool_calls() {
                return Ok(AgentOutput {
                    content: message.content,
                    tool_calls: tool_executions,
                    iterations,
                    usage,
                });
            }

            let tool_calls = message.tool_calls.clone();
            messages.push(message);

            for tool_call in &tool_calls {
                let tool_name = tool_call.name.clone();
                emit(
                    event_tx,
                    CrewEvent::ToolStart {
                        task: task_index,
                        agent: self.config.role.clone(),
                        name: tool_name.clone(),
                    },
                );

                let (success, result_str) = self.execute_tool(tool_call).await;
                let summary = if success {
                    truncate_str(&result_str, limits::TOOL_SUMMARY_CHARS)
                } else {
                    result_str.clone()
                };

                if self.config.verbose {
                    tracing::info!(agent = %self.config.role, tool = %tool_name, success, "tool finished");
                }

                emit(
                    event_tx,
                    CrewEvent::ToolResult {
                        task: task_index,
                        name: tool_name.clone(),
                        success,
                        summary: summary.clone(),
                    },
                );

                tool_executions.push(ToolExecution {
                    tool_name,
                    params: tool_call.parse_arguments().unwrap_or(Value::Null),
                    success,
                    result_summary: summary,
                });

                messages.push(Message::tool_result(&tool_call.id, result_str));
            }
        }
    }

    async fn execute_tool(&self, tool_call: &ToolCall) -> (bool, String) {
        let tool_name = &tool_call.name;

        let params = match tool_call.parse_arguments() {
            Ok(p) => p,
            Err(e) => {
                return (false, format!("Failed to parse tool arguments: {e}"));
            }
        };

        match self.tools.get(tool_name) {
            Some(tool) => match tool.execute(params).await {
                Ok(value) => {
                    let result_str = serde_json::to_string_pretty(&value)
                        .unwrap_or_else(|_| value.to_string());
                    (true, result_str)
                }
                Err(e) => (false, format!("Error: {e}")),
            },
            None => (false, format!("Tool '{}' not found", tool_name)),
        }
    }
}

pub(crate) fn emit(tx: Option<&UnboundedSender<CrewEvent>>, event: CrewEvent) {
    if let Some(tx) = tx {
        let _ = tx.send(event);
    }
}

fn truncate_str(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}...", &s[..idx]),
    }
}
