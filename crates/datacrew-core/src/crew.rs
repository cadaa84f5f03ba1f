use crate::agent::{emit, Agent};
use crate::error::CrewError;
use crate::llm::Usage;
use crate::task::{Task, TaskOutput};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// Events emitted while a crew runs. Task indices are 1-based.
#[derive(Debug, Clone)]
pub enum CrewEvent {
    TaskStarted { task: usize, agent: String },
    ToolStart { task: usize, agent: String, name: String },
    ToolResult { task: usize, name: String, success: bool, summary: String },
    TaskCompleted { task: usize, output: TaskOutput },
    Complete { tasks: usize },
    Error(String),
}

/// Result of a full crew run.
#[derive(Debug, Clone)]
pub struct CrewOutput {
    /// Output of the last task.
    pub raw: String,
    pub tasks_output: Vec<TaskOutput>,
    pub token_usage: Usage,
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Agents and the tasks they work through, one after another.
pub struct Crew {
    agents: Vec<Agent>,
    tasks: Vec<Task>,
    verbose: bool,
}

impl Crew {
    pub fn new(agents: Vec<Agent>, tasks: Vec<Task>) -> Self {
        Self {
            agents,
            tasks,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub async fn kickoff(&self) -> Result<CrewOutput, CrewError> {
        self.kickoff_with_events(None).await
    }

    /// Run every task in order. Each task sees the previous task's output as
    /// its context; the first task gets none.
    pub async fn kickoff_with_events(
        &self,
        event_tx: Option<UnboundedSender<CrewEvent>>,
    ) -> Result<CrewOutput, CrewError> {
        let tx = event_tx.as_ref();
        let result = self.run(tx).await;
        if let Err(ref e) = result {
            emit(tx, CrewEvent::Error(e.to_string()));
        }
        result
    }

    async fn run(&self, tx: Option<&UnboundedSender<CrewEvent>>) -> Result<CrewOutput, CrewError> {
        let assignments = self.assign()?;

        let mut tasks_output: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());
        let mut token_usage = Usage::default();

        for (i, (task, agent)) in self.tasks.iter().zip(assignments).enumerate() {
            let index = i + 1;
            emit(
                tx,
                CrewEvent::TaskStarted {
                    task: index,
                    agent: agent.role().to_string(),
                },
            );
            if self.verbose {
                tracing::info!(task = index, agent = %agent.role(), "task started");
            }

            let context = tasks_output.last().map(|o| o.raw.as_str()).unwrap_or("");
            let prompt = task.prompt(context);

            let output = agent
                .execute_with_events(index, &prompt, tx)
                .await
                .map_err(|e| CrewError::task(index, e.to_string()))?;
            token_usage.add(output.usage);

            let task_output = TaskOutput {
                description: task.description.clone(),
                agent: agent.role().to_string(),
                raw: output.content,
            };

            if self.verbose {
                tracing::info!(
                    task = index,
                    agent = %agent.role(),
                    iterations = output.iterations,
                    tools = output.tool_calls.len(),
                    "task completed"
                );
            }
            emit(
                tx,
                CrewEvent::TaskCompleted {
                    task: index,
                    output: task_output.clone(),
                },
            );
            tasks_output.push(task_output);
        }

        emit(tx, CrewEvent::Complete { tasks: tasks_output.len() });

        let raw = tasks_output
            .last()
            .map(|o| o.raw.clone())
            .unwrap_or_default();

        Ok(CrewOutput {
            raw,
            tasks_output,
            token_usage,
        })
    }

    /// Resolve every task's agent before any LLM call is made.
    fn assign(&self) -> Result<Vec<&Agent>, CrewError> {
        if self.tasks.is_empty() {
            return Err(CrewError::Config("Crew has no tasks".into()));
        }

        self.tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                self.agents
                    .iter()
                    .find(|a| a.role() == task.agent)
                    .ok_or_else(|| {
                        CrewError::Config(format!(
                            "Task {} is assigned to unknown agent '{}'",
                            i + 1,
                            task.agent
                        ))
                    })
            })
            .collect()
    }
}
