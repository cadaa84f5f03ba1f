/// A unit of work bound to an agent by role name.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub description: String,
    pub agent: String,
    pub expected_output: Option<String>,
}

impl Task {
    pub fn new(description: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            agent: agent.into(),
            expected_output: None,
        }
    }

    pub fn with_expected_output(mut self, expected: impl Into<String>) -> Self {
        self.expected_output = Some(expected.into());
        self
    }

    /// The user prompt handed to the agent. `context` is the previous task's output.
    pub fn prompt(&self, context: &str) -> String {
        let mut prompt = format!("Current Task: {}\n\n", self.description.trim());

        if let Some(ref expected) = self.expected_output {
            prompt.push_str("This is the expected criteria for your final answer: ");
            prompt.push_str(expected.trim());
            prompt.push_str("\n\n");
        }

        if !context.trim().is_empty() {
            prompt.push_str("This is the context you're working with:\n");
            prompt.push_str(context.trim());
            prompt.push_str("\n\n");
        }

        prompt.push_str("Begin!");
        prompt
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutput {
    pub description: String,
    pub agent: String,
    pub raw: String,
}
