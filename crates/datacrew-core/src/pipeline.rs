//! The data-science crew: a researcher, a data engineer and a report builder
//! working a single topic in sequence.

use crate::agent::{Agent, AgentConfig};
use crate::config::Settings;
use crate::crew::{Crew, CrewEvent};
use crate::error::CrewError;
use crate::llm::{LlmClient, OpenAIClient};
use crate::task::Task;
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

pub const RESEARCHER_ROLE: &str = "Senior Research Analyst";
pub const DATA_ENGINEER_ROLE: &str = "Data Engineer";
pub const REPORT_BUILDER_ROLE: &str = "Report Builder";

const RESEARCHER_GOAL: &str = "Conduct thorough research and gather relevant data";
const DATA_ENGINEER_GOAL: &str = "Process and transform data into useful formats";
const REPORT_BUILDER_GOAL: &str = "Create comprehensive reports with visualizations";

const RESEARCHER_BACKSTORY: &str = "You are a senior research analyst with 15 years of experience in data analysis \
and market research. You have a PhD in Data Science and specialize in pattern recognition \
and trend analysis. You excel at:
1. Finding and validating information from multiple sources
2. Identifying emerging trends and patterns
3. Critical evaluation of data quality and relevance
4. Providing context and insights for complex topics";

const DATA_ENGINEER_BACKSTORY: &str = "You are a senior data engineer with expertise in data architecture \
and pipeline development. Your specialties include:
1. Data cleaning and normalization
2. Handling missing values and outliers
3. Data quality assurance
4. Creating efficient data transformation workflows
You always ensure data integrity while preparing it for analysis.";

const REPORT_BUILDER_BACKSTORY: &str = "You are an expert data visualization specialist and technical writer \
with a keen eye for detail. Your strengths include:
1. Creating clear and impactful visualizations
2. Translating complex data into understandable insights
3. Structuring information for maximum clarity
4. Maintaining consistency in reporting standards
You excel at making complex information accessible to all stakeholders.";

/// Prefix of every error string returned by [`analyze_topic`].
pub const ERROR_PREFIX: &str = "An error occurred: ";

/// The three configured agents. Tasks are built per topic on each run.
pub struct DataScienceCrew {
    researcher: AgentConfig,
    data_engineer: AgentConfig,
    report_builder: AgentConfig,
    researcher_llm: Arc<dyn LlmClient>,
    data_engineer_llm: Arc<dyn LlmClient>,
    report_builder_llm: Arc<dyn LlmClient>,
    research_tools: fn() -> ToolRegistry,
    verbose: bool,
}

impl DataScienceCrew {
    pub fn new(
        researcher_llm: Arc<dyn LlmClient>,
        data_engineer_llm: Arc<dyn LlmClient>,
        report_builder_llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            researcher: AgentConfig::new(RESEARCHER_ROLE, RESEARCHER_GOAL, RESEARCHER_BACKSTORY),
            data_engineer: AgentConfig::new(
                DATA_ENGINEER_ROLE,
                DATA_ENGINEER_GOAL,
                DATA_ENGINEER_BACKSTORY,
            ),
            report_builder: AgentConfig::new(
                REPORT_BUILDER_ROLE,
                REPORT_BUILDER_GOAL,
                REPORT_BUILDER_BACKSTORY,
            ),
            researcher_llm,
            data_engineer_llm,
            report_builder_llm,
            research_tools: ToolRegistry::research,
            verbose: false,
        }
    }

    /// Build role-specific OpenAI clients from settings. Fails before
    /// constructing anything when the credential is missing.
    pub fn from_settings(settings: &Settings) -> Result<Self, CrewError> {
        let api_key = settings.require_api_key()?;
        let temps = settings.llm.temperatures;

        let client = |temperature: f32| -> Arc<dyn LlmClient> {
            Arc::new(
                OpenAIClient::new(api_key.clone())
                    .with_model(settings.llm.model.clone())
                    .with_base_url(settings.base_url())
                    .with_temperature(temperature),
            )
        };

        Ok(Self::new(
            client(temps.researcher),
            client(temps.data_engineer),
            client(temps.report_builder),
        )
        .with_verbose(settings.crew.verbose)
        .with_max_iterations(settings.crew.max_iterations))
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        for config in self.configs_mut() {
            config.verbose = verbose;
        }
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        for config in self.configs_mut() {
            config.max_iterations = max;
        }
        self
    }

    /// Replace the researcher's toolset (tests use this to stay offline).
    pub fn with_research_tools(mut self, tools: fn() -> ToolRegistry) -> Self {
        self.research_tools = tools;
        self
    }

    fn configs_mut(&mut self) -> [&mut AgentConfig; 3] {
        [
            &mut self.researcher,
            &mut self.data_engineer,
            &mut self.report_builder,
        ]
    }

    /// Fresh crew for one topic.
    pub fn crew(&self, topic: &str) -> Crew {
        let agents = vec![
            Agent::new(self.researcher.clone(), self.researcher_llm.clone())
                .with_tools((self.research_tools)()),
            Agent::new(self.data_engineer.clone(), self.data_engineer_llm.clone()),
            Agent::new(self.report_builder.clone(), self.report_builder_llm.clone()),
        ];
        Crew::new(agents, topic_tasks(topic)).with_verbose(self.verbose)
    }

    pub async fn analyze_topic(&self, topic: &str) -> String {
        self.analyze_topic_with_events(topic, None).await
    }

    /// Run the crew on `topic`. Never fails: errors come back as
    /// `"An error occurred: ..."`.
    pub async fn analyze_topic_with_events(
        &self,
        topic: &str,
        event_tx: Option<UnboundedSender<CrewEvent>>,
    ) -> String {
        tracing::info!(topic, "analyzing topic");
        match self.crew(topic).kickoff_with_events(event_tx).await {
            Ok(output) => output.raw,
            Err(e) => {
                tracing::error!(topic, "crew run failed: {e}");
                format!("{ERROR_PREFIX}{e}")
            }
        }
    }
}

/// The three topic-specific tasks, in execution order.
pub fn topic_tasks(topic: &str) -> Vec<Task> {
    vec![
        Task::new(
            format!(
                "Research {topic} thoroughly.\n\
                 Gather relevant data and information from reliable sources.\n\
                 Provide a summary of key findings."
            ),
            RESEARCHER_ROLE,
        ),
        Task::new(
            format!(
                "Clean and process the collected data about {topic}.\n\
                 Identify and handle any missing values or anomalies.\n\
                 Prepare the data for analysis and visualization."
            ),
            DATA_ENGINEER_ROLE,
        ),
        Task::new(
            format!(
                "Create a comprehensive report about {topic} using the processed data.\n\
                 Include relevant visualizations and insights.\n\
                 Ensure the report is clear and actionable."
            ),
            REPORT_BUILDER_ROLE,
        ),
    ]
}

/// Settings-driven entry point. Startup errors (including a missing
/// credential) are returned as error strings like any other failure.
pub async fn analyze_topic(settings: &Settings, topic: &str) -> String {
    analyze_topic_with_events(settings, topic, None).await
}

pub async fn analyze_topic_with_events(
    settings: &Settings,
    topic: &str,
    event_tx: Option<UnboundedSender<CrewEvent>>,
) -> String {
    match DataScienceCrew::from_settings(settings) {
        Ok(crew) => crew.analyze_topic_with_events(topic, event_tx).await,
        Err(e) => format!("{ERROR_PREFIX}{e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_tasks_are_bound_in_order() {
        let tasks = topic_tasks("Solid-State Batteries");
        let agents: Vec<&str> = tasks.iter().map(|t| t.agent.as_str()).collect();
        assert_eq!(agents, [RESEARCHER_ROLE, DATA_ENGINEER_ROLE, REPORT_BUILDER_ROLE]);
        assert_eq!(
            tasks[0].description,
            "Research Solid-State Batteries thoroughly.\n\
             Gather relevant data and information from reliable sources.\n\
             Provide a summary of key findings."
        );
        assert!(tasks[1]
            .description
            .starts_with("Clean and process the collected data about Solid-State Batteries."));
        assert!(tasks[2]
            .description
            .starts_with("Create a comprehensive report about Solid-State Batteries using"));
    }
}
