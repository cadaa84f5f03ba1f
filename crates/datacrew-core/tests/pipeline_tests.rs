use datacrew_core::config::Settings;
use datacrew_core::pipeline::{
    topic_tasks, DATA_ENGINEER_ROLE, ERROR_PREFIX, REPORT_BUILDER_ROLE, RESEARCHER_ROLE,
};
use datacrew_core::{
    analyze_topic, CrewError, CrewEvent, DataScienceCrew, LlmClient, LlmResponse, Message,
    ToolDefinition, ToolRegistry,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::unbounded_channel;

/// Answers every request with a fixed reply (or error) and keeps the prompts.
struct ScriptedLlm {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn ok(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<LlmResponse, CrewError> {
        if let Some(last) = messages.last() {
            self.prompts.lock().unwrap().push(last.content.clone());
        }
        match self.reply {
            Ok(ref text) => Ok(LlmResponse {
                message: Message::assistant(text.clone()),
                usage: None,
            }),
            Err(ref e) => Err(CrewError::Llm(e.clone())),
        }
    }
}

fn offline_crew(
    researcher: Arc<ScriptedLlm>,
    engineer: Arc<ScriptedLlm>,
    builder: Arc<ScriptedLlm>,
) -> DataScienceCrew {
    DataScienceCrew::new(researcher, engineer, builder).with_research_tools(ToolRegistry::new)
}

fn settings_with_key_env(var: &str) -> Settings {
    let mut settings = Settings::default();
    settings.llm.api_key_env = var.to_string();
    settings
}

#[tokio::test]
async fn test_successful_run_returns_report() {
    let researcher = ScriptedLlm::ok("EV sales hit 14M in 2023");
    let engineer = ScriptedLlm::ok("| year | sales |");
    let builder = ScriptedLlm::ok("# EV Report");
    let crew = offline_crew(researcher.clone(), engineer.clone(), builder.clone());

    let result = crew.analyze_topic("Electric Vehicle Market Trends 2024").await;

    assert_eq!(result, "# EV Report");
    assert!(!result.starts_with(ERROR_PREFIX));

    assert!(researcher.prompts()[0]
        .starts_with("Current Task: Research Electric Vehicle Market Trends 2024 thoroughly."));
    assert!(engineer.prompts()[0].contains("EV sales hit 14M in 2023"));
    assert!(builder.prompts()[0].contains("| year | sales |"));
    assert!(builder.prompts()[0]
        .contains("Create a comprehensive report about Electric Vehicle Market Trends 2024"));
}

#[tokio::test]
async fn test_execution_error_becomes_string_result() {
    let crew = offline_crew(
        ScriptedLlm::ok("facts"),
        ScriptedLlm::failing("OpenAI API error (500): upstream"),
        ScriptedLlm::ok("unused"),
    );

    let result = crew.analyze_topic("Heat Pumps").await;

    assert!(result.starts_with(ERROR_PREFIX));
    assert!(result.contains("Task 2 failed"));
    assert!(result.contains("upstream"));
}

#[tokio::test]
async fn test_events_stream_through_wrapper() {
    let crew = offline_crew(
        ScriptedLlm::ok("a"),
        ScriptedLlm::ok("b"),
        ScriptedLlm::ok("c"),
    );
    let (tx, mut rx) = unbounded_channel();

    let result = crew.analyze_topic_with_events("Wind Power", Some(tx)).await;
    assert_eq!(result, "c");

    let mut started = Vec::new();
    while let Some(event) = rx.recv().await {
        if let CrewEvent::TaskStarted { agent, .. } = event {
            started.push(agent);
        }
    }
    assert_eq!(
        started,
        [RESEARCHER_ROLE, DATA_ENGINEER_ROLE, REPORT_BUILDER_ROLE]
    );
}

#[test]
fn test_researcher_carries_research_tools() {
    let crew = DataScienceCrew::new(
        ScriptedLlm::ok("a"),
        ScriptedLlm::ok("b"),
        ScriptedLlm::ok("c"),
    )
    .crew("Topic");

    let agents = crew.agents();
    assert_eq!(agents.len(), 3);
    assert_eq!(agents[0].role(), RESEARCHER_ROLE);
    let tools: Vec<String> = agents[0]
        .tools()
        .definitions()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(tools, ["web_search", "wikipedia"]);
    assert!(agents[1].tools().is_empty());
    assert!(agents[2].tools().is_empty());
    assert_eq!(crew.tasks(), topic_tasks("Topic").as_slice());
}

#[test]
fn test_missing_credential_fails_immediately() {
    let settings = settings_with_key_env("DATACREW_TEST_UNSET_KEY_4F2A");

    match DataScienceCrew::from_settings(&settings) {
        Err(CrewError::Config(msg)) => {
            assert_eq!(msg, "No API key found in environment variables")
        }
        Err(other) => panic!("Expected Config error, got {other:?}"),
        Ok(_) => panic!("Expected missing credential to fail"),
    }
}

#[test]
fn test_empty_credential_counts_as_missing() {
    std::env::set_var("DATACREW_TEST_EMPTY_KEY_91C0", "   ");
    let settings = settings_with_key_env("DATACREW_TEST_EMPTY_KEY_91C0");
    assert!(settings.api_key().is_none());
    assert!(settings.require_api_key().is_err());
}

#[test]
fn test_present_credential_builds_crew() {
    std::env::set_var("DATACREW_TEST_PRESENT_KEY_7D13", "sk-test-123");
    let settings = settings_with_key_env("DATACREW_TEST_PRESENT_KEY_7D13");
    assert_eq!(settings.require_api_key().unwrap(), "sk-test-123");
    assert!(DataScienceCrew::from_settings(&settings).is_ok());
}

#[tokio::test]
async fn test_settings_entry_point_reports_missing_credential() {
    let settings = settings_with_key_env("DATACREW_TEST_UNSET_KEY_B8E5");

    let result = analyze_topic(&settings, "Anything").await;

    assert_eq!(
        result,
        "An error occurred: Configuration error: No API key found in environment variables"
    );
}
