use crate::constants::{endpoints, models};
use crate::error::CrewError;
use crate::llm::traits::*;
use crate::tools::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: Option<f32>,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: models::DEFAULT_MODEL.to_string(),
            base_url: endpoints::OPENAI_BASE_URL.to_string(),
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    fn build_tool_defs(&self, tools: &[ToolDefinition]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect()
    }

    fn build_messages(&self, messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|m| match m.role {
                Role::Tool => serde_json::json!({
                    "role": m.role,
                    "tool_call_id": m.tool_call_id.as_deref().unwrap_or_default(),
                    "content": m.content,
                }),
                Role::Assistant if m.has_tool_calls() => {
                    let calls: Vec<Value> = m
                        .tool_calls
                        .iter()
                        .map(|tc| {
                            serde_json::json!({
                                "id": tc.id,
                                "type": "function",
                                "function": { "name": tc.name, "arguments": tc.arguments },
                            })
                        })
                        .collect();
                    serde_json::json!({
                        "role": m.role,
                        "content": m.content,
                        "tool_calls": calls,
                    })
                }
                _ => serde_json::json!({
                    "role": m.role,
                    "content": m.content,
                }),
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<OpenAIToolCall>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    id: String,
    function: OpenAIFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Turn a raw chat-completions body into an [`LlmResponse`].
fn parse_response(response_text: &str) -> Result<LlmResponse, CrewError> {
    let api_response: OpenAIResponse = serde_json::from_str(response_text)
        .map_err(|e| CrewError::Llm(format!("Failed to parse response: {e}")))?;

    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CrewError::Llm("No response from API".into()))?;

    let content = choice.message.content.unwrap_or_default();

    let tool_calls: Vec<ToolCall> = choice
        .message
        .tool_calls
        .into_iter()
        .map(|tc| ToolCall::new(tc.id, tc.function.name, tc.function.arguments))
        .collect();

    let message = Message::assistant_with_tools(content, tool_calls);

    Ok(LlmResponse {
        message,
        usage: api_response.usage.map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        }),
    })
}

#[async_trait::async_trait]
impl LlmClient for OpenAIClient {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, CrewError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request_body = OpenAIRequest {
            model: self.model.clone(),
            messages: self.build_messages(messages),
            tools: if tools.is_empty() {
                None
            } else {
                Some(self.build_tool_defs(tools))
            },
            temperature: self.temperature,
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "chat request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(CrewError::Llm(format!(
                "OpenAI API error ({}): {}",
                status, response_text
            )));
        }

        parse_response(&response_text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_text_choice() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "EV sales grew"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4}
        }"#;
        let response = parse_response(body).unwrap();
        assert_eq!(response.message.content, "EV sales grew");
        assert!(!response.message.has_tool_calls());
        assert_eq!(
            response.usage,
            Some(Usage {
                input_tokens: 12,
                output_tokens: 4
            })
        );
    }

    #[test]
    fn parses_tool_calls_with_null_content() {
        let body = r#"{
            "choices": [{"message": {
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "web_search", "arguments": "{\"query\":\"ev\"}"}
                }]
            }}]
        }"#;
        let response = parse_response(body).unwrap();
        let calls = &response.message.tool_calls;
        assert_eq!(response.message.content, "");
        assert_eq!(calls[0].name, "web_search");
        assert_eq!(calls[0].parse_arguments().unwrap()["query"], "ev");
    }

    #[test]
    fn empty_choices_is_an_error() {
        let err = parse_response(r#"{"choices": []}"#).unwrap_err();
        assert!(err.to_string().contains("No response from API"));
    }

    #[test]
    fn request_omits_unset_temperature_and_tools() {
        let request = OpenAIRequest {
            model: "gpt-4".into(),
            messages: vec![],
            tools: None,
            temperature: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("temperature").is_none());
        assert!(json.get("tools").is_none());

        let client = OpenAIClient::new("sk-test").with_temperature(0.2);
        assert_eq!(client.temperature(), Some(0.2));
        assert_eq!(client.model(), "gpt-4");
    }

    #[test]
    fn messages_are_shaped_by_role() {
        let client = OpenAIClient::new("sk-test");
        let msgs = client.build_messages(&[
            Message::system("sys"),
            Message::assistant_with_tools("", vec![ToolCall::new("call_9", "wikipedia", "{}")]),
            Message::tool_result("call_9", "{\"ok\":true}"),
            Message::assistant("done"),
        ]);
        assert_eq!(msgs[0], serde_json::json!({"role": "system", "content": "sys"}));
        assert_eq!(msgs[1]["role"], "assistant");
        assert_eq!(msgs[1]["tool_calls"][0]["type"], "function");
        assert_eq!(msgs[1]["tool_calls"][0]["function"]["name"], "wikipedia");
        assert_eq!(msgs[2]["role"], "tool");
        assert_eq!(msgs[2]["tool_call_id"], "call_9");
        assert!(msgs[3].get("tool_calls").is_none());
    }
}
