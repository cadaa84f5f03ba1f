use crate::constants::{endpoints, limits};
use crate::error::CrewError;
use crate::tools::traits::{Tool, ToolResult};
use crate::tools::{http_client, strip_html_tags};
use serde::Deserialize;
use serde_json::Value;

/// Looks topics up through the MediaWiki search API.
pub struct WikipediaTool {
    api_url: String,
}

impl Default for WikipediaTool {
    fn default() -> Self {
        Self {
            api_url: endpoints::WIKIPEDIA_API_URL.to_string(),
        }
    }
}

impl WikipediaTool {
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
    #[serde(default)]
    snippet: String,
}

#[async_trait::async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Look up a topic on Wikipedia. Returns the best-matching article titles, URLs, and short plain-text summaries. Use this for background, definitions, and history."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The topic or search terms"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of articles to return (default: 3)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: Value) -> ToolResult {
        let query = params
            .get("query")
            .and_then(|v| v.as_str())
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| CrewError::tool("wikipedia", "Missing required parameter: query"))?;

        let max_results = params
            .get("max_results")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(limits::WIKIPEDIA_MAX_RESULTS);

        let client = http_client("wikipedia")?;
        let limit = max_results.to_string();

        let response = client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CrewError::tool("wikipedia", format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CrewError::tool("wikipedia", format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(CrewError::tool(
                "wikipedia",
                format!("Wikipedia API error ({status})"),
            ));
        }

        let results = parse_search_results(&body, max_results)?;

        Ok(serde_json::json!({
            "query": query,
            "results": results,
            "count": results.len(),
        }))
    }
}

fn parse_search_results(body: &str, max_results: usize) -> Result<Vec<Value>, CrewError> {
    let parsed: SearchResponse = serde_json::from_str(body)
        .map_err(|e| CrewError::tool("wikipedia", format!("Unexpected response: {e}")))?;

    let hits = parsed.query.map(|q| q.search).unwrap_or_default();

    Ok(hits
        .into_iter()
        .take(max_results)
        .map(|hit| {
            serde_json::json!({
                "url": article_url(&hit.title),
                "summary": strip_html_tags(&hit.snippet),
                "title": hit.title,
            })
        })
        .collect())
}

fn article_url(title: &str) -> String {
    format!(
        "https://en.wikipedia.org/wiki/{}",
        urlencoding::encode(&title.replace(' ', "_"))
    )
}
