use crate::constants::{endpoints, limits};
use crate::error::CrewError;
use crate::tools::traits::{Tool, ToolResult};
use crate::tools::{http_client, strip_html_tags};
use serde_json::Value;

pub struct WebSearchTool {
    base_url: String,
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self {
            base_url: endpoints::DUCKDUCKGO_HTML_URL.to_string(),
        }
    }
}

impl WebSearchTool {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the internet using DuckDuckGo. Returns a list of results with titles, URLs, and snippets. Use this to find current facts, statistics, and sources for a topic."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 5)"
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
            .ok_or_else(|| CrewError::tool("web_search", "Missing required parameter: query"))?;

        let max_results = params
            .get("max_results")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(limits::SEARCH_MAX_RESULTS);

        let client = http_client("web_search")?;

        // HTML lite endpoint needs no API key
        let url = format!("{}?q={}", self.base_url, urlencoding::encode(query));

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| CrewError::tool("web_search", format!("Search request failed: {e}")))?;

        // DDG answers rate-limited clients with 202 and a challenge page
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(CrewError::tool(
                "web_search",
                format!("Search unavailable ({status})"),
            ));
        }

        let html = response
            .text()
            .await
            .map_err(|e| CrewError::tool("web_search", format!("Failed to read response: {e}")))?;

        let results = parse_ddg_results(&html, max_results);
        tracing::debug!(query, count = results.len(), "web search");

        Ok(serde_json::json!({
            "query": query,
            "results": results,
            "count": results.len(),
        }))
    }
}

fn parse_ddg_results(html: &str, max_results: usize) -> Vec<Value> {
    let mut results = Vec::new();

    for segment in html.split("class=\"result__a\"").skip(1) {
        if results.len() >= max_results {
            break;
        }

        let url = extract_between(segment, "href=\"", "\"").unwrap_or_default();
        let title = extract_between(segment, ">", "</a>").unwrap_or_default();
        let snippet = match segment.find("class=\"result__snippet\"") {
            Some(start) => extract_between(&segment[start..], ">", "</a>").unwrap_or_default(),
            None => String::new(),
        };

        // Internal DDG links
        if url.is_empty() || (url.starts_with('/') && !url.contains("uddg=")) {
            continue;
        }

        results.push(serde_json::json!({
            "title": strip_html_tags(&title),
            "url": unwrap_redirect(&url),
            "snippet": strip_html_tags(&snippet),
        }));
    }

    results
}

/// DDG wraps result links in `/l/?uddg=<encoded target>&...`.
fn unwrap_redirect(url: &str) -> String {
    let Some(encoded) = url.split("uddg=").nth(1) else {
        return url.to_string();
    };
    let encoded = encoded.split('&').next().unwrap_or(encoded);
    urlencoding::decode(encoded)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| url.to_string())
}

fn extract_between(text: &str, start: &str, end: &str) -> Option<String> {
    let start_idx = text.find(start)? + start.len();
    let remaining = &text[start_idx..];
    let end_idx = remaining.find(end)?;
    Some(remaining[..end_idx].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::stub;

    const SAMPLE: &str = r#"
        <div class="result">
          <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.iea.org%2Freports%2Fglobal-ev-outlook-2024&amp;rut=abc">Global <b>EV</b> Outlook 2024</a>
          <a class="result__snippet" href="x">Electric car sales neared <b>14 million</b> in 2023.</a>
        </div>
        <div class="result">
          <a rel="nofollow" class="result__a" href="/internal">Ignored</a>
        </div>
        <div class="result">
          <a rel="nofollow" class="result__a" href="https://example.com/ev">EV &amp; batteries</a>
        </div>
    "#;

    #[test]
    fn parses_titles_urls_and_snippets() {
        let results = parse_ddg_results(SAMPLE, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["title"], "Global EV Outlook 2024");
        assert_eq!(
            results[0]["url"],
            "https://www.iea.org/reports/global-ev-outlook-2024"
        );
        assert_eq!(
            results[0]["snippet"],
            "Electric car sales neared 14 million in 2023."
        );
        assert_eq!(results[1]["title"], "EV & batteries");
        assert_eq!(results[1]["snippet"], "");
    }

    #[test]
    fn respects_max_results() {
        assert_eq!(parse_ddg_results(SAMPLE, 1).len(), 1);
        assert!(parse_ddg_results("<html>no results</html>", 5).is_empty());
    }

    #[tokio::test]
    async fn missing_query_is_a_tool_error() {
        let err = WebSearchTool::default()
            .execute(serde_json::json!({ "query": "  " }))
            .await
            .unwrap_err();
        assert!(matches!(err, CrewError::Tool { ref tool, .. } if tool == "web_search"));
    }

    #[tokio::test]
    async fn rate_limited_search_is_a_tool_error() {
        let base = stub::serve_once("202 Accepted", "<html>challenge</html>").await;
        let tool = WebSearchTool::default().with_base_url(format!("{base}/html/"));

        let err = tool
            .execute(serde_json::json!({ "query": "ev sales" }))
            .await
            .unwrap_err();

        assert!(matches!(err, CrewError::Tool { ref message, .. } if message.contains("202")));
    }

    #[tokio::test]
    async fn search_results_come_back_as_json() {
        let base = stub::serve_once("200 OK", SAMPLE).await;
        let tool = WebSearchTool::default().with_base_url(format!("{base}/html/"));

        let result = tool
            .execute(serde_json::json!({ "query": "ev outlook", "max_results": 1 }))
            .await
            .unwrap();

        assert_eq!(result["query"], "ev outlook");
        assert_eq!(result["count"], 1);
        assert_eq!(result["results"][0]["title"], "Global EV Outlook 2024");
    }
}
