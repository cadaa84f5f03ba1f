mod traits;
mod web_search;
mod wikipedia;

pub use traits::*;
pub use web_search::WebSearchTool;
pub use wikipedia::WikipediaTool;

/// Shared HTTP client for the research tools.
pub(crate) fn http_client(tool: &str) -> Result<reqwest::Client, crate::error::CrewError> {
    use crate::constants::limits;

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(limits::HTTP_TIMEOUT_SECS))
        .user_agent(limits::USER_AGENT)
        .build()
        .map_err(|e| crate::error::CrewError::tool(tool, format!("HTTP client error: {e}")))
}

/// Strip HTML tags and decode the handful of entities search backends emit.
pub(crate) fn strip_html_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
