//! Centralized constants: models, endpoints, limits and per-role tuning.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    pub const DEFAULT_MODEL: &str = "gpt-4";
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
    pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";
    pub const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";
}

// ─── Credentials ──────────────────────────────────────────────────────────────

pub mod env {
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// Characters of the credential shown at startup.
    pub const KEY_PREVIEW_CHARS: usize = 15;
}

// ─── Per-role sampling ────────────────────────────────────────────────────────

pub mod temperature {
    /// Higher for open-ended research.
    pub const RESEARCHER: f32 = 0.7;
    /// Low for precise data processing.
    pub const DATA_ENGINEER: f32 = 0.2;
    /// Balanced for report writing.
    pub const REPORT_BUILDER: f32 = 0.5;
}

// ─── Limits ───────────────────────────────────────────────────────────────────

pub mod limits {
    pub const AGENT_MAX_ITERATIONS: usize = 15;
    pub const SEARCH_MAX_RESULTS: usize = 5;
    pub const WIKIPEDIA_MAX_RESULTS: usize = 3;
    pub const HTTP_TIMEOUT_SECS: u64 = 15;
    pub const TOOL_SUMMARY_CHARS: usize = 200;
    pub const USER_AGENT: &str = "datacrew/0.1";
}

// ─── Defaults ─────────────────────────────────────────────────────────────────

pub mod defaults {
    pub const TOPIC: &str = "Electric Vehicle Market Trends 2024";
}

// ─── Config Paths ─────────────────────────────────────────────────────────────

pub mod paths {
    pub const CONFIG_DIR: &str = "datacrew";
    pub const CONFIG_FILE: &str = "config.toml";
}
