use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{endpoints, env, limits, models, paths, temperature};
use crate::error::CrewError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub crew: CrewSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub model: String,
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub temperatures: RoleTemperatures,
}

/// Sampling temperature for each of the three pipeline roles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleTemperatures {
    pub researcher: f32,
    pub data_engineer: f32,
    pub report_builder: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewSettings {
    pub verbose: bool,
    pub max_iterations: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: models::DEFAULT_MODEL.to_string(),
            api_key_env: env::OPENAI_API_KEY.to_string(),
            base_url: None,
            temperatures: RoleTemperatures::default(),
        }
    }
}

impl Default for RoleTemperatures {
    fn default() -> Self {
        Self {
            researcher: temperature::RESEARCHER,
            data_engineer: temperature::DATA_ENGINEER,
            report_builder: temperature::REPORT_BUILDER,
        }
    }
}

impl Default for CrewSettings {
    fn default() -> Self {
        Self {
            verbose: true,
            max_iterations: limits::AGENT_MAX_ITERATIONS,
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(paths::CONFIG_DIR)
            .join(paths::CONFIG_FILE)
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Missing or unparseable files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "ignoring invalid config: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), "cannot read config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), CrewError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CrewError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CrewError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the API key from the environment variable specified in settings.
    /// An empty value counts as unset.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    pub fn require_api_key(&self) -> Result<String, CrewError> {
        self.api_key()
            .ok_or_else(|| CrewError::Config("No API key found in environment variables".into()))
    }

    pub fn base_url(&self) -> &str {
        self.llm
            .base_url
            .as_deref()
            .unwrap_or(endpoints::OPENAI_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_tuning() {
        let settings = Settings::default();
        assert_eq!(settings.llm.model, "gpt-4");
        assert_eq!(settings.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(settings.llm.temperatures.researcher, 0.7);
        assert_eq!(settings.llm.temperatures.data_engineer, 0.2);
        assert_eq!(settings.llm.temperatures.report_builder, 0.5);
        assert!(settings.crew.verbose);
        assert_eq!(settings.base_url(), "https://api.openai.com");
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [llm]
            model = "gpt-4o"

            [llm.temperatures]
            researcher = 0.9
            "#,
        )
        .unwrap();
        assert_eq!(settings.llm.model, "gpt-4o");
        assert_eq!(settings.llm.temperatures.researcher, 0.9);
        assert_eq!(settings.llm.temperatures.data_engineer, 0.2);
        assert_eq!(settings.crew.max_iterations, limits::AGENT_MAX_ITERATIONS);
    }
}
