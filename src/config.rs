use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::constants::{
    DEFAULT_CREDENTIALS_FILE, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MODERATION_TIMEOUT_SECS,
    DEFAULT_PORT, DEFAULT_RANGE, OPENAI_API_BASE, OPENAI_MODERATION_MODEL, SHEETS_API_BASE,
};
use crate::error::{FeedError, Result};
use crate::pipeline::media_gate::FailurePolicy;
use crate::types::FieldNames;

/// Service configuration: `config.toml` (every section optional) with
/// environment variables layered on top.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sheets: SheetsConfig,
    pub fields: FieldNames,
    pub moderation: ModerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub range: String,
    pub credentials_file: String,
    /// Used instead of the service account when set
    pub api_key: Option<String>,
    pub api_base: String,
    pub fetch_timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            range: DEFAULT_RANGE.to_string(),
            credentials_file: DEFAULT_CREDENTIALS_FILE.to_string(),
            api_key: None,
            api_base: SHEETS_API_BASE.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationBackend {
    #[default]
    AllowAll,
    #[serde(rename = "openai")]
    OpenAi,
}

impl std::str::FromStr for ModerationBackend {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow_all" => Ok(ModerationBackend::AllowAll),
            "openai" => Ok(ModerationBackend::OpenAi),
            other => Err(FeedError::Config(format!("Unknown moderation backend '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    pub backend: ModerationBackend,
    pub timeout_secs: u64,
    pub on_error: FailurePolicy,
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub openai_model: String,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            backend: ModerationBackend::AllowAll,
            timeout_secs: DEFAULT_MODERATION_TIMEOUT_SECS,
            on_error: FailurePolicy::FailClosed,
            openai_api_key: None,
            openai_api_base: OPENAI_API_BASE.to_string(),
            openai_model: OPENAI_MODERATION_MODEL.to_string(),
        }
    }
}

impl Config {
    /// Load `path` if it exists, apply environment overrides, then validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                FeedError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            info!("Loaded configuration from {}", path.display());
            Self::from_toml_str(&content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Layer environment-style overrides on top of file values
    pub fn apply_overrides<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = get("SHEET_ID") {
            self.sheets.spreadsheet_id = id;
        }
        if let Some(range) = get("SHEET_RANGE") {
            self.sheets.range = range;
        }
        if let Some(path) = get("GOOGLE_APPLICATION_CREDENTIALS") {
            self.sheets.credentials_file = path;
        }
        if let Some(key) = get("SHEETS_API_KEY") {
            self.sheets.api_key = Some(key);
        }
        if let Some(port) = get("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| FeedError::Config(format!("Invalid PORT '{}': {}", port, e)))?;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.moderation.openai_api_key = Some(key);
        }
        if let Some(backend) = get("MODERATION_BACKEND") {
            self.moderation.backend = backend.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.sheets.spreadsheet_id.trim().is_empty() {
            return Err(FeedError::Config(
                "sheets.spreadsheet_id is required (or set SHEET_ID)".to_string(),
            ));
        }
        if self.sheets.range.trim().is_empty() {
            return Err(FeedError::Config("sheets.range must not be empty".to_string()));
        }
        if self.sheets.fetch_timeout_secs == 0 || self.moderation.timeout_secs == 0 {
            return Err(FeedError::Config("timeouts must be at least one second".to_string()));
        }
        if self.moderation.backend == ModerationBackend::OpenAi
            && self.moderation.openai_api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(FeedError::Config(
                "moderation.backend = \"openai\" requires OPENAI_API_KEY".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.sheets.range, "sheet1!A:H");
        assert_eq!(config.sheets.credentials_file, "google-service-account.json");
        assert_eq!(config.fields.title, "News Title");
        assert_eq!(config.moderation.backend, ModerationBackend::AllowAll);
        assert_eq!(config.moderation.on_error, FailurePolicy::FailClosed);
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let config = Config::from_toml_str(
            r#"
            [sheets]
            spreadsheet_id = "abc"

            [fields]
            title = "Headline"

            [moderation]
            backend = "openai"
            on_error = "fail_open"
            "#,
        )
        .unwrap();

        assert_eq!(config.sheets.spreadsheet_id, "abc");
        assert_eq!(config.sheets.fetch_timeout_secs, 10);
        assert_eq!(config.fields.title, "Headline");
        assert_eq!(config.fields.description, "News Description");
        assert_eq!(config.moderation.backend, ModerationBackend::OpenAi);
        assert_eq!(config.moderation.on_error, FailurePolicy::FailOpen);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::from_toml_str("[sheets]\nspreadsheet_id = \"file\"\n").unwrap();
        config
            .apply_overrides(env(&[
                ("SHEET_ID", "env"),
                ("PORT", "8080"),
                ("SHEETS_API_KEY", "k"),
                ("MODERATION_BACKEND", "OpenAI"),
                ("OPENAI_API_KEY", "sk-test"),
            ]))
            .unwrap();

        assert_eq!(config.sheets.spreadsheet_id, "env");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.sheets.api_key.as_deref(), Some("k"));
        assert_eq!(config.moderation.backend, ModerationBackend::OpenAi);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("SHEET_ID", "  ")])).unwrap();
        assert!(config.sheets.spreadsheet_id.is_empty());
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let mut config = Config::default();
        let err = config.apply_overrides(env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }

    #[test]
    fn test_validate_requires_spreadsheet_id() {
        assert!(matches!(Config::default().validate(), Err(FeedError::Config(_))));
    }

    #[test]
    fn test_validate_requires_openai_key() {
        let mut config = Config::default();
        config.sheets.spreadsheet_id = "abc".into();
        config.moderation.backend = ModerationBackend::OpenAi;
        assert!(config.validate().is_err());
        config.moderation.openai_api_key = Some("sk-test".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sheets]\nspreadsheet_id = \"from-file\"\nrange = \"Responses!A:H\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.sheets.range, "Responses!A:H");
    }
}
