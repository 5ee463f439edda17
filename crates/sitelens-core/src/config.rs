use crate::assistant::AssistantProvider;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sitelens.toml";

/// Settings loaded from `sitelens.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SiteLensConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub assistant: AssistantSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AnalysisSettings {
    /// Seed for simulated fields. Unset means fresh entropy per analysis.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AssistantSettings {
    /// Unset means: detect from `ANTHROPIC_API_KEY` / `OPENAI_API_KEY`.
    pub provider: Option<AssistantProvider>,
    pub model: Option<String>,
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> anyhow::Result<SiteLensConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
    let config: SiteLensConfig = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
    Ok(config)
}

/// Load `path` if given, else `sitelens.toml` if present, else defaults.
///
/// An explicitly named file must exist; the implicit one is optional.
pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<SiteLensConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            let implicit = Path::new(DEFAULT_CONFIG_FILE);
            if implicit.exists() {
                load_config(implicit)
            } else {
                Ok(SiteLensConfig::default())
            }
        }
    }
}

/// Generate a starter config file.
pub fn generate_default_config() -> String {
    r#"# SiteLens configuration

[server]
host = "127.0.0.1"
port = 3000

[analysis]
# Fix the seed to make simulated inventory and utilization figures repeatable
# seed = 42

[assistant]
# One of "template", "anthropic", "openai". Detected from API keys when unset.
# provider = "template"
# model = "claude-sonnet-4-20250514"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SiteLensConfig::default();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:3000");
        assert!(config.analysis.seed.is_none());
        assert!(config.assistant.provider.is_none());
    }

    #[test]
    fn test_partial_file() {
        let config: SiteLensConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [analysis]
            seed = 7

            [assistant]
            provider = "openai"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.analysis.seed, Some(7));
        assert_eq!(config.assistant.provider, Some(AssistantProvider::OpenAI));
    }

    #[test]
    fn test_starter_config_parses() {
        let config: SiteLensConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, SiteLensConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nhost = \"0.0.0.0\"").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = load_or_default(Some(Path::new("/nonexistent/sitelens.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"eighty\"").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
