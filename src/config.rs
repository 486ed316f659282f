// Configuration loading: optional TOML file plus environment

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::NlshError;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Resolved configuration, constructed once in `main` and passed by
/// reference to the completion client and executor. There is no global
/// client state.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub exec_timeout_secs: u64,
}

/// On-disk shape: everything optional, the resolved `Config` fills in
/// defaults.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_key: Option<String>,
    model: Option<String>,
    api_base: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    request_timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    exec_timeout_secs: Option<u64>,
}

impl Config {
    /// Load from `path` if given, otherwise `~/.nlsh/config.toml` when it
    /// exists. `OPENAI_API_KEY` overrides any file value; a missing key
    /// is a configuration error with a corrective hint, not a panic.
    pub fn load(path: Option<&Path>) -> Result<Self, NlshError> {
        let file = match path {
            Some(p) => Self::read_file(p)?,
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::read_file(&p)?,
                _ => FileConfig::default(),
            },
        };

        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or(file.api_key)
            .ok_or_else(|| {
                NlshError::Configuration(
                    "no API key found. Set OPENAI_API_KEY (a .env file works) \
                     or add api_key to ~/.nlsh/config.toml"
                        .to_string(),
                )
            })?;

        Ok(Self {
            api_key,
            model: file.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: file.api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            temperature: file.temperature.unwrap_or(0.2),
            max_tokens: file.max_tokens.unwrap_or(500),
            request_timeout_secs: file.request_timeout_secs.unwrap_or(120),
            connect_timeout_secs: file.connect_timeout_secs.unwrap_or(10),
            exec_timeout_secs: file.exec_timeout_secs.unwrap_or(300),
        })
    }

    pub fn exec_timeout(&self) -> Duration {
        Duration::from_secs(self.exec_timeout_secs)
    }

    fn read_file(path: &Path) -> Result<FileConfig, NlshError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            NlshError::Configuration(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            NlshError::Configuration(format!(
                "failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".nlsh").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_file_values_and_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
api_key = "sk-test"
model = "gpt-4"
exec_timeout_secs = 60
"#,
        );

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.exec_timeout(), Duration::from_secs(60));
        // Untouched fields fall back to defaults.
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.max_tokens, 500);
    }

    #[test]
    fn test_missing_key_is_a_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "model = \"gpt-4\"\n");

        // Only meaningful when the environment doesn't provide a key.
        if std::env::var("OPENAI_API_KEY").is_err() {
            let err = Config::load(Some(&path)).unwrap_err();
            assert_eq!(err.exit_code(), 2);
            assert!(err.to_string().contains("OPENAI_API_KEY"));
        }
    }

    #[test]
    fn test_malformed_file_is_a_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "api_key = [not toml");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, NlshError::Configuration(_)));
    }
}
