use crate::Cli;
use crate::error::{Error, Result};
use crate::github::DEFAULT_API_URL;
use crate::provider::AUTO_PROVIDER;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MODEL: &str = "o1-mini";
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_WORKSPACE: &str = "/github/workspace";

/// Final resolved configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub generation: GenerationSettings,
    pub event_name: String,
    pub event_path: Option<PathBuf>,
    pub github_api_url: String,
    pub workspace: String,
    pub api_base_url: String,
    pub api_key: Option<String>,
    /// `None` leaves requests without a deadline.
    pub http_timeout: Option<Duration>,
    pub dry_run: bool,
}

/// User-tunable generation options.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub provider: String,
    pub model: String,
    pub custom_prompt: Option<String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            provider: AUTO_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            custom_prompt: None,
        }
    }
}

impl Config {
    /// Build the final config from CLI flags, environment, TOML file, and defaults.
    ///
    /// Precedence:
    ///   1. CLI flags or their environment variables (`INPUT_*`, `GITHUB_*`)
    ///   2. TOML `~/.config/auto-pr-description.toml`
    ///   3. Hardcoded defaults
    pub fn from_sources(cli: &Cli) -> Result<Self> {
        Self::resolve(cli, load_file_config().unwrap_or_default())
    }

    fn resolve(cli: &Cli, file_cfg: FileConfig) -> Result<Self> {
        let github_token = non_blank(&cli.github_token).ok_or(Error::MissingToken)?;

        let temperature = match non_blank(&cli.temperature) {
            Some(raw) => parse_temperature(&raw)?,
            None => match file_cfg.temperature {
                Some(t) => check_temperature(t, &t.to_string())?,
                None => DEFAULT_TEMPERATURE,
            },
        };

        let http_timeout = match non_blank(&cli.http_timeout) {
            Some(raw) => parse_timeout(&raw)?,
            None => file_cfg
                .http_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        };

        let generation = GenerationSettings {
            temperature,
            provider: non_blank(&cli.provider)
                .or(file_cfg.provider)
                .unwrap_or_else(|| AUTO_PROVIDER.to_string()),
            model: non_blank(&cli.model)
                .or(file_cfg.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            custom_prompt: non_blank(&cli.prompt).or(file_cfg.prompt),
        };

        Ok(Config {
            github_token,
            generation,
            event_name: non_blank(&cli.event_name).unwrap_or_default(),
            event_path: cli.event_path.clone(),
            github_api_url: non_blank(&cli.github_api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            workspace: non_blank(&cli.workspace).unwrap_or_else(|| DEFAULT_WORKSPACE.to_string()),
            api_base_url: non_blank(&cli.api_base_url)
                .or(file_cfg.api_base_url)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            api_key: non_blank(&cli.api_key),
            http_timeout,
            dry_run: cli.dry_run,
        })
    }
}

/// GitHub passes unset action inputs as empty strings.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_temperature(raw: &str) -> Result<f32> {
    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidTemperature(raw.to_string()))?;
    check_temperature(value, raw)
}

fn check_temperature(value: f32, raw: &str) -> Result<f32> {
    if (0.0..=2.0).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidTemperature(raw.to_string()))
    }
}

fn parse_timeout(raw: &str) -> Result<Option<Duration>> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidTimeout(raw.to_string()))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    temperature: Option<f32>,
    provider: Option<String>,
    model: Option<String>,
    prompt: Option<String>,
    api_base_url: Option<String>,
    http_timeout_secs: Option<u64>,
}

/// Return `~/.config/auto-pr-description.toml`
fn config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("auto-pr-description.toml"))
}

fn load_file_config() -> Option<FileConfig> {
    let path = config_path()?;
    if !path.exists() {
        return None;
    }

    let data = fs::read_to_string(&path).ok()?;
    match toml::from_str::<FileConfig>(&data) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            log::warn!("Ignoring unreadable config {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_token() -> Cli {
        Cli {
            github_token: Some("ghp_token".into()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = Config::resolve(&cli_with_token(), FileConfig::default()).unwrap();
        assert_eq!(cfg.generation, GenerationSettings::default());
        assert_eq!(cfg.generation.model, "o1-mini");
        assert_eq!(cfg.generation.provider, "auto");
        assert_eq!(cfg.github_api_url, "https://api.github.com");
        assert_eq!(cfg.workspace, "/github/workspace");
        assert_eq!(cfg.http_timeout, None);
    }

    #[test]
    fn missing_or_blank_token_is_fatal() {
        let err = Config::resolve(&Cli::default(), FileConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MissingToken));

        let blank = Cli {
            github_token: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(
            Config::resolve(&blank, FileConfig::default()),
            Err(Error::MissingToken)
        ));
    }

    #[test]
    fn blank_inputs_count_as_unset() {
        let cli = Cli {
            temperature: Some("".into()),
            provider: Some("".into()),
            prompt: Some(" ".into()),
            ..cli_with_token()
        };
        let cfg = Config::resolve(&cli, FileConfig::default()).unwrap();
        assert_eq!(cfg.generation.temperature, 0.7);
        assert_eq!(cfg.generation.provider, "auto");
        assert_eq!(cfg.generation.custom_prompt, None);
    }

    #[test]
    fn cli_beats_file_beats_default() {
        let cli = Cli {
            model: Some("gpt-4o".into()),
            ..cli_with_token()
        };
        let file = FileConfig {
            model: Some("llama3".into()),
            provider: Some("Ollama".into()),
            temperature: Some(0.2),
            ..Default::default()
        };
        let cfg = Config::resolve(&cli, file).unwrap();
        assert_eq!(cfg.generation.model, "gpt-4o");
        assert_eq!(cfg.generation.provider, "Ollama");
        assert_eq!(cfg.generation.temperature, 0.2);
    }

    #[test]
    fn temperature_is_validated() {
        for bad in ["hot", "2.5", "-0.1"] {
            let cli = Cli {
                temperature: Some(bad.into()),
                ..cli_with_token()
            };
            assert!(matches!(
                Config::resolve(&cli, FileConfig::default()),
                Err(Error::InvalidTemperature(_))
            ));
        }

        let cli = Cli {
            temperature: Some("1.5".into()),
            ..cli_with_token()
        };
        let cfg = Config::resolve(&cli, FileConfig::default()).unwrap();
        assert_eq!(cfg.generation.temperature, 1.5);
    }

    #[test]
    fn http_timeout_is_opt_in() {
        let cli = Cli {
            http_timeout: Some("45".into()),
            ..cli_with_token()
        };
        let cfg = Config::resolve(&cli, FileConfig::default()).unwrap();
        assert_eq!(cfg.http_timeout, Some(Duration::from_secs(45)));

        let zero = Cli {
            http_timeout: Some("0".into()),
            ..cli_with_token()
        };
        let file = FileConfig {
            http_timeout_secs: Some(10),
            ..Default::default()
        };
        assert_eq!(Config::resolve(&zero, file).unwrap().http_timeout, None);

        let file = FileConfig {
            http_timeout_secs: Some(10),
            ..Default::default()
        };
        let cfg = Config::resolve(&cli_with_token(), file).unwrap();
        assert_eq!(cfg.http_timeout, Some(Duration::from_secs(10)));

        let bad = Cli {
            http_timeout: Some("soon".into()),
            ..cli_with_token()
        };
        assert!(matches!(
            Config::resolve(&bad, FileConfig::default()),
            Err(Error::InvalidTimeout(_))
        ));
    }

    #[test]
    fn file_config_parses_from_toml() {
        let cfg: FileConfig = toml::from_str("model = \"llama3\"\ntemperature = 0.3\n").unwrap();
        assert_eq!(cfg.model.as_deref(), Some("llama3"));
        assert_eq!(cfg.temperature, Some(0.3));
    }
}
