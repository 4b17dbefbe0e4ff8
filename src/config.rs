use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::cli::args::ScanArgs;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GuardianConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AnalysisConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_fetch_user_agent")]
    pub user_agent: String,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f64 {
    0.1
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_fetch_user_agent() -> String {
    "CodeGuardianSecurityScanner/1.0".to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: None }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_fetch_user_agent(),
        }
    }
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            api: ApiConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid range in {field}: {value} (valid range: {valid_range})")]
    InvalidRange {
        field: String,
        value: String,
        valid_range: String,
    },

    #[error("Invalid value in {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GuardianConfig {
    /// Merge another config into this one (other takes precedence for set
    /// values; values still at their defaults do not override).
    pub fn merge(&mut self, other: &GuardianConfig) {
        if other.analysis.model != default_model() {
            self.analysis.model = other.analysis.model.clone();
        }
        if other.analysis.temperature != default_temperature() {
            self.analysis.temperature = other.analysis.temperature;
        }

        if other.api.base_url.is_some() {
            self.api.base_url = other.api.base_url.clone();
        }

        if other.fetch.timeout_secs != default_fetch_timeout_secs() {
            self.fetch.timeout_secs = other.fetch.timeout_secs;
        }
        if other.fetch.user_agent != default_fetch_user_agent() {
            self.fetch.user_agent = other.fetch.user_agent.clone();
        }
    }

    pub fn generate_default_config() -> String {
        let default_config = Self::default();
        toml::to_string_pretty(&default_config).unwrap_or_else(|_| {
            r#"# Code Guardian Configuration File

[analysis]
model = "gemini-2.5-flash"
temperature = 0.1

[api]
# base_url = "https://api.example.com/v1"

[fetch]
timeout_secs = 10
user_agent = "CodeGuardianSecurityScanner/1.0"
"#
            .to_string()
        })
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: GuardianConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the user config file path (~/.config/codeguardian/config.toml)
    pub fn get_user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/codeguardian/config.toml"))
    }

    /// Get the current directory config file path (./codeguardian.toml)
    pub fn get_current_config_path() -> PathBuf {
        PathBuf::from("./codeguardian.toml")
    }

    /// Ensure user config file exists, creating it if necessary
    pub fn ensure_user_config_exists() -> Result<PathBuf> {
        let user_config_path = Self::get_user_config_path()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?;

        if !user_config_path.exists() {
            if let Some(parent) = user_config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let default_config = Self::generate_default_config();
            std::fs::write(&user_config_path, default_config)?;

            tracing::info!("Created user config file at: {}", user_config_path.display());
        }

        Ok(user_config_path)
    }

    /// Load and merge configs from file sources with priority:
    /// 1. User config (~/.config/codeguardian/config.toml) - lowest (base)
    /// 2. Current directory (./codeguardian.toml) - highest file priority
    pub fn load_with_merged_configs() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_path) = Self::get_user_config_path() {
            if user_path.exists() {
                if let Ok(user_config) = Self::load_from_file(&user_path) {
                    config.merge(&user_config);
                    tracing::debug!("Loaded user config from: {}", user_path.display());
                }
            }
        }

        let current_path = Self::get_current_config_path();
        if current_path.exists() {
            if let Ok(current_config) = Self::load_from_file(&current_path) {
                config.merge(&current_config);
                tracing::debug!(
                    "Loaded current directory config from: {}",
                    current_path.display()
                );
            }
        }

        Ok(config)
    }

    pub fn apply_env_vars(&mut self, env_vars: &HashMap<String, String>) -> Result<()> {
        for (key, value) in env_vars {
            if let Some(config_key) = key.strip_prefix("CODEGUARDIAN_") {
                match config_key {
                    "ANALYSIS_MODEL" => self.analysis.model = value.clone(),
                    "ANALYSIS_TEMPERATURE" => {
                        self.analysis.temperature = value
                            .parse()
                            .map_err(|_| anyhow!("Invalid temperature value: {}", value))?;
                    }
                    "API_BASE_URL" => self.api.base_url = Some(value.clone()),
                    "FETCH_TIMEOUT_SECS" => {
                        self.fetch.timeout_secs = value
                            .parse()
                            .map_err(|_| anyhow!("Invalid timeout_secs value: {}", value))?;
                    }
                    "FETCH_USER_AGENT" => self.fetch.user_agent = value.clone(),
                    _ => {} // Ignore unknown environment variables
                }
            }
        }
        Ok(())
    }

    pub fn apply_scan_args(&mut self, args: &ScanArgs) {
        if let Some(ref model) = args.model {
            self.analysis.model = model.clone();
        }
        if let Some(ref base_url) = args.api_base_url {
            self.api.base_url = Some(base_url.clone());
        }
    }

    /// Load configuration with full precedence chain:
    /// 1. Default values (lowest)
    /// 2. User config (~/.config/codeguardian/config.toml) - auto-created on first run
    /// 3. Current directory (./codeguardian.toml)
    /// 4. Explicit --config file
    /// 5. Environment variables (CODEGUARDIAN_*)
    /// 6. CLI arguments (highest)
    pub fn load_with_precedence(
        config_path: Option<PathBuf>,
        cli_args: &ScanArgs,
        env_vars: &HashMap<String, String>,
    ) -> Result<Self> {
        if let Err(e) = Self::ensure_user_config_exists() {
            tracing::debug!("Could not create user config: {}", e);
        }

        let mut config = Self::load_with_merged_configs().unwrap_or_else(|_| Self::default());

        if let Some(path) = config_path {
            let explicit_config = Self::load_from_file(&path)
                .map_err(|e| anyhow!("Failed to load config file {}: {}", path.display(), e))?;
            config.merge(&explicit_config);
        }

        config.apply_env_vars(env_vars)?;
        config.apply_scan_args(cli_args);
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.analysis.temperature) {
            return Err(ConfigError::InvalidRange {
                field: "analysis.temperature".to_string(),
                value: self.analysis.temperature.to_string(),
                valid_range: "0.0-2.0".to_string(),
            });
        }

        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::InvalidRange {
                field: "fetch.timeout_secs".to_string(),
                value: self.fetch.timeout_secs.to_string(),
                valid_range: "1 or greater".to_string(),
            });
        }

        if self.fetch.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "fetch.user_agent".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
