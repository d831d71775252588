use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "dermis.toml";
pub const DEFAULT_MAX_FOLLOW_UPS: u32 = 3;
pub const MAX_FOLLOW_UPS_LIMIT: u32 = 5;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub knowledge_base: KnowledgeBaseConfig,
    pub advisor: AdvisorConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Default)]
pub struct KnowledgeBaseConfig {
    /// Alternative knowledge base file; the built-in base is used when unset.
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct AdvisorConfig {
    pub max_follow_up_questions: u32,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn label(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub knowledge_base_path: Option<PathBuf>,
    pub max_follow_up_questions: Option<u32>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            knowledge_base: KnowledgeBaseConfig::default(),
            advisor: AdvisorConfig { max_follow_up_questions: DEFAULT_MAX_FOLLOW_UPS },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(knowledge_base) = patch.knowledge_base {
            if let Some(path) = knowledge_base.path {
                self.knowledge_base.path = Some(path);
            }
        }

        if let Some(advisor) = patch.advisor {
            if let Some(max_follow_up_questions) = advisor.max_follow_up_questions {
                self.advisor.max_follow_up_questions = max_follow_up_questions;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("DERMIS_KNOWLEDGE_BASE_PATH") {
            self.knowledge_base.path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("DERMIS_ADVISOR_MAX_FOLLOW_UPS") {
            self.advisor.max_follow_up_questions =
                parse_u32("DERMIS_ADVISOR_MAX_FOLLOW_UPS", &value)?;
        }

        let log_level = read_env("DERMIS_LOGGING_LEVEL").or_else(|| read_env("DERMIS_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("DERMIS_LOGGING_FORMAT").or_else(|| read_env("DERMIS_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.knowledge_base_path {
            self.knowledge_base.path = Some(path);
        }
        if let Some(max_follow_up_questions) = overrides.max_follow_up_questions {
            self.advisor.max_follow_up_questions = max_follow_up_questions;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_knowledge_base(&self.knowledge_base)?;
        validate_advisor(&self.advisor)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// The config file that `load` would read, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_knowledge_base(knowledge_base: &KnowledgeBaseConfig) -> Result<(), ConfigError> {
    if let Some(path) = &knowledge_base.path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "knowledge_base.path must not be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_advisor(advisor: &AdvisorConfig) -> Result<(), ConfigError> {
    if advisor.max_follow_up_questions == 0 || advisor.max_follow_up_questions > MAX_FOLLOW_UPS_LIMIT
    {
        return Err(ConfigError::Validation(format!(
            "advisor.max_follow_up_questions must be in range 1..={MAX_FOLLOW_UPS_LIMIT}"
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    knowledge_base: Option<KnowledgeBasePatch>,
    advisor: Option<AdvisorPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct KnowledgeBasePatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct AdvisorPatch {
    max_follow_up_questions: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
