use std::env;
use std::fs;
use std::path::Path;

use dermis_core::config::{resolve_config_path, AppConfig, LoadOptions};
use serde::Serialize;
use toml::Value;

use super::{CommandResult, EXIT_CONFIG};

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let entries = vec![
        ConfigEntry {
            key: "knowledge_base.path",
            value: config
                .knowledge_base
                .path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<builtin>".to_string()),
            source: source("knowledge_base.path", &["DERMIS_KNOWLEDGE_BASE_PATH"]),
        },
        ConfigEntry {
            key: "advisor.max_follow_up_questions",
            value: config.advisor.max_follow_up_questions.to_string(),
            source: source("advisor.max_follow_up_questions", &["DERMIS_ADVISOR_MAX_FOLLOW_UPS"]),
        },
        ConfigEntry {
            key: "logging.level",
            value: config.logging.level.clone(),
            source: source("logging.level", &["DERMIS_LOGGING_LEVEL", "DERMIS_LOG_LEVEL"]),
        },
        ConfigEntry {
            key: "logging.format",
            value: config.logging.format.label().to_string(),
            source: source("logging.format", &["DERMIS_LOGGING_FORMAT", "DERMIS_LOG_FORMAT"]),
        },
    ];

    CommandResult::success(
        "config",
        "effective config (source precedence: env > file > default)",
        &entries,
    )
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::contains_path;

    #[test]
    fn dotted_paths_walk_nested_tables() {
        let doc = match "[logging]\nlevel = \"debug\"\n".parse::<Value>() {
            Ok(doc) => doc,
            Err(error) => panic!("toml should parse: {error}"),
        };
        assert!(contains_path(&doc, "logging.level"));
        assert!(!contains_path(&doc, "logging.format"));
        assert!(!contains_path(&doc, "advisor.max_follow_up_questions"));
    }
}
