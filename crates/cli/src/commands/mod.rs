pub mod analyze;
pub mod ask;
pub mod check;
pub mod compare;
pub mod config;
pub mod doctor;
pub mod ingredient;
pub mod ingredients;
pub mod routine;
pub mod suggest;

use dermis_core::config::{AppConfig, LoadOptions};
use dermis_core::domain::ingredient::{Concern, SkinProfile, SkinType};
use dermis_core::domain::routine::Product;
use dermis_core::errors::DomainError;
use dermis_core::knowledge::{KnowledgeBase, KnowledgeBaseHandle};
use serde::Serialize;
use serde_json::Value;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_KNOWLEDGE_BASE: u8 = 3;
pub const EXIT_VALIDATION: u8 = 4;
pub const EXIT_NOT_FOUND: u8 = 5;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    data: Value,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>, data: impl Serialize) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), 1);
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: Value::Null,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn domain_failure(command: &str, error: DomainError) -> Self {
        let exit_code = match error {
            DomainError::Validation(_) => EXIT_VALIDATION,
            DomainError::NotFound { .. } => EXIT_NOT_FOUND,
        };
        Self::failure(command, error.kind(), error.to_string(), exit_code)
    }
}

/// Config plus knowledge base, or the failure envelope explaining why neither is usable.
pub struct CommandContext {
    pub config: AppConfig,
    pub knowledge_base: KnowledgeBaseHandle,
}

impl CommandContext {
    pub fn load(command: &str) -> Result<Self, CommandResult> {
        let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
            CommandResult::failure(
                command,
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            )
        })?;

        let knowledge_base =
            KnowledgeBase::load(config.knowledge_base.path.as_deref()).map_err(|error| {
                CommandResult::failure(
                    command,
                    "knowledge_base",
                    format!("knowledge base failed to load: {error}"),
                    EXIT_KNOWLEDGE_BASE,
                )
            })?;

        Ok(Self { config, knowledge_base })
    }
}

/// `--skin-type` and `--concern` flags into a profile; `None` when neither was given.
pub fn parse_profile(
    skin_type: Option<&str>,
    concerns: &[String],
) -> Result<Option<SkinProfile>, DomainError> {
    if skin_type.is_none() && concerns.is_empty() {
        return Ok(None);
    }

    let mut profile = SkinProfile {
        skin_type: skin_type.map(str::parse::<SkinType>).transpose()?,
        ..SkinProfile::default()
    };
    for concern in concerns {
        profile.concerns.insert(concern.parse::<Concern>()?);
    }
    Ok(Some(profile))
}

/// `"Name=a,b,c"` into a product.
pub fn parse_product(raw: &str) -> Result<Product, DomainError> {
    let Some((name, ingredients)) = raw.split_once('=') else {
        return Err(DomainError::Validation(format!(
            "product `{raw}` must look like `Name=ingredient,ingredient`"
        )));
    };

    let ingredients = ingredients
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>();
    Ok(Product::new(name.trim(), ingredients))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\",\"data\":null}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use dermis_core::domain::ingredient::{Concern, SkinType};
    use dermis_core::errors::DomainError;
    use serde_json::Value;

    use super::{parse_product, parse_profile, CommandResult, EXIT_NOT_FOUND};

    #[test]
    fn product_flag_splits_name_and_ingredients() {
        let product = match parse_product(" Night Serum = retinol, squalane ,") {
            Ok(product) => product,
            Err(error) => panic!("product should parse: {error}"),
        };
        assert_eq!(product.name, "Night Serum");
        assert_eq!(product.ingredients, vec!["retinol".to_string(), "squalane".to_string()]);

        assert!(matches!(parse_product("retinol"), Err(DomainError::Validation(_))));
    }

    #[test]
    fn profile_flags_are_optional() {
        assert_eq!(parse_profile(None, &[]).ok(), Some(None));

        let profile = parse_profile(Some("oily"), &["acne".to_string()]);
        let profile = match profile {
            Ok(Some(profile)) => profile,
            other => panic!("profile should parse, got {other:?}"),
        };
        assert_eq!(profile.skin_type, Some(SkinType::Oily));
        assert!(profile.concerns.contains(&Concern::Acne));

        assert!(parse_profile(Some("scaly"), &[]).is_err());
    }

    #[test]
    fn domain_failures_map_to_exit_codes() {
        let result = CommandResult::domain_failure("check", DomainError::not_found("unobtainium"));
        assert_eq!(result.exit_code, EXIT_NOT_FOUND);

        let payload: Value = match serde_json::from_str(&result.output) {
            Ok(payload) => payload,
            Err(error) => panic!("output should be JSON: {error}"),
        };
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "not_found");
        assert_eq!(payload["data"], Value::Null);
    }
}
