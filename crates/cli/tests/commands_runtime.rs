use std::env;
use std::io::Write;
use std::sync::{Mutex, OnceLock};

use dermis_cli::commands::routine::RoutineArgs;
use dermis_cli::commands::{
    analyze, ask, check, compare, config, doctor, ingredient, ingredients, routine, suggest,
};
use serde_json::Value;

#[test]
fn check_reports_a_caution_for_retinol_and_vitamin_c() {
    with_env(&[], || {
        let result = check::run(&["retinol".to_string(), "Vitamin C".to_string()]);
        assert_eq!(result.exit_code, 0, "expected successful check");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "check");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["error_class"], Value::Null);
        assert_eq!(payload["data"]["is_compatible"], true);
        assert_eq!(payload["data"]["cautions"][0]["ingredient_a"], "retinol");
        assert_eq!(payload["data"]["cautions"][0]["ingredient_b"], "vitamin_c");
    });
}

#[test]
fn check_reports_conflicts_as_incompatible() {
    with_env(&[], || {
        let result = check::run(&["glycolic_acid".to_string(), "retinol".to_string()]);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["is_compatible"], false);
        assert_eq!(payload["data"]["conflicts"][0]["severity"], 8);
    });
}

#[test]
fn check_returns_not_found_for_unknown_ingredient() {
    with_env(&[], || {
        let result = check::run(&["retinol".to_string(), "unobtainium".to_string()]);
        assert_eq!(result.exit_code, 5, "expected not found exit code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "not_found");
        assert!(payload["message"].as_str().unwrap_or_default().contains("unobtainium"));
    });
}

#[test]
fn check_rejects_a_single_ingredient() {
    with_env(&[], || {
        let result = check::run(&["retinol".to_string()]);
        assert_eq!(result.exit_code, 4, "expected validation exit code");
        assert_eq!(parse_payload(&result.output)["error_class"], "validation");
    });
}

#[test]
fn routine_orders_products_by_category() {
    with_env(&[], || {
        let result = routine::run(&RoutineArgs {
            time: "pm".to_string(),
            products: vec![
                "Barrier Cream=ceramides".to_string(),
                "Night Serum=retinol,hyaluronic_acid".to_string(),
                "Gentle Cleanser=micellar_water".to_string(),
            ],
            ..RoutineArgs::default()
        });
        assert_eq!(result.exit_code, 0, "expected successful routine");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "routine");
        let steps = payload["data"]["steps"].as_array().cloned().unwrap_or_default();
        let names =
            steps.iter().map(|step| step["product_name"].as_str().unwrap_or_default()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Gentle Cleanser", "Night Serum", "Barrier Cream"]);
        assert_eq!(steps[0]["order"], 1);
    });
}

#[test]
fn routine_rejects_unknown_time_and_malformed_products() {
    with_env(&[], || {
        let bad_time = routine::run(&RoutineArgs {
            time: "noon".to_string(),
            products: vec!["Serum=retinol".to_string()],
            ..RoutineArgs::default()
        });
        assert_eq!(bad_time.exit_code, 4);

        let bad_product = routine::run(&RoutineArgs {
            time: "am".to_string(),
            products: vec!["retinol".to_string()],
            ..RoutineArgs::default()
        });
        assert_eq!(bad_product.exit_code, 4);
        assert_eq!(parse_payload(&bad_product.output)["error_class"], "validation");
    });
}

#[test]
fn routine_audit_flags_misplaced_steps() {
    with_env(&[], || {
        let result = routine::run(&RoutineArgs {
            time: "pm".to_string(),
            products: vec!["Barrier Cream=ceramides".to_string(), "Night Serum=retinol".to_string()],
            audit: true,
            ..RoutineArgs::default()
        });
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "routine.audit");
        assert_eq!(payload["data"]["is_valid"], false);
        assert_eq!(payload["data"]["recommended_order"][0], "Night Serum");
    });
}

#[test]
fn routine_audit_uses_and_validates_profile_flags() {
    with_env(&[], || {
        let products =
            vec!["Barrier Cream=ceramides".to_string(), "Night Serum=retinol".to_string()];

        let result = routine::run(&RoutineArgs {
            time: "pm".to_string(),
            products: products.clone(),
            audit: true,
            skin_type: Some("sensitive".to_string()),
            ..RoutineArgs::default()
        });
        assert_eq!(result.exit_code, 0);
        let payload = parse_payload(&result.output);
        let suggestions =
            payload["data"]["routine"]["suggestions"].as_array().cloned().unwrap_or_default();
        assert!(suggestions.iter().any(|suggestion| {
            suggestion.as_str().unwrap_or_default().starts_with("Retinol can irritate sensitive skin")
        }));

        let invalid = routine::run(&RoutineArgs {
            time: "pm".to_string(),
            products: products.clone(),
            audit: true,
            skin_type: Some("scaly".to_string()),
            ..RoutineArgs::default()
        });
        assert_eq!(invalid.exit_code, 4);
        assert_eq!(parse_payload(&invalid.output)["command"], "routine.audit");

        let bad_concern = routine::run(&RoutineArgs {
            time: "pm".to_string(),
            products,
            audit: true,
            concerns: vec!["freckles".to_string()],
            ..RoutineArgs::default()
        });
        assert_eq!(bad_concern.exit_code, 4);
    });
}

#[test]
fn suggest_builds_a_profile_routine() {
    with_env(&[], || {
        let result = suggest::run("am", Some("oily"), &["acne".to_string()]);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let steps = payload["data"].as_array().cloned().unwrap_or_default();
        assert!(!steps.is_empty());
        assert!(payload["message"].as_str().unwrap_or_default().contains("oily skin"));

        let invalid = suggest::run("am", Some("scaly"), &[]);
        assert_eq!(invalid.exit_code, 4);
    });
}

#[test]
fn compare_and_analyze_use_product_inputs() {
    with_env(&[], || {
        let comparison = compare::run("Peel=glycolic_acid", "Serum=retinol");
        assert_eq!(comparison.exit_code, 0);
        assert_eq!(parse_payload(&comparison.output)["data"]["can_use_together"], false);

        let analysis = analyze::run(&["Water, Niacinamide, Zinc PCA".to_string()]);
        assert_eq!(analysis.exit_code, 0);
        let payload = parse_payload(&analysis.output);
        assert_eq!(payload["data"]["identified"][0]["id"], "niacinamide");
        assert_eq!(payload["data"]["unrecognized"].as_array().map(Vec::len), Some(2));
    });
}

#[test]
fn ingredients_can_be_filtered_and_looked_up() {
    with_env(&[], || {
        let listed = ingredients::run(Some("sunscreen"), None, None);
        assert_eq!(listed.exit_code, 0);
        let payload = parse_payload(&listed.output);
        assert_eq!(payload["data"][0]["id"], "sunscreen");

        let invalid = ingredients::run(Some("lotion"), None, None);
        assert_eq!(invalid.exit_code, 4);

        let found = ingredient::run("bha");
        assert_eq!(found.exit_code, 0);
        assert_eq!(parse_payload(&found.output)["data"]["id"], "salicylic_acid");

        let missing = ingredient::run("unobtainium");
        assert_eq!(missing.exit_code, 5);
    });
}

#[test]
fn ask_answers_with_grounded_sources() {
    with_env(&[], || {
        let result = ask::run("Can I use retinol with vitamin C?", None, &[]);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["query_type"], "compatibility_check");
        assert_eq!(payload["data"]["sources"][0], "edge:retinol+vitamin_c");
        assert!(payload["data"]["confidence"].as_f64().unwrap_or_default() >= 0.8);
    });
}

#[test]
fn ask_grounds_concern_answers_in_the_profile() {
    with_env(&[], || {
        let result = ask::run("What should I use?", Some("oily"), &["acne".to_string()]);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["query_type"], "general");
        let sources = payload["data"]["sources"].as_array().cloned().unwrap_or_default();
        assert!(sources.iter().any(|source| source == "ingredient:niacinamide"));
    });
}

#[test]
fn ask_respects_configured_follow_up_limit() {
    with_env(&[("DERMIS_ADVISOR_MAX_FOLLOW_UPS", "1")], || {
        let result = ask::run("hello", None, &[]);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["query_type"], "general");
        assert_eq!(payload["data"]["follow_up_questions"].as_array().map(Vec::len), Some(1));

        let blank = ask::run("   ", None, &[]);
        assert_eq!(blank.exit_code, 4);
    });
}

#[test]
fn invalid_config_fails_with_config_exit_code() {
    with_env(&[("DERMIS_LOG_FORMAT", "xml")], || {
        let result = check::run(&["retinol".to_string(), "niacinamide".to_string()]);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn missing_knowledge_base_file_fails_with_knowledge_base_exit_code() {
    with_env(&[("DERMIS_KNOWLEDGE_BASE_PATH", "/nonexistent/dermis/knowledge_base.toml")], || {
        let result = ingredients::run(None, None, None);
        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "knowledge_base");

        let doctor = doctor::run();
        assert_eq!(doctor.exit_code, 3);
        assert_eq!(parse_payload(&doctor.output)["status"], "error");
    });
}

#[test]
fn knowledge_base_path_replaces_builtin_data() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file should be created");
    file.write_all(
        br#"
[[ingredients]]
id = "retinol"
name = "Retinol"
category = "serum_treatment"
description = "retinoid"
time_of_day = "evening_only"
beginner_friendly = false

[[ingredients]]
id = "squalane"
name = "Squalane"
category = "facial_oil"
description = "oil"
time_of_day = "both"
beginner_friendly = true
"#,
    )
    .expect("temp file should be writable");
    let path = file.path().display().to_string();

    with_env(&[("DERMIS_KNOWLEDGE_BASE_PATH", path.as_str())], || {
        let result = ingredients::run(None, None, None);
        assert_eq!(result.exit_code, 0);
        assert_eq!(parse_payload(&result.output)["data"].as_array().map(Vec::len), Some(2));

        let unknown = check::run(&["retinol".to_string(), "squalane".to_string()]);
        let payload = parse_payload(&unknown.output);
        assert_eq!(payload["data"]["is_compatible"], true);
        assert_eq!(payload["data"]["synergies"].as_array().map(Vec::len), Some(0));
    });
}

#[test]
fn config_reports_sources() {
    with_env(&[("DERMIS_LOG_LEVEL", "debug")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let entries = payload["data"].as_array().cloned().unwrap_or_default();
        let level = entries
            .iter()
            .find(|entry| entry["key"] == "logging.level")
            .cloned()
            .unwrap_or_default();
        assert_eq!(level["value"], "debug");
        assert_eq!(level["source"], "env (DERMIS_LOG_LEVEL)");

        let path = entries
            .iter()
            .find(|entry| entry["key"] == "knowledge_base.path")
            .cloned()
            .unwrap_or_default();
        assert_eq!(path["value"], "<builtin>");
        assert_eq!(path["source"], "default");
    });
}

#[test]
fn doctor_passes_with_builtin_knowledge_base() {
    with_env(&[], || {
        let result = doctor::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["overall_status"], "pass");
        assert_eq!(payload["data"]["checks"].as_array().map(Vec::len), Some(3));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "DERMIS_KNOWLEDGE_BASE_PATH",
        "DERMIS_ADVISOR_MAX_FOLLOW_UPS",
        "DERMIS_LOGGING_LEVEL",
        "DERMIS_LOGGING_FORMAT",
        "DERMIS_LOG_LEVEL",
        "DERMIS_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
