use dermis_agent::advisor::AdvisorAgent;
use dermis_agent::classifier::QueryType;
use dermis_core::config::{AppConfig, LoadOptions};
use dermis_core::knowledge::KnowledgeBase;
use serde::Serialize;

use super::{CommandResult, EXIT_CONFIG, EXIT_KNOWLEDGE_BASE};

const SMOKE_QUESTION: &str = "Can I use retinol with vitamin C?";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run() -> CommandResult {
    let (report, exit_code) = build_report();

    if exit_code == 0 {
        return CommandResult::success("doctor", report.summary.clone(), &report);
    }
    let error_class = if exit_code == EXIT_CONFIG { "config_validation" } else { "knowledge_base" };
    let details = report
        .checks
        .iter()
        .filter(|check| check.status == CheckStatus::Fail)
        .map(|check| format!("{}: {}", check.name, check.details))
        .collect::<Vec<_>>();
    CommandResult::failure(
        "doctor",
        error_class,
        format!("{} ({})", report.summary, details.join("; ")),
        exit_code,
    )
}

fn build_report() -> (DoctorReport, u8) {
    let mut checks = Vec::new();
    let mut exit_code = 0;

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });

            match KnowledgeBase::load(config.knowledge_base.path.as_deref()) {
                Ok(knowledge_base) => {
                    checks.push(DoctorCheck {
                        name: "knowledge_base_load",
                        status: CheckStatus::Pass,
                        details: format!(
                            "{} ingredients, {} interactions from {}",
                            knowledge_base.catalog().len(),
                            knowledge_base.graph().len(),
                            config
                                .knowledge_base
                                .path
                                .as_ref()
                                .map(|path| path.display().to_string())
                                .unwrap_or_else(|| "builtin data".to_string())
                        ),
                    });
                    let advisor_check = check_advisor(&knowledge_base);
                    if advisor_check.status == CheckStatus::Fail {
                        exit_code = EXIT_KNOWLEDGE_BASE;
                    }
                    checks.push(advisor_check);
                }
                Err(error) => {
                    exit_code = EXIT_KNOWLEDGE_BASE;
                    checks.push(DoctorCheck {
                        name: "knowledge_base_load",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(skipped("advisor_smoke", "knowledge base did not load"));
                }
            }
        }
        Err(error) => {
            exit_code = EXIT_CONFIG;
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("knowledge_base_load", "configuration did not load"));
            checks.push(skipped("advisor_smoke", "configuration did not load"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    (DoctorReport { overall_status, summary, checks }, exit_code)
}

/// A grounded compatibility answer proves aliases, classification and the graph line up.
fn check_advisor(knowledge_base: &KnowledgeBase) -> DoctorCheck {
    match AdvisorAgent::new(knowledge_base).ask(SMOKE_QUESTION, None) {
        Ok(response)
            if response.query_type == QueryType::CompatibilityCheck
                && !response.sources.is_empty() =>
        {
            DoctorCheck {
                name: "advisor_smoke",
                status: CheckStatus::Pass,
                details: format!("answered from {}", response.sources.join(", ")),
            }
        }
        Ok(response) => DoctorCheck {
            name: "advisor_smoke",
            status: CheckStatus::Fail,
            details: format!(
                "expected a grounded compatibility_check, got {} with {} source(s)",
                response.query_type.label(),
                response.sources.len()
            ),
        },
        Err(error) => DoctorCheck {
            name: "advisor_smoke",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
}
