use dermis_core::api::check_compatibility;

use super::{CommandContext, CommandResult};

pub fn run(ingredients: &[String]) -> CommandResult {
    let context = match CommandContext::load("check") {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    match check_compatibility(&context.knowledge_base, ingredients) {
        Ok(report) => {
            let message = if report.is_compatible {
                format!("compatible ({} known interactions)", report.interaction_count())
            } else {
                format!("{} conflicting pair(s) found", report.conflicts.len())
            };
            CommandResult::success("check", message, &report)
        }
        Err(error) => CommandResult::domain_failure("check", error),
    }
}
