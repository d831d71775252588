use dermis_core::routine::analysis::analyze_ingredient_list;

use super::{CommandContext, CommandResult};

/// Accepts separate arguments or a single comma-separated label list.
pub fn run(ingredients: &[String]) -> CommandResult {
    let context = match CommandContext::load("analyze") {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let tokens = ingredients.iter().flat_map(|raw| raw.split(',')).collect::<Vec<_>>();
    match analyze_ingredient_list(&context.knowledge_base, &tokens) {
        Ok(analysis) => CommandResult::success("analyze", analysis.summary.clone(), &analysis),
        Err(error) => CommandResult::domain_failure("analyze", error),
    }
}
