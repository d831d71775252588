use dermis_core::api::get_ingredient;

use super::{CommandContext, CommandResult};

pub fn run(id: &str) -> CommandResult {
    let context = match CommandContext::load("ingredient") {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    match get_ingredient(&context.knowledge_base, id) {
        Ok(ingredient) => CommandResult::success("ingredient", ingredient.name.clone(), &ingredient),
        Err(error) => CommandResult::domain_failure("ingredient", error),
    }
}
