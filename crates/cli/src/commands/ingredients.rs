use dermis_core::api::{list_ingredients, parse_filter};

use super::{CommandContext, CommandResult};

pub fn run(category: Option<&str>, concern: Option<&str>, search: Option<&str>) -> CommandResult {
    let context = match CommandContext::load("ingredients") {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let filter = match parse_filter(category, concern, search) {
        Ok(filter) => filter,
        Err(error) => return CommandResult::domain_failure("ingredients", error),
    };
    let ingredients = list_ingredients(&context.knowledge_base, &filter);
    CommandResult::success("ingredients", format!("{} ingredient(s)", ingredients.len()), &ingredients)
}
