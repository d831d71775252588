use dermis_core::routine::analysis::compare_products;

use super::{parse_product, CommandContext, CommandResult};

pub fn run(first: &str, second: &str) -> CommandResult {
    let context = match CommandContext::load("compare") {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let comparison = parse_product(first).and_then(|first| {
        let second = parse_product(second)?;
        compare_products(&context.knowledge_base, &first, &second)
    });
    match comparison {
        Ok(comparison) => {
            CommandResult::success("compare", comparison.recommendation.clone(), &comparison)
        }
        Err(error) => CommandResult::domain_failure("compare", error),
    }
}
