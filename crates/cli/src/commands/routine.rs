use dermis_core::domain::ingredient::RoutineTime;
use dermis_core::domain::routine::Product;
use dermis_core::errors::DomainError;
use dermis_core::routine::RoutineBuilder;

use super::{parse_product, parse_profile, CommandContext, CommandResult};

#[derive(Debug, Clone, Default)]
pub struct RoutineArgs {
    pub time: String,
    pub products: Vec<String>,
    pub audit: bool,
    pub skin_type: Option<String>,
    pub concerns: Vec<String>,
}

pub fn run(args: &RoutineArgs) -> CommandResult {
    let command = if args.audit { "routine.audit" } else { "routine" };
    let context = match CommandContext::load(command) {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let (time, products) = match parse_inputs(args) {
        Ok(inputs) => inputs,
        Err(error) => return CommandResult::domain_failure(command, error),
    };
    let profile = match parse_profile(args.skin_type.as_deref(), &args.concerns) {
        Ok(profile) => profile,
        Err(error) => return CommandResult::domain_failure(command, error),
    };
    let builder = RoutineBuilder::new(&context.knowledge_base);

    if args.audit {
        return match builder.audit_for_profile(&products, time, profile.as_ref()) {
            Ok(audit) => {
                let message = if audit.is_valid {
                    "routine is valid as applied".to_string()
                } else {
                    format!(
                        "{} ordering issue(s), {} conflict(s)",
                        audit.ordering_issues.len(),
                        audit.routine.conflicts.len()
                    )
                };
                CommandResult::success(command, message, &audit)
            }
            Err(error) => CommandResult::domain_failure(command, error),
        };
    }

    match builder.build_for_profile(&products, time, profile.as_ref()) {
        Ok(routine) => {
            let message = format!(
                "{} {} step(s), {}",
                time.label(),
                routine.steps.len(),
                if routine.is_valid { "no conflicts" } else { "conflicts found" }
            );
            CommandResult::success(command, message, &routine)
        }
        Err(error) => CommandResult::domain_failure(command, error),
    }
}

fn parse_inputs(args: &RoutineArgs) -> Result<(RoutineTime, Vec<Product>), DomainError> {
    let time = args.time.parse::<RoutineTime>()?;
    let products = args.products.iter().map(|raw| parse_product(raw)).collect::<Result<_, _>>()?;
    Ok((time, products))
}
