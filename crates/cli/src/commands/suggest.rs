use dermis_core::domain::ingredient::{RoutineTime, SkinProfile};
use dermis_core::routine::RoutineBuilder;

use super::{parse_profile, CommandContext, CommandResult};

pub fn run(time: &str, skin_type: Option<&str>, concerns: &[String]) -> CommandResult {
    let context = match CommandContext::load("suggest") {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let time = match time.parse::<RoutineTime>() {
        Ok(time) => time,
        Err(error) => return CommandResult::domain_failure("suggest", error),
    };
    let profile = match parse_profile(skin_type, concerns) {
        Ok(profile) => profile.unwrap_or_default(),
        Err(error) => return CommandResult::domain_failure("suggest", error),
    };

    let steps = RoutineBuilder::new(&context.knowledge_base).suggest(&profile, time);
    CommandResult::success("suggest", describe(&profile, time, steps.len()), &steps)
}

fn describe(profile: &SkinProfile, time: RoutineTime, steps: usize) -> String {
    match profile.skin_type {
        Some(skin_type) => format!("{steps} step {} routine for {} skin", time.label(), skin_type.label()),
        None => format!("{steps} step {} routine", time.label()),
    }
}
