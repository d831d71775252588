use dermis_agent::advisor::{AdvisorAgent, AdvisorSettings};

use super::{parse_profile, CommandContext, CommandResult};

pub fn run(question: &str, skin_type: Option<&str>, concerns: &[String]) -> CommandResult {
    let context = match CommandContext::load("ask") {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let profile = match parse_profile(skin_type, concerns) {
        Ok(profile) => profile,
        Err(error) => return CommandResult::domain_failure("ask", error),
    };
    let settings = AdvisorSettings {
        max_follow_up_questions: context.config.advisor.max_follow_up_questions as usize,
    };
    let advisor = AdvisorAgent::new(&context.knowledge_base).with_settings(settings);

    match advisor.ask(question, profile.as_ref()) {
        Ok(response) => CommandResult::success("ask", response.answer.clone(), &response),
        Err(error) => CommandResult::domain_failure("ask", error),
    }
}
