use serde::{Deserialize, Serialize};
use tracing::debug;

use dermis_core::compatibility::{CompatibilityChecker, CompatibilityReport};
use dermis_core::domain::ingredient::{Category, Concern, Ingredient, IngredientId, SkinProfile};
use dermis_core::domain::interaction::InteractionClass;
use dermis_core::errors::DomainError;
use dermis_core::knowledge::{IngredientFilter, KnowledgeBase};

use crate::classifier::{classify, QuerySignals, QueryType};
use crate::conversation::ParsedQuestion;

pub const CONFIDENCE_EDGE_FOUND: f64 = 0.9;
pub const CONFIDENCE_NO_KNOWN_EDGE: f64 = 0.5;
pub const CONFIDENCE_INGREDIENT_INFO: f64 = 0.85;
pub const CONFIDENCE_ROUTINE_ADVICE: f64 = 0.6;
pub const CONFIDENCE_CONCERN_ADVICE: f64 = 0.6;
pub const CONFIDENCE_GENERAL: f64 = 0.3;

const MAX_CONCERN_PICKS: usize = 4;

const EXAMPLE_QUESTIONS: &[&str] = &[
    "Can I use retinol with vitamin C?",
    "What does niacinamide do?",
    "What order should I apply my skincare products in?",
    "Is salicylic acid good for oily skin?",
    "How long should I wait between vitamin C and niacinamide?",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvisorResponse {
    pub answer: String,
    pub confidence: f64,
    pub query_type: QueryType,
    pub sources: Vec<String>,
    pub follow_up_questions: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvisorSettings {
    pub max_follow_up_questions: usize,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self { max_follow_up_questions: 3 }
    }
}

/// Rule-based advisor. Deterministic: identical input yields identical output.
#[derive(Clone, Copy, Debug)]
pub struct AdvisorAgent<'a> {
    knowledge_base: &'a KnowledgeBase,
    settings: AdvisorSettings,
}

impl<'a> AdvisorAgent<'a> {
    pub fn new(knowledge_base: &'a KnowledgeBase) -> Self {
        Self { knowledge_base, settings: AdvisorSettings::default() }
    }

    pub fn with_settings(mut self, settings: AdvisorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn ask(
        &self,
        question: &str,
        profile: Option<&SkinProfile>,
    ) -> Result<AdvisorResponse, DomainError> {
        if question.trim().is_empty() {
            return Err(DomainError::Validation("question must not be empty".to_string()));
        }

        let parsed = ParsedQuestion::parse(self.knowledge_base.catalog(), question);
        let signals = QuerySignals::from_question(&parsed);
        let query_type = classify(&signals);
        debug!(
            event_name = "advisor.classified",
            query_type = query_type.label(),
            mentions = signals.mentions,
            comparison_cue = signals.comparison_cue,
            info_cue = signals.info_cue,
            routine_cue = signals.routine_cue,
            "advisor question classified"
        );

        let mut response = match query_type {
            QueryType::CompatibilityCheck => self.answer_compatibility(&parsed.mentions),
            QueryType::IngredientInfo => self.answer_ingredient_info(&parsed.mentions, profile),
            QueryType::RoutineAdvice => self.answer_routine_advice(&parsed, profile),
            QueryType::General => self.answer_general(&parsed, profile),
        };
        response.follow_up_questions.truncate(self.settings.max_follow_up_questions);
        Ok(response)
    }

    fn name(&self, id: &IngredientId) -> String {
        self.knowledge_base.catalog().display_name(id).to_string()
    }

    fn ingredients(&self, ids: &[IngredientId]) -> Vec<&'a Ingredient> {
        ids.iter().filter_map(|id| self.knowledge_base.catalog().get(id.as_str()).ok()).collect()
    }

    fn answer_compatibility(&self, mentions: &[IngredientId]) -> AdvisorResponse {
        let mut ids = mentions.to_vec();
        ids.sort();
        let report = CompatibilityChecker::new(self.knowledge_base).check_ids(&ids);
        let sources = edge_sources(&report);

        let names = mentions.iter().map(|id| self.name(id)).collect::<Vec<_>>();
        let (answer, confidence) = if sources.is_empty() {
            (
                format!(
                    "There is no known interaction between {} in the knowledge base. That is not a guarantee they are safe together, so patch test when combining actives.",
                    join_names(&names)
                ),
                CONFIDENCE_NO_KNOWN_EDGE,
            )
        } else {
            (self.compatibility_prose(&report), CONFIDENCE_EDGE_FOUND)
        };

        let first = names.first().cloned().unwrap_or_default();
        let second = names.get(1).cloned().unwrap_or_default();
        AdvisorResponse {
            answer,
            confidence,
            query_type: QueryType::CompatibilityCheck,
            sources,
            follow_up_questions: vec![
                format!("In what order should I apply {first} and {second}?"),
                format!("What does {first} do?"),
                format!("What does {second} do?"),
            ],
        }
    }

    fn compatibility_prose(&self, report: &CompatibilityReport) -> String {
        let mut paragraphs = Vec::new();
        paragraphs.push(if report.is_compatible {
            "Yes, these can be used together.".to_string()
        } else {
            "These should not be layered in the same routine.".to_string()
        });

        for conflict in &report.conflicts {
            paragraphs.push(format!(
                "{} + {} ({}, severity {}/10): {} {}",
                self.name(&conflict.ingredient_a),
                self.name(&conflict.ingredient_b),
                conflict.interaction_type.label(),
                conflict.severity,
                conflict.explanation,
                conflict.recommendation
            ));
        }
        for caution in &report.cautions {
            paragraphs.push(format!(
                "Use caution with {} + {}: {} {}",
                self.name(&caution.ingredient_a),
                self.name(&caution.ingredient_b),
                caution.explanation,
                caution.recommendation
            ));
        }
        for synergy in &report.synergies {
            paragraphs.push(format!(
                "{} + {} work well together: {} {}",
                self.name(&synergy.ingredient_a),
                self.name(&synergy.ingredient_b),
                synergy.explanation,
                synergy.recommendation
            ));
        }
        for wait in &report.wait_times {
            let graph = self.knowledge_base.graph();
            let detail = graph
                .edge(&wait.ingredient_a, &wait.ingredient_b)
                .map(|edge| format!(" {} {}", edge.explanation, edge.recommendation))
                .unwrap_or_default();
            paragraphs.push(format!(
                "Wait {} minutes between {} and {}.{detail}",
                wait.wait_minutes,
                self.name(&wait.ingredient_a),
                self.name(&wait.ingredient_b)
            ));
        }

        paragraphs.join("\n\n")
    }

    fn answer_ingredient_info(
        &self,
        mentions: &[IngredientId],
        profile: Option<&SkinProfile>,
    ) -> AdvisorResponse {
        let Some(ingredient) = self.ingredients(mentions).into_iter().next() else {
            return self.static_fallback();
        };

        let mut paragraphs = vec![format!(
            "{} ({}): {}",
            ingredient.name,
            ingredient.category.display_name().to_lowercase(),
            ingredient.description
        )];
        if let Some(how_it_works) = &ingredient.how_it_works {
            paragraphs.push(format!("How it works: {how_it_works}"));
        }

        let concerns =
            ingredient.addresses_concerns.iter().map(|concern| concern.label()).collect::<Vec<_>>();
        if !concerns.is_empty() {
            paragraphs.push(format!("Good for: {}.", concerns.join(", ")));
        }
        paragraphs.push(format!("Best used {}.", ingredient.time_of_day.describe()));
        if !ingredient.usage_tips.is_empty() {
            paragraphs.push(format!("Tips: {}.", ingredient.usage_tips.join("; ")));
        }
        if let Some(max_concentration) = &ingredient.max_concentration {
            paragraphs.push(format!("Typical maximum concentration: {max_concentration}."));
        }
        if !ingredient.beginner_friendly {
            paragraphs.push("This is a potent active; start slowly if you are new to it.".to_string());
        }

        let avoid = self
            .knowledge_base
            .graph()
            .neighbors(&ingredient.id)
            .into_iter()
            .filter(|(_, edge)| edge.interaction_type.class() == InteractionClass::Conflict)
            .map(|(other, _)| self.name(other))
            .collect::<Vec<_>>();
        if !avoid.is_empty() {
            paragraphs.push(format!("Avoid layering with: {}.", avoid.join(", ")));
        }

        if let Some(skin_type) = profile.and_then(|profile| profile.skin_type) {
            if ingredient.caution_skin_types.contains(&skin_type) {
                paragraphs.push(format!(
                    "Because you have {} skin, patch test {} first and introduce it gradually.",
                    skin_type.label(),
                    ingredient.name
                ));
            }
        }

        AdvisorResponse {
            answer: paragraphs.join("\n\n"),
            confidence: CONFIDENCE_INGREDIENT_INFO,
            query_type: QueryType::IngredientInfo,
            sources: vec![format!("ingredient:{}", ingredient.id)],
            follow_up_questions: vec![
                format!("What can I combine with {}?", ingredient.name),
                format!("When should I apply {} in my routine?", ingredient.name),
                "What order should I apply my skincare products in?".to_string(),
            ],
        }
    }

    fn answer_routine_advice(
        &self,
        parsed: &ParsedQuestion,
        profile: Option<&SkinProfile>,
    ) -> AdvisorResponse {
        let order = Category::SEQUENCE
            .iter()
            .map(|category| category.display_name().to_lowercase())
            .collect::<Vec<_>>();
        let mut paragraphs = vec![format!(
            "Apply products from thinnest to thickest texture, in this order: {}. Sunscreen is always the last morning step.",
            order.join(", ")
        )];

        let mut mentioned = self.ingredients(&parsed.mentions);
        mentioned.sort_by_key(|ingredient| ingredient.category.rank());
        if mentioned.len() >= 2 {
            let sequence = mentioned
                .iter()
                .map(|ingredient| {
                    format!(
                        "{} ({})",
                        ingredient.name,
                        ingredient.category.display_name().to_lowercase()
                    )
                })
                .collect::<Vec<_>>();
            paragraphs.push(format!("For what you mentioned: {}.", sequence.join(", then ")));
        }
        for ingredient in &mentioned {
            paragraphs.push(format!(
                "Use {} {}.",
                ingredient.name,
                ingredient.time_of_day.describe()
            ));
        }

        let mut sources = vec!["category_order".to_string()];
        sources.extend(mentioned.iter().map(|ingredient| format!("ingredient:{}", ingredient.id)));
        if let Some(advice) = self.concern_advice(&requested_concerns(parsed, profile), profile) {
            paragraphs.extend(advice.paragraphs);
            for source in advice.sources {
                if !sources.contains(&source) {
                    sources.push(source);
                }
            }
        }

        AdvisorResponse {
            answer: paragraphs.join("\n\n"),
            confidence: CONFIDENCE_ROUTINE_ADVICE,
            query_type: QueryType::RoutineAdvice,
            sources,
            follow_up_questions: vec![
                "What should a basic morning routine include?".to_string(),
                "How long should I wait between vitamin C and niacinamide?".to_string(),
                "Can I use retinol with vitamin C?".to_string(),
            ],
        }
    }

    /// Concern-grounded answer when the question or profile names a concern, otherwise the
    /// static fallback.
    fn answer_general(&self, parsed: &ParsedQuestion, profile: Option<&SkinProfile>) -> AdvisorResponse {
        let Some(advice) = self.concern_advice(&requested_concerns(parsed, profile), profile) else {
            return self.static_fallback();
        };

        let mut follow_up_questions = advice
            .picks
            .iter()
            .take(2)
            .map(|name| format!("What does {name} do?"))
            .collect::<Vec<_>>();
        follow_up_questions.push("What order should I apply my skincare products in?".to_string());

        AdvisorResponse {
            answer: advice.paragraphs.join("\n\n"),
            confidence: CONFIDENCE_CONCERN_ADVICE,
            query_type: QueryType::General,
            sources: advice.sources,
            follow_up_questions,
        }
    }

    fn static_fallback(&self) -> AdvisorResponse {
        AdvisorResponse {
            answer: "I can answer questions about whether ingredients can be combined, what a specific ingredient does, and what order to apply products in. Try one of the questions below.".to_string(),
            confidence: CONFIDENCE_GENERAL,
            query_type: QueryType::General,
            sources: Vec::new(),
            follow_up_questions: EXAMPLE_QUESTIONS.iter().map(|question| question.to_string()).collect(),
        }
    }

    /// Catalog ingredients addressing each concern, beginner-friendly first. Ingredients
    /// cautioned for the profile's skin type are moved to a patch-test paragraph.
    fn concern_advice(
        &self,
        concerns: &[Concern],
        profile: Option<&SkinProfile>,
    ) -> Option<ConcernAdvice> {
        let catalog = self.knowledge_base.catalog();
        let skin_type = profile.and_then(|profile| profile.skin_type);
        let mut advice = ConcernAdvice::default();

        for concern in concerns {
            let mut candidates = catalog
                .list(&IngredientFilter { concern: Some(*concern), ..IngredientFilter::default() });
            if candidates.is_empty() {
                continue;
            }
            candidates.sort_by_key(|ingredient| !ingredient.beginner_friendly);

            let (cautioned, suitable): (Vec<&Ingredient>, Vec<&Ingredient>) =
                candidates.into_iter().partition(|ingredient| {
                    skin_type.is_some_and(|skin_type| ingredient.caution_skin_types.contains(&skin_type))
                });
            let picks = suitable.into_iter().take(MAX_CONCERN_PICKS).collect::<Vec<_>>();

            if !picks.is_empty() {
                let names = picks.iter().map(|ingredient| ingredient.name.clone()).collect::<Vec<_>>();
                advice.paragraphs.push(format!("For {}, look for: {}.", concern.label(), join_names(&names)));
            }
            if let Some(skin_type) = skin_type.filter(|_| !cautioned.is_empty()) {
                let names = cautioned.iter().map(|ingredient| ingredient.name.clone()).collect::<Vec<_>>();
                advice.paragraphs.push(format!(
                    "Because you have {} skin, patch test {} first and introduce them slowly.",
                    skin_type.label(),
                    join_names(&names)
                ));
            }

            for ingredient in picks.iter().chain(&cautioned) {
                let source = format!("ingredient:{}", ingredient.id);
                if !advice.sources.contains(&source) {
                    advice.sources.push(source);
                }
            }
            for ingredient in picks {
                if !advice.picks.contains(&ingredient.name) {
                    advice.picks.push(ingredient.name.clone());
                }
            }
        }

        (!advice.paragraphs.is_empty()).then_some(advice)
    }
}

#[derive(Debug, Default)]
struct ConcernAdvice {
    paragraphs: Vec<String>,
    sources: Vec<String>,
    picks: Vec<String>,
}

/// Concerns named in the question win over the profile's.
fn requested_concerns(parsed: &ParsedQuestion, profile: Option<&SkinProfile>) -> Vec<Concern> {
    if !parsed.concerns.is_empty() {
        return parsed.concerns.clone();
    }
    profile.map(|profile| profile.concerns.iter().copied().collect()).unwrap_or_default()
}

fn edge_sources(report: &CompatibilityReport) -> Vec<String> {
    report
        .conflicts
        .iter()
        .chain(&report.cautions)
        .chain(&report.synergies)
        .map(|interaction| format!("edge:{}+{}", interaction.ingredient_a, interaction.ingredient_b))
        .chain(
            report
                .wait_times
                .iter()
                .map(|wait| format!("edge:{}+{}", wait.ingredient_a, wait.ingredient_b)),
        )
        .collect()
}

fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use dermis_core::domain::ingredient::{Concern, SkinProfile, SkinType};
    use dermis_core::errors::DomainError;
    use dermis_core::knowledge::KnowledgeBase;

    use super::{
        AdvisorAgent, AdvisorSettings, CONFIDENCE_CONCERN_ADVICE, CONFIDENCE_EDGE_FOUND,
        CONFIDENCE_GENERAL, CONFIDENCE_NO_KNOWN_EDGE,
    };
    use crate::classifier::QueryType;

    fn advisor() -> AdvisorAgent<'static> {
        match KnowledgeBase::shared() {
            Ok(knowledge_base) => AdvisorAgent::new(knowledge_base),
            Err(error) => panic!("builtin knowledge base should load: {error}"),
        }
    }

    #[test]
    fn retinol_with_vitamin_c_is_grounded_in_an_edge() {
        let response = match advisor().ask("Can I use retinol with vitamin C?", None) {
            Ok(response) => response,
            Err(error) => panic!("ask should succeed: {error}"),
        };

        assert_eq!(response.query_type, QueryType::CompatibilityCheck);
        assert!(response.confidence >= 0.8);
        assert_eq!(response.sources, vec!["edge:retinol+vitamin_c".to_string()]);
        assert!(response.answer.starts_with("Yes, these can be used together."));
    }

    #[test]
    fn unknown_pair_is_reported_with_lower_confidence() {
        let grounded = advisor().ask("Can I use retinol with squalane?", None);
        let ungrounded = advisor().ask("Can I use green tea with squalane?", None);
        let (grounded, ungrounded) = match (grounded, ungrounded) {
            (Ok(grounded), Ok(ungrounded)) => (grounded, ungrounded),
            _ => panic!("both questions should be answered"),
        };

        assert_eq!(grounded.confidence, CONFIDENCE_EDGE_FOUND);
        assert_eq!(ungrounded.confidence, CONFIDENCE_NO_KNOWN_EDGE);
        assert!(grounded.confidence > ungrounded.confidence);
        assert!(ungrounded.sources.is_empty());
        assert!(ungrounded.answer.contains("no known interaction"));
    }

    #[test]
    fn conflicting_pair_says_no() {
        let response = match advisor().ask("can i layer retin-a and aha together", None) {
            Ok(response) => response,
            Err(error) => panic!("ask should succeed: {error}"),
        };

        assert!(response.answer.starts_with("These should not be layered"));
        assert!(response.answer.contains("severity 9/10"));
    }

    #[test]
    fn ingredient_info_uses_the_frame() {
        let response = match advisor().ask("What does niacinamide do?", None) {
            Ok(response) => response,
            Err(error) => panic!("ask should succeed: {error}"),
        };

        assert_eq!(response.query_type, QueryType::IngredientInfo);
        assert_eq!(response.sources, vec!["ingredient:niacinamide".to_string()]);
        assert!(response.answer.starts_with("Niacinamide (serum / treatment):"));
        assert!(!response.answer.contains("patch test Niacinamide"));
    }

    #[test]
    fn profile_adds_patch_test_warning() {
        let profile = SkinProfile::new(SkinType::Sensitive);
        let response = match advisor().ask("Tell me about retinol", Some(&profile)) {
            Ok(response) => response,
            Err(error) => panic!("ask should succeed: {error}"),
        };

        assert!(response.answer.contains("Because you have sensitive skin, patch test Retinol first"));
        assert!(response.answer.contains("Avoid layering with:"));
    }

    #[test]
    fn routine_advice_follows_category_order() {
        let response = match advisor().ask("What order do I apply ceramides, vitamin c in?", None) {
            Ok(response) => response,
            Err(error) => panic!("ask should succeed: {error}"),
        };

        assert_eq!(response.query_type, QueryType::RoutineAdvice);
        assert!(response.answer.contains("Vitamin C (serum / treatment), then Ceramides (moisturizer)"));
        assert_eq!(response.sources[0], "category_order");
    }

    #[test]
    fn general_questions_fall_back_with_follow_ups() {
        let response = match advisor().ask("hello?", None) {
            Ok(response) => response,
            Err(error) => panic!("ask should succeed: {error}"),
        };

        assert_eq!(response.query_type, QueryType::General);
        assert_eq!(response.confidence, 0.3);
        assert_eq!(response.follow_up_questions.len(), 3);
    }

    #[test]
    fn follow_up_count_respects_settings() {
        let response = advisor()
            .with_settings(AdvisorSettings { max_follow_up_questions: 1 })
            .ask("hello?", None);
        let response = match response {
            Ok(response) => response,
            Err(error) => panic!("ask should succeed: {error}"),
        };

        assert_eq!(response.follow_up_questions, vec!["Can I use retinol with vitamin C?".to_string()]);
    }

    #[test]
    fn identical_questions_get_identical_answers() {
        let first = advisor().ask("Is BHA ok with niacinamide?", None);
        let second = advisor().ask("Is BHA ok with niacinamide?", None);
        assert!(first.is_ok());
        assert_eq!(first, second);
    }

    #[test]
    fn blank_question_is_rejected() {
        assert!(matches!(advisor().ask("   ", None), Err(DomainError::Validation(_))));
    }

    #[test]
    fn profile_concerns_ground_an_open_question() {
        let profile = SkinProfile::new(SkinType::Oily).with_concern(Concern::Acne);
        let (generic, tailored) = match (
            advisor().ask("What should I use?", None),
            advisor().ask("What should I use?", Some(&profile)),
        ) {
            (Ok(generic), Ok(tailored)) => (generic, tailored),
            _ => panic!("both questions should be answered"),
        };

        assert_eq!(generic.confidence, CONFIDENCE_GENERAL);
        assert!(generic.sources.is_empty());

        assert_eq!(tailored.query_type, QueryType::General);
        assert_eq!(tailored.confidence, CONFIDENCE_CONCERN_ADVICE);
        assert_ne!(tailored.answer, generic.answer);
        assert!(tailored.answer.starts_with("For acne, look for: Azelaic Acid"));
        assert!(tailored.answer.contains("Niacinamide"));
        assert!(tailored.sources.contains(&"ingredient:niacinamide".to_string()));
        assert!(tailored.sources.iter().all(|source| source.starts_with("ingredient:")));
    }

    #[test]
    fn concern_named_in_the_question_is_answered_without_a_profile() {
        let response = match advisor().ask("What should I use for acne?", None) {
            Ok(response) => response,
            Err(error) => panic!("ask should succeed: {error}"),
        };

        assert_eq!(response.query_type, QueryType::General);
        assert!(response.answer.contains("For acne, look for:"));
        assert!(response.sources.contains(&"ingredient:azelaic_acid".to_string()));
        assert_eq!(response.follow_up_questions[0], "What does Azelaic Acid do?");
    }

    #[test]
    fn concern_picks_move_cautioned_ingredients_to_a_patch_test_note() {
        let profile = SkinProfile::new(SkinType::Sensitive).with_concern(Concern::Acne);
        let response = match advisor().ask("What should I use?", Some(&profile)) {
            Ok(response) => response,
            Err(error) => panic!("ask should succeed: {error}"),
        };

        assert!(response.answer.contains("For acne, look for: Azelaic Acid and Niacinamide."));
        assert!(response.answer.contains("Because you have sensitive skin, patch test"));
        assert!(response.answer.contains("Retinol"));
        assert!(response.sources.contains(&"ingredient:retinol".to_string()));
    }

    #[test]
    fn routine_advice_appends_profile_concerns() {
        let profile = SkinProfile::default().with_concern(Concern::Acne);
        let response = match advisor().ask("What order should my routine be in?", Some(&profile)) {
            Ok(response) => response,
            Err(error) => panic!("ask should succeed: {error}"),
        };

        assert_eq!(response.query_type, QueryType::RoutineAdvice);
        assert_eq!(response.sources[0], "category_order");
        assert!(response.answer.contains("For acne, look for:"));
        assert!(response.sources.contains(&"ingredient:niacinamide".to_string()));
    }
}
