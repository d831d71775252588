//! Rule-based query classification: an ordered list of (predicate, label) rules evaluated
//! first-match-wins. Classification never consults the interaction graph.

use serde::{Deserialize, Serialize};

use crate::conversation::ParsedQuestion;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    CompatibilityCheck,
    IngredientInfo,
    RoutineAdvice,
    General,
}

impl QueryType {
    pub fn label(self) -> &'static str {
        match self {
            Self::CompatibilityCheck => "compatibility_check",
            Self::IngredientInfo => "ingredient_info",
            Self::RoutineAdvice => "routine_advice",
            Self::General => "general",
        }
    }
}

const COMPARISON_CUES: &[&str] = &[
    "with", "and", "together", "mix", "mixing", "combine", "combining", "layer", "layering",
    "pair", "compatible", "alongside", "plus", "vs", "versus", "both",
];
const INFO_CUES: &[&str] = &[
    "what", "how", "why", "explain", "tell", "about", "benefit", "benefits", "describe", "does",
    "do", "is", "good",
];
const ROUTINE_CUES: &[&str] = &[
    "routine", "order", "when", "first", "before", "after", "sequence", "step", "steps", "apply",
    "morning", "night", "evening", "am", "pm",
];

/// Boolean features extracted once per question.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuerySignals {
    pub mentions: usize,
    pub comparison_cue: bool,
    pub info_cue: bool,
    pub routine_cue: bool,
}

impl QuerySignals {
    pub fn from_question(question: &ParsedQuestion) -> Self {
        Self {
            mentions: question.mentions.len(),
            comparison_cue: question.has_cue(COMPARISON_CUES)
                || question.has_phrase(&["same", "time"]),
            info_cue: question.has_cue(INFO_CUES),
            routine_cue: question.has_cue(ROUTINE_CUES),
        }
    }
}

type Rule = (fn(&QuerySignals) -> bool, QueryType);

/// Priority order matters: the first matching rule decides.
const RULES: &[Rule] = &[
    (is_explicit_comparison, QueryType::CompatibilityCheck),
    (is_single_ingredient_question, QueryType::IngredientInfo),
    (is_routine_question, QueryType::RoutineAdvice),
    (is_ingredient_list, QueryType::CompatibilityCheck),
    (is_bare_ingredient, QueryType::IngredientInfo),
];

fn is_explicit_comparison(signals: &QuerySignals) -> bool {
    signals.mentions >= 2 && signals.comparison_cue
}

fn is_single_ingredient_question(signals: &QuerySignals) -> bool {
    signals.mentions == 1 && signals.info_cue
}

fn is_routine_question(signals: &QuerySignals) -> bool {
    signals.routine_cue
}

fn is_ingredient_list(signals: &QuerySignals) -> bool {
    signals.mentions >= 2
}

fn is_bare_ingredient(signals: &QuerySignals) -> bool {
    signals.mentions == 1
}

pub fn classify(signals: &QuerySignals) -> QueryType {
    RULES
        .iter()
        .find(|(predicate, _)| predicate(signals))
        .map(|(_, query_type)| *query_type)
        .unwrap_or(QueryType::General)
}
