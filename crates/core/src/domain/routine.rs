use serde::{Deserialize, Serialize};

use crate::domain::ingredient::IngredientId;
use crate::domain::interaction::Interaction;

/// Routine input: a named product holding catalog ids or aliases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub ingredients: Vec<String>,
}

impl Product {
    pub fn new<I, S>(name: impl Into<String>, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { name: name.into(), ingredients: ingredients.into_iter().map(Into::into).collect() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineStep {
    pub order: usize,
    pub product_name: String,
    pub ingredients: Vec<IngredientId>,
    pub wait_after: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineResult {
    pub steps: Vec<RoutineStep>,
    pub is_valid: bool,
    pub conflicts: Vec<Interaction>,
    pub cautions: Vec<Interaction>,
    pub synergies: Vec<Interaction>,
    pub missing_essentials: Vec<String>,
    pub suggestions: Vec<String>,
}

/// A routine evaluated in the order the user already applies it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineAudit {
    pub is_valid: bool,
    pub ordering_issues: Vec<String>,
    pub recommended_order: Vec<String>,
    pub routine: RoutineResult,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPriority {
    Essential,
    Recommended,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedStep {
    pub step: String,
    pub why: String,
    pub ingredients: Vec<IngredientId>,
    pub priority: StepPriority,
}
