use serde::{Deserialize, Serialize};

use crate::domain::ingredient::IngredientId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Conflicts,
    Caution,
    Synergizes,
    Wait,
    Deactivates,
    Sensitizing,
}

/// Bucket an interaction lands in when a combination is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionClass {
    Conflict,
    Caution,
    Synergy,
    Wait,
}

impl InteractionType {
    pub fn class(self) -> InteractionClass {
        match self {
            Self::Conflicts | Self::Deactivates => InteractionClass::Conflict,
            Self::Caution | Self::Sensitizing => InteractionClass::Caution,
            Self::Synergizes => InteractionClass::Synergy,
            Self::Wait => InteractionClass::Wait,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Conflicts => "conflicts",
            Self::Caution => "caution",
            Self::Synergizes => "synergizes",
            Self::Wait => "wait",
            Self::Deactivates => "deactivates",
            Self::Sensitizing => "sensitizing",
        }
    }
}

/// Canonical unordered ingredient pair; `first <= second` always holds.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IngredientPair {
    first: IngredientId,
    second: IngredientId,
}

impl IngredientPair {
    pub fn new(a: IngredientId, b: IngredientId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn first(&self) -> &IngredientId {
        &self.first
    }

    pub fn second(&self) -> &IngredientId {
        &self.second
    }

    pub fn is_self_loop(&self) -> bool {
        self.first == self.second
    }

    pub fn other(&self, id: &IngredientId) -> Option<&IngredientId> {
        if &self.first == id {
            Some(&self.second)
        } else if &self.second == id {
            Some(&self.first)
        } else {
            None
        }
    }

    /// Stable identifier used as an answer source, e.g. `edge:retinol+vitamin_c`.
    pub fn source_key(&self) -> String {
        format!("edge:{}+{}", self.first, self.second)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEdge {
    pub pair: IngredientPair,
    pub interaction_type: InteractionType,
    pub severity: u8,
    pub explanation: String,
    pub recommendation: String,
    pub wait_minutes: Option<u32>,
}

impl InteractionEdge {
    pub fn to_interaction(&self) -> Interaction {
        Interaction {
            ingredient_a: self.pair.first().clone(),
            ingredient_b: self.pair.second().clone(),
            interaction_type: self.interaction_type,
            severity: self.severity,
            explanation: self.explanation.clone(),
            recommendation: self.recommendation.clone(),
        }
    }
}

/// Wire shape of a resolved interaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub ingredient_a: IngredientId,
    pub ingredient_b: IngredientId,
    pub interaction_type: InteractionType,
    pub severity: u8,
    pub explanation: String,
    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitTime {
    pub ingredient_a: IngredientId,
    pub ingredient_b: IngredientId,
    pub wait_minutes: u32,
}
