use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IngredientId(pub String);

impl IngredientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for IngredientId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product category. Declaration order is the application order used for sequencing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cleanser,
    Toner,
    Exfoliant,
    Essence,
    SerumTreatment,
    SpotTreatment,
    FacialOil,
    Moisturizer,
    Mask,
    Sunscreen,
}

impl Category {
    pub const SEQUENCE: [Category; 10] = [
        Category::Cleanser,
        Category::Toner,
        Category::Exfoliant,
        Category::Essence,
        Category::SerumTreatment,
        Category::SpotTreatment,
        Category::FacialOil,
        Category::Moisturizer,
        Category::Mask,
        Category::Sunscreen,
    ];

    /// Zero-based position in the application order.
    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Cleanser => "cleanser",
            Self::Toner => "toner",
            Self::Exfoliant => "exfoliant",
            Self::Essence => "essence",
            Self::SerumTreatment => "serum_treatment",
            Self::SpotTreatment => "spot_treatment",
            Self::FacialOil => "facial_oil",
            Self::Moisturizer => "moisturizer",
            Self::Mask => "mask",
            Self::Sunscreen => "sunscreen",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Cleanser => "Cleanser",
            Self::Toner => "Toner",
            Self::Exfoliant => "Exfoliant",
            Self::Essence => "Essence",
            Self::SerumTreatment => "Serum / treatment",
            Self::SpotTreatment => "Spot treatment",
            Self::FacialOil => "Facial oil",
            Self::Moisturizer => "Moisturizer",
            Self::Mask => "Mask",
            Self::Sunscreen => "Sunscreen",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' ', '/'], "_");
        let normalized = normalized.as_str();
        Category::SEQUENCE
            .into_iter()
            .find(|category| category.label() == normalized)
            .or(match normalized {
                "serum" | "treatment" | "serum_or_treatment" => Some(Category::SerumTreatment),
                "oil" => Some(Category::FacialOil),
                "spf" => Some(Category::Sunscreen),
                _ => None,
            })
            .ok_or_else(|| DomainError::Validation(format!("unknown category `{value}`")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    MorningOnly,
    EveningOnly,
    Either,
    Both,
}

impl TimeOfDay {
    pub fn allows(self, time: RoutineTime) -> bool {
        !matches!(
            (self, time),
            (Self::MorningOnly, RoutineTime::Pm) | (Self::EveningOnly, RoutineTime::Am)
        )
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::MorningOnly => "in the morning only",
            Self::EveningOnly => "in the evening only",
            Self::Either => "morning or evening",
            Self::Both => "morning and evening",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineTime {
    Am,
    Pm,
}

impl RoutineTime {
    pub fn label(self) -> &'static str {
        match self {
            Self::Am => "am",
            Self::Pm => "pm",
        }
    }
}

impl std::str::FromStr for RoutineTime {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "am" | "morning" => Ok(Self::Am),
            "pm" | "evening" | "night" => Ok(Self::Pm),
            other => Err(DomainError::Validation(format!(
                "unsupported routine time `{other}` (expected am|pm)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concern {
    Acne,
    Aging,
    Hyperpigmentation,
    Dryness,
    Oiliness,
    Sensitivity,
    Redness,
    Dullness,
    Texture,
    Pores,
}

impl Concern {
    pub const ALL: [Concern; 10] = [
        Concern::Acne,
        Concern::Aging,
        Concern::Hyperpigmentation,
        Concern::Dryness,
        Concern::Oiliness,
        Concern::Sensitivity,
        Concern::Redness,
        Concern::Dullness,
        Concern::Texture,
        Concern::Pores,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Acne => "acne",
            Self::Aging => "aging",
            Self::Hyperpigmentation => "hyperpigmentation",
            Self::Dryness => "dryness",
            Self::Oiliness => "oiliness",
            Self::Sensitivity => "sensitivity",
            Self::Redness => "redness",
            Self::Dullness => "dullness",
            Self::Texture => "texture",
            Self::Pores => "pores",
        }
    }
}

impl std::str::FromStr for Concern {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Concern::ALL
            .into_iter()
            .find(|concern| concern.label() == normalized)
            .ok_or_else(|| DomainError::Validation(format!("unknown concern `{value}`")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinType {
    Normal,
    Dry,
    Oily,
    Combination,
    Sensitive,
}

impl SkinType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Dry => "dry",
            Self::Oily => "oily",
            Self::Combination => "combination",
            Self::Sensitive => "sensitive",
        }
    }
}

impl std::str::FromStr for SkinType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "dry" => Ok(Self::Dry),
            "oily" => Ok(Self::Oily),
            "combination" => Ok(Self::Combination),
            "sensitive" => Ok(Self::Sensitive),
            other => Err(DomainError::Validation(format!(
                "unknown skin type `{other}` (expected normal|dry|oily|combination|sensitive)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinProfile {
    pub skin_type: Option<SkinType>,
    #[serde(default)]
    pub concerns: BTreeSet<Concern>,
}

impl SkinProfile {
    pub fn new(skin_type: SkinType) -> Self {
        Self { skin_type: Some(skin_type), concerns: BTreeSet::new() }
    }

    pub fn with_concern(mut self, concern: Concern) -> Self {
        self.concerns.insert(concern);
        self
    }
}

/// Immutable ingredient frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub aliases: BTreeSet<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_it_works: Option<String>,
    #[serde(default)]
    pub usage_tips: Vec<String>,
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub addresses_concerns: BTreeSet<Concern>,
    #[serde(default)]
    pub caution_skin_types: BTreeSet<SkinType>,
    pub beginner_friendly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concentration: Option<String>,
}

impl Ingredient {
    /// Actives whose duplication across products raises irritation risk.
    pub fn is_high_impact(&self) -> bool {
        !self.beginner_friendly
            && matches!(
                self.category,
                Category::Exfoliant | Category::SerumTreatment | Category::SpotTreatment
            )
    }

    pub fn summary(&self) -> IngredientSummary {
        IngredientSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category,
            beginner_friendly: self.beginner_friendly,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSummary {
    pub id: IngredientId,
    pub name: String,
    pub category: Category,
    pub beginner_friendly: bool,
}

#[cfg(test)]
mod tests {
    use super::{Category, RoutineTime, TimeOfDay};

    #[test]
    fn category_rank_follows_application_order() {
        assert!(Category::Cleanser.rank() < Category::Toner.rank());
        assert!(Category::SerumTreatment.rank() < Category::SpotTreatment.rank());
        assert!(Category::FacialOil.rank() < Category::Moisturizer.rank());
        assert_eq!(Category::Sunscreen.rank(), Category::SEQUENCE.len() - 1);
    }

    #[test]
    fn category_parses_labels_and_common_synonyms() {
        assert_eq!("serum_treatment".parse::<Category>().ok(), Some(Category::SerumTreatment));
        assert_eq!("Serum/Treatment".parse::<Category>().ok(), Some(Category::SerumTreatment));
        assert_eq!("facial-oil".parse::<Category>().ok(), Some(Category::FacialOil));
        assert_eq!("spf".parse::<Category>().ok(), Some(Category::Sunscreen));
        assert!("lipstick".parse::<Category>().is_err());
    }

    #[test]
    fn time_of_day_restricts_only_the_opposite_routine() {
        assert!(!TimeOfDay::EveningOnly.allows(RoutineTime::Am));
        assert!(TimeOfDay::EveningOnly.allows(RoutineTime::Pm));
        assert!(!TimeOfDay::MorningOnly.allows(RoutineTime::Pm));
        assert!(TimeOfDay::Both.allows(RoutineTime::Am));
        assert!(TimeOfDay::Either.allows(RoutineTime::Pm));
    }
}
