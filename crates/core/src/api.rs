//! Call contracts for an external API layer. Inputs arrive as plain strings and wire
//! shapes; everything returned serializes to the stable field names.

use crate::compatibility::{CompatibilityChecker, CompatibilityReport};
use crate::domain::ingredient::{Category, Concern, Ingredient, IngredientSummary, RoutineTime};
use crate::domain::routine::{Product, RoutineResult};
use crate::errors::DomainError;
use crate::knowledge::{IngredientFilter, KnowledgeBase};
use crate::routine::RoutineBuilder;

pub fn check_compatibility<S: AsRef<str>>(
    knowledge_base: &KnowledgeBase,
    ingredients: &[S],
) -> Result<CompatibilityReport, DomainError> {
    CompatibilityChecker::new(knowledge_base).check(ingredients)
}

/// `time` accepts `am` or `pm` (and `morning`/`evening`).
pub fn build_routine(
    knowledge_base: &KnowledgeBase,
    products: &[Product],
    time: &str,
) -> Result<RoutineResult, DomainError> {
    let time = time.parse::<RoutineTime>()?;
    RoutineBuilder::new(knowledge_base).build(products, time)
}

/// Parse optional string filters into an [`IngredientFilter`].
pub fn parse_filter(
    category: Option<&str>,
    concern: Option<&str>,
    search: Option<&str>,
) -> Result<IngredientFilter, DomainError> {
    Ok(IngredientFilter {
        category: category.map(str::parse::<Category>).transpose()?,
        concern: concern.map(str::parse::<Concern>).transpose()?,
        search: search.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string),
    })
}

pub fn list_ingredients(
    knowledge_base: &KnowledgeBase,
    filter: &IngredientFilter,
) -> Vec<IngredientSummary> {
    knowledge_base.catalog().list(filter).into_iter().map(Ingredient::summary).collect()
}

/// Full frame for an id. Aliases and display names are accepted as well.
pub fn get_ingredient(knowledge_base: &KnowledgeBase, id: &str) -> Result<Ingredient, DomainError> {
    knowledge_base.catalog().resolve_ingredient(id).cloned()
}
