use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::ingredient::{Category, Concern, Ingredient, IngredientId};
use crate::errors::{DomainError, KnowledgeBaseError};

/// Lowercase and collapse every run of non-alphanumeric characters into a single space.
///
/// Question text is tokenized with the same rule, so every resolvable alias is also
/// findable as a mention.
pub fn normalize_key(text: &str) -> String {
    text.split(|character: char| !character.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientFilter {
    pub category: Option<Category>,
    pub concern: Option<Concern>,
    pub search: Option<String>,
}

/// A normalized alias split into tokens, used for mention scanning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasPattern {
    pub tokens: Vec<String>,
    pub id: IngredientId,
}

/// Frame store of ingredients plus the alias resolver. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct IngredientCatalog {
    ingredients: BTreeMap<IngredientId, Ingredient>,
    aliases: HashMap<String, IngredientId>,
    patterns: Vec<AliasPattern>,
}

impl IngredientCatalog {
    pub fn new(ingredients: Vec<Ingredient>) -> Result<Self, KnowledgeBaseError> {
        let mut catalog = Self::default();

        for mut ingredient in ingredients {
            let id = ingredient.id.clone();
            if id.0.trim().is_empty() || ingredient.name.trim().is_empty() {
                return Err(KnowledgeBaseError::BlankIngredient(id.0));
            }
            if catalog.ingredients.contains_key(&id) {
                return Err(KnowledgeBaseError::DuplicateIngredient(id.0));
            }

            ingredient.aliases = ingredient
                .aliases
                .iter()
                .map(|alias| normalize_key(alias))
                .filter(|alias| !alias.is_empty())
                .collect::<BTreeSet<_>>();

            let keys = [normalize_key(&id.0), normalize_key(&ingredient.name)]
                .into_iter()
                .chain(ingredient.aliases.iter().cloned())
                .collect::<BTreeSet<_>>();
            for key in keys {
                catalog.register_alias(key, &id)?;
            }

            catalog.ingredients.insert(id, ingredient);
        }

        catalog.patterns = catalog
            .aliases
            .iter()
            .map(|(alias, id)| AliasPattern {
                tokens: alias.split(' ').map(str::to_string).collect(),
                id: id.clone(),
            })
            .collect();
        catalog.patterns.sort_by(|left, right| {
            let left_key = left.tokens.join(" ");
            let right_key = right.tokens.join(" ");
            right
                .tokens
                .len()
                .cmp(&left.tokens.len())
                .then_with(|| right_key.len().cmp(&left_key.len()))
                .then_with(|| left_key.cmp(&right_key))
        });

        Ok(catalog)
    }

    fn register_alias(&mut self, key: String, id: &IngredientId) -> Result<(), KnowledgeBaseError> {
        match self.aliases.get(&key) {
            Some(existing) if existing != id => Err(KnowledgeBaseError::DuplicateAlias {
                alias: key,
                first: existing.0.clone(),
                second: id.0.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                self.aliases.insert(key, id.clone());
                Ok(())
            }
        }
    }

    /// Resolve an id, display name or alias. Exact match after normalization only.
    pub fn resolve(&self, text: &str) -> Result<&IngredientId, DomainError> {
        self.aliases.get(&normalize_key(text)).ok_or_else(|| DomainError::not_found(text.trim()))
    }

    pub fn resolve_ingredient(&self, text: &str) -> Result<&Ingredient, DomainError> {
        let id = self.resolve(text)?;
        self.get(id.as_str())
    }

    pub fn get(&self, id: &str) -> Result<&Ingredient, DomainError> {
        self.ingredients.get(id).ok_or_else(|| DomainError::not_found(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ingredients.contains_key(id)
    }

    /// Display name for an id, falling back to the id itself.
    pub fn display_name<'a>(&'a self, id: &'a IngredientId) -> &'a str {
        self.ingredients.get(id).map(|ingredient| ingredient.name.as_str()).unwrap_or(id.as_str())
    }

    pub fn list(&self, filter: &IngredientFilter) -> Vec<&Ingredient> {
        let search = filter
            .search
            .as_deref()
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty());

        self.ingredients
            .values()
            .filter(|ingredient| filter.category.map_or(true, |category| ingredient.category == category))
            .filter(|ingredient| {
                filter.concern.map_or(true, |concern| ingredient.addresses_concerns.contains(&concern))
            })
            .filter(|ingredient| {
                search.as_deref().map_or(true, |needle| ingredient.name.to_lowercase().contains(needle))
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.values()
    }

    /// Alias patterns ordered longest first (token count, then character length).
    pub fn alias_patterns(&self) -> &[AliasPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}
