use std::collections::{BTreeMap, BTreeSet};

use crate::compatibility::CompatibilityReport;
use crate::domain::ingredient::{
    Category, Concern, Ingredient, IngredientId, RoutineTime, SkinProfile, TimeOfDay,
};
use crate::domain::routine::{RoutineStep, StepPriority, SuggestedStep};
use crate::knowledge::IngredientCatalog;
use crate::routine::ordering::ResolvedProduct;

const MAX_TREATMENTS: usize = 3;
const MAX_CANDIDATES: usize = 3;

/// "A", "A or B", "A, B or C".
pub fn join_alternatives(items: &[&str]) -> String {
    join_with(items, "or")
}

/// "A", "A and B", "A, B and C".
pub fn join_all(items: &[&str]) -> String {
    join_with(items, "and")
}

fn join_with(items: &[&str], conjunction: &str) -> String {
    match items {
        [] => String::new(),
        [only] => (*only).to_string(),
        [head @ .., last] => format!("{} {conjunction} {last}", head.join(", ")),
    }
}

/// Per-step note for ingredients whose time of day excludes the routine's time.
pub fn time_note(ingredients: &[&Ingredient], time: RoutineTime) -> Option<String> {
    let notes = ingredients
        .iter()
        .filter(|ingredient| !ingredient.time_of_day.allows(time))
        .map(|ingredient| match ingredient.time_of_day {
            TimeOfDay::EveningOnly => format!("{} should only be used at night", ingredient.name),
            _ => format!("{} should only be used in the morning", ingredient.name),
        })
        .collect::<Vec<_>>();

    if notes.is_empty() {
        None
    } else {
        Some(notes.join("; "))
    }
}

pub struct SuggestionInput<'a> {
    pub catalog: &'a IngredientCatalog,
    pub products: &'a [ResolvedProduct],
    pub steps: &'a [RoutineStep],
    /// Index of the step each step must wait before, parallel to `steps`.
    pub wait_partners: &'a [Option<usize>],
    pub report: &'a CompatibilityReport,
    pub time: RoutineTime,
    pub profile: Option<&'a SkinProfile>,
}

/// Template-driven remarks in a fixed order: time of day, duplicated actives, waits,
/// conflicts, then profile advice.
pub fn routine_suggestions(input: &SuggestionInput<'_>) -> Vec<String> {
    let catalog = input.catalog;
    let mut suggestions = Vec::new();

    for product in input.products {
        for id in &product.ingredients {
            let Ok(ingredient) = catalog.get(id.as_str()) else { continue };
            if ingredient.time_of_day.allows(input.time) {
                continue;
            }
            let (when, routine) = match ingredient.time_of_day {
                TimeOfDay::EveningOnly => ("evening", "PM"),
                _ => ("morning", "AM"),
            };
            suggestions.push(format!(
                "{} in '{}' is meant for the {when}; move it to your {routine} routine.",
                ingredient.name, product.name
            ));
        }
    }

    let mut holders: BTreeMap<&IngredientId, Vec<&str>> = BTreeMap::new();
    for product in input.products {
        for id in &product.ingredients {
            holders.entry(id).or_default().push(product.name.as_str());
        }
    }
    for (id, names) in holders.iter().filter(|(_, names)| names.len() > 1) {
        let Ok(ingredient) = catalog.get(id.as_str()) else { continue };
        if !ingredient.is_high_impact() {
            continue;
        }
        suggestions.push(format!(
            "{} appears in {}; keep it in one product to avoid over-exfoliation and irritation.",
            ingredient.name,
            join_all(names)
        ));
    }

    for (step, partner) in input.steps.iter().zip(input.wait_partners) {
        let Some(partner) = partner.and_then(|index| input.steps.get(index)) else { continue };
        suggestions.push(format!(
            "Wait {} minutes after '{}' before applying '{}'.",
            step.wait_after, step.product_name, partner.product_name
        ));
    }

    for conflict in &input.report.conflicts {
        suggestions.push(format!(
            "{} and {} should not be layered together. {}",
            catalog.display_name(&conflict.ingredient_a),
            catalog.display_name(&conflict.ingredient_b),
            conflict.recommendation
        ));
    }

    if let Some(profile) = input.profile {
        suggestions.extend(profile_suggestions(input, profile));
    }

    suggestions
}

fn profile_suggestions(input: &SuggestionInput<'_>, profile: &SkinProfile) -> Vec<String> {
    let catalog = input.catalog;
    let present = input
        .products
        .iter()
        .flat_map(|product| product.ingredients.iter())
        .filter_map(|id| catalog.get(id.as_str()).ok())
        .fold(Vec::<&Ingredient>::new(), |mut present, ingredient| {
            if !present.iter().any(|seen| seen.id == ingredient.id) {
                present.push(ingredient);
            }
            present
        });
    let mut suggestions = Vec::new();

    for concern in &profile.concerns {
        if present.iter().any(|ingredient| ingredient.addresses_concerns.contains(concern)) {
            continue;
        }
        let candidates = candidates_for(catalog, profile, input.time, &BTreeSet::from([*concern]))
            .into_iter()
            .take(MAX_CANDIDATES)
            .map(|ingredient| ingredient.name.as_str())
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            continue;
        }
        suggestions.push(format!(
            "Nothing in this routine targets {}; consider {}.",
            concern.label(),
            join_alternatives(&candidates)
        ));
    }

    if let Some(skin_type) = profile.skin_type {
        for ingredient in present {
            if ingredient.caution_skin_types.contains(&skin_type) {
                suggestions.push(format!(
                    "{} can irritate {} skin; patch test first and introduce it gradually.",
                    ingredient.name,
                    skin_type.label()
                ));
            }
        }
    }

    suggestions
}

/// Ingredients allowed at `time`, not cautioned for the profile's skin type, that address
/// any of `concerns`. Ordered by concerns covered, then beginner friendliness, then id.
fn candidates_for<'a>(
    catalog: &'a IngredientCatalog,
    profile: &SkinProfile,
    time: RoutineTime,
    concerns: &BTreeSet<Concern>,
) -> Vec<&'a Ingredient> {
    let mut candidates = catalog
        .iter()
        .filter(|ingredient| ingredient.time_of_day.allows(time))
        .filter(|ingredient| {
            profile.skin_type.map_or(true, |skin| !ingredient.caution_skin_types.contains(&skin))
        })
        .filter(|ingredient| !ingredient.addresses_concerns.is_disjoint(concerns))
        .collect::<Vec<_>>();
    candidates.sort_by(|left, right| {
        let left_score = left.addresses_concerns.intersection(concerns).count();
        let right_score = right.addresses_concerns.intersection(concerns).count();
        right_score
            .cmp(&left_score)
            .then_with(|| right.beginner_friendly.cmp(&left.beginner_friendly))
            .then_with(|| left.id.cmp(&right.id))
    });
    candidates
}

fn essential_why(category: Category) -> &'static str {
    match category {
        Category::Cleanser => "Removes dirt, oil and leftover product so later steps can absorb.",
        Category::Moisturizer => "Supports the skin barrier and locks in hydration.",
        _ => "Protects against UV damage, the leading cause of visible aging.",
    }
}

/// Starter routine for a profile: essentials plus up to three concern-driven treatments,
/// one per category, in application order.
pub fn starter_routine(
    catalog: &IngredientCatalog,
    profile: &SkinProfile,
    time: RoutineTime,
) -> Vec<SuggestedStep> {
    let mut essentials = vec![Category::Cleanser, Category::Moisturizer];
    if time == RoutineTime::Am {
        essentials.push(Category::Sunscreen);
    }

    let mut steps = essentials
        .into_iter()
        .map(|category| {
            let step = SuggestedStep {
                step: category.display_name().to_string(),
                why: essential_why(category).to_string(),
                ingredients: catalog
                    .iter()
                    .filter(|ingredient| ingredient.category == category)
                    .filter(|ingredient| ingredient.time_of_day.allows(time))
                    .filter(|ingredient| {
                        profile
                            .skin_type
                            .map_or(true, |skin| !ingredient.caution_skin_types.contains(&skin))
                    })
                    .map(|ingredient| ingredient.id.clone())
                    .collect(),
                priority: StepPriority::Essential,
            };
            (category, step)
        })
        .collect::<Vec<_>>();

    let mut used_categories = BTreeSet::new();
    let treatments = candidates_for(catalog, profile, time, &profile.concerns)
        .into_iter()
        .filter(|ingredient| is_treatment(ingredient.category))
        .filter(|ingredient| used_categories.insert(ingredient.category))
        .take(MAX_TREATMENTS);
    for ingredient in treatments {
        let targets = ingredient
            .addresses_concerns
            .intersection(&profile.concerns)
            .map(|concern| concern.label())
            .collect::<Vec<_>>();
        steps.push((
            ingredient.category,
            SuggestedStep {
                step: ingredient.category.display_name().to_string(),
                why: format!("{} targets {}.", ingredient.name, join_all(&targets)),
                ingredients: vec![ingredient.id.clone()],
                priority: StepPriority::Recommended,
            },
        ));
    }

    steps.sort_by_key(|(category, _)| category.rank());
    steps.into_iter().map(|(_, step)| step).collect()
}

fn is_treatment(category: Category) -> bool {
    matches!(
        category,
        Category::Toner
            | Category::Exfoliant
            | Category::Essence
            | Category::SerumTreatment
            | Category::SpotTreatment
            | Category::FacialOil
    )
}
