//! Routine sequencing.
//!
//! Category order is total, so ordering reduces to a stable sort by (category rank, input
//! order). Interaction constraints are evaluated afterwards over cross-product pairs and are
//! reported, never fixed: no ingredient is dropped or moved to resolve a conflict.

pub mod advice;
pub mod analysis;
pub mod ordering;

use std::collections::BTreeSet;

use tracing::info;

use crate::compatibility::CompatibilityReport;
use crate::domain::ingredient::{Category, RoutineTime, SkinProfile};
use crate::domain::interaction::{IngredientPair, InteractionType};
use crate::domain::routine::{Product, RoutineAudit, RoutineResult, RoutineStep, SuggestedStep};
use crate::errors::DomainError;
use crate::knowledge::KnowledgeBase;

use self::advice::{routine_suggestions, starter_routine, time_note, SuggestionInput};
use self::ordering::{ordering_issues, resolve_products, sequence, ResolvedProduct};

#[derive(Clone, Copy, Debug)]
pub struct RoutineBuilder<'a> {
    knowledge_base: &'a KnowledgeBase,
}

impl<'a> RoutineBuilder<'a> {
    pub fn new(knowledge_base: &'a KnowledgeBase) -> Self {
        Self { knowledge_base }
    }

    pub fn build(&self, products: &[Product], time: RoutineTime) -> Result<RoutineResult, DomainError> {
        self.build_for_profile(products, time, None)
    }

    /// Same as [`RoutineBuilder::build`], with profile-specific suggestions appended.
    pub fn build_for_profile(
        &self,
        products: &[Product],
        time: RoutineTime,
        profile: Option<&SkinProfile>,
    ) -> Result<RoutineResult, DomainError> {
        let resolved = resolve_products(self.knowledge_base.catalog(), products)?;
        let ordered = sequence(resolved);
        let result = self.evaluate(&ordered, time, profile);

        info!(
            event_name = "routine.built",
            time = time.label(),
            steps = result.steps.len(),
            conflicts = result.conflicts.len(),
            missing_essentials = result.missing_essentials.len(),
            "routine built"
        );
        Ok(result)
    }

    /// Evaluate products in the order the user applies them and report misplaced steps.
    pub fn audit(&self, products: &[Product], time: RoutineTime) -> Result<RoutineAudit, DomainError> {
        self.audit_for_profile(products, time, None)
    }

    /// Same as [`RoutineBuilder::audit`], with profile-specific suggestions appended.
    pub fn audit_for_profile(
        &self,
        products: &[Product],
        time: RoutineTime,
        profile: Option<&SkinProfile>,
    ) -> Result<RoutineAudit, DomainError> {
        let resolved = resolve_products(self.knowledge_base.catalog(), products)?;
        let ordering_issues = ordering_issues(&resolved);
        let recommended_order =
            sequence(resolved.clone()).into_iter().map(|product| product.name).collect();
        let routine = self.evaluate(&resolved, time, profile);

        info!(
            event_name = "routine.audited",
            time = time.label(),
            ordering_issues = ordering_issues.len(),
            conflicts = routine.conflicts.len(),
            "routine audited"
        );
        Ok(RoutineAudit {
            is_valid: routine.is_valid && ordering_issues.is_empty(),
            ordering_issues,
            recommended_order,
            routine,
        })
    }

    /// Starter routine for a skin profile.
    pub fn suggest(&self, profile: &SkinProfile, time: RoutineTime) -> Vec<SuggestedStep> {
        starter_routine(self.knowledge_base.catalog(), profile, time)
    }

    fn evaluate(
        &self,
        products: &[ResolvedProduct],
        time: RoutineTime,
        profile: Option<&SkinProfile>,
    ) -> RoutineResult {
        let catalog = self.knowledge_base.catalog();
        let graph = self.knowledge_base.graph();

        let mut steps = products
            .iter()
            .enumerate()
            .map(|(index, product)| {
                let ingredients = product
                    .ingredients
                    .iter()
                    .filter_map(|id| catalog.get(id.as_str()).ok())
                    .collect::<Vec<_>>();
                RoutineStep {
                    order: index + 1,
                    product_name: product.name.clone(),
                    ingredients: product.ingredients.clone(),
                    wait_after: 0,
                    notes: time_note(&ingredients, time),
                }
            })
            .collect::<Vec<_>>();

        let mut report = CompatibilityReport { is_compatible: true, ..CompatibilityReport::default() };
        let mut seen = BTreeSet::new();
        // Step whose wait edge set each step's `wait_after`.
        let mut wait_partners = vec![None; steps.len()];
        for (index, earlier) in products.iter().enumerate() {
            for (offset, later) in products[index + 1..].iter().enumerate() {
                for a in &earlier.ingredients {
                    for b in later.ingredients.iter().filter(|b| *b != a) {
                        let Some(edge) = graph.edge(a, b) else { continue };
                        if let (InteractionType::Wait, Some(minutes)) =
                            (edge.interaction_type, edge.wait_minutes)
                        {
                            if minutes > steps[index].wait_after {
                                steps[index].wait_after = minutes;
                                wait_partners[index] = Some(index + 1 + offset);
                            }
                        }
                        if seen.insert(IngredientPair::new(a.clone(), b.clone())) {
                            report.record(edge);
                        }
                    }
                }
            }
        }

        let suggestions = routine_suggestions(&SuggestionInput {
            catalog,
            products,
            steps: &steps,
            wait_partners: &wait_partners,
            report: &report,
            time,
            profile,
        });

        RoutineResult {
            is_valid: report.conflicts.is_empty(),
            missing_essentials: missing_essentials(products, time),
            conflicts: report.conflicts,
            cautions: report.cautions,
            synergies: report.synergies,
            suggestions,
            steps,
        }
    }
}

fn missing_essentials(products: &[ResolvedProduct], time: RoutineTime) -> Vec<String> {
    let represented = products
        .iter()
        .flat_map(|product| product.categories.iter().copied())
        .collect::<BTreeSet<_>>();

    let mut essentials = vec![Category::Cleanser, Category::Moisturizer];
    if time == RoutineTime::Am {
        essentials.push(Category::Sunscreen);
    }
    essentials
        .into_iter()
        .filter(|category| !represented.contains(category))
        .map(|category| category.label().to_string())
        .collect()
}
