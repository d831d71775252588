use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ingredient::IngredientId;
use crate::domain::interaction::{Interaction, InteractionClass, InteractionEdge, WaitTime};
use crate::errors::DomainError;
use crate::knowledge::KnowledgeBase;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub is_compatible: bool,
    pub conflicts: Vec<Interaction>,
    pub cautions: Vec<Interaction>,
    pub synergies: Vec<Interaction>,
    pub wait_times: Vec<WaitTime>,
}

impl CompatibilityReport {
    /// Files an edge into the bucket its type belongs to.
    pub fn record(&mut self, edge: &InteractionEdge) {
        match edge.interaction_type.class() {
            InteractionClass::Conflict => self.conflicts.push(edge.to_interaction()),
            InteractionClass::Caution => self.cautions.push(edge.to_interaction()),
            InteractionClass::Synergy => self.synergies.push(edge.to_interaction()),
            InteractionClass::Wait => {
                if let Some(wait_minutes) = edge.wait_minutes {
                    self.wait_times.push(WaitTime {
                        ingredient_a: edge.pair.first().clone(),
                        ingredient_b: edge.pair.second().clone(),
                        wait_minutes,
                    });
                }
            }
        }
        self.is_compatible = self.conflicts.is_empty();
    }

    pub fn interaction_count(&self) -> usize {
        self.conflicts.len() + self.cautions.len() + self.synergies.len() + self.wait_times.len()
    }
}

/// Pairwise classification over a set of ingredients.
#[derive(Clone, Copy, Debug)]
pub struct CompatibilityChecker<'a> {
    knowledge_base: &'a KnowledgeBase,
}

impl<'a> CompatibilityChecker<'a> {
    pub fn new(knowledge_base: &'a KnowledgeBase) -> Self {
        Self { knowledge_base }
    }

    /// Resolve `tokens` and classify every unordered pair among the distinct ids.
    pub fn check<S: AsRef<str>>(&self, tokens: &[S]) -> Result<CompatibilityReport, DomainError> {
        if tokens.len() < 2 {
            return Err(DomainError::Validation(
                "at least two ingredients are required for a compatibility check".to_string(),
            ));
        }

        let catalog = self.knowledge_base.catalog();
        let ids = tokens
            .iter()
            .map(|token| catalog.resolve(token.as_ref()).cloned())
            .collect::<Result<BTreeSet<_>, _>>()?;
        if ids.len() < 2 {
            return Err(DomainError::Validation(
                "at least two distinct ingredients are required for a compatibility check"
                    .to_string(),
            ));
        }

        let ids = ids.into_iter().collect::<Vec<_>>();
        let report = self.check_ids(&ids);
        debug!(
            event_name = "compatibility.checked",
            ingredients = ids.len(),
            conflicts = report.conflicts.len(),
            cautions = report.cautions.len(),
            synergies = report.synergies.len(),
            wait_times = report.wait_times.len(),
            "compatibility check completed"
        );
        Ok(report)
    }

    /// Classify already-resolved ids. Pairs are walked in the order given, `i < j`.
    pub fn check_ids(&self, ids: &[IngredientId]) -> CompatibilityReport {
        let graph = self.knowledge_base.graph();
        let mut report = CompatibilityReport { is_compatible: true, ..CompatibilityReport::default() };

        for (index, left) in ids.iter().enumerate() {
            for right in &ids[index + 1..] {
                if let Some(edge) = graph.edge(left, right) {
                    report.record(edge);
                }
            }
        }

        report
    }
}
