use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::ingredient::IngredientId;
use crate::domain::interaction::{IngredientPair, InteractionEdge, InteractionType};
use crate::errors::KnowledgeBaseError;
use crate::knowledge::catalog::IngredientCatalog;

/// One interaction rule as written in the knowledge base.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRule {
    pub a: String,
    pub b: String,
    pub interaction_type: InteractionType,
    pub severity: u8,
    pub explanation: String,
    pub recommendation: String,
    #[serde(default)]
    pub wait_minutes: Option<u32>,
}

/// Simple undirected graph over catalog ingredients. A missing edge means
/// "no known interaction", which is not the same as "safe".
#[derive(Clone, Debug, Default)]
pub struct InteractionGraph {
    edges: BTreeMap<IngredientPair, InteractionEdge>,
    adjacency: HashMap<IngredientId, Vec<IngredientPair>>,
}

impl InteractionGraph {
    pub fn new(
        catalog: &IngredientCatalog,
        rules: Vec<InteractionRule>,
    ) -> Result<Self, KnowledgeBaseError> {
        let mut graph = Self::default();

        for rule in rules {
            let edge = validate_rule(catalog, rule)?;
            let pair = edge.pair.clone();
            if graph.edges.contains_key(&pair) {
                return Err(KnowledgeBaseError::DuplicateEdge {
                    a: pair.first().0.clone(),
                    b: pair.second().0.clone(),
                });
            }

            graph.adjacency.entry(pair.first().clone()).or_default().push(pair.clone());
            graph.adjacency.entry(pair.second().clone()).or_default().push(pair.clone());
            graph.edges.insert(pair, edge);
        }

        for pairs in graph.adjacency.values_mut() {
            pairs.sort();
        }

        Ok(graph)
    }

    /// Symmetric edge lookup.
    pub fn edge(&self, a: &IngredientId, b: &IngredientId) -> Option<&InteractionEdge> {
        if a == b {
            return None;
        }
        self.edges.get(&IngredientPair::new(a.clone(), b.clone()))
    }

    /// Neighbours of `id`, ordered by the neighbour's id.
    pub fn neighbors(&self, id: &IngredientId) -> Vec<(&IngredientId, &InteractionEdge)> {
        let mut neighbors = self
            .adjacency
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|pair| {
                let other = pair.other(id)?;
                let edge = self.edges.get(pair)?;
                Some((other, edge))
            })
            .collect::<Vec<_>>();
        neighbors.sort_by(|left, right| left.0.cmp(right.0));
        neighbors
    }

    pub fn edges(&self) -> impl Iterator<Item = &InteractionEdge> {
        self.edges.values()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn validate_rule(
    catalog: &IngredientCatalog,
    rule: InteractionRule,
) -> Result<InteractionEdge, KnowledgeBaseError> {
    let a = rule.a.trim().to_string();
    let b = rule.b.trim().to_string();

    if a == b {
        return Err(KnowledgeBaseError::SelfLoop(a));
    }
    for endpoint in [&a, &b] {
        if !catalog.contains(endpoint) {
            return Err(KnowledgeBaseError::DanglingEdge {
                a: a.clone(),
                b: b.clone(),
                missing: endpoint.clone(),
            });
        }
    }
    if !(1..=10).contains(&rule.severity) {
        return Err(KnowledgeBaseError::InvalidSeverity { a, b, severity: rule.severity });
    }

    match (rule.interaction_type, rule.wait_minutes) {
        (InteractionType::Wait, None) => {
            return Err(KnowledgeBaseError::InvalidWait { a, b, reason: "missing on a wait edge" });
        }
        (InteractionType::Wait, Some(0)) => {
            return Err(KnowledgeBaseError::InvalidWait { a, b, reason: "must be positive" });
        }
        (InteractionType::Wait, Some(_)) | (_, None) => {}
        (_, Some(_)) => {
            return Err(KnowledgeBaseError::InvalidWait {
                a,
                b,
                reason: "only wait edges carry wait_minutes",
            });
        }
    }

    Ok(InteractionEdge {
        pair: IngredientPair::new(IngredientId(a), IngredientId(b)),
        interaction_type: rule.interaction_type,
        severity: rule.severity,
        explanation: rule.explanation,
        recommendation: rule.recommendation,
        wait_minutes: rule.wait_minutes,
    })
}
