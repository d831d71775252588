use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::compatibility::{CompatibilityChecker, CompatibilityReport};
use crate::domain::ingredient::{Concern, IngredientId, IngredientSummary};
use crate::domain::interaction::IngredientPair;
use crate::domain::routine::Product;
use crate::errors::DomainError;
use crate::knowledge::KnowledgeBase;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductComparison {
    pub product_a: String,
    pub product_b: String,
    pub can_use_together: bool,
    pub compatibility: CompatibilityReport,
    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientListAnalysis {
    pub identified: Vec<IngredientSummary>,
    pub unrecognized: Vec<String>,
    pub compatibility: Option<CompatibilityReport>,
    pub concerns_addressed: BTreeSet<Concern>,
    pub summary: String,
}

/// Can two products be layered in one routine? Only cross-product pairs count.
pub fn compare_products(
    knowledge_base: &KnowledgeBase,
    first: &Product,
    second: &Product,
) -> Result<ProductComparison, DomainError> {
    let catalog = knowledge_base.catalog();
    let mut resolved = Vec::with_capacity(2);
    for product in [first, second] {
        if product.ingredients.iter().all(|token| token.trim().is_empty()) {
            return Err(DomainError::Validation(format!(
                "product `{}` has no ingredients",
                product.name.trim()
            )));
        }
        let ids = product
            .ingredients
            .iter()
            .filter(|token| !token.trim().is_empty())
            .map(|token| catalog.resolve(token).cloned())
            .collect::<Result<BTreeSet<IngredientId>, _>>()?;
        resolved.push(ids);
    }

    let mut compatibility = CompatibilityReport { is_compatible: true, ..CompatibilityReport::default() };
    let mut seen = BTreeSet::new();
    for a in &resolved[0] {
        for b in resolved[1].iter().filter(|b| *b != a) {
            let pair = IngredientPair::new(a.clone(), b.clone());
            if !seen.insert(pair) {
                continue;
            }
            if let Some(edge) = knowledge_base.graph().edge(a, b) {
                compatibility.record(edge);
            }
        }
    }

    let recommendation = comparison_recommendation(&first.name, &second.name, &compatibility);
    Ok(ProductComparison {
        product_a: first.name.trim().to_string(),
        product_b: second.name.trim().to_string(),
        can_use_together: compatibility.is_compatible,
        compatibility,
        recommendation,
    })
}

fn comparison_recommendation(first: &str, second: &str, report: &CompatibilityReport) -> String {
    let (first, second) = (first.trim(), second.trim());
    if !report.conflicts.is_empty() {
        return format!(
            "Avoid layering '{first}' and '{second}'. Use them in separate routines, for example one in the morning and one at night."
        );
    }
    if let Some(wait) = report.wait_times.iter().map(|wait| wait.wait_minutes).max() {
        return format!(
            "'{first}' and '{second}' can be used together; wait {wait} minutes between them."
        );
    }
    if !report.cautions.is_empty() {
        return format!(
            "'{first}' and '{second}' can be used together, but introduce them gradually and watch for irritation."
        );
    }
    if !report.synergies.is_empty() {
        return format!("'{first}' and '{second}' work well together.");
    }
    format!("No known interactions between '{first}' and '{second}'.")
}

/// Split a raw ingredient list into known and unknown tokens and check what is known.
pub fn analyze_ingredient_list<S: AsRef<str>>(
    knowledge_base: &KnowledgeBase,
    tokens: &[S],
) -> Result<IngredientListAnalysis, DomainError> {
    let tokens = tokens
        .iter()
        .map(|token| token.as_ref().trim())
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>();
    if tokens.is_empty() {
        return Err(DomainError::Validation("ingredient list is empty".to_string()));
    }

    let catalog = knowledge_base.catalog();
    let mut ids = Vec::new();
    let mut unrecognized = Vec::new();
    for token in tokens {
        match catalog.resolve(token) {
            Ok(id) if !ids.contains(id) => ids.push(id.clone()),
            Ok(_) => {}
            Err(_) => unrecognized.push(token.to_string()),
        }
    }

    let identified = ids
        .iter()
        .filter_map(|id| catalog.get(id.as_str()).ok())
        .map(|ingredient| ingredient.summary())
        .collect::<Vec<_>>();
    let concerns_addressed = ids
        .iter()
        .filter_map(|id| catalog.get(id.as_str()).ok())
        .flat_map(|ingredient| ingredient.addresses_concerns.iter().copied())
        .collect::<BTreeSet<_>>();

    let compatibility = if ids.len() >= 2 {
        let mut sorted = ids.clone();
        sorted.sort();
        Some(CompatibilityChecker::new(knowledge_base).check_ids(&sorted))
    } else {
        None
    };

    let summary = list_summary(identified.len(), unrecognized.len(), compatibility.as_ref());
    Ok(IngredientListAnalysis { identified, unrecognized, compatibility, concerns_addressed, summary })
}

fn list_summary(identified: usize, unrecognized: usize, report: Option<&CompatibilityReport>) -> String {
    let mut parts = vec![format!("Identified {identified} of {} ingredients.", identified + unrecognized)];
    if let Some(report) = report {
        match report.conflicts.len() {
            0 => parts.push("No conflicts found.".to_string()),
            1 => parts.push("1 conflict found.".to_string()),
            count => parts.push(format!("{count} conflicts found.")),
        }
        if !report.synergies.is_empty() {
            parts.push(format!("Synergistic pairs: {}.", report.synergies.len()));
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::{analyze_ingredient_list, compare_products};
    use crate::domain::ingredient::Concern;
    use crate::domain::routine::Product;
    use crate::errors::DomainError;
    use crate::knowledge::KnowledgeBase;

    fn knowledge_base() -> &'static KnowledgeBase {
        match KnowledgeBase::shared() {
            Ok(knowledge_base) => knowledge_base,
            Err(error) => panic!("builtin knowledge base should load: {error}"),
        }
    }

    #[test]
    fn conflicting_products_should_not_be_layered() {
        let comparison = compare_products(
            knowledge_base(),
            &Product::new("Night Serum", ["retinol", "squalane"]),
            &Product::new("Peel Pads", ["glycolic_acid"]),
        );
        let comparison = match comparison {
            Ok(comparison) => comparison,
            Err(error) => panic!("comparison should succeed: {error}"),
        };

        assert!(!comparison.can_use_together);
        assert!(comparison.recommendation.starts_with("Avoid layering 'Night Serum' and 'Peel Pads'"));
    }

    #[test]
    fn wait_pairs_recommend_spacing() {
        let comparison = compare_products(
            knowledge_base(),
            &Product::new("C Serum", ["vitamin c"]),
            &Product::new("Barrier Serum", ["niacinamide", "ceramides"]),
        );
        let comparison = match comparison {
            Ok(comparison) => comparison,
            Err(error) => panic!("comparison should succeed: {error}"),
        };

        assert!(comparison.can_use_together);
        assert_eq!(
            comparison.recommendation,
            "'C Serum' and 'Barrier Serum' can be used together; wait 10 minutes between them."
        );
    }

    #[test]
    fn empty_product_is_rejected() {
        let result = compare_products(
            knowledge_base(),
            &Product::new("Serum", ["retinol"]),
            &Product::new("Blank", [" "]),
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn ingredient_list_separates_known_and_unknown_tokens() {
        let analysis = analyze_ingredient_list(
            knowledge_base(),
            &["Aqua", "Niacinamide", "BHA", "parfum", "niacinamide"],
        );
        let analysis = match analysis {
            Ok(analysis) => analysis,
            Err(error) => panic!("analysis should succeed: {error}"),
        };

        let ids = analysis.identified.iter().map(|summary| summary.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["niacinamide", "salicylic_acid"]);
        assert_eq!(analysis.unrecognized, vec!["Aqua".to_string(), "parfum".to_string()]);
        assert!(analysis.concerns_addressed.contains(&Concern::Acne));
        assert_eq!(
            analysis.summary,
            "Identified 2 of 4 ingredients. No conflicts found. Synergistic pairs: 1."
        );
    }

    #[test]
    fn single_known_ingredient_skips_compatibility() {
        let analysis = match analyze_ingredient_list(knowledge_base(), &["retinol", "water"]) {
            Ok(analysis) => analysis,
            Err(error) => panic!("analysis should succeed: {error}"),
        };

        assert!(analysis.compatibility.is_none());
        assert_eq!(analysis.summary, "Identified 1 of 2 ingredients.");
    }

    #[test]
    fn blank_ingredient_list_is_a_validation_error() {
        let result = analyze_ingredient_list(knowledge_base(), &["", "  "]);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
