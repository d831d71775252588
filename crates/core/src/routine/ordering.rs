use std::collections::BTreeSet;

use crate::domain::ingredient::{Category, IngredientId};
use crate::domain::routine::Product;
use crate::errors::DomainError;
use crate::knowledge::{normalize_key, IngredientCatalog};

/// Product-name keywords that declare a category regardless of ingredients.
const NAME_HINTS: &[(&str, Category)] = &[
    ("cleanser", Category::Cleanser),
    ("cleansing", Category::Cleanser),
    ("wash", Category::Cleanser),
    ("toner", Category::Toner),
    ("tonic", Category::Toner),
    ("exfoliant", Category::Exfoliant),
    ("exfoliator", Category::Exfoliant),
    ("peel", Category::Exfoliant),
    ("essence", Category::Essence),
    ("serum", Category::SerumTreatment),
    ("ampoule", Category::SerumTreatment),
    ("spot", Category::SpotTreatment),
    ("oil", Category::FacialOil),
    ("moisturizer", Category::Moisturizer),
    ("moisturiser", Category::Moisturizer),
    ("cream", Category::Moisturizer),
    ("lotion", Category::Moisturizer),
    ("mask", Category::Mask),
    ("sunscreen", Category::Sunscreen),
    ("sunblock", Category::Sunscreen),
    ("spf", Category::Sunscreen),
];

/// Categories declared by a product's name.
pub fn name_categories(name: &str) -> BTreeSet<Category> {
    let normalized = normalize_key(name);
    let tokens = normalized.split(' ').collect::<BTreeSet<_>>();
    NAME_HINTS
        .iter()
        .filter(|(keyword, _)| tokens.contains(keyword))
        .map(|(_, category)| *category)
        .collect()
}

/// A product with its ingredients resolved against the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedProduct {
    pub input_index: usize,
    pub name: String,
    pub ingredients: Vec<IngredientId>,
    pub categories: BTreeSet<Category>,
}

impl ResolvedProduct {
    /// Minimum rank over represented categories.
    pub fn rank(&self) -> usize {
        self.categories.iter().map(|category| category.rank()).min().unwrap_or(usize::MAX)
    }

    pub fn contains(&self, id: &IngredientId) -> bool {
        self.ingredients.contains(id)
    }
}

/// Validate every product shape first, then resolve every ingredient token.
pub fn resolve_products(
    catalog: &IngredientCatalog,
    products: &[Product],
) -> Result<Vec<ResolvedProduct>, DomainError> {
    if products.is_empty() {
        return Err(DomainError::Validation("a routine needs at least one product".to_string()));
    }
    for (index, product) in products.iter().enumerate() {
        if product.name.trim().is_empty() {
            return Err(DomainError::Validation(format!("product #{} has an empty name", index + 1)));
        }
        if product.ingredients.iter().all(|token| token.trim().is_empty()) {
            return Err(DomainError::Validation(format!(
                "product `{}` has no ingredients",
                product.name.trim()
            )));
        }
    }

    products
        .iter()
        .enumerate()
        .map(|(input_index, product)| {
            let mut ingredients = Vec::new();
            let mut categories = name_categories(&product.name);
            for token in product.ingredients.iter().filter(|token| !token.trim().is_empty()) {
                let ingredient = catalog.resolve_ingredient(token)?;
                if !ingredients.contains(&ingredient.id) {
                    ingredients.push(ingredient.id.clone());
                }
                categories.insert(ingredient.category);
            }
            Ok(ResolvedProduct {
                input_index,
                name: product.name.trim().to_string(),
                ingredients,
                categories,
            })
        })
        .collect()
}

/// Stable sort by (category rank, input order).
pub fn sequence(mut products: Vec<ResolvedProduct>) -> Vec<ResolvedProduct> {
    products.sort_by_key(|product| (product.rank(), product.input_index));
    products
}

/// Pairs applied in the wrong order, described against the user's own step numbers.
pub fn ordering_issues(products: &[ResolvedProduct]) -> Vec<String> {
    let mut issues = Vec::new();
    for (index, earlier) in products.iter().enumerate() {
        for (offset, later) in products[index + 1..].iter().enumerate() {
            if later.rank() < earlier.rank() {
                issues.push(format!(
                    "'{}' (step {}) should come before '{}' (step {})",
                    later.name,
                    index + offset + 2,
                    earlier.name,
                    index + 1
                ));
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{name_categories, ordering_issues, sequence, ResolvedProduct};
    use crate::domain::ingredient::Category;

    fn product(input_index: usize, name: &str, categories: &[Category]) -> ResolvedProduct {
        ResolvedProduct {
            input_index,
            name: name.to_string(),
            ingredients: Vec::new(),
            categories: categories.iter().copied().collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn product_names_declare_categories() {
        assert_eq!(
            name_categories("Gentle Foaming Cleanser"),
            BTreeSet::from([Category::Cleanser])
        );
        assert_eq!(
            name_categories("Daily SPF-50 Moisturizer"),
            BTreeSet::from([Category::Moisturizer, Category::Sunscreen])
        );
        assert!(name_categories("The Ordinary 10%").is_empty());
        assert!(name_categories("Oilfree Gel").is_empty());
    }

    #[test]
    fn sequencing_is_stable_by_rank_then_input_order() {
        let ordered = sequence(vec![
            product(0, "Night Cream", &[Category::Moisturizer]),
            product(1, "Serum A", &[Category::SerumTreatment]),
            product(2, "Wash", &[Category::Cleanser]),
            product(3, "Serum B", &[Category::SerumTreatment]),
        ]);

        let names = ordered.iter().map(|product| product.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Wash", "Serum A", "Serum B", "Night Cream"]);
    }

    #[test]
    fn rank_is_the_minimum_over_categories() {
        let product = product(0, "Hybrid", &[Category::Sunscreen, Category::Moisturizer]);
        assert_eq!(product.rank(), Category::Moisturizer.rank());
    }

    #[test]
    fn ordering_issues_reference_user_step_numbers() {
        let issues = ordering_issues(&[
            product(0, "Moisturizer", &[Category::Moisturizer]),
            product(1, "Serum", &[Category::SerumTreatment]),
            product(2, "Cleanser", &[Category::Cleanser]),
        ]);

        assert_eq!(
            issues,
            vec![
                "'Serum' (step 2) should come before 'Moisturizer' (step 1)".to_string(),
                "'Cleanser' (step 3) should come before 'Moisturizer' (step 1)".to_string(),
                "'Cleanser' (step 3) should come before 'Serum' (step 2)".to_string(),
            ]
        );
    }
}
