pub mod api;
pub mod compatibility;
pub mod config;
pub mod domain;
pub mod errors;
pub mod knowledge;
pub mod routine;

pub use compatibility::{CompatibilityChecker, CompatibilityReport};
pub use domain::ingredient::{
    Category, Concern, Ingredient, IngredientId, IngredientSummary, RoutineTime, SkinProfile,
    SkinType, TimeOfDay,
};
pub use domain::interaction::{
    IngredientPair, Interaction, InteractionClass, InteractionEdge, InteractionType, WaitTime,
};
pub use domain::routine::{
    Product, RoutineAudit, RoutineResult, RoutineStep, StepPriority, SuggestedStep,
};
pub use errors::{DomainError, InterfaceError, KnowledgeBaseError};
pub use knowledge::{
    normalize_key, AliasPattern, IngredientCatalog, IngredientFilter, InteractionGraph,
    InteractionRule, KnowledgeBase, KnowledgeBaseHandle,
};
pub use routine::analysis::{
    analyze_ingredient_list, compare_products, IngredientListAnalysis, ProductComparison,
};
pub use routine::RoutineBuilder;
