//! Knowledge base: the ingredient catalog plus the interaction graph over it.
//!
//! Both halves are built once, validated at load time, and read-only afterwards. Any
//! invariant violation is a [`KnowledgeBaseError`] and should halt startup.

pub mod catalog;
pub mod graph;

use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::info;

use crate::domain::ingredient::Ingredient;
use crate::errors::KnowledgeBaseError;

pub use catalog::{normalize_key, AliasPattern, IngredientCatalog, IngredientFilter};
pub use graph::{InteractionGraph, InteractionRule};

const BUILTIN_KNOWLEDGE_BASE: &str = include_str!("../../data/knowledge_base.toml");

static SHARED: OnceLock<KnowledgeBase> = OnceLock::new();

#[derive(Clone, Debug, Deserialize)]
struct KnowledgeBaseFile {
    #[serde(default)]
    ingredients: Vec<Ingredient>,
    #[serde(default)]
    interactions: Vec<InteractionRule>,
}

#[derive(Clone, Debug)]
pub struct KnowledgeBase {
    catalog: IngredientCatalog,
    graph: InteractionGraph,
}

impl KnowledgeBase {
    pub fn new(
        ingredients: Vec<Ingredient>,
        rules: Vec<InteractionRule>,
    ) -> Result<Self, KnowledgeBaseError> {
        let catalog = IngredientCatalog::new(ingredients)?;
        let graph = InteractionGraph::new(&catalog, rules)?;
        Ok(Self { catalog, graph })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, KnowledgeBaseError> {
        let file: KnowledgeBaseFile = toml::from_str(raw)?;
        Self::new(file.ingredients, file.interactions)
    }

    pub fn from_path(path: &Path) -> Result<Self, KnowledgeBaseError> {
        let raw = std::fs::read_to_string(path).map_err(|source| KnowledgeBaseError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let knowledge_base = Self::from_toml_str(&raw)?;
        knowledge_base.log_loaded(&path.display().to_string());
        Ok(knowledge_base)
    }

    /// The knowledge base compiled into this crate.
    pub fn builtin() -> Result<Self, KnowledgeBaseError> {
        let knowledge_base = Self::from_toml_str(BUILTIN_KNOWLEDGE_BASE)?;
        knowledge_base.log_loaded("builtin");
        Ok(knowledge_base)
    }

    /// Process-wide built-in knowledge base, loaded on first use.
    pub fn shared() -> Result<&'static KnowledgeBase, KnowledgeBaseError> {
        if let Some(knowledge_base) = SHARED.get() {
            return Ok(knowledge_base);
        }
        let loaded = Self::builtin()?;
        Ok(SHARED.get_or_init(|| loaded))
    }

    /// Load from `path` when given, otherwise fall back to the shared built-in base.
    pub fn load(path: Option<&Path>) -> Result<KnowledgeBaseHandle, KnowledgeBaseError> {
        match path {
            Some(path) => Ok(KnowledgeBaseHandle::Owned(Box::new(Self::from_path(path)?))),
            None => Ok(KnowledgeBaseHandle::Shared(Self::shared()?)),
        }
    }

    pub fn catalog(&self) -> &IngredientCatalog {
        &self.catalog
    }

    pub fn graph(&self) -> &InteractionGraph {
        &self.graph
    }

    fn log_loaded(&self, source: &str) {
        info!(
            event_name = "knowledge_base.loaded",
            source,
            ingredients = self.catalog.len(),
            interactions = self.graph.len(),
            "knowledge base loaded"
        );
    }
}

/// Either the shared built-in base or one loaded from a file for this process.
#[derive(Debug)]
pub enum KnowledgeBaseHandle {
    Shared(&'static KnowledgeBase),
    Owned(Box<KnowledgeBase>),
}

impl std::ops::Deref for KnowledgeBaseHandle {
    type Target = KnowledgeBase;

    fn deref(&self) -> &KnowledgeBase {
        match self {
            Self::Shared(knowledge_base) => knowledge_base,
            Self::Owned(knowledge_base) => knowledge_base,
        }
    }
}
