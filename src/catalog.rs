//! Operation catalog exposed as MCP resources.
//!
//! The catalog is a JSON list of categories, each naming the operations it
//! holds. A default copy ships inside the binary; `--catalog` swaps in a file
//! exported from a different engine build.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const EMBEDDED_CATALOG: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/catalog/categories.json"
));

/// Operation entry as listed for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Category {
    name: String,
    #[serde(default)]
    operations: Vec<OperationInfo>,
}

/// Category entry returned by [`OperationCatalog::categories`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub operation_count: usize,
}

#[derive(Debug, Clone)]
pub struct OperationCatalog {
    categories: Vec<Category>,
}

impl OperationCatalog {
    /// Catalog compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_CATALOG).context("parse embedded operation catalog")
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read operation catalog {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parse operation catalog {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let categories: Vec<Category> = serde_json::from_str(text)?;
        if let Some(blank) = categories.iter().position(|c| c.name.trim().is_empty()) {
            return Err(anyhow!("category {blank} has an empty name"));
        }
        Ok(Self { categories })
    }

    /// Categories in catalog order.
    pub fn categories(&self) -> Vec<CategorySummary> {
        self.categories
            .iter()
            .map(|category| CategorySummary {
                name: category.name.clone(),
                operation_count: category.operations.len(),
            })
            .collect()
    }

    /// Operations of one category, matched ignoring ASCII case.
    pub fn operations_by_category(&self, category: &str) -> Result<Vec<OperationInfo>> {
        let wanted = category.trim();
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(wanted))
            .map(|c| c.operations.clone())
            .ok_or_else(|| anyhow!("unknown operation category: {category}"))
    }
}
