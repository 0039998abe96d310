use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::product::ProductKind;
use crate::errors::DomainError;

/// Raw product entry as it appears in an import file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub kind: ProductKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub germination_period: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
    /// Skip products that fail validation and keep loading.
    #[default]
    Lenient,
    /// Abort the whole load on the first invalid product.
    Strict,
}

/// A product that was left out of the catalog during import.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImportIssue {
    pub category: String,
    pub product: String,
    pub error_class: &'static str,
    pub message: String,
}

impl ImportIssue {
    pub fn new(category: &str, product: &str, error: &DomainError) -> Self {
        Self {
            category: category.to_string(),
            product: product.to_string(),
            error_class: error.error_class(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
    #[error("product `{product}` in category `{category}` rejected: {source}")]
    Rejected { category: String, product: String, source: DomainError },
}

pub fn load_records(path: &Path) -> Result<Vec<CategoryRecord>, ImportError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ImportError::ReadFile { path: path.to_path_buf(), source })?;

    parse_records(&raw)
        .map_err(|source| ImportError::ParseFile { path: path.to_path_buf(), source })
}

pub fn parse_records(raw: &str) -> Result<Vec<CategoryRecord>, serde_json::Error> {
    serde_json::from_str(raw)
}
