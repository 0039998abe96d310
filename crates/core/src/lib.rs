pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod import;

pub use catalog::{
    Catalog, CatalogSession, CatalogStatistics, CategorySummary, ImportOutcome, OrderReceipt,
};
pub use domain::category::{Category, ProductCursor};
pub use domain::order::Order;
pub use domain::product::{PriceChange, PriceDropApproval, Product, ProductKind, ProductVariant};
pub use errors::{ApplicationError, DomainError};
pub use import::{CategoryRecord, ImportError, ImportIssue, ImportPolicy, ProductRecord};
