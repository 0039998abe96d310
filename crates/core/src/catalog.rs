use std::path::Path;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::category::Category;
use crate::domain::order::Order;
use crate::domain::product::{PriceChange, PriceDropApproval, Product};
use crate::errors::DomainError;
use crate::import::{load_records, CategoryRecord, ImportError, ImportIssue, ImportPolicy};

/// Counters that live for one catalog session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogSession {
    categories_created: u64,
}

impl CatalogSession {
    pub fn categories_created(&self) -> u64 {
        self.categories_created
    }

    pub(crate) fn register_category(&mut self) {
        self.categories_created += 1;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderReceipt {
    pub product: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub fulfilled: bool,
    pub remaining_stock: u32,
    pub summary: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub unique_products: usize,
    pub units: u64,
    pub average_price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogStatistics {
    pub categories_created: u64,
    pub unique_products: usize,
    pub total_units: u64,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug)]
pub struct ImportOutcome {
    pub catalog: Catalog,
    pub issues: Vec<ImportIssue>,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    session: CatalogSession,
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path, policy: ImportPolicy) -> Result<ImportOutcome, ImportError> {
        let records = load_records(path)?;
        Self::from_records(records, policy)
    }

    /// Builds a catalog from raw records, merging duplicate product names per category.
    pub fn from_records(
        records: impl IntoIterator<Item = CategoryRecord>,
        policy: ImportPolicy,
    ) -> Result<ImportOutcome, ImportError> {
        let mut catalog = Self::new();
        let mut issues = Vec::new();

        for record in records {
            let category = catalog.add_category(record.name, record.description);

            for product_record in Product::deduplicate(record.products) {
                let added = Product::from_record(&product_record)
                    .and_then(|product| category.add_product(product));

                let Err(error) = added else {
                    continue;
                };

                if policy == ImportPolicy::Strict {
                    return Err(ImportError::Rejected {
                        category: category.name.clone(),
                        product: product_record.name,
                        source: error,
                    });
                }

                warn!(
                    category = %category.name,
                    product = %product_record.name,
                    error_class = error.error_class(),
                    error = %error,
                    "skipped product during import"
                );
                issues.push(ImportIssue::new(&category.name, &product_record.name, &error));
            }
        }

        info!(
            categories = catalog.categories.len(),
            skipped = issues.len(),
            "catalog imported"
        );
        Ok(ImportOutcome { catalog, issues })
    }

    pub fn session(&self) -> &CatalogSession {
        &self.session
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn add_category(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> &mut Category {
        let category = Category::new(&mut self.session, name, description);
        let index = self.categories.len();
        self.categories.push(category);
        &mut self.categories[index]
    }

    /// First product with this name, searching categories in order.
    pub fn find_product(&self, name: &str) -> Option<&Product> {
        self.categories.iter().find_map(|category| category.find_product(name))
    }

    pub fn find_product_mut(&mut self, name: &str) -> Option<&mut Product> {
        self.categories.iter_mut().find_map(|category| category.find_product_mut(name))
    }

    /// `None` when no product carries `name`.
    pub fn change_price<A>(
        &mut self,
        name: &str,
        new_price: Decimal,
        approval: &mut A,
    ) -> Option<Result<PriceChange, DomainError>>
    where
        A: PriceDropApproval + ?Sized,
    {
        let product = self.find_product_mut(name)?;
        Some(product.set_price(new_price, approval))
    }

    /// `None` when no product carries `name`. A fulfilled order takes the
    /// ordered units out of stock; an unfulfillable one leaves stock as is.
    pub fn place_order(
        &mut self,
        name: &str,
        quantity: u32,
    ) -> Option<Result<OrderReceipt, DomainError>> {
        let product = self.find_product_mut(name)?;
        Some(fulfil_order(product, quantity))
    }

    pub fn statistics(&self) -> CatalogStatistics {
        let categories: Vec<CategorySummary> = self
            .categories
            .iter()
            .map(|category| CategorySummary {
                name: category.name.clone(),
                unique_products: category.unique_products(),
                units: category.product_count(),
                average_price: category.average_price(),
            })
            .collect();

        CatalogStatistics {
            categories_created: self.session.categories_created(),
            unique_products: categories.iter().map(|summary| summary.unique_products).sum(),
            total_units: categories.iter().map(|summary| summary.units).sum(),
            categories,
        }
    }
}

fn fulfil_order(product: &mut Product, quantity: u32) -> Result<OrderReceipt, DomainError> {
    let (total, fulfilled, summary) = {
        let order = Order::new(product, quantity)?;
        (order.total_price()?, order.can_fulfill(), order.to_string())
    };

    if fulfilled {
        product.set_stock_quantity(product.stock_quantity() - quantity);
        info!(product = %product.name, quantity, %total, "order placed");
    } else {
        warn!(
            product = %product.name,
            quantity,
            stock = product.stock_quantity(),
            "order exceeds available stock"
        );
    }

    Ok(OrderReceipt {
        product: product.name.clone(),
        quantity,
        unit_price: product.price(),
        total,
        fulfilled,
        remaining_stock: product.stock_quantity(),
        summary,
    })
}
