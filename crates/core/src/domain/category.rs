use std::fmt;

use rust_decimal::Decimal;

use crate::catalog::CatalogSession;
use crate::domain::product::Product;
use crate::errors::DomainError;
use crate::import::ProductRecord;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub description: String,
    products: Vec<Product>,
    unique_products: usize,
}

impl Category {
    pub fn new(
        session: &mut CatalogSession,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        session.register_category();
        Self::unregistered(name, description)
    }

    fn unregistered(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            products: Vec::new(),
            unique_products: 0,
        }
    }

    /// Creates a category holding one product built from `seed`.
    pub fn with_seed(
        session: &mut CatalogSession,
        name: impl Into<String>,
        description: impl Into<String>,
        seed: &ProductRecord,
    ) -> Result<Self, DomainError> {
        let product = Product::from_record(seed)?;
        let mut category = Self::unregistered(name, description);
        category.add_product(product)?;
        session.register_category();
        Ok(category)
    }

    pub fn add_product(&mut self, product: Product) -> Result<(), DomainError> {
        if product.name.trim().is_empty() {
            return Err(DomainError::Validation(format!(
                "product added to category `{}` must have a name",
                self.name
            )));
        }
        if product.stock_quantity() == 0 {
            return Err(DomainError::zero_quantity(format!(
                "product `{}` has no stock to add to category `{}`",
                product.name, self.name
            )));
        }

        self.products.push(product);
        self.unique_products += 1;
        Ok(())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn unique_products(&self) -> usize {
        self.unique_products
    }

    pub fn find_product(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.name == name)
    }

    pub fn find_product_mut(&mut self, name: &str) -> Option<&mut Product> {
        self.products.iter_mut().find(|product| product.name == name)
    }

    /// Total units in stock across every product, not the number of entries.
    pub fn product_count(&self) -> u64 {
        self.products.iter().map(|product| u64::from(product.stock_quantity())).sum()
    }

    /// Arithmetic mean of the unit prices. Saturates at `Decimal::MAX`.
    pub fn average_price(&self) -> Decimal {
        if self.products.is_empty() {
            return Decimal::ZERO;
        }

        let count = Decimal::from(self.products.len());
        let total = self
            .products
            .iter()
            .try_fold(Decimal::ZERO, |total, product| total.checked_add(product.price()));

        match total {
            Some(total) => total / count,
            // The plain sum overflowed; add up each product's share instead.
            None => self.products.iter().fold(Decimal::ZERO, |total, product| {
                total.saturating_add(product.price() / count)
            }),
        }
    }

    pub fn iter(&self) -> ProductCursor<'_> {
        ProductCursor { products: &self.products, position: 0 }
    }

    pub fn describe_detailed(&self, session: &CatalogSession) -> String {
        format!(
            "Name: {}\nDescription: {}\nProducts:\n{}\nTotal categories: {}\nUnique products: {}",
            self.name,
            self.description,
            self.list_products_text(),
            session.categories_created(),
            self.unique_products
        )
    }

    pub fn list_products_text(&self) -> String {
        self.products.iter().map(Product::to_string).collect::<Vec<_>>().join("\n")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, product count: {} pcs.", self.name, self.product_count())
    }
}

impl<'a> IntoIterator for &'a Category {
    type Item = &'a Product;
    type IntoIter = ProductCursor<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Index-based cursor over a category's products in insertion order.
#[derive(Clone, Debug)]
pub struct ProductCursor<'a> {
    products: &'a [Product],
    position: usize,
}

impl ProductCursor<'_> {
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

impl<'a> Iterator for ProductCursor<'a> {
    type Item = &'a Product;

    fn next(&mut self) -> Option<Self::Item> {
        let product = self.products.get(self.position)?;
        self.position += 1;
        Some(product)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.products.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ProductCursor<'_> {}
