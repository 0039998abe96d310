use std::fmt;

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::product::Product;
use crate::errors::DomainError;

/// A purchase request for one product. Borrows the product for its lifetime.
#[derive(Clone, Copy, Debug)]
pub struct Order<'a> {
    product: &'a Product,
    quantity: u32,
}

impl<'a> Order<'a> {
    pub fn new(product: &'a Product, quantity: u32) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::zero_quantity(format!("order for `{}`", product.name)));
        }

        Ok(Self { product, quantity })
    }

    pub fn product(&self) -> &'a Product {
        self.product
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn total_price(&self) -> Result<Decimal, DomainError> {
        self.product.price().checked_mul(Decimal::from(self.quantity)).ok_or_else(|| {
            DomainError::Validation(format!(
                "total for {} x `{}` is out of range",
                self.quantity, self.product.name
            ))
        })
    }

    /// Only strictly less than the stock on hand can be ordered.
    pub fn can_fulfill(&self) -> bool {
        let fulfillable = self.quantity < self.product.stock_quantity();
        debug!(
            product = %self.product.name,
            quantity = self.quantity,
            stock = self.product.stock_quantity(),
            fulfillable,
            "order evaluated"
        );
        fulfillable
    }
}

impl fmt::Display for Order<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.can_fulfill() {
            return f.write_str("Not enough stock to fulfil this order");
        }

        write!(f, "Product: {}\nQuantity: {}\nTotal: ", self.product, self.quantity)?;
        match self.total_price() {
            Ok(total) => write!(f, "{total}"),
            Err(_) => f.write_str("out of range"),
        }
    }
}
