use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::DomainError;
use crate::import::ProductRecord;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    #[default]
    Base,
    Device,
    Seed,
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Base => "base",
            Self::Device => "device",
            Self::Seed => "seed",
        };
        f.write_str(label)
    }
}

/// Variant-specific payload carried next to the shared product fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ProductVariant {
    #[default]
    Base,
    Device {
        efficiency: Decimal,
        model: String,
        memory_gb: u32,
    },
    Seed {
        country: String,
        germination_days: u32,
    },
}

impl ProductVariant {
    pub fn kind(&self) -> ProductKind {
        match self {
            Self::Base => ProductKind::Base,
            Self::Device { .. } => ProductKind::Device,
            Self::Seed { .. } => ProductKind::Seed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PriceChange {
    Updated { previous: Decimal, current: Decimal },
    Declined { current: Decimal, proposed: Decimal },
}

/// Asked before a price is lowered. Returning `false` keeps the current price.
pub trait PriceDropApproval {
    fn approve(&mut self, product: &Product, proposed: Decimal) -> bool;
}

impl<F> PriceDropApproval for F
where
    F: FnMut(&Product, Decimal) -> bool,
{
    fn approve(&mut self, product: &Product, proposed: Decimal) -> bool {
        self(product, proposed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub name: String,
    pub description: String,
    pub color: Option<String>,
    pub variant: ProductVariant,
    price: Decimal,
    stock_quantity: u32,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        stock_quantity: u32,
    ) -> Result<Self, DomainError> {
        if price <= Decimal::ZERO {
            return Err(DomainError::InvalidPrice { price });
        }
        let name = name.into();
        stock_value_of(&name, price, stock_quantity)?;

        Ok(Self {
            name,
            description: description.into(),
            color: None,
            variant: ProductVariant::Base,
            price,
            stock_quantity,
        })
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_variant(mut self, variant: ProductVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn kind(&self) -> ProductKind {
        self.variant.kind()
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn stock_quantity(&self) -> u32 {
        self.stock_quantity
    }

    /// Non-positive prices, and prices whose stock value leaves the `Decimal` range,
    /// are rejected outright. A lower price needs approval.
    pub fn set_price<A>(
        &mut self,
        new_price: Decimal,
        approval: &mut A,
    ) -> Result<PriceChange, DomainError>
    where
        A: PriceDropApproval + ?Sized,
    {
        if new_price <= Decimal::ZERO {
            warn!(product = %self.name, price = %new_price, "rejected non-positive price");
            return Err(DomainError::InvalidPrice { price: new_price });
        }
        if let Err(error) = stock_value_of(&self.name, new_price, self.stock_quantity) {
            warn!(product = %self.name, price = %new_price, "rejected out of range price");
            return Err(error);
        }

        if new_price < self.price && !approval.approve(self, new_price) {
            info!(
                product = %self.name,
                current = %self.price,
                proposed = %new_price,
                "price drop declined"
            );
            return Ok(PriceChange::Declined { current: self.price, proposed: new_price });
        }

        let previous = std::mem::replace(&mut self.price, new_price);
        info!(product = %self.name, %previous, current = %new_price, "price updated");
        Ok(PriceChange::Updated { previous, current: new_price })
    }

    pub fn set_stock_quantity(&mut self, new_quantity: u32) {
        self.stock_quantity = new_quantity;
    }

    /// Combined stock value of two products of the same kind.
    pub fn combine_value(&self, other: &Product) -> Result<Decimal, DomainError> {
        if self.kind() != other.kind() {
            return Err(DomainError::TypeMismatch { left: self.kind(), right: other.kind() });
        }

        self.stock_value()?.checked_add(other.stock_value()?).ok_or_else(|| {
            DomainError::Validation(format!(
                "combined stock value of `{}` and `{}` is out of range",
                self.name, other.name
            ))
        })
    }

    pub fn stock_value(&self) -> Result<Decimal, DomainError> {
        stock_value_of(&self.name, self.price, self.stock_quantity)
    }

    pub fn from_record(record: &ProductRecord) -> Result<Self, DomainError> {
        let variant = match record.kind {
            ProductKind::Base => ProductVariant::Base,
            ProductKind::Device => ProductVariant::Device {
                efficiency: required(record.efficiency, ProductKind::Device, "efficiency")?,
                model: required(record.model.clone(), ProductKind::Device, "model")?,
                memory_gb: required(record.memory, ProductKind::Device, "memory")?,
            },
            ProductKind::Seed => ProductVariant::Seed {
                country: required(record.country.clone(), ProductKind::Seed, "country")?,
                germination_days: required(
                    record.germination_period,
                    ProductKind::Seed,
                    "germination_period",
                )?,
            },
        };

        let mut product =
            Self::new(&record.name, &record.description, record.price, record.quantity)?
                .with_variant(variant);
        product.color = record.color.clone();
        Ok(product)
    }

    pub fn to_record(&self) -> ProductRecord {
        let mut record = ProductRecord {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            quantity: self.stock_quantity,
            color: self.color.clone(),
            kind: self.kind(),
            ..ProductRecord::default()
        };

        match &self.variant {
            ProductVariant::Base => {}
            ProductVariant::Device { efficiency, model, memory_gb } => {
                record.efficiency = Some(*efficiency);
                record.model = Some(model.clone());
                record.memory = Some(*memory_gb);
            }
            ProductVariant::Seed { country, germination_days } => {
                record.country = Some(country.clone());
                record.germination_period = Some(*germination_days);
            }
        }

        record
    }

    /// Merges records sharing a name: the highest price wins and quantities add up.
    /// Merged entries keep the position of their first occurrence.
    pub fn deduplicate(records: impl IntoIterator<Item = ProductRecord>) -> Vec<ProductRecord> {
        let mut unique: Vec<ProductRecord> = Vec::new();

        for record in records {
            match unique.iter_mut().find(|existing| existing.name == record.name) {
                Some(existing) => {
                    existing.price = existing.price.max(record.price);
                    existing.quantity = existing.quantity.saturating_add(record.quantity);
                }
                None => unique.push(record),
            }
        }

        unique
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} RUB. Remaining: {} pcs.", self.name, self.price, self.stock_quantity)
    }
}

fn stock_value_of(name: &str, price: Decimal, quantity: u32) -> Result<Decimal, DomainError> {
    price.checked_mul(Decimal::from(quantity)).ok_or_else(|| {
        DomainError::Validation(format!("stock value of `{name}` at {price} is out of range"))
    })
}

fn required<T>(value: Option<T>, kind: ProductKind, field: &'static str) -> Result<T, DomainError> {
    value.ok_or(DomainError::MissingField { kind, field })
}
