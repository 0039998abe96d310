use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::product::ProductKind;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid price {price}: price must be greater than zero")]
    InvalidPrice { price: Decimal },
    #[error("zero quantity is not allowed: {context}")]
    ZeroQuantity { context: String },
    #[error("{kind} record is missing required field `{field}`")]
    MissingField { kind: ProductKind, field: &'static str },
    #[error("cannot combine a {left} product with a {right} product")]
    TypeMismatch { left: ProductKind, right: ProductKind },
}

impl DomainError {
    pub fn zero_quantity(context: impl Into<String>) -> Self {
        Self::ZeroQuantity { context: context.into() }
    }

    /// Stable machine-readable class used by command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidPrice { .. } | Self::TypeMismatch { .. } => {
                "validation"
            }
            Self::ZeroQuantity { .. } => "zero_quantity",
            Self::MissingField { .. } => "missing_field",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("import failure: {0}")]
    Import(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(error) => error.error_class(),
            Self::Import(_) => "import",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::ZeroQuantity { .. }) => {
                "Quantity must be greater than zero. Adjust the amount and try again."
            }
            Self::Domain(_) => "The request could not be processed. Check inputs and try again.",
            Self::Import(_) => "The catalog file could not be imported.",
            Self::Configuration(_) => "The configuration is invalid.",
        }
    }
}
