//! # Validation Module
//!
//! Field validation for products, applied by callers before a value reaches
//! the repository.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (API handler, seed tool)                              │
//! │  └── THIS MODULE: field rules                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: ProductRepository                                            │
//! │  └── No checks, trusts the caller                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL constraints                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storage_core::validation::{validate_count, validate_product_name};
//!
//! validate_product_name("TV").unwrap();
//! assert!(validate_count(-1).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Product;
use crate::{MAX_NAME_LEN, MAX_TYPE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use storage_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Smart TV 55\"").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, MAX_NAME_LEN)
}

/// Validates a product type label (same rules, at most 100 characters).
pub fn validate_product_type(product_type: &str) -> ValidationResult<()> {
    validate_text("type", product_type, MAX_TYPE_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock count. Zero is allowed.
pub fn validate_count(count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "count".to_string(),
        });
    }

    Ok(())
}

/// Validates a price.
///
/// ## Rules
/// - Must be finite (no NaN, no infinity)
/// - Must be non-negative; zero is allowed (free items)
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "price".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates every field of a product. The id is not inspected.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_product_type(&product.product_type)?;
    validate_count(product.count)?;
    validate_price(product.price)?;
    Ok(())
}

/// Validates a product that is about to replace a stored row.
///
/// Same field rules as [`validate_product`], plus the id must be set.
pub fn validate_stored_product(product: &Product) -> CoreResult<()> {
    if !product.is_persisted() {
        return Err(CoreError::NotPersisted(product.name.clone()));
    }

    validate_product(product)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
