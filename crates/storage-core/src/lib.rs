//! # storage-core: Domain Types for the Product Store
//!
//! This crate holds the domain side of the storage workspace. It contains the
//! `Product` entity, its validation rules and the domain error types, with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storage Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Callers (API handlers, CLI tools)                  │   │
//! │  │    validate ──► create / find / update / delete                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ storage-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │      ┌───────────┐      ┌────────────┐      ┌───────────┐      │   │
//! │  │      │   types   │      │ validation │      │   error   │      │   │
//! │  │      │  Product  │      │   rules    │      │ CoreError │      │   │
//! │  │      └───────────┘      └────────────┘      └───────────┘      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   storage-db (Database Layer)                   │   │
//! │  │              SQLite pool, statements, ProductRepository         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product)
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation applied before persistence
//!
//! ## Example Usage
//!
//! ```rust
//! use storage_core::Product;
//! use storage_core::validation::validate_product;
//!
//! let tv = Product::new("TV", "Smart", 1, 10.0);
//! assert!(validate_product(&tv).is_ok());
//!
//! // Not stored yet: the store assigns the id on insert.
//! assert!(!tv.is_persisted());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a product name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a product type label.
pub const MAX_TYPE_LEN: usize = 100;
