//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Caller (API handler, seed tool)                                       │
//! │       │                                                                 │
//! │       │  db.products().find_by_name("TV")                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── create(&self, product)                                            │
//! │  ├── find_by_name(&self, name) / find_by_id(&self, id)                 │
//! │  ├── get_all(&self) / stream_all(&self)                                │
//! │  ├── update(&self, product) / update_with_cancellation(..)             │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  Parameterized statement (statements.rs)                       │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD

pub mod product;
