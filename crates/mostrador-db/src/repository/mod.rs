//! # Repository Module
//!
//! Database repository implementations for Mostrador POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller (web handler, engine, test)                                    │
//! │       │                                                                 │
//! │       │  db.products().search("cola", None, 20)                        │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── search(&self, query, category, limit)                             │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, new)                                                │
//! │  └── update(&self, product)                                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  The sale and movement engines sit one level above: they compose       │
//! │  several repository primitives inside a single transaction.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product CRUD, search, stock primitives
//! - [`catalog::CatalogRepository`] - Categories, units, warehouses, payment
//!   methods and movement types
//! - [`supplier::SupplierRepository`] - Supplier CRUD
//! - [`stock::StockRepository`] - Per-warehouse stock ledger lookups
//! - [`invoice::InvoiceRepository`] - Invoice history and cancellation
//! - [`movement::MovementRepository`] - Movement history
//! - [`report::ReportRepository`] - Aggregated reporting queries
//! - [`user::UserRepository`] - Users and credential verification

pub mod catalog;
pub mod invoice;
pub mod movement;
pub mod product;
pub mod report;
pub mod stock;
pub mod supplier;
pub mod user;
