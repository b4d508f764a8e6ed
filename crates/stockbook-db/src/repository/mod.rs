//! # Repository Module
//!
//! Database repository implementations for Stockbook.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Database::load_snapshot / save_snapshot                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductRepository   products      list, get, count                    │
//! │  SaleRepository      sale_lines    list, get_lines, total_on           │
//! │  CashRepository      cash_entries  list, list_for_day                  │
//! │       │                                                                 │
//! │       │  each also has replace_all(conn, rows) for the save            │
//! │       │  transaction                                                    │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are decoded into private `*Row` structs (`sqlx::FromRow`) and then
//! converted into the core types, so the core never sees column names.

pub mod cash;
pub mod product;
pub mod sale;
