//! # Repository Module
//!
//! Database repository implementations for Shiftbook.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Register actor / HTTP read handler                                    │
//! │       │                                                                 │
//! │       │  db.orders().list(register_id, Some(shift_id))                 │
//! │       ▼                                                                 │
//! │  OrderRepository                     ShiftRepository                   │
//! │  ├── insert_completed(order, shift)  ├── insert(shift, register)       │
//! │  ├── get_by_id(register, id)         ├── close(shift)                  │
//! │  ├── list(register, shift_id?)       ├── get_by_id / get_active        │
//! │  └── next_sequence(prefix)           └── list / closed_ids             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are read into private `*Row` structs and converted into core types;
//! SQL stays in this module.

pub mod order;
pub mod shift;
