//! lexaudit Core
//!
//! Core types, the check contract, status aggregation, and error handling for
//! the lexaudit control evaluation engine.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod report;
pub mod traits;

pub use aggregate::{aggregate, aggregate_statuses};
pub use config::*;
pub use error::{LexauditError, Result};
pub use report::*;
pub use traits::*;
