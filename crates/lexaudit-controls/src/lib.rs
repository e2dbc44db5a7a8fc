//! Control catalog and host checks for lexaudit
//!
//! Joins technical checks to the legal and standards provisions they evidence.
//!
//! # Features
//!
//! - Static catalog of controls, each citing statutes and ISO/IEC 27001 clauses
//! - Coverage matrix (norm → controls) for audit presentation
//! - Disk encryption, SSH root login, and log immutability checks
//! - Timeout-bounded execution of external diagnostic tools
//!
//! # Example
//!
//! ```no_run
//! use lexaudit_controls::{default_checks, ControlRegistry};
//! use lexaudit_core::EvaluationConfig;
//!
//! let registry = ControlRegistry::builtin()?;
//! for (norm, entries) in registry.matrix().iter() {
//!     println!("{}: {}", norm, entries.join(", "));
//! }
//!
//! let checks = default_checks(&EvaluationConfig::default())?;
//! println!("{} checks registered", checks.len());
//! # Ok::<(), lexaudit_core::LexauditError>(())
//! ```

pub mod catalog;
pub mod checks;
pub mod matrix;

pub use catalog::{builtin_controls, Control, ControlRegistry};
pub use checks::{
    default_checks, CheckCategory, CheckRegistry, DISK_ENCRYPTION,
    LOG_IMMUTABILITY, SSH_ROOT_LOGIN,
};
pub use matrix::{citation_summary, LegalMatrix, LegalMatrixBuilder};
