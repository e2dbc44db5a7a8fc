//! Evaluation engine for lexaudit controls
//!
//! Runs the check behind each catalog control and joins its verdict with the
//! control's citations.

mod output;
mod runner;

pub use output::*;
pub use runner::*;
