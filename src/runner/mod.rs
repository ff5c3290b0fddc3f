//! Bootstrap orchestration and reporting.

pub mod bootstrap;
pub mod report;

pub use bootstrap::{Bootstrap, RunOptions};
pub use report::Report;
