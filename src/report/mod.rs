//! Reporting utilities: run summaries and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

mod format;

pub use format::*;
