//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the dataset descriptors (`Dataset`, `Field`, axis specs)
//! - normalized raw observations (`RawRecord`, `RecordDate`, `RawValue`)
//! - the filtered, plot-ready output (`DerivedSeries`, `SeriesPoint`)

pub mod types;

pub use types::*;
