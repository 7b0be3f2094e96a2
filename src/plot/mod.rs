//! Terminal plotting for `gwt show`.

mod ascii;

pub use ascii::*;
