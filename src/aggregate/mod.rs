//! Stats aggregation.
//!
//! Reads every file in the stats directory and folds the parsed contents
//! into one combined mapping.

pub mod aggregator;

pub use aggregator::*;
