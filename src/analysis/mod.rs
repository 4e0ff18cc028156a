//! Post-processing of parsed time series.
//!
//! Submodules:
//! - `core_data`: flattens `TimeSeriesRecord`s into `CoreRecord`s.

pub mod core_data;
