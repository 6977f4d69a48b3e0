//! Facet indicators over comparator output.

pub mod facets;
pub mod filter;
pub mod listing;
pub mod report;
pub mod stats;
pub mod types;
