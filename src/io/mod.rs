//! File input and output.

/// CSV and JSON export of BOS and LCOE results.
pub mod export;
pub mod weather;
pub mod workbook;
