//! CSV import of measured PV power and export of results.

pub mod export;
pub mod import;
