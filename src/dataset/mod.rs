//! # Dataset Module
//!
//! Turns the raw cell text of a document table into a rectangular dataset:
//! column names that are unique and non-empty, followed by string data rows.
pub(crate) mod header;
pub(crate) mod table;
