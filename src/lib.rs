//! # Rusty Docx
//!
//! Extracts the last table of a Word document (`.docx`) as a rectangular dataset of
//! strings, with optional first-row-as-header handling.
//!
//! ## Features
//!
//! - **Last table only**: the last table that is a direct child of the document body is
//!   read; nested tables and tables wrapped in content controls are ignored
//! - **Header normalization**: column names derived from the first row are trimmed,
//!   blank ones become `Unnamed_<n>` and repeated ones get `_2`, `_3`, ... suffixes
//! - **Generated headers**: without a header row the columns are named `Column_1 .. Column_n`
//! - **Explicit outcomes**: a table, an expected absence (no table, empty table) or a
//!   diagnostic for unreadable input; the extractor never panics on malformed bytes
//! - **Precise diagnostics**: password-protected packages, legacy `.doc` files and
//!   non-Word OOXML packages are recognised and reported as such
//! - **Pure Rust implementation**: streaming XML parsing of the package held in memory
//!
//! ## Example
//!
//! ```no_run
//! use rusty_docx::{extract_last_table, Extraction};
//!
//! let bytes = std::fs::read("report.docx").unwrap();
//! match extract_last_table(&bytes, true) {
//!     Extraction::Table(table) => println!("{}", rusty_docx::render::grid(&table)),
//!     Extraction::Absent(absence) => println!("{absence}"),
//!     Extraction::Unparseable(message) => eprintln!("{message}"),
//! }
//! ```
mod dataset;
mod document;
mod error;
mod extractor;
mod helpers;
pub mod render;
mod session;

pub use crate::dataset::header::default_headers;
pub use crate::dataset::header::normalize_headers;
pub use crate::dataset::table::ResultTable;
pub use crate::extractor::extract_last_table;
pub use crate::extractor::Absence;
pub use crate::extractor::ExtractRequest;
pub use crate::extractor::Extraction;
pub use crate::extractor::DEFAULT_HEADER_MODE;
pub use crate::session::Session;
pub use crate::session::SessionStatus;
pub use crate::session::StatusKind;

/// Extracts the last table for a request; see [`extract_last_table`].
pub fn extract(request: &ExtractRequest) -> Extraction {
    request.extract()
}
