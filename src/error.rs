use thiserror::Error;

/// Main error type for the Rusty Docx crate.
/// Aggregates errors from various sources including standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub(crate) enum RustyDocxError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    CfbHelperError(#[from] crate::helpers::cfb::CfbError),

    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Document module errors
    #[error("{0}")]
    DocumentError(#[from] crate::document::DocumentError),

    #[error("{0}")]
    TableError(#[from] crate::dataset::table::TableError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RustyDocxError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RustyDocxError::WithContextError(format!("{}: {}", message, e)))
    }
}
