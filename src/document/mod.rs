//! # Document Module
//!
//! Opens a WordprocessingML (`.docx`) package held in memory, validates that its main
//! part really is a Word document and scans that part for tables.
//!
//! Files that are not ZIP packages are sniffed for the OLE compound-file signature
//! first, so that password-protected documents and legacy binary `.doc` files get a
//! precise diagnostic instead of a generic ZIP error.
use crate::document::package::ContentTypes;
use crate::document::package::WORD_DOCUMENT_CONTENT_TYPES;
use crate::document::table::TableScan;
use crate::error::ResultMessage;
use crate::error::RustyDocxError;
use crate::helpers::cfb::Cfb;
use crate::helpers::zip::ZipHelper;
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

pub(crate) mod package;
pub(crate) mod table;

/// Stream present in the compound file of an encrypted OOXML package
const ENCRYPTED_PACKAGE_STREAM: &str = "EncryptedPackage";
/// Stream present in a Word 97-2003 binary document
const WORD_DOCUMENT_STREAM: &str = "WordDocument";

/// Error types specific to Word document processing
#[derive(Error, Debug)]
pub(crate) enum DocumentError {
    #[error("Empty file")]
    EmptyFileError,

    #[error("The document is password protected")]
    PasswordProtectedError,

    #[error("Legacy binary Word documents (.doc) are not supported")]
    LegacyFormatError,

    #[error("Compound file is not a Word document")]
    CompoundFileError,

    #[error("Missing package part '{0}'")]
    MissingPartError(String),

    #[error("Package has no main document relationship")]
    MainDocumentNotFoundError,

    #[error("File is not a Word document, content type is '{0}'")]
    ContentTypeError(String),

    #[error("Unexpected end of XML part")]
    TruncatedPartError,
}

/// An opened Word document package borrowing the caller's bytes
pub(crate) struct Document<'a> {
    /// ZIP archive over the document bytes
    zip: ZipArchive<Cursor<&'a [u8]>>,
    /// Zip path of the main document part
    main_part: String,
}

impl<'a> Document<'a> {
    /// Opens a document from its bytes and validates the package structure
    ///
    /// # Arguments
    /// * `bytes` - Complete content of the `.docx` file
    ///
    /// # Returns
    /// * `Result<Self, RustyDocxError>` - Document handle or the reason it is unreadable
    pub(crate) fn open(bytes: &'a [u8]) -> Result<Self, RustyDocxError> {
        if bytes.is_empty() {
            Err(DocumentError::EmptyFileError)?;
        }
        if Cfb::is_compound_file(bytes) {
            Err(classify_compound_file(bytes)?)?;
        }

        let mut zip = ZipArchive::new(Cursor::new(bytes))
            .map_err(RustyDocxError::from)
            .with_prefix("Not a valid .docx package")?;
        let main_part = package::find_main_document(&mut zip)?;
        let content_types = ContentTypes::load(&mut zip)?;
        match content_types.content_type(&main_part) {
            Some(kind) if WORD_DOCUMENT_CONTENT_TYPES.contains(&kind) => (),
            kind => Err(DocumentError::ContentTypeError(kind.unwrap_or_default().to_owned()))?,
        }
        debug!(part = %main_part, entries = zip.len(), "opened word document package");
        Ok(Document { zip, main_part })
    }

    /// Scans the main document part for top-level tables
    pub(crate) fn scan_tables(&mut self) -> Result<TableScan, RustyDocxError> {
        let mut reader = self.zip
            .xml_reader(&self.main_part)?
            .ok_or_else(|| DocumentError::MissingPartError(self.main_part.clone()))?;
        table::scan_tables(&mut reader).with_prefix(&self.main_part)
    }
}

/// Tells an encrypted OOXML package from a legacy `.doc` or any other compound file
fn classify_compound_file(bytes: &[u8]) -> Result<DocumentError, RustyDocxError> {
    let cfb = Cfb::new(bytes)?;
    Ok(if cfb.exists(ENCRYPTED_PACKAGE_STREAM) {
        DocumentError::PasswordProtectedError
    } else if cfb.exists(WORD_DOCUMENT_STREAM) {
        DocumentError::LegacyFormatError
    } else {
        DocumentError::CompoundFileError
    })
}
