//! # Session
//!
//! Caller-side state around the extractor: the document being worked on, the header
//! mode its current table was built with and the outcome of that extraction.
//!
//! A session processes a document once when it is uploaded, always with the default
//! header mode. Changing the mode afterwards does nothing until [`Session::refresh`] is
//! called, which builds a new table from the held bytes. [`Session::reset`] forgets the
//! document so that another one can be uploaded.
use crate::dataset::table::ResultTable;
use crate::extractor::extract_last_table;
use crate::extractor::Extraction;
use crate::extractor::DEFAULT_HEADER_MODE;
use serde::Serialize;
use tracing::debug;

/// Document held by a session
#[derive(Debug)]
struct LoadedDocument {
    name: String,
    bytes: Vec<u8>,
    /// Outcome of the last extraction of `bytes`
    outcome: Extraction,
}

/// Explicit per-user state of the table viewer.
#[derive(Debug)]
pub struct Session {
    document: Option<LoadedDocument>,
    /// Header mode the current outcome was built with
    applied_header_mode: bool,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session { document: None, applied_header_mode: DEFAULT_HEADER_MODE }
    }

    /// Takes a newly uploaded document and extracts its last table with the default
    /// header mode.
    ///
    /// Returns `false` and leaves the session untouched when a document is already
    /// held; call [`Session::reset`] first to replace it.
    pub fn upload(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> bool {
        if self.document.is_some() {
            debug!("document already loaded, upload ignored");
            return false;
        }
        let name = name.into();
        let outcome = extract_last_table(&bytes, DEFAULT_HEADER_MODE);
        debug!(name = %name, size = bytes.len(), absent = outcome.is_absent(), "document uploaded");
        self.applied_header_mode = DEFAULT_HEADER_MODE;
        self.document = Some(LoadedDocument { name, bytes, outcome });
        true
    }

    /// True when a document is held and `selected` differs from the applied header mode.
    pub fn needs_refresh(&self, selected: bool) -> bool {
        self.document.is_some() && selected != self.applied_header_mode
    }

    /// Rebuilds the table of the held document with the `selected` header mode.
    ///
    /// Returns `false` when no document is held.
    pub fn refresh(&mut self, selected: bool) -> bool {
        let Some(document) = self.document.as_mut() else {
            return false;
        };
        document.outcome = extract_last_table(&document.bytes, selected);
        self.applied_header_mode = selected;
        debug!(name = %document.name, use_first_row_as_header = selected, "table refreshed");
        true
    }

    /// Forgets the held document and restores the default header mode.
    pub fn reset(&mut self) {
        self.document = None;
        self.applied_header_mode = DEFAULT_HEADER_MODE;
    }

    /// Name of the held document
    pub fn document_name(&self) -> Option<&str> {
        self.document.as_ref().map(|document| document.name.as_str())
    }

    pub fn applied_header_mode(&self) -> bool {
        self.applied_header_mode
    }

    /// Outcome of the last extraction, if a document is held
    pub fn outcome(&self) -> Option<&Extraction> {
        self.document.as_ref().map(|document| &document.outcome)
    }

    /// What the session has to show.
    pub fn status(&self) -> SessionStatus<'_> {
        match self.outcome() {
            None => SessionStatus::Idle,
            Some(Extraction::Table(table)) if table.is_empty() => SessionStatus::EmptyTable,
            Some(Extraction::Table(table)) => SessionStatus::Table(table),
            Some(_) => SessionStatus::NoValidTable,
        }
    }
}

/// Display state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus<'a> {
    /// No document loaded yet
    Idle,
    /// A table with at least one row and one column
    Table(&'a ResultTable),
    /// The last table has a header but no data, or no columns
    EmptyTable,
    /// No table, or the document could not be read
    NoValidTable,
}

/// Serialized name of a [`SessionStatus`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Idle,
    Table,
    EmptyTable,
    NoValidTable,
}

impl SessionStatus<'_> {
    /// Message shown instead of a table.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            SessionStatus::Idle => Some("Upload a DOCX file to begin."),
            SessionStatus::Table(_) => None,
            SessionStatus::EmptyTable => Some("The extracted table appears to be empty."),
            SessionStatus::NoValidTable => Some("Could not extract a valid table from the document."),
        }
    }

    pub fn kind(&self) -> StatusKind {
        match self {
            SessionStatus::Idle => StatusKind::Idle,
            SessionStatus::Table(_) => StatusKind::Table,
            SessionStatus::EmptyTable => StatusKind::EmptyTable,
            SessionStatus::NoValidTable => StatusKind::NoValidTable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.status().message(), Some("Upload a DOCX file to begin."));
        assert!(session.applied_header_mode());
        assert!(!session.needs_refresh(false));
        assert!(session.document_name().is_none());
    }

    #[test]
    fn test_second_upload_is_ignored_until_reset() {
        let mut session = Session::new();
        assert!(session.upload("first.docx", b"not a document".to_vec()));
        assert!(!session.upload("second.docx", Vec::new()));
        assert_eq!(session.document_name(), Some("first.docx"));
        assert_eq!(session.status(), SessionStatus::NoValidTable);
        assert!(session.outcome().and_then(Extraction::diagnostic).is_some());

        session.reset();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.upload("second.docx", Vec::new()));
        assert_eq!(session.document_name(), Some("second.docx"));
    }

    #[test]
    fn test_refresh_tracks_applied_mode() {
        let mut session = Session::new();
        assert!(!session.refresh(false));
        session.upload("broken.docx", b"PK".to_vec());
        assert!(session.needs_refresh(false));
        assert!(!session.needs_refresh(true));

        assert!(session.refresh(false));
        assert!(!session.applied_header_mode());
        assert!(!session.needs_refresh(false));

        session.reset();
        assert!(session.applied_header_mode());
    }

    #[test]
    fn test_status_messages_and_kinds() {
        assert_eq!(SessionStatus::EmptyTable.message(), Some("The extracted table appears to be empty."));
        assert_eq!(SessionStatus::NoValidTable.message(), Some("Could not extract a valid table from the document."));
        assert_eq!(SessionStatus::NoValidTable.kind(), StatusKind::NoValidTable);
        let table = ResultTable::default();
        assert_eq!(SessionStatus::Table(&table).message(), None);
    }
}
