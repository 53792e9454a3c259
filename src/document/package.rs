//! OOXML package metadata: package relationships and part content types.
use crate::document::DocumentError;
use crate::error::RustyDocxError;
use crate::error::ResultMessage;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::BufRead;
use std::io::Read;
use std::io::Seek;
use zip::ZipArchive;

/// Package-level relationships part
const PACKAGE_RELATIONSHIPS: &str = "_rels/.rels";
/// Content types part
const CONTENT_TYPES: &str = "[Content_Types].xml";

const TAG_RELATIONSHIP: &[u8] = b"Relationship";
const TAG_DEFAULT: &[u8] = b"Default";
const TAG_OVERRIDE: &[u8] = b"Override";

/// Suffix shared by the transitional and strict main-document relationship types
const OFFICE_DOCUMENT_RELATIONSHIP: &str = "/officeDocument";

/// Content types accepted for the main document part (`.docx` and `.docm`)
pub(crate) const WORD_DOCUMENT_CONTENT_TYPES: [&str; 2] = [
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
    "application/vnd.ms-word.document.macroEnabled.main+xml",
];

/// Finds the zip path of the main document part through the package relationships.
pub(super) fn find_main_document<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<String, RustyDocxError> {
    let mut reader = zip.xml_reader(PACKAGE_RELATIONSHIPS)?
        .ok_or_else(|| DocumentError::MissingPartError(PACKAGE_RELATIONSHIPS.to_owned()))?;
    let mut main_document = None::<String>;
    match_xml_events!(reader => {
        Event::Start(event) if main_document.is_none() && event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            let external = event.get_attribute_value("TargetMode")?
                .map(|mode| mode.eq_ignore_ascii_case("External"))
                .unwrap_or(false);
            if let Some((kind, target)) = kind.zip(target) {
                if !external && kind.ends_with(OFFICE_DOCUMENT_RELATIONSHIP) {
                    main_document = Some(to_zip_path(&target));
                }
            }
        }
    });
    main_document.ok_or_else(|| DocumentError::MainDocumentNotFoundError.into())
}

/// Content type table of a package, keyed by lowercase extension and part name.
#[derive(Debug, Default)]
pub(super) struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    /// Loads `[Content_Types].xml`; a package without one is not an OOXML document.
    pub(super) fn load<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Self, RustyDocxError> {
        let mut reader = zip.xml_reader(CONTENT_TYPES)?
            .ok_or_else(|| DocumentError::MissingPartError(CONTENT_TYPES.to_owned()))?;
        read_content_types(&mut reader).with_prefix(CONTENT_TYPES)
    }

    /// Content type of a part: its override if any, else the default for its extension.
    pub(super) fn content_type(&self, part: &str) -> Option<&str> {
        let part = to_zip_path(part).to_ascii_lowercase();
        self.overrides
            .get(&part)
            .or_else(|| {
                let extension = part.rsplit_once('.').map(|(_, extension)| extension)?;
                self.defaults.get(extension)
            })
            .map(String::as_str)
    }
}

/// Collects `Default` and `Override` entries of the content types part
fn read_content_types<R: BufRead>(reader: &mut XmlReader<R>) -> Result<ContentTypes, RustyDocxError> {
    let mut content_types = ContentTypes::default();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_DEFAULT => {
            let extension = event.get_attribute_value("Extension")?;
            let kind = event.get_attribute_value("ContentType")?;
            if let Some((extension, kind)) = extension.zip(kind) {
                content_types.defaults.insert(extension.to_ascii_lowercase(), kind.into_owned());
            }
        }
        Event::Start(event) if event.local_name().as_ref() == TAG_OVERRIDE => {
            let part = event.get_attribute_value("PartName")?;
            let kind = event.get_attribute_value("ContentType")?;
            if let Some((part, kind)) = part.zip(kind) {
                content_types.overrides.insert(to_zip_path(&part).to_ascii_lowercase(), kind.into_owned());
            }
        }
    });
    Ok(content_types)
}

/// Normalizes a part name or package-relative target into a zip entry path
pub(crate) fn to_zip_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = path.trim_start_matches('/');
    path.strip_prefix("./").unwrap_or(path).to_owned()
}
