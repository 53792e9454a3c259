#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const WORD_MAIN_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const SPREADSHEET_MAIN_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

const NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Builds a minimal `.docx` package around the given `w:body` content.
pub fn docx(body: &str) -> Vec<u8> {
    package(body, WORD_MAIN_CONTENT_TYPE)
}

/// Builds a package whose main part has the given content type.
pub fn package(body: &str, content_type: &str) -> Vec<u8> {
    let content_types = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="{content_type}"/>
</Types>"#
    );
    let relationships = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{NAMESPACE}"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );
    zip_entries(&[
        ("[Content_Types].xml", content_types.as_str()),
        ("_rels/.rels", relationships),
        ("word/document.xml", document.as_str()),
    ])
}

/// Writes the entries into an in-memory ZIP archive.
pub fn zip_entries(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("zip entry should start");
        writer
            .write_all(content.as_bytes())
            .expect("zip entry should be written");
    }
    writer.finish().expect("zip should finish").into_inner()
}

/// Table markup with one single-paragraph cell per value.
pub fn table(rows: &[&[&str]]) -> String {
    let rows = rows
        .iter()
        .map(|cells| {
            let cells = cells
                .iter()
                .map(|text| format!(r#"<w:tc><w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p></w:tc>"#))
                .collect::<String>();
            format!("<w:tr>{cells}</w:tr>")
        })
        .collect::<String>();
    format!("<w:tbl><w:tblPr/><w:tblGrid/>{rows}</w:tbl>")
}

pub fn paragraph(text: &str) -> String {
    format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
}

pub fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

pub fn write_docx(path: &Path, body: &str) {
    std::fs::write(path, docx(body)).expect("fixture should be written");
}
