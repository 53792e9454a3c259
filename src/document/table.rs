//! Streaming scan of the main document part for its top-level tables.
//!
//! Only tables that are direct children of `w:body` count, in document order; the
//! rows of the last one are kept. Rows are the direct `w:tr` children of that table,
//! cells the direct `w:tc` children of a row. A cell's text is its direct paragraphs
//! joined with `\n`, so text of a table nested in a cell is not part of the cell.
//! A cell spanning several grid columns (`w:gridSpan`) yields its text once per column.
use crate::document::DocumentError;
use crate::error::RustyDocxError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::match_xml_events;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use std::io::BufRead;
use std::mem::take;

// WordprocessingML element local names
const TAG_BODY: &[u8] = b"body";                      // Document body
const TAG_TABLE: &[u8] = b"tbl";                      // Table
const TAG_ROW: &[u8] = b"tr";                         // Table row
const TAG_CELL: &[u8] = b"tc";                        // Table cell
const TAG_CELL_PROPERTIES: &[u8] = b"tcPr";           // Table cell properties
const TAG_GRID_SPAN: &[u8] = b"gridSpan";             // Grid columns covered by a cell
const TAG_PARAGRAPH: &[u8] = b"p";                    // Paragraph
const TAG_HYPERLINK: &[u8] = b"hyperlink";            // Hyperlink wrapping runs
const TAG_RUN: &[u8] = b"r";                          // Run of uniform formatting
const TAG_TEXT: &[u8] = b"t";                         // Run text
const TAG_TAB: &[u8] = b"tab";                        // Tab character
const TAG_POSITIONAL_TAB: &[u8] = b"ptab";            // Absolute position tab
const TAG_BREAK: &[u8] = b"br";                       // Break (line, page or column)
const TAG_CARRIAGE_RETURN: &[u8] = b"cr";             // Carriage return
const TAG_NO_BREAK_HYPHEN: &[u8] = b"noBreakHyphen";  // Non-breaking hyphen

/// Break type rendered as a line feed; page and column breaks add nothing.
const TEXT_WRAPPING_BREAK: &str = "textWrapping";

/// Upper bound of a cell's grid span; Word tables have at most 63 columns.
const MAX_GRID_SPAN: usize = 63;

/// Result of scanning a document body.
#[derive(Debug, Default)]
pub(crate) struct TableScan {
    /// Number of top-level tables in the body
    pub(crate) table_count: usize,
    /// Cell text of the last top-level table, row by row
    pub(crate) last_table: Option<Vec<Vec<String>>>,
}

/// Streams the main document part and returns the last top-level table.
pub(crate) fn scan_tables<R: BufRead>(reader: &mut XmlReader<R>) -> Result<TableScan, RustyDocxError> {
    let mut scanner = TableScanner::default();
    match_xml_events!(reader => {
        Event::Start(event) => scanner.open(&event)?,
        Event::End(_) => scanner.close(),
        Event::Text(event) if scanner.in_text() => scanner.value.push_bytes_text(&event)?,
        Event::CData(event) if scanner.in_text() => scanner.value.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if scanner.in_text() => scanner.value.push_bytes_ref(&event)?,
    });
    scanner.finish()
}

/// Element-stack driven state of the scan.
///
/// Each context field holds the stack index of the element that opened it, so a
/// child is recognised by its parent's index rather than by name alone.
#[derive(Default)]
struct TableScanner {
    /// Local names of the currently open elements
    elements: Vec<Vec<u8>>,
    body: Option<usize>,
    table: Option<usize>,
    row: Option<usize>,
    cell: Option<usize>,
    cell_properties: Option<usize>,
    paragraph: Option<usize>,
    run: Option<usize>,
    text: Option<usize>,
    /// Paragraphs seen so far in the current cell
    paragraph_count: usize,
    /// Grid columns covered by the current cell; its text is repeated once per column
    span: usize,
    /// Text of the current cell
    value: String,
    /// Cells of the current row
    cells: Vec<String>,
    /// Rows of the current table
    rows: Vec<Vec<String>>,
    scan: TableScan,
}

impl TableScanner {
    fn in_text(&self) -> bool {
        self.text.is_some()
    }

    fn open(&mut self, event: &BytesStart) -> Result<(), RustyDocxError> {
        let depth = self.elements.len();
        let parent = depth.checked_sub(1);
        let name = event.local_name();
        let name = name.as_ref();
        match name {
            TAG_BODY if self.body.is_none() => self.body = Some(depth),
            TAG_TABLE if self.table.is_none() && self.body.is_some() && parent == self.body => {
                self.table = Some(depth);
                self.rows.clear();
            }
            TAG_ROW if self.table.is_some() && parent == self.table => {
                self.row = Some(depth);
                self.cells.clear();
            }
            TAG_CELL if self.row.is_some() && parent == self.row => {
                self.cell = Some(depth);
                self.value.clear();
                self.paragraph_count = 0;
                self.span = 1;
            }
            TAG_CELL_PROPERTIES if self.cell.is_some() && parent == self.cell => self.cell_properties = Some(depth),
            TAG_GRID_SPAN if self.cell_properties.is_some() && parent == self.cell_properties => {
                self.span = event.get_local_attribute_value("val")?
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(1)
                    .clamp(1, MAX_GRID_SPAN);
            }
            TAG_PARAGRAPH if self.cell.is_some() && parent == self.cell => {
                if self.paragraph_count > 0 {
                    self.value.push('\n');
                }
                self.paragraph_count += 1;
                self.paragraph = Some(depth);
            }
            TAG_RUN if self.paragraph.is_some() && self.is_run_position(depth) => self.run = Some(depth),
            _ if self.run.is_some() && parent == self.run => match name {
                TAG_TEXT => self.text = Some(depth),
                TAG_TAB | TAG_POSITIONAL_TAB => self.value.push('\t'),
                TAG_CARRIAGE_RETURN => self.value.push('\n'),
                TAG_NO_BREAK_HYPHEN => self.value.push('-'),
                TAG_BREAK => {
                    let is_line_break = event.get_local_attribute_value("type")?
                        .map(|kind| kind == TEXT_WRAPPING_BREAK)
                        .unwrap_or(true);
                    if is_line_break {
                        self.value.push('\n');
                    }
                }
                _ => (),
            },
            _ => (),
        }
        self.elements.push(name.to_vec());
        Ok(())
    }

    /// Runs count when they sit directly in the paragraph or in one of its hyperlinks.
    fn is_run_position(&self, depth: usize) -> bool {
        let parent = depth.checked_sub(1);
        let grandparent = depth.checked_sub(2);
        parent == self.paragraph
            || (grandparent == self.paragraph
                && self.elements.last().map(|name| name.as_slice() == TAG_HYPERLINK).unwrap_or(false))
    }

    fn close(&mut self) {
        if self.elements.pop().is_none() {
            return;
        }
        let depth = Some(self.elements.len());
        if self.text == depth {
            self.text = None;
        } else if self.run == depth {
            self.run = None;
        } else if self.paragraph == depth {
            self.paragraph = None;
        } else if self.cell_properties == depth {
            self.cell_properties = None;
        } else if self.cell == depth {
            self.cell = None;
            let value = take(&mut self.value);
            self.cells.extend(std::iter::repeat(value).take(self.span));
        } else if self.row == depth {
            self.row = None;
            self.rows.push(take(&mut self.cells));
        } else if self.table == depth {
            self.table = None;
            self.scan.table_count += 1;
            self.scan.last_table = Some(take(&mut self.rows));
        } else if self.body == depth {
            self.body = None;
        }
    }

    fn finish(self) -> Result<TableScan, RustyDocxError> {
        if !self.elements.is_empty() {
            Err(DocumentError::TruncatedPartError)?;
        }
        Ok(self.scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn scan(body: &str) -> Result<TableScan, RustyDocxError> {
        let xml = format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{NAMESPACE}"><w:body>{body}</w:body></w:document>"#);
        let mut reader = XmlReader::new(xml.as_bytes());
        scan_tables(&mut reader)
    }

    fn cell(text: &str) -> String {
        format!("<w:tc><w:p><w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r></w:p></w:tc>")
    }

    fn row(cells: &[&str]) -> String {
        format!("<w:tr>{}</w:tr>", cells.iter().map(|text| cell(text)).collect::<String>())
    }

    fn table(rows: &[&[&str]]) -> String {
        format!("<w:tbl><w:tblPr/>{}</w:tbl>", rows.iter().map(|cells| row(cells)).collect::<String>())
    }

    fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter().map(|row| row.iter().map(|cell| cell.to_string()).collect()).collect()
    }

    #[test]
    fn test_body_without_tables() {
        let scan = scan("<w:p><w:r><w:t>Hello</w:t></w:r></w:p><w:sectPr/>").unwrap();
        assert_eq!(scan.table_count, 0);
        assert!(scan.last_table.is_none());
    }

    #[test]
    fn test_last_table_wins() {
        let body = format!(
            "{}<w:p/>{}",
            table(&[&["first"]]),
            table(&[&["Name", "Age"], &["Alice", "30"]]),
        );
        let scan = scan(&body).unwrap();
        assert_eq!(scan.table_count, 2);
        assert_eq!(scan.last_table.unwrap(), strings(&[&["Name", "Age"], &["Alice", "30"]]));
    }

    #[test]
    fn test_cell_text_is_not_trimmed() {
        let scan = scan(&table(&[&["  padded  ", ""]])).unwrap();
        assert_eq!(scan.last_table.unwrap(), strings(&[&["  padded  ", ""]]));
    }

    #[test]
    fn test_paragraphs_runs_and_special_characters() {
        let body = "<w:tbl><w:tr><w:tc>\
            <w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t></w:r><w:r><w:t>c</w:t><w:br/><w:t>d</w:t></w:r></w:p>\
            <w:p><w:hyperlink><w:r><w:t>link</w:t></w:r></w:hyperlink><w:r><w:noBreakHyphen/><w:br w:type=\"page\"/><w:t>&amp;</w:t></w:r></w:p>\
            <w:p/>\
            </w:tc><w:tc>\
            <w:p><w:r><w:t>a</w:t><w:cr/><w:t>b</w:t><w:br w:type=\"textWrapping\"/><w:ptab/><w:t>c</w:t><w:br w:type=\"column\"/></w:r></w:p>\
            </w:tc></w:tr></w:tbl>";
        let scan = scan(body).unwrap();
        assert_eq!(scan.last_table.unwrap(), strings(&[&["a\tbc\nd\nlink-&\n", "a\nb\n\tc"]]));
    }

    #[test]
    fn test_spanned_cells_repeat_per_grid_column() {
        let body = "<w:tbl><w:tr>\
            <w:tc><w:tcPr><w:tcW w:w=\"0\"/><w:gridSpan w:val=\"2\"/></w:tcPr><w:p><w:r><w:t>Title</w:t></w:r></w:p></w:tc>\
            </w:tr><w:tr>\
            <w:tc><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc>\
            <w:tc><w:tcPr><w:gridSpan w:val=\"bogus\"/></w:tcPr><w:p><w:r><w:t>b</w:t></w:r></w:p></w:tc>\
            </w:tr></w:tbl>";
        let scan = scan(body).unwrap();
        assert_eq!(scan.last_table.unwrap(), strings(&[&["Title", "Title"], &["a", "b"]]));
    }

    #[test]
    fn test_nested_tables_are_not_counted_or_read() {
        let nested = table(&[&["inner"]]);
        let body = format!(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>outer</w:t></w:r></w:p>{nested}</w:tc><w:tc><w:p/></w:tc></w:tr></w:tbl>"
        );
        let scan = scan(&body).unwrap();
        assert_eq!(scan.table_count, 1);
        assert_eq!(scan.last_table.unwrap(), strings(&[&["outer", ""]]));
    }

    #[test]
    fn test_tables_outside_body_children_are_ignored() {
        let body = format!(
            "{}<w:sdt><w:sdtContent>{}</w:sdtContent></w:sdt>",
            table(&[&["direct"]]),
            table(&[&["wrapped"]]),
        );
        let scan = scan(&body).unwrap();
        assert_eq!(scan.table_count, 1);
        assert_eq!(scan.last_table.unwrap(), strings(&[&["direct"]]));
    }

    #[test]
    fn test_table_without_rows() {
        let scan = scan("<w:tbl><w:tblPr/><w:tblGrid/></w:tbl>").unwrap();
        assert_eq!(scan.table_count, 1);
        assert_eq!(scan.last_table.unwrap(), Vec::<Vec<String>>::new());
    }

    #[test]
    fn test_ragged_rows_are_kept_as_read() {
        let scan = scan(&table(&[&["a", "b", "c"], &["1"]])).unwrap();
        assert_eq!(scan.last_table.unwrap(), strings(&[&["a", "b", "c"], &["1"]]));
    }

    #[test]
    fn test_truncated_part_is_an_error() {
        let xml = format!(r#"<w:document xmlns:w="{NAMESPACE}"><w:body><w:tbl><w:tr>"#);
        let mut reader = XmlReader::new(xml.as_bytes());
        assert!(scan_tables(&mut reader).is_err());
    }

    #[test]
    fn test_mismatched_tags_are_an_error() {
        assert!(scan("<w:tbl><w:tr></w:tbl></w:tr>").is_err());
    }
}
