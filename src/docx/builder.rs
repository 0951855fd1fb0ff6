//! DOCX builder implementation.

use crate::error::Result;
use crate::package::{normalize_newlines, xml_escape, OoxmlPackage};

/// Builder for minimal Word documents from plain text.
///
/// Every input line becomes one paragraph holding a single text run with
/// whitespace preservation, so re-extracting paragraph text yields the
/// original lines verbatim, blank lines included.
pub struct DocxBuilder;

impl DocxBuilder {
    /// Build a .docx package from plain text.
    pub fn build(text: &str) -> Result<Vec<u8>> {
        let mut package = OoxmlPackage::new();

        package.insert_xml("[Content_Types].xml", CONTENT_TYPES_XML);
        package.insert_xml("_rels/.rels", ROOT_RELS_XML);
        package.insert_xml("word/document.xml", document_xml(text));

        package.to_bytes()
    }
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

fn document_xml(text: &str) -> String {
    let normalized = normalize_newlines(text);

    let mut body = String::new();
    for line in normalized.split('\n') {
        if line.is_empty() {
            body.push_str("    <w:p/>\n");
        } else {
            // xml:space="preserve" keeps leading and trailing spaces.
            body.push_str(&format!(
                "    <w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>\n",
                xml_escape(line)
            ));
        }
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
{body}  </w:body>
</w:document>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_is_valid_package() {
        let bytes = DocxBuilder::build("Hello, World!").unwrap();
        assert_eq!(&bytes[0..2], b"PK");

        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        assert!(package.exists("[Content_Types].xml"));
        assert!(package.exists("word/document.xml"));
    }

    #[test]
    fn test_one_paragraph_per_line() {
        let bytes = DocxBuilder::build("first\nsecond\nthird").unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("word/document.xml").unwrap();
        assert_eq!(xml.matches("<w:p>").count(), 3);
    }

    #[test]
    fn test_blank_lines_become_empty_paragraphs() {
        let bytes = DocxBuilder::build("a\n\nb").unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("word/document.xml").unwrap();
        assert!(xml.contains("<w:p/>"));
    }

    #[test]
    fn test_whitespace_preserved() {
        let bytes = DocxBuilder::build("  indented  ").unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("word/document.xml").unwrap();
        assert!(xml.contains("<w:t xml:space=\"preserve\">  indented  </w:t>"));
    }

    #[test]
    fn test_special_characters_escaped() {
        let bytes = DocxBuilder::build("a < b & c").unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("word/document.xml").unwrap();
        assert!(xml.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_crlf_normalized() {
        let bytes = DocxBuilder::build("a\r\nb\rc").unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("word/document.xml").unwrap();
        assert_eq!(xml.matches("<w:p>").count(), 3);
    }
}
