//! ZIP container abstraction for OOXML packages.
//!
//! Generation works on an in-memory part map: parts are inserted (or, for the
//! template engine, unzipped from an existing package), edited, and finally
//! serialized back into a ZIP archive. Cloning the package clones every part,
//! so concurrent builds never share mutable state.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// An OOXML package held as an in-memory map from part name to bytes.
///
/// Part names use forward slashes and no leading slash, e.g.
/// `ppt/slides/slide1.xml`.
#[derive(Clone, Default)]
pub struct OoxmlPackage {
    parts: BTreeMap<String, Vec<u8>>,
}

impl OoxmlPackage {
    /// Create an empty package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unpack an existing OOXML package into a part map.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(data);
        let mut archive = zip::ZipArchive::new(cursor)?;
        let mut parts = BTreeMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)?;
            parts.insert(name, bytes);
        }

        Ok(Self { parts })
    }

    /// Serialize the package back into ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let buf = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(buf);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, bytes) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Read a part as a UTF-8 XML string.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self
            .parts
            .get(path)
            .ok_or_else(|| Error::MissingComponent(path.to_string()))?;

        // Strip a UTF-8 BOM if present; template packages saved by Office
        // occasionally carry one.
        let bytes = if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            &bytes[3..]
        } else {
            &bytes[..]
        };

        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::XmlParse(format!("{path}: {e}")))
    }

    /// Insert or replace a part.
    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.parts.insert(path.into(), bytes);
    }

    /// Insert or replace a part from an XML string.
    pub fn insert_xml(&mut self, path: impl Into<String>, xml: impl Into<String>) {
        self.parts.insert(path.into(), xml.into().into_bytes());
    }

    /// Remove a part, returning its bytes if it existed.
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.parts.remove(path)
    }

    /// Check whether a part exists.
    pub fn exists(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    /// List all part names.
    pub fn part_names(&self) -> Vec<String> {
        self.parts.keys().cloned().collect()
    }

    /// List part names matching a prefix.
    pub fn parts_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.parts
            .keys()
            .filter(|n| n.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Number of parts in the package.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the package holds no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl std::fmt::Debug for OoxmlPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlPackage")
            .field("parts", &self.parts.len())
            .finish()
    }
}

/// Escape text for inclusion in XML element content or attribute values.
pub(crate) fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Normalize CRLF and lone CR line endings to LF.
pub(crate) fn normalize_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut pkg = OoxmlPackage::new();
        pkg.insert_xml("[Content_Types].xml", "<Types/>");
        pkg.insert("word/document.xml", b"<w:document/>".to_vec());

        let bytes = pkg.to_bytes().unwrap();
        assert_eq!(&bytes[0..2], b"PK");

        let reread = OoxmlPackage::from_bytes(&bytes).unwrap();
        assert_eq!(reread.len(), 2);
        assert!(reread.exists("[Content_Types].xml"));
        assert_eq!(reread.read_xml("word/document.xml").unwrap(), "<w:document/>");
    }

    #[test]
    fn test_missing_part() {
        let pkg = OoxmlPackage::new();
        let err = pkg.read_xml("ppt/presentation.xml").unwrap_err();
        assert!(matches!(err, Error::MissingComponent(_)));
    }

    #[test]
    fn test_prefix_listing() {
        let mut pkg = OoxmlPackage::new();
        pkg.insert_xml("ppt/slides/slide1.xml", "<p:sld/>");
        pkg.insert_xml("ppt/slides/slide2.xml", "<p:sld/>");
        pkg.insert_xml("ppt/presentation.xml", "<p:presentation/>");

        assert_eq!(pkg.parts_with_prefix("ppt/slides/").len(), 2);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut pkg = OoxmlPackage::new();
        pkg.insert_xml("a.xml", "<a/>");

        let mut copy = pkg.clone();
        copy.insert_xml("a.xml", "<b/>");

        assert_eq!(pkg.read_xml("a.xml").unwrap(), "<a/>");
        assert_eq!(copy.read_xml("a.xml").unwrap(), "<b/>");
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a & b < c"), "a &amp; b &lt; c");
        assert_eq!(xml_escape("\"quoted\""), "&quot;quoted&quot;");
    }

    #[test]
    fn test_bom_stripped() {
        let mut pkg = OoxmlPackage::new();
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"<Types/>");
        pkg.insert("[Content_Types].xml", bytes);
        assert_eq!(pkg.read_xml("[Content_Types].xml").unwrap(), "<Types/>");
    }
}
