//! XLSX builder implementation.

use crate::error::Result;
use crate::package::{xml_escape, OoxmlPackage};

/// Builder for single-sheet Excel workbooks.
///
/// Every cell is written as an inline string — no numeric or date type
/// inference is performed.
pub struct XlsxBuilder;

impl XlsxBuilder {
    /// Build a .xlsx package from rows of cells.
    ///
    /// The worksheet is named "Data". Rows may be ragged; each cell lands at
    /// its own computed reference.
    pub fn build(rows: &[Vec<String>]) -> Result<Vec<u8>> {
        let mut package = OoxmlPackage::new();

        package.insert_xml("[Content_Types].xml", CONTENT_TYPES_XML);
        package.insert_xml("_rels/.rels", ROOT_RELS_XML);
        package.insert_xml("xl/workbook.xml", WORKBOOK_XML);
        package.insert_xml("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML);
        package.insert_xml("xl/styles.xml", STYLES_XML);
        package.insert_xml("xl/worksheets/sheet1.xml", sheet_xml(rows));

        package.to_bytes()
    }
}

/// Compute an A1-style cell reference from 1-based column and row numbers.
///
/// The column letters come from repeated base-26 division:
/// (1,1) → "A1", (26,1) → "Z1", (27,1) → "AA1".
pub fn cell_reference(column: u32, row: u32) -> String {
    let mut letters = String::new();
    let mut col = column;
    while col > 0 {
        col -= 1;
        letters.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }
    format!("{letters}{row}")
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
  <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
  xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="Data" sheetId="1" r:id="rId1"/>
  </sheets>
</workbook>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
  <fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
  <borders count="1"><border/></borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
</styleSheet>"#;

fn sheet_xml(rows: &[Vec<String>]) -> String {
    let mut sheet_data = String::new();

    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = row_idx as u32 + 1;
        sheet_data.push_str(&format!("    <row r=\"{row_num}\">\n"));
        for (col_idx, value) in row.iter().enumerate() {
            let reference = cell_reference(col_idx as u32 + 1, row_num);
            sheet_data.push_str(&format!(
                "      <c r=\"{reference}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>\n",
                xml_escape(value)
            ));
        }
        sheet_data.push_str("    </row>\n");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
{sheet_data}  </sheetData>
</worksheet>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_reference_single_letters() {
        assert_eq!(cell_reference(1, 1), "A1");
        assert_eq!(cell_reference(2, 1), "B1");
        assert_eq!(cell_reference(26, 1), "Z1");
    }

    #[test]
    fn test_cell_reference_double_letters() {
        assert_eq!(cell_reference(27, 1), "AA1");
        assert_eq!(cell_reference(28, 5), "AB5");
        assert_eq!(cell_reference(52, 3), "AZ3");
        assert_eq!(cell_reference(53, 1), "BA1");
        assert_eq!(cell_reference(702, 1), "ZZ1");
        assert_eq!(cell_reference(703, 1), "AAA1");
    }

    #[test]
    fn test_cell_reference_shape() {
        for col in 1..200u32 {
            let reference = cell_reference(col, 7);
            let letters: String = reference.chars().take_while(|c| c.is_ascii_uppercase()).collect();
            let digits: String = reference.chars().skip(letters.len()).collect();
            assert!(!letters.is_empty());
            assert_eq!(digits, "7");
        }
    }

    #[test]
    fn test_build_is_valid_package() {
        let rows = vec![
            vec!["name".to_string(), "age".to_string()],
            vec!["Kari".to_string(), "34".to_string()],
        ];
        let bytes = XlsxBuilder::build(&rows).unwrap();
        assert_eq!(&bytes[0..2], b"PK");

        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        assert!(package.exists("xl/workbook.xml"));
        assert!(package.exists("xl/worksheets/sheet1.xml"));
        assert!(package.exists("xl/styles.xml"));
    }

    #[test]
    fn test_sheet_named_data() {
        let bytes = XlsxBuilder::build(&[vec!["x".to_string()]]).unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("xl/workbook.xml").unwrap();
        assert!(xml.contains(r#"name="Data""#));
    }

    #[test]
    fn test_cells_are_inline_strings_at_computed_refs() {
        let rows = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
        ];
        let bytes = XlsxBuilder::build(&rows).unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("xl/worksheets/sheet1.xml").unwrap();

        assert!(xml.contains(r#"<c r="A1" t="inlineStr">"#));
        assert!(xml.contains(r#"<c r="B1" t="inlineStr">"#));
        assert!(xml.contains(r#"<c r="A2" t="inlineStr">"#));
        assert!(!xml.contains(r#"<c r="B2""#));
    }

    #[test]
    fn test_numeric_looking_values_stay_strings() {
        let rows = vec![vec!["34".to_string()]];
        let bytes = XlsxBuilder::build(&rows).unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("xl/worksheets/sheet1.xml").unwrap();
        assert!(xml.contains(r#"t="inlineStr""#));
        assert!(xml.contains("<t xml:space=\"preserve\">34</t>"));
    }

    #[test]
    fn test_empty_rows_build_empty_sheet() {
        let bytes = XlsxBuilder::build(&[]).unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("xl/worksheets/sheet1.xml").unwrap();
        assert!(!xml.contains("<row"));
    }
}
