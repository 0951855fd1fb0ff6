//! PDF builder implementation.

use crate::error::Result;
use crate::package::normalize_newlines;

/// A4 page size in points.
const PAGE_WIDTH: f64 = 595.28;
const PAGE_HEIGHT: f64 = 841.89;

/// 2 cm margins.
const MARGIN: f64 = 56.69;

const TITLE_SIZE: f64 = 18.0;
const BODY_SIZE: f64 = 11.0;
const FOOTER_SIZE: f64 = 9.0;

/// Line leading for body text.
const LEADING: f64 = 15.4;

/// Vertical gap rendered for a blank input line.
const BLANK_LINE_GAP: f64 = 8.0;

/// Baseline of the page-number footer.
const FOOTER_Y: f64 = 32.0;

/// Builder for paginated PDF documents from plain text.
///
/// Overflowing content always continues onto further pages; nothing is
/// truncated. Every page carries a centered `Side {page} av {total}` footer.
pub struct PdfBuilder;

impl PdfBuilder {
    /// Build a PDF from content text and an optional title.
    pub fn build(content: &str, title: Option<&str>) -> Result<Vec<u8>> {
        let pages = paginate(content, title);
        Ok(assemble(&pages, title))
    }
}

/// Escape special characters for PDF string literals.
fn pdf_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Encode text as WinAnsi (Latin-1) bytes; characters outside the range
/// degrade to '?'. The standard fonts carry no glyphs beyond it anyway.
fn encode_latin1(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if (c as u32) <= 0xFF { c as u32 as u8 } else { b'?' })
        .collect()
}

/// Append a text-showing operation at (x, y).
fn show_text(stream: &mut Vec<u8>, font: &str, size: f64, x: f64, y: f64, text: &str) {
    stream.extend_from_slice(format!("BT\n{font} {size} Tf\n{x:.2} {y:.2} Td\n(").as_bytes());
    stream.extend_from_slice(&encode_latin1(&pdf_escape(text)));
    stream.extend_from_slice(b") Tj\nET\n");
}

/// Rough Helvetica string width: average glyph width of half an em.
fn text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * 0.5
}

/// Lay the title and body out into per-page content streams, without
/// footers. Pagination is automatic; a page break occurs whenever the next
/// line would cross the bottom margin.
fn paginate(content: &str, title: Option<&str>) -> Vec<Vec<u8>> {
    let bottom = MARGIN + FOOTER_Y / 2.0;
    let mut pages: Vec<Vec<u8>> = Vec::new();
    let mut stream: Vec<u8> = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    if let Some(title) = title {
        if !title.is_empty() {
            y -= TITLE_SIZE;
            show_text(&mut stream, "/F1", TITLE_SIZE, MARGIN, y, title);
            y -= TITLE_SIZE;
        }
    }

    for line in normalize_newlines(content).split('\n') {
        if line.trim().is_empty() {
            // A blank input line is a fixed gap, never a zero-height
            // paragraph.
            y -= BLANK_LINE_GAP;
            continue;
        }

        if y - LEADING < bottom {
            pages.push(std::mem::take(&mut stream));
            y = PAGE_HEIGHT - MARGIN;
        }

        y -= LEADING;
        show_text(&mut stream, "/F2", BODY_SIZE, MARGIN, y, line);
    }

    pages.push(stream);
    pages
}

/// Append the centered page-number footer to each page's content stream.
fn add_footers(pages: &mut [Vec<u8>]) {
    let total = pages.len();
    for (i, stream) in pages.iter_mut().enumerate() {
        let label = format!("Side {} av {}", i + 1, total);
        let x = (PAGE_WIDTH - text_width(&label, FOOTER_SIZE)) / 2.0;
        show_text(stream, "/F2", FOOTER_SIZE, x, FOOTER_Y, &label);
    }
}

/// Assemble the complete PDF file: catalog, page tree, per-page content
/// streams, fonts, info, xref table and trailer.
fn assemble(pages: &[Vec<u8>], title: Option<&str>) -> Vec<u8> {
    let mut pages: Vec<Vec<u8>> = pages.to_vec();
    add_footers(&mut pages);

    let page_count = pages.len();
    // Objects: 1 catalog, 2 pages, then (page, contents) per page, two
    // fonts, one info dictionary.
    let font_bold_obj = 3 + 2 * page_count;
    let font_regular_obj = font_bold_obj + 1;
    let info_obj = font_regular_obj + 1;

    let mut pdf: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();

    pdf.extend_from_slice(b"%PDF-1.4\n");

    // Obj 1: Catalog
    offsets.push(pdf.len());
    pdf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    // Obj 2: Pages
    offsets.push(pdf.len());
    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();
    pdf.extend_from_slice(
        format!(
            "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {page_count} >>\nendobj\n",
            kids.join(" ")
        )
        .as_bytes(),
    );

    // Page and content objects.
    for (i, stream) in pages.iter().enumerate() {
        let page_obj = 3 + 2 * i;
        let contents_obj = page_obj + 1;

        offsets.push(pdf.len());
        pdf.extend_from_slice(
            format!(
                "{page_obj} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] /Contents {contents_obj} 0 R /Resources << /Font << /F1 {font_bold_obj} 0 R /F2 {font_regular_obj} 0 R >> >> >>\nendobj\n"
            )
            .as_bytes(),
        );

        offsets.push(pdf.len());
        pdf.extend_from_slice(
            format!("{contents_obj} 0 obj\n<< /Length {} >>\nstream\n", stream.len()).as_bytes(),
        );
        pdf.extend_from_slice(stream);
        pdf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    // Fonts
    offsets.push(pdf.len());
    pdf.extend_from_slice(
        format!(
            "{font_bold_obj} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>\nendobj\n"
        )
        .as_bytes(),
    );
    offsets.push(pdf.len());
    pdf.extend_from_slice(
        format!(
            "{font_regular_obj} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>\nendobj\n"
        )
        .as_bytes(),
    );

    // Info
    offsets.push(pdf.len());
    pdf.extend_from_slice(format!("{info_obj} 0 obj\n<< /Title (").as_bytes());
    pdf.extend_from_slice(&encode_latin1(&pdf_escape(title.unwrap_or(""))));
    pdf.extend_from_slice(b") /Producer (gendoc) >>\nendobj\n");

    // Cross-reference table
    let xref_offset = pdf.len();
    let num_objects = offsets.len() + 1; // +1 for the free entry
    pdf.extend_from_slice(format!("xref\n0 {num_objects}\n").as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }

    // Trailer
    pdf.extend_from_slice(
        format!("trailer\n<< /Size {num_objects} /Root 1 0 R /Info {info_obj} 0 R >>\n").as_bytes(),
    );
    pdf.extend_from_slice(format!("startxref\n{xref_offset}\n%%EOF\n").as_bytes());

    pdf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_basic() {
        let bytes = PdfBuilder::build("Hei verda", Some("Rapport")).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn test_title_rendered_bold_when_present() {
        let bytes = PdfBuilder::build("body", Some("Rapport")).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/F1 18 Tf"));
        assert!(text.contains("(Rapport) Tj"));
    }

    #[test]
    fn test_title_omitted_when_absent() {
        let bytes = PdfBuilder::build("body", None).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(!text.contains("/F1 18 Tf"));
    }

    #[test]
    fn test_single_page_footer() {
        let bytes = PdfBuilder::build("ei linje", None).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(Side 1 av 1) Tj"));
        assert!(text.contains("/Count 1"));
    }

    #[test]
    fn test_overflow_paginates() {
        // Far more lines than one A4 page holds at 15.4pt leading.
        let content: Vec<String> = (1..=120).map(|i| format!("Linje {i}")).collect();
        let bytes = PdfBuilder::build(&content.join("\n"), Some("Lang rapport")).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains("/Count 3"));
        assert!(text.contains("(Side 1 av 3) Tj"));
        assert!(text.contains("(Side 3 av 3) Tj"));
        // Nothing truncated: the last line is present.
        assert!(text.contains("(Linje 120) Tj"));
    }

    #[test]
    fn test_blank_lines_are_gaps_not_paragraphs() {
        let with_blanks = PdfBuilder::build("a\n\n\nb", None).unwrap();
        let text = String::from_utf8_lossy(&with_blanks);
        // Only two text paragraphs besides the footer.
        assert_eq!(text.matches(") Tj").count(), 3);
    }

    #[test]
    fn test_parentheses_escaped() {
        let bytes = PdfBuilder::build("pris (rabatt)", None).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("\\(rabatt\\)"));
    }

    #[test]
    fn test_norwegian_characters_encode() {
        let bytes = PdfBuilder::build("blåbærsyltetøy", None).unwrap();
        // Latin-1 byte for 'å' is 0xE5; the UTF-8 pair must not appear.
        assert!(bytes.windows(2).any(|w| w == [0xE5, b'b']));
    }

    #[test]
    fn test_xref_offsets_are_exact() {
        let bytes = PdfBuilder::build("innhald", Some("T")).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        // Every xref entry must point at an "N 0 obj" header.
        let xref_at = text.rfind("xref\n").unwrap();
        for (i, line) in text[xref_at..].lines().skip(3).enumerate() {
            let Some(offset) = line.split(' ').next().and_then(|o| o.parse::<usize>().ok())
            else {
                break;
            };
            if line.ends_with("n ") {
                let header = format!("{} 0 obj", i + 1);
                assert!(
                    text[offset..].starts_with(&header),
                    "xref entry {i} mismatch"
                );
            }
        }
    }
}
