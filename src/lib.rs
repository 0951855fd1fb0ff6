//! # gendoc
//!
//! Generation of Office documents and PDFs from loosely structured text.
//!
//! This library turns model output — plain text, CSV/JSON tabular data,
//! JSON slide lists — into valid OOXML packages (.docx, .xlsx, .pptx) and
//! paginated PDF files.
//!
//! ## Quick Start
//!
//! ```
//! use gendoc::{generate_docx, generate_pdf, generate_pptx, generate_xlsx};
//!
//! // Plain text to Word
//! let docx = generate_docx("Hei!\nDette er eit dokument.")?;
//!
//! // CSV or JSON tabular data to Excel
//! let xlsx = generate_xlsx(r#"[{"name":"Kari","age":"34"}]"#)?;
//!
//! // Slide-list JSON to PowerPoint (never fails to parse)
//! let pptx = generate_pptx(r#"[{"title":"Intro","content":"- Punkt A"}]"#)?;
//!
//! // Text plus optional title to a paginated PDF
//! let pdf = generate_pdf("Innhald over fleire sider", Some("Rapport"))?;
//! # Ok::<(), gendoc::Error>(())
//! ```
//!
//! ## Orchestration
//!
//! [`FileGenerationService`] wires the builders to a persistence seam
//! ([`GeneratedFileStore`]) and returns retrieval URLs; see the module docs
//! of [`service`] for the extension and error policies.

pub mod content_type;
pub mod error;
pub mod model;
pub mod package;
pub mod tabular;

pub mod docx;
pub mod pdf;
pub mod pptx;
pub mod xlsx;

pub mod service;

// Re-exports
pub use content_type::content_type_for_extension;
pub use docx::DocxBuilder;
pub use error::{Error, Result};
pub use model::{ContentEncoding, GeneratedFile, FILE_TTL_DAYS};
pub use package::OoxmlPackage;
pub use pdf::PdfBuilder;
pub use pptx::{
    parse_slides, ParsedSlides, PlaceholderMapping, PptxBuilder, PptxTemplateEngine, Slide,
    SlideKind, TemplateConfig,
};
pub use service::{FileGenerationService, GeneratedFileStore, RequestContext};
pub use tabular::parse_table_data;
pub use xlsx::{cell_reference, XlsxBuilder};

/// Generate a Word document from plain text.
///
/// One paragraph per input line, blank lines included.
pub fn generate_docx(text: &str) -> Result<Vec<u8>> {
    DocxBuilder::build(text)
}

/// Generate an Excel workbook from CSV or JSON tabular data.
///
/// See [`tabular::parse_table_data`] for the input handling rules.
pub fn generate_xlsx(table_data: &str) -> Result<Vec<u8>> {
    let rows = parse_table_data(table_data);
    XlsxBuilder::build(&rows)
}

/// Generate a generic PowerPoint deck from slide-list JSON.
///
/// Parsing never fails: malformed payloads degrade to a single slide
/// carrying the raw input.
pub fn generate_pptx(slides_json: &str) -> Result<Vec<u8>> {
    let slides = parse_slides(slides_json).into_slides();
    PptxBuilder::build(&slides)
}

/// Generate a paginated PDF from content text and an optional title.
pub fn generate_pdf(content: &str, title: Option<&str>) -> Result<Vec<u8>> {
    PdfBuilder::build(content, title)
}
