//! PDF document generation.
//!
//! Builds paginated PDF 1.4 files directly — header, xref table and trailer
//! included. Uses the built-in Helvetica fonts with WinAnsi encoding, so
//! Norwegian text renders without embedded font files.

mod builder;

pub use builder::PdfBuilder;
