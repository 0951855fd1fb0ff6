//! XLSX (Excel) workbook generation.
//!
//! This module builds single-sheet workbooks in the Office Open XML (.xlsx)
//! format from rectangular row data.

mod builder;

pub use builder::{cell_reference, XlsxBuilder};
