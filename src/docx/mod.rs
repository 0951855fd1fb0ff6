//! DOCX (Word) document generation.
//!
//! This module builds minimal Word packages in the Office Open XML (.docx)
//! format: one main document part, no styles beyond the defaults.

mod builder;

pub use builder::DocxBuilder;
