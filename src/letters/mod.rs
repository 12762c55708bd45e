//! Letters module - assembling letter layouts and exporting them as PDF.
//!
//! - `experience_letter` / `offer_letter` - Typst layouts filled from records
//! - `engine` - rasterizes a layout into a PNG bitmap
//! - `export` - places the bitmap on a single A4 page

pub mod common;
pub mod engine;
pub mod experience_letter;
pub mod export;
pub mod offer_letter;
pub mod traits;

pub use engine::{Rasterizer, TypstRasterizer};
pub use experience_letter::ExperienceLetterGenerator;
pub use export::{DocumentExporter, ExportedDocument, PageGeometry};
pub use offer_letter::OfferLetterGenerator;
pub use traits::Generator;

use thiserror::Error;

/// Errors that can occur while assembling or exporting a letter.
#[derive(Debug, Error)]
pub enum LetterError {
    #[error("failed to load Typst template: {0}")]
    TemplateIo(#[source] std::io::Error),
    #[error("letter is missing {0}")]
    MissingField(&'static str),
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write Typst source: {0}")]
    WriteTypst(#[source] std::io::Error),
    #[error("Typst CLI execution failed: {0}")]
    TypstIo(#[source] std::io::Error),
    #[error("Typst CLI exited with status {0}")]
    TypstExit(i32),
    #[error("failed to read rendered bitmap: {0}")]
    ReadBitmap(#[source] std::io::Error),
    #[error("failed to decode rendered bitmap: {0}")]
    DecodeBitmap(String),
    #[error("rendered bitmap is empty")]
    EmptyBitmap,
    #[error("failed to write PDF: {0}")]
    Pdf(String),
}

/// Which letter a layout represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterKind {
    ExperienceLetter,
    OfferLetter,
}

impl LetterKind {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::ExperienceLetter => "experience-letter",
            Self::OfferLetter => "offer-letter",
        }
    }

    pub fn template_file(&self) -> &'static str {
        match self {
            Self::ExperienceLetter => "experience_letter.typ",
            Self::OfferLetter => "offer_letter.typ",
        }
    }
}

/// A fully assembled letter, ready to be rasterized.
#[derive(Debug, Clone)]
pub struct LetterLayout {
    pub kind: LetterKind,
    /// Display name of the person the letter is addressed to.
    pub subject: String,
    /// Complete Typst source.
    pub source: String,
}
