//! PDF text extraction
//!
//! Turns uploaded PDF bytes into plain text for analysis. Pages are read
//! in order with lopdf; when that yields nothing, pdf-extract gets one
//! whole-document attempt since it copes better with CID fonts and
//! ToUnicode CMaps.

pub mod error;
pub mod extract;

pub use error::ExtractionError;
pub use extract::{extract_text, TextExtractor};
