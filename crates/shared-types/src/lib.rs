//! Domain types shared between the extraction, analysis and server crates.

pub mod analysis;
pub mod chat;
pub mod document;

pub use analysis::{AnalysisResult, KeyClause, Obligation, Risk, UnusualTerm};
pub use chat::ChatReply;
pub use document::{DocumentInfo, StoredDocument, PREVIEW_CHARS};
