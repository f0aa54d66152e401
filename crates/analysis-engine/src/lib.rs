//! Analysis Engine - legal document analysis over a generative model
//!
//! This crate provides:
//! - The [`GenerativeModel`] seam and a Gemini REST implementation
//! - Prompt construction with a fixed character budget
//! - Reply normalization (code-fence stripping, JSON mapping with defaults)
//! - [`AnalysisEngine`], which always produces an [`AnalysisResult`]
//! - [`ChatEngine`], which always produces a reply string
//!
//! Neither engine surfaces model failures to the caller. Analysis degrades to
//! one of two canned records and chat degrades to an apology carrying the
//! error text.

pub mod analysis;
pub mod chat;
pub mod gemini;
pub mod model;
pub mod prompts;
pub mod response;

pub use analysis::{AnalysisEngine, AnalysisOutcome, AnalysisStatus};
pub use chat::ChatEngine;
pub use gemini::{GeminiClient, GeminiConfig};
pub use model::{GenerativeModel, ModelError};
pub use prompts::MAX_DOCUMENT_CHARS;
pub use response::ReplyError;
pub use shared_types::AnalysisResult;
