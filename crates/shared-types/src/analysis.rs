//! Structured analysis of a legal document
//!
//! The shape mirrors the JSON object the generative model is asked to
//! produce. Absent fields take their defaults so a partially filled reply
//! still yields a usable record. A field that is present must have the right
//! type: `null` or a number where a string or list belongs is an error.

use serde::{Deserialize, Serialize};

/// Summary used when the model omits one.
pub const DEFAULT_SUMMARY: &str = "Document analysis completed.";

/// Analysis of a single document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default = "default_summary")]
    pub summary: String,
    #[serde(default)]
    pub key_clauses: Vec<KeyClause>,
    #[serde(default)]
    pub obligations: Vec<Obligation>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub unusual_terms: Vec<UnusualTerm>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyClause {
    #[serde(default)]
    pub clause: String,
    #[serde(default)]
    pub explanation: String,
    /// Section reference, e.g. "Section 4.2"
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    #[serde(default)]
    pub party: String,
    #[serde(default)]
    pub obligation: String,
    /// What happens on non-compliance
    #[serde(default)]
    pub consequence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    /// Risk category, e.g. "Financial"
    #[serde(rename = "type", default)]
    pub risk_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusualTerm {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub recommendation: String,
}

impl AnalysisResult {
    /// Record returned when the model replied but the reply was not usable JSON.
    ///
    /// Points the user at the chat feature, which does not depend on
    /// structured output.
    pub fn parse_fallback() -> Self {
        Self {
            summary: "The document has been processed. The AI analysis is available through the chat feature.".to_string(),
            key_clauses: vec![KeyClause {
                clause: "Document Processed".to_string(),
                explanation: "Use the chat feature to ask about specific clauses".to_string(),
                location: "Throughout document".to_string(),
            }],
            obligations: vec![Obligation {
                party: "Document parties".to_string(),
                obligation: "Refer to original document".to_string(),
                consequence: "Use chat for specific details".to_string(),
            }],
            risks: vec![Risk {
                risk_type: "General".to_string(),
                description: "Use chat to identify specific risks".to_string(),
                severity: "Medium".to_string(),
            }],
            unusual_terms: vec![UnusualTerm {
                term: "Various".to_string(),
                explanation: "Chat with AI to identify unusual terms".to_string(),
                recommendation: "Review document carefully".to_string(),
            }],
        }
    }

    /// Record returned when the call to the model itself failed.
    pub fn call_fallback() -> Self {
        Self {
            summary: "Document uploaded successfully. AI analysis encountered an issue, but you can still chat about the document.".to_string(),
            key_clauses: vec![KeyClause {
                clause: "Upload Successful".to_string(),
                explanation: "Document processed, use chat for analysis".to_string(),
                location: "N/A".to_string(),
            }],
            obligations: vec![Obligation {
                party: "User".to_string(),
                obligation: "Use chat feature for detailed analysis".to_string(),
                consequence: "Limited automated analysis".to_string(),
            }],
            risks: vec![Risk {
                risk_type: "Technical".to_string(),
                description: "AI analysis partially unavailable".to_string(),
                severity: "Low".to_string(),
            }],
            unusual_terms: vec![UnusualTerm {
                term: "Processing".to_string(),
                explanation: "Use chat feature for detailed term analysis".to_string(),
                recommendation: "Ask specific questions".to_string(),
            }],
        }
    }
}

fn default_summary() -> String {
    DEFAULT_SUMMARY.to_string()
}
