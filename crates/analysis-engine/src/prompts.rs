//! Prompt templates

/// Document text beyond this many characters is not sent to the model
pub const MAX_DOCUMENT_CHARS: usize = 25_000;

/// Prefix of `text` holding at most `max_chars` characters.
///
/// Counts Unicode scalar values, so a multi-byte character is never split.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Prompt asking for the structured analysis as bare JSON
pub fn analysis_prompt(document_text: &str) -> String {
    let text = truncate_chars(document_text, MAX_DOCUMENT_CHARS);
    format!(
        r#"You are a legal document analyzer. Analyze this document and respond with ONLY valid JSON in the exact format specified.

Document Text:
{text}

Respond with valid JSON only (no markdown, no explanations):
{{
    "summary": "Brief explanation of the document's purpose and main points",
    "key_clauses": [
        {{"clause": "Clause name", "explanation": "Simple explanation", "location": "Section reference"}}
    ],
    "obligations": [
        {{"party": "Who", "obligation": "What they must do", "consequence": "Result of non-compliance"}}
    ],
    "risks": [
        {{"type": "Financial", "description": "Risk description", "severity": "High"}}
    ],
    "unusual_terms": [
        {{"term": "Term name", "explanation": "Why unusual", "recommendation": "What to do"}}
    ]
}}"#
    )
}

/// Single-turn question about a document
pub fn chat_prompt(document_text: &str, question: &str) -> String {
    let text = truncate_chars(document_text, MAX_DOCUMENT_CHARS);
    format!(
        "You are analyzing a legal document. Answer the following question about it:\n\n\
         Document: {text}\n\n\
         Question: {question}\n\n\
         Please provide a clear and concise answer based on the document content."
    )
}
