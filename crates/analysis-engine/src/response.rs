//! Model reply normalization

use serde_json::Value;
use shared_types::AnalysisResult;
use thiserror::Error;

/// Why a reply could not become an [`AnalysisResult`]
#[derive(Error, Debug)]
pub enum ReplyError {
    /// The reply is not JSON at all
    #[error("reply is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    /// The reply is JSON, but not an object of the analysis shape
    #[error("reply JSON has the wrong shape: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Strip a surrounding markdown code fence, with or without a `json` tag.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    }
    if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse a raw model reply into an analysis record.
///
/// Absent fields take defaults. Text that is not JSON is a
/// [`ReplyError::Syntax`]; JSON that is not an object of the expected shape
/// (a list, `null` fields, numbers where strings belong) is a
/// [`ReplyError::Shape`].
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, ReplyError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw)).map_err(ReplyError::Syntax)?;
    serde_json::from_value(value).map_err(ReplyError::Shape)
}

/// First `max` characters of a reply, for log lines
pub(crate) fn excerpt(raw: &str, max: usize) -> String {
    crate::prompts::truncate_chars(raw, max).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use shared_types::analysis::DEFAULT_SUMMARY;

    #[test]
    fn test_bare_json_unchanged() {
        assert_eq!(strip_code_fence(r#"{"summary": "x"}"#), r#"{"summary": "x"}"#);
    }

    #[test]
    fn test_strips_json_tagged_fence() {
        let raw = "```json\n{\"summary\": \"x\"}\n```";
        assert_eq!(strip_code_fence(raw), r#"{"summary": "x"}"#);
    }

    #[test]
    fn test_strips_untagged_fence() {
        let raw = "  ```\n{\"summary\": \"x\"}\n```  ";
        assert_eq!(strip_code_fence(raw), r#"{"summary": "x"}"#);
    }

    #[test]
    fn test_parses_fenced_analysis() {
        let raw = "```json\n{\"summary\": \"Employment contract\", \"risks\": [{\"type\": \"Legal\", \"description\": \"Non-compete\", \"severity\": \"High\"}]}\n```";
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.summary, "Employment contract");
        assert_eq!(analysis.risks.len(), 1);
        assert!(analysis.key_clauses.is_empty());
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let analysis = parse_analysis("{}").unwrap();
        assert_eq!(analysis.summary, DEFAULT_SUMMARY);
    }

    #[test]
    fn test_prose_is_syntax_error() {
        assert!(matches!(
            parse_analysis("Sure! Here is the analysis you asked for."),
            Err(ReplyError::Syntax(_))
        ));
        assert!(matches!(
            parse_analysis("```json\n{\"summary\": \"cut off\n```"),
            Err(ReplyError::Syntax(_))
        ));
    }

    #[test]
    fn test_non_object_is_shape_error() {
        assert!(matches!(parse_analysis("[1, 2, 3]"), Err(ReplyError::Shape(_))));
        assert!(matches!(parse_analysis("null"), Err(ReplyError::Shape(_))));
    }

    #[test]
    fn test_wrong_field_type_is_shape_error() {
        for raw in [
            r#"{"key_clauses": "none"}"#,
            r#"{"summary": null}"#,
            r#"{"risks": [{"type": "Legal", "severity": 3}]}"#,
        ] {
            assert!(matches!(parse_analysis(raw), Err(ReplyError::Shape(_))), "{raw}");
        }
    }

    proptest! {
        /// Property: fenced and unfenced forms of the same object parse identically
        #[test]
        fn fence_does_not_change_parse(summary in "[A-Za-z0-9 .,]{0,80}") {
            let body = serde_json::json!({ "summary": summary }).to_string();
            let plain = parse_analysis(&body).unwrap();
            let fenced = parse_analysis(&format!("```json\n{body}\n```")).unwrap();
            let bare_fence = parse_analysis(&format!("```\n{body}\n```")).unwrap();
            prop_assert_eq!(&plain, &fenced);
            prop_assert_eq!(&plain, &bare_fence);
        }
    }
}
