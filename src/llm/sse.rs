//! Server-sent event decoding for streamed chat completions
//!
//! OpenRouter streams OpenAI-compatible events, one per line:
//! `data: {"choices":[{"delta":{"content":"..."},"finish_reason":null}]}`
//! with a literal `data: [DONE]` line ending the stream. Lines without the
//! data marker are ignored.

use serde::Deserialize;

use super::stream::Fragment;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct StreamPayload {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<UpstreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Decode one line of the event stream into fragments to relay.
///
/// Returns an empty vec for lines that carry nothing (blank lines, SSE
/// comments, lines without the data marker, deltas with no content). A
/// payload may yield several content fragments; a terminal fragment, when
/// present, is always last. A payload that fails to decode yields exactly
/// one error fragment; the producing task stops rather than resynchronize.
pub fn parse_sse_line(line: &str) -> Vec<Fragment> {
    let line = line.trim();

    if line.is_empty() || line.starts_with(':') {
        return Vec::new();
    }

    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        return Vec::new();
    };

    if data.trim() == DONE_SENTINEL {
        return vec![Fragment::Done];
    }

    let payload: StreamPayload = match serde_json::from_str(data) {
        Ok(payload) => payload,
        Err(e) => return vec![Fragment::Error(format!("JSON parse error: {e}"))],
    };

    if let Some(err) = payload.error {
        let kind = err.kind.as_deref().unwrap_or("unknown");
        return vec![Fragment::Error(format!(
            "upstream error: {} (type: {kind})",
            err.message
        ))];
    }

    let mut fragments = Vec::new();
    for choice in payload.choices {
        if let Some(text) = choice.delta.content {
            if !text.is_empty() {
                fragments.push(Fragment::Content(text));
            }
        }
        if choice.finish_reason.as_deref().is_some_and(|r| !r.is_empty()) {
            fragments.push(Fragment::Done);
            break;
        }
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_delta() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hello"},"finish_reason":null}]}"#;
        assert_eq!(
            parse_sse_line(line),
            vec![Fragment::Content("Hello".to_string())]
        );
    }

    #[test]
    fn done_sentinel() {
        assert_eq!(parse_sse_line("data: [DONE]"), vec![Fragment::Done]);
    }

    #[test]
    fn finish_reason_ends_the_stream() {
        let line = r#"data: {"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        assert_eq!(parse_sse_line(line), vec![Fragment::Done]);
    }

    #[test]
    fn delta_and_finish_reason_in_one_payload() {
        let line = r#"data: {"choices":[{"delta":{"content":"end"},"finish_reason":"stop"}]}"#;
        assert_eq!(
            parse_sse_line(line),
            vec![Fragment::Content("end".to_string()), Fragment::Done]
        );
    }

    #[test]
    fn multiple_choices_yield_multiple_fragments() {
        let line = r#"data: {"choices":[{"delta":{"content":"a"}},{"delta":{"content":"b"}}]}"#;
        assert_eq!(
            parse_sse_line(line),
            vec![
                Fragment::Content("a".to_string()),
                Fragment::Content("b".to_string())
            ]
        );
    }

    #[test]
    fn malformed_payload_yields_one_error() {
        let fragments = parse_sse_line("data: {not valid json");
        assert_eq!(fragments.len(), 1);
        assert!(matches!(fragments[0], Fragment::Error(_)));
    }

    #[test]
    fn upstream_error_object() {
        let line = r#"data: {"choices":[],"error":{"message":"quota exceeded","type":"billing"}}"#;
        let fragments = parse_sse_line(line);
        assert_eq!(fragments.len(), 1);
        match &fragments[0] {
            Fragment::Error(message) => {
                assert!(message.contains("quota exceeded"));
                assert!(message.contains("billing"));
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn null_finish_reason_is_not_terminal() {
        let line = r#"data: {"choices":[{"delta":{"content":"x"},"finish_reason":null}]}"#;
        assert_eq!(
            parse_sse_line(line),
            vec![Fragment::Content("x".to_string())]
        );
    }

    #[test]
    fn empty_delta_is_skipped() {
        let line = r#"data: {"choices":[{"delta":{"content":""},"finish_reason":null}]}"#;
        assert!(parse_sse_line(line).is_empty());
    }

    #[test]
    fn lines_without_the_marker_are_ignored() {
        assert!(parse_sse_line("event: ping").is_empty());
        assert!(parse_sse_line("").is_empty());
        assert!(parse_sse_line("   ").is_empty());
        assert!(parse_sse_line(": keep-alive").is_empty());
    }
}
