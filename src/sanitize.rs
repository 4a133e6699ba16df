//! sanitize.rs — recover a candidate JSON body from a raw completion response.
//!
//! Models regularly wrap their JSON in markdown code fences despite being told
//! not to. The contract here: prefer the first ```json-tagged block, then the
//! first untagged fenced block, else return the text trimmed. No JSON
//! validation happens here; the caller hands the result to a parser.

/// Strip markdown fence wrapping, if any, and trim surrounding whitespace.
pub fn sanitize_response(raw: &str) -> String {
    let text = raw.trim();
    if let Some(body) = fenced_block(text, "```json") {
        return body;
    }
    if let Some(body) = fenced_block(text, "```") {
        return body;
    }
    text.to_string()
}

/// Content after the first `marker` up to the next closing fence. A missing
/// closing fence yields the trimmed remainder.
fn fenced_block(text: &str, marker: &str) -> Option<String> {
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    let body = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(body.trim().to_string())
}
