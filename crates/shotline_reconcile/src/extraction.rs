//! Locating the JSON payload inside a model reply.
//!
//! Replies usually wrap the payload in a markdown fence or surround it with
//! conversational prose. Nothing here checks well-formedness; the normalizer
//! decides whether the span actually decodes.

const FENCE: &str = "```";

/// Find the span of a reply believed to hold a single JSON value.
///
/// Strategies, in order:
/// 1. The first fenced block opened by ```` ```json ```` (any case) or a bare
///    ```` ``` ````, closed by the next fence. Returns the trimmed interior.
/// 2. The inclusive span from the first `{` or `[` to the last `}` or `]`.
///
/// Returns `None` when neither strategy finds anything.
///
/// # Examples
///
/// ```
/// use shotline_reconcile::extract_json_span;
///
/// let reply = "Here you go:\n```JSON\n[{\"shot\": 1}]\n```\nEnjoy!";
/// assert_eq!(extract_json_span(reply), Some("[{\"shot\": 1}]"));
///
/// let prose = "Sure: {\"entries\": []} hope that helps";
/// assert_eq!(extract_json_span(prose), Some("{\"entries\": []}"));
///
/// assert_eq!(extract_json_span("no payload here"), None);
/// ```
pub fn extract_json_span(response: &str) -> Option<&str> {
    if let Some(block) = extract_from_code_block(response) {
        return Some(block);
    }

    let start = response.find(['{', '['])?;
    let end = response.rfind(['}', ']'])?;
    if start < end {
        Some(&response[start..=end])
    } else {
        tracing::debug!(
            response_length = response.len(),
            "Closing delimiter precedes opening delimiter"
        );
        None
    }
}

/// Interior of the first `json` or untagged fenced block.
///
/// Blocks tagged with another language are skipped. An unclosed fence ends
/// the search.
fn extract_from_code_block(response: &str) -> Option<&str> {
    let mut cursor = 0;
    while let Some(offset) = response[cursor..].find(FENCE) {
        let after_fence = cursor + offset + FENCE.len();
        let rest = &response[after_fence..];
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        let tag = &rest[..tag_len];
        let content_start = after_fence + tag_len;

        let end = response[content_start..].find(FENCE)?;
        let content_end = content_start + end;

        if tag.is_empty() || tag.eq_ignore_ascii_case("json") {
            return Some(response[content_start..content_end].trim());
        }

        tracing::trace!(tag, "Skipping fenced block in another language");
        cursor = content_end + FENCE.len();
    }
    None
}
