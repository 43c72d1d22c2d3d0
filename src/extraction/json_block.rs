/// Span from the first `{` through the last `}` in `text`.
///
/// Greedy and non-balancing: a stray `}` in trailing prose extends the span,
/// and an unmatched `}` before the real object ends truncates it. Callers must
/// still parse the result.
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}
