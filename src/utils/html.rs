/// Sanitizes admin-authored quiz text before it is stored.
///
/// Whitelist-based: formatting tags such as `<b>` or `<code>` survive,
/// `<script>` and event-handler attributes are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Like [`clean_html`], for optional fields. Blank input becomes `None`.
pub fn clean_optional(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(clean_html)
}

/// Like [`clean_html`], for mandatory fields. Returns `None` when nothing
/// but whitespace is left once the markup has been sanitised.
pub fn clean_required(input: &str) -> Option<String> {
    let cleaned = clean_html(input.trim());
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
