use regex::Regex;
use std::sync::LazyLock;

static UNSAFE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<script|onerror=|onload=|javascript:").expect("unsafe pattern regex is valid")
});

/// Count script openers, `onerror=`/`onload=` handlers and `javascript:` URIs
/// in raw Markdown.
///
/// This scans the input, not the sanitizer's output, so it only estimates
/// how much the sanitizer will strip. It feeds a diagnostic message and must
/// not be used to decide whether output is safe.
pub fn estimate_unsafe(markdown: &str) -> usize {
    UNSAFE_PATTERN.find_iter(markdown).count()
}
