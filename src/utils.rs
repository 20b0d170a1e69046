use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\x{4e00}-\x{9fff}]+").unwrap());

/// URL slug from a title. CJK ideographs are kept as-is.
pub fn slugify(s: &str) -> String {
    let lower = s.to_lowercase();
    NON_SLUG_RE
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}
