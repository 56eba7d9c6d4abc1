//! Refusal detection.

/// Return the first refusal phrase found in `content`, case-insensitively.
pub fn detect_refusal<'a>(content: &str, phrases: &'a [String]) -> Option<&'a str> {
    let haystack = content.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");
    phrases
        .iter()
        .map(String::as_str)
        .find(|phrase| !phrase.is_empty() && haystack.contains(&phrase.to_lowercase()))
}
