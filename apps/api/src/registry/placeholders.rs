use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Matches `{{variable_name}}` where the name is `[a-z0-9_]+`.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([a-z0-9_]+)\}\}").unwrap());

/// Distinct placeholder names in order of first appearance.
pub fn extract_placeholders(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Placeholders with no definition; these stay verbatim in merged output.
pub fn unknown_placeholders<'a, I>(content: &str, known: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let known: HashSet<&str> = known.into_iter().collect();
    extract_placeholders(content)
        .into_iter()
        .filter(|name| !known.contains(name.as_str()))
        .collect()
}

pub fn is_valid_variable_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
