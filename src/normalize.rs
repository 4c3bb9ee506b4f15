// Checked in order; first match wins.
const CAMPAIGN_PREFIXES: [&str; 5] = ["PARENT1: CEC", "PARENT 1: CEC", "PARENT1:", "PARENT 1:", "CEC"];

const SEPARATORS: [&str; 3] = [" - ", " – ", " — "];

const DASHES: [char; 3] = ['-', '–', '—'];

pub fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn normalize_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter().map(|h| normalize_header(h.as_ref())).collect()
}

/// Canonical form of a free-text parent-campaign name.
///
/// Keeps the text after the first spaced dash separator, strips at most one
/// known prefix, then any leading dashes. Prefix removal never cascades.
pub fn clean_campaign_name(name: &str) -> String {
    let mut name = match first_separator(name) {
        Some((at, sep)) => name[at + sep.len()..].trim(),
        None => name,
    };

    if let Some(prefix) = CAMPAIGN_PREFIXES.iter().find(|p| name.starts_with(**p)) {
        name = name[prefix.len()..].trim();
    }

    name.trim_start_matches(&DASHES[..]).trim().to_string()
}

fn first_separator(name: &str) -> Option<(usize, &'static str)> {
    SEPARATORS
        .iter()
        .filter_map(|sep| name.find(sep).map(|at| (at, *sep)))
        .min_by_key(|(at, _)| *at)
}
