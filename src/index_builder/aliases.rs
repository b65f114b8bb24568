use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::food_record::normalize_name;

const SEPARATORS: [&str; 5] = [" with ", " and ", " or ", " / ", "-"];
const STOP_WORDS: [&str; 4] = ["with", "and", "the", "for"];
const MIN_FRAGMENT_CHARS: usize = 3;

static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((.*?)\)").expect("static regex is valid"));

fn long_enough(fragment: &str) -> bool {
    fragment.chars().count() > MIN_FRAGMENT_CHARS
}

/// Generates the alias set for a dish display name.
///
/// The result never contains the canonical (trimmed, lowercased) name itself
/// and never contains empty strings. Output is a sorted set, so repeated calls
/// on the same input are identical.
pub fn generate_aliases(display_name: &str) -> BTreeSet<String> {
    let canonical = normalize_name(display_name);
    let mut aliases = BTreeSet::new();

    aliases.insert(canonical.clone());

    if canonical.contains('(') && canonical.contains(')') {
        if let Some(before) = canonical.split('(').next() {
            aliases.insert(before.trim().to_string());
        }
        for group in PARENTHESIZED.captures_iter(&canonical) {
            aliases.insert(group[1].trim().to_string());
        }
    }

    for separator in SEPARATORS {
        if canonical.contains(separator) {
            aliases.extend(
                canonical
                    .split(separator)
                    .map(str::trim)
                    .filter(|part| long_enough(part))
                    .map(str::to_string),
            );
        }
    }

    // "(with" and "rice)" become "with" and "rice" before filtering.
    aliases.extend(
        canonical
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|word| long_enough(word) && !STOP_WORDS.contains(word))
            .map(str::to_string),
    );

    aliases.remove("");
    aliases.remove(&canonical);
    aliases
}
