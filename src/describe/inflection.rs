//! Pluralization for description text.
//!
//! Table names are pluralized ("Orders", "Categories") and row counts get a
//! count-aware unit ("1 row", "10 rows"). Irregular nouns that show up as
//! table names are handled here before deferring to `inflector`.

use inflector::Inflector;

static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("leaf", "leaves"),
    ("analysis", "analyses"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
];

/// Pluralize the last word of a display name, keeping its capitalization.
pub fn pluralize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    let (prefix, word) = match name.rfind(' ') {
        Some(split) => name.split_at(split + 1),
        None => ("", name),
    };
    format!("{prefix}{}", pluralize_word(word))
}

fn pluralize_word(word: &str) -> String {
    let lower = word.to_lowercase();
    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *singular || lower == *plural {
            return match_case(word, plural);
        }
    }
    word.to_plural()
}

// "Person" -> "People", "PERSON" -> "PEOPLE"
fn match_case(original: &str, replacement: &str) -> String {
    if original.len() > 1 && original.chars().all(|c| !c.is_lowercase()) {
        replacement.to_uppercase()
    } else if original.starts_with(char::is_uppercase) {
        let mut chars = replacement.chars();
        chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect())
            .unwrap_or_default()
    } else {
        replacement.to_string()
    }
}

/// `word` as is when `count` is one, pluralized otherwise.
pub fn inflect(word: &str, count: i64) -> String {
    if count == 1 {
        word.to_string()
    } else {
        pluralize(word)
    }
}
