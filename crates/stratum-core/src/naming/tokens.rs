//! Identifier tokenization for community naming.

/// Common words that never make a good community name.
const STOP_WORDS: &[&str] = &[
    "the",
    "for",
    "one",
    "and",
    "with",
    "from",
    "this",
    "that",
    "not",
    "implicitly",
    "has",
    "but",
    "are",
    "have",
    "all",
];

/// Minimum token length (in bytes) worth naming a community after.
pub const MIN_TOKEN_LEN: usize = 3;

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Split an identifier on case and digit boundaries.
///
/// `HTTPClientFactory2` → `["HTTP", "Client", "Factory", "2"]`.
pub fn split_identifier(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_alphabetic() && c.is_ascii_digit())
                || (prev.is_ascii_digit() && c.is_alphabetic())
                || (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.is_some_and(|n| n.is_lowercase()));
            if boundary && !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Upper-case the first character, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_acronyms_and_digits() {
        assert_eq!(
            split_identifier("HTTPClientFactory2"),
            vec!["HTTP", "Client", "Factory", "2"]
        );
    }

    #[test]
    fn splits_camel_case() {
        assert_eq!(split_identifier("userRepository"), vec!["user", "Repository"]);
        assert_eq!(split_identifier("Billing"), vec!["Billing"]);
        assert!(split_identifier("").is_empty());
    }

    #[test]
    fn title_cases_words() {
        assert_eq!(title_case("billing"), "Billing");
        assert_eq!(title_case("HTTP"), "Http");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn stop_words() {
        assert!(is_stop_word("the"));
        assert!(is_stop_word("implicitly"));
        assert!(!is_stop_word("invoice"));
    }
}
