//! Small text helpers shared by the frontend and the relay.

/// Parse the raw word-input text into the submitted word list.
///
/// Words are separated by commas or newlines. Entries are trimmed, empties
/// are dropped, and duplicates (after normalization) are removed with the
/// first occurrence winning, so the lesson ends up with exactly one card
/// per distinct word.
pub fn parse_word_list(text: &str) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    text.split([',', '\n'])
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .filter(|word| seen.insert(normalize_word(word)))
        .map(str::to_string)
        .collect()
}

/// The key used to match generated contexts back to submitted words.
///
/// The batch generation call does not guarantee that its output array lines
/// up positionally with the request, so both sides are compared through
/// this normalization: lowercased, with runs of whitespace collapsed.
pub fn normalize_word(word: &str) -> String {
    word.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_commas_and_newlines() {
        let words = parse_word_list("run, jump\nswim,  climb  ");
        assert_eq!(words, vec!["run", "jump", "swim", "climb"]);
    }

    #[test]
    fn test_parse_drops_empties_and_duplicates() {
        let words = parse_word_list("run,, RUN\n ,run ,walk");
        assert_eq!(words, vec!["run", "walk"]);
    }

    #[test]
    fn test_parse_of_blank_input_is_empty() {
        assert!(parse_word_list("").is_empty());
        assert!(parse_word_list(" ,\n, ").is_empty());
    }

    #[test]
    fn test_normalize_collapses_case_and_whitespace() {
        assert_eq!(normalize_word("  Give  Up "), "give up");
        assert_eq!(normalize_word("café"), "café");
    }
}
