/// Normalize `text` into lowercase terms.
///
/// Every character that is not an ASCII letter, ASCII digit or whitespace
/// becomes a space, then the text is split on whitespace runs. Lowercasing is
/// ASCII-only, so one input character never expands into several.
///
/// # Examples
///
/// ```
/// use helpdesk::tokenizer::tokenize;
///
/// assert_eq!(tokenize("Cost: $0/month"), vec!["cost", "0", "month"]);
/// assert!(tokenize("  ?! ").is_empty());
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else if c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    normalized.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_splits() {
        assert_eq!(tokenize("Pricing Plans"), vec!["pricing", "plans"]);
    }

    #[test]
    fn punctuation_becomes_separator() {
        assert_eq!(
            tokenize("## 30-Day Guarantee"),
            vec!["30", "day", "guarantee"]
        );
        assert_eq!(tokenize("pricing & costs!"), vec!["pricing", "costs"]);
    }

    #[test]
    fn underscore_is_not_a_word_character() {
        assert_eq!(tokenize("api_key"), vec!["api", "key"]);
    }

    #[test]
    fn empty_and_whitespace_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n ").is_empty());
        assert!(tokenize("!!! ---").is_empty());
    }

    #[test]
    fn non_ascii_letters_are_separators() {
        assert_eq!(tokenize("Café ÜBER"), vec!["caf", "ber"]);
    }

    #[test]
    fn dotted_capital_i_does_not_split_into_fragments() {
        // Unicode lowercasing would turn this into "i" plus a combining dot.
        assert_eq!(tokenize("İstanbul"), vec!["stanbul"]);
        assert_eq!(tokenize("İ"), Vec::<String>::new());
    }

    #[test]
    fn deterministic() {
        let text = "Refund Policy: 30 days, no questions asked.";
        assert_eq!(tokenize(text), tokenize(text));
    }
}
