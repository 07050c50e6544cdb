//! Member-name tokenizers
//!
//! Splits a member name into lower-cased tokens according to a
//! [`NameTokenizer`] convention.
//!
//! - CamelCase: `customerAddressStreet` -> `customer address street`,
//!   `HTTPServer2` -> `http server 2`, `first_name` -> `first name`
//! - Underscore: `first_name` -> `first name`, `firstName` -> `firstname`

use modelmap_core::{NameTokenizer, Token};

/// Tokenize a member name
///
/// # Example
///
/// ```
/// use modelmap_core::NameTokenizer;
/// use modelmap_matching::tokenize;
///
/// let tokens = tokenize("customerAddressStreet", NameTokenizer::CamelCase);
/// assert_eq!(tokens, vec!["customer", "address", "street"]);
/// ```
pub fn tokenize(name: &str, tokenizer: NameTokenizer) -> Vec<Token> {
    match tokenizer {
        NameTokenizer::CamelCase => tokenize_camel_case(name),
        NameTokenizer::Underscore => tokenize_underscore(name),
    }
}

fn tokenize_underscore(name: &str) -> Vec<Token> {
    name.split('_')
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn tokenize_camel_case(name: &str) -> Vec<Token> {
    let chars: Vec<char> = name.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            flush(&mut current, &mut tokens);
            continue;
        }
        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            if is_boundary(prev, c, next) {
                flush(&mut current, &mut tokens);
            }
        }
        current.push(c);
    }
    flush(&mut current, &mut tokens);
    tokens
}

/// Whether a new word starts at `c`, given the previous and next characters
fn is_boundary(prev: char, c: char, next: Option<char>) -> bool {
    // fooBar
    if prev.is_lowercase() && c.is_uppercase() {
        return true;
    }
    // item2, 2nd
    if prev.is_numeric() != c.is_numeric() {
        return true;
    }
    // HTTPServer: the last capital of an acronym starts the next word
    prev.is_uppercase() && c.is_uppercase() && next.map_or(false, char::is_lowercase)
}

fn flush(current: &mut String, tokens: &mut Vec<Token>) {
    if !current.is_empty() {
        tokens.push(current.to_lowercase());
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn camel(name: &str) -> Vec<Token> {
        tokenize(name, NameTokenizer::CamelCase)
    }

    #[test]
    fn test_camel_case_basic() {
        assert_eq!(camel("firstName"), vec!["first", "name"]);
        assert_eq!(camel("customerAddressStreet"), vec!["customer", "address", "street"]);
        assert_eq!(camel("Name"), vec!["name"]);
    }

    #[test]
    fn test_camel_case_separators_dropped() {
        assert_eq!(camel("first_Name"), vec!["first", "name"]);
        assert_eq!(camel("first_name"), vec!["first", "name"]);
        assert_eq!(camel("__id__"), vec!["id"]);
    }

    #[test]
    fn test_camel_case_acronyms() {
        assert_eq!(camel("HTTPServer"), vec!["http", "server"]);
        assert_eq!(camel("userID"), vec!["user", "id"]);
        assert_eq!(camel("URL"), vec!["url"]);
    }

    #[test]
    fn test_camel_case_digits() {
        assert_eq!(camel("address2"), vec!["address", "2"]);
        assert_eq!(camel("line2Text"), vec!["line", "2", "text"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(camel("").is_empty());
        assert!(tokenize("", NameTokenizer::Underscore).is_empty());
    }

    #[test]
    fn test_underscore() {
        assert_eq!(
            tokenize("first_name", NameTokenizer::Underscore),
            vec!["first", "name"]
        );
        assert_eq!(
            tokenize("firstName", NameTokenizer::Underscore),
            vec!["firstname"]
        );
    }

    proptest! {
        #[test]
        fn prop_camel_case_keeps_every_alphanumeric(name in "[a-zA-Z0-9_]{0,24}") {
            let joined: String = camel(&name).concat();
            let expected: String = name
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            prop_assert_eq!(joined, expected);
        }

        #[test]
        fn prop_tokens_are_lowercase_and_nonempty(name in "[a-zA-Z0-9_]{0,24}") {
            for tokenizer in [NameTokenizer::CamelCase, NameTokenizer::Underscore] {
                for token in tokenize(&name, tokenizer) {
                    prop_assert!(!token.is_empty());
                    prop_assert_eq!(token.clone(), token.to_lowercase());
                }
            }
        }
    }
}
