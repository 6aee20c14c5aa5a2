//! `@name` extraction from free-text comment bodies.
//!
//! The scanner is deterministic and makes no attempt to match names
//! against the directory; resolution is the notification router's job.

use std::collections::HashSet;

/// True for characters that terminate a name token: whitespace, sentence
/// punctuation, or another sigil.
fn is_token_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | '@')
}

/// Lazy iterator over raw `@name` tokens in order of appearance.
///
/// Yields duplicates; use [`extract_mentions`] for the deduplicated list.
/// Restartable by construction: it borrows the text and carries no other
/// state, so a fresh `Mentions::new` rescans from the start.
pub struct Mentions<'a> {
    rest: &'a str,
}

impl<'a> Mentions<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for Mentions<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let sigil = self.rest.find('@')?;
            let after = &self.rest[sigil + 1..];
            let end = after.find(is_token_boundary).unwrap_or(after.len());
            let token = &after[..end];
            self.rest = &after[end..];
            if !token.is_empty() {
                return Some(token);
            }
        }
    }
}

/// Extract the distinct display names mentioned in `text`, first-occurrence
/// order preserved, deduplicated by exact string match.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut names = Vec::new();
    for token in Mentions::new(text) {
        if seen.insert(token) {
            names.push(token.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_and_order() {
        let names = extract_mentions("Hi @Ana and @Bruno, cc @Ana");
        assert_eq!(names, vec!["Ana", "Bruno"]);
    }

    #[test]
    fn test_no_sigil_yields_nothing() {
        assert!(extract_mentions("plain text without mentions").is_empty());
        assert!(extract_mentions("").is_empty());
    }

    #[test]
    fn test_trailing_punctuation_stripped() {
        assert_eq!(extract_mentions("thanks @Carla!"), vec!["Carla"]);
        assert_eq!(extract_mentions("ping @Dan."), vec!["Dan"]);
        assert_eq!(extract_mentions("@Eva: see above"), vec!["Eva"]);
    }

    #[test]
    fn test_bare_sigil_skipped() {
        assert!(extract_mentions("reach me @ the office").is_empty());
        assert_eq!(extract_mentions("@@Fay"), vec!["Fay"]);
    }

    #[test]
    fn test_unicode_names() {
        assert_eq!(extract_mentions("obrigado @José!"), vec!["José"]);
    }

    #[test]
    fn test_dedup_is_exact_match() {
        // Case-folding happens at resolution time, not here.
        assert_eq!(extract_mentions("@Ana @ana"), vec!["Ana", "ana"]);
    }

    #[test]
    fn test_iterator_restartable() {
        let text = "one @A two @B";
        let first: Vec<_> = Mentions::new(text).collect();
        let second: Vec<_> = Mentions::new(text).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["A", "B"]);
    }
}
