//! Keyword matching over file and directory names.
//!
//! A raw term like `"Foo Bar=baz"` becomes the lower-cased OR-set
//! `{"foo bar", "foo.bar", "baz"}`. A name matches when it contains any of
//! them. Tokens ending in a multi-byte character also yield a "partial"
//! keyword with that character removed; a name that only contains a partial
//! keyword is reported but never matches.

use std::collections::BTreeSet;
use tracing::warn;

const TOKEN_SEPARATOR: char = '=';

/// Context label used when matching full paths rather than names in a directory.
pub const NO_CONTEXT: &str = "[NONE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Match,
    /// Contains a partial keyword but no full one.
    Partial,
    Miss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatcher {
    keywords: BTreeSet<String>,
    partials: BTreeSet<String>,
}

impl KeywordMatcher {
    pub fn new(raw_term: &str) -> Self {
        let lowered = raw_term.to_lowercase();
        let mut tokens: Vec<&str> = lowered.split(TOKEN_SEPARATOR).collect();
        if tokens.iter().any(|t| !t.is_empty()) {
            tokens.retain(|t| !t.is_empty());
        } else {
            tokens = vec![""];
        }

        let mut keywords = BTreeSet::new();
        let mut partials = BTreeSet::new();
        for token in tokens {
            keywords.insert(token.to_string());

            let dotted = token.replace(' ', ".");
            if dotted != token {
                keywords.insert(dotted);
            }

            if let Some(partial) = partial_keyword(token) {
                partials.insert(partial.to_string());
            }
        }

        Self { keywords, partials }
    }

    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    pub fn partials(&self) -> &BTreeSet<String> {
        &self.partials
    }

    pub fn evaluate(&self, candidate: &str) -> MatchOutcome {
        let lowered = candidate.to_lowercase();
        if self.keywords.iter().any(|k| lowered.contains(k.as_str())) {
            MatchOutcome::Match
        } else if self.partials.iter().any(|p| lowered.contains(p.as_str())) {
            MatchOutcome::Partial
        } else {
            MatchOutcome::Miss
        }
    }

    /// Same as [`evaluate`](Self::evaluate) but reports partial hits, naming
    /// `context` (usually the parent directory) so the operator can find them.
    pub fn is_match(&self, candidate: &str, context: &str) -> bool {
        match self.evaluate(candidate) {
            MatchOutcome::Match => true,
            MatchOutcome::Partial => {
                warn!("Partial match {}/{}", context, candidate);
                false
            }
            MatchOutcome::Miss => false,
        }
    }
}

/// The token minus its last character, when that character is multi-byte
/// and the token has more than two characters.
fn partial_keyword(token: &str) -> Option<&str> {
    let last = token.chars().next_back()?;
    if last.len_utf8() <= 1 || token.chars().count() <= 2 {
        return None;
    }
    let partial = &token[..token.len() - last.len_utf8()];
    (!partial.is_empty()).then_some(partial)
}

/// Order-independent form of a raw term, used to name default exports.
pub fn canonicalize(raw_term: &str) -> String {
    let mut tokens: Vec<&str> = raw_term.split(TOKEN_SEPARATOR).collect();
    tokens.sort_unstable();
    tokens.join("=")
}
