use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::fmt::Debug;
use std::sync::Arc;

use crate::errors::{SearchError, SearchResult};

/// Compiled `/regex/` terms, shared across sessions
static REGEX_CACHE: Lazy<DashMap<String, Arc<Regex>>> = Lazy::new(DashMap::new);

/// Decides whether a candidate name matches a fixed set of search terms.
///
/// Strategies only ever call [`TermMatcher::is_match`] on full names, so any
/// matching rule can be plugged in.
pub trait TermMatcher: Debug + Send + Sync {
    fn is_match(&self, candidate: &str) -> bool;

    /// Whether candidates should be compared by their dotted full name rather
    /// than their simple name
    fn full_name_search(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
enum TermRule {
    /// Case-insensitive substring; also used for `+text`
    Contains(String),
    /// `-text`
    Excludes(String),
    /// `=text`
    Exact(String),
    /// `~text`
    Subsequence(String),
}

#[derive(Debug, Clone)]
enum Rules {
    Regex(Arc<Regex>),
    Terms(Vec<TermRule>),
}

/// The default term matcher.
///
/// A single term written as `/pattern/` is a case-insensitive regular
/// expression. Otherwise every term must hold:
///
/// | term    | rule                                                     |
/// |---------|----------------------------------------------------------|
/// | `text`  | candidate contains `text`, ignoring case                 |
/// | `+text` | same as plain                                            |
/// | `-text` | candidate does not contain `text`                        |
/// | `=text` | candidate equals `text`, ignoring a `` ` `` arity suffix  |
/// | `~text` | characters of `text` appear in order in the candidate    |
///
/// An empty term set matches everything.
#[derive(Debug, Clone)]
pub struct SearchTerms {
    terms: Vec<String>,
    rules: Rules,
    full_name_search: bool,
}

impl SearchTerms {
    pub fn new<I, S>(terms: I) -> SearchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();

        if let [single] = terms.as_slice() {
            if let Some(pattern) = regex_body(single) {
                let regex = cached_regex(pattern)?;
                return Ok(Self {
                    full_name_search: pattern.contains("\\."),
                    rules: Rules::Regex(regex),
                    terms,
                });
            }
        }

        let full_name_search = matches!(terms.as_slice(), [single] if single.len() > 2 && single.contains('.'));
        let rules = Rules::Terms(terms.iter().filter_map(|t| parse_rule(t)).collect());
        Ok(Self {
            terms,
            rules,
            full_name_search,
        })
    }

    /// Convenience for a single term
    pub fn single(term: impl Into<String>) -> SearchResult<Self> {
        Self::new([term.into()])
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_regex(&self) -> bool {
        matches!(self.rules, Rules::Regex(_))
    }
}

impl TermMatcher for SearchTerms {
    fn is_match(&self, candidate: &str) -> bool {
        match &self.rules {
            Rules::Regex(regex) => regex.is_match(candidate),
            Rules::Terms(rules) => {
                let lowered = candidate.to_lowercase();
                rules.iter().all(|rule| match rule {
                    TermRule::Contains(text) => lowered.contains(text.as_str()),
                    TermRule::Excludes(text) => !lowered.contains(text.as_str()),
                    TermRule::Exact(text) => {
                        let base = lowered.split('`').next().unwrap_or("");
                        base == text
                    }
                    TermRule::Subsequence(text) => is_subsequence(&lowered, text),
                })
            }
        }
    }

    fn full_name_search(&self) -> bool {
        self.full_name_search
    }
}

fn regex_body(term: &str) -> Option<&str> {
    if term.len() > 2 && term.starts_with('/') && term.ends_with('/') {
        Some(&term[1..term.len() - 1])
    } else {
        None
    }
}

fn cached_regex(pattern: &str) -> SearchResult<Arc<Regex>> {
    if let Some(entry) = REGEX_CACHE.get(pattern) {
        return Ok(Arc::clone(entry.value()));
    }
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| SearchError::invalid_pattern(e.to_string()))?;
    let regex = Arc::new(regex);
    REGEX_CACHE.insert(pattern.to_string(), Arc::clone(&regex));
    Ok(regex)
}

/// Terms that carry no constraint (empty, or a bare operator) are dropped
fn parse_rule(term: &str) -> Option<TermRule> {
    let lowered = term.to_lowercase();
    let (operator, rest) = match lowered.chars().next()? {
        c @ ('+' | '-' | '=' | '~') => (Some(c), &lowered[1..]),
        _ => (None, lowered.as_str()),
    };
    if rest.is_empty() {
        return None;
    }
    let rest = rest.to_string();
    Some(match operator {
        Some('-') => TermRule::Excludes(rest),
        Some('=') => TermRule::Exact(rest),
        Some('~') => TermRule::Subsequence(rest),
        _ => TermRule::Contains(rest),
    })
}

fn is_subsequence(text: &str, pattern: &str) -> bool {
    let mut chars = text.chars();
    pattern.chars().all(|p| chars.any(|c| c == p))
}
