use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters dropped before names are compared
const STRIPPED_CHARS: [char; 5] = ['.', ',', '\'', '"', '\u{2019}'];

/// Generational suffixes removed from the end of a name
const NAME_SUFFIXES: [&str; 5] = ["iii", "iv", "ii", "jr", "sr"];

/// A display name reduced to its comparable form: lower-case, no
/// punctuation, single spaces, no trailing generational suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedName(String);

impl NormalizedName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last whitespace-separated token ("gabe davis" -> "davis")
    pub fn last_token(&self) -> Option<&str> {
        self.0.split(' ').next_back().filter(|t| !t.is_empty())
    }

    /// Whether this name is `token` or ends with `" " + token`
    pub fn ends_with_token(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        self.0 == token
            || (self.0.len() > token.len()
                && self.0.ends_with(token)
                && self.0[..self.0.len() - token.len()].ends_with(' '))
    }
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalize a display name for comparison.
///
/// Pure and total: empty input gives an empty name. Suffixes are only
/// removed when another token precedes them, so "Jr" alone survives.
pub fn normalize(name: &str) -> NormalizedName {
    let lowered: String =
        name.to_lowercase().chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();

    let mut tokens: Vec<&str> = lowered.split_whitespace().collect();
    while tokens.len() > 1 && tokens.last().is_some_and(|t| NAME_SUFFIXES.contains(t)) {
        tokens.pop();
    }

    NormalizedName(tokens.join(" "))
}

/// Team comparison where a missing side never disqualifies a match.
pub fn team_equal(a: Option<&str>, b: Option<&str>) -> bool {
    let a = a.map(str::trim).unwrap_or_default();
    let b = b.map(str::trim).unwrap_or_default();
    if a.is_empty() || b.is_empty() {
        return true;
    }
    a.to_uppercase() == b.to_uppercase()
}
