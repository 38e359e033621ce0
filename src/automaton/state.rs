//! State identifiers and transition labels
//!
//! States are opaque names. They are ordered "naturally", i.e. runs of
//! digits compare by their numeric value, so that `q2` sorts before `q10`
//! and `9` before `10`. This keeps sorted listings readable and makes
//! [canonization](crate::canonical::canonize) a fixed point.

use std::{cmp::Ordering, collections::BTreeSet, fmt, iter::Peekable, str::Chars};

use serde::{Deserialize, Serialize};

/// The printable name of the empty word
pub const EPSILON: &str = "ε";

/// Spellings that are accepted for the empty word in external input
const EPSILON_ALIASES: [&str; 3] = [EPSILON, "eps", "epsilon"];

/// Is `symbol` one of the accepted spellings of the empty word?
pub fn is_epsilon(symbol: &str) -> bool {
    EPSILON_ALIASES.contains(&symbol)
}

/// A set of states compared by content. Used directly as a map key
/// during subset construction.
pub type StateSet = BTreeSet<State>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(String);

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// The numeric value of the state name if it is a plain integer
    pub fn as_number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for State {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for State {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<usize> for State {
    fn from(id: usize) -> Self {
        Self(id.to_string())
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.0, &other.0)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn take_number(chars: &mut Peekable<Chars>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        digits.push(c);
    }
    digits
}

fn cmp_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compare two names so that embedded numbers are ordered by value.
///
/// Names that only differ in leading zeros are ordered by their raw text,
/// so the ordering is consistent with string equality.
pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l = take_number(&mut left);
                let r = take_number(&mut right);
                match cmp_numbers(&l, &r) {
                    Ordering::Equal => (),
                    ordering => return ordering,
                }
            }
            (Some(l), Some(r)) => {
                left.next();
                right.next();
                match l.cmp(&r) {
                    Ordering::Equal => (),
                    ordering => return ordering,
                }
            }
        }
    }
}

/// The label of a transition: either an alphabet symbol or the empty word
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Symbol(String),
    Epsilon,
}

impl Label {
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Label::Symbol(symbol.into())
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Label::Epsilon)
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Label::Symbol(symbol) => Some(symbol),
            Label::Epsilon => None,
        }
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        if is_epsilon(value) {
            Label::Epsilon
        } else {
            Label::Symbol(value.to_string())
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Symbol(symbol) => write!(f, "{}", symbol),
            Label::Epsilon => write!(f, "{}", EPSILON),
        }
    }
}
