//! Regular expressions and their translation into automata
//!
//! Expressions are made of alphanumeric symbols (upper case letters are
//! folded to lower case), `ε` for the empty word, union `|`, an optional
//! explicit concatenation `.`, the postfix operators `*`, `+` and `?`, and
//! parentheses. Postfix operators bind tightest, union loosest. Whitespace
//! is ignored.

use std::{collections::BTreeSet, fmt, str::FromStr};

use log::debug;

use crate::automaton::{Automaton, ValidationError};

mod glushkov;
mod parser;
mod thompson;

pub use glushkov::glushkov;
pub use parser::parse;
pub use thompson::thompson;

/// Abstract syntax tree of a regular expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Regex {
    Epsilon,
    Symbol(char),
    Concat(Box<Regex>, Box<Regex>),
    Union(Box<Regex>, Box<Regex>),
    Star(Box<Regex>),
    Plus(Box<Regex>),
    Optional(Box<Regex>),
}

impl Regex {
    /// The distinct symbols of the expression, sorted
    pub fn symbols(&self) -> BTreeSet<char> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, symbols: &mut BTreeSet<char>) {
        match self {
            Regex::Epsilon => (),
            Regex::Symbol(c) => {
                symbols.insert(*c);
            }
            Regex::Concat(left, right) | Regex::Union(left, right) => {
                left.collect_symbols(symbols);
                right.collect_symbols(symbols);
            }
            Regex::Star(regex) | Regex::Plus(regex) | Regex::Optional(regex) => {
                regex.collect_symbols(symbols)
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Regex::Union(_, _) => 0,
            Regex::Concat(_, _) => 1,
            Regex::Star(_) | Regex::Plus(_) | Regex::Optional(_) => 2,
            Regex::Epsilon | Regex::Symbol(_) => 3,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regex::Epsilon => write!(f, "ε"),
            Regex::Symbol(c) => write!(f, "{}", c),
            Regex::Concat(left, right) => {
                left.fmt_operand(f, 1)?;
                right.fmt_operand(f, 2)
            }
            Regex::Union(left, right) => {
                left.fmt_operand(f, 0)?;
                write!(f, "|")?;
                right.fmt_operand(f, 1)
            }
            Regex::Star(regex) => {
                regex.fmt_operand(f, 3)?;
                write!(f, "*")
            }
            Regex::Plus(regex) => {
                regex.fmt_operand(f, 3)?;
                write!(f, "+")
            }
            Regex::Optional(regex) => {
                regex.fmt_operand(f, 3)?;
                write!(f, "?")
            }
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    #[error("Unexpected {character:?} at position {position} in {expression:?}")]
    UnexpectedCharacter {
        expression: String,
        character: char,
        position: usize,
    },
    #[error("Unbalanced parenthesis at position {position} in {expression:?}")]
    UnbalancedParenthesis { expression: String, position: usize },
    #[error("Operand expected at position {position} in {expression:?}")]
    MissingOperand { expression: String, position: usize },
    #[error("Empty group at position {position} in {expression:?}")]
    EmptyGroup { expression: String, position: usize },
    #[error("No symbols found in {expression:?}")]
    NoSymbols { expression: String },
    #[error("Building an automaton for {expression:?} failed: {source}")]
    Construction {
        expression: String,
        source: ValidationError,
    },
    #[error("Unknown construction method {0:?}, expected thompson or glushkov")]
    UnknownMethod(String),
}

/// How to turn an expression into an automaton
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    /// ε-NFA built from one small fragment per operator
    #[default]
    Thompson,
    /// Position automaton without ε-transitions
    Glushkov,
}

impl FromStr for Method {
    type Err = RegexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "thompson" => Ok(Method::Thompson),
            "glushkov" => Ok(Method::Glushkov),
            _ => Err(RegexError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Thompson => write!(f, "thompson"),
            Method::Glushkov => write!(f, "glushkov"),
        }
    }
}

/// The alphabet of `expression`: its distinct symbols, sorted
pub fn alphabet(expression: &str) -> Result<BTreeSet<String>, RegexError> {
    let regex = parse(expression)?;
    symbols(expression, &regex)
}

fn symbols(expression: &str, regex: &Regex) -> Result<BTreeSet<String>, RegexError> {
    let symbols: BTreeSet<String> = regex.symbols().iter().map(char::to_string).collect();
    if symbols.is_empty() {
        return Err(RegexError::NoSymbols {
            expression: expression.to_string(),
        });
    }
    Ok(symbols)
}

/// Parse `expression` and build an automaton for it with `method`
pub fn build_from_regex(expression: &str, method: Method) -> Result<Automaton, RegexError> {
    let regex = parse(expression)?;
    let alphabet = symbols(expression, &regex)?;
    debug!("building {} automaton for {}", method, regex);
    let automaton = match method {
        Method::Thompson => thompson(&regex, alphabet),
        Method::Glushkov => glushkov(&regex, alphabet),
    };
    let violations = automaton.violations();
    if !violations.is_empty() {
        return Err(RegexError::Construction {
            expression: expression.to_string(),
            source: ValidationError(violations),
        });
    }
    Ok(automaton)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{accepts, simulate_symbols, tests::assert_same_language};

    fn both(expression: &str) -> [Automaton; 2] {
        [Method::Thompson, Method::Glushkov]
            .map(|method| build_from_regex(expression, method).unwrap())
    }

    #[test]
    fn concatenation() {
        for automaton in both("ab") {
            assert!(accepts(&automaton, "ab").unwrap());
            assert!(!accepts(&automaton, "ba").unwrap());
            assert!(!accepts(&automaton, "a").unwrap());
        }
    }

    #[test]
    fn kleene() {
        for automaton in both("a*") {
            assert!(accepts(&automaton, "").unwrap());
            assert!(accepts(&automaton, "aaa").unwrap());
            // b is not even in the alphabet
            assert!(accepts(&automaton, "b").is_err());
            assert!(!simulate_symbols(&automaton, &["b"]).accepted);
        }
        for automaton in both("a*b") {
            assert!(!accepts(&automaton, "").unwrap());
            assert!(!accepts(&automaton, "ba").unwrap());
        }
    }

    #[test]
    fn one_or_more() {
        for automaton in both("a+") {
            assert!(!accepts(&automaton, "").unwrap());
            assert!(accepts(&automaton, "a").unwrap());
            assert!(accepts(&automaton, "aa").unwrap());
        }
    }

    #[test]
    fn nested() {
        let [thompson, glushkov] = both("(ab)*|c+");
        for automaton in [&thompson, &glushkov] {
            assert!(accepts(automaton, "").unwrap());
            assert!(accepts(automaton, "abab").unwrap());
            assert!(accepts(automaton, "ccc").unwrap());
            assert!(!accepts(automaton, "abc").unwrap());
            assert!(!accepts(automaton, "aba").unwrap());
        }
        assert_same_language(&thompson, &glushkov, 6);

        let [thompson, glushkov] = both("(a|b)*abb?");
        assert_same_language(&thompson, &glushkov, 7);
    }

    #[test]
    fn capital_epsilon() {
        for method in [Method::Thompson, Method::Glushkov] {
            for expression in ["Ε", "aΕ"] {
                assert!(matches!(
                    build_from_regex(expression, method),
                    Err(RegexError::UnexpectedCharacter { character: 'Ε', .. })
                ));
            }
        }
    }

    #[test]
    fn alphabet_extraction() {
        let alphabet = alphabet("(B|a)*c").unwrap();
        assert_eq!(alphabet, BTreeSet::from(["a", "b", "c"].map(String::from)));
        assert_eq!(
            super::alphabet("ε*"),
            Err(RegexError::NoSymbols {
                expression: "ε*".into()
            })
        );
    }

    #[test]
    fn display() {
        for expression in ["(ab)*|c+", "a(b|c)?", "(a*)*", "ab|ε"] {
            assert_eq!(parse(expression).unwrap().to_string(), expression);
        }
        assert_eq!(parse("a . b").unwrap().to_string(), "ab");
    }

    #[test]
    fn method() {
        assert_eq!("Glushkov".parse(), Ok(Method::Glushkov));
        assert_eq!(
            "brzozowski".parse::<Method>(),
            Err(RegexError::UnknownMethod("brzozowski".into()))
        );
    }
}
