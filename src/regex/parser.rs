use std::{iter::Peekable, str::Chars};

use super::{Regex, RegexError};
use crate::automaton::is_epsilon;

/// Recursive descent parser for regular expressions
pub struct RegexParser<'a> {
    expression: &'a str,
    chars: Peekable<Chars<'a>>,
    position: usize,
    depth: usize,
}

impl<'a> RegexParser<'a> {
    pub fn new(expression: &'a str) -> Self {
        Self {
            expression,
            chars: expression.chars().peekable(),
            position: 0,
            depth: 0,
        }
    }

    fn peek(&mut self) -> Option<char> {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {
            self.position += 1;
        }
        self.chars.peek().copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.chars.next();
            self.position += 1;
        }
        c
    }

    fn missing_operand(&self) -> RegexError {
        RegexError::MissingOperand {
            expression: self.expression.to_string(),
            position: self.position,
        }
    }

    fn unbalanced(&self) -> RegexError {
        RegexError::UnbalancedParenthesis {
            expression: self.expression.to_string(),
            position: self.position,
        }
    }

    fn union(&mut self) -> Result<Regex, RegexError> {
        let mut regex = self.concatenation()?;
        while self.peek() == Some('|') {
            self.next();
            let right = self.concatenation()?;
            regex = Regex::Union(Box::new(regex), Box::new(right));
        }
        Ok(regex)
    }

    fn concatenation(&mut self) -> Result<Regex, RegexError> {
        let mut regex: Option<Regex> = None;
        loop {
            match self.peek() {
                None | Some('|') | Some(')') => break,
                Some('.') if regex.is_some() => {
                    self.next();
                    if matches!(self.peek(), None | Some('|') | Some(')')) {
                        return Err(self.missing_operand());
                    }
                }
                Some(_) => {
                    let right = self.postfix()?;
                    regex = Some(match regex {
                        Some(left) => Regex::Concat(Box::new(left), Box::new(right)),
                        None => right,
                    });
                }
            }
        }
        match (regex, self.peek()) {
            (Some(regex), _) => Ok(regex),
            (None, Some(')')) if self.depth > 0 => Err(RegexError::EmptyGroup {
                expression: self.expression.to_string(),
                position: self.position,
            }),
            (None, Some(')')) => Err(self.unbalanced()),
            (None, _) => Err(self.missing_operand()),
        }
    }

    fn postfix(&mut self) -> Result<Regex, RegexError> {
        let mut regex = self.atom()?;
        loop {
            regex = match self.peek() {
                Some('*') => Regex::Star(Box::new(regex)),
                Some('+') => Regex::Plus(Box::new(regex)),
                Some('?') => Regex::Optional(Box::new(regex)),
                _ => return Ok(regex),
            };
            self.next();
        }
    }

    fn atom(&mut self) -> Result<Regex, RegexError> {
        match self.peek() {
            Some('(') => {
                self.next();
                self.depth += 1;
                let regex = self.union()?;
                if self.next() != Some(')') {
                    return Err(self.unbalanced());
                }
                self.depth -= 1;
                Ok(regex)
            }
            Some('ε') => {
                self.next();
                Ok(Regex::Epsilon)
            }
            Some(c) if c.is_alphanumeric() => {
                let symbol = c.to_lowercase().next().unwrap_or(c);
                // `Ε` folds to the empty word, which is not a symbol
                if is_epsilon(&symbol.to_string()) {
                    return Err(RegexError::UnexpectedCharacter {
                        expression: self.expression.to_string(),
                        character: c,
                        position: self.position,
                    });
                }
                self.next();
                Ok(Regex::Symbol(symbol))
            }
            Some('*') | Some('+') | Some('?') | Some('.') => Err(self.missing_operand()),
            Some(character) => Err(RegexError::UnexpectedCharacter {
                expression: self.expression.to_string(),
                character,
                position: self.position,
            }),
            None => Err(self.missing_operand()),
        }
    }

    pub fn parse(mut self) -> Result<Regex, RegexError> {
        let regex = self.union()?;
        match self.peek() {
            None => Ok(regex),
            Some(')') => Err(self.unbalanced()),
            Some(character) => Err(RegexError::UnexpectedCharacter {
                expression: self.expression.to_string(),
                character,
                position: self.position,
            }),
        }
    }
}

/// Parse a regular expression into its syntax tree
pub fn parse(expression: &str) -> Result<Regex, RegexError> {
    RegexParser::new(expression).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(c: char) -> Box<Regex> {
        Box::new(Regex::Symbol(c))
    }

    #[test]
    fn precedence() {
        assert_eq!(
            parse("ab*|c").unwrap(),
            Regex::Union(
                Box::new(Regex::Concat(
                    symbol('a'),
                    Box::new(Regex::Star(symbol('b')))
                )),
                symbol('c')
            )
        );
    }

    #[test]
    fn groups() {
        assert_eq!(
            parse("(a|b)+").unwrap(),
            Regex::Plus(Box::new(Regex::Union(symbol('a'), symbol('b'))))
        );
        assert_eq!(parse(" ( A ) ").unwrap(), Regex::Symbol('a'));
        assert_eq!(parse("a.b").unwrap(), parse("ab").unwrap());
        assert_eq!(
            parse("aε").unwrap(),
            Regex::Concat(symbol('a'), Box::new(Regex::Epsilon))
        );
    }

    #[test]
    fn errors() {
        let expression = |s: &str| s.to_string();
        assert_eq!(
            parse("(ab"),
            Err(RegexError::UnbalancedParenthesis {
                expression: expression("(ab"),
                position: 3
            })
        );
        assert_eq!(
            parse("ab)"),
            Err(RegexError::UnbalancedParenthesis {
                expression: expression("ab)"),
                position: 2
            })
        );
        assert_eq!(
            parse("a|"),
            Err(RegexError::MissingOperand {
                expression: expression("a|"),
                position: 2
            })
        );
        assert_eq!(
            parse("*a"),
            Err(RegexError::MissingOperand {
                expression: expression("*a"),
                position: 0
            })
        );
        assert_eq!(
            parse("a()"),
            Err(RegexError::EmptyGroup {
                expression: expression("a()"),
                position: 2
            })
        );
        assert_eq!(
            parse("a#b"),
            Err(RegexError::UnexpectedCharacter {
                expression: expression("a#b"),
                character: '#',
                position: 1
            })
        );
        assert!(matches!(parse(""), Err(RegexError::MissingOperand { .. })));
    }

    #[test]
    fn capital_epsilon_is_not_a_symbol() {
        assert_eq!(
            parse("aΕ"),
            Err(RegexError::UnexpectedCharacter {
                expression: "aΕ".to_string(),
                character: 'Ε',
                position: 1
            })
        );
        assert!(matches!(
            parse("Ε"),
            Err(RegexError::UnexpectedCharacter { character: 'Ε', .. })
        ));
    }
}
