//! Parser for hand-written equation systems
//!
//! One equation per line (or separated by `;`), of the form
//!
//! ```text
//! X1 = aX1 + bX2 + ε
//! ```
//!
//! Variables start with an upper case letter and run up to the next space
//! or operator, so `Xq0` is one variable. A symbol following a variable
//! must therefore be separated from it: `X1 = aX1 b` rather than
//! `aX1b`. Symbols are lower case letters or digits. `+` and `|` separate terms, `ε` is the empty word
//! and `∅` the empty language. A term is a product of factors, optionally
//! ending in a variable. `#` starts a comment.

use std::{iter::Peekable, str::Chars};

use super::{EquationError, EquationSystem, Expr, LinearForm, Variable};

struct EquationParser<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

fn starts_factor(c: char) -> bool {
    c.is_lowercase() || c.is_ascii_digit() || c == 'ε' || c == '∅' || c == '('
}

impl<'a> EquationParser<'a> {
    fn new(source: &'a str, line: usize) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            line,
            column: 0,
        }
    }

    fn peek(&mut self) -> Option<char> {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {
            self.column += 1;
        }
        self.chars.peek().copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.chars.next();
            self.column += 1;
        }
        c
    }

    fn unexpected(&mut self) -> EquationError {
        let found = match self.peek() {
            Some(c) => c.to_string(),
            None => "end of line".to_string(),
        };
        EquationError::UnexpectedToken {
            line: self.line,
            column: self.column + 1,
            found,
        }
    }

    fn malformed(&self) -> EquationError {
        EquationError::Malformed {
            line: self.line,
            found: self.source.trim().to_string(),
        }
    }

    fn variable(&mut self) -> Option<Variable> {
        let first = self.peek().filter(|c| c.is_uppercase())?;
        let mut name = String::from(first);
        self.next();
        while let Some(c) = self.chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
            self.column += 1;
            name.push(c);
        }
        Some(Variable::new(name))
    }

    fn atom(&mut self) -> Result<Expr, EquationError> {
        match self.peek() {
            Some('ε') => {
                self.next();
                Ok(Expr::Epsilon)
            }
            Some('∅') => {
                self.next();
                Ok(Expr::Empty)
            }
            Some('(') => {
                self.next();
                let expr = self.group()?;
                if self.peek() != Some(')') {
                    return Err(self.unexpected());
                }
                self.next();
                Ok(expr)
            }
            Some(c) if c.is_lowercase() || c.is_ascii_digit() => {
                self.next();
                Ok(Expr::symbol(c))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn factor(&mut self) -> Result<Expr, EquationError> {
        let mut expr = self.atom()?;
        while self.peek() == Some('*') {
            self.next();
            expr = expr.star();
        }
        Ok(expr)
    }

    /// A sum inside parentheses, which must not contain variables
    fn group(&mut self) -> Result<Expr, EquationError> {
        let mut sum = Expr::Empty;
        loop {
            let (coefficient, variable) = self.term()?;
            if let Some(variable) = variable {
                return Err(EquationError::NotRightLinear {
                    line: self.line,
                    variable,
                });
            }
            sum = sum.union(coefficient);
            match self.peek() {
                Some('+') | Some('|') => {
                    self.next();
                }
                _ => return Ok(sum),
            }
        }
    }

    /// `factor* Variable?`, with at least one of them
    fn term(&mut self) -> Result<(Expr, Option<Variable>), EquationError> {
        let mut coefficient = None;
        loop {
            match self.peek() {
                Some('.') | Some('·') => {
                    self.next();
                }
                Some(c) if starts_factor(c) => {
                    let factor = self.factor()?;
                    coefficient = Some(match coefficient {
                        Some(left) => Expr::concat(left, factor),
                        None => factor,
                    });
                }
                _ => break,
            }
        }
        let variable = self.variable();
        if let Some(variable) = &variable {
            if self.peek().is_some_and(starts_factor) {
                return Err(EquationError::NotRightLinear {
                    line: self.line,
                    variable: variable.clone(),
                });
            }
        }
        match (coefficient, variable) {
            (None, None) => Err(self.unexpected()),
            (coefficient, variable) => Ok((coefficient.unwrap_or(Expr::Epsilon), variable)),
        }
    }

    fn equation(mut self) -> Result<(Variable, LinearForm), EquationError> {
        let variable = self.variable().ok_or_else(|| self.malformed())?;
        if self.next() != Some('=') {
            return Err(self.malformed());
        }
        let mut form = LinearForm::default();
        loop {
            match self.term()? {
                (coefficient, Some(variable)) => form.add_term(coefficient, variable),
                (constant, None) => form.add_constant(constant),
            }
            match self.peek() {
                Some('+') | Some('|') => {
                    self.next();
                }
                None => return Ok((variable, form)),
                Some(_) => return Err(self.unexpected()),
            }
        }
    }
}

/// Parse a whole system, one equation per line or `;`-separated segment
pub fn parse_system(source: &str) -> Result<EquationSystem, EquationError> {
    let mut system = EquationSystem::new();
    let mut references = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;
        let line = line.split('#').next().unwrap_or_default();
        for segment in line.split(';').filter(|s| !s.trim().is_empty()) {
            let (variable, form) = EquationParser::new(segment, line_number).equation()?;
            if system.get(&variable).is_some() {
                return Err(EquationError::DuplicateVariable {
                    line: line_number,
                    variable,
                });
            }
            references.extend(form.variables().map(|used| (line_number, used.clone())));
            system.insert(variable, form);
        }
    }
    glued_symbols(&system, &references)?;
    Ok(system)
}

/// `X1 = aX1b` reads as a term ending in the variable `X1b`. When only
/// `X1` has an equation, report the symbol after `X1` instead of an
/// undefined variable.
fn glued_symbols(
    system: &EquationSystem,
    references: &[(usize, Variable)],
) -> Result<(), EquationError> {
    for (line, used) in references {
        if system.get(used).is_some() {
            continue;
        }
        let name = used.name();
        let defined = name
            .char_indices()
            .skip(1)
            .filter(|(_, c)| c.is_lowercase())
            .map(|(i, _)| Variable::new(&name[..i]))
            .find(|prefix| system.get(prefix).is_some());
        if let Some(variable) = defined {
            return Err(EquationError::NotRightLinear {
                line: *line,
                variable,
            });
        }
    }
    Ok(())
}
