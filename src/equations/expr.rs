//! Regular expressions as manipulated by the equation solver
//!
//! The constructors only apply the identities of the empty set and the
//! empty word, flatten nested sums and products and drop repeated terms
//! of a sum. No further simplification takes place.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// The empty language `∅`
    Empty,
    /// The empty word `ε`
    Epsilon,
    Symbol(String),
    Concat(Vec<Expr>),
    Union(Vec<Expr>),
    Star(Box<Expr>),
}

impl Expr {
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Expr::Symbol(symbol.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Expr::Empty)
    }

    pub fn concat(self, other: Expr) -> Expr {
        match (self, other) {
            (Expr::Empty, _) | (_, Expr::Empty) => Expr::Empty,
            (Expr::Epsilon, e) | (e, Expr::Epsilon) => e,
            (Expr::Concat(mut left), Expr::Concat(right)) => {
                left.extend(right);
                Expr::Concat(left)
            }
            (Expr::Concat(mut left), right) => {
                left.push(right);
                Expr::Concat(left)
            }
            (left, Expr::Concat(mut right)) => {
                right.insert(0, left);
                Expr::Concat(right)
            }
            (left, right) => Expr::Concat(vec![left, right]),
        }
    }

    pub fn union(self, other: Expr) -> Expr {
        let mut terms = match self {
            Expr::Empty => Vec::new(),
            Expr::Union(terms) => terms,
            e => vec![e],
        };
        let others = match other {
            Expr::Empty => Vec::new(),
            Expr::Union(terms) => terms,
            e => vec![e],
        };
        for term in others {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        match terms.len() {
            0 => Expr::Empty,
            1 => terms.pop().unwrap_or(Expr::Empty),
            _ => Expr::Union(terms),
        }
    }

    pub fn star(self) -> Expr {
        match self {
            Expr::Empty | Expr::Epsilon => Expr::Epsilon,
            Expr::Star(e) => Expr::Star(e),
            e => Expr::Star(Box::new(e)),
        }
    }

    /// Does the expression need parentheses when used as a factor?
    fn is_sum(&self) -> bool {
        matches!(self, Expr::Union(_))
    }

    fn is_atom(&self) -> bool {
        match self {
            Expr::Empty | Expr::Epsilon => true,
            Expr::Symbol(s) => s.chars().count() == 1,
            Expr::Star(_) => true,
            Expr::Concat(_) | Expr::Union(_) => false,
        }
    }

    /// Format as the coefficient of a variable, e.g. the `(a + b)` of `(a + b)X1`
    pub(crate) fn fmt_factor(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sum() {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Empty => write!(f, "∅"),
            Expr::Epsilon => write!(f, "ε"),
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::Concat(factors) => {
                for factor in factors {
                    factor.fmt_factor(f)?;
                }
                Ok(())
            }
            Expr::Union(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{}", term)?;
                }
                Ok(())
            }
            Expr::Star(e) if e.is_atom() => write!(f, "{}*", e),
            Expr::Star(e) => write!(f, "({})*", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> Expr {
        Expr::symbol("a")
    }

    fn b() -> Expr {
        Expr::symbol("b")
    }

    #[test]
    fn identities() {
        assert_eq!(a().concat(Expr::Epsilon), a());
        assert_eq!(Expr::Empty.concat(a()), Expr::Empty);
        assert_eq!(Expr::Empty.union(a()), a());
        assert_eq!(a().union(a()), a());
        assert_eq!(Expr::Empty.star(), Expr::Epsilon);
        assert_eq!(a().star().star(), a().star());
    }

    #[test]
    fn display() {
        assert_eq!(a().star().concat(b()).to_string(), "a*b");
        assert_eq!(a().union(b()).star().to_string(), "(a + b)*");
        assert_eq!(a().union(b()).concat(b()).to_string(), "(a + b)b");
        assert_eq!(a().concat(b()).star().to_string(), "(ab)*");
        assert_eq!(b().union(Expr::Epsilon).to_string(), "b + ε");
        assert_eq!(Expr::Empty.to_string(), "∅");
    }

    #[test]
    fn flatten() {
        let abc = a().concat(b()).concat(Expr::symbol("c"));
        assert_eq!(
            abc,
            Expr::Concat(vec![a(), b(), Expr::symbol("c")])
        );
        let sum = a().union(b()).union(a().union(Expr::symbol("c")));
        assert_eq!(sum.to_string(), "a + b + c");
    }
}
