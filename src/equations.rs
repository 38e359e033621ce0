//! Right-linear equation systems over regular languages
//!
//! Every state `q` of an automaton gives a variable `Xq` for the language
//! accepted from `q`, and one equation
//!
//! ```text
//! Xq = a·Xp + b·Xr + ... + ε    (ε only if q is final)
//! ```
//!
//! Systems are solved by Gauss-Jordan elimination: variables are taken in
//! order, Arden's lemma (`X = αX + β` has the solution `X = α*β`) removes
//! the self reference of the current variable, and the result is
//! substituted into every other equation. After one pass no equation
//! refers to any variable anymore.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

use log::debug;

use crate::automaton::{Automaton, Label, State, natural_cmp};

mod expr;
mod parser;

pub use expr::Expr;
pub use parser::parse_system;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EquationError {
    #[error("Line {line}: expected `Variable = expression`, got {found:?}")]
    Malformed { line: usize, found: String },
    #[error("Line {line}: unexpected {found:?} at column {column}")]
    UnexpectedToken {
        line: usize,
        column: usize,
        found: String,
    },
    #[error("Line {line}: variable {variable} must end its term")]
    NotRightLinear { line: usize, variable: Variable },
    #[error("Line {line}: variable {variable} is defined twice")]
    DuplicateVariable { line: usize, variable: Variable },
    #[error("Variable {0} is used but has no equation")]
    UndefinedVariable(Variable),
    #[error("The system could not be solved for {}", .0.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", "))]
    Unresolvable(Vec<Variable>),
}

/// The name of an unknown of a system, `X1`, `Xq0`, ...
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The variable standing for the language accepted from `state`
    pub fn for_state(state: &State) -> Self {
        Self(format!("X{}", state))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.0, &other.0)
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `Σ coefficient·variable + constant`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearForm {
    terms: BTreeMap<Variable, Expr>,
    constant: Expr,
}

impl Default for LinearForm {
    fn default() -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: Expr::Empty,
        }
    }
}

impl LinearForm {
    pub fn constant(expr: Expr) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: expr,
        }
    }

    /// Add `coefficient·variable`, factoring terms of the same variable
    pub fn add_term(&mut self, coefficient: Expr, variable: Variable) {
        if coefficient.is_empty() {
            return;
        }
        let term = self.terms.remove(&variable).unwrap_or(Expr::Empty);
        self.terms.insert(variable, term.union(coefficient));
    }

    pub fn add_constant(&mut self, expr: Expr) {
        let constant = std::mem::replace(&mut self.constant, Expr::Empty);
        self.constant = constant.union(expr);
    }

    pub fn terms(&self) -> &BTreeMap<Variable, Expr> {
        &self.terms
    }

    pub fn constant_term(&self) -> &Expr {
        &self.constant
    }

    pub fn coefficient(&self, variable: &Variable) -> Option<&Expr> {
        self.terms.get(variable)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.terms.keys()
    }

    pub fn is_closed(&self) -> bool {
        self.terms.is_empty()
    }

    /// `prefix · self`
    fn prefixed(self, prefix: &Expr) -> Self {
        let mut result = LinearForm::constant(prefix.clone().concat(self.constant));
        for (variable, coefficient) in self.terms {
            result.add_term(prefix.clone().concat(coefficient), variable);
        }
        result
    }

    /// Arden's lemma: the solution of `variable = self`, free of `variable`
    fn arden(mut self, variable: &Variable) -> Self {
        match self.terms.remove(variable) {
            Some(alpha) => self.prefixed(&alpha.star()),
            None => self,
        }
    }

    /// Replace `variable` by `value`
    fn substitute(mut self, variable: &Variable, value: &LinearForm) -> Self {
        let Some(coefficient) = self.terms.remove(variable) else {
            return self;
        };
        let LinearForm { terms, constant } = value.clone().prefixed(&coefficient);
        self.add_constant(constant);
        for (variable, coefficient) in terms {
            self.add_term(coefficient, variable);
        }
        self
    }
}

impl fmt::Display for LinearForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (variable, coefficient) in &self.terms {
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            if *coefficient != Expr::Epsilon {
                coefficient.fmt_factor(f)?;
            }
            write!(f, "{}", variable)?;
        }
        match (&self.constant, first) {
            (Expr::Empty, false) => Ok(()),
            (constant, true) => write!(f, "{}", constant),
            (constant, false) => write!(f, " + {}", constant),
        }
    }
}

/// One equation per variable, ordered by variable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquationSystem {
    equations: BTreeMap<Variable, LinearForm>,
}

impl EquationSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the equation of `variable`, returning the previous one
    pub fn insert(&mut self, variable: Variable, form: LinearForm) -> Option<LinearForm> {
        self.equations.insert(variable, form)
    }

    pub fn get(&self, variable: &Variable) -> Option<&LinearForm> {
        self.equations.get(variable)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &LinearForm)> {
        self.equations.iter()
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    fn check_defined(&self) -> Result<(), EquationError> {
        let undefined: BTreeSet<&Variable> = self
            .equations
            .values()
            .flat_map(LinearForm::variables)
            .filter(|variable| !self.equations.contains_key(*variable))
            .collect();
        match undefined.first() {
            Some(variable) => Err(EquationError::UndefinedVariable((*variable).clone())),
            None => Ok(()),
        }
    }
}

impl fmt::Display for EquationSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (variable, form) in &self.equations {
            writeln!(f, "{} = {}", variable, form)?;
        }
        Ok(())
    }
}

impl FromStr for EquationSystem {
    type Err = EquationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_system(s)
    }
}

/// One equation per state of `automaton`
pub fn generate_equations(automaton: &Automaton) -> EquationSystem {
    let mut system = EquationSystem::new();
    for state in automaton.states() {
        let mut form = LinearForm::default();
        for (label, targets) in automaton.outgoing(state) {
            let coefficient = match label {
                Label::Symbol(symbol) => Expr::symbol(symbol.as_str()),
                Label::Epsilon => Expr::Epsilon,
            };
            for target in targets {
                form.add_term(coefficient.clone(), Variable::for_state(target));
            }
        }
        if automaton.is_final(state) {
            form.add_constant(Expr::Epsilon);
        }
        system.insert(Variable::for_state(state), form);
    }
    system
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMethod {
    Arden,
    Substitution,
}

impl fmt::Display for StepMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepMethod::Arden => write!(f, "Lemme d'Arden"),
            StepMethod::Substitution => write!(f, "Substitution"),
        }
    }
}

/// One rewriting of one equation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveStep {
    pub method: StepMethod,
    /// The variable being eliminated
    pub variable: Variable,
    /// The variable whose equation was rewritten
    pub target: Variable,
    pub before: LinearForm,
    pub after: LinearForm,
}

impl fmt::Display for SolveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} = {}  =>  {} = {}",
            self.method, self.variable, self.target, self.before, self.target, self.after
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub solutions: BTreeMap<Variable, Expr>,
    pub steps: Vec<SolveStep>,
}

/// Solve `system` for every variable
pub fn solve_equations(system: &EquationSystem) -> Result<Solution, EquationError> {
    system.check_defined()?;
    let mut equations = system.equations.clone();
    let mut steps = Vec::new();
    let variables: Vec<Variable> = equations.keys().cloned().collect();

    for variable in &variables {
        let Some(form) = equations.remove(variable) else {
            continue;
        };
        let solved = if form.coefficient(variable).is_some() {
            let after = form.clone().arden(variable);
            debug!("Arden on {}: {} => {}", variable, form, after);
            steps.push(SolveStep {
                method: StepMethod::Arden,
                variable: variable.clone(),
                target: variable.clone(),
                before: form,
                after: after.clone(),
            });
            after
        } else {
            form
        };

        for (target, form) in equations.iter_mut() {
            if form.coefficient(variable).is_none() {
                continue;
            }
            let before = form.clone();
            *form = before.clone().substitute(variable, &solved);
            steps.push(SolveStep {
                method: StepMethod::Substitution,
                variable: variable.clone(),
                target: target.clone(),
                before,
                after: form.clone(),
            });
        }
        equations.insert(variable.clone(), solved);
    }

    let unresolved: Vec<Variable> = equations
        .iter()
        .filter(|(_, form)| !form.is_closed())
        .map(|(variable, _)| variable.clone())
        .collect();
    if !unresolved.is_empty() {
        return Err(EquationError::Unresolvable(unresolved));
    }

    let solutions = equations
        .into_iter()
        .map(|(variable, form)| (variable, form.constant))
        .collect();
    Ok(Solution { solutions, steps })
}

/// A regular expression for the language of `automaton`
pub fn to_regex(automaton: &Automaton) -> Result<Expr, EquationError> {
    let solution = solve_equations(&generate_equations(automaton))?;
    let mut expr = Expr::Empty;
    for state in automaton.initial_states() {
        if let Some(solution) = solution.solutions.get(&Variable::for_state(state)) {
            expr = expr.union(solution.clone());
        }
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::tests::{end_to_end, second_to_last_a};
    use crate::operations::equivalent;
    use crate::regex::{Method, build_from_regex};

    fn x(name: &str) -> Variable {
        Variable::new(name)
    }

    #[test]
    fn arden() {
        let system: EquationSystem = "X1 = aX1 + b".parse().unwrap();
        let solution = solve_equations(&system).unwrap();
        assert_eq!(solution.solutions[&x("X1")].to_string(), "a*b");
        assert_eq!(solution.steps.len(), 1);
        let step = &solution.steps[0];
        assert_eq!(step.method, StepMethod::Arden);
        assert_eq!(step.method.to_string(), "Lemme d'Arden");
        assert_eq!(step.before.to_string(), "aX1 + b");
        assert_eq!(step.after.to_string(), "a*b");
    }

    #[test]
    fn generate() {
        let system = generate_equations(&end_to_end());
        assert_eq!(
            system.to_string(),
            "Xq0 = aXq1\nXq1 = bXq1 + aXq2\nXq2 = (a + b)Xq2 + ε\n"
        );
    }

    #[test]
    fn substitution() {
        let system: EquationSystem = "X1 = aX2 + ε; X2 = bX1".parse().unwrap();
        let solution = solve_equations(&system).unwrap();
        assert_eq!(solution.solutions[&x("X1")].to_string(), "ε + a(ba)*b");
        assert_eq!(solution.solutions[&x("X2")].to_string(), "(ba)*b");
        let methods: Vec<StepMethod> = solution.steps.iter().map(|s| s.method).collect();
        assert_eq!(
            methods,
            [
                StepMethod::Substitution,
                StepMethod::Arden,
                StepMethod::Substitution
            ]
        );
    }

    #[test]
    fn undefined_variable() {
        let system: EquationSystem = "X1 = aX2".parse().unwrap();
        assert_eq!(
            solve_equations(&system),
            Err(EquationError::UndefinedVariable(x("X2")))
        );
    }

    #[test]
    fn empty_language() {
        let system: EquationSystem = "X1 = aX1".parse().unwrap();
        let solution = solve_equations(&system).unwrap();
        assert_eq!(solution.solutions[&x("X1")], Expr::Empty);
    }

    fn round_trip(automaton: &Automaton) {
        let expr = to_regex(automaton).unwrap();
        let expression = expr.to_string().replace(" + ", "|");
        let rebuilt = build_from_regex(&expression, Method::Glushkov).unwrap();
        assert!(equivalent(automaton, &rebuilt), "{}", expression);
    }

    #[test]
    fn automaton_to_regex() {
        assert_eq!(to_regex(&end_to_end()).unwrap().to_string(), "ab*a(a + b)*");
        round_trip(&end_to_end());
        round_trip(&second_to_last_a());
    }
}
