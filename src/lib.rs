//! Finite automata: simulation, determinization, minimization, completion,
//! construction from regular expressions and conversion back through
//! systems of language equations.
//!
//! Every operation takes an immutable [`Automaton`] and returns a new value,
//! usually together with a trace of what was done.

use automaton::Label;

pub mod analysis;
pub mod automaton;
pub mod canonical;
pub mod check;
pub mod complete;
pub mod determinize;
pub mod display;
pub mod equations;
pub mod loader;
pub mod minimize;
pub mod operations;
pub mod regex;
pub mod simulation;
pub mod transform;
pub mod yaml;

pub use analysis::{Analysis, analyze};
pub use automaton::{Automaton, AutomatonDefinition, Report, ValidationError, validate};
pub use canonical::canonize;
pub use complete::{Completion, complete};
pub use determinize::determinize;
pub use equations::{EquationSystem, Solution, generate_equations, solve_equations};
pub use minimize::{Distinction, Minimization, distinguishing_words, minimize};
pub use regex::{Method, build_from_regex};
pub use simulation::{Simulation, simulate};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    NotDeterministic(#[from] automaton::NotDeterministic),
    #[error(transparent)]
    Simulation(#[from] simulation::SimulationError),
    #[error(transparent)]
    Regex(#[from] regex::RegexError),
    #[error(transparent)]
    Equation(#[from] equations::EquationError),
    #[error(transparent)]
    Transform(#[from] transform::TransformError),
    #[error(transparent)]
    Load(#[from] loader::LoadError),
    #[error(transparent)]
    Check(#[from] check::CheckError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Build an automaton from its parts, reporting every violation at once.
///
/// Transitions are `(from, label, to)` triples, `ε` labels an
/// ε-transition.
pub fn build(
    alphabet: &[&str],
    states: &[&str],
    transitions: &[(&str, &str, &str)],
    initial_states: &[&str],
    final_states: &[&str],
) -> Result<Automaton, ValidationError> {
    let mut builder = Automaton::builder()
        .symbols(alphabet.iter().copied())
        .states(states.iter().copied());
    for state in initial_states {
        builder = builder.initial(*state);
    }
    for state in final_states {
        builder = builder.final_state(*state);
    }
    for (from, label, to) in transitions {
        builder = builder.transition(*from, Label::from(*label), *to);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end_to_end() -> Automaton {
        build(
            &["a", "b"],
            &["q0", "q1", "q2"],
            &[
                ("q0", "a", "q1"),
                ("q1", "a", "q2"),
                ("q1", "b", "q1"),
                ("q2", "a", "q2"),
                ("q2", "b", "q2"),
            ],
            &["q0"],
            &["q2"],
        )
        .unwrap()
    }

    #[test]
    fn end_to_end_scenario() {
        let automaton = end_to_end();
        assert!(simulate(&automaton, "aa").unwrap().accepted);
        assert!(!simulate(&automaton, "b").unwrap().accepted);
        // q0 -a-> q1 -b-> q1, and q1 is not final
        assert!(!simulate(&automaton, "ab").unwrap().accepted);
        assert!(simulate(&automaton, "aba").unwrap().accepted);
    }

    #[test]
    fn facade() {
        let automaton = end_to_end();
        let dfa = determinize(&automaton);
        let completed = complete(&dfa);
        assert!(completed.sink.is_some());
        let minimal = minimize(&completed.automaton).unwrap();
        assert_eq!(minimal.automaton.states().len(), 4);
        assert_eq!(canonize(&minimal.automaton), canonize(&canonize(&minimal.automaton)));
        assert!(analyze(&automaton).useless.is_empty());
        let solution = solve_equations(&generate_equations(&automaton)).unwrap();
        assert_eq!(solution.solutions.len(), 3);
        let rebuilt = build_from_regex("ab*a(a|b)*", Method::Glushkov).unwrap();
        assert!(operations::equivalent(&automaton, &rebuilt));
    }

    #[test]
    fn build_reports_epsilon_labels() {
        let automaton = build(&["a"], &["0", "1"], &[("0", "ε", "1")], &["0"], &["1"]).unwrap();
        assert!(automaton.has_epsilon());
        assert!(simulate(&automaton, "").unwrap().accepted);
    }

    #[test]
    fn errors_convert() {
        let error: Error = build(&["a"], &["0"], &[], &["1"], &[]).unwrap_err().into();
        assert!(matches!(error, Error::Validation(_)));
    }
}
