//! Named transformations, so that pipelines can be given as text on the
//! command line or in test files

use std::{fmt, str::FromStr};

use log::info;

use crate::analysis::trim;
use crate::automaton::{Automaton, NotDeterministic};
use crate::canonical::canonize;
use crate::complete::{complement, complete};
use crate::determinize::{determinize, remove_epsilon};
use crate::minimize::minimize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Determinize,
    Minimize,
    Complete,
    Complement,
    Trim,
    Canonize,
    RemoveEpsilon,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Unknown transformation {0:?}")]
    Unknown(String),
    #[error("Cannot {transform}: {source}")]
    NotDeterministic {
        transform: Transform,
        source: NotDeterministic,
    },
}

impl Transform {
    pub const ALL: [Transform; 7] = [
        Transform::Determinize,
        Transform::Minimize,
        Transform::Complete,
        Transform::Complement,
        Transform::Trim,
        Transform::Canonize,
        Transform::RemoveEpsilon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Transform::Determinize => "determinize",
            Transform::Minimize => "minimize",
            Transform::Complete => "complete",
            Transform::Complement => "complement",
            Transform::Trim => "trim",
            Transform::Canonize => "canonize",
            Transform::RemoveEpsilon => "remove-epsilon",
        }
    }

    pub fn apply(&self, automaton: &Automaton) -> Result<Automaton, TransformError> {
        info!("{}", self);
        let result = match self {
            Transform::Determinize => determinize(automaton),
            Transform::Minimize => {
                minimize(automaton)
                    .map_err(|source| TransformError::NotDeterministic {
                        transform: *self,
                        source,
                    })?
                    .automaton
            }
            Transform::Complete => complete(automaton).automaton,
            Transform::Complement => complement(automaton),
            Transform::Trim => trim(automaton),
            Transform::Canonize => canonize(automaton),
            Transform::RemoveEpsilon => remove_epsilon(automaton),
        };
        Ok(result)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Transform {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase().replace('_', "-");
        Transform::ALL
            .into_iter()
            .find(|transform| transform.name() == s)
            .ok_or(TransformError::Unknown(s))
    }
}

/// Apply `transforms` one after the other
pub fn apply_all(automaton: &Automaton, transforms: &[Transform]) -> Result<Automaton, TransformError> {
    transforms
        .iter()
        .try_fold(automaton.clone(), |automaton, transform| transform.apply(&automaton))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::tests::second_to_last_a;
    use crate::simulation::tests::assert_same_language;

    #[test]
    fn parse() {
        assert_eq!("remove_epsilon".parse(), Ok(Transform::RemoveEpsilon));
        assert_eq!(" Minimize".parse(), Ok(Transform::Minimize));
        assert_eq!(
            "reverse".parse::<Transform>(),
            Err(TransformError::Unknown("reverse".into()))
        );
        for transform in Transform::ALL {
            assert_eq!(transform.to_string().parse(), Ok(transform));
        }
    }

    #[test]
    fn pipeline() {
        let nfa = second_to_last_a();
        let pipeline = [
            Transform::Determinize,
            Transform::Complete,
            Transform::Minimize,
            Transform::Canonize,
        ];
        let result = apply_all(&nfa, &pipeline).unwrap();
        assert!(result.is_deterministic());
        assert_eq!(result.states().len(), 4);
        assert_same_language(&nfa, &result, 6);
    }

    #[test]
    fn minimize_requires_determinism() {
        assert!(matches!(
            Transform::Minimize.apply(&second_to_last_a()),
            Err(TransformError::NotDeterministic {
                transform: Transform::Minimize,
                ..
            })
        ));
    }
}
