//! The JSON-compatible form of an automaton
//!
//! External input is forgiving: state ids may be strings or integers, the
//! initial states may be a single id or a list, and a transition may lead
//! to a single destination or a list of destinations. Output always uses
//! lists.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use super::{Automaton, AutomatonBuilder, Label, State, ValidationError, Violation};

/// A state id as found in external input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(u64),
    Text(String),
}

impl From<&Identifier> for State {
    fn from(id: &Identifier) -> Self {
        match id {
            Identifier::Number(n) => State::new(n.to_string()),
            Identifier::Text(s) => State::new(s.as_str()),
        }
    }
}

impl From<&State> for Identifier {
    fn from(state: &State) -> Self {
        Identifier::Text(state.name().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item).iter(),
            OneOrMany::Many(items) => items.iter(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatonDefinition {
    pub alphabet: Option<Vec<String>>,
    pub states: Option<Vec<Identifier>>,
    #[serde(alias = "initial", alias = "initialState", alias = "initial_states")]
    pub initial_states: Option<OneOrMany<Identifier>>,
    #[serde(default, alias = "final_states", alias = "finals")]
    pub final_states: Vec<Identifier>,
    #[serde(default)]
    pub transitions: BTreeMap<State, BTreeMap<String, OneOrMany<Identifier>>>,
}

/// Something suspicious about an otherwise valid automaton
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    #[error("There are no final states, the automaton accepts nothing")]
    NoFinalStates,
    #[error("The alphabet is empty")]
    EmptyAlphabet,
    #[error("Symbol {0:?} is not used by any transition")]
    UnusedSymbol(String),
    #[error("State {0:?} is not final and has no outgoing transitions")]
    DeadEnd(String),
}

/// The outcome of [`validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub errors: Vec<Violation>,
    pub warnings: Vec<Warning>,
}

impl Report {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn builder(definition: &AutomatonDefinition) -> AutomatonBuilder {
    let mut builder = Automaton::builder();
    if definition.alphabet.is_none() {
        builder.violations.push(Violation::MissingField("alphabet"));
    }
    if definition.states.is_none() {
        builder.violations.push(Violation::MissingField("states"));
    }
    if definition.initial_states.is_none() {
        builder
            .violations
            .push(Violation::MissingField("initialStates"));
    }

    let mut builder = builder
        .symbols(definition.alphabet.iter().flatten().cloned())
        .states(definition.states.iter().flatten().map(State::from));
    for id in definition.initial_states.iter().flat_map(OneOrMany::iter) {
        builder = builder.initial(id);
    }
    for id in &definition.final_states {
        builder = builder.final_state(id);
    }
    for (from, outgoing) in &definition.transitions {
        for (symbol, targets) in outgoing {
            for to in targets.iter() {
                builder = builder.transition(from.clone(), symbol.as_str(), to);
            }
        }
    }
    builder
}

fn warnings(builder: &AutomatonBuilder) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if builder.final_states.is_empty() {
        warnings.push(Warning::NoFinalStates);
    }
    if builder.alphabet.is_empty() {
        warnings.push(Warning::EmptyAlphabet);
    }
    let used = |symbol: &String| {
        let label = Label::symbol(symbol.as_str());
        builder
            .transitions
            .values()
            .any(|outgoing| outgoing.get(&label).is_some_and(|t| !t.is_empty()))
    };
    for symbol in builder.alphabet.iter().filter(|s| !used(s)) {
        warnings.push(Warning::UnusedSymbol(symbol.clone()));
    }
    for state in &builder.states {
        let stuck = builder
            .transitions
            .get(state)
            .is_none_or(|outgoing| outgoing.values().all(|t| t.is_empty()));
        if stuck && !builder.final_states.contains(state) {
            warnings.push(Warning::DeadEnd(state.to_string()));
        }
    }
    warnings
}

/// Check a definition without building it.
///
/// Errors make the definition unusable, warnings point at automata that
/// are well-formed but probably not what was intended.
pub fn validate(definition: &AutomatonDefinition) -> Report {
    let builder = builder(definition);
    Report {
        errors: builder.violations(),
        warnings: warnings(&builder),
    }
}

impl TryFrom<AutomatonDefinition> for Automaton {
    type Error = ValidationError;

    fn try_from(definition: AutomatonDefinition) -> Result<Self, Self::Error> {
        let builder = builder(&definition);
        for warning in warnings(&builder) {
            warn!("{}", warning);
        }
        builder.build()
    }
}

impl From<Automaton> for AutomatonDefinition {
    fn from(automaton: Automaton) -> Self {
        let ids = |states: &super::StateSet| -> Vec<Identifier> {
            states.iter().map(Identifier::from).collect()
        };
        let transitions = automaton
            .transition_map()
            .iter()
            .map(|(from, outgoing)| {
                let outgoing = outgoing
                    .iter()
                    .map(|(label, targets)| (label.to_string(), OneOrMany::Many(ids(targets))))
                    .collect();
                (from.clone(), outgoing)
            })
            .collect();
        AutomatonDefinition {
            alphabet: Some(automaton.alphabet().iter().cloned().collect()),
            states: Some(ids(automaton.states())),
            initial_states: Some(OneOrMany::Many(ids(automaton.initial_states()))),
            final_states: ids(automaton.final_states()),
            transitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const END_TO_END: &str = r#"{
        "alphabet": ["a", "b"],
        "states": ["q0", "q1", "q2"],
        "initialState": "q0",
        "finalStates": ["q2"],
        "transitions": {
            "q0": {"a": "q1"},
            "q1": {"a": ["q2"], "b": ["q1"]},
            "q2": {"a": ["q2"], "b": ["q2"]}
        }
    }"#;

    #[test]
    fn deserialize() {
        let automaton: Automaton = serde_json::from_str(END_TO_END).unwrap();
        assert_eq!(automaton, crate::automaton::tests::end_to_end());
    }

    #[test]
    fn integer_states_and_epsilon() {
        let automaton: Automaton = serde_json::from_str(
            r#"{"alphabet": ["a"], "states": [0, 1], "initialStates": [0],
                "finals": [1], "transitions": {"0": {"eps": 1, "a": [0, 1]}}}"#,
        )
        .unwrap();
        assert!(automaton.has_epsilon());
        assert_eq!(
            automaton.targets(&"0".into(), &Label::Epsilon),
            Some(&["1"].map(State::from).into())
        );
        assert_eq!(automaton.transition_count(), 3);
    }

    #[test]
    fn deserialize_rejects_invalid() {
        let result: Result<Automaton, _> = serde_json::from_str(
            r#"{"alphabet": ["a"], "states": ["p"], "initialStates": "q"}"#,
        );
        let message = result.unwrap_err().to_string();
        assert!(message.contains("\"q\""), "{message}");
    }

    #[test]
    fn serialize_uses_lists() {
        let automaton = crate::automaton::tests::end_to_end();
        let json = serde_json::to_value(&automaton).unwrap();
        assert_eq!(json["initialStates"], serde_json::json!(["q0"]));
        assert_eq!(json["transitions"]["q0"]["a"], serde_json::json!(["q1"]));
        let back: Automaton = serde_json::from_value(json).unwrap();
        assert_eq!(back, automaton);
    }

    #[test]
    fn missing_fields() {
        let report = validate(&AutomatonDefinition::default());
        assert_eq!(
            report.errors,
            vec![
                Violation::MissingField("alphabet"),
                Violation::MissingField("states"),
                Violation::MissingField("initialStates"),
            ]
        );
        assert!(!report.is_valid());
    }

    #[test]
    fn warnings() {
        let definition: AutomatonDefinition = serde_json::from_str(
            r#"{"alphabet": ["a", "b"], "states": ["p", "q"], "initial": "p",
                "transitions": {"p": {"a": "q"}}}"#,
        )
        .unwrap();
        let report = validate(&definition);
        assert!(report.is_valid());
        assert_eq!(
            report.warnings,
            vec![
                Warning::NoFinalStates,
                Warning::UnusedSymbol("b".into()),
                Warning::DeadEnd("q".into()),
            ]
        );
    }
}
