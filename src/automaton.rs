//! The automaton data model
//!
//! An [`Automaton`] is an immutable value: every algorithm in this crate
//! takes a reference to one and returns a new one, so callers can keep
//! the original next to the derived automata. Destinations are always
//! stored as a [`StateSet`], a deterministic automaton is simply one where
//! every set has at most one element.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

mod definition;
mod state;

pub use definition::{AutomatonDefinition, Identifier, OneOrMany, Report, Warning, validate};
pub use state::{EPSILON, Label, State, StateSet, is_epsilon};

pub(crate) use state::natural_cmp;

/// Outgoing transitions of every state, grouped by label
pub type Transitions = BTreeMap<State, BTreeMap<Label, StateSet>>;

/// A single problem with an automaton definition
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("Required field {0:?} is missing")]
    MissingField(&'static str),
    #[error("At least one initial state is required")]
    NoInitialState,
    #[error("State {0:?} is defined more than once")]
    DuplicateState(String),
    #[error("Symbol {0:?} is defined more than once")]
    DuplicateSymbol(String),
    #[error("The alphabet must not contain the empty word")]
    EpsilonInAlphabet,
    #[error("The alphabet must not contain an empty symbol")]
    EmptySymbol,
    #[error("Initial state {0:?} is not a state of the automaton")]
    UnknownInitialState(String),
    #[error("Final state {0:?} is not a state of the automaton")]
    UnknownFinalState(String),
    #[error("Transitions leave {0:?} which is not a state of the automaton")]
    UnknownSourceState(String),
    #[error("Transition {from:?} --{label}--> {to:?} leads to an unknown state")]
    UnknownTargetState { from: String, label: String, to: String },
    #[error("Transition from {from:?} uses {symbol:?} which is not in the alphabet")]
    UnknownSymbol { from: String, symbol: String },
}

/// An automaton definition was rejected. Contains every violation found.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid automaton: {}", .0.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; "))]
pub struct ValidationError(pub Vec<Violation>);

impl ValidationError {
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }
}

/// Why an automaton cannot be treated as deterministic
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NotDeterministic {
    #[error("Expected exactly one initial state, found {0}")]
    InitialStates(usize),
    #[error("State {state} has {count} destinations on {symbol}")]
    MultipleDestinations {
        state: State,
        symbol: String,
        count: usize,
    },
    #[error("State {0} has an epsilon transition")]
    EpsilonTransition(State),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AutomatonDefinition", try_from = "AutomatonDefinition")]
pub struct Automaton {
    alphabet: BTreeSet<String>,
    states: StateSet,
    initial_states: StateSet,
    final_states: StateSet,
    transitions: Transitions,
}

impl Automaton {
    pub fn builder() -> AutomatonBuilder {
        AutomatonBuilder::default()
    }

    /// Assemble an automaton that is known to be well-formed.
    ///
    /// Used by the algorithms of this crate, which only ever produce
    /// automata that satisfy the invariants. Empty destination sets are
    /// dropped.
    pub(crate) fn from_parts(
        alphabet: BTreeSet<String>,
        states: StateSet,
        initial_states: StateSet,
        final_states: StateSet,
        mut transitions: Transitions,
    ) -> Self {
        for outgoing in transitions.values_mut() {
            outgoing.retain(|_, targets| !targets.is_empty());
        }
        transitions.retain(|_, outgoing| !outgoing.is_empty());
        let automaton = Self {
            alphabet,
            states,
            initial_states,
            final_states,
            transitions,
        };
        debug_assert!(
            automaton.violations().is_empty(),
            "{:?}",
            automaton.violations()
        );
        automaton
    }

    pub fn alphabet(&self) -> &BTreeSet<String> {
        &self.alphabet
    }

    pub fn states(&self) -> &StateSet {
        &self.states
    }

    pub fn initial_states(&self) -> &StateSet {
        &self.initial_states
    }

    /// The initial state, if there is exactly one
    pub fn initial_state(&self) -> Option<&State> {
        if self.initial_states.len() == 1 {
            self.initial_states.first()
        } else {
            None
        }
    }

    pub fn final_states(&self) -> &StateSet {
        &self.final_states
    }

    pub fn is_final(&self, state: &State) -> bool {
        self.final_states.contains(state)
    }

    pub fn transition_map(&self) -> &Transitions {
        &self.transitions
    }

    /// All transitions as `(source, label, destination)` triples
    pub fn transitions(&self) -> impl Iterator<Item = (&State, &Label, &State)> {
        self.transitions.iter().flat_map(|(from, outgoing)| {
            outgoing
                .iter()
                .flat_map(move |(label, targets)| targets.iter().map(move |to| (from, label, to)))
        })
    }

    /// Outgoing transitions of `state` grouped by label
    pub fn outgoing(&self, state: &State) -> impl Iterator<Item = (&Label, &StateSet)> {
        self.transitions.get(state).into_iter().flatten()
    }

    /// The destinations of `state` on `label`
    pub fn targets(&self, state: &State, label: &Label) -> Option<&StateSet> {
        self.transitions.get(state)?.get(label)
    }

    /// The destination of `state` on `symbol` for automata known to be
    /// deterministic. Returns the smallest destination otherwise.
    pub fn target(&self, state: &State, symbol: &str) -> Option<&State> {
        self.targets(state, &Label::symbol(symbol))?.first()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions().count()
    }

    pub fn has_epsilon(&self) -> bool {
        self.transitions
            .values()
            .any(|outgoing| outgoing.contains_key(&Label::Epsilon))
    }

    pub fn check_deterministic(&self) -> Result<(), NotDeterministic> {
        if self.initial_states.len() != 1 {
            return Err(NotDeterministic::InitialStates(self.initial_states.len()));
        }
        for (state, outgoing) in &self.transitions {
            for (label, targets) in outgoing {
                match label {
                    Label::Epsilon => {
                        return Err(NotDeterministic::EpsilonTransition(state.clone()));
                    }
                    Label::Symbol(symbol) if targets.len() > 1 => {
                        return Err(NotDeterministic::MultipleDestinations {
                            state: state.clone(),
                            symbol: symbol.clone(),
                            count: targets.len(),
                        });
                    }
                    Label::Symbol(_) => (),
                }
            }
        }
        Ok(())
    }

    pub fn is_deterministic(&self) -> bool {
        self.check_deterministic().is_ok()
    }

    /// Does every (state, symbol) pair have at least one destination?
    pub fn is_complete(&self) -> bool {
        self.states.iter().all(|state| {
            self.alphabet.iter().all(|symbol| {
                self.targets(state, &Label::symbol(symbol.as_str()))
                    .is_some_and(|targets| !targets.is_empty())
            })
        })
    }

    /// Check the structural invariants of the data model
    pub fn violations(&self) -> Vec<Violation> {
        check(
            &self.alphabet,
            &self.states,
            &self.initial_states,
            &self.final_states,
            &self.transitions,
        )
    }

    /// Give up the parts of the automaton, e.g. to derive a modified copy
    pub(crate) fn into_parts(
        self,
    ) -> (BTreeSet<String>, StateSet, StateSet, StateSet, Transitions) {
        (
            self.alphabet,
            self.states,
            self.initial_states,
            self.final_states,
            self.transitions,
        )
    }
}

fn check(
    alphabet: &BTreeSet<String>,
    states: &StateSet,
    initial_states: &StateSet,
    final_states: &StateSet,
    transitions: &Transitions,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    if alphabet.iter().any(|s| is_epsilon(s)) {
        violations.push(Violation::EpsilonInAlphabet);
    }
    if alphabet.iter().any(|s| s.is_empty()) {
        violations.push(Violation::EmptySymbol);
    }
    if initial_states.is_empty() {
        violations.push(Violation::NoInitialState);
    }
    for state in initial_states.difference(states) {
        violations.push(Violation::UnknownInitialState(state.to_string()));
    }
    for state in final_states.difference(states) {
        violations.push(Violation::UnknownFinalState(state.to_string()));
    }
    for (from, outgoing) in transitions {
        if !states.contains(from) {
            violations.push(Violation::UnknownSourceState(from.to_string()));
        }
        for (label, targets) in outgoing {
            if let Label::Symbol(symbol) = label {
                if !alphabet.contains(symbol) {
                    violations.push(Violation::UnknownSymbol {
                        from: from.to_string(),
                        symbol: symbol.clone(),
                    });
                }
            }
            for to in targets.iter().filter(|to| !states.contains(*to)) {
                violations.push(Violation::UnknownTargetState {
                    from: from.to_string(),
                    label: label.to_string(),
                    to: to.to_string(),
                });
            }
        }
    }
    violations
}

/// Incrementally describe an automaton, then [`build`](AutomatonBuilder::build) it.
///
/// States mentioned as initial, final or transition endpoints are not
/// added implicitly: an undeclared state is reported as a violation.
#[derive(Debug, Default, Clone)]
pub struct AutomatonBuilder {
    alphabet: BTreeSet<String>,
    states: StateSet,
    initial_states: StateSet,
    final_states: StateSet,
    transitions: Transitions,
    violations: Vec<Violation>,
}

impl AutomatonBuilder {
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        if !self.alphabet.insert(symbol.clone()) {
            self.violations.push(Violation::DuplicateSymbol(symbol));
        }
        self
    }

    pub fn symbols<I, S>(self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        symbols.into_iter().fold(self, |builder, s| builder.symbol(s))
    }

    pub fn state(mut self, state: impl Into<State>) -> Self {
        let state = state.into();
        if !self.states.insert(state.clone()) {
            self.violations
                .push(Violation::DuplicateState(state.to_string()));
        }
        self
    }

    pub fn states<I, S>(self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<State>,
    {
        states.into_iter().fold(self, |builder, s| builder.state(s))
    }

    pub fn initial(mut self, state: impl Into<State>) -> Self {
        self.initial_states.insert(state.into());
        self
    }

    pub fn final_state(mut self, state: impl Into<State>) -> Self {
        self.final_states.insert(state.into());
        self
    }

    pub fn transition(
        mut self,
        from: impl Into<State>,
        label: impl Into<Label>,
        to: impl Into<State>,
    ) -> Self {
        self.transitions
            .entry(from.into())
            .or_default()
            .entry(label.into())
            .or_default()
            .insert(to.into());
        self
    }

    pub fn epsilon(self, from: impl Into<State>, to: impl Into<State>) -> Self {
        self.transition(from, Label::Epsilon, to)
    }

    /// Everything that would make [`build`](AutomatonBuilder::build) fail
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = self.violations.clone();
        violations.extend(check(
            &self.alphabet,
            &self.states,
            &self.initial_states,
            &self.final_states,
            &self.transitions,
        ));
        if self
            .violations
            .contains(&Violation::MissingField("initialStates"))
        {
            violations.retain(|v| *v != Violation::NoInitialState);
        }
        violations
    }

    pub fn build(self) -> Result<Automaton, ValidationError> {
        let violations = self.violations();
        if !violations.is_empty() {
            return Err(ValidationError(violations));
        }
        Ok(Automaton::from_parts(
            self.alphabet,
            self.states,
            self.initial_states,
            self.final_states,
            self.transitions,
        ))
    }
}
