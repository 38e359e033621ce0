//! Completion and complement

use log::debug;

use crate::automaton::{Automaton, Label, State, StateSet};
use crate::determinize::determinize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub automaton: Automaton,
    /// The state added to absorb missing transitions, if one was needed
    pub sink: Option<State>,
}

/// A state name not used by `automaton`: one more than the largest state
/// if all states are numbered, `sink` otherwise
fn sink_name(automaton: &Automaton) -> State {
    let numbers: Option<Vec<u64>> = automaton.states().iter().map(State::as_number).collect();
    if let Some(next) = numbers
        .and_then(|numbers| numbers.into_iter().max())
        .and_then(|max| max.checked_add(1))
    {
        let name = State::from(format!("{}", next));
        if !automaton.states().contains(&name) {
            return name;
        }
    }
    let mut name = State::from("sink");
    let mut suffix = 1;
    while automaton.states().contains(&name) {
        name = State::from(format!("sink{}", suffix));
        suffix += 1;
    }
    name
}

/// Add a sink state so that every state has a transition on every symbol.
///
/// ε-transitions are left alone and do not count as transitions on a
/// symbol. An automaton that is already complete is returned unchanged.
pub fn complete(automaton: &Automaton) -> Completion {
    if automaton.is_complete() {
        return Completion {
            automaton: automaton.clone(),
            sink: None,
        };
    }

    let sink = sink_name(automaton);
    let (alphabet, mut states, initial_states, final_states, mut transitions) =
        automaton.clone().into_parts();
    states.insert(sink.clone());
    for state in &states {
        let outgoing = transitions.entry(state.clone()).or_default();
        for symbol in &alphabet {
            let targets = outgoing.entry(Label::symbol(symbol.as_str())).or_default();
            if targets.is_empty() {
                debug!("{} --{}--> {}", state, symbol, sink);
                targets.insert(sink.clone());
            }
        }
    }

    Completion {
        automaton: Automaton::from_parts(alphabet, states, initial_states, final_states, transitions),
        sink: Some(sink),
    }
}

/// An automaton accepting exactly the words over the same alphabet that
/// `automaton` rejects
pub fn complement(automaton: &Automaton) -> Automaton {
    let dfa = if automaton.is_deterministic() {
        automaton.clone()
    } else {
        determinize(automaton)
    };
    let (alphabet, states, initial_states, final_states, transitions) =
        complete(&dfa).automaton.into_parts();
    let final_states: StateSet = states.difference(&final_states).cloned().collect();
    Automaton::from_parts(alphabet, states, initial_states, final_states, transitions)
}
