//! Canonical state names
//!
//! The initial states become `q0, q1, ...`, the remaining states follow in
//! their natural order. Since the model keeps every collection sorted, two
//! automata that only differ in how their states were named compare equal
//! once canonized, provided the naming preserves the order of the states.

use std::collections::HashMap;

use crate::automaton::{Automaton, State, StateSet, Transitions};

/// Rename the states to `q0, q1, ...`. Two renamings of one automaton only
/// canonize to the same result if both list the states in the same order.
pub fn canonize(automaton: &Automaton) -> Automaton {
    let order = automaton
        .initial_states()
        .iter()
        .chain(automaton.states().difference(automaton.initial_states()));
    let names: HashMap<&State, State> = order
        .enumerate()
        .map(|(i, state)| (state, State::from(format!("q{}", i))))
        .collect();
    let rename = |states: &StateSet| -> StateSet {
        states.iter().map(|state| names[state].clone()).collect()
    };

    let transitions: Transitions = automaton
        .transition_map()
        .iter()
        .map(|(from, outgoing)| {
            let outgoing = outgoing
                .iter()
                .map(|(label, targets)| (label.clone(), rename(targets)))
                .collect();
            (names[from].clone(), outgoing)
        })
        .collect();

    Automaton::from_parts(
        automaton.alphabet().clone(),
        rename(automaton.states()),
        rename(automaton.initial_states()),
        rename(automaton.final_states()),
        transitions,
    )
}
