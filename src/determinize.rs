//! Subset construction
//!
//! Each state of the resulting DFA stands for a set of states of the input
//! automaton. Sets are interned in a table so every distinct set is
//! explored exactly once, states are numbered `0, 1, 2, ...` in breadth
//! first order starting with the ε-closure of the initial states.

use std::collections::{BTreeMap, HashMap, VecDeque};

use log::debug;

use crate::automaton::{Automaton, Label, State, StateSet, Transitions};
use crate::simulation::{epsilon_closure, step};

/// A determinized automaton together with the set of original states each
/// of its states stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetConstruction {
    pub automaton: Automaton,
    pub subsets: BTreeMap<State, StateSet>,
}

/// Convert an automaton, possibly with ε-transitions, into an equivalent
/// deterministic one.
///
/// Missing destinations stay missing, so the result may be incomplete.
pub fn subset_construction(automaton: &Automaton) -> SubsetConstruction {
    let mut ids: HashMap<StateSet, State> = HashMap::new();
    let mut subsets = BTreeMap::new();
    let mut worklist = VecDeque::new();
    let mut transitions = Transitions::new();
    let mut final_states = StateSet::new();

    let mut intern = |set: StateSet, worklist: &mut VecDeque<(State, StateSet)>| -> State {
        if let Some(id) = ids.get(&set) {
            return id.clone();
        }
        let id = State::from(ids.len());
        debug!("subset {} = {:?}", id, set);
        if !set.is_disjoint(automaton.final_states()) {
            final_states.insert(id.clone());
        }
        ids.insert(set.clone(), id.clone());
        subsets.insert(id.clone(), set.clone());
        worklist.push_back((id.clone(), set));
        id
    };

    let start = epsilon_closure(automaton, automaton.initial_states());
    let initial = intern(start, &mut worklist);

    while let Some((from, current)) = worklist.pop_front() {
        for symbol in automaton.alphabet() {
            let next = step(automaton, &current, symbol);
            if next.is_empty() {
                continue;
            }
            let to = intern(next, &mut worklist);
            transitions
                .entry(from.clone())
                .or_default()
                .insert(Label::symbol(symbol.as_str()), StateSet::from([to]));
        }
    }

    let states = subsets.keys().cloned().collect();
    SubsetConstruction {
        automaton: Automaton::from_parts(
            automaton.alphabet().clone(),
            states,
            StateSet::from([initial]),
            final_states,
            transitions,
        ),
        subsets,
    }
}

/// The deterministic automaton of [`subset_construction`]
pub fn determinize(automaton: &Automaton) -> Automaton {
    subset_construction(automaton).automaton
}

/// Fold ε-transitions into symbol transitions.
///
/// The states stay the same: a state gets a transition on `x` to every
/// state reachable by `ε* x ε*`, and becomes final when a final state is
/// in its ε-closure.
pub fn remove_epsilon(automaton: &Automaton) -> Automaton {
    if !automaton.has_epsilon() {
        return automaton.clone();
    }
    let mut transitions = Transitions::new();
    let mut final_states = StateSet::new();
    for state in automaton.states() {
        let closure = epsilon_closure(automaton, &StateSet::from([state.clone()]));
        if !closure.is_disjoint(automaton.final_states()) {
            final_states.insert(state.clone());
        }
        for symbol in automaton.alphabet() {
            let targets = step(automaton, &closure, symbol);
            if !targets.is_empty() {
                transitions
                    .entry(state.clone())
                    .or_default()
                    .insert(Label::symbol(symbol.as_str()), targets);
            }
        }
    }
    Automaton::from_parts(
        automaton.alphabet().clone(),
        automaton.states().clone(),
        automaton.initial_states().clone(),
        final_states,
        transitions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::tests::{end_to_end, second_to_last_a};
    use crate::simulation::tests::assert_same_language;

    fn set(names: &[&str]) -> StateSet {
        names.iter().map(|name| State::from(*name)).collect()
    }

    #[test]
    fn second_to_last() {
        let nfa = second_to_last_a();
        let SubsetConstruction { automaton, subsets } = subset_construction(&nfa);
        assert!(automaton.is_deterministic());
        assert_eq!(automaton.states().len(), 4);
        assert_eq!(subsets[&State::from("0")], set(&["0"]));
        assert_eq!(subsets[&State::from("1")], set(&["0", "1"]));
        assert_eq!(automaton.final_states().len(), 2);
        assert_same_language(&nfa, &automaton, 7);
    }

    #[test]
    fn with_epsilon() {
        let nfa = Automaton::builder()
            .symbols(["a", "b"])
            .states(["0", "1", "2"])
            .initial("0")
            .final_state("2")
            .epsilon("0", "1")
            .transition("1", "a", "2")
            .transition("2", "b", "1")
            .build()
            .unwrap();
        let SubsetConstruction { automaton, subsets } = subset_construction(&nfa);
        assert_eq!(subsets[&State::from("0")], set(&["0", "1"]));
        assert!(!automaton.has_epsilon());
        assert_same_language(&nfa, &automaton, 6);
    }

    #[test]
    fn omits_empty_transitions() {
        let dfa = determinize(&end_to_end());
        assert_eq!(dfa.states().len(), 3);
        assert_eq!(dfa.target(&"0".into(), "b"), None);
        assert_same_language(&end_to_end(), &dfa, 6);
    }

    #[test]
    fn several_initial_states() {
        let nfa = Automaton::builder()
            .symbol("a")
            .states(["p", "q"])
            .initial("p")
            .initial("q")
            .final_state("q")
            .transition("p", "a", "p")
            .build()
            .unwrap();
        let dfa = determinize(&nfa);
        assert_eq!(dfa.initial_state(), Some(&State::from("0")));
        assert!(dfa.is_final(&"0".into()));
        assert_same_language(&nfa, &dfa, 4);
    }

    #[test]
    fn epsilon_removal() {
        let nfa = Automaton::builder()
            .symbols(["a", "b"])
            .states(["p", "q", "r"])
            .initial("p")
            .final_state("r")
            .epsilon("p", "q")
            .transition("q", "a", "q")
            .transition("q", "b", "r")
            .epsilon("r", "p")
            .build()
            .unwrap();
        let without = remove_epsilon(&nfa);
        assert!(!without.has_epsilon());
        assert_eq!(without.states(), nfa.states());
        assert_same_language(&nfa, &without, 6);
    }
}
