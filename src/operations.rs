//! Closure operations on regular languages
//!
//! Boolean combinations are computed on the product of the two automata
//! after both were made deterministic and complete over the union of
//! their alphabets. Only pairs reachable from the initial pair become
//! states, numbered in breadth first order.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::analysis::accessible;
use crate::automaton::{Automaton, Label, State, StateSet, Transitions};
use crate::complete::complete;
use crate::determinize::determinize;

/// Which pairs of a product are final
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combination {
    Union,
    Intersection,
    Difference,
    SymmetricDifference,
}

impl Combination {
    fn accepts(&self, left: bool, right: bool) -> bool {
        match self {
            Combination::Union => left || right,
            Combination::Intersection => left && right,
            Combination::Difference => left && !right,
            Combination::SymmetricDifference => left != right,
        }
    }
}

/// A complete DFA for the language of `automaton` over `alphabet`
fn complete_dfa(automaton: &Automaton, alphabet: &BTreeSet<String>) -> Automaton {
    let (_, states, initial_states, final_states, transitions) = automaton.clone().into_parts();
    let widened = Automaton::from_parts(
        alphabet.clone(),
        states,
        initial_states,
        final_states,
        transitions,
    );
    let dfa = if widened.is_deterministic() {
        widened
    } else {
        determinize(&widened)
    };
    complete(&dfa).automaton
}

pub fn product(left: &Automaton, right: &Automaton, combination: Combination) -> Automaton {
    let alphabet: BTreeSet<String> = left.alphabet().union(right.alphabet()).cloned().collect();
    let left = complete_dfa(left, &alphabet);
    let right = complete_dfa(right, &alphabet);

    let mut ids: HashMap<(State, State), State> = HashMap::new();
    let mut worklist = VecDeque::new();
    let mut transitions = Transitions::new();
    let mut final_states = StateSet::new();

    let mut intern = |pair: (State, State), worklist: &mut VecDeque<(State, (State, State))>| {
        if let Some(id) = ids.get(&pair) {
            return id.clone();
        }
        let id = State::from(ids.len());
        if combination.accepts(left.is_final(&pair.0), right.is_final(&pair.1)) {
            final_states.insert(id.clone());
        }
        ids.insert(pair.clone(), id.clone());
        worklist.push_back((id.clone(), pair));
        id
    };

    let mut initial_states = StateSet::new();
    for l in left.initial_states() {
        for r in right.initial_states() {
            initial_states.insert(intern((l.clone(), r.clone()), &mut worklist));
        }
    }
    while let Some((from, (l, r))) = worklist.pop_front() {
        for symbol in &alphabet {
            let (Some(l), Some(r)) = (left.target(&l, symbol), right.target(&r, symbol)) else {
                continue;
            };
            let to = intern((l.clone(), r.clone()), &mut worklist);
            transitions
                .entry(from.clone())
                .or_default()
                .insert(Label::symbol(symbol.as_str()), StateSet::from([to]));
        }
    }

    let states = ids.into_values().collect();
    Automaton::from_parts(
        alphabet,
        states,
        initial_states,
        final_states,
        transitions,
    )
}

pub fn union(left: &Automaton, right: &Automaton) -> Automaton {
    product(left, right, Combination::Union)
}

pub fn intersection(left: &Automaton, right: &Automaton) -> Automaton {
    product(left, right, Combination::Intersection)
}

pub fn difference(left: &Automaton, right: &Automaton) -> Automaton {
    product(left, right, Combination::Difference)
}

/// Rename the states of `automaton` to `offset, offset + 1, ...`
fn renumber(automaton: &Automaton, offset: usize) -> Automaton {
    let names: HashMap<State, State> = automaton
        .states()
        .iter()
        .enumerate()
        .map(|(i, state)| (state.clone(), State::from(offset + i)))
        .collect();
    let rename = |states: &StateSet| -> StateSet { states.iter().map(|s| names[s].clone()).collect() };
    let transitions = automaton
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

/// Words of `left` followed by words of `right`, joined by ε-transitions
pub fn concatenation(left: &Automaton, right: &Automaton) -> Automaton {
    let left = renumber(left, 0);
    let right = renumber(right, left.states().len());
    let (left_alphabet, mut states, initial_states, left_finals, mut transitions) =
        left.into_parts();
    let (right_alphabet, right_states, right_initial, final_states, right_transitions) =
        right.into_parts();

    let alphabet = left_alphabet.union(&right_alphabet).cloned().collect();
    states.extend(right_states);
    transitions.extend(right_transitions);
    for state in left_finals {
        transitions
            .entry(state)
            .or_default()
            .entry(Label::Epsilon)
            .or_default()
            .extend(right_initial.iter().cloned());
    }
    Automaton::from_parts(alphabet, states, initial_states, final_states, transitions)
}

/// Does `automaton` accept no word at all?
pub fn is_empty(automaton: &Automaton) -> bool {
    accessible(automaton).is_disjoint(automaton.final_states())
}

/// Do both automata accept the same words?
pub fn equivalent(left: &Automaton, right: &Automaton) -> bool {
    is_empty(&product(left, right, Combination::SymmetricDifference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::tests::{end_to_end, second_to_last_a};
    use crate::minimize::minimize;
    use crate::simulation::{simulate_symbols, tests::words};

    /// Words over {a, b} with an even number of `b`
    fn even_b() -> Automaton {
        Automaton::builder()
            .symbols(["a", "b"])
            .states(["e", "o"])
            .initial("e")
            .final_state("e")
            .transition("e", "a", "e")
            .transition("e", "b", "o")
            .transition("o", "a", "o")
            .transition("o", "b", "e")
            .build()
            .unwrap()
    }

    fn check(combination: Combination, expected: impl Fn(bool, bool) -> bool) {
        let left = second_to_last_a();
        let right = even_b();
        let result = product(&left, &right, combination);
        assert!(result.is_deterministic());
        for word in words(&["a", "b"], 6) {
            assert_eq!(
                simulate_symbols(&result, &word).accepted,
                expected(
                    simulate_symbols(&left, &word).accepted,
                    simulate_symbols(&right, &word).accepted
                ),
                "{:?} on {:?}",
                combination,
                word
            );
        }
    }

    #[test]
    fn boolean_products() {
        check(Combination::Union, |l, r| l || r);
        check(Combination::Intersection, |l, r| l && r);
        check(Combination::Difference, |l, r| l && !r);
        assert!(union(&even_b(), &even_b()).is_complete());
        assert!(intersection(&end_to_end(), &even_b()).is_complete());
        assert!(is_empty(&difference(&even_b(), &even_b())));
    }

    #[test]
    fn different_alphabets() {
        let only_c = Automaton::builder()
            .symbol("c")
            .states(["0", "1"])
            .initial("0")
            .final_state("1")
            .transition("0", "c", "1")
            .build()
            .unwrap();
        let result = union(&end_to_end(), &only_c);
        assert_eq!(result.alphabet().len(), 3);
        assert!(simulate_symbols(&result, &["c"]).accepted);
        assert!(simulate_symbols(&result, &["a", "a"]).accepted);
        assert!(!simulate_symbols(&result, &["a", "c"]).accepted);
    }

    #[test]
    fn concatenate() {
        let result = concatenation(&end_to_end(), &even_b());
        assert!(result.has_epsilon());
        assert_eq!(result.states().len(), 5);
        assert!(simulate_symbols(&result, &["a", "a"]).accepted);
        assert!(simulate_symbols(&result, &["a", "a", "b", "b"]).accepted);
        assert!(!simulate_symbols(&result, &["a"]).accepted);
    }

    #[test]
    fn equivalence() {
        let dfa = crate::determinize::determinize(&second_to_last_a());
        let minimal = minimize(&dfa).unwrap().automaton;
        assert!(equivalent(&second_to_last_a(), &minimal));
        assert!(!equivalent(&second_to_last_a(), &even_b()));
        assert!(is_empty(&difference(&end_to_end(), &end_to_end())));
        assert!(!is_empty(&end_to_end()));
    }
}
