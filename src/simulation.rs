//! Run words against an automaton
//!
//! The simulation always tracks the *set* of current states, so the same
//! code handles deterministic automata (the set has at most one element),
//! nondeterministic ones and those with ε-transitions. ε-transitions are
//! only followed while computing the [closure](epsilon_closure) after
//! each consumed symbol.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::automaton::{Automaton, Label, StateSet};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("Symbol {symbol:?} at position {position} is not in the alphabet")]
    SymbolNotInAlphabet { symbol: String, position: usize },
}

/// One row of the execution trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Number of symbols consumed so far
    pub index: usize,
    /// The symbol consumed to get here, `None` for the starting configuration
    pub symbol: Option<String>,
    pub states: StateSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    pub accepted: bool,
    pub steps: Vec<Step>,
    /// Position of the symbol that left no current state, if the run got stuck
    pub halted_at: Option<usize>,
}

/// All states reachable from `states` using only ε-transitions
pub fn epsilon_closure(automaton: &Automaton, states: &StateSet) -> StateSet {
    let mut closure = states.clone();
    let mut queue = VecDeque::from_iter(states.iter().cloned());

    while let Some(state) = queue.pop_front() {
        if let Some(next_states) = automaton.targets(&state, &Label::Epsilon) {
            for state in next_states.difference(&closure) {
                queue.push_back(state.clone());
            }
            closure.extend(next_states.iter().cloned());
        }
    }
    closure
}

/// Return all states that are directly reachable from `states` on `symbol`
pub fn move_states(automaton: &Automaton, states: &StateSet, symbol: &str) -> StateSet {
    let label = Label::symbol(symbol);
    states
        .iter()
        .filter_map(|state| automaton.targets(state, &label))
        .flatten()
        .cloned()
        .collect()
}

/// One simulation step: move on `symbol`, then close under ε
pub fn step(automaton: &Automaton, states: &StateSet, symbol: &str) -> StateSet {
    epsilon_closure(automaton, &move_states(automaton, states, symbol))
}

/// Split `word` into alphabet symbols.
///
/// Symbols may be longer than one character. At every position the longest
/// matching symbol is tried first, shorter ones only if the rest of the word
/// cannot be split. The error points at the furthest position any split
/// reached.
pub fn tokenize(automaton: &Automaton, word: &str) -> Result<Vec<String>, SimulationError> {
    let mut candidates: Vec<&str> = automaton
        .alphabet()
        .iter()
        .map(String::as_str)
        .filter(|symbol| !symbol.is_empty())
        .collect();
    candidates.sort_by_key(|symbol| std::cmp::Reverse(symbol.len()));

    let mut splitter = Splitter {
        word,
        candidates,
        dead_ends: HashSet::new(),
        furthest: 0,
        symbols: Vec::new(),
    };
    if splitter.split(0) {
        return Ok(splitter.symbols.into_iter().map(str::to_string).collect());
    }
    let rest = &word[splitter.furthest..];
    Err(SimulationError::SymbolNotInAlphabet {
        symbol: rest.chars().next().map(String::from).unwrap_or_default(),
        position: word[..splitter.furthest].chars().count(),
    })
}

struct Splitter<'a> {
    word: &'a str,
    /// Longest first
    candidates: Vec<&'a str>,
    /// Byte offsets from which the rest of the word has no split
    dead_ends: HashSet<usize>,
    furthest: usize,
    symbols: Vec<&'a str>,
}

impl Splitter<'_> {
    fn split(&mut self, offset: usize) -> bool {
        if offset == self.word.len() {
            return true;
        }
        if self.dead_ends.contains(&offset) {
            return false;
        }
        self.furthest = self.furthest.max(offset);
        for i in 0..self.candidates.len() {
            let symbol = self.candidates[i];
            if self.word[offset..].starts_with(symbol) {
                self.symbols.push(symbol);
                if self.split(offset + symbol.len()) {
                    return true;
                }
                self.symbols.pop();
            }
        }
        self.dead_ends.insert(offset);
        false
    }
}

/// Run `word` against `automaton` and record every intermediate state set.
///
/// Every symbol of the word is checked against the alphabet before the
/// first step is taken.
pub fn simulate(automaton: &Automaton, word: &str) -> Result<Simulation, SimulationError> {
    let symbols = tokenize(automaton, word)?;
    Ok(simulate_symbols(automaton, &symbols))
}

/// Like [`simulate`] for a word that is already split into symbols
pub fn simulate_symbols<S: AsRef<str>>(automaton: &Automaton, symbols: &[S]) -> Simulation {
    let mut current = epsilon_closure(automaton, automaton.initial_states());
    let mut steps = vec![Step {
        index: 0,
        symbol: None,
        states: current.clone(),
    }];
    let mut halted_at = None;

    for (index, symbol) in symbols.iter().enumerate() {
        current = step(automaton, &current, symbol.as_ref());
        steps.push(Step {
            index: index + 1,
            symbol: Some(symbol.as_ref().to_string()),
            states: current.clone(),
        });
        if current.is_empty() {
            debug!("no transition on {:?} at position {}", symbol.as_ref(), index);
            halted_at = Some(index);
            break;
        }
    }

    let accepted = halted_at.is_none() && !current.is_disjoint(automaton.final_states());
    Simulation {
        accepted,
        steps,
        halted_at,
    }
}

/// Does `automaton` accept `word`?
pub fn accepts(automaton: &Automaton, word: &str) -> Result<bool, SimulationError> {
    simulate(automaton, word).map(|simulation| simulation.accepted)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::automaton::{State, tests::end_to_end, tests::second_to_last_a};

    /// Every word over `alphabet` with at most `max_len` symbols
    pub(crate) fn words(alphabet: &[&str], max_len: usize) -> Vec<Vec<String>> {
        let mut words = vec![vec![]];
        let mut last = vec![vec![]];
        for _ in 0..max_len {
            last = last
                .iter()
                .flat_map(|word: &Vec<String>| {
                    alphabet.iter().map(move |symbol| {
                        let mut word = word.clone();
                        word.push(symbol.to_string());
                        word
                    })
                })
                .collect();
            words.extend(last.iter().cloned());
        }
        words
    }

    /// Assert that both automata agree on every word up to `max_len` symbols
    pub(crate) fn assert_same_language(a: &Automaton, b: &Automaton, max_len: usize) {
        let alphabet: Vec<&str> = a.alphabet().union(b.alphabet()).map(|s| s.as_str()).collect();
        for word in words(&alphabet, max_len) {
            assert_eq!(
                simulate_symbols(a, &word).accepted,
                simulate_symbols(b, &word).accepted,
                "automata disagree on {:?}",
                word
            );
        }
    }

    fn states(names: &[&str]) -> StateSet {
        names.iter().map(|name| State::from(*name)).collect()
    }

    #[test]
    fn end_to_end_words() {
        let automaton = end_to_end();
        assert!(accepts(&automaton, "aa").unwrap());
        assert!(!accepts(&automaton, "b").unwrap());
        // stops in q1, which is not final
        assert!(!accepts(&automaton, "ab").unwrap());
        assert!(accepts(&automaton, "aba").unwrap());
        assert!(!accepts(&automaton, "").unwrap());
    }

    #[test]
    fn halts_without_transition() {
        let simulation = simulate(&end_to_end(), "bab").unwrap();
        assert!(!simulation.accepted);
        assert_eq!(simulation.halted_at, Some(0));
        assert_eq!(simulation.steps.len(), 2);
        assert_eq!(simulation.steps[1].symbol.as_deref(), Some("b"));
        assert!(simulation.steps[1].states.is_empty());
    }

    #[test]
    fn trace() {
        let simulation = simulate(&end_to_end(), "aba").unwrap();
        assert!(simulation.accepted);
        let trace: Vec<StateSet> = simulation.steps.into_iter().map(|s| s.states).collect();
        assert_eq!(
            trace,
            vec![
                states(&["q0"]),
                states(&["q1"]),
                states(&["q1"]),
                states(&["q2"])
            ]
        );
    }

    #[test]
    fn nondeterministic() {
        let automaton = second_to_last_a();
        assert!(accepts(&automaton, "ab").unwrap());
        assert!(accepts(&automaton, "bbaa").unwrap());
        assert!(!accepts(&automaton, "aab").unwrap());
        assert!(!accepts(&automaton, "a").unwrap());
        let simulation = simulate(&automaton, "ba").unwrap();
        assert_eq!(simulation.steps[2].states, states(&["0", "1"]));
    }

    #[test]
    fn epsilon_moves() {
        let automaton = Automaton::builder()
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
        assert_eq!(
            epsilon_closure(&automaton, &states(&["p"])),
            states(&["p", "q"])
        );
        assert_eq!(
            epsilon_closure(&automaton, &states(&["r"])),
            states(&["p", "q", "r"])
        );
        assert!(accepts(&automaton, "b").unwrap());
        assert!(accepts(&automaton, "aabab").unwrap());
        assert!(!accepts(&automaton, "").unwrap());
        assert!(!accepts(&automaton, "ba").unwrap());
    }

    #[test]
    fn symbol_not_in_alphabet() {
        assert_eq!(
            simulate(&end_to_end(), "aac"),
            Err(SimulationError::SymbolNotInAlphabet {
                symbol: "c".into(),
                position: 2
            })
        );
    }

    #[test]
    fn multi_character_symbols() {
        let automaton = Automaton::builder()
            .symbols(["a", "ab", "c"])
            .states(["0", "1"])
            .initial("0")
            .final_state("1")
            .transition("0", "ab", "1")
            .transition("1", "c", "1")
            .build()
            .unwrap();
        assert_eq!(tokenize(&automaton, "abcc").unwrap(), ["ab", "c", "c"]);
        assert!(accepts(&automaton, "abcc").unwrap());
        assert!(!accepts(&automaton, "a").unwrap());
    }

    #[test]
    fn shorter_symbol_when_longest_match_fails() {
        let automaton = Automaton::builder()
            .symbols(["a", "ab", "bc"])
            .states(["0", "1", "2"])
            .initial("0")
            .final_state("2")
            .transition("0", "a", "1")
            .transition("1", "bc", "2")
            .build()
            .unwrap();
        assert_eq!(tokenize(&automaton, "abc").unwrap(), ["a", "bc"]);
        assert!(accepts(&automaton, "abc").unwrap());
        assert_eq!(tokenize(&automaton, "abab").unwrap(), ["ab", "ab"]);
        // "ab" + "bc" reaches position 4 before failing on "d"
        assert_eq!(
            tokenize(&automaton, "abbcd"),
            Err(SimulationError::SymbolNotInAlphabet {
                symbol: "d".into(),
                position: 4
            })
        );
    }

    #[test]
    fn word_enumeration() {
        assert_eq!(words(&["a", "b"], 2).len(), 7);
    }
}
