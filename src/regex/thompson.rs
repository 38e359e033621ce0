//! Thompson's construction
//!
//! Every sub-expression becomes a fragment with a single start and a
//! single end state, which are then wired together with ε-transitions.
//! States are numbered by a counter owned by one construction run.

use std::collections::BTreeSet;

use crate::automaton::{Automaton, Label, State, StateSet, Transitions};

use super::Regex;

/// Used to construct an automaton from smaller parts
#[derive(Debug, Clone)]
struct Fragment {
    start: State,
    end: State,
}

#[derive(Debug, Default)]
struct Thompson {
    next_state: usize,
    states: StateSet,
    transitions: Transitions,
}

impl Thompson {
    fn add_state(&mut self) -> State {
        let state = State::from(self.next_state);
        self.next_state += 1;
        self.states.insert(state.clone());
        state
    }

    fn add_transition(&mut self, from: &State, label: Label, to: &State) {
        self.transitions
            .entry(from.clone())
            .or_default()
            .entry(label)
            .or_default()
            .insert(to.clone());
    }

    fn add_epsilon(&mut self, from: &State, to: &State) {
        self.add_transition(from, Label::Epsilon, to);
    }

    fn add_primitive(&mut self, label: Label) -> Fragment {
        let start = self.add_state();
        let end = self.add_state();
        self.add_transition(&start, label, &end);
        Fragment { start, end }
    }

    fn add_concatenation(&mut self, r1: &Fragment, r2: &Fragment) -> Fragment {
        self.add_epsilon(&r1.end, &r2.start);
        Fragment {
            start: r1.start.clone(),
            end: r2.end.clone(),
        }
    }

    fn add_union(&mut self, r1: &Fragment, r2: &Fragment) -> Fragment {
        let start = self.add_state();
        let end = self.add_state();
        self.add_epsilon(&start, &r1.start);
        self.add_epsilon(&start, &r2.start);
        self.add_epsilon(&r1.end, &end);
        self.add_epsilon(&r2.end, &end);
        Fragment { start, end }
    }

    fn add_kleene(&mut self, r: &Fragment) -> Fragment {
        let start = self.add_state();
        let end = self.add_state();
        self.add_epsilon(&start, &r.start);
        self.add_epsilon(&start, &end);
        self.add_epsilon(&r.end, &r.start);
        self.add_epsilon(&r.end, &end);
        Fragment { start, end }
    }

    fn add_optional(&mut self, r: &Fragment) -> Fragment {
        let start = self.add_state();
        let end = self.add_state();
        self.add_epsilon(&start, &r.start);
        self.add_epsilon(&start, &end);
        self.add_epsilon(&r.end, &end);
        Fragment { start, end }
    }

    fn add_fragment(&mut self, regex: &Regex) -> Fragment {
        match regex {
            Regex::Epsilon => self.add_primitive(Label::Epsilon),
            Regex::Symbol(c) => self.add_primitive(Label::symbol(c.to_string())),
            Regex::Concat(left, right) => {
                let r1 = self.add_fragment(left);
                let r2 = self.add_fragment(right);
                self.add_concatenation(&r1, &r2)
            }
            Regex::Union(left, right) => {
                let r1 = self.add_fragment(left);
                let r2 = self.add_fragment(right);
                self.add_union(&r1, &r2)
            }
            Regex::Star(regex) => {
                let r = self.add_fragment(regex);
                self.add_kleene(&r)
            }
            Regex::Plus(regex) => {
                // one copy of the fragment followed by the star of a second copy
                let once = self.add_fragment(regex);
                let again = self.add_fragment(regex);
                let more = self.add_kleene(&again);
                self.add_concatenation(&once, &more)
            }
            Regex::Optional(regex) => {
                let r = self.add_fragment(regex);
                self.add_optional(&r)
            }
        }
    }
}

/// Build an ε-NFA for `regex` over `alphabet`
pub fn thompson(regex: &Regex, alphabet: BTreeSet<String>) -> Automaton {
    let mut builder = Thompson::default();
    let body = builder.add_fragment(regex);
    Automaton::from_parts(
        alphabet,
        builder.states,
        StateSet::from([body.start]),
        StateSet::from([body.end]),
        builder.transitions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::parse;
    use crate::simulation::accepts;

    fn build(expression: &str) -> Automaton {
        let regex = parse(expression).unwrap();
        let alphabet = regex.symbols().iter().map(char::to_string).collect();
        thompson(&regex, alphabet)
    }

    #[test]
    fn character() {
        let automaton = build("a");
        assert_eq!(automaton.states().len(), 2);
        assert_eq!(automaton.initial_state(), Some(&State::from("0")));
        assert!(automaton.is_final(&"1".into()));
        assert!(accepts(&automaton, "a").unwrap());
        assert!(!accepts(&automaton, "aa").unwrap());
    }

    #[test]
    fn alternation() {
        let automaton = build("a|b");
        assert_eq!(automaton.states().len(), 6);
        assert!(accepts(&automaton, "a").unwrap());
        assert!(accepts(&automaton, "b").unwrap());
        assert!(!accepts(&automaton, "ab").unwrap());
    }

    #[test]
    fn kleene() {
        let automaton = build("a*");
        assert_eq!(automaton.states().len(), 4);
        assert!(automaton.has_epsilon());
        assert!(accepts(&automaton, "").unwrap());
        assert!(accepts(&automaton, "aaaaa").unwrap());
    }

    #[test]
    fn one_or_more() {
        let automaton = build("(ab)+");
        assert!(!accepts(&automaton, "").unwrap());
        assert!(accepts(&automaton, "ab").unwrap());
        assert!(accepts(&automaton, "abab").unwrap());
        assert!(!accepts(&automaton, "aba").unwrap());
    }

    #[test]
    fn optional() {
        let automaton = build("ab?");
        assert!(accepts(&automaton, "a").unwrap());
        assert!(accepts(&automaton, "ab").unwrap());
        assert!(!accepts(&automaton, "b").unwrap());
    }

    #[test]
    fn separate_runs() {
        assert_eq!(build("ab"), build("ab"));
    }
}
