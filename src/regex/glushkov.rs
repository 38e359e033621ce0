//! Glushkov's position automaton
//!
//! Every occurrence of a symbol in the expression is a position, numbered
//! from 1 left to right. The automaton has the state `0` plus one state
//! per position, and no ε-transitions: `0` leads to the positions that can
//! start a word, a position leads to the positions that can follow it.

use std::collections::BTreeSet;

use crate::automaton::{Automaton, Label, State, StateSet, Transitions};

use super::Regex;

/// First and last positions of a sub-expression
struct Positions {
    nullable: bool,
    first: BTreeSet<usize>,
    last: BTreeSet<usize>,
}

#[derive(Default)]
struct Linearization {
    /// The symbol at each position, position `p` at index `p - 1`
    symbols: Vec<char>,
    /// The positions that may follow each position
    follow: Vec<BTreeSet<usize>>,
}

impl Linearization {
    fn link(&mut self, from: &BTreeSet<usize>, to: &BTreeSet<usize>) {
        for p in from {
            self.follow[p - 1].extend(to);
        }
    }

    fn repeat(&mut self, regex: &Regex) -> Positions {
        let inner = self.positions(regex);
        self.link(&inner.last, &inner.first);
        inner
    }

    fn positions(&mut self, regex: &Regex) -> Positions {
        match regex {
            Regex::Epsilon => Positions {
                nullable: true,
                first: BTreeSet::new(),
                last: BTreeSet::new(),
            },
            Regex::Symbol(c) => {
                self.symbols.push(*c);
                self.follow.push(BTreeSet::new());
                let p = self.symbols.len();
                Positions {
                    nullable: false,
                    first: BTreeSet::from([p]),
                    last: BTreeSet::from([p]),
                }
            }
            Regex::Concat(left, right) => {
                let left = self.positions(left);
                let right = self.positions(right);
                self.link(&left.last, &right.first);
                let mut first = left.first;
                if left.nullable {
                    first.extend(&right.first);
                }
                let mut last = right.last;
                if right.nullable {
                    last.extend(&left.last);
                }
                Positions {
                    nullable: left.nullable && right.nullable,
                    first,
                    last,
                }
            }
            Regex::Union(left, right) => {
                let left = self.positions(left);
                let right = self.positions(right);
                Positions {
                    nullable: left.nullable || right.nullable,
                    first: &left.first | &right.first,
                    last: &left.last | &right.last,
                }
            }
            Regex::Star(regex) => Positions {
                nullable: true,
                ..self.repeat(regex)
            },
            Regex::Plus(regex) => self.repeat(regex),
            Regex::Optional(regex) => Positions {
                nullable: true,
                ..self.positions(regex)
            },
        }
    }
}

/// Build the position automaton of `regex` over `alphabet`
pub fn glushkov(regex: &Regex, alphabet: BTreeSet<String>) -> Automaton {
    let mut linearization = Linearization::default();
    let Positions {
        nullable,
        first,
        last,
    } = linearization.positions(regex);

    let initial = State::from(0);
    let position = |p: usize| State::from(p);
    let label = |p: usize| Label::symbol(linearization.symbols[p - 1].to_string());

    let mut transitions = Transitions::new();
    let mut add = |from: State, p: usize| {
        transitions
            .entry(from)
            .or_default()
            .entry(label(p))
            .or_default()
            .insert(position(p));
    };
    for p in &first {
        add(initial.clone(), *p);
    }
    for (i, follow) in linearization.follow.iter().enumerate() {
        for q in follow {
            add(position(i + 1), *q);
        }
    }

    let states = (0..=linearization.symbols.len()).map(State::from).collect();
    let mut final_states: StateSet = last.into_iter().map(position).collect();
    if nullable {
        final_states.insert(initial.clone());
    }
    Automaton::from_parts(
        alphabet,
        states,
        StateSet::from([initial]),
        final_states,
        transitions,
    )
}
