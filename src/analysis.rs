//! Reachability analysis
//!
//! Accessible states are found by a forward traversal from the initial
//! states, co-accessible states by a backward fixed point from the final
//! states. Neither looks at the labels of the transitions.

use enumset::{EnumSet, EnumSetType};
use log::debug;

use crate::automaton::{Automaton, StateSet, Transitions};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub accessible: StateSet,
    pub coaccessible: StateSet,
    pub useful: StateSet,
    pub useless: StateSet,
}

impl Analysis {
    pub fn is_trimmed(&self) -> bool {
        self.useless.is_empty()
    }
}

/// States reachable from the initial states
pub fn accessible(automaton: &Automaton) -> StateSet {
    let mut reached = automaton.initial_states().clone();
    let mut stack: Vec<_> = reached.iter().cloned().collect();
    while let Some(state) = stack.pop() {
        for (_, targets) in automaton.outgoing(&state) {
            for target in targets {
                if reached.insert(target.clone()) {
                    stack.push(target.clone());
                }
            }
        }
    }
    reached
}

/// States from which a final state is reachable
pub fn coaccessible(automaton: &Automaton) -> StateSet {
    let mut reached = automaton.final_states().clone();
    loop {
        let added: Vec<_> = automaton
            .states()
            .iter()
            .filter(|state| !reached.contains(*state))
            .filter(|state| {
                automaton
                    .outgoing(state)
                    .any(|(_, targets)| !targets.is_disjoint(&reached))
            })
            .cloned()
            .collect();
        if added.is_empty() {
            return reached;
        }
        reached.extend(added);
    }
}

pub fn analyze(automaton: &Automaton) -> Analysis {
    let accessible = accessible(automaton);
    let coaccessible = coaccessible(automaton);
    let useful: StateSet = accessible.intersection(&coaccessible).cloned().collect();
    let useless = automaton.states().difference(&useful).cloned().collect();
    Analysis {
        accessible,
        coaccessible,
        useful,
        useless,
    }
}

pub fn is_trimmed(automaton: &Automaton) -> bool {
    analyze(automaton).is_trimmed()
}

/// Remove useless states.
///
/// Initial states are always kept so the result remains a valid
/// automaton, even if it recognizes the empty language.
pub fn trim(automaton: &Automaton) -> Automaton {
    let analysis = analyze(automaton);
    let mut keep = analysis.useful;
    keep.extend(automaton.initial_states().iter().cloned());
    debug!("trimming {} useless states", automaton.states().len() - keep.len());

    let transitions: Transitions = automaton
        .transition_map()
        .iter()
        .filter(|(from, _)| keep.contains(*from))
        .map(|(from, outgoing)| {
            let outgoing = outgoing
                .iter()
                .map(|(label, targets)| {
                    (label.clone(), targets.intersection(&keep).cloned().collect())
                })
                .collect();
            (from.clone(), outgoing)
        })
        .collect();
    Automaton::from_parts(
        automaton.alphabet().clone(),
        keep.clone(),
        automaton.initial_states().clone(),
        automaton.final_states().intersection(&keep).cloned().collect(),
        transitions,
    )
}

#[derive(EnumSetType, Debug)]
pub enum Property {
    Deterministic,
    Complete,
    Trimmed,
    EpsilonFree,
}

impl Property {
    pub fn name(&self) -> &'static str {
        match self {
            Property::Deterministic => "deterministic",
            Property::Complete => "complete",
            Property::Trimmed => "trimmed",
            Property::EpsilonFree => "epsilon-free",
        }
    }
}

impl std::str::FromStr for Property {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deterministic" => Ok(Property::Deterministic),
            "complete" => Ok(Property::Complete),
            "trimmed" => Ok(Property::Trimmed),
            "epsilon-free" | "epsilon_free" => Ok(Property::EpsilonFree),
            _ => Err(format!("unknown property {:?}", s)),
        }
    }
}

/// The structural properties `automaton` has
pub fn properties(automaton: &Automaton) -> EnumSet<Property> {
    let mut properties = EnumSet::empty();
    if automaton.is_deterministic() {
        properties |= Property::Deterministic;
    }
    if automaton.is_complete() {
        properties |= Property::Complete;
    }
    if is_trimmed(automaton) {
        properties |= Property::Trimmed;
    }
    if !automaton.has_epsilon() {
        properties |= Property::EpsilonFree;
    }
    properties
}
