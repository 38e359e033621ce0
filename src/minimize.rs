//! Moore's algorithm
//!
//! Starting from the partition into final and non-final states, classes
//! are split until two states share a class only if, for every symbol,
//! their successors lie in the same class of the previous round. A
//! missing transition counts as a class of its own, so partial automata
//! can be minimized without completing them first.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::debug;

use crate::automaton::{Automaton, Label, NotDeterministic, State, StateSet, Transitions};

/// The partition after one refinement round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub round: usize,
    pub description: String,
    pub partition: Vec<StateSet>,
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}: ", self.round)?;
        let classes: Vec<String> = self
            .partition
            .iter()
            .map(|class| {
                let names: Vec<&str> = class.iter().map(State::name).collect();
                format!("{{{}}}", names.join(", "))
            })
            .collect();
        write!(f, "{}", classes.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minimization {
    pub automaton: Automaton,
    pub rounds: Vec<Round>,
    /// The original states merged into each new state
    pub mapping: BTreeMap<State, StateSet>,
    /// The input had no equivalent states
    pub already_minimal: bool,
}

/// Classes ordered by their smallest member, and the class of every state
struct Partition {
    classes: Vec<StateSet>,
    class_of: HashMap<State, usize>,
}

impl Partition {
    fn new(mut classes: Vec<StateSet>) -> Self {
        classes.retain(|class| !class.is_empty());
        classes.sort_by(|a, b| a.first().cmp(&b.first()));
        let class_of = classes
            .iter()
            .enumerate()
            .flat_map(|(i, class)| class.iter().map(move |state| (state.clone(), i)))
            .collect();
        Self { classes, class_of }
    }

    fn len(&self) -> usize {
        self.classes.len()
    }

    fn class(&self, state: &State) -> Option<usize> {
        self.class_of.get(state).copied()
    }

    /// Split every class by the classes of the successors of its members
    fn refine(&self, automaton: &Automaton) -> Self {
        let mut groups: BTreeMap<(usize, Vec<Option<usize>>), StateSet> = BTreeMap::new();
        for state in automaton.states() {
            let targets = automaton
                .alphabet()
                .iter()
                .map(|symbol| {
                    automaton
                        .target(state, symbol)
                        .and_then(|target| self.class(target))
                })
                .collect();
            let signature = (self.class_of[state], targets);
            groups.entry(signature).or_default().insert(state.clone());
        }
        Self::new(groups.into_values().collect())
    }
}

/// Minimize a deterministic automaton, complete or not.
///
/// States that cannot be reached are minimized like any other state,
/// trim the automaton first to drop them.
pub fn minimize(automaton: &Automaton) -> Result<Minimization, NotDeterministic> {
    automaton.check_deterministic()?;

    let (finals, others): (StateSet, StateSet) = automaton
        .states()
        .iter()
        .cloned()
        .partition(|state| automaton.is_final(state));
    let mut partition = Partition::new(vec![finals, others]);
    let mut rounds = vec![Round {
        round: 0,
        description: "Separate final from non-final states".to_string(),
        partition: partition.classes.clone(),
    }];

    loop {
        let refined = partition.refine(automaton);
        let round = rounds.len();
        let stable = refined.len() == partition.len();
        let description = if stable {
            "No class was split, the partition is stable".to_string()
        } else {
            format!(
                "Split by transition targets: {} classes become {}",
                partition.len(),
                refined.len()
            )
        };
        debug!("round {}: {} classes", round, refined.len());
        rounds.push(Round {
            round,
            description,
            partition: refined.classes.clone(),
        });
        partition = refined;
        if stable {
            break;
        }
    }

    let already_minimal = partition.len() == automaton.states().len();
    let automaton = quotient(automaton, &partition);
    Ok(Minimization {
        mapping: automaton.1,
        automaton: automaton.0,
        rounds,
        already_minimal,
    })
}

/// Build the automaton with one state per class. The class of the initial
/// state becomes `0`, the others follow in partition order.
fn quotient(automaton: &Automaton, partition: &Partition) -> (Automaton, BTreeMap<State, StateSet>) {
    let initial_class = automaton
        .initial_state()
        .and_then(|state| partition.class(state));
    let mut order: Vec<usize> = (0..partition.len()).collect();
    if let Some(initial_class) = initial_class {
        order.retain(|class| *class != initial_class);
        order.insert(0, initial_class);
    }
    let names: HashMap<usize, State> = order
        .iter()
        .enumerate()
        .map(|(name, class)| (*class, State::from(name)))
        .collect();
    let name = |state: &State| partition.class(state).map(|class| names[&class].clone());

    let mut transitions = Transitions::new();
    let mut mapping = BTreeMap::new();
    for class in &order {
        let members = &partition.classes[*class];
        let new = names[class].clone();
        mapping.insert(new.clone(), members.clone());
        let Some(representative) = members.first() else {
            continue;
        };
        for symbol in automaton.alphabet() {
            if let Some(target) = automaton.target(representative, symbol).and_then(name) {
                transitions
                    .entry(new.clone())
                    .or_default()
                    .insert(Label::symbol(symbol.as_str()), StateSet::from([target]));
            }
        }
    }

    let automaton = Automaton::from_parts(
        automaton.alphabet().clone(),
        mapping.keys().cloned().collect(),
        automaton.initial_states().iter().filter_map(name).collect(),
        automaton.final_states().iter().filter_map(name).collect(),
        transitions,
    );
    (automaton, mapping)
}

/// Which pairs of states can be told apart, and by which word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distinction {
    /// For every distinguishable pair, a shortest word accepted from
    /// exactly one of the two states
    pub distinguishable: BTreeMap<(State, State), Vec<String>>,
    /// Pairs that accept the same language
    pub equivalent: Vec<(State, State)>,
}

fn ordered<T: Ord>(a: T, b: T) -> (T, T) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Fill the table of distinguishable state pairs of a deterministic
/// automaton.
///
/// Round `k` marks the pairs whose shortest distinguishing word has `k`
/// symbols, so every recorded word is as short as possible. A missing
/// transition leads to an implicit dead state.
pub fn distinguishing_words(automaton: &Automaton) -> Result<Distinction, NotDeterministic> {
    automaton.check_deterministic()?;

    // `None` is the dead state
    let states: Vec<Option<&State>> = automaton
        .states()
        .iter()
        .map(Some)
        .chain([None])
        .collect();
    let is_final = |state: Option<&State>| state.is_some_and(|state| automaton.is_final(state));
    let next = |state: Option<&State>, symbol: &str| {
        state.and_then(|state| automaton.target(state, symbol))
    };

    let mut witnesses: HashMap<(Option<&State>, Option<&State>), Vec<String>> = HashMap::new();
    for (i, a) in states.iter().enumerate() {
        for b in &states[i + 1..] {
            if is_final(*a) != is_final(*b) {
                witnesses.insert(ordered(*a, *b), Vec::new());
            }
        }
    }

    let mut round = 0;
    loop {
        round += 1;
        let mut found = Vec::new();
        for (i, a) in states.iter().enumerate() {
            for b in &states[i + 1..] {
                let pair = ordered(*a, *b);
                if witnesses.contains_key(&pair) {
                    continue;
                }
                for symbol in automaton.alphabet() {
                    let targets =
                        ordered(next(*a, symbol.as_str()), next(*b, symbol.as_str()));
                    if let Some(rest) = witnesses.get(&targets) {
                        let mut word = vec![symbol.clone()];
                        word.extend(rest.iter().cloned());
                        found.push((pair, word));
                        break;
                    }
                }
            }
        }
        if found.is_empty() {
            break;
        }
        debug!("round {}: {} pairs distinguished", round, found.len());
        witnesses.extend(found);
    }

    let mut distinction = Distinction {
        distinguishable: BTreeMap::new(),
        equivalent: Vec::new(),
    };
    for (i, a) in automaton.states().iter().enumerate() {
        for b in automaton.states().iter().skip(i + 1) {
            match witnesses.get(&(Some(a), Some(b))) {
                Some(word) => {
                    distinction
                        .distinguishable
                        .insert((a.clone(), b.clone()), word.clone());
                }
                None => distinction.equivalent.push((a.clone(), b.clone())),
            }
        }
    }
    Ok(distinction)
}
