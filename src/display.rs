//! Tables for the terminal
//!
//! Transition tables mark initial states with `→` and final states with
//! `*`. Missing transitions are shown as `-`.

use std::collections::BTreeMap;

use tabled::{Table, builder::Builder, settings::Style};

use crate::{
    analysis::Analysis,
    automaton::{Automaton, EPSILON, Label, State, StateSet},
    equations::Solution,
    minimize::{Distinction, Minimization},
    simulation::Simulation,
};

/// `q1` for a single state, `{q1, q2}` otherwise
pub fn format_set(states: &StateSet) -> String {
    if states.len() == 1 {
        if let Some(state) = states.first() {
            return state.to_string();
        }
    }
    let names: Vec<&str> = states.iter().map(State::name).collect();
    format!("{{{}}}", names.join(", "))
}

fn marker(automaton: &Automaton, state: &State) -> String {
    let initial = if automaton.initial_states().contains(state) {
        "→"
    } else {
        ""
    };
    let last = if automaton.is_final(state) { "*" } else { "" };
    format!("{}{}{}", initial, last, state)
}

fn finish(builder: Builder) -> Table {
    let mut table = builder.build();
    table.with(Style::modern());
    table
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// One row per state, one column per symbol, plus `ε` if needed
pub fn transition_table(automaton: &Automaton) -> Table {
    let mut labels: Vec<Label> = automaton.alphabet().iter().map(Label::symbol).collect();
    if automaton.has_epsilon() {
        labels.push(Label::Epsilon);
    }
    let mut builder = Builder::default();
    let mut header = vec![String::new()];
    header.extend(labels.iter().map(Label::to_string));
    builder.push_record(header);
    for state in automaton.states() {
        let mut row = vec![marker(automaton, state)];
        row.extend(labels.iter().map(|label| match automaton.targets(state, label) {
            Some(targets) if !targets.is_empty() => format_set(targets),
            _ => "-".to_string(),
        }));
        builder.push_record(row);
    }
    finish(builder)
}

/// The state set reached after every symbol of a simulated word
pub fn trace_table(simulation: &Simulation) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Step", "Symbol", "States"]);
    for step in &simulation.steps {
        builder.push_record([
            step.index.to_string(),
            step.symbol.clone().unwrap_or_else(|| "-".to_string()),
            format_set(&step.states),
        ]);
    }
    finish(builder)
}

/// Which original states every new state stands for
pub fn mapping_table(title: &str, mapping: &BTreeMap<State, StateSet>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["State", title]);
    for (state, states) in mapping {
        builder.push_record([state.to_string(), format_set(states)]);
    }
    finish(builder)
}

pub fn rounds_table(minimization: &Minimization) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Round", "Refinement", "Partition"]);
    for round in &minimization.rounds {
        let classes: Vec<String> = round.partition.iter().map(format_set).collect();
        builder.push_record([
            format!("P{}", round.round),
            round.description.clone(),
            classes.join(" "),
        ]);
    }
    finish(builder)
}

/// Every pair of states with the shortest word that tells them apart
pub fn distinction_table(distinction: &Distinction) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Pair", "Distinguishing word"]);
    for ((a, b), word) in &distinction.distinguishable {
        let word = if word.is_empty() {
            EPSILON.to_string()
        } else {
            word.concat()
        };
        builder.push_record([format!("{}, {}", a, b), word]);
    }
    for (a, b) in &distinction.equivalent {
        builder.push_record([format!("{}, {}", a, b), "equivalent".to_string()]);
    }
    finish(builder)
}

pub fn analysis_table(automaton: &Automaton, analysis: &Analysis) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["State", "Accessible", "Co-accessible", "Useful"]);
    for state in automaton.states() {
        builder.push_record([
            marker(automaton, state),
            yes_no(analysis.accessible.contains(state)).to_string(),
            yes_no(analysis.coaccessible.contains(state)).to_string(),
            yes_no(analysis.useful.contains(state)).to_string(),
        ]);
    }
    finish(builder)
}

pub fn steps_table(solution: &Solution) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["#", "Method", "Eliminated", "Equation"]);
    for (i, step) in solution.steps.iter().enumerate() {
        builder.push_record([
            (i + 1).to_string(),
            step.method.to_string(),
            step.variable.to_string(),
            format!("{} = {}", step.target, step.after),
        ]);
    }
    finish(builder)
}

pub fn solutions_table(solution: &Solution) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Variable", "Language"]);
    for (variable, expr) in &solution.solutions {
        builder.push_record([variable.to_string(), expr.to_string()]);
    }
    finish(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::tests::{end_to_end, second_to_last_a};
    use crate::simulation::simulate;

    #[test]
    fn sets() {
        let one: StateSet = [State::from("q1")].into();
        let two: StateSet = ["q2", "q1"].map(State::from).into();
        assert_eq!(format_set(&one), "q1");
        assert_eq!(format_set(&two), "{q1, q2}");
        assert_eq!(format_set(&StateSet::new()), "{}");
    }

    #[test]
    fn transitions() {
        let table = transition_table(&end_to_end()).to_string();
        assert!(table.contains("→q0"));
        assert!(table.contains("*q2"));
        assert!(!table.contains('ε'));
        let table = transition_table(&second_to_last_a()).to_string();
        assert!(table.contains("{0, 1}"));
    }

    #[test]
    fn distinctions() {
        let distinction = crate::minimize::distinguishing_words(&end_to_end()).unwrap();
        let table = distinction_table(&distinction);
        assert_eq!(table.count_rows(), 4);
        let table = table.to_string();
        assert!(table.contains("q0, q1"));
        assert!(table.contains('ε'));
    }

    #[test]
    fn trace() {
        let simulation = simulate(&end_to_end(), "aba").unwrap();
        let table = trace_table(&simulation);
        assert_eq!(table.count_rows(), 5);
    }
}
