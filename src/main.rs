use clap::{Parser, Subcommand};
use libautomata::{
    Automaton, Error, analyze,
    analysis::properties,
    automaton::is_epsilon,
    canonize,
    check::{TestResult, check_yaml},
    complete,
    determinize::subset_construction,
    display, distinguishing_words, equations, generate_equations, loader, minimize,
    regex::{self, Method},
    simulate, solve_equations,
    transform::{Transform, apply_all},
    validate,
};
use log::info;
use std::{fs, path::PathBuf, process::ExitCode};

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check the automaton in <AUTOMATON> and list errors and warnings
    #[command(arg_required_else_help = true)]
    Validate {
        /// JSON file describing the automaton
        automaton: PathBuf,
    },
    /// print the transition table of <AUTOMATON>
    Show {
        automaton: PathBuf,
        /// Print the automaton as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Run <WORD> through <AUTOMATON> and print every step
    #[command(arg_required_else_help = true)]
    Simulate {
        automaton: PathBuf,
        /// Word to simulate, use "" or ε for the empty word
        word: String,
    },
    /// Subset construction
    Determinize {
        automaton: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Moore's algorithm, the automaton must be deterministic
    Minimize {
        automaton: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Shortest word telling apart every pair of states, the automaton must
    /// be deterministic
    Distinguish { automaton: PathBuf },
    /// Add a sink state for every missing transition
    Complete {
        automaton: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Apply a pipeline of transformations, e.g. `determinize complete complement`
    Apply {
        automaton: PathBuf,
        /// determinize, minimize, complete, complement, trim, canonize or remove-epsilon
        #[arg(required = true)]
        transforms: Vec<Transform>,
        #[arg(long)]
        json: bool,
    },
    /// Accessible, co-accessible and useful states of <AUTOMATON>
    Analyze { automaton: PathBuf },
    /// Build an automaton for <EXPRESSION>
    #[command(arg_required_else_help = true)]
    Regex {
        expression: String,
        /// thompson or glushkov
        #[arg(long, default_value_t = Method::Thompson)]
        method: Method,
        #[arg(long)]
        json: bool,
    },
    /// Print the equation system of <AUTOMATON> and solve it
    Equations { automaton: PathBuf },
    /// Solve the equation system written in <EQUATIONS>
    Solve {
        /// Text file with one `X = ...` equation per line
        equations: PathBuf,
    },
    /// Run the tests defined in the <YAML_TEST_FILE>. Return 0 if all
    /// tests pass or 1 if any of the tests fail.
    CheckYaml {
        /// YAML file listing all the tests
        #[arg(required = true)]
        yaml: Vec<PathBuf>,
    },
}

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "automata")]
#[command(about = "A command line tool to build, transform and run finite automata")]
#[command(author, version, long_about = None)] // Read from `Cargo.toml`
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn print_automaton(automaton: &Automaton, json: bool) -> Result<(), Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(automaton)?);
    } else {
        println!("{}", display::transition_table(automaton));
    }
    Ok(())
}

fn run(command: Commands) -> Result<bool, Error> {
    match command {
        Commands::Validate { automaton } => {
            let report = validate(&loader::load_definition(&automaton)?);
            for error in &report.errors {
                println!("error: {}", error);
            }
            for warning in &report.warnings {
                println!("warning: {}", warning);
            }
            if report.is_valid() {
                println!("{:?} is valid", automaton);
            }
            Ok(report.is_valid())
        }
        Commands::Show { automaton, json } => {
            print_automaton(&loader::load(&automaton)?, json)?;
            Ok(true)
        }
        Commands::Simulate { automaton, word } => {
            let automaton = loader::load(&automaton)?;
            let word = if is_epsilon(&word) { "" } else { &word };
            let simulation = simulate(&automaton, word)?;
            println!("{}", display::trace_table(&simulation));
            if let Some(position) = simulation.halted_at {
                println!("No transition at position {}", position);
            }
            println!(
                "{}",
                if simulation.accepted { "accepted" } else { "rejected" }
            );
            Ok(simulation.accepted)
        }
        Commands::Determinize { automaton, json } => {
            let automaton = loader::load(&automaton)?;
            if automaton.is_deterministic() {
                info!("automaton is already deterministic");
            }
            let construction = subset_construction(&automaton);
            if !json {
                println!("{}", display::mapping_table("Subset", &construction.subsets));
            }
            print_automaton(&construction.automaton, json)?;
            Ok(true)
        }
        Commands::Minimize { automaton, json } => {
            let minimization = minimize(&loader::load(&automaton)?)?;
            if !json {
                println!("{}", display::rounds_table(&minimization));
                if minimization.already_minimal {
                    println!("The automaton is already minimal");
                } else {
                    println!("{}", display::mapping_table("Merged", &minimization.mapping));
                }
            }
            print_automaton(&minimization.automaton, json)?;
            Ok(true)
        }
        Commands::Distinguish { automaton } => {
            let distinction = distinguishing_words(&loader::load(&automaton)?)?;
            println!("{}", display::distinction_table(&distinction));
            Ok(true)
        }
        Commands::Complete { automaton, json } => {
            let completion = complete(&loader::load(&automaton)?);
            if !json {
                match &completion.sink {
                    Some(sink) => println!("Added sink state {}", sink),
                    None => println!("The automaton is already complete"),
                }
            }
            print_automaton(&completion.automaton, json)?;
            Ok(true)
        }
        Commands::Apply {
            automaton,
            transforms,
            json,
        } => {
            let result = apply_all(&loader::load(&automaton)?, &transforms)?;
            print_automaton(&result, json)?;
            Ok(true)
        }
        Commands::Analyze { automaton } => {
            let automaton = loader::load(&automaton)?;
            let analysis = analyze(&automaton);
            println!("{}", display::analysis_table(&automaton, &analysis));
            println!("Useless: {}", display::format_set(&analysis.useless));
            let names: Vec<&str> = properties(&automaton).iter().map(|p| p.name()).collect();
            println!("Properties: {}", names.join(", "));
            Ok(true)
        }
        Commands::Regex {
            expression,
            method,
            json,
        } => {
            info!("alphabet {:?}", regex::alphabet(&expression)?);
            let automaton = regex::build_from_regex(&expression, method)?;
            print_automaton(&canonize(&automaton), json)?;
            Ok(true)
        }
        Commands::Equations { automaton } => {
            let automaton = loader::load(&automaton)?;
            let system = generate_equations(&automaton);
            print!("{}", system);
            let solution = solve_equations(&system)?;
            println!("{}", display::steps_table(&solution));
            println!("{}", display::solutions_table(&solution));
            println!("Language: {}", equations::to_regex(&automaton)?);
            Ok(true)
        }
        Commands::Solve { equations: file } => {
            let system: equations::EquationSystem = fs::read_to_string(file)?.parse()?;
            let solution = solve_equations(&system)?;
            println!("{}", display::steps_table(&solution));
            println!("{}", display::solutions_table(&solution));
            Ok(true)
        }
        Commands::CheckYaml { yaml } => {
            let mut passed = true;
            for path in yaml {
                println!("Testing with {:?}", path);
                let results = check_yaml(&path)?;
                for result in results.iter().filter(|r| !r.is_success()) {
                    println!("{:?}", result);
                }
                println!(
                    "Pass: {}",
                    results
                        .iter()
                        .filter(|r| **r == TestResult::Success)
                        .count()
                );
                println!(
                    "Fail: {}",
                    results.iter().filter(|r| r.is_failure()).count()
                );
                println!(
                    "Expected failures: {}",
                    results.iter().filter(|r| r.is_expected_failure()).count()
                );
                println!(
                    "Unexpected successes: {}",
                    results.iter().filter(|r| r.is_unexpected_success()).count()
                );
                passed &= results
                    .iter()
                    .all(|r| !r.is_failure() && !r.is_unexpected_success());
            }
            Ok(passed)
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Cli::parse();

    match run(args.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
