//! Locate and load automata stored as JSON files
//!
//! Relative file names are looked up in the directories listed in the
//! `AUTOMATA_PATH` environment variable, falling back to the current
//! directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use search_path::SearchPath;

use crate::automaton::{Automaton, AutomatonDefinition, ValidationError};

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Automaton file {0:?} not found")]
    NotFound(PathBuf),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Invalid JSON in {path:?}: {source}")]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid automaton in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Resolve `name` to an existing file
///
/// Absolute paths and paths that exist as given are returned unchanged,
/// otherwise every directory of the search path is tried in turn.
pub fn find(name: &Path) -> Result<PathBuf, LoadError> {
    if name.is_absolute() || name.is_file() {
        return if name.is_file() {
            Ok(name.to_path_buf())
        } else {
            Err(LoadError::NotFound(name.to_path_buf()))
        };
    }
    let search_path = &SearchPath::new_or("AUTOMATA_PATH", ".");
    for dir in search_path.iter() {
        let candidate = dir.join(name);
        if candidate.is_file() {
            debug!("Found {:?} in {:?}", name, dir);
            return Ok(candidate);
        }
    }
    Err(LoadError::NotFound(name.to_path_buf()))
}

/// Same as [`find`] but try `base` before the search path
pub fn find_relative(name: &Path, base: Option<&Path>) -> Result<PathBuf, LoadError> {
    if let Some(base) = base {
        let candidate = base.join(name);
        if !name.is_absolute() && candidate.is_file() {
            return Ok(candidate);
        }
    }
    find(name)
}

/// Parse the JSON description of an automaton
pub fn definition(json: &str) -> Result<AutomatonDefinition, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parse and validate the JSON description of an automaton
pub fn from_json(json: &str, path: &Path) -> Result<Automaton, LoadError> {
    let definition = definition(json).map_err(|source| LoadError::JsonError {
        path: path.to_path_buf(),
        source,
    })?;
    Automaton::try_from(definition).map_err(|source| LoadError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Find and read the automaton stored in `name` without validating it
pub fn load_definition(name: &Path) -> Result<AutomatonDefinition, LoadError> {
    let path = find(name)?;
    let json = fs::read_to_string(&path)?;
    definition(&json).map_err(|source| LoadError::JsonError { path, source })
}

/// Find, read and validate the automaton stored in `name`
pub fn load(name: &Path) -> Result<Automaton, LoadError> {
    let path = find(name)?;
    let json = fs::read_to_string(&path)?;
    from_json(&json, &path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Violation;

    #[test]
    fn load_shipped_automaton() {
        let automaton = load(Path::new("tests/end_to_end.json")).unwrap();
        assert_eq!(automaton.states().len(), 3);
        assert!(automaton.is_deterministic());
    }

    #[test]
    fn load_unvalidated_definition() {
        let definition = load_definition(Path::new("tests/second_to_last.json")).unwrap();
        assert_eq!(definition.final_states.len(), 1);
        assert!(crate::automaton::validate(&definition).is_valid());
    }

    #[test]
    fn not_found() {
        assert!(matches!(
            load(Path::new("tests/does_not_exist.json")),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn invalid_json() {
        assert!(matches!(
            from_json("{\"alphabet\": [", Path::new("inline")),
            Err(LoadError::JsonError { .. })
        ));
    }

    #[test]
    fn invalid_automaton() {
        let json = r#"{
            "alphabet": ["a"],
            "states": ["q0"],
            "initialStates": ["q1"],
            "finalStates": [],
            "transitions": {}
        }"#;
        match from_json(json, Path::new("inline")) {
            Err(LoadError::Invalid { source, .. }) => {
                assert_eq!(source.violations(), &[Violation::UnknownInitialState("q1".into())]);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
