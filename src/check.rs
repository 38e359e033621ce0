//! Acceptance tests for automata, as read from YAML test files
//!
//! A [`TestSuite`] names an automaton (a JSON file, inline JSON or a
//! regular expression), an optional pipeline of [transforms](Transform)
//! to apply to it, the structural properties the result must have and a
//! list of words that must be accepted or rejected.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use enumset::EnumSet;
use log::{debug, info};

use crate::{
    analysis::{Property, properties},
    automaton::Automaton,
    loader::{self, LoadError},
    regex::{Method, RegexError, build_from_regex},
    simulation::accepts,
    transform::{Transform, TransformError, apply_all},
    yaml::{ParseError, YAMLParser},
};

#[derive(thiserror::Error, Debug)]
pub enum CheckError {
    #[error("Cannot read test file: {0}")]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    ParseError(#[from] ParseError),
    #[error(transparent)]
    LoadError(#[from] LoadError),
    #[error(transparent)]
    RegexError(#[from] RegexError),
    #[error(transparent)]
    TransformError(#[from] TransformError),
}

#[derive(PartialEq, Debug)]
pub enum TestResult {
    Success,
    Failure {
        word: String,
        expected: bool,
        actual: bool,
    },
    ExpectedFailure {
        word: String,
        expected: bool,
        actual: bool,
    },
    UnexpectedSuccess {
        word: String,
    },
    PropertyFailure {
        missing: EnumSet<Property>,
        unexpected: EnumSet<Property>,
    },
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TestResult::Success)
    }
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            TestResult::Failure { .. } | TestResult::PropertyFailure { .. }
        )
    }
    pub fn is_expected_failure(&self) -> bool {
        matches!(self, TestResult::ExpectedFailure { .. })
    }
    pub fn is_unexpected_success(&self) -> bool {
        matches!(self, TestResult::UnexpectedSuccess { .. })
    }
}

/// Where the automaton under test comes from
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A JSON file, resolved relative to the test file or via the search path
    File(PathBuf),
    /// JSON written directly in the YAML file
    Inline(String),
    /// A regular expression and the construction to use
    Regex { expression: String, method: Method },
}

/// Properties the automaton must have, and must not have
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expectations {
    pub present: EnumSet<Property>,
    pub absent: EnumSet<Property>,
}

impl Expectations {
    fn check(&self, actual: EnumSet<Property>) -> TestResult {
        let missing = self.present - actual;
        let unexpected = self.absent & actual;
        if missing.is_empty() && unexpected.is_empty() {
            TestResult::Success
        } else {
            TestResult::PropertyFailure {
                missing,
                unexpected,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedFailure {
    Simple(bool),
    Reason(String),
}

impl ExpectedFailure {
    fn is_failure(&self) -> bool {
        match &self {
            Self::Simple(v) => *v,
            Self::Reason(_) => true,
        }
    }
}

/// A word and whether the automaton should accept it
#[derive(Debug, Clone, PartialEq)]
pub struct Test {
    description: Option<String>,
    word: String,
    accept: bool,
    xfail: ExpectedFailure,
}

impl Test {
    pub fn new(
        description: Option<String>,
        word: String,
        accept: bool,
        xfail: ExpectedFailure,
    ) -> Self {
        Test {
            description,
            word,
            accept,
            xfail,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn check(&self, automaton: &Automaton) -> TestResult {
        // a word using symbols outside of the alphabet is not in the language
        let actual = accepts(automaton, &self.word).unwrap_or_else(|e| {
            debug!("{:?} rejected: {}", self.word, e);
            false
        });
        if actual == self.accept {
            if !self.xfail.is_failure() {
                TestResult::Success
            } else {
                TestResult::UnexpectedSuccess {
                    word: self.word.to_string(),
                }
            }
        } else if self.xfail.is_failure() {
            TestResult::ExpectedFailure {
                word: self.word.to_string(),
                expected: self.accept,
                actual,
            }
        } else {
            TestResult::Failure {
                word: self.word.to_string(),
                expected: self.accept,
                actual,
            }
        }
    }
}

/// One YAML document: an automaton and the tests to run against it
#[derive(Debug, Clone, PartialEq)]
pub struct TestSuite {
    name: Option<String>,
    source: Source,
    transforms: Vec<Transform>,
    expectations: Option<Expectations>,
    tests: Vec<Test>,
}

impl TestSuite {
    pub fn new(
        name: Option<String>,
        source: Source,
        transforms: Vec<Transform>,
        expectations: Option<Expectations>,
        tests: Vec<Test>,
    ) -> Self {
        TestSuite {
            name,
            source,
            transforms,
            expectations,
            tests,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    /// Build the automaton under test, with all transforms applied.
    /// Relative file names are tried against `base` first.
    pub fn automaton(&self, base: Option<&Path>) -> Result<Automaton, CheckError> {
        let automaton = match &self.source {
            Source::File(name) => {
                let path = loader::find_relative(name, base)?;
                let json = fs::read_to_string(&path)?;
                loader::from_json(&json, &path)?
            }
            Source::Inline(json) => loader::from_json(json, Path::new("<inline>"))?,
            Source::Regex { expression, method } => build_from_regex(expression, *method)?,
        };
        Ok(apply_all(&automaton, &self.transforms)?)
    }

    pub fn check(&self, base: Option<&Path>) -> Result<Vec<TestResult>, CheckError> {
        let automaton = self.automaton(base)?;
        let mut results = Vec::new();
        if let Some(expectations) = &self.expectations {
            results.push(expectations.check(properties(&automaton)));
        }
        results.extend(self.tests.iter().map(|test| test.check(&automaton)));
        Ok(results)
    }
}

/// Run every test suite of the YAML file at `path`
pub fn check_yaml(path: &Path) -> Result<Vec<TestResult>, CheckError> {
    info!("Testing with {:?}", path);
    let file = File::open(path)?;
    let mut parser = YAMLParser::new(file)?;
    let suites = parser.yaml()?;
    let base = path.parent();
    let mut results = Vec::new();
    for suite in suites {
        debug!("Running suite {:?}", suite.name().unwrap_or("unnamed"));
        results.extend(suite.check(base)?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(word: &str, accept: bool) -> Test {
        Test::new(None, word.into(), accept, ExpectedFailure::Simple(false))
    }

    fn regex_suite(expression: &str, tests: Vec<Test>) -> TestSuite {
        TestSuite::new(
            None,
            Source::Regex {
                expression: expression.into(),
                method: Method::Glushkov,
            },
            vec![],
            None,
            tests,
        )
    }

    #[test]
    fn check_words() {
        let suite = regex_suite(
            "a(b)*a(a|b)*",
            vec![word("aa", true), word("ab", true), word("abbab", true)],
        );
        let results = suite.check(None).unwrap();
        assert_eq!(
            results,
            vec![
                TestResult::Success,
                TestResult::Failure {
                    word: "ab".into(),
                    expected: true,
                    actual: false
                },
                TestResult::Success,
            ]
        );
    }

    #[test]
    fn foreign_symbols_are_rejected() {
        let suite = regex_suite("a*", vec![word("b", false), word("aaa", true)]);
        let results = suite.check(None).unwrap();
        assert!(results.iter().all(|r| r.is_success()));
    }

    #[test]
    fn xfail() {
        let tests = vec![
            Test::new(None, "b".into(), true, ExpectedFailure::Simple(true)),
            Test::new(
                None,
                "a".into(),
                true,
                ExpectedFailure::Reason("known to pass".into()),
            ),
        ];
        let results = regex_suite("a", tests).check(None).unwrap();
        assert!(results[0].is_expected_failure());
        assert!(results[1].is_unexpected_success());
    }

    #[test]
    fn property_expectations() {
        let expectations = Expectations {
            present: Property::Deterministic | Property::Complete,
            absent: EnumSet::only(Property::EpsilonFree),
        };
        let suite = TestSuite::new(
            None,
            Source::Regex {
                expression: "ab".into(),
                method: Method::Glushkov,
            },
            vec![Transform::Determinize],
            Some(expectations),
            vec![],
        );
        assert_eq!(
            suite.check(None).unwrap(),
            vec![TestResult::PropertyFailure {
                missing: EnumSet::only(Property::Complete),
                unexpected: EnumSet::only(Property::EpsilonFree),
            }]
        );
    }

    #[test]
    fn shipped_yaml_files() {
        for name in ["tests/end_to_end.yaml", "tests/regex.yaml", "tests/transforms.yaml"] {
            let results = check_yaml(Path::new(name)).unwrap();
            assert!(!results.is_empty(), "{} has no tests", name);
            assert!(
                results.iter().all(|r| !r.is_failure() && !r.is_unexpected_success()),
                "{}: {:?}",
                name,
                results
            );
        }
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            check_yaml(Path::new("tests/missing.yaml")),
            Err(CheckError::IoError(_))
        ));
    }
}
