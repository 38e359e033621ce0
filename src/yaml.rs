//! Reader for YAML test files
//!
//! A file holds one or more documents, each describing a [`TestSuite`]:
//!
//! ```yaml
//! name: words with an a in second to last position
//! automaton: second_to_last.json  # or inline JSON, or `regex:` + `method:`
//! transforms: [determinize, minimize]
//! properties: [deterministic, complete]
//! tests:
//!   - [ab, accept]
//!   - [a single b, b, reject]
//!   - [ba, accept, {xfail: true}]
//! ```

use std::{fs::File, iter::Peekable, path::PathBuf};

use enumset::EnumSet;
use libyaml::{Encoding, Event, Parser, ParserIter};

use crate::{
    analysis::Property,
    check::{Expectations, ExpectedFailure, Source, Test, TestSuite},
    regex::Method,
    transform::Transform,
};

type YAMLEventError = Option<Result<Event, libyaml::ParserError>>;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("Scalar expected, got {0:?}")]
    ScalarExpected(YAMLEventError),
    #[error("YAML parse error")]
    YAMLError(#[from] libyaml::ParserError),
    #[error("Stream start expected")]
    StreamStartExpected,
    #[error("Stream end expected")]
    StreamEndExpected,
    #[error("Document start expected")]
    DocumentStartExpected,
    #[error("Document end expected")]
    DocumentEndExpected,
    #[error("Sequence start expected")]
    SequenceStartExpected,
    #[error("Sequence end expected, got {0:?}")]
    SequenceEndExpected(YAMLEventError),
    #[error("Mapping start expected, got {0:?}")]
    MappingStartExpected(YAMLEventError),
    #[error("Mapping end expected")]
    MappingEndExpected,
    #[error("Encoding {0:?} not supported")]
    InvalidEncoding(Encoding),
    #[error("Invalid token {0:?}")]
    InvalidToken(String),
    #[error("Invalid expectation {0:?}, expected accept or reject")]
    InvalidExpectation(String),
    #[error("Unknown property {0:?}")]
    InvalidProperty(String),
    #[error("Unknown transformation {0:?}")]
    InvalidTransform(String),
    #[error("Unknown construction method {0:?}")]
    InvalidMethod(String),
    #[error("Test suite without an automaton or regex")]
    MissingAutomaton,
    #[error("Test suite with both an automaton and a regex")]
    ConflictingSources,
}

pub struct YAMLParser<'a> {
    events: Peekable<ParserIter<'a>>,
}

impl<'a> YAMLParser<'a> {
    pub fn new(reader: File) -> Result<Self, ParseError> {
        let parser = Parser::new(reader)?;
        Ok(Self {
            events: parser.into_iter().peekable(),
        })
    }

    fn scalar(&mut self) -> Result<String, ParseError> {
        match self.events.next() {
            Some(Ok(Event::Scalar { value, .. })) => Ok(value),
            e => Err(ParseError::ScalarExpected(e)),
        }
    }

    fn mapping_start(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::MappingStart { .. })) => Ok(()),
            e => Err(ParseError::MappingStartExpected(e)),
        }
    }

    fn mapping_end(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::MappingEnd)) => Ok(()),
            _ => Err(ParseError::MappingEndExpected),
        }
    }

    fn sequence_start(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::SequenceStart { .. })) => Ok(()),
            _ => Err(ParseError::SequenceStartExpected),
        }
    }

    fn sequence_end(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::SequenceEnd)) => Ok(()),
            e => Err(ParseError::SequenceEndExpected(e)),
        }
    }

    /// A single scalar or a sequence of scalars
    fn scalars(&mut self) -> Result<Vec<String>, ParseError> {
        if let Some(Ok(Event::Scalar { .. })) = self.events.peek() {
            return Ok(vec![self.scalar()?]);
        }
        self.sequence_start()?;
        let mut values = Vec::new();
        while let Some(Ok(Event::Scalar { .. })) = self.events.peek() {
            values.push(self.scalar()?);
        }
        self.sequence_end()?;
        Ok(values)
    }

    fn bool_value(&mut self) -> Result<bool, ParseError> {
        let value = self.scalar()?;
        match &*value {
            "true" | "yes" | "on" => Ok(true),
            "false" | "no" | "off" => Ok(false),
            _ => Err(ParseError::InvalidToken(value)),
        }
    }

    /// An automaton given by file name, or inline as JSON
    fn automaton(&mut self) -> Result<Source, ParseError> {
        let value = self.scalar()?;
        if value.trim_start().starts_with('{') {
            Ok(Source::Inline(value))
        } else {
            Ok(Source::File(PathBuf::from(value)))
        }
    }

    fn method(&mut self) -> Result<Method, ParseError> {
        let value = self.scalar()?;
        value.parse().map_err(|_| ParseError::InvalidMethod(value))
    }

    fn transforms(&mut self) -> Result<Vec<Transform>, ParseError> {
        self.scalars()?
            .into_iter()
            .map(|name| name.parse::<Transform>().map_err(|_| ParseError::InvalidTransform(name)))
            .collect()
    }

    fn property(&mut self) -> Result<Property, ParseError> {
        let value = self.scalar()?;
        value.parse().map_err(|_| ParseError::InvalidProperty(value))
    }

    /// Either a list of properties that must hold, or a mapping from
    /// property to whether it must hold
    fn properties(&mut self) -> Result<Expectations, ParseError> {
        let mut expectations = Expectations::default();
        if let Some(Ok(Event::MappingStart { .. })) = self.events.peek() {
            self.mapping_start()?;
            while let Some(Ok(Event::Scalar { .. })) = self.events.peek() {
                let property = self.property()?;
                if self.bool_value()? {
                    expectations.present |= property;
                } else {
                    expectations.absent |= property;
                }
            }
            self.mapping_end()?;
        } else {
            self.sequence_start()?;
            let mut present = EnumSet::new();
            while let Some(Ok(Event::Scalar { .. })) = self.events.peek() {
                present |= self.property()?;
            }
            self.sequence_end()?;
            expectations.present = present;
        }
        Ok(expectations)
    }

    fn expectation(value: String) -> Result<bool, ParseError> {
        match &*value {
            "accept" | "accepted" | "true" | "yes" => Ok(true),
            "reject" | "rejected" | "false" | "no" => Ok(false),
            _ => Err(ParseError::InvalidExpectation(value)),
        }
    }

    fn xfail(&mut self) -> Result<ExpectedFailure, ParseError> {
        let value = self.scalar()?;
        match &*value {
            "off" | "false" | "no" => Ok(ExpectedFailure::Simple(false)),
            "on" | "true" | "yes" => Ok(ExpectedFailure::Simple(true)),
            _ => Ok(ExpectedFailure::Reason(value)),
        }
    }

    fn test(&mut self) -> Result<Test, ParseError> {
        self.sequence_start()?;
        let mut description = None;
        let mut word = self.scalar()?;
        let mut value = self.scalar()?;
        // three scalars are (description, word, expectation)
        if let Some(Ok(Event::Scalar { .. })) = self.events.peek() {
            description = Some(word);
            word = value;
            value = self.scalar()?;
        }
        let accept = Self::expectation(value)?;
        let mut xfail = ExpectedFailure::Simple(false);
        if let Some(Ok(Event::MappingStart { .. })) = self.events.peek() {
            self.mapping_start()?;
            while let Some(Ok(Event::Scalar { .. })) = self.events.peek() {
                let key = self.scalar()?;
                match &*key {
                    "xfail" => {
                        xfail = self.xfail()?;
                    }
                    _ => {
                        return Err(ParseError::InvalidToken(key));
                    }
                }
            }
            self.mapping_end()?;
        };
        self.sequence_end()?;
        Ok(Test::new(description, word, accept, xfail))
    }

    fn tests(&mut self) -> Result<Vec<Test>, ParseError> {
        let mut tests: Vec<Test> = Vec::new();
        self.sequence_start()?;
        while let Some(Ok(Event::SequenceStart { .. })) = self.events.peek() {
            tests.push(self.test()?);
        }
        self.sequence_end()?;
        Ok(tests)
    }

    fn stream_start(&mut self) -> Result<(), ParseError> {
        if let Some(Ok(Event::StreamStart {
            encoding: Some(encoding),
        })) = self.events.next()
        {
            if encoding == Encoding::Utf8 {
                Ok(())
            } else {
                Err(ParseError::InvalidEncoding(encoding))
            }
        } else {
            Err(ParseError::StreamStartExpected)
        }
    }

    fn stream_end(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::StreamEnd)) => Ok(()),
            _ => Err(ParseError::StreamEndExpected),
        }
    }

    fn document_start(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::DocumentStart { .. })) => Ok(()),
            _ => Err(ParseError::DocumentStartExpected),
        }
    }

    fn document_end(&mut self) -> Result<(), ParseError> {
        match self.events.next() {
            Some(Ok(Event::DocumentEnd { .. })) => Ok(()),
            _ => Err(ParseError::DocumentEndExpected),
        }
    }

    fn test_suite(&mut self) -> Result<TestSuite, ParseError> {
        let mut name = None;
        let mut automaton = None;
        let mut regex = None;
        let mut method = Method::default();
        let mut transforms = Vec::new();
        let mut expectations = None;
        let mut tests = Vec::new();

        self.mapping_start()?;
        while let Some(Ok(Event::Scalar { .. })) = self.events.peek() {
            let value = self.scalar()?;
            match &*value {
                "name" => {
                    name = Some(self.scalar()?);
                }
                "automaton" => {
                    automaton = Some(self.automaton()?);
                }
                "regex" => {
                    regex = Some(self.scalar()?);
                }
                "method" => {
                    method = self.method()?;
                }
                "transforms" => {
                    transforms = self.transforms()?;
                }
                "properties" => {
                    expectations = Some(self.properties()?);
                }
                "tests" => {
                    tests = self.tests()?;
                }
                _ => {
                    return Err(ParseError::InvalidToken(value));
                }
            }
        }
        self.mapping_end()?;

        let source = match (automaton, regex) {
            (Some(source), None) => source,
            (None, Some(expression)) => Source::Regex { expression, method },
            (Some(_), Some(_)) => return Err(ParseError::ConflictingSources),
            (None, None) => return Err(ParseError::MissingAutomaton),
        };
        Ok(TestSuite::new(name, source, transforms, expectations, tests))
    }

    pub fn yaml(&mut self) -> Result<Vec<TestSuite>, ParseError> {
        let mut test_suites: Vec<TestSuite> = Vec::new();
        self.stream_start()?;
        while let Some(Ok(Event::DocumentStart { .. })) = self.events.peek() {
            self.document_start()?;
            test_suites.push(self.test_suite()?);
            self.document_end()?;
        }
        self.stream_end()?;
        Ok(test_suites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(path: &str) -> Result<Vec<TestSuite>, ParseError> {
        YAMLParser::new(File::open(path).unwrap())?.yaml()
    }

    #[test]
    fn several_documents() {
        let suites = parse("tests/regex.yaml").unwrap();
        assert_eq!(suites.len(), 3);
        assert_eq!(
            suites[0].source(),
            &Source::Regex {
                expression: "a(b)*a(a|b)*".into(),
                method: Method::Thompson
            }
        );
        assert_eq!(
            suites[1].source(),
            &Source::Regex {
                expression: "a(b)*a(a|b)*".into(),
                method: Method::Glushkov
            }
        );
    }

    #[test]
    fn tests_with_description() {
        let suites = parse("tests/end_to_end.yaml").unwrap();
        assert_eq!(suites[0].source(), &Source::File("end_to_end.json".into()));
        let tests = suites[0].tests();
        assert_eq!(tests[0].description(), None);
        assert!(tests.iter().any(|t| t.description() == Some("b loops on q1")));
    }

    #[test]
    fn invalid_expectation() {
        assert!(matches!(
            parse("tests/invalid.yaml"),
            Err(ParseError::InvalidExpectation(value)) if value == "maybe"
        ));
    }
}
