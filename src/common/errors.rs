// Copyright (c) 2016-2021 Fabian Schuiki

//! Utilities to implement diagnostics and error reporting facilities.

use crate::source::Location;
use std::fmt;

/// An error raised while compiling a grammar.
///
/// Every phase of the grammar compiler fails with this type. It carries a
/// human-readable message, the location in the grammar source if one is
/// known, and an arbitrary number of notes.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrammarError {
    pub message: String,
    pub location: Option<Location>,
    pub notes: Vec<String>,
}

/// A grammar result type. Either carries the result `T` in the Ok variant, or
/// an assembled error in the Err variant.
pub type GrammarResult<T> = Result<T, GrammarError>;

impl GrammarError {
    pub fn new<S: Into<String>>(message: S) -> GrammarError {
        GrammarError {
            message: message.into(),
            location: None,
            notes: Vec::new(),
        }
    }

    /// Create an error that indicates a broken internal invariant.
    pub fn bug<S: Into<String>>(message: S) -> GrammarError {
        GrammarError::new(format!("internal error: {}", message.into()))
    }

    /// Attach a source location to the error.
    pub fn at(self, location: Location) -> GrammarError {
        GrammarError {
            location: Some(location),
            ..self
        }
    }

    /// Attach a source location unless the error already carries one.
    pub fn or_at(self, location: Location) -> GrammarError {
        if self.location.is_some() {
            self
        } else {
            self.at(location)
        }
    }

    pub fn add_note<S: Into<String>>(self, message: S) -> GrammarError {
        let mut notes = self.notes;
        notes.push(message.into());
        GrammarError { notes, ..self }
    }
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "error: {}", self.message)?;
        if let Some(ref loc) = self.location {
            write!(f, "\n  --> {}", loc)?;
        }
        for note in &self.notes {
            write!(f, "\n   = note: {}", note)?;
        }
        Ok(())
    }
}

impl std::error::Error for GrammarError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_location_and_notes() {
        let err = GrammarError::new("Unknown symbol 'b'.")
            .at(Location::from_offset("a\nbc", 3))
            .add_note("referenced from rule 'A'");
        assert_eq!(
            err.to_string(),
            "error: Unknown symbol 'b'.\n  --> 2:2\n   = note: referenced from rule 'A'"
        );
    }

    #[test]
    fn or_at_keeps_first_location() {
        let first = Location::from_offset("abc", 1);
        let err = GrammarError::new("x")
            .at(first.clone())
            .or_at(Location::from_offset("abc", 2));
        assert_eq!(err.location, Some(first));
    }
}
