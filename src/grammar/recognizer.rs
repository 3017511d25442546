// Copyright (c) 2016-2021 Fabian Schuiki

//! Recognizers match low-level patterns (tokens) in the input.
//!
//! A recognizer is a pure function of the input and a byte position. It
//! returns the matched text, which always starts exactly at the position, or
//! `None` if the input does not match there.

use pargram_common::util::esc_control_characters;
use pargram_common::{GrammarError, GrammarResult};
use regex::{Regex, RegexBuilder};
use std::{fmt, sync::Arc};

/// The matching strategy of a terminal.
#[derive(Clone)]
pub enum Recognizer {
    /// Matches a literal string.
    Literal(StringRecognizer),
    /// Matches a regular expression.
    Pattern(RegexRecognizer),
    /// Matches with a function supplied by the user.
    Custom(CustomRecognizer),
    /// Never matches. Used by `EMPTY`.
    Empty,
    /// Matches the empty string at the end of the input. Used by `EOF`.
    Eof,
    /// Matches the empty string at the end of the input. Used by `STOP`.
    Stop,
}

impl Recognizer {
    /// Create a literal recognizer.
    pub fn literal<S: Into<String>>(value: S, ignore_case: bool) -> Recognizer {
        Recognizer::Literal(StringRecognizer::new(value, ignore_case))
    }

    /// Create a pattern recognizer with multi-line mode enabled.
    pub fn pattern(regex: &str) -> GrammarResult<Recognizer> {
        Ok(Recognizer::Pattern(RegexRecognizer::new(regex, true, false)?))
    }

    /// Create a recognizer from a function returning the length of the match
    /// in bytes.
    pub fn custom<F>(name: &str, func: F) -> Recognizer
    where
        F: Fn(&str, usize) -> Option<usize> + Send + Sync + 'static,
    {
        Recognizer::Custom(CustomRecognizer {
            name: name.to_string(),
            func: Arc::new(func),
        })
    }

    /// Try to match the input at `pos`.
    pub fn recognize<'i>(&self, input: &'i str, pos: usize) -> Option<&'i str> {
        match *self {
            Recognizer::Literal(ref r) => r.recognize(input, pos),
            Recognizer::Pattern(ref r) => r.recognize(input, pos),
            Recognizer::Custom(ref r) => r.recognize(input, pos),
            Recognizer::Empty => None,
            Recognizer::Eof | Recognizer::Stop => {
                if pos == input.len() {
                    Some(&input[pos..])
                } else {
                    None
                }
            }
        }
    }

    pub fn is_literal(&self) -> bool {
        match *self {
            Recognizer::Literal(..) => true,
            _ => false,
        }
    }

    pub fn is_pattern(&self) -> bool {
        match *self {
            Recognizer::Pattern(..) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Recognizer::Literal(ref r) => write!(f, "Literal({:?})", r.value),
            Recognizer::Pattern(ref r) => write!(f, "Pattern(/{}/)", esc_control_characters(&r.source)),
            Recognizer::Custom(ref r) => write!(f, "Custom({})", r.name),
            Recognizer::Empty => write!(f, "Empty"),
            Recognizer::Eof => write!(f, "Eof"),
            Recognizer::Stop => write!(f, "Stop"),
        }
    }
}

/// Matches a literal string, optionally ignoring case.
#[derive(Clone, Debug)]
pub struct StringRecognizer {
    pub value: String,
    pub ignore_case: bool,
}

impl StringRecognizer {
    pub fn new<S: Into<String>>(value: S, ignore_case: bool) -> StringRecognizer {
        StringRecognizer {
            value: value.into(),
            ignore_case,
        }
    }

    pub fn recognize<'i>(&self, input: &'i str, pos: usize) -> Option<&'i str> {
        let rest = input.get(pos..)?;
        if !self.ignore_case {
            return if rest.starts_with(self.value.as_str()) {
                Some(&rest[..self.value.len()])
            } else {
                None
            };
        }
        let mut chars = rest.char_indices();
        let mut end = 0;
        for vc in self.value.chars() {
            let (i, c) = chars.next()?;
            if !c.to_lowercase().eq(vc.to_lowercase()) {
                return None;
            }
            end = i + c.len_utf8();
        }
        Some(&rest[..end])
    }
}

/// Matches a regular expression anchored at the current position.
///
/// Assertions such as `\b` and `^` see the character before the position.
/// `at_start` is used at offset 0; `after_char` consumes the preceding
/// character and then matches the expression, so the search stays anchored
/// without slicing the look-behind context away.
#[derive(Clone, Debug)]
pub struct RegexRecognizer {
    pub source: String,
    pub ignore_case: bool,
    pub multi_line: bool,
    at_start: Regex,
    after_char: Regex,
}

impl RegexRecognizer {
    pub fn new(source: &str, multi_line: bool, ignore_case: bool) -> GrammarResult<RegexRecognizer> {
        let build = |wrapped: String| {
            RegexBuilder::new(&wrapped)
                .multi_line(multi_line)
                .case_insensitive(ignore_case)
                .build()
                .map_err(|e| {
                    GrammarError::new(format!(
                        "Regex compile error in /{}/ (report: \"{}\")",
                        esc_control_characters(source),
                        e
                    ))
                })
        };
        Ok(RegexRecognizer {
            source: source.to_string(),
            ignore_case,
            multi_line,
            at_start: build(format!(r"\A(?:{})", source))?,
            after_char: build(format!(r"\A(?s:.)(?:{})", source))?,
        })
    }

    pub fn recognize<'i>(&self, input: &'i str, pos: usize) -> Option<&'i str> {
        if pos == 0 {
            return self.at_start.find(input).map(|m| &input[..m.end()]);
        }
        input.get(pos..)?;
        let prev = pos - input[..pos].chars().next_back()?.len_utf8();
        self.after_char
            .find(&input[prev..])
            .map(|m| &input[pos..prev + m.end()])
    }
}

/// Matches with a user-supplied function returning a match length in bytes.
#[derive(Clone)]
pub struct CustomRecognizer {
    pub name: String,
    func: Arc<dyn Fn(&str, usize) -> Option<usize> + Send + Sync>,
}

impl CustomRecognizer {
    pub fn recognize<'i>(&self, input: &'i str, pos: usize) -> Option<&'i str> {
        let len = (self.func)(input, pos)?;
        input.get(pos..pos.checked_add(len)?)
    }
}
