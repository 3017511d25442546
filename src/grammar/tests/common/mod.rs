// Copyright (c) 2016-2021 Fabian Schuiki
#![allow(dead_code)]

//! Utilities for grammar tests.

pub use pargram_grammar::*;
use std::path::PathBuf;

/// Compile a grammar text, panicking with the error if it fails.
pub fn compile(input: &str) -> Grammar {
    compile_with(input, GrammarOptions::new())
}

pub fn compile_with(input: &str, options: GrammarOptions) -> Grammar {
    match Grammar::from_string(input, options) {
        Ok(g) => g,
        Err(e) => panic!("grammar failed to compile:\n{}", e),
    }
}

/// Compile a grammar text that is expected to fail.
pub fn compile_err(input: &str) -> GrammarError {
    compile_err_with(input, GrammarOptions::new())
}

pub fn compile_err_with(input: &str, options: GrammarOptions) -> GrammarError {
    match Grammar::from_string(input, options) {
        Ok(g) => panic!("grammar compiled unexpectedly:\n{:#?}", g.productions()),
        Err(e) => e,
    }
}

/// The path of a grammar file in `tests/grammars`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("grammars")
        .join(name)
}

/// All productions of a grammar, rendered with symbol names.
pub fn productions(grammar: &Grammar) -> Vec<String> {
    (0..grammar.productions().len())
        .map(|id| grammar.display_production(id))
        .collect()
}

/// The location of an error as `(line, column)`.
pub fn line_col(err: &GrammarError) -> (usize, usize) {
    let loc = err.location.as_ref().expect("error has no location");
    (loc.line, loc.column)
}
