// Copyright (c) 2016-2021 Fabian Schuiki

//! A compiler for grammars written in the pargram grammar language.

// Re-export everything from the common crate.
pub extern crate pargram_common as common;
pub use crate::common::*;

pub extern crate pargram_grammar as grammar;
pub use crate::grammar::{Grammar, GrammarOptions};
