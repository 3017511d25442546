// Copyright (c) 2016-2021 Fabian Schuiki

//! This crate implements the grammar model and the grammar compiler of
//! pargram.
//!
//! A grammar is given either as text in the pargram grammar language, as a
//! file that may import other grammar files, or as a list of productions. All
//! three are compiled into a `Grammar`, an immutable table of symbols and
//! productions that refer to each other by id:
//!
//! ```
//! use pargram_grammar::{Grammar, GrammarOptions};
//!
//! let grammar = Grammar::from_string(
//!     "E: E '+' T | T; T: /\\d+/;",
//!     GrammarOptions::new(),
//! ).unwrap();
//! assert_eq!(grammar.display_production(1), "1: E = E + T");
//! ```

#[macro_use]
extern crate log;

mod actions;
mod builder;
pub mod earley;
pub mod grammar;
pub mod imports;
pub mod metagrammar;
pub mod options;
pub mod production;
pub mod recognizer;
pub mod repetition;
pub mod schema;
pub mod symbol;

pub use crate::actions::{ImportDecl, ParsedGrammar};
pub use crate::grammar::{create_productions, Grammar, StructProduction, StructSymbol};
pub use crate::imports::{ImportRegistry, PgFile, PgFileImport};
pub use crate::options::GrammarOptions;
pub use crate::production::{
    AssignOp, Assignment, Assoc, Epsilon, Multiplicity, ProdId, Production, ProductionRhs,
    RawProduction,
};
pub use crate::recognizer::Recognizer;
pub use crate::schema::{PgAttribute, PgClass, PgObject};
pub use crate::symbol::{
    Action, BuiltinAction, GrammarSymbol, RawSymbol, Reference, SymbolId, SymbolKind,
};
pub use pargram_common::{GrammarError, GrammarResult, Location};
