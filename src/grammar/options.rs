// Copyright (c) 2016-2021 Fabian Schuiki

//! Options that control grammar construction.

use crate::recognizer::Recognizer;
use crate::symbol::Action;
use std::collections::HashMap;

/// The options of a single grammar compilation.
#[derive(Clone, Debug)]
pub struct GrammarOptions {
    /// The name of the start symbol. Defaults to the first rule.
    pub start_symbol: Option<String>,
    /// Recognizers that replace the ones given in the grammar, by terminal
    /// name.
    pub recognizers: HashMap<String, Recognizer>,
    /// Actions that replace the ones given in the grammar, by symbol name.
    pub actions: HashMap<String, Action>,
    /// Match string and regex terminals case-insensitively.
    pub ignore_case: bool,
    /// Compile regex terminals in multi-line mode.
    pub multi_line: bool,
    /// Accept terminals without a recognizer. Used by tools that supply the
    /// recognizers later.
    pub no_check_recognizers: bool,
    /// Dump the compiled grammar to the debug log.
    pub debug: bool,
}

impl Default for GrammarOptions {
    fn default() -> GrammarOptions {
        GrammarOptions {
            start_symbol: None,
            recognizers: HashMap::new(),
            actions: HashMap::new(),
            ignore_case: false,
            multi_line: true,
            no_check_recognizers: false,
            debug: false,
        }
    }
}

impl GrammarOptions {
    pub fn new() -> GrammarOptions {
        Default::default()
    }

    pub fn start_symbol<S: Into<String>>(mut self, name: S) -> Self {
        self.start_symbol = Some(name.into());
        self
    }

    pub fn recognizer<S: Into<String>>(mut self, name: S, recognizer: Recognizer) -> Self {
        self.recognizers.insert(name.into(), recognizer);
        self
    }

    pub fn action<S: Into<String>>(mut self, name: S, action: Action) -> Self {
        self.actions.insert(name.into(), action);
        self
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn multi_line(mut self, multi_line: bool) -> Self {
        self.multi_line = multi_line;
        self
    }

    pub fn no_check_recognizers(mut self, no_check: bool) -> Self {
        self.no_check_recognizers = no_check;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
