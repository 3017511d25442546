// Copyright (c) 2016-2021 Fabian Schuiki

//! Grammar symbols and the actions attached to them.

use crate::production::ProdId;
use crate::recognizer::Recognizer;
use once_cell::sync::Lazy;
use pargram_common::util::escape;
use std::{any::Any, fmt, sync::Arc};

/// The priority of terminals and productions unless given in the grammar.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Names that may not be used for grammar rules.
pub const RESERVED_SYMBOL_NAMES: [&str; 3] = ["EOF", "STOP", "EMPTY"];

/// Rule names with a special meaning to the engine.
pub const SPECIAL_SYMBOL_NAMES: [&str; 2] = ["KEYWORD", "LAYOUT"];

/// The name of the augmented start symbol.
pub const AUGMENTED_NAME: &str = "S'";

/// The index of a symbol within a compiled grammar.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SymbolId(pub(crate) usize);

impl SymbolId {
    pub const EMPTY: SymbolId = SymbolId(0);
    pub const EOF: SymbolId = SymbolId(1);
    pub const STOP: SymbolId = SymbolId(2);
    pub const AUGMENTED: SymbolId = SymbolId(3);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A grammar symbol. Identity is the name.
#[derive(Clone, Debug)]
pub struct GrammarSymbol {
    pub name: String,
    /// The name of the action given in the grammar, e.g. `collect`.
    pub action_name: Option<String>,
    /// The built-in action the grammar's action name resolved to.
    pub grammar_action: Option<BuiltinAction>,
    /// The effective action. A user override if one was supplied, the
    /// grammar action otherwise.
    pub action: Option<Action>,
    pub kind: SymbolKind,
}

#[derive(Clone, Debug)]
pub enum SymbolKind {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

/// The terminal-specific part of a symbol.
#[derive(Clone, Debug)]
pub struct Terminal {
    pub recognizer: Option<Recognizer>,
    /// Priority used for lexical disambiguation.
    pub priority: i32,
    /// Stop trying other recognizers once this one matches. `None` leaves
    /// the decision to the table builder.
    pub finish: Option<bool>,
    /// Prefer this terminal if several match at the same place.
    pub prefer: bool,
    /// Resolve conflicts involving this terminal with dynamic disambiguation.
    pub dynamic: bool,
    /// Set by keyword normalization.
    pub keyword: bool,
}

/// The nonterminal-specific part of a symbol.
#[derive(Clone, Debug, Default)]
pub struct NonTerminal {
    pub productions: Vec<ProdId>,
}

impl Terminal {
    pub fn new(recognizer: Option<Recognizer>) -> Terminal {
        Terminal {
            recognizer,
            priority: DEFAULT_PRIORITY,
            finish: None,
            prefer: false,
            dynamic: false,
            keyword: false,
        }
    }
}

impl GrammarSymbol {
    fn with_kind(name: &str, kind: SymbolKind) -> GrammarSymbol {
        GrammarSymbol {
            name: escape(name),
            action_name: None,
            grammar_action: None,
            action: None,
            kind,
        }
    }

    /// Create a terminal.
    pub fn terminal(name: &str, recognizer: Option<Recognizer>) -> GrammarSymbol {
        GrammarSymbol::with_kind(name, SymbolKind::Terminal(Terminal::new(recognizer)))
    }

    /// Create a terminal named after the literal it matches.
    pub fn literal(value: &str, ignore_case: bool) -> GrammarSymbol {
        GrammarSymbol::terminal(value, Some(Recognizer::literal(value, ignore_case)))
    }

    /// Create a nonterminal without productions.
    pub fn nonterminal(name: &str) -> GrammarSymbol {
        GrammarSymbol::with_kind(name, SymbolKind::NonTerminal(NonTerminal::default()))
    }

    pub fn with_action_name<S: Into<String>>(self, name: S) -> GrammarSymbol {
        GrammarSymbol {
            action_name: Some(name.into()),
            ..self
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self.kind {
            SymbolKind::Terminal(..) => true,
            _ => false,
        }
    }

    pub fn is_nonterminal(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self.kind {
            SymbolKind::Terminal(ref t) => Some(t),
            _ => None,
        }
    }

    pub fn as_terminal_mut(&mut self) -> Option<&mut Terminal> {
        match self.kind {
            SymbolKind::Terminal(ref mut t) => Some(t),
            _ => None,
        }
    }

    pub fn as_nonterminal(&self) -> Option<&NonTerminal> {
        match self.kind {
            SymbolKind::NonTerminal(ref n) => Some(n),
            _ => None,
        }
    }

    /// The recognizer of a terminal, if it has one.
    pub fn recognizer(&self) -> Option<&Recognizer> {
        self.as_terminal().and_then(|t| t.recognizer.as_ref())
    }

    /// The productions of a nonterminal. Empty for terminals.
    pub fn productions(&self) -> &[ProdId] {
        self.as_nonterminal().map_or(&[][..], |n| &n.productions[..])
    }
}

impl PartialEq for GrammarSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for GrammarSymbol {}

impl std::hash::Hash for GrammarSymbol {
    fn hash<H: std::hash::Hasher>(&self, hasher: &mut H) {
        self.name.hash(hasher)
    }
}

impl fmt::Display for GrammarSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The special symbols shared by every grammar, in id order.
///
/// These are immutable. A grammar stores its own copies at the fixed ids
/// `SymbolId::EMPTY` to `SymbolId::AUGMENTED`.
pub static SPECIAL_SYMBOLS: Lazy<[GrammarSymbol; 4]> = Lazy::new(|| {
    let mut empty = GrammarSymbol::terminal("EMPTY", Some(Recognizer::Empty));
    empty.grammar_action = Some(BuiltinAction::PassNone);
    empty.action = Some(Action::Builtin(BuiltinAction::PassNone));
    let mut eof = GrammarSymbol::terminal("EOF", Some(Recognizer::Eof));
    eof.grammar_action = Some(BuiltinAction::PassNone);
    eof.action = Some(Action::Builtin(BuiltinAction::PassNone));
    let stop = GrammarSymbol::terminal("STOP", Some(Recognizer::Stop));
    let aug = GrammarSymbol::nonterminal(AUGMENTED_NAME);
    [empty, eof, stop, aug]
});

/// A deferred reference to a symbol by name, optionally qualified by the
/// name of an imported grammar file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Reference {
    pub name: String,
    pub module_name: Option<String>,
}

impl Reference {
    pub fn new<S: Into<String>>(name: S) -> Reference {
        Reference {
            name: name.into(),
            module_name: None,
        }
    }

    /// Parse a possibly dotted name. The first component is the module.
    pub fn parse(dotted: &str) -> Reference {
        match dotted.find('.') {
            Some(i) => Reference {
                name: dotted[i + 1..].to_string(),
                module_name: Some(dotted[..i].to_string()),
            },
            None => Reference::new(dotted),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.module_name {
            Some(ref m) => write!(f, "{}.{}", m, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A symbol in a production that has not been resolved yet.
#[derive(Clone, Debug)]
pub enum RawSymbol {
    Reference(Reference),
    Symbol(GrammarSymbol),
}

impl RawSymbol {
    pub fn reference(name: &str) -> RawSymbol {
        RawSymbol::Reference(Reference::new(name))
    }

    /// The name under which the symbol is resolved.
    pub fn name(&self) -> String {
        match *self {
            RawSymbol::Reference(ref r) => r.to_string(),
            RawSymbol::Symbol(ref s) => s.name.clone(),
        }
    }

    pub fn as_symbol(&self) -> Option<&GrammarSymbol> {
        match *self {
            RawSymbol::Symbol(ref s) => Some(s),
            _ => None,
        }
    }
}

impl From<GrammarSymbol> for RawSymbol {
    fn from(s: GrammarSymbol) -> RawSymbol {
        RawSymbol::Symbol(s)
    }
}

impl From<Reference> for RawSymbol {
    fn from(r: Reference) -> RawSymbol {
        RawSymbol::Reference(r)
    }
}

impl fmt::Display for RawSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RawSymbol::Reference(ref r) => write!(f, "{}", r),
            RawSymbol::Symbol(ref s) => write!(f, "{}", s),
        }
    }
}

/// The built-in semantic actions a grammar may name.
///
/// Only the handles live here; the functions themselves belong to the
/// parser runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinAction {
    PassNone,
    PassNochange,
    PassEmpty,
    PassSingle,
    PassInner,
    Collect,
    CollectSep,
    CollectOptional,
    CollectSepOptional,
    CollectRight,
    CollectRightSep,
    CollectRightOptional,
    CollectRightSepOptional,
    Optional,
    Obj,
    /// Empty sequence for the `EMPTY` alternative of `X_0`, the `X_1`
    /// result otherwise.
    ZeroOrMore,
}

impl BuiltinAction {
    pub fn from_name(name: &str) -> Option<BuiltinAction> {
        use self::BuiltinAction::*;
        Some(match name {
            "pass_none" => PassNone,
            "pass_nochange" => PassNochange,
            "pass_empty" => PassEmpty,
            "pass_single" => PassSingle,
            "pass_inner" => PassInner,
            "collect" => Collect,
            "collect_sep" => CollectSep,
            "collect_optional" => CollectOptional,
            "collect_sep_optional" => CollectSepOptional,
            "collect_right" => CollectRight,
            "collect_right_sep" => CollectRightSep,
            "collect_right_optional" => CollectRightOptional,
            "collect_right_sep_optional" => CollectRightSepOptional,
            "optional" => Optional,
            "obj" => Obj,
            "zero_or_more" => ZeroOrMore,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        use self::BuiltinAction::*;
        match self {
            PassNone => "pass_none",
            PassNochange => "pass_nochange",
            PassEmpty => "pass_empty",
            PassSingle => "pass_single",
            PassInner => "pass_inner",
            Collect => "collect",
            CollectSep => "collect_sep",
            CollectOptional => "collect_optional",
            CollectSepOptional => "collect_sep_optional",
            CollectRight => "collect_right",
            CollectRightSep => "collect_right_sep",
            CollectRightOptional => "collect_right_optional",
            CollectRightSepOptional => "collect_right_sep_optional",
            Optional => "optional",
            Obj => "obj",
            ZeroOrMore => "zero_or_more",
        }
    }
}

impl fmt::Display for BuiltinAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An opaque handle to the semantic action of a symbol.
#[derive(Clone)]
pub enum Action {
    Builtin(BuiltinAction),
    User(Arc<dyn Any + Send + Sync>),
}

impl Action {
    pub fn user<T: Any + Send + Sync>(value: T) -> Action {
        Action::User(Arc::new(value))
    }

    pub fn as_builtin(&self) -> Option<BuiltinAction> {
        match *self {
            Action::Builtin(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Action::Builtin(b) => write!(f, "Builtin({})", b),
            Action::User(..) => write!(f, "User(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_name() {
        let a = GrammarSymbol::terminal("a", None);
        let b = GrammarSymbol::literal("a", true);
        assert_eq!(a, b);
        assert_ne!(a, GrammarSymbol::nonterminal("b"));
    }

    #[test]
    fn names_are_escaped() {
        assert_eq!(GrammarSymbol::literal("\n", false).name, r"\n");
    }

    #[test]
    fn qualified_reference() {
        let r = Reference::parse("base.expr.Term");
        assert_eq!(r.module_name.as_deref(), Some("base"));
        assert_eq!(r.name, "expr.Term");
        assert_eq!(r.to_string(), "base.expr.Term");
        assert_eq!(Reference::parse("Term").module_name, None);
    }

    #[test]
    fn special_symbols_in_id_order() {
        let names: Vec<_> = SPECIAL_SYMBOLS.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["EMPTY", "EOF", "STOP", "S'"]);
        assert_eq!(SPECIAL_SYMBOLS[SymbolId::EOF.index()].name, "EOF");
    }

    #[test]
    fn builtin_names_round_trip() {
        for name in &["collect", "collect_sep", "optional", "obj", "pass_single"] {
            assert_eq!(BuiltinAction::from_name(name).unwrap().name(), *name);
        }
        assert!(BuiltinAction::from_name("my_action").is_none());
    }
}
