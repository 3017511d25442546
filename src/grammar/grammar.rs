// Copyright (c) 2016-2021 Fabian Schuiki

//! The compiled grammar.

use crate::builder;
use crate::imports::{self, ImportRegistry, PgFile};
use crate::metagrammar;
use crate::options::GrammarOptions;
use crate::production::{Assoc, ProdId, Production, RawProduction};
use crate::recognizer::Recognizer;
use crate::schema::PgClass;
use crate::symbol::{GrammarSymbol, RawSymbol, SymbolId};
use itertools::Itertools;
use pargram_common::{GrammarError, GrammarResult};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// A fully resolved grammar.
///
/// Symbols and productions are stored in tables and refer to each other by
/// id. Id 0 to 3 are `EMPTY`, `EOF`, `STOP` and the augmented start symbol
/// `S'`. Production 0 is always `S' = <start> STOP`.
#[derive(Clone, Debug)]
pub struct Grammar {
    pub(crate) symbols: Vec<GrammarSymbol>,
    pub(crate) productions: Vec<Production>,
    pub(crate) symbols_by_name: HashMap<String, SymbolId>,
    pub(crate) start_symbol: SymbolId,
    pub(crate) file: Option<Arc<PgFile>>,
    pub(crate) classes: BTreeMap<String, PgClass>,
}

impl Grammar {
    /// Compile a grammar given as text.
    pub fn from_string(input: &str, options: GrammarOptions) -> GrammarResult<Grammar> {
        let parsed = metagrammar::parse_grammar(input, None, &options)?;
        if let Some(import) = parsed.imports.first() {
            return Err(
                GrammarError::new("Imports can be used only in file grammars.")
                    .at(import.location.clone()),
            );
        }
        builder::build(parsed.productions, &[], None, parsed.classes, &options)
    }

    /// Compile a grammar file and the files it imports.
    pub fn from_file<P: AsRef<Path>>(path: P, options: GrammarOptions) -> GrammarResult<Grammar> {
        let registry = Arc::new(ImportRegistry::new(options.clone()));
        let root = ImportRegistry::load(&registry, path.as_ref())?;
        let flat = imports::flatten(&root)?;
        debug!(
            "Loaded {} with {} grammar files",
            root.file_path.display(),
            registry.len()
        );
        builder::build(flat.productions, &flat.prefixes, Some(root), flat.classes, &options)
    }

    /// Compile a grammar from raw productions.
    pub fn from_struct(
        productions: Vec<RawProduction>,
        options: GrammarOptions,
    ) -> GrammarResult<Grammar> {
        builder::build(productions, &[], None, BTreeMap::new(), &options)
    }

    /// The symbol with the given id.
    pub fn symbol(&self, id: SymbolId) -> &GrammarSymbol {
        &self.symbols[id.0]
    }

    /// The production with the given id.
    pub fn production(&self, id: ProdId) -> &Production {
        &self.productions[id]
    }

    /// All productions, ordered by id.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn start_symbol(&self) -> SymbolId {
        self.start_symbol
    }

    pub fn symbols_by_name(&self) -> &HashMap<String, SymbolId> {
        &self.symbols_by_name
    }

    /// The id of the symbol with the given name.
    pub fn symbol_id(&self, name: &str) -> Option<SymbolId> {
        self.symbols_by_name.get(name).cloned()
    }

    /// All terminals, ordered by id.
    pub fn terminals(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.ids().filter(move |&id| self.symbol(id).is_terminal())
    }

    /// All nonterminals, ordered by id.
    pub fn nonterminals(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.ids().filter(move |&id| self.symbol(id).is_nonterminal())
    }

    /// All symbols a user can refer to: nonterminals first, then terminals,
    /// without `S'` and `STOP`.
    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.nonterminals()
            .chain(self.terminals())
            .filter(|&id| id != SymbolId::AUGMENTED && id != SymbolId::STOP)
    }

    fn ids(&self) -> impl Iterator<Item = SymbolId> {
        (0..self.symbols.len()).map(SymbolId)
    }

    pub fn get_terminal(&self, name: &str) -> Option<&GrammarSymbol> {
        self.get_symbol(name).filter(|s| s.is_terminal())
    }

    pub fn get_nonterminal(&self, name: &str) -> Option<&GrammarSymbol> {
        self.get_symbol(name).filter(|s| s.is_nonterminal())
    }

    pub fn get_symbol(&self, name: &str) -> Option<&GrammarSymbol> {
        self.symbol_id(name).map(|id| self.symbol(id))
    }

    /// The id of the first production of the named symbol.
    pub fn get_production_id(&self, name: &str) -> Option<ProdId> {
        let id = self.symbol_id(name)?;
        self.productions
            .iter()
            .find(|p| p.symbol == id)
            .map(|p| p.prod_id)
    }

    /// The rule schemas synthesized from named matches, by rule name.
    pub fn classes(&self) -> &BTreeMap<String, PgClass> {
        &self.classes
    }

    /// The root grammar file, if the grammar was loaded from a file.
    pub fn file(&self) -> Option<&Arc<PgFile>> {
        self.file.as_ref()
    }

    /// Render a production with symbol names.
    pub fn display_production(&self, id: ProdId) -> String {
        let prod = &self.productions[id];
        format!(
            "{}: {} = {}",
            prod.prod_id,
            self.symbol(prod.symbol),
            prod.rhs.raw().iter().map(|&s| self.symbol(s)).format(" ")
        )
    }

    /// Dump the grammar to the debug log.
    pub fn dump(&self) {
        debug!("Grammar:");
        debug!(
            "  Terminals: {}",
            self.terminals().map(|id| self.symbol(id)).format(" ")
        );
        debug!(
            "  NonTerminals: {}",
            self.nonterminals().map(|id| self.symbol(id)).format(" ")
        );
        debug!("  Productions:");
        for id in 0..self.productions.len() {
            debug!("    {}", self.display_production(id));
        }
    }
}

/// A symbol in a structural production.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StructSymbol<'a> {
    /// A rule, or one of `EMPTY` and `EOF`.
    Ref(&'a str),
    /// A terminal from the table of named patterns.
    Term(&'a str),
    /// A literal string.
    Lit(&'a str),
}

/// A production given as data: `lhs: rhs {assoc, priority}`.
#[derive(Copy, Clone, Debug)]
pub struct StructProduction<'a> {
    pub lhs: &'a str,
    pub rhs: &'a [StructSymbol<'a>],
    pub assoc: Assoc,
    pub priority: i32,
}

/// Create raw productions from structural ones. `terminals` maps the names
/// of pattern terminals to their regular expression.
pub fn create_productions(
    productions: &[StructProduction],
    terminals: &[(&str, &str)],
) -> GrammarResult<Vec<RawProduction>> {
    let mut patterns = HashMap::new();
    for &(name, regex) in terminals {
        let rec = Recognizer::pattern(regex)?;
        patterns.insert(name, GrammarSymbol::terminal(name, Some(rec)));
    }
    productions
        .iter()
        .map(|p| {
            let rhs = p
                .rhs
                .iter()
                .map(|&sym| match sym {
                    StructSymbol::Ref(name) => Ok(RawSymbol::reference(name)),
                    StructSymbol::Lit(value) => {
                        Ok(RawSymbol::Symbol(GrammarSymbol::literal(value, false)))
                    }
                    StructSymbol::Term(name) => patterns
                        .get(name)
                        .cloned()
                        .map(RawSymbol::Symbol)
                        .ok_or_else(|| {
                            GrammarError::new(format!(
                                "Unknown terminal '{}' in production '{}'.",
                                name, p.lhs
                            ))
                        }),
                })
                .collect::<GrammarResult<Vec<_>>>()?;
            let mut prod =
                RawProduction::new(RawSymbol::Symbol(GrammarSymbol::nonterminal(p.lhs)), rhs);
            prod.assoc = p.assoc;
            prod.priority = p.priority;
            Ok(prod)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{BuiltinAction, DEFAULT_PRIORITY};
    use StructSymbol::*;

    fn prod<'a>(lhs: &'a str, rhs: &'a [StructSymbol<'a>]) -> StructProduction<'a> {
        StructProduction {
            lhs,
            rhs,
            assoc: Assoc::None,
            priority: DEFAULT_PRIORITY,
        }
    }

    fn expr_grammar() -> Grammar {
        let prods = [
            prod("E", &[Ref("E"), Lit("+"), Ref("T")]),
            prod("E", &[Ref("T")]),
            prod("T", &[Term("num")]),
        ];
        let raw = create_productions(&prods, &[("num", r"\d+")]).unwrap();
        Grammar::from_struct(raw, GrammarOptions::new()).unwrap()
    }

    #[test]
    fn augmented_production_first() {
        let g = expr_grammar();
        assert_eq!(g.display_production(0), "0: S' = E STOP");
        assert_eq!(g.start_symbol(), g.symbol_id("E").unwrap());
        assert_eq!(g.display_production(1), "1: E = E + T");
        assert_eq!(g.production(2).prod_symbol_id, 1);
    }

    #[test]
    fn one_symbol_per_name() {
        let g = expr_grammar();
        for (name, &id) in g.symbols_by_name() {
            assert_eq!(&g.symbol(id).name, name);
        }
        let e = g.get_nonterminal("E").unwrap();
        assert_eq!(e.productions(), &[1, 2]);
        assert!(g.get_terminal("num").is_some());
        assert!(g.get_terminal("E").is_none());
        assert_eq!(g.get_production_id("T"), Some(3));
    }

    #[test]
    fn symbols_skip_internal() {
        let g = expr_grammar();
        let names: Vec<_> = g.symbols().map(|id| g.symbol(id).name.as_str()).collect();
        assert!(!names.contains(&"S'"));
        assert!(!names.contains(&"STOP"));
        assert!(names.contains(&"EMPTY"));
        assert!(names.contains(&"EOF"));
        assert_eq!(names[0], "E");
    }

    #[test]
    fn special_symbols_are_local_copies() {
        let raw = create_productions(&[prod("S", &[Lit("a")])], &[]).unwrap();
        let opts = GrammarOptions::new().action("EMPTY", crate::symbol::Action::Builtin(BuiltinAction::PassEmpty));
        let g = Grammar::from_struct(raw, opts).unwrap();
        assert_eq!(
            g.symbol(SymbolId::EMPTY).action.as_ref().and_then(|a| a.as_builtin()),
            Some(BuiltinAction::PassEmpty)
        );
        assert_eq!(
            crate::symbol::SPECIAL_SYMBOLS[0].action.as_ref().and_then(|a| a.as_builtin()),
            Some(BuiltinAction::PassNone)
        );
    }

    #[test]
    fn unknown_pattern_terminal() {
        let err = create_productions(&[prod("S", &[Term("x")])], &[]).unwrap_err();
        assert_eq!(err.message, "Unknown terminal 'x' in production 'S'.");
    }

    #[test]
    fn unknown_start_symbol() {
        let raw = create_productions(&[prod("S", &[Lit("a")])], &[]).unwrap();
        let err = Grammar::from_struct(raw, GrammarOptions::new().start_symbol("X")).unwrap_err();
        assert_eq!(err.message, "Unknown start symbol 'X'.");
    }

    #[test]
    fn empty_grammar() {
        let err = Grammar::from_struct(vec![], GrammarOptions::new()).unwrap_err();
        assert_eq!(err.message, "Grammar has no productions.");
    }
}
