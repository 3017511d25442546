// Copyright (c) 2016-2021 Fabian Schuiki

//! Productions, their right-hand sides and named matches.

use crate::symbol::{GrammarSymbol, RawSymbol, SymbolId, DEFAULT_PRIORITY};
use itertools::Itertools;
use std::{collections::BTreeMap, fmt};

/// The global ordinal of a production within a grammar.
pub type ProdId = usize;

/// A production as produced by the grammar parser, before resolution.
pub type RawProduction = Production<RawSymbol>;

/// Associativity used to resolve shift/reduce conflicts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Assoc {
    None,
    Left,
    Right,
}

impl Default for Assoc {
    fn default() -> Assoc {
        Assoc::None
    }
}

/// How many times a matched symbol occurs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    One,
    Optional,
    OneOrMore,
    ZeroOrMore,
}

impl Multiplicity {
    pub fn is_many(self) -> bool {
        match self {
            Multiplicity::OneOrMore | Multiplicity::ZeroOrMore => true,
            _ => false,
        }
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Multiplicity::One => "1",
            Multiplicity::Optional => "0..1",
            Multiplicity::OneOrMore => "1..*",
            Multiplicity::ZeroOrMore => "0..*",
        })
    }
}

/// The operator of a named match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `name=sym`
    Plain,
    /// `name?=sym`, true if the symbol matched.
    Bool,
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            AssignOp::Plain => "=",
            AssignOp::Bool => "?=",
        })
    }
}

/// Symbols that may stand for the empty sequence.
pub trait Epsilon {
    fn is_epsilon(&self) -> bool;
}

impl Epsilon for SymbolId {
    fn is_epsilon(&self) -> bool {
        *self == SymbolId::EMPTY
    }
}

impl Epsilon for GrammarSymbol {
    fn is_epsilon(&self) -> bool {
        self.name == "EMPTY"
    }
}

impl Epsilon for RawSymbol {
    fn is_epsilon(&self) -> bool {
        match *self {
            RawSymbol::Reference(ref r) => r.module_name.is_none() && r.name == "EMPTY",
            RawSymbol::Symbol(ref s) => s.is_epsilon(),
        }
    }
}

/// The right-hand side of a production.
///
/// `EMPTY` markers are kept in the backing sequence but are invisible to
/// `len`, `get` and `iter`. Use `raw` to see them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductionRhs<S> {
    syms: Vec<S>,
}

impl<S: Epsilon> ProductionRhs<S> {
    pub fn new(syms: Vec<S>) -> Self {
        ProductionRhs { syms }
    }

    /// The number of symbols other than `EMPTY`.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `idx`-th symbol other than `EMPTY`.
    pub fn get(&self, idx: usize) -> Option<&S> {
        self.iter().nth(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &S> + '_ {
        self.syms.iter().filter(|s| !s.is_epsilon())
    }

    pub fn first(&self) -> Option<&S> {
        self.get(0)
    }

    /// The backing sequence, including `EMPTY` markers.
    pub fn raw(&self) -> &[S] {
        &self.syms
    }

    pub fn into_raw(self) -> Vec<S> {
        self.syms
    }
}

impl<S: Epsilon> Default for ProductionRhs<S> {
    fn default() -> Self {
        ProductionRhs::new(vec![])
    }
}

impl<S: Epsilon> From<Vec<S>> for ProductionRhs<S> {
    fn from(syms: Vec<S>) -> Self {
        ProductionRhs::new(syms)
    }
}

impl<S: fmt::Display> fmt::Display for ProductionRhs<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.syms.iter().format(" "))
    }
}

/// A named match (`name=sym`, `name?=sym`) or a bare reference in a
/// production.
#[derive(Clone, Debug)]
pub struct Assignment<S> {
    pub name: Option<String>,
    pub op: Option<AssignOp>,
    /// The symbol in the production, after repetition desugaring.
    pub symbol: S,
    /// The symbol as written, without the repetition operator.
    pub orig_symbol: S,
    pub multiplicity: Multiplicity,
    /// The position in the production's right-hand side.
    pub index: Option<usize>,
}

impl<S> Assignment<S> {
    fn try_map<T, E, F>(self, f: &mut F) -> Result<Assignment<T>, E>
    where
        F: FnMut(S) -> Result<T, E>,
    {
        Ok(Assignment {
            name: self.name,
            op: self.op,
            symbol: f(self.symbol)?,
            orig_symbol: f(self.orig_symbol)?,
            multiplicity: self.multiplicity,
            index: self.index,
        })
    }
}

/// A single alternative of a rule.
///
/// Generic over the symbol representation: raw productions refer to symbols
/// by name, resolved productions by id.
#[derive(Clone, Debug)]
pub struct Production<S = SymbolId> {
    pub symbol: S,
    pub rhs: ProductionRhs<S>,
    /// Named matches, keyed by name.
    pub assignments: BTreeMap<String, Assignment<S>>,
    pub assoc: Assoc,
    pub priority: i32,
    pub dynamic: bool,
    /// Disable the prefer-shifts strategy for this production.
    pub nops: bool,
    /// Disable the prefer-shifts-over-empty strategy for this production.
    pub nopse: bool,
    /// The ordinal of the production in the grammar.
    pub prod_id: ProdId,
    /// The ordinal of the production among the alternatives of its symbol.
    pub prod_symbol_id: usize,
}

impl<S: Epsilon> Production<S> {
    pub fn new(symbol: S, rhs: Vec<S>) -> Self {
        Production {
            symbol,
            rhs: ProductionRhs::new(rhs),
            assignments: BTreeMap::new(),
            assoc: Assoc::None,
            priority: DEFAULT_PRIORITY,
            dynamic: false,
            nops: false,
            nopse: false,
            prod_id: 0,
            prod_symbol_id: 0,
        }
    }

    /// Record the named matches among `assignments`. Unnamed ones only
    /// contribute their symbol to the right-hand side and are dropped.
    pub fn with_assignments<I>(mut self, assignments: I) -> Self
    where
        I: IntoIterator<Item = Assignment<S>>,
    {
        for a in assignments {
            if let Some(name) = a.name.clone() {
                self.assignments.insert(name, a);
            }
        }
        self
    }

    /// Convert every symbol in the production, failing on the first error.
    pub fn try_map<T, E, F>(self, mut f: F) -> Result<Production<T>, E>
    where
        T: Epsilon,
        F: FnMut(S) -> Result<T, E>,
    {
        let symbol = f(self.symbol)?;
        let rhs = self
            .rhs
            .into_raw()
            .into_iter()
            .map(&mut f)
            .collect::<Result<Vec<_>, _>>()?;
        let mut assignments = BTreeMap::new();
        for (name, a) in self.assignments {
            assignments.insert(name, a.try_map(&mut f)?);
        }
        Ok(Production {
            symbol,
            rhs: ProductionRhs::new(rhs),
            assignments,
            assoc: self.assoc,
            priority: self.priority,
            dynamic: self.dynamic,
            nops: self.nops,
            nopse: self.nopse,
            prod_id: self.prod_id,
            prod_symbol_id: self.prod_symbol_id,
        })
    }
}

impl<S: fmt::Display> fmt::Display for Production<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {}", self.symbol, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(names: &[&str]) -> Vec<RawSymbol> {
        names.iter().map(|n| RawSymbol::reference(n)).collect()
    }

    #[test]
    fn rhs_skips_empty() {
        let rhs = ProductionRhs::new(raw(&["EMPTY", "a", "EMPTY", "b"]));
        assert_eq!(rhs.len(), 2);
        assert_eq!(rhs.get(0).map(|s| s.name()), Some("a".to_string()));
        assert_eq!(rhs.get(1).map(|s| s.name()), Some("b".to_string()));
        assert!(rhs.get(2).is_none());
        assert_eq!(rhs.raw().len(), 4);
        assert_eq!(rhs.to_string(), "EMPTY a EMPTY b");
    }

    #[test]
    fn epsilon_only_rhs_is_empty() {
        let rhs = ProductionRhs::new(vec![SymbolId::EMPTY]);
        assert!(rhs.is_empty());
        assert!(rhs.first().is_none());
        assert_eq!(rhs.raw(), &[SymbolId::EMPTY]);
    }

    #[test]
    fn qualified_empty_is_a_symbol() {
        let rhs = ProductionRhs::new(vec![RawSymbol::Reference(
            crate::symbol::Reference::parse("m.EMPTY"),
        )]);
        assert_eq!(rhs.len(), 1);
    }

    #[test]
    fn only_named_assignments_are_kept() {
        let a = |name: Option<&str>, sym: &str| Assignment {
            name: name.map(String::from),
            op: name.map(|_| AssignOp::Plain),
            symbol: RawSymbol::reference(sym),
            orig_symbol: RawSymbol::reference(sym),
            multiplicity: Multiplicity::One,
            index: Some(0),
        };
        let prod = Production::new(RawSymbol::reference("S"), raw(&["a", "b"]))
            .with_assignments(vec![a(Some("x"), "a"), a(None, "b")]);
        assert_eq!(prod.assignments.len(), 1);
        assert!(prod.assignments.contains_key("x"));
        assert_eq!(prod.to_string(), "S = a b");
    }

    #[test]
    fn map_preserves_metadata() {
        let mut prod = Production::new(RawSymbol::reference("S"), raw(&["a"]));
        prod.priority = 5;
        prod.nops = true;
        let mapped: Production<SymbolId> = prod
            .try_map::<_, (), _>(|s| Ok(if s.name() == "S" { SymbolId(4) } else { SymbolId(5) }))
            .unwrap();
        assert_eq!(mapped.symbol, SymbolId(4));
        assert_eq!(mapped.rhs.raw(), &[SymbolId(5)]);
        assert_eq!(mapped.priority, 5);
        assert!(mapped.nops);
    }

    #[test]
    fn multiplicity_display() {
        assert_eq!(Multiplicity::ZeroOrMore.to_string(), "0..*");
        assert!(Multiplicity::OneOrMore.is_many());
        assert!(!Multiplicity::Optional.is_many());
    }
}
