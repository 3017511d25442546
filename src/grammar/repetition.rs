// Copyright (c) 2016-2021 Fabian Schuiki

//! Desugaring of the repetition operators `*`, `+` and `?`.
//!
//! Every repeated symbol is replaced by an auxiliary nonterminal whose name is
//! derived from the symbol, the operator and the separator:
//!
//! ```text
//! item+       item_1       item_1: item_1 item | item;
//! item+[sep]  item_1_sep   item_1_sep: item_1_sep sep item | item;
//! item*       item_0       item_0: item_1 | EMPTY;
//! item*[sep]  item_0_sep   item_0_sep: item_1_sep | EMPTY;
//! item?       item_opt     item_opt: item | EMPTY;
//! ```
//!
//! Auxiliary symbols are created once per compilation and reused.

use crate::production::{Multiplicity, RawProduction};
use crate::symbol::{BuiltinAction, GrammarSymbol, RawSymbol};
use pargram_common::{GrammarError, GrammarResult};
use std::collections::HashMap;

/// A repetition operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RepetitionOp {
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
    /// `?`
    Optional,
}

impl RepetitionOp {
    pub fn from_op(op: &str) -> Option<RepetitionOp> {
        match op {
            "*" => Some(RepetitionOp::ZeroOrMore),
            "+" => Some(RepetitionOp::OneOrMore),
            "?" => Some(RepetitionOp::Optional),
            _ => None,
        }
    }

    /// The multiplicity of a named match using this operator.
    pub fn multiplicity(self) -> Multiplicity {
        match self {
            RepetitionOp::ZeroOrMore => Multiplicity::ZeroOrMore,
            RepetitionOp::OneOrMore => Multiplicity::OneOrMore,
            RepetitionOp::Optional => Multiplicity::Optional,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            RepetitionOp::ZeroOrMore => "_0",
            RepetitionOp::OneOrMore => "_1",
            RepetitionOp::Optional => "_opt",
        }
    }
}

/// The auxiliary productions created during one compilation, in creation
/// order.
#[derive(Debug, Default)]
pub struct RepetitionCache {
    entries: Vec<(String, Vec<RawProduction>)>,
    index: HashMap<String, usize>,
}

impl RepetitionCache {
    pub fn new() -> RepetitionCache {
        Default::default()
    }

    /// Replace `base` repeated with `op` by an auxiliary nonterminal.
    ///
    /// Returns a reference to the auxiliary symbol. Its productions are
    /// recorded in the cache the first time the symbol is requested.
    pub fn expand(
        &mut self,
        base: &RawSymbol,
        op: RepetitionOp,
        sep: Option<&RawSymbol>,
    ) -> GrammarResult<RawSymbol> {
        let mut name = format!("{}{}", base.name(), op.suffix());
        if let Some(sep) = sep {
            name.push('_');
            name.push_str(&sep.name());
        }
        if self.index.contains_key(&name) {
            return Ok(RawSymbol::reference(&name));
        }

        let aux = |action: &str| {
            RawSymbol::Symbol(GrammarSymbol::nonterminal(&name).with_action_name(action))
        };
        let prods = match op {
            RepetitionOp::OneOrMore => {
                let lhs = aux(if sep.is_some() { "collect_sep" } else { "collect" });
                let mut first = vec![lhs.clone()];
                first.extend(sep.cloned());
                first.push(base.clone());
                vec![
                    RawProduction::new(lhs.clone(), first),
                    RawProduction::new(lhs, vec![base.clone()]),
                ]
            }
            RepetitionOp::ZeroOrMore => {
                let one = self.expand(base, RepetitionOp::OneOrMore, sep)?;
                let mut sym = GrammarSymbol::nonterminal(&name);
                sym.grammar_action = Some(BuiltinAction::ZeroOrMore);
                sym.action = Some(crate::symbol::Action::Builtin(BuiltinAction::ZeroOrMore));
                let lhs = RawSymbol::Symbol(sym);
                let mut many = RawProduction::new(lhs.clone(), vec![one]);
                many.nops = true;
                vec![
                    many,
                    RawProduction::new(lhs, vec![RawSymbol::reference("EMPTY")]),
                ]
            }
            RepetitionOp::Optional => {
                if sep.is_some() {
                    return Err(GrammarError::new(format!(
                        "Repetition modifier not allowed for optional (?) for symbol \"{}\".",
                        base.name()
                    )));
                }
                let lhs = aux("optional");
                vec![
                    RawProduction::new(lhs.clone(), vec![base.clone()]),
                    RawProduction::new(lhs, vec![RawSymbol::reference("EMPTY")]),
                ]
            }
        };
        trace!("Created repetition {} ({} productions)", name, prods.len());
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name.clone(), prods));
        Ok(RawSymbol::reference(&name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The names of the auxiliary symbols in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Consume the cache, yielding all auxiliary productions in creation
    /// order.
    pub fn into_productions(self) -> Vec<RawProduction> {
        self.entries.into_iter().flat_map(|(_, p)| p).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(prods: &[RawProduction]) -> Vec<String> {
        prods.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn one_or_more_is_memoized() {
        let mut cache = RepetitionCache::new();
        let x = RawSymbol::reference("X");
        let a = cache.expand(&x, RepetitionOp::OneOrMore, None).unwrap();
        let b = cache.expand(&x, RepetitionOp::OneOrMore, None).unwrap();
        assert_eq!(a.name(), "X_1");
        assert_eq!(b.name(), "X_1");
        assert_eq!(cache.len(), 1);
        assert_eq!(names(&cache.into_productions()), ["X_1 = X_1 X", "X_1 = X"]);
    }

    #[test]
    fn zero_or_more_builds_on_one_or_more() {
        let mut cache = RepetitionCache::new();
        let x = RawSymbol::reference("X");
        let sym = cache.expand(&x, RepetitionOp::ZeroOrMore, None).unwrap();
        assert_eq!(sym.name(), "X_0");
        assert_eq!(cache.names().collect::<Vec<_>>(), ["X_1", "X_0"]);
        let prods = cache.into_productions();
        assert_eq!(
            names(&prods),
            ["X_1 = X_1 X", "X_1 = X", "X_0 = X_1", "X_0 = EMPTY"]
        );
        assert!(prods[2].nops);
        assert!(prods[3].rhs.is_empty());
        let lhs = prods[2].symbol.as_symbol().unwrap();
        assert_eq!(lhs.grammar_action, Some(BuiltinAction::ZeroOrMore));
        assert!(lhs.action_name.is_none());
    }

    #[test]
    fn separator_in_name() {
        let mut cache = RepetitionCache::new();
        let x = RawSymbol::reference("Item");
        let comma = RawSymbol::Symbol(GrammarSymbol::literal(",", false));
        let sym = cache
            .expand(&x, RepetitionOp::ZeroOrMore, Some(&comma))
            .unwrap();
        assert_eq!(sym.name(), "Item_0_,");
        let prods = cache.into_productions();
        assert_eq!(prods[0].to_string(), "Item_1_, = Item_1_, , Item");
        assert_eq!(
            prods[0].symbol.as_symbol().unwrap().action_name.as_deref(),
            Some("collect_sep")
        );
    }

    #[test]
    fn optional() {
        let mut cache = RepetitionCache::new();
        let x = RawSymbol::reference("X");
        assert_eq!(
            cache.expand(&x, RepetitionOp::Optional, None).unwrap().name(),
            "X_opt"
        );
        let sep = RawSymbol::reference("comma");
        let err = cache
            .expand(&x, RepetitionOp::Optional, Some(&sep))
            .unwrap_err();
        assert_eq!(
            err.message,
            "Repetition modifier not allowed for optional (?) for symbol \"X\"."
        );
        assert_eq!(cache.len(), 1);
    }
}
