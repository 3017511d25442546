// Copyright (c) 2016-2021 Fabian Schuiki

//! The grammar construction engine.
//!
//! Turns a flat list of raw productions into a resolved `Grammar`. Every name
//! is mapped to exactly one symbol, every production is enumerated, and the
//! keyword terminals are rewritten to match on word boundaries. Construction
//! either succeeds as a whole or fails with the first error.

use crate::grammar::Grammar;
use crate::options::GrammarOptions;
use crate::imports::PgFile;
use crate::production::{Production, RawProduction};
use crate::recognizer::{Recognizer, RegexRecognizer};
use crate::schema::PgClass;
use crate::symbol::*;
use pargram_common::{GrammarError, GrammarResult};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// All declarations of one rule name.
struct Decl {
    terminals: usize,
    nonterminals: usize,
    /// The first declaring symbol, which carries the terminal properties.
    first: GrammarSymbol,
    action_names: Vec<String>,
    grammar_action: Option<BuiltinAction>,
}

impl Decl {
    fn is_terminal(&self) -> bool {
        self.terminals == 1 && self.nonterminals == 0
    }
}

/// The state of a single grammar construction.
struct Builder<'a> {
    options: &'a GrammarOptions,
    symbols: Vec<GrammarSymbol>,
    by_name: HashMap<String, SymbolId>,
    /// Recognizer text of terminal rules by file prefix, mapped to the rule
    /// name.
    recognizer_bodies: HashMap<(String, String), String>,
    /// The terminals created for inline strings and regexes.
    inline: HashSet<String>,
}

/// Build a grammar from raw productions. `prefixes` holds the prefix of the
/// file each production is declared in; missing entries are the root file.
pub(crate) fn build(
    productions: Vec<RawProduction>,
    prefixes: &[String],
    file: Option<Arc<PgFile>>,
    classes: BTreeMap<String, PgClass>,
    options: &GrammarOptions,
) -> GrammarResult<Grammar> {
    if productions.is_empty() {
        return Err(GrammarError::new("Grammar has no productions."));
    }
    let mut builder = Builder {
        options,
        symbols: SPECIAL_SYMBOLS.iter().cloned().collect(),
        by_name: HashMap::new(),
        recognizer_bodies: HashMap::new(),
        inline: HashSet::new(),
    };
    for (i, sym) in builder.symbols.iter().enumerate() {
        builder.by_name.insert(sym.name.clone(), SymbolId(i));
    }

    let decls = builder.collect_symbols(&productions)?;
    let start = builder.start_symbol(&productions)?;
    let productions = builder.prune_terminal_productions(productions, prefixes)?;

    // Resolve all symbol references.
    let mut resolved = Vec::with_capacity(productions.len() + 1);
    resolved.push(Production::new(
        SymbolId::AUGMENTED,
        vec![start, SymbolId::STOP],
    ));
    for (idx, prod) in productions {
        let lhs_name = prod.symbol.name();
        let lhs_is_nonterminal = !decls.get(&lhs_name).map_or(false, Decl::is_terminal);
        let prefix = prefix_of(prefixes, idx);
        let prod = prod.try_map(|sym| builder.resolve(sym, &lhs_name, lhs_is_nonterminal, prefix))?;
        resolved.push(prod);
    }

    builder.bind_recognizers()?;
    builder.apply_action_overrides();
    builder.enumerate(&mut resolved);
    builder.fix_keyword_terminals()?;

    let grammar = Grammar {
        symbols: builder.symbols,
        productions: resolved,
        symbols_by_name: builder.by_name,
        start_symbol: start,
        file,
        classes,
    };
    debug!(
        "Built grammar with {} terminals, {} nonterminals, {} productions",
        grammar.terminals().count(),
        grammar.nonterminals().count(),
        grammar.productions().len()
    );
    if options.debug {
        grammar.dump();
    }
    Ok(grammar)
}

fn prefix_of(prefixes: &[String], idx: usize) -> &str {
    prefixes.get(idx).map_or("", String::as_str)
}

impl<'a> Builder<'a> {
    fn add_symbol(&mut self, sym: GrammarSymbol) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        self.by_name.insert(sym.name.clone(), id);
        self.symbols.push(sym);
        id
    }

    /// Group the left-hand sides by name and create one symbol per name.
    fn collect_symbols(
        &mut self,
        productions: &[RawProduction],
    ) -> GrammarResult<HashMap<String, Decl>> {
        let mut order = Vec::new();
        let mut decls: HashMap<String, Decl> = HashMap::new();
        for prod in productions {
            let name = prod.symbol.name();
            let sym = match prod.symbol {
                RawSymbol::Symbol(ref s) => s.clone(),
                RawSymbol::Reference(..) => GrammarSymbol::nonterminal(&name),
            };
            let decl = decls.entry(name.clone()).or_insert_with(|| {
                order.push(name.clone());
                Decl {
                    terminals: 0,
                    nonterminals: 0,
                    first: sym.clone(),
                    action_names: vec![],
                    grammar_action: None,
                }
            });
            if sym.is_terminal() {
                decl.terminals += 1;
            } else {
                decl.nonterminals += 1;
            }
            if let Some(ref action) = sym.action_name {
                if !decl.action_names.contains(action) {
                    decl.action_names.push(action.clone());
                }
            }
            decl.grammar_action = decl.grammar_action.or(sym.grammar_action);
        }

        for name in order {
            let decl = &decls[&name];
            if RESERVED_SYMBOL_NAMES.contains(&name.as_str()) || name == AUGMENTED_NAME {
                return Err(GrammarError::new(format!(
                    "Rule name \"{}\" is reserved.",
                    name
                )));
            }
            if decl.action_names.len() > 1 {
                return Err(GrammarError::new(format!(
                    "Multiple different grammar actions for rule \"{}\".",
                    name
                ))
                .add_note(format!("actions: {}", decl.action_names.join(", "))));
            }
            let mut sym = if decl.is_terminal() {
                decl.first.clone()
            } else {
                GrammarSymbol::nonterminal(&name)
            };
            sym.action_name = decl.action_names.first().cloned();
            sym.grammar_action = match sym.action_name {
                Some(ref action) => BuiltinAction::from_name(action),
                None => decl.grammar_action,
            };
            sym.action = sym.grammar_action.map(Action::Builtin);
            trace!(
                "Declared {} {}",
                if decl.is_terminal() { "terminal" } else { "nonterminal" },
                name
            );
            self.add_symbol(sym);
        }
        Ok(decls)
    }

    /// Drop the terminal declarations if there are proper rules. The bodies
    /// of the dropped declarations are remembered per file to detect inline
    /// uses. The kept productions retain their index.
    fn prune_terminal_productions(
        &mut self,
        productions: Vec<RawProduction>,
        prefixes: &[String],
    ) -> GrammarResult<Vec<(usize, RawProduction)>> {
        let rules: Vec<bool> = productions
            .iter()
            .map(|p| {
                let name = p.symbol.name();
                name == "LAYOUT" || self.lookup(&name).map_or(false, GrammarSymbol::is_nonterminal)
            })
            .collect();
        if !rules.iter().any(|&r| r) {
            return Ok(productions.into_iter().enumerate().collect());
        }
        let mut kept = Vec::with_capacity(productions.len());
        for (idx, (prod, is_rule)) in productions.into_iter().zip(rules).enumerate() {
            if is_rule {
                kept.push((idx, prod));
                continue;
            }
            let name = prod.symbol.name();
            if SPECIAL_SYMBOL_NAMES.contains(&name.as_str()) {
                continue;
            }
            if let Some(body) = prod.rhs.first() {
                let key = (prefix_of(prefixes, idx).to_string(), body.name());
                trace!("Terminal {} declared by {}", name, key.1);
                if let Some(other) = self.recognizer_bodies.get(&key) {
                    return Err(GrammarError::new(format!(
                        "Terminals '{}' and '{}' have the same body {}.",
                        other, name, key.1
                    )));
                }
                self.recognizer_bodies.insert(key, name);
            }
        }
        Ok(kept)
    }

    fn lookup(&self, name: &str) -> Option<&GrammarSymbol> {
        self.by_name.get(name).map(|&id| &self.symbols[id.0])
    }

    fn start_symbol(&self, productions: &[RawProduction]) -> GrammarResult<SymbolId> {
        match self.options.start_symbol {
            Some(ref name) => match self.by_name.get(name) {
                Some(&id) if id.0 > SymbolId::AUGMENTED.0 => Ok(id),
                _ => Err(GrammarError::new(format!(
                    "Unknown start symbol '{}'.",
                    name
                ))),
            },
            None => productions
                .first()
                .and_then(|p| self.by_name.get(&p.symbol.name()).cloned())
                .ok_or_else(|| GrammarError::new("Grammar has no productions.")),
        }
    }

    /// Map a raw symbol to the canonical symbol of the same name. `prefix`
    /// is the file prefix of the production the symbol is used in; inline
    /// uses are only checked against the terminal rules of the same file.
    fn resolve(
        &mut self,
        sym: RawSymbol,
        lhs_name: &str,
        lhs_is_nonterminal: bool,
        prefix: &str,
    ) -> GrammarResult<SymbolId> {
        let name = sym.name();
        let existing = self.by_name.get(&name).cloned();
        if let Some(id) = existing {
            if !self.inline.contains(&name) {
                return Ok(id);
            }
        }
        if lhs_is_nonterminal {
            let key = (prefix.to_string(), name.clone());
            if let Some(term) = self.recognizer_bodies.get(&key) {
                return Err(GrammarError::new(format!(
                    "Terminal '{}' used in production '{}' already exists by the name '{}'.",
                    key.1, lhs_name, term
                )));
            }
        }
        if let Some(id) = existing {
            return Ok(id);
        }
        match sym {
            // Inline terminals unify by name.
            RawSymbol::Symbol(s) if s.is_terminal() => {
                trace!("Inline terminal {}", s.name);
                self.inline.insert(s.name.clone());
                Ok(self.add_symbol(s))
            }
            _ => Err(GrammarError::new(format!(
                "Unknown symbol '{}' used in production '{}'.",
                name, lhs_name
            ))),
        }
    }

    /// Apply the recognizer overrides and check that every terminal can be
    /// recognized.
    fn bind_recognizers(&mut self) -> GrammarResult<()> {
        let overrides = &self.options.recognizers;
        for sym in &mut self.symbols {
            let name = sym.name.clone();
            let term = match sym.as_terminal_mut() {
                Some(t) => t,
                None => continue,
            };
            if let Some(rec) = overrides.get(&name) {
                trace!("Overriding recognizer of {}", name);
                term.recognizer = Some(rec.clone());
            } else if term.recognizer.is_none() && !self.options.no_check_recognizers {
                return Err(if overrides.is_empty() {
                    GrammarError::new(format!(
                        "Terminal \"{}\" has no recognizer defined and no recognizers are \
                         given during grammar construction.",
                        name
                    ))
                } else {
                    GrammarError::new(format!(
                        "Terminal \"{}\" has no recognizer defined.",
                        name
                    ))
                });
            }
        }
        Ok(())
    }

    fn apply_action_overrides(&mut self) {
        for sym in &mut self.symbols {
            if let Some(action) = self.options.actions.get(&sym.name) {
                sym.action = Some(action.clone());
            }
        }
    }

    /// Assign production ids and per-symbol alternative ordinals.
    fn enumerate(&mut self, productions: &mut [Production]) {
        let mut per_symbol: HashMap<SymbolId, usize> = HashMap::new();
        for (idx, prod) in productions.iter_mut().enumerate() {
            let count = per_symbol.entry(prod.symbol).or_insert(0);
            prod.prod_id = idx;
            prod.prod_symbol_id = *count;
            *count += 1;
            if let SymbolKind::NonTerminal(ref mut nt) = self.symbols[prod.symbol.0].kind {
                nt.productions.push(idx);
            }
        }
    }

    /// Make the literal terminals that look like a keyword match on word
    /// boundaries only.
    fn fix_keyword_terminals(&mut self) -> GrammarResult<()> {
        let keyword = match self.lookup("KEYWORD").and_then(GrammarSymbol::as_terminal) {
            Some(t) => match t.recognizer {
                Some(Recognizer::Pattern(ref r)) => r.clone(),
                _ => {
                    return Err(GrammarError::new(
                        "KEYWORD rule must have a regex recognizer defined.",
                    ))
                }
            },
            None => return Ok(()),
        };
        for sym in &mut self.symbols {
            let name = sym.name.clone();
            let term = match sym.as_terminal_mut() {
                Some(t) => t,
                None => continue,
            };
            let (value, ignore_case) = match term.recognizer {
                Some(Recognizer::Literal(ref lit)) => (lit.value.clone(), lit.ignore_case),
                _ => continue,
            };
            if keyword.recognize(&value, 0) != Some(value.as_str()) {
                continue;
            }
            trace!("Terminal {} is a keyword", name);
            let regex = format!(r"\b{}\b", regex::escape(&value));
            term.recognizer = Some(Recognizer::Pattern(RegexRecognizer::new(
                &regex,
                self.options.multi_line,
                ignore_case,
            )?));
            term.keyword = true;
        }
        Ok(())
    }
}
