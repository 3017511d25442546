// Copyright (c) 2016-2021 Fabian Schuiki

//! Semantic actions of the grammar-file syntax.
//!
//! The tree produced by the metagrammar parser is walked top-down. Every rule
//! of the metagrammar has a method here, which dispatches on the alternative
//! that matched (`prod_symbol_id`).

use crate::earley::Tree;
use crate::grammar::Grammar;
use crate::options::GrammarOptions;
use crate::production::{AssignOp, Assignment, Assoc, Multiplicity, RawProduction};
use crate::recognizer::{Recognizer, RegexRecognizer};
use crate::repetition::{RepetitionCache, RepetitionOp};
use crate::schema::{PgAttribute, PgClass};
use crate::symbol::{
    GrammarSymbol, RawSymbol, Reference, DEFAULT_PRIORITY, RESERVED_SYMBOL_NAMES,
};
use pargram_common::util::unescape_str;
use pargram_common::{GrammarError, GrammarResult, Location};
use std::collections::BTreeMap;
use std::path::Path;

/// The contents of a grammar text.
#[derive(Debug)]
pub struct ParsedGrammar {
    pub imports: Vec<ImportDecl>,
    /// The rule productions followed by the repetition productions.
    pub productions: Vec<RawProduction>,
    pub classes: BTreeMap<String, PgClass>,
}

/// An `import "path" [as alias];` statement.
#[derive(Clone, Debug)]
pub struct ImportDecl {
    pub path: String,
    pub alias: Option<String>,
    pub location: Location,
}

/// The disambiguation rules of a production.
struct ProductionProps {
    assoc: Assoc,
    priority: i32,
    dynamic: bool,
    nops: bool,
    nopse: bool,
}

/// Evaluate the tree of a grammar text.
pub(crate) fn evaluate(
    grammar: &Grammar,
    tree: &Tree,
    input: &str,
    path: Option<&Path>,
    options: &GrammarOptions,
) -> GrammarResult<ParsedGrammar> {
    let mut cx = Context {
        grammar,
        input,
        path,
        options,
        repetitions: RepetitionCache::new(),
        classes: BTreeMap::new(),
    };
    cx.pg_file(tree)
}

struct Context<'a> {
    grammar: &'a Grammar,
    input: &'a str,
    path: Option<&'a Path>,
    options: &'a GrammarOptions,
    repetitions: RepetitionCache,
    classes: BTreeMap<String, PgClass>,
}

impl<'a> Context<'a> {
    /// The index of the alternative that matched.
    fn alt(&self, tree: &Tree) -> usize {
        match *tree {
            Tree::Node { prod, .. } => self.grammar.production(prod).prod_symbol_id,
            Tree::Term { .. } => 0,
        }
    }

    fn text(&self, tree: &Tree) -> &'a str {
        tree.text(self.input)
    }

    fn location(&self, tree: &Tree) -> Location {
        Location::from_offset(self.input, tree.start()).with_path(self.path)
    }

    /// Flatten a left-recursive list `L: L [sep] X | X;` into its elements.
    fn items<'t>(&self, mut tree: &'t Tree) -> Vec<&'t Tree> {
        let mut items = vec![];
        loop {
            let children = tree.children();
            match children.len() {
                0 => break,
                1 => {
                    items.push(&children[0]);
                    break;
                }
                n => {
                    items.push(&children[n - 1]);
                    tree = &children[0];
                }
            }
        }
        items.reverse();
        items
    }

    fn pg_file(&mut self, tree: &Tree) -> GrammarResult<ParsedGrammar> {
        let children = tree.children();
        let (imports, rules): (Vec<ImportDecl>, &Tree) = match self.alt(tree) {
            0 => (vec![], &children[0]),
            _ => (
                self.items(&children[0])
                    .into_iter()
                    .map(|t| self.import(t))
                    .collect(),
                &children[1],
            ),
        };
        let mut productions = vec![];
        for rule in self.items(rules) {
            productions.extend(self.rule(rule)?);
        }
        let repetitions = std::mem::take(&mut self.repetitions);
        debug!(
            "Read {} rule productions and {} repetition rules",
            productions.len(),
            repetitions.len()
        );
        productions.extend(repetitions.into_productions());
        Ok(ParsedGrammar {
            imports,
            productions,
            classes: std::mem::take(&mut self.classes),
        })
    }

    fn import(&self, tree: &Tree) -> ImportDecl {
        let children = tree.children();
        ImportDecl {
            path: self.string(&children[1]),
            alias: match self.alt(tree) {
                0 => None,
                _ => Some(self.text(&children[3]).to_string()),
            },
            location: self.location(tree),
        }
    }

    /// The contents of a quoted string token.
    fn string(&self, tree: &Tree) -> String {
        let text = self.text(tree);
        unescape_str(&text[1..text.len() - 1])
    }

    fn rule(&mut self, tree: &Tree) -> GrammarResult<Vec<RawProduction>> {
        let children = tree.children();
        let (action, body) = match children.len() {
            1 => (None, &children[0]),
            _ => (Some(&self.text(&children[0])[1..]), &children[1]),
        };
        let mut prods = match self.alt(tree) {
            0 | 1 => self.production_rule(body)?,
            _ => self.terminal_rule(body)?,
        };
        if let Some(action) = action {
            for prod in &mut prods {
                if let RawSymbol::Symbol(ref mut sym) = prod.symbol {
                    sym.action_name = Some(action.to_string());
                }
            }
        }
        Ok(prods)
    }

    fn rule_name(&self, tree: &Tree) -> GrammarResult<&'a str> {
        let name = self.text(tree);
        if RESERVED_SYMBOL_NAMES.contains(&name) {
            return Err(
                GrammarError::new(format!("Rule name \"{}\" is reserved.", name))
                    .at(self.location(tree)),
            );
        }
        Ok(name)
    }

    fn production_rule(&mut self, tree: &Tree) -> GrammarResult<Vec<RawProduction>> {
        let children = tree.children();
        let name = self.rule_name(&children[0])?;
        let mut attrs = vec![];
        let mut prods = vec![];
        for alternative in self.items(&children[2]) {
            let (mut assignments, props) = self.production(alternative)?;
            for (idx, a) in assignments.iter_mut().enumerate() {
                if let Some(ref attr) = a.name {
                    a.index = Some(idx);
                    attrs.push(PgAttribute::new(
                        attr.as_str(),
                        a.multiplicity,
                        a.orig_symbol.name(),
                    ));
                }
            }
            let rhs = assignments.iter().map(|a| a.symbol.clone()).collect();
            let mut prod = RawProduction::new(
                RawSymbol::Symbol(GrammarSymbol::nonterminal(name)),
                rhs,
            )
            .with_assignments(assignments);
            prod.assoc = props.assoc;
            prod.priority = props.priority;
            prod.dynamic = props.dynamic;
            prod.nops = props.nops;
            prod.nopse = props.nopse;
            prods.push(prod);
        }

        if !attrs.is_empty() {
            trace!("Rule {} has {} named matches", name, attrs.len());
            self.classes
                .entry(name.to_string())
                .or_insert_with(|| PgClass::new(name))
                .merge(attrs);
            for prod in &mut prods {
                if let RawSymbol::Symbol(ref mut sym) = prod.symbol {
                    sym.action_name = Some("obj".to_string());
                }
            }
        }
        Ok(prods)
    }

    fn production(
        &mut self,
        tree: &Tree,
    ) -> GrammarResult<(Vec<Assignment<RawSymbol>>, ProductionProps)> {
        let children = tree.children();
        let assignments = self
            .items(&children[0])
            .into_iter()
            .map(|t| self.assignment(t))
            .collect::<GrammarResult<Vec<_>>>()?;
        let mut props = ProductionProps {
            assoc: Assoc::None,
            priority: DEFAULT_PRIORITY,
            dynamic: false,
            nops: false,
            nopse: false,
        };
        if self.alt(tree) == 1 {
            for rule in self.items(&children[2]) {
                match self.alt(rule) {
                    0 | 1 => props.assoc = Assoc::Left,
                    2 | 3 => props.assoc = Assoc::Right,
                    4 => props.dynamic = true,
                    5 => props.nops = true,
                    6 => props.nopse = true,
                    _ => props.priority = self.priority(&rule.children()[0])?,
                }
            }
        }
        Ok((assignments, props))
    }

    fn priority(&self, tree: &Tree) -> GrammarResult<i32> {
        let text = self.text(tree);
        text.parse().map_err(|_| {
            GrammarError::new(format!("Invalid priority {}.", text)).at(self.location(tree))
        })
    }

    fn terminal_rule(&mut self, tree: &Tree) -> GrammarResult<Vec<RawProduction>> {
        let children = tree.children();
        let name = self.rule_name(&children[0])?;
        let (body, props) = match self.alt(tree) {
            0 => (Some(self.recognizer(&children[2])?), None),
            1 => (None, None),
            2 => (Some(self.recognizer(&children[2])?), Some(&children[4])),
            _ => (None, Some(&children[3])),
        };

        let mut sym = GrammarSymbol::terminal(name, body.as_ref().and_then(|b| b.recognizer().cloned()));
        if let (Some(props), Some(term)) = (props, sym.as_terminal_mut()) {
            for rule in self.items(props) {
                match self.alt(rule) {
                    0 => term.prefer = true,
                    1 => term.finish = Some(true),
                    2 => term.finish = Some(false),
                    3 => term.dynamic = true,
                    _ => term.priority = self.priority(&rule.children()[0])?,
                }
            }
        }
        let rhs = body.into_iter().map(RawSymbol::Symbol).collect();
        Ok(vec![RawProduction::new(RawSymbol::Symbol(sym), rhs)])
    }

    fn assignment(&mut self, tree: &Tree) -> GrammarResult<Assignment<RawSymbol>> {
        let inner = &tree.children()[0];
        let (name, op, repeatable) = match self.alt(tree) {
            0 => (Some(self.text(&inner.children()[0])), Some(AssignOp::Plain), &inner.children()[2]),
            1 => (Some(self.text(&inner.children()[0])), Some(AssignOp::Bool), &inner.children()[2]),
            _ => (None, None, inner),
        };
        let (symbol, orig_symbol, multiplicity) = self.repeatable(repeatable)?;
        Ok(Assignment {
            name: name.map(String::from),
            op,
            symbol,
            orig_symbol,
            multiplicity,
            index: None,
        })
    }

    /// A grammar symbol with an optional repetition operator. Returns the
    /// symbol to use in the production, the symbol as written, and the
    /// multiplicity.
    fn repeatable(&mut self, tree: &Tree) -> GrammarResult<(RawSymbol, RawSymbol, Multiplicity)> {
        let children = tree.children();
        let base = self.grammar_symbol(&children[0])?;
        let operator = match children[1].children().first() {
            Some(op) => op,
            None => return Ok((base.clone(), base, Multiplicity::One)),
        };
        let op_token = &operator.children()[0];
        let op = RepetitionOp::from_op(self.text(op_token)).ok_or_else(|| {
            GrammarError::bug(format!("unknown repetition operator {}", self.text(op_token)))
        })?;

        let modifiers = match operator.children()[1].children().get(1) {
            Some(list) => self
                .items(list)
                .into_iter()
                .map(|m| self.grammar_symbol(&m.children()[0]))
                .collect::<GrammarResult<Vec<_>>>()?,
            None => vec![],
        };
        if modifiers.len() > 1 {
            return Err(GrammarError::new(format!(
                "Only one repetition modifier (the separator) is supported for symbol \"{}\".",
                base.name()
            ))
            .at(self.location(op_token)));
        }

        let symbol = self
            .repetitions
            .expand(&base, op, modifiers.first())
            .map_err(|e| e.or_at(self.location(op_token)))?;
        Ok((symbol, base, op.multiplicity()))
    }

    fn grammar_symbol(&self, tree: &Tree) -> GrammarResult<RawSymbol> {
        let inner = &tree.children()[0];
        Ok(match self.alt(tree) {
            0 => RawSymbol::reference(self.text(inner)),
            1 => RawSymbol::Symbol(self.recognizer(inner)?),
            _ => RawSymbol::Reference(Reference::parse(self.text(inner))),
        })
    }

    /// An inline string or regex terminal.
    fn recognizer(&self, tree: &Tree) -> GrammarResult<GrammarSymbol> {
        let token = &tree.children()[0];
        if self.alt(tree) == 0 {
            return Ok(GrammarSymbol::literal(
                &self.string(token),
                self.options.ignore_case,
            ));
        }
        let text = self.text(token);
        let body = &text[1..text.len() - 1];
        let regex = RegexRecognizer::new(
            &body.replace(r"\/", "/"),
            self.options.multi_line,
            self.options.ignore_case,
        )
        .map_err(|e| e.at(self.location(token)))?;
        Ok(GrammarSymbol::terminal(body, Some(Recognizer::Pattern(regex))))
    }
}
