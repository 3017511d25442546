// Copyright (c) 2016-2021 Fabian Schuiki

//! A small Earley parser used to read grammar files.
//!
//! The parser works on a compiled `Grammar` and scans the input lazily: at
//! every position only the terminals the grammar expects are tried, and the
//! best match is chosen by priority, length, `prefer` and literal-over-regex,
//! in that order. Layout is skipped before every token, either with the
//! grammar's `LAYOUT` rule or, in its absence, by skipping whitespace.
//!
//! Ambiguous derivations are resolved when the tree is extracted: alternatives
//! with higher priority win, then the one declared first.

use crate::grammar::Grammar;
use crate::production::ProdId;
use crate::symbol::{SymbolId, SymbolKind};
use itertools::Itertools;
use pargram_common::source::context_around;
use pargram_common::{GrammarError, GrammarResult, Location};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

/// A parse tree. Positions are byte offsets into the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tree {
    Term {
        symbol: SymbolId,
        start: usize,
        end: usize,
    },
    Node {
        symbol: SymbolId,
        prod: ProdId,
        start: usize,
        end: usize,
        children: Vec<Tree>,
    },
}

impl Tree {
    pub fn symbol(&self) -> SymbolId {
        match *self {
            Tree::Term { symbol, .. } | Tree::Node { symbol, .. } => symbol,
        }
    }

    pub fn start(&self) -> usize {
        match *self {
            Tree::Term { start, .. } | Tree::Node { start, .. } => start,
        }
    }

    pub fn end(&self) -> usize {
        match *self {
            Tree::Term { end, .. } | Tree::Node { end, .. } => end,
        }
    }

    pub fn children(&self) -> &[Tree] {
        match *self {
            Tree::Node { ref children, .. } => children,
            Tree::Term { .. } => &[],
        }
    }

    /// The input text covered by the tree.
    pub fn text<'i>(&self, input: &'i str) -> &'i str {
        &input[self.start()..self.end()]
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        // List rules nest as deep as they are long; unlink the children so
        // they are not dropped recursively.
        let mut pending = match self {
            Tree::Node { children, .. } => std::mem::take(children),
            Tree::Term { .. } => return,
        };
        while let Some(mut tree) = pending.pop() {
            if let Tree::Node {
                ref mut children, ..
            } = tree
            {
                pending.append(children);
            }
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
struct Item {
    prod: ProdId,
    dot: usize,
    origin: usize,
}

/// The Earley sets of one recognition, starting at `origin`.
struct Chart {
    origin: usize,
    sets: Vec<Vec<Item>>,
    seen: Vec<HashSet<Item>>,
    /// Completed symbols by symbol and origin, with end and production.
    completions: HashMap<(SymbolId, usize), Vec<(usize, ProdId)>>,
    /// Scanned tokens by set and terminal, with start and end of the text.
    tokens: HashMap<(usize, SymbolId), (usize, usize)>,
}

impl Chart {
    fn new(origin: usize) -> Chart {
        Chart {
            origin,
            sets: vec![],
            seen: vec![],
            completions: HashMap::new(),
            tokens: HashMap::new(),
        }
    }

    fn add(&mut self, pos: usize, item: Item) {
        let idx = pos - self.origin;
        if idx >= self.sets.len() {
            self.sets.resize_with(idx + 1, Vec::new);
            self.seen.resize_with(idx + 1, HashSet::new);
        }
        if self.seen[idx].insert(item) {
            self.sets[idx].push(item);
        }
    }

    /// The items of the set at `pos`.
    fn set(&self, pos: usize) -> &[Item] {
        self.sets
            .get(pos - self.origin)
            .map_or(&[], |s| s.as_slice())
    }

    /// The position of the last set with items.
    fn furthest(&self) -> usize {
        self.origin + self.sets.iter().rposition(|s| !s.is_empty()).unwrap_or(0)
    }

    fn ends(&self, symbol: SymbolId, origin: usize) -> impl Iterator<Item = (usize, ProdId)> + '_ {
        self.completions
            .get(&(symbol, origin))
            .into_iter()
            .flatten()
            .cloned()
    }
}

/// The end of the layout at each position.
type LayoutCache = HashMap<usize, usize>;

/// An Earley parser for a grammar.
pub struct Parser {
    grammar: Grammar,
    /// The right-hand side of every production without `EMPTY`.
    rhs: Vec<Vec<SymbolId>>,
    nullable: Vec<bool>,
    layout: Option<SymbolId>,
}

impl Parser {
    pub fn new(grammar: Grammar) -> Parser {
        let rhs: Vec<Vec<SymbolId>> = grammar
            .productions()
            .iter()
            .map(|p| p.rhs.iter().cloned().collect())
            .collect();
        let mut nullable = vec![false; grammar.symbols.len()];
        loop {
            let mut changed = false;
            for p in grammar.productions() {
                if !nullable[p.symbol.index()] && rhs[p.prod_id].iter().all(|s| nullable[s.index()])
                {
                    nullable[p.symbol.index()] = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        let layout = grammar.symbol_id("LAYOUT");
        debug!(
            "Created parser for {} productions{}",
            rhs.len(),
            if layout.is_some() { " with layout" } else { "" }
        );
        Parser {
            grammar,
            rhs,
            nullable,
            layout,
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Parse the entire input and return the tree of the start symbol.
    pub fn parse(&self, input: &str) -> GrammarResult<Tree> {
        let mut cache = LayoutCache::new();
        let chart = self.recognize(input, 0, SymbolId::AUGMENTED, Some(&mut cache));
        let len = input.len();
        if !chart
            .ends(SymbolId::AUGMENTED, 0)
            .any(|(end, _)| end == len)
        {
            return Err(self.syntax_error(input, &chart, &mut cache));
        }
        let mut builder = TreeBuilder::new(self, &chart);
        match builder.build(SymbolId::AUGMENTED, 0, len) {
            Some(Tree::Node {
                ref mut children, ..
            }) if !children.is_empty() => Ok(children.swap_remove(0)),
            _ => Err(GrammarError::bug("accepted input has no derivation")),
        }
    }

    fn recognize(
        &self,
        input: &str,
        origin: usize,
        root: SymbolId,
        mut cache: Option<&mut LayoutCache>,
    ) -> Chart {
        let len = input.len();
        let mut chart = Chart::new(origin);
        for &prod in self.grammar.symbol(root).productions() {
            chart.add(origin, Item { prod, dot: 0, origin });
        }
        let mut furthest = origin;

        for i in origin..=len {
            if i > furthest {
                break;
            }
            let mut expected = vec![];
            let mut k = 0;
            while k < chart.set(i).len() {
                let item = chart.set(i)[k];
                k += 1;
                let next = match self.rhs[item.prod].get(item.dot) {
                    Some(&next) => next,
                    None => {
                        self.complete(&mut chart, i, item);
                        continue;
                    }
                };
                let advanced = Item {
                    dot: item.dot + 1,
                    ..item
                };
                match self.grammar.symbol(next).kind {
                    SymbolKind::NonTerminal(ref nt) => {
                        for &prod in &nt.productions {
                            chart.add(i, Item { prod, dot: 0, origin: i });
                        }
                        if self.nullable[next.index()] {
                            chart.add(i, advanced);
                        }
                    }
                    SymbolKind::Terminal(..) if next == SymbolId::EOF || next == SymbolId::STOP => {
                        let j = self.skip_layout(input, i, &mut cache);
                        if j == len {
                            chart.tokens.insert((i, next), (j, j));
                            chart.add(j, advanced);
                            furthest = furthest.max(j);
                        }
                    }
                    SymbolKind::Terminal(..) => expected.push(next),
                }
            }

            if expected.is_empty() {
                continue;
            }
            expected.sort();
            expected.dedup();
            let j = self.skip_layout(input, i, &mut cache);
            if let Some((term, end)) = self.scan(input, j, &expected) {
                trace!(
                    "Scanned {} at {}..{}",
                    self.grammar.symbol(term),
                    j,
                    end
                );
                chart.tokens.insert((i, term), (j, end));
                let waiting: Vec<Item> = chart
                    .set(i)
                    .iter()
                    .filter(|it| self.rhs[it.prod].get(it.dot) == Some(&term))
                    .cloned()
                    .collect();
                for item in waiting {
                    chart.add(
                        end,
                        Item {
                            dot: item.dot + 1,
                            ..item
                        },
                    );
                }
                furthest = furthest.max(end);
            }
        }
        chart
    }

    fn complete(&self, chart: &mut Chart, pos: usize, item: Item) {
        let lhs = self.grammar.production(item.prod).symbol;
        chart
            .completions
            .entry((lhs, item.origin))
            .or_default()
            .push((pos, item.prod));
        let waiting: Vec<Item> = chart
            .set(item.origin)
            .iter()
            .filter(|it| self.rhs[it.prod].get(it.dot) == Some(&lhs))
            .cloned()
            .collect();
        for w in waiting {
            chart.add(pos, Item { dot: w.dot + 1, ..w });
        }
    }

    /// Pick the best match among the expected terminals. Empty matches are
    /// ignored.
    fn scan(&self, input: &str, pos: usize, expected: &[SymbolId]) -> Option<(SymbolId, usize)> {
        let mut best: Option<((i32, usize, bool, bool), SymbolId)> = None;
        for &id in expected {
            let term = match self.grammar.symbol(id).as_terminal() {
                Some(t) => t,
                None => continue,
            };
            let rec = match term.recognizer {
                Some(ref r) => r,
                None => continue,
            };
            let len = match rec.recognize(input, pos) {
                Some(m) if !m.is_empty() => m.len(),
                _ => continue,
            };
            let key = (term.priority, len, term.prefer, rec.is_literal());
            if best.as_ref().map_or(true, |&(best_key, _)| key > best_key) {
                best = Some((key, id));
            }
        }
        best.map(|((_, len, _, _), id)| (id, pos + len))
    }

    /// Find the end of the layout that starts at `pos`.
    fn skip_layout(&self, input: &str, pos: usize, cache: &mut Option<&mut LayoutCache>) -> usize {
        let cache = match cache {
            Some(c) => c,
            None => return pos,
        };
        if let Some(&end) = cache.get(&pos) {
            return end;
        }
        let end = match self.layout {
            None => input.len() - input[pos..].trim_start().len(),
            Some(layout) => match self.grammar.symbol(layout).kind {
                SymbolKind::Terminal(ref t) => t
                    .recognizer
                    .as_ref()
                    .and_then(|r| r.recognize(input, pos))
                    .map_or(pos, |m| pos + m.len()),
                SymbolKind::NonTerminal(..) => self
                    .recognize(input, pos, layout, None)
                    .ends(layout, pos)
                    .map(|(end, _)| end)
                    .max()
                    .unwrap_or(pos),
            },
        };
        cache.insert(pos, end);
        end
    }

    fn syntax_error(&self, input: &str, chart: &Chart, cache: &mut LayoutCache) -> GrammarError {
        let furthest = chart.furthest();
        let expected: Vec<SymbolId> = chart
            .set(furthest)
            .iter()
            .filter_map(|it| self.rhs[it.prod].get(it.dot).cloned())
            .filter(|&s| self.grammar.symbol(s).is_terminal())
            .sorted()
            .dedup()
            .collect();
        let pos = self.skip_layout(input, furthest, &mut Some(cache));
        let names = expected.iter().map(|&id| {
            let sym = self.grammar.symbol(id);
            match sym.recognizer() {
                Some(rec) if rec.is_literal() => format!("'{}'", sym.name),
                _ => sym.name.clone(),
            }
        });
        GrammarError::new(format!(
            "Unexpected input \"{}\". Expected: {}",
            context_around(input, pos, 10),
            names.format(" or ")
        ))
        .at(Location::from_offset(input, pos))
    }
}

type Key = (SymbolId, usize, usize);

/// A child of a derivation. Nodes refer to the derivation of their span.
#[derive(Copy, Clone, Debug)]
enum Child {
    Term(SymbolId, usize, usize),
    Node(Key),
}

/// The production chosen for a symbol over a span, and its children.
#[derive(Clone, Debug)]
struct Derivation {
    prod: ProdId,
    children: Vec<Child>,
}

/// The derivation of one symbol over one span, under construction.
struct Frame<'a> {
    key: Key,
    /// The productions completed over the span, best first.
    candidates: Vec<ProdId>,
    next: usize,
    matcher: Option<Matcher<'a>>,
    /// Set if the result depended on a derivation that was being built.
    cyclic: bool,
}

/// Matches the right-hand side of one production against a span.
///
/// There is one level per RHS symbol tried so far, holding the children the
/// symbol may still take.
struct Matcher<'a> {
    prod: ProdId,
    rhs: &'a [SymbolId],
    levels: Vec<Level>,
    chosen: Vec<Child>,
    awaiting: Option<Child>,
}

/// The remaining children of one RHS symbol.
enum Level {
    Token(Option<Child>),
    /// The first `remaining` ends of the symbol at `pos`, tried longest first.
    Ends {
        symbol: SymbolId,
        pos: usize,
        remaining: usize,
    },
}

enum Step {
    /// The derivation of the key is needed before matching can go on.
    Call(Key),
    Done(Option<Derivation>),
}

enum Match {
    Matched,
    Failed,
    Call(Key),
}

/// Extracts a single tree from a chart.
///
/// The search runs on an explicit stack of frames, since list rules nest as
/// deep as they are long.
struct TreeBuilder<'a> {
    parser: &'a Parser,
    chart: &'a Chart,
    /// The productions completed over each span.
    spans: HashMap<Key, Vec<ProdId>>,
    /// The sorted ends of each symbol by origin.
    ends: HashMap<(SymbolId, usize), Vec<usize>>,
    /// The derivations currently being built, to break nullable cycles.
    active: HashSet<Key>,
    memo: HashMap<Key, Option<Derivation>>,
}

impl<'a> TreeBuilder<'a> {
    fn new(parser: &'a Parser, chart: &'a Chart) -> TreeBuilder<'a> {
        let mut spans: HashMap<Key, Vec<ProdId>> = HashMap::new();
        let mut ends = HashMap::new();
        for (&(symbol, origin), completed) in &chart.completions {
            for &(end, prod) in completed {
                spans.entry((symbol, origin, end)).or_default().push(prod);
            }
            let sorted: Vec<usize> = completed.iter().map(|&(e, _)| e).sorted().dedup().collect();
            ends.insert((symbol, origin), sorted);
        }
        for candidates in spans.values_mut() {
            candidates.sort_by_key(|&p| (Reverse(parser.grammar.production(p).priority), p));
            candidates.dedup();
        }
        TreeBuilder {
            parser,
            chart,
            spans,
            ends,
            active: HashSet::new(),
            memo: HashMap::new(),
        }
    }

    fn build(&mut self, symbol: SymbolId, start: usize, end: usize) -> Option<Tree> {
        let root = (symbol, start, end);
        let mut stack: Vec<Frame<'a>> = vec![];
        let mut ret = self.enter(root, &mut stack);
        while let Some(frame) = stack.last_mut() {
            match self.step(frame, ret.take()) {
                Step::Call(key) => ret = self.enter(key, &mut stack),
                Step::Done(result) => {
                    let frame = stack.pop()?;
                    self.active.remove(&frame.key);
                    ret = Some(result.is_some());
                    if let Some(parent) = stack.last_mut() {
                        parent.cyclic |= frame.cyclic;
                    }
                    if result.is_some() || !frame.cyclic {
                        self.memo.insert(frame.key, result);
                    }
                }
            }
        }
        self.assemble(root)
    }

    /// Start the derivation of `key`. Returns the outcome right away if it is
    /// known, otherwise pushes a frame for it.
    fn enter(&mut self, key: Key, stack: &mut Vec<Frame<'a>>) -> Option<bool> {
        if let Some(result) = self.memo.get(&key) {
            return Some(result.is_some());
        }
        if !self.active.insert(key) {
            if let Some(caller) = stack.last_mut() {
                caller.cyclic = true;
            }
            return Some(false);
        }
        stack.push(Frame {
            key,
            candidates: self.spans.get(&key).cloned().unwrap_or_default(),
            next: 0,
            matcher: None,
            cyclic: false,
        });
        None
    }

    /// Try the candidate productions of a frame in order.
    fn step(&self, frame: &mut Frame<'a>, mut ret: Option<bool>) -> Step {
        let parser: &'a Parser = self.parser;
        let (_, start, end) = frame.key;
        loop {
            if frame.matcher.is_none() {
                let prod = match frame.candidates.get(frame.next) {
                    Some(&prod) => prod,
                    None => return Step::Done(None),
                };
                frame.next += 1;
                frame.matcher = Some(Matcher {
                    prod,
                    rhs: &parser.rhs[prod],
                    levels: vec![],
                    chosen: vec![],
                    awaiting: None,
                });
            }
            let matcher = match frame.matcher.as_mut() {
                Some(m) => m,
                None => return Step::Done(None),
            };
            match self.advance(matcher, start, end, ret.take()) {
                Match::Matched => {
                    return Step::Done(Some(Derivation {
                        prod: matcher.prod,
                        children: std::mem::take(&mut matcher.chosen),
                    }))
                }
                Match::Call(key) => return Step::Call(key),
                Match::Failed => frame.matcher = None,
            }
        }
    }

    /// Backtracking match of a production's RHS against `start..end`,
    /// preferring longer matches for earlier symbols. `ret` is the outcome of
    /// the derivation the matcher was waiting for.
    fn advance(&self, m: &mut Matcher<'a>, start: usize, end: usize, ret: Option<bool>) -> Match {
        if let Some(child) = m.awaiting.take() {
            if ret == Some(true) {
                m.chosen.push(child);
            }
        }
        loop {
            if m.levels.len() == m.chosen.len() {
                let pos = m.chosen.last().map_or(start, |&c| self.child_end(c));
                match m.rhs.get(m.chosen.len()) {
                    Some(&sym) => m.levels.push(self.alternatives(sym, pos, end)),
                    None if pos == end => return Match::Matched,
                    None => {
                        if m.chosen.pop().is_none() {
                            return Match::Failed;
                        }
                        continue;
                    }
                }
            }
            let next = m.levels.last_mut().and_then(|level| self.next_child(level));
            match next {
                Some(Child::Node(key)) => {
                    m.awaiting = Some(Child::Node(key));
                    return Match::Call(key);
                }
                Some(term) => m.chosen.push(term),
                None => {
                    m.levels.pop();
                    if m.chosen.pop().is_none() {
                        return Match::Failed;
                    }
                }
            }
        }
    }

    /// The children `sym` may take at `pos` without passing `end`.
    fn alternatives(&self, sym: SymbolId, pos: usize, end: usize) -> Level {
        if self.parser.grammar.symbol(sym).is_terminal() {
            return Level::Token(match self.chart.tokens.get(&(pos, sym)) {
                Some(&(start, stop)) if stop <= end => Some(Child::Term(sym, start, stop)),
                _ => None,
            });
        }
        let remaining = self
            .ends
            .get(&(sym, pos))
            .map_or(0, |ends| ends.partition_point(|&e| e <= end));
        Level::Ends {
            symbol: sym,
            pos,
            remaining,
        }
    }

    fn next_child(&self, level: &mut Level) -> Option<Child> {
        match *level {
            Level::Token(ref mut token) => token.take(),
            Level::Ends {
                symbol,
                pos,
                ref mut remaining,
            } => {
                *remaining = remaining.checked_sub(1)?;
                let end = *self.ends.get(&(symbol, pos))?.get(*remaining)?;
                Some(Child::Node((symbol, pos, end)))
            }
        }
    }

    fn child_end(&self, child: Child) -> usize {
        match child {
            Child::Term(_, _, end) | Child::Node((_, _, end)) => end,
        }
    }

    /// Turn the derivation of `root` into a tree.
    fn assemble(&self, root: Key) -> Option<Tree> {
        struct Open<'m> {
            key: Key,
            derivation: &'m Derivation,
            built: Vec<Tree>,
        }
        let mut stack = vec![Open {
            key: root,
            derivation: self.memo.get(&root)?.as_ref()?,
            built: vec![],
        }];
        loop {
            let top = stack.last_mut()?;
            match top.derivation.children.get(top.built.len()) {
                Some(&Child::Term(symbol, start, end)) => {
                    top.built.push(Tree::Term { symbol, start, end })
                }
                Some(&Child::Node(key)) => {
                    let derivation = self.memo.get(&key)?.as_ref()?;
                    stack.push(Open {
                        key,
                        derivation,
                        built: vec![],
                    });
                }
                None => {
                    let done = stack.pop()?;
                    let (symbol, start, _) = done.key;
                    let tree = Tree::Node {
                        symbol,
                        prod: done.derivation.prod,
                        start: done.built.first().map_or(start, Tree::start),
                        end: done.built.last().map_or(start, Tree::end),
                        children: done.built,
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.built.push(tree),
                        None => return Some(tree),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{create_productions, StructProduction, StructSymbol::*};
    use crate::options::GrammarOptions;
    use crate::production::Assoc;

    fn parser(prods: &[StructProduction], terms: &[(&str, &str)]) -> Parser {
        let raw = create_productions(prods, terms).unwrap();
        Parser::new(Grammar::from_struct(raw, GrammarOptions::new()).unwrap())
    }

    fn p<'a>(lhs: &'a str, rhs: &'a [crate::grammar::StructSymbol<'a>], priority: i32) -> StructProduction<'a> {
        StructProduction {
            lhs,
            rhs,
            assoc: Assoc::None,
            priority,
        }
    }

    /// Render a tree as an s-expression of symbol names and token texts.
    fn sexpr(parser: &Parser, input: &str, tree: &Tree) -> String {
        match tree {
            Tree::Term { .. } => tree.text(input).to_string(),
            Tree::Node { symbol, children, .. } => format!(
                "({}{})",
                parser.grammar().symbol(*symbol),
                children
                    .iter()
                    .map(|c| format!(" {}", sexpr(parser, input, c)))
                    .join("")
            ),
        }
    }

    #[test]
    fn left_recursion_with_whitespace() {
        let parser = parser(
            &[
                p("E", &[Ref("E"), Lit("+"), Ref("T")], 10),
                p("E", &[Ref("T")], 10),
                p("T", &[Term("num")], 10),
            ],
            &[("num", r"\d+")],
        );
        let input = " 1 + 22\n+ 3 ";
        let tree = parser.parse(input).unwrap();
        assert_eq!(
            sexpr(&parser, input, &tree),
            "(E (E (E (T 1)) + (T 22)) + (T 3))"
        );
        assert_eq!(tree.start(), 1);
        assert_eq!(tree.end(), 12);
    }

    #[test]
    fn empty_alternative() {
        let parser = parser(
            &[
                p("S", &[Lit("a"), Ref("S")], 10),
                p("S", &[Ref("EMPTY")], 10),
            ],
            &[],
        );
        let tree = parser.parse("a a").unwrap();
        assert_eq!(sexpr(&parser, "a a", &tree), "(S a (S a (S)))");
        let tree = parser.parse("").unwrap();
        assert_eq!(tree.children().len(), 0);
    }

    #[test]
    fn priority_picks_derivation() {
        let parser = parser(
            &[
                p("S", &[Ref("A")], 10),
                p("S", &[Ref("B")], 10),
                p("A", &[Term("word")], 10),
                p("B", &[Term("word")], 10),
            ],
            &[("word", "[a-z]+")],
        );
        assert_eq!(sexpr(&parser, "x", &parser.parse("x").unwrap()), "(S (A x))");

        let parser = self::parser(
            &[
                p("S", &[Ref("A")], 10),
                p("S", &[Ref("B")], 15),
                p("A", &[Term("word")], 10),
                p("B", &[Term("word")], 10),
            ],
            &[("word", "[a-z]+")],
        );
        assert_eq!(sexpr(&parser, "x", &parser.parse("x").unwrap()), "(S (B x))");
    }

    #[test]
    fn literal_beats_pattern_of_same_length() {
        let parser = parser(
            &[
                p("S", &[Ref("Kw"), Ref("S")], 10),
                p("S", &[Ref("Id"), Ref("S")], 10),
                p("S", &[Ref("EMPTY")], 10),
                p("Kw", &[Lit("if")], 10),
                p("Id", &[Term("id")], 10),
            ],
            &[("id", "[a-z]+")],
        );
        let input = "if iffy";
        assert_eq!(
            sexpr(&parser, input, &parser.parse(input).unwrap()),
            "(S (Kw if) (S (Id iffy) (S)))"
        );
    }

    #[test]
    fn layout_rule() {
        let parser = parser(
            &[
                p("S", &[Ref("S"), Term("x")], 10),
                p("S", &[Term("x")], 10),
                p("LAYOUT", &[Ref("LAYOUT"), Ref("Item")], 10),
                p("LAYOUT", &[Ref("EMPTY")], 10),
                p("Item", &[Term("ws")], 10),
                p("Item", &[Lit("#"), Term("line")], 10),
            ],
            &[("x", "x"), ("ws", r"\s+"), ("line", "[^\n]*")],
        );
        let input = "x #comment\n x";
        let tree = parser.parse(input).unwrap();
        assert_eq!(tree.children().len(), 2);
        assert_eq!(tree.children()[1].start(), 12);
    }

    #[test]
    fn syntax_error_location() {
        let parser = parser(
            &[p("S", &[Lit("a"), Lit("b"), Ref("EOF")], 10)],
            &[],
        );
        let err = parser.parse("a\n  c").unwrap_err();
        assert_eq!(err.message, "Unexpected input \"a\\n  *c\". Expected: 'b'");
        let loc = err.location.unwrap();
        assert_eq!((loc.line, loc.column), (2, 3));
    }
}
