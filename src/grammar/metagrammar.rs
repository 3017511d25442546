// Copyright (c) 2016-2021 Fabian Schuiki

//! The syntax of grammar files, described as a grammar.
//!
//! The parser for this grammar is built on first use and shared by all
//! compilations in the process.

use crate::actions::{self, ParsedGrammar};
use crate::earley::Parser;
use crate::grammar::{create_productions, Grammar, StructProduction, StructSymbol::*};
use crate::options::GrammarOptions;
use crate::production::Assoc;
use crate::symbol::DEFAULT_PRIORITY;
use once_cell::sync::OnceCell;
use pargram_common::GrammarResult;
use std::path::Path;

/// The terminals of the grammar-file syntax.
static TERMINALS: &[(&str, &str)] = &[
    ("Name", r"[a-zA-Z0-9_]+"),
    ("QualifiedName", r"[a-zA-Z0-9_]+(\.[a-zA-Z0-9_]+)+"),
    (
        "StrTerm",
        r#"(?s)('[^'\\]*(?:\\.[^'\\]*)*')|("[^"\\]*(?:\\.[^"\\]*)*")"#,
    ),
    ("RegExTerm", r"/((\\/)|[^/])*/"),
    ("Prior", r"\d+"),
    ("Action", r"@[a-zA-Z0-9_]+"),
    ("WS", r"\s+"),
    ("CommentLine", r"//.*"),
    ("NotComment", r"((\*[^/])|[^\s*/]|/[^*])+"),
];

macro_rules! prod {
    ($lhs:expr => [$($rhs:expr),*]) => {
        prod!($lhs => [$($rhs),*], Assoc::None, DEFAULT_PRIORITY)
    };
    ($lhs:expr => [$($rhs:expr),*], $assoc:expr, $priority:expr) => {
        StructProduction {
            lhs: $lhs,
            rhs: &[$($rhs),*],
            assoc: $assoc,
            priority: $priority,
        }
    };
}

/// The productions of the grammar-file syntax. The actions rely on the order
/// of the alternatives of each rule.
#[rustfmt::skip]
static PRODUCTIONS: &[StructProduction<'static>] = &[
    prod!("PGFile" => [Ref("Rules"), Ref("EOF")]),
    prod!("PGFile" => [Ref("Imports"), Ref("Rules"), Ref("EOF")]),
    prod!("Imports" => [Ref("Imports"), Ref("Import")]),
    prod!("Imports" => [Ref("Import")]),
    prod!("Import" => [Lit("import"), Term("StrTerm"), Lit(";")]),
    prod!("Import" => [Lit("import"), Term("StrTerm"), Lit("as"), Term("Name"), Lit(";")]),
    prod!("Rules" => [Ref("Rules"), Ref("Rule")]),
    prod!("Rules" => [Ref("Rule")]),
    prod!("Rule" => [Ref("ProductionRule")]),
    prod!("Rule" => [Term("Action"), Ref("ProductionRule")]),
    prod!("Rule" => [Ref("TerminalRule")], Assoc::None, 15),
    prod!("Rule" => [Term("Action"), Ref("TerminalRule")], Assoc::None, 15),

    prod!("ProductionRule" => [Term("Name"), Lit(":"), Ref("ProductionRuleRHS"), Lit(";")]),
    prod!("ProductionRuleRHS" => [Ref("ProductionRuleRHS"), Lit("|"), Ref("Production")], Assoc::Left, 5),
    prod!("ProductionRuleRHS" => [Ref("Production")], Assoc::Left, 5),
    prod!("Production" => [Ref("Assignments")]),
    prod!("Production" => [Ref("Assignments"), Lit("{"), Ref("ProductionDisambiguationRules"), Lit("}")]),

    prod!("TerminalRule" => [Term("Name"), Lit(":"), Ref("Recognizer"), Lit(";")], Assoc::Left, 15),
    prod!("TerminalRule" => [Term("Name"), Lit(":"), Lit(";")], Assoc::Left, 15),
    prod!("TerminalRule" => [Term("Name"), Lit(":"), Ref("Recognizer"), Lit("{"),
                             Ref("TerminalDisambiguationRules"), Lit("}"), Lit(";")], Assoc::Left, 15),
    prod!("TerminalRule" => [Term("Name"), Lit(":"), Lit("{"),
                             Ref("TerminalDisambiguationRules"), Lit("}"), Lit(";")], Assoc::Left, 15),

    prod!("ProductionDisambiguationRule" => [Lit("left")]),
    prod!("ProductionDisambiguationRule" => [Lit("reduce")]),
    prod!("ProductionDisambiguationRule" => [Lit("right")]),
    prod!("ProductionDisambiguationRule" => [Lit("shift")]),
    prod!("ProductionDisambiguationRule" => [Lit("dynamic")]),
    prod!("ProductionDisambiguationRule" => [Lit("nops")]),
    prod!("ProductionDisambiguationRule" => [Lit("nopse")]),
    prod!("ProductionDisambiguationRule" => [Term("Prior")]),
    prod!("ProductionDisambiguationRules" => [Ref("ProductionDisambiguationRules"), Lit(","),
                                              Ref("ProductionDisambiguationRule")], Assoc::Left, DEFAULT_PRIORITY),
    prod!("ProductionDisambiguationRules" => [Ref("ProductionDisambiguationRule")]),

    prod!("TerminalDisambiguationRule" => [Lit("prefer")]),
    prod!("TerminalDisambiguationRule" => [Lit("finish")]),
    prod!("TerminalDisambiguationRule" => [Lit("nofinish")]),
    prod!("TerminalDisambiguationRule" => [Lit("dynamic")]),
    prod!("TerminalDisambiguationRule" => [Term("Prior")]),
    prod!("TerminalDisambiguationRules" => [Ref("TerminalDisambiguationRules"), Lit(","),
                                            Ref("TerminalDisambiguationRule")]),
    prod!("TerminalDisambiguationRules" => [Ref("TerminalDisambiguationRule")]),

    prod!("Assignment" => [Ref("PlainAssignment")]),
    prod!("Assignment" => [Ref("BoolAssignment")]),
    prod!("Assignment" => [Ref("RepeatableGrammarSymbol")]),
    prod!("Assignments" => [Ref("Assignments"), Ref("Assignment")]),
    prod!("Assignments" => [Ref("Assignment")]),
    prod!("PlainAssignment" => [Term("Name"), Lit("="), Ref("RepeatableGrammarSymbol")]),
    prod!("BoolAssignment" => [Term("Name"), Lit("?="), Ref("RepeatableGrammarSymbol")]),

    prod!("RepeatableGrammarSymbol" => [Ref("GrammarSymbol"), Ref("OptRepeatOperator")]),
    prod!("OptRepeatOperator" => [Ref("RepeatOperatorZero")]),
    prod!("OptRepeatOperator" => [Ref("RepeatOperatorOne")]),
    prod!("OptRepeatOperator" => [Ref("RepeatOperatorOptional")]),
    prod!("OptRepeatOperator" => [Ref("EMPTY")]),
    prod!("RepeatOperatorZero" => [Lit("*"), Ref("OptionalRepeatModifiersExpression")]),
    prod!("RepeatOperatorOne" => [Lit("+"), Ref("OptionalRepeatModifiersExpression")]),
    prod!("RepeatOperatorOptional" => [Lit("?"), Ref("OptionalRepeatModifiersExpression")]),
    prod!("OptionalRepeatModifiersExpression" => [Lit("["), Ref("OptionalRepeatModifiers"), Lit("]")]),
    prod!("OptionalRepeatModifiersExpression" => [Ref("EMPTY")]),
    prod!("OptionalRepeatModifiers" => [Ref("OptionalRepeatModifiers"), Lit(","), Ref("OptionalRepeatModifier")]),
    prod!("OptionalRepeatModifiers" => [Ref("OptionalRepeatModifier")]),
    prod!("OptionalRepeatModifier" => [Ref("GrammarSymbol")]),

    prod!("GrammarSymbol" => [Term("Name")]),
    prod!("GrammarSymbol" => [Ref("Recognizer")]),
    prod!("GrammarSymbol" => [Term("QualifiedName")]),
    prod!("Recognizer" => [Term("StrTerm")]),
    prod!("Recognizer" => [Term("RegExTerm")]),

    // Comments and whitespace.
    prod!("LAYOUT" => [Ref("LAYOUT_ITEM")]),
    prod!("LAYOUT" => [Ref("LAYOUT"), Ref("LAYOUT_ITEM")]),
    prod!("LAYOUT_ITEM" => [Term("WS")]),
    prod!("LAYOUT_ITEM" => [Ref("Comment")]),
    prod!("LAYOUT_ITEM" => [Ref("EMPTY")]),
    prod!("Comment" => [Lit("/*"), Ref("CORNCS"), Lit("*/")]),
    prod!("Comment" => [Term("CommentLine")]),
    prod!("CORNCS" => [Ref("CORNC")]),
    prod!("CORNCS" => [Ref("CORNCS"), Ref("CORNC")]),
    prod!("CORNCS" => [Ref("EMPTY")]),
    prod!("CORNC" => [Ref("Comment")]),
    prod!("CORNC" => [Term("NotComment")]),
    prod!("CORNC" => [Term("WS")]),
];

static PARSER: OnceCell<Parser> = OnceCell::new();

/// The parser for grammar files.
pub fn parser() -> GrammarResult<&'static Parser> {
    PARSER.get_or_try_init(|| {
        debug!("Building the grammar file parser");
        let productions = create_productions(PRODUCTIONS, TERMINALS)?;
        let grammar = Grammar::from_struct(productions, GrammarOptions::new())?;
        Ok(Parser::new(grammar))
    })
}

/// Parse a grammar text. `path` is only used for error locations.
pub fn parse_grammar(
    input: &str,
    path: Option<&Path>,
    options: &GrammarOptions,
) -> GrammarResult<ParsedGrammar> {
    let parser = parser()?;
    let tree = parser.parse(input).map_err(|mut e| {
        e.location = e.location.take().map(|l| l.with_path(path));
        e
    })?;
    actions::evaluate(parser.grammar(), &tree, input, path, options)
}
