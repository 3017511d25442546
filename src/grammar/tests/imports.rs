// Copyright (c) 2016-2021 Fabian Schuiki

mod common;
use common::*;
use std::sync::Arc;

#[test]
fn diamond_imports_share_one_file() {
    let registry = Arc::new(ImportRegistry::new(GrammarOptions::new()));
    let root = ImportRegistry::load(&registry, &fixture("root.pg")).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(!root.imports["a"].is_loaded());

    let a = root.imports["a"].get().unwrap();
    let b = root.imports["bee"].get().unwrap();
    let via_a = a.imports["common"].get().unwrap();
    let via_b = b.imports["c"].get().unwrap();
    assert!(Arc::ptr_eq(via_a, via_b));
    assert_eq!(registry.len(), 4);

    let again = ImportRegistry::load(&registry, &fixture("root.pg")).unwrap();
    assert!(Arc::ptr_eq(&root, &again));
    assert_eq!(registry.len(), 4);
}

#[test]
fn qualified_rules() {
    let g = Grammar::from_file(fixture("root.pg"), GrammarOptions::new()).unwrap();
    assert_eq!(g.display_production(1), "1: Root = a.Thing bee.Other");
    assert!(g.get_nonterminal("a.Thing").is_some());
    assert!(g.get_nonterminal("bee.Other").is_some());
    assert!(g.get_nonterminal("a.common.Number").is_some());
    assert!(g.get_terminal("a.common.Digits").is_some());
    assert!(g.get_symbol("bee.c.Number").is_none());
    assert!(g.get_symbol("a.common.Unused").is_none());
    assert_eq!(
        g.get_nonterminal("bee.Other").unwrap().productions().len(),
        2
    );
}

#[test]
fn imported_schemas_are_qualified() {
    let g = Grammar::from_file(fixture("root.pg"), GrammarOptions::new()).unwrap();
    let pair = &g.classes()["a.common.Pair"];
    assert_eq!(pair.name, "a.common.Pair");
    assert_eq!(pair.attr("left").unwrap().type_name, "Digits");
    assert_eq!(
        g.get_nonterminal("a.common.Pair").unwrap().grammar_action,
        Some(BuiltinAction::Obj)
    );
}

#[test]
fn root_file_is_kept() {
    let g = Grammar::from_file(fixture("root.pg"), GrammarOptions::new()).unwrap();
    let file = g.file().unwrap();
    assert!(file.file_path.ends_with("root.pg"));
    assert!(file.has_rule("Root"));
    assert_eq!(file.imports.len(), 2);
}

#[test]
fn cyclic_imports() {
    let g = Grammar::from_file(fixture("cycle_a.pg"), GrammarOptions::new()).unwrap();
    assert_eq!(g.get_nonterminal("A").unwrap().productions().len(), 2);
    assert_eq!(g.get_nonterminal("b.B").unwrap().productions().len(), 2);
    assert!(g.get_symbol("b.a.A").is_none());
    assert_eq!(g.display_production(4), "4: b.B = ( A )");
}

#[test]
fn calculator_file() {
    let g = Grammar::from_file(fixture("calc.pg"), GrammarOptions::new()).unwrap();
    assert_eq!(g.display_production(0), "0: S' = Calc STOP");
    assert_eq!(
        g.get_nonterminal("Calc").unwrap().grammar_action,
        Some(BuiltinAction::PassSingle)
    );
    assert!(g.get_nonterminal("Assignments_opt").is_some());
    assert!(g.get_nonterminal("Assignment_1").is_some());
    assert!(g.get_terminal("Number").unwrap().as_terminal().unwrap().prefer);
    assert!(g.classes().contains_key("Assignment"));
}

#[test]
fn unknown_module() {
    let err = Grammar::from_file(fixture("unknown_module.pg"), GrammarOptions::new()).unwrap_err();
    assert!(
        err.message
            .starts_with("Unknown module 'nope' in reference 'nope.X' in grammar file"),
        "{}",
        err.message
    );
}

#[test]
fn unknown_rule() {
    let err = Grammar::from_file(fixture("unknown_rule.pg"), GrammarOptions::new()).unwrap_err();
    assert!(
        err.message.starts_with("Unknown rule 'Missing' in grammar file"),
        "{}",
        err.message
    );
}

#[test]
fn missing_import() {
    let err = Grammar::from_file(fixture("missing_import.pg"), GrammarOptions::new()).unwrap_err();
    assert!(err.message.starts_with("Cannot find grammar file"), "{}", err.message);
    assert_eq!(line_col(&err), (1, 1));
}

#[test]
fn missing_root_file() {
    let err = Grammar::from_file(fixture("nothing_here.pg"), GrammarOptions::new()).unwrap_err();
    assert!(err.message.starts_with("Cannot find grammar file"), "{}", err.message);
}

#[test]
fn duplicate_alias() {
    let err = Grammar::from_file(fixture("duplicate_alias.pg"), GrammarOptions::new()).unwrap_err();
    assert_eq!(err.message, "Multiple imports under the name 'x'.");
    assert_eq!(line_col(&err), (2, 1));
}

#[test]
fn syntax_error_names_the_file() {
    let err = Grammar::from_file(fixture("syntax_error.pg"), GrammarOptions::new()).unwrap_err();
    let loc = err.location.as_ref().unwrap();
    assert!(loc.path.as_ref().unwrap().ends_with("syntax_error.pg"));
    assert_eq!((loc.line, loc.column), (2, 2));
}

#[test]
fn terminal_rules_are_per_file() {
    let g = Grammar::from_file(fixture("separators.pg"), GrammarOptions::new()).unwrap();
    assert_eq!(g.display_production(1), "1: S = lib.L named.List Comma");
    assert_eq!(g.display_production(3), "3: lib.L = lib.L , a");
    assert_eq!(
        g.display_production(5),
        "5: named.List = named.List named.Sep b"
    );
    assert!(g.get_terminal(",").is_some());
    assert!(g.get_terminal("Comma").is_some());
    assert!(g.get_terminal("named.Sep").is_some());
}

#[test]
fn terminal_used_inline_in_its_own_file() {
    let err = Grammar::from_file(fixture("uses_clashing_list.pg"), GrammarOptions::new())
        .unwrap_err();
    assert_eq!(
        err.message,
        "Terminal ',' used in production 'x.L' already exists by the name 'x.Sep'."
    );
}
