// Copyright (c) 2016-2021 Fabian Schuiki

//! Compile a grammar file and dump its symbols and productions.

extern crate clap;
extern crate pargram;
#[macro_use]
extern crate log;

use clap::{App, Arg, ArgMatches};
use pargram::grammar::earley::{Parser, Tree};
use pargram::grammar::SymbolKind;
use pargram::{Grammar, GrammarOptions, GrammarResult};
use std::path::Path;

fn main() {
    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about("A compiler for the pargram grammar language.")
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
        .arg(
            Arg::with_name("start")
                .short("s")
                .long("start")
                .value_name("RULE")
                .help("Use RULE as the start symbol")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("ignore_case")
                .long("ignore-case")
                .help("Match string and regex terminals case-insensitively"),
        )
        .arg(
            Arg::with_name("no_check")
                .long("no-check")
                .help("Allow terminals without a recognizer"),
        )
        .arg(
            Arg::with_name("parse")
                .short("p")
                .long("parse")
                .value_name("FILE")
                .help("Parse FILE with the compiled grammar and print the tree")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("The grammar file to compile")
                .required(true),
        )
        .get_matches();

    // Configure the logger.
    let level = match matches.occurrences_of("verbosity") {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    pretty_env_logger::formatted_builder()
        .filter(None, level)
        .init();

    match run(&matches) {
        Ok(()) => (),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

fn run(matches: &ArgMatches) -> GrammarResult<()> {
    let mut options = GrammarOptions::new()
        .ignore_case(matches.is_present("ignore_case"))
        .no_check_recognizers(matches.is_present("no_check"));
    if let Some(start) = matches.value_of("start") {
        options = options.start_symbol(start);
    }

    let path = Path::new(matches.value_of("INPUT").unwrap_or_default());
    info!("Compiling {}", path.display());
    let grammar = Grammar::from_file(path, options)?;
    grammar.dump();

    match matches.value_of("parse") {
        Some(input) => parse(grammar, Path::new(input)),
        None => {
            print_grammar(&grammar);
            Ok(())
        }
    }
}

fn print_grammar(grammar: &Grammar) {
    println!("Terminals:");
    for id in grammar.terminals() {
        let sym = grammar.symbol(id);
        match sym.recognizer() {
            Some(rec) => println!("  {} {:?}", sym, rec),
            None => println!("  {}", sym),
        }
    }
    println!("Productions:");
    for prod in grammar.productions() {
        println!("  {}", grammar.display_production(prod.prod_id));
    }
}

fn parse(grammar: Grammar, path: &Path) -> GrammarResult<()> {
    let input = std::fs::read_to_string(path).map_err(|e| {
        pargram::GrammarError::new(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let parser = Parser::new(grammar);
    let tree = parser
        .parse(&input)
        .map_err(|e| match e.location.clone() {
            Some(loc) => e.at(loc.with_path(Some(path))),
            None => e,
        })?;
    print_tree(parser.grammar(), &tree, &input, 0);
    Ok(())
}

fn print_tree(grammar: &Grammar, tree: &Tree, input: &str, indent: usize) {
    let sym = grammar.symbol(tree.symbol());
    match sym.kind {
        SymbolKind::Terminal(..) => println!(
            "{:indent$}{} {:?} [{}..{}]",
            "",
            sym,
            tree.text(input),
            tree.start(),
            tree.end(),
            indent = indent
        ),
        _ => {
            println!(
                "{:indent$}{} [{}..{}]",
                "",
                sym,
                tree.start(),
                tree.end(),
                indent = indent
            );
            for child in tree.children() {
                print_tree(grammar, child, input, indent + 2);
            }
        }
    }
}
