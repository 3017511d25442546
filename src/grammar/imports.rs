// Copyright (c) 2016-2021 Fabian Schuiki

//! Grammar files and the imports between them.
//!
//! A grammar file may import other files with `import "path" [as name];` and
//! refer to their rules as `name.Rule`. Imported files are parsed lazily on
//! first use and cached by canonical path in a registry shared by the whole
//! compilation, such that every file is parsed at most once.
//!
//! Before construction the imports are flattened: every referenced rule of an
//! imported file is copied into the production list under its qualified name
//! (`name.Rule`, `name.other.Rule`, ...), together with everything it refers
//! to in its own file.

use crate::metagrammar;
use crate::options::GrammarOptions;
use crate::production::RawProduction;
use crate::schema::PgClass;
use crate::symbol::{RawSymbol, Reference, RESERVED_SYMBOL_NAMES};
use once_cell::sync::OnceCell;
use pargram_common::{GrammarError, GrammarResult};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A parsed grammar file.
#[derive(Debug)]
pub struct PgFile {
    /// The rules defined in the file, followed by the repetition rules.
    pub productions: Vec<RawProduction>,
    /// The imported files, by module name.
    pub imports: BTreeMap<String, PgFileImport>,
    /// The canonical path of the file.
    pub file_path: PathBuf,
    /// The schemas of the rules with named matches.
    pub classes: BTreeMap<String, PgClass>,
    rules: HashSet<String>,
}

impl PgFile {
    /// Read and parse a grammar file. Imports are not loaded.
    fn parse(path: &Path, registry: &Arc<ImportRegistry>) -> GrammarResult<PgFile> {
        debug!("Parsing grammar file {}", path.display());
        let input = std::fs::read_to_string(path).map_err(|e| {
            GrammarError::new(format!(
                "Cannot read grammar file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let parsed = metagrammar::parse_grammar(&input, Some(path), &registry.options)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        let mut imports = BTreeMap::new();
        for decl in parsed.imports {
            let import_path = canonicalize(&base.join(&decl.path))
                .map_err(|e| e.at(decl.location.clone()))?;
            let name = match decl.alias {
                Some(alias) => alias,
                None => import_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            };
            if imports.contains_key(&name) {
                return Err(GrammarError::new(format!(
                    "Multiple imports under the name '{}'.",
                    name
                ))
                .at(decl.location));
            }
            trace!("Import {} as {}", import_path.display(), name);
            imports.insert(
                name,
                PgFileImport {
                    file_path: import_path,
                    registry: registry.clone(),
                    file: OnceCell::new(),
                },
            );
        }

        let rules = parsed
            .productions
            .iter()
            .map(|p| p.symbol.name())
            .collect();
        Ok(PgFile {
            productions: parsed.productions,
            imports,
            file_path: path.to_path_buf(),
            classes: parsed.classes,
            rules,
        })
    }

    /// Check whether the file defines a rule of the given name.
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.contains(name)
    }
}

/// An import of a grammar file, loaded on first access.
pub struct PgFileImport {
    pub file_path: PathBuf,
    registry: Arc<ImportRegistry>,
    file: OnceCell<Arc<PgFile>>,
}

impl PgFileImport {
    /// The imported file. Parses the file on first access.
    pub fn get(&self) -> GrammarResult<&Arc<PgFile>> {
        self.file
            .get_or_try_init(|| ImportRegistry::load(&self.registry, &self.file_path))
    }

    pub fn is_loaded(&self) -> bool {
        self.file.get().is_some()
    }
}

impl std::fmt::Debug for PgFileImport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "PgFileImport({})", self.file_path.display())
    }
}

/// The grammar files of one compilation, by canonical path.
pub struct ImportRegistry {
    files: Mutex<HashMap<PathBuf, Arc<OnceCell<Arc<PgFile>>>>>,
    options: GrammarOptions,
}

impl ImportRegistry {
    pub fn new(options: GrammarOptions) -> ImportRegistry {
        ImportRegistry {
            files: Mutex::new(HashMap::new()),
            options,
        }
    }

    /// Load a grammar file, or return the cached file if it has been loaded
    /// before.
    pub fn load(registry: &Arc<ImportRegistry>, path: &Path) -> GrammarResult<Arc<PgFile>> {
        let path = canonicalize(path)?;
        let cell = registry
            .files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(path.clone())
            .or_default()
            .clone();
        cell.get_or_try_init(|| PgFile::parse(&path, registry).map(Arc::new))
            .map(Arc::clone)
    }

    /// The number of files known to the registry.
    pub fn len(&self) -> usize {
        self.files.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn canonicalize(path: &Path) -> GrammarResult<PathBuf> {
    path.canonicalize().map_err(|e| {
        GrammarError::new(format!(
            "Cannot find grammar file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// The productions of a root file together with the imported rules it uses.
#[derive(Debug, Default)]
pub struct Flattened {
    pub productions: Vec<RawProduction>,
    /// The prefix of the file each production is declared in. Empty for the
    /// root file.
    pub prefixes: Vec<String>,
    pub classes: BTreeMap<String, PgClass>,
}

/// Collect the productions of a root file and all rules it uses from
/// imported files, with references rewritten to qualified names.
///
/// Each file gets the prefix under which it is first reached. A file that is
/// reached again through another path reuses that prefix, so every imported
/// rule exists exactly once.
pub fn flatten(root: &Arc<PgFile>) -> GrammarResult<Flattened> {
    let mut flattener = Flattener {
        prefixes: HashMap::new(),
        included: HashSet::new(),
        todo: VecDeque::new(),
    };
    flattener.prefixes.insert(root.file_path.clone(), String::new());

    let mut flat = Flattened {
        classes: root.classes.clone(),
        ..Flattened::default()
    };
    for prod in &root.productions {
        flat.productions.push(flattener.rewrite(root, "", prod.clone())?);
        flat.prefixes.push(String::new());
    }

    while let Some((file, rule)) = flattener.todo.pop_front() {
        let prefix = flattener.prefixes[&file.file_path].clone();
        let qualified = format!("{}{}", prefix, rule);
        trace!("Including {} as {}", rule, qualified);
        for prod in file.productions.iter().filter(|p| p.symbol.name() == rule) {
            flat.productions.push(flattener.rewrite(&file, &prefix, prod.clone())?);
            flat.prefixes.push(prefix.clone());
        }
        if let Some(class) = file.classes.get(&rule) {
            let mut class = class.clone();
            class.name = qualified.clone();
            flat.classes.insert(qualified, class);
        }
    }
    Ok(flat)
}

struct Flattener {
    /// The prefix of every file reached so far.
    prefixes: HashMap<PathBuf, String>,
    /// The imported rules already queued, by file and local name.
    included: HashSet<(PathBuf, String)>,
    todo: VecDeque<(Arc<PgFile>, String)>,
}

impl Flattener {
    fn rewrite(
        &mut self,
        file: &Arc<PgFile>,
        prefix: &str,
        mut prod: RawProduction,
    ) -> GrammarResult<RawProduction> {
        if let RawSymbol::Symbol(ref mut sym) = prod.symbol {
            sym.name = format!("{}{}", prefix, sym.name);
        }
        prod.try_map(|sym| self.qualify(file, prefix, sym))
    }

    /// Rewrite a reference made in `file` to the qualified name of its target.
    fn qualify(&mut self, file: &Arc<PgFile>, prefix: &str, sym: RawSymbol) -> GrammarResult<RawSymbol> {
        let reference = match sym {
            RawSymbol::Reference(r) => r,
            // The left-hand side has already been renamed, inline terminals
            // keep their name.
            sym => return Ok(sym),
        };
        match reference.module_name {
            None => {
                if RESERVED_SYMBOL_NAMES.contains(&reference.name.as_str()) {
                    return Ok(RawSymbol::Reference(reference));
                }
                self.include(file, &reference.name);
                Ok(RawSymbol::reference(&format!("{}{}", prefix, reference.name)))
            }
            Some(ref module) => {
                let import = file.imports.get(module).ok_or_else(|| {
                    GrammarError::new(format!(
                        "Unknown module '{}' in reference '{}' in grammar file '{}'.",
                        module,
                        reference,
                        file.file_path.display()
                    ))
                })?;
                let target = import.get()?.clone();
                let target_prefix = self
                    .prefixes
                    .entry(target.file_path.clone())
                    .or_insert_with(|| format!("{}{}.", prefix, module))
                    .clone();
                let inner = Reference::parse(&reference.name);
                if inner.module_name.is_none() && !target.has_rule(&inner.name) {
                    return Err(GrammarError::new(format!(
                        "Unknown rule '{}' in grammar file '{}'.",
                        inner.name,
                        target.file_path.display()
                    )));
                }
                self.qualify(&target, &target_prefix, RawSymbol::Reference(inner))
            }
        }
    }

    /// Queue a rule of an imported file for inclusion.
    fn include(&mut self, file: &Arc<PgFile>, rule: &str) {
        if self.prefixes.get(&file.file_path).map_or(false, String::is_empty) {
            return;
        }
        if !file.has_rule(rule) {
            return;
        }
        if self.included.insert((file.file_path.clone(), rule.to_string())) {
            self.todo.push_back((file.clone(), rule.to_string()));
        }
    }
}
