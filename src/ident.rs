//! SQL identifier generation for imported tables.
//!
//! Table names are derived from the source file name: the directory and the
//! last extension are stripped, every character outside `[a-zA-Z0-9_]` is
//! replaced by `_`, and names that do not start with an ASCII letter get a
//! `t_` prefix. The result is then made unique through an [`IdentRegistry`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Prefix for table names whose sanitized base does not start with a letter
const TABLE_PREFIX: &str = "t_";

/// Registry of identifiers handed out so far, with the next suffix to use
/// for each base identifier.
///
/// A registry lives as long as the importer that owns it. Names are never
/// released, so importing `foo.parquet` three times yields `foo`, `foo_1`
/// and `foo_2`.
#[derive(Debug, Default)]
pub struct IdentRegistry {
    suffixes: Mutex<HashMap<String, u32>>,
}

impl IdentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suffix the next collision on `candidate` would receive, if the
    /// candidate has been registered.
    pub fn lookup(&self, candidate: &str) -> Option<u32> {
        self.lock().get(candidate).copied()
    }

    /// Reserve a unique identifier for `candidate`.
    ///
    /// The first reservation returns the candidate unchanged; later ones
    /// return `candidate_N` with N counting up from 1.
    pub fn uniquify(&self, candidate: &str) -> String {
        let mut suffixes = self.lock();
        match suffixes.get_mut(candidate) {
            None => {
                suffixes.insert(candidate.to_string(), 1);
                candidate.to_string()
            }
            Some(next) => {
                let ident = format!("{candidate}_{next}");
                *next += 1;
                ident
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, u32>> {
        // The map is always left consistent, so a poisoned lock is still usable.
        self.suffixes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Replace every character outside `[a-zA-Z0-9_]` with `_`, one for one.
pub fn map_ident(src: &str) -> String {
    src.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name of `path` without its directory and last extension.
///
/// Paths without a file name (such as `/`) give an empty base name.
pub fn table_base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Generate a unique SQL table name for the file at `path`.
pub fn gen_table_name(path: &Path, registry: &IdentRegistry) -> String {
    let mut base_ident = map_ident(&table_base_name(path));
    if !base_ident
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
    {
        base_ident.insert_str(0, TABLE_PREFIX);
    }
    registry.uniquify(&base_ident)
}
