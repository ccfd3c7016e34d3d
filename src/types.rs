//! Data types shared by the loader, the transform engine and the batch
//! driver.
//!
//! The mapping table is built once per run and only read afterwards.  The
//! two derived views ([`NamespaceMapping`] and [`ClassNameMapping`]) are
//! computed from the entries at load time.
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

use crate::names;

/// One row of the mapping table: where an old class comes from and where
/// its polyfill goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Fully-qualified old class name (e.g. `Old\Foo\Foo`).
    pub source_identity: String,
    /// Fully-qualified new namespace (e.g. `New\Foo`).  Empty for the
    /// global namespace.
    pub target_namespace: String,
    /// New simple class name.  May equal the old one.
    pub target_class: String,
    /// Upstream file, relative to the source root.
    pub source_path: PathBuf,
    /// Generated file, relative to the output root.
    pub target_path: PathBuf,
}

impl MappingEntry {
    /// Namespace part of [`source_identity`](Self::source_identity).
    pub fn source_namespace(&self) -> &str {
        names::namespace_of(&self.source_identity)
    }

    /// Simple class name part of [`source_identity`](Self::source_identity).
    pub fn source_class(&self) -> &str {
        names::short_name(&self.source_identity)
    }

    /// Fully-qualified new class name.
    pub fn target_identity(&self) -> String {
        names::join(&self.target_namespace, &self.target_class)
    }
}

/// Old namespace → new namespace, matched by longest prefix.
#[derive(Debug, Clone, Default)]
pub struct NamespaceMapping {
    pairs: IndexMap<String, String>,
}

impl NamespaceMapping {
    /// Register a pair.  Identity pairs are ignored; when the old
    /// namespace is already mapped the first pair is kept and `false` is
    /// returned.
    pub fn insert(&mut self, old: &str, new: &str) -> bool {
        if old == new {
            return true;
        }
        match self.pairs.get(old) {
            Some(existing) => existing == new,
            None => {
                self.pairs.insert(old.to_string(), new.to_string());
                true
            }
        }
    }

    /// Rewrite `namespace` using the most specific mapped prefix.
    ///
    /// Returns `None` when no prefix applies.  The part of the namespace
    /// below the matched prefix is carried over unchanged.
    pub fn rewrite(&self, namespace: &str) -> Option<String> {
        let mut best: Option<(&str, &str, &str)> = None;
        for (old, new) in &self.pairs {
            let Some(rest) = names::strip_namespace_prefix(namespace, old) else {
                continue;
            };
            if best.is_none_or(|(best_old, _, _)| old.len() > best_old.len()) {
                best = Some((old.as_str(), new.as_str(), rest));
            }
        }
        best.map(|(_, new, rest)| {
            if new.is_empty() {
                rest.trim_start_matches('\\').to_string()
            } else {
                format!("{}{}", new, rest)
            }
        })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Old simple class name → new simple class name, independent of
/// namespace.  Identity pairs are not stored.
#[derive(Debug, Clone, Default)]
pub struct ClassNameMapping {
    names: IndexMap<String, String>,
}

impl ClassNameMapping {
    pub(crate) fn insert(&mut self, old: &str, new: &str) {
        if old != new {
            self.names.insert(old.to_string(), new.to_string());
        }
    }

    pub fn get(&self, old: &str) -> Option<&str> {
        self.names.get(old).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The loaded mapping table plus its derived views.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    /// Entries keyed by `source_identity`, in declared order.
    pub entries: IndexMap<String, MappingEntry>,
    pub namespaces: NamespaceMapping,
    pub class_names: ClassNameMapping,
}

impl MappingTable {
    pub fn get(&self, source_identity: &str) -> Option<&MappingEntry> {
        self.entries.get(names::normalize(source_identity))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.values()
    }
}

/// Config-driven matching parameters for the rename-notice detector.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorSettings {
    /// Simple name of the deprecation facade class.
    pub class: String,
    /// Methods that emit a notice directly.
    pub notice_methods: Vec<String>,
    /// Methods that run a callback with notices suppressed.
    pub wrapper_methods: Vec<String>,
    /// Fixed phrases that mark a notice as being about the rename.
    pub phrases: Vec<String>,
    /// Also match notices that cite the entry's own source or target names.
    pub config_aware: bool,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            class: "Deprecation".to_string(),
            notice_methods: vec![
                "notice".to_string(),
                "noticeWithNoReplacement".to_string(),
                // Historical misspelling still present upstream.
                "noticeWithNoReplacment".to_string(),
            ],
            wrapper_methods: vec![
                "withSuppressedNotice".to_string(),
                "withNoReplacement".to_string(),
            ],
            phrases: vec![
                "Will be renamed".to_string(),
                "renamed to".to_string(),
                "Will be moved to".to_string(),
                "moved to".to_string(),
            ],
            config_aware: true,
        }
    }
}

/// Everything a run needs from the mapping document.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub table: MappingTable,
    pub detector: DetectorSettings,
}

/// How far a single file got through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Loaded,
    Parsed,
    Pruned,
    Rewritten,
    Printed,
    Headered,
    Written,
    /// Terminal state for files that could not be transformed.  Their
    /// output is the original source text.
    Failed,
}
