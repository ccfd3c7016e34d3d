//! Mapping table loading.
//!
//! The mapping document is TOML.  Its `classes` table is keyed by the
//! fully-qualified old class name; each entry names the upstream file, the
//! generated file and the target identity:
//!
//! ```toml
//! [detector]
//! config_aware = true
//!
//! [classes.'Old\Foo\Foo']
//! source_path = "src/Foo/Foo.php"
//! target_path = "New/Foo/Foo.php"
//! target_namespace = 'New\Foo'
//! target_class = "Foo"
//! ```
//!
//! Declared order is preserved and drives output order.  The derived
//! namespace and class-name views are built here, once, and validated
//! before any file is touched.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::names;
use crate::types::{ClassNameMapping, Config, DetectorSettings, MappingEntry, MappingTable, NamespaceMapping};

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    detector: Option<DetectorSettings>,
    #[serde(default, alias = "mappings")]
    classes: Option<IndexMap<String, RawEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    source_path: PathBuf,
    target_path: PathBuf,
    target_namespace: String,
    target_class: String,
}

/// Read and validate the mapping document at `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse and validate a mapping document held in memory.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let raw: RawDocument = toml::from_str(content)?;
    let classes = raw.classes.ok_or(ConfigError::MissingCollection)?;

    let mut entries = IndexMap::with_capacity(classes.len());
    for (identity, raw_entry) in classes {
        let entry = build_entry(&identity, raw_entry)?;
        if entries.contains_key(&entry.source_identity) {
            return Err(ConfigError::InvalidEntry {
                identity,
                reason: "declared more than once".to_string(),
            });
        }
        entries.insert(entry.source_identity.clone(), entry);
    }

    let table = build_table(entries)?;
    Ok(Config {
        table,
        detector: raw.detector.unwrap_or_default(),
    })
}

fn build_entry(identity: &str, raw: RawEntry) -> Result<MappingEntry, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEntry {
        identity: identity.to_string(),
        reason: reason.to_string(),
    };

    let source_identity = names::normalize(identity).to_string();
    if source_identity.is_empty() || names::short_name(&source_identity).is_empty() {
        return Err(invalid("empty class identity"));
    }

    let target_class = names::normalize(&raw.target_class).to_string();
    if target_class.is_empty() {
        return Err(invalid("empty `target_class`"));
    }
    if target_class.contains('\\') {
        return Err(invalid("`target_class` must be a simple name"));
    }
    if raw.source_path.as_os_str().is_empty() {
        return Err(invalid("empty `source_path`"));
    }
    if raw.target_path.as_os_str().is_empty() {
        return Err(invalid("empty `target_path`"));
    }

    Ok(MappingEntry {
        source_identity,
        target_namespace: names::normalize(&raw.target_namespace).to_string(),
        target_class,
        source_path: raw.source_path,
        target_path: raw.target_path,
    })
}

/// Derive the namespace and class-name views from the entries.
fn build_table(entries: IndexMap<String, MappingEntry>) -> Result<MappingTable, ConfigError> {
    let mut namespaces = NamespaceMapping::default();
    let mut class_names = ClassNameMapping::default();
    // simple name -> first entry that declared it
    let mut seen: HashMap<&str, &MappingEntry> = HashMap::new();

    for entry in entries.values() {
        let old_ns = entry.source_namespace();
        if !namespaces.insert(old_ns, &entry.target_namespace) {
            tracing::warn!(
                "namespace `{}` has conflicting targets; keeping the first, ignoring `{}` from `{}`",
                old_ns,
                entry.target_namespace,
                entry.source_identity
            );
        }

        // Identities are unique, so a repeated simple name always comes
        // from another namespace.
        let simple = entry.source_class();
        if let Some(first) = seen.get(simple) {
            return Err(ConfigError::AmbiguousClassName {
                name: simple.to_string(),
                first: first.source_identity.clone(),
                second: entry.source_identity.clone(),
            });
        }
        seen.insert(simple, entry);
        class_names.insert(simple, &entry.target_class);
    }

    Ok(MappingTable {
        entries,
        namespaces,
        class_names,
    })
}
