#![allow(dead_code)]

use std::fs;
use std::path::Path;

use nsforward::{Config, DetectorSettings, Detector, MappingEntry, Pipeline, parse_config};

/// Mapping document with a single `Old\Foo\Foo` → `New\Foo\<target_class>`
/// entry.
pub fn single_entry_config(target_class: &str) -> Config {
    let toml = format!(
        r#"
        [classes.'Old\Foo\Foo']
        source_path = "src/Foo/Foo.php"
        target_path = "New/Foo/{target_class}.php"
        target_namespace = 'New\Foo'
        target_class = "{target_class}"
        "#
    );
    parse_config(&toml).expect("test config should load")
}

pub fn entry<'c>(config: &'c Config, identity: &str) -> &'c MappingEntry {
    config
        .table
        .get(identity)
        .unwrap_or_else(|| panic!("no entry for {identity}"))
}

pub fn pipeline(config: &Config) -> Pipeline<'_> {
    Pipeline::new(&config.table, Detector::new(config.detector.clone()))
}

pub fn phrases_only_pipeline(config: &Config) -> Pipeline<'_> {
    let settings = DetectorSettings {
        config_aware: false,
        ..config.detector.clone()
    };
    Pipeline::new(&config.table, Detector::new(settings))
}

/// Wrap method-body statements in a namespaced class with a constructor.
pub fn class_with_constructor(body: &str) -> String {
    format!(
        "<?php\n\nnamespace Old\\Foo;\n\nuse SilverStripe\\Dev\\Deprecation;\n\nclass Foo\n{{\n    public function __construct()\n    {{\n{body}    }}\n}}\n"
    )
}

/// Create files under `root`, making parent directories as needed.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (rel_path, content) in files {
        let full = root.join(rel_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create dirs");
        }
        fs::write(&full, content).expect("failed to write file");
    }
}
