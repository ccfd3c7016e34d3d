mod common;

use common::{class_with_constructor, entry, pipeline, single_entry_config};
use nsforward::pipeline::header::banner;
use nsforward::{HEADER_MARKER, Stage, TransformError};
use pretty_assertions::assert_eq;

/// Expected output for `class_with_constructor` once the facade import is
/// gone: the moved class with `body` as the constructor's statements.
fn moved_constructor(body: &str) -> String {
    format!(
        "{}namespace New\\Foo;\n\nclass Foo\n{{\n    public function __construct()\n    {{\n{body}    }}\n}}\n",
        banner("Old\\Foo\\Foo")
    )
}

// ─── End-to-end scenarios ───────────────────────────────────────────────────

#[test]
fn test_rename_notice_removed_and_declarations_moved() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = class_with_constructor(concat!(
        "        Deprecation::withSuppressedNotice(function () {\n",
        "            Deprecation::notice('5.4.0', 'Will be renamed to New\\Foo\\Foo', Deprecation::SCOPE_CLASS);\n",
        "        });\n",
    ));

    let outcome = pipeline(&config).transform(&source, entry);

    let expected = concat!(
        "<?php\n",
        "\n",
        "/**\n",
        " * Forward-compatibility polyfill for Old\\Foo\\Foo.\n",
        " *\n",
        " * This file is generated from the upstream source. Do not edit it by hand.\n",
        " */\n",
        "\n",
        "namespace New\\Foo;\n",
        "\n",
        "class Foo\n",
        "{\n",
        "    public function __construct()\n",
        "    {}\n",
        "}\n",
    );
    assert_eq!(outcome.text, expected);
    assert_eq!(outcome.stage, Stage::Headered);
    assert_eq!(outcome.removed, 1);
    assert!(outcome.renamed);
    assert!(outcome.failure.is_none());
}

#[test]
fn test_unrelated_deprecation_survives_untouched() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let unrelated =
        "        Deprecation::notice('5.4.0', 'The $bar parameter of Foo::__construct() is deprecated');\n";
    let source = class_with_constructor(&format!(
        "{}{}",
        concat!(
            "        Deprecation::withSuppressedNotice(function () {\n",
            "            Deprecation::notice('5.4.0', 'Will be renamed to New\\Foo\\Foo', Deprecation::SCOPE_CLASS);\n",
            "        });\n",
        ),
        unrelated
    ));

    let outcome = pipeline(&config).transform(&source, entry);

    assert_eq!(outcome.removed, 1);
    assert!(
        outcome
            .text
            .contains(&format!("    {{\n{}    }}\n", unrelated)),
        "unrelated notice should be the only statement left:\n{}",
        outcome.text
    );
    assert!(!outcome.text.contains("Will be renamed"));
    // The facade is still referenced, so its import stays.
    assert!(outcome.text.contains("use SilverStripe\\Dev\\Deprecation;\n"));
}

// ─── Selective pruning ──────────────────────────────────────────────────────

#[test]
fn test_only_rename_notice_is_pruned() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = class_with_constructor(concat!(
        "        Deprecation::notice('5.4.0', 'Will be moved to New\\Foo');\n",
        "        Deprecation::notice('5.4.0', 'getBar() is deprecated, use getBaz() instead');\n",
    ));

    let outcome = pipeline(&config).transform(&source, entry);

    assert_eq!(outcome.removed, 1);
    assert!(!outcome.text.contains("Will be moved to"));
    assert!(outcome.text.contains(
        "    {\n        Deprecation::notice('5.4.0', 'getBar() is deprecated, use getBaz() instead');\n    }\n"
    ));
}

#[test]
fn test_wrapper_removed_as_one_unit() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = class_with_constructor(concat!(
        "        $this->setUp();\n",
        "        Deprecation::withSuppressedNotice(function () {\n",
        "            Deprecation::notice('5.4.0', 'Will be renamed to New\\Foo\\Foo');\n",
        "        });\n",
        "        $this->tearDown();\n",
    ));

    let outcome = pipeline(&config).transform(&source, entry);

    assert!(outcome.text.contains(
        "    {\n        $this->setUp();\n        $this->tearDown();\n    }\n"
    ));
    assert!(!outcome.text.contains("withSuppressedNotice"));
    assert!(!outcome.text.contains("function ()"));
}

#[test]
fn test_wrapper_with_other_work_is_kept_whole() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let wrapper = concat!(
        "        Deprecation::withSuppressedNotice(function () {\n",
        "            Deprecation::notice('5.4.0', 'Will be renamed to New\\Foo\\Foo');\n",
        "            $this->init();\n",
        "        });\n",
    );
    let source = class_with_constructor(wrapper);

    let outcome = pipeline(&config).transform(&source, entry);

    assert_eq!(outcome.removed, 0);
    assert!(outcome.text.contains(wrapper));
}

#[test]
fn test_notice_in_nested_if_block_is_pruned() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = class_with_constructor(concat!(
        "        if ($this->isLegacy()) {\n",
        "            Deprecation::notice('5.4.0', 'Will be renamed to New\\Foo\\Foo');\n",
        "        } else {\n",
        "            $this->boot();\n",
        "        }\n",
    ));

    let outcome = pipeline(&config).transform(&source, entry);

    assert_eq!(outcome.removed, 1);
    assert!(outcome.text.contains(
        "        if ($this->isLegacy()) {} else {\n            $this->boot();\n        }\n"
    ));
}

#[test]
fn test_bare_if_body_is_never_emptied() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let guarded = "        if ($legacy) Deprecation::notice('5.4.0', 'Will be renamed to New\\Foo\\Foo');\n";
    let source = class_with_constructor(guarded);

    let outcome = pipeline(&config).transform(&source, entry);

    assert_eq!(outcome.removed, 0);
    assert!(outcome.text.contains(guarded));
}

#[test]
fn test_static_method_notices_are_pruned_too() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = concat!(
        "<?php\n",
        "\n",
        "namespace Old\\Foo;\n",
        "\n",
        "class Foo\n",
        "{\n",
        "    public static function create(): static\n",
        "    {\n",
        "        \\SilverStripe\\Dev\\Deprecation::noticeWithNoReplacment('5.4.0', 'Will be renamed to New\\Foo\\Foo');\n",
        "        return new static();\n",
        "    }\n",
        "}\n",
    );

    let outcome = pipeline(&config).transform(source, entry);

    assert_eq!(outcome.removed, 1);
    assert!(outcome.text.contains("    {\n        return new static();\n    }\n"));
}

#[test]
fn test_stray_semicolon_after_removed_notice_goes_too() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = class_with_constructor(concat!(
        "        Deprecation::notice('5.4.0', 'Will be renamed to New\\Foo\\Foo');\n",
        "        ;\n",
        "        $this->boot();\n",
    ));

    let outcome = pipeline(&config).transform(&source, entry);

    assert_eq!(outcome.removed, 1);
    assert_eq!(outcome.text, moved_constructor("        $this->boot();\n"));
}

#[test]
fn test_semicolon_sharing_the_line_takes_the_whole_line() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = class_with_constructor(concat!(
        "        a();\n",
        "        Deprecation::notice('5.4.0', 'Will be renamed to New\\Foo\\Foo');;\n",
        "        b();\n",
    ));

    let outcome = pipeline(&config).transform(&source, entry);

    assert_eq!(outcome.text, moved_constructor("        a();\n        b();\n"));
}

#[test]
fn test_colon_delimited_if_branches_are_pruned() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = class_with_constructor(concat!(
        "        if ($legacy):\n",
        "            Deprecation::notice('5.4.0', 'Will be renamed to New\\Foo\\Foo');\n",
        "            $this->boot();\n",
        "        elseif ($other):\n",
        "            Deprecation::notice('5.4.0', 'Will be moved to New\\Foo');\n",
        "        else:\n",
        "            $this->init();\n",
        "        endif;\n",
    ));

    let outcome = pipeline(&config).transform(&source, entry);

    assert_eq!(outcome.removed, 2);
    assert_eq!(
        outcome.text,
        moved_constructor(concat!(
            "        if ($legacy):\n",
            "            $this->boot();\n",
            "        elseif ($other):\n",
            "        else:\n",
            "            $this->init();\n",
            "        endif;\n",
        ))
    );
}

#[test]
fn test_loops_try_and_switch_bodies_are_pruned() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = class_with_constructor(concat!(
        "        try {\n",
        "            Deprecation::notice('5.4.0', 'Will be renamed to New\\Foo\\Foo');\n",
        "            $this->boot();\n",
        "        } finally {\n",
        "        }\n",
        "        foreach ($items as $item) {\n",
        "            Deprecation::notice('5.4.0', 'Will be moved to New\\Foo');\n",
        "        }\n",
        "        while ($retry) {\n",
        "            Deprecation::notice('5.4.0', 'Will be moved to New\\Foo');\n",
        "        }\n",
        "        switch ($mode) {\n",
        "            case 'legacy':\n",
        "                Deprecation::notice('5.4.0', 'Will be renamed to New\\Foo\\Foo');\n",
        "                break;\n",
        "        }\n",
    ));

    let outcome = pipeline(&config).transform(&source, entry);

    assert_eq!(outcome.removed, 4);
    assert_eq!(
        outcome.text,
        moved_constructor(concat!(
            "        try {\n",
            "            $this->boot();\n",
            "        } finally {\n",
            "        }\n",
            "        foreach ($items as $item) {}\n",
            "        while ($retry) {}\n",
            "        switch ($mode) {\n",
            "            case 'legacy':\n",
            "                break;\n",
            "        }\n",
        ))
    );
}

// ─── Facade import ──────────────────────────────────────────────────────────

#[test]
fn test_import_kept_while_facade_is_used_in_other_case() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = concat!(
        "<?php\n",
        "\n",
        "namespace Old\\Foo;\n",
        "\n",
        "use SilverStripe\\Dev\\Deprecation;\n",
        "\n",
        "class Foo\n",
        "{\n",
        "    public function __construct()\n",
        "    {\n",
        "        Deprecation::notice('5.4.0', 'Will be renamed to New\\Foo\\Foo');\n",
        "    }\n",
        "\n",
        "    public function other()\n",
        "    {\n",
        "        deprecation::enable();\n",
        "    }\n",
        "}\n",
    );

    let outcome = pipeline(&config).transform(source, entry);

    assert_eq!(outcome.removed, 1);
    assert_eq!(
        outcome.text,
        format!(
            "{}{}",
            banner("Old\\Foo\\Foo"),
            concat!(
                "namespace New\\Foo;\n",
                "\n",
                "use SilverStripe\\Dev\\Deprecation;\n",
                "\n",
                "class Foo\n",
                "{\n",
                "    public function __construct()\n",
                "    {}\n",
                "\n",
                "    public function other()\n",
                "    {\n",
                "        deprecation::enable();\n",
                "    }\n",
                "}\n",
            )
        )
    );
}

#[test]
fn test_aliased_facade_notice_and_import_are_removed() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = class_with_constructor(
        "        Dep::notice('5.4.0', 'Will be renamed to New\\Foo\\Foo');\n",
    )
    .replace(
        "use SilverStripe\\Dev\\Deprecation;",
        "use SilverStripe\\Dev\\Deprecation as Dep;",
    );

    let outcome = pipeline(&config).transform(&source, entry);

    assert_eq!(outcome.removed, 1);
    assert_eq!(
        outcome.text,
        format!(
            "{}namespace New\\Foo;\n\nclass Foo\n{{\n    public function __construct()\n    {{}}\n}}\n",
            banner("Old\\Foo\\Foo")
        )
    );
}

// ─── Fail-open ──────────────────────────────────────────────────────────────

#[test]
fn test_invalid_source_is_returned_verbatim() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = "<?php\n\nnamespace Old\\Foo;\n\nclass Foo {\n    public function __construct( {\n}\n";

    let outcome = pipeline(&config).transform(source, entry);

    assert_eq!(outcome.text, source);
    assert_eq!(outcome.stage, Stage::Failed);
    assert!(outcome.is_fallback());
    assert!(matches!(outcome.failure, Some(TransformError::Parse { .. })));
}

// ─── Header ─────────────────────────────────────────────────────────────────

#[test]
fn test_header_replaces_license_prologue() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = "<?php\n/*\n * Upstream license.\n */\n\nnamespace Old\\Foo;\n\nclass Foo {}\n";

    let outcome = pipeline(&config).transform(source, entry);

    assert!(outcome.text.starts_with("<?php\n\n/**\n"));
    assert!(outcome.text.contains(&format!("{} Old\\Foo\\Foo.", HEADER_MARKER)));
    assert!(!outcome.text.contains("Upstream license"));
    assert!(outcome.text.ends_with("*/\n\nnamespace New\\Foo;\n\nclass Foo {}\n"));
    assert_eq!(outcome.text.matches("<?php").count(), 1);
}

#[test]
fn test_unchanged_class_still_gets_header() {
    let config = single_entry_config("Foo");
    let entry = entry(&config, "Old\\Foo\\Foo");
    let source = "<?php\n\nnamespace Unrelated;\n\nclass Other {}\n";

    let outcome = pipeline(&config).transform(source, entry);

    assert!(!outcome.renamed);
    assert_eq!(outcome.removed, 0);
    assert!(outcome.text.ends_with("*/\n\nnamespace Unrelated;\n\nclass Other {}\n"));
}
