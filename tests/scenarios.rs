//! End-to-end scenarios driving the full pipeline through the
//! in-memory provider.

mod common;

use common::*;
use indexsweep::config::Configuration;
use indexsweep::graph::{Accessibility, Kind};

fn retain_public() -> Configuration {
    Configuration {
        retain_public: true,
        ..Configuration::default()
    }
}

fn entry_main() -> Configuration {
    Configuration {
        entry_point_filenames: vec!["main.swift".into()],
        ..Configuration::default()
    }
}

#[test]
fn test_lone_class_reported_unused() {
    let results = run(
        vec![def(Kind::Class, "usr-a", "A", 1)],
        &Configuration::default(),
    );
    assert!(reported_unused(&results, "A"));
}

#[test]
fn test_self_referencing_class_still_unused() {
    let results = run(
        vec![
            def(Kind::Class, "usr-a", "A", 1),
            def_in(Kind::FunctionMethodInstance, "usr-f", "f()", 2, "usr-a"),
            ref_in(Kind::FunctionMethodInstance, "usr-f", 3, "usr-f"),
        ],
        &Configuration::default(),
    );
    assert!(reported_unused(&results, "A"));
    assert!(reported_unused(&results, "f()"));
}

#[test]
fn test_raw_value_enum_retains_every_case() {
    let results = run(
        vec![
            with_access(def(Kind::Enum, "usr-e", "E", 1), Accessibility::Public),
            def_in(Kind::EnumElement, "usr-used", "used", 2, "usr-e"),
            def_in(Kind::EnumElement, "usr-unused", "unused", 3, "usr-e"),
            related_in(Kind::Struct, "s:Si", "Int", 1, "usr-e"),
            with_access(def(Kind::FunctionFree, "usr-use", "use()", 20), Accessibility::Public),
            ref_in(Kind::EnumElement, "usr-used", 21, "usr-use"),
        ],
        &retain_public(),
    );
    assert!(!reported_unused(&results, "E"));
    assert!(!reported_unused(&results, "used"));
    assert!(!reported_unused(&results, "unused"));
}

#[test]
fn test_bare_enum_keeps_only_referenced_cases() {
    let results = run(
        vec![
            with_access(def(Kind::Enum, "usr-e", "E", 1), Accessibility::Public),
            def_in(Kind::EnumElement, "usr-used", "used", 2, "usr-e"),
            def_in(Kind::EnumElement, "usr-unused", "unused", 3, "usr-e"),
            with_access(def(Kind::FunctionFree, "usr-use", "use()", 20), Accessibility::Public),
            ref_in(Kind::EnumElement, "usr-used", 21, "usr-use"),
        ],
        &retain_public(),
    );
    assert!(!reported_unused(&results, "E"));
    assert!(!reported_unused(&results, "used"));
    assert!(reported_unused(&results, "unused"));
}

#[test]
fn test_unused_protocol_reported_despite_conformance() {
    let results = run(
        vec![
            def(Kind::Protocol, "usr-p", "P", 1),
            def_in(Kind::FunctionMethodInstance, "usr-p-m", "m()", 2, "usr-p"),
            with_access(def(Kind::Class, "usr-c", "C", 10), Accessibility::Public),
            related_in(Kind::Protocol, "usr-p", "P", 10, "usr-c"),
            def_in(Kind::FunctionMethodInstance, "usr-c-m", "m()", 11, "usr-c"),
        ],
        &retain_public(),
    );
    assert!(!reported_unused(&results, "C"));
    assert!(reported_unused(&results, "P"));
    assert!(reported_unused(&results, "m()"), "both m() declarations are dead");
    assert_eq!(
        results
            .unreferenced_declarations
            .iter()
            .filter(|i| i.name.as_deref() == Some("m()"))
            .count(),
        2
    );
}

#[test]
fn test_cross_module_reference_retains_target() {
    let results = run(
        vec![
            in_module(
                in_file(
                    with_access(def(Kind::Class, "usr-a", "A", 1), Accessibility::Public),
                    "Sources/X/A.swift",
                ),
                "X",
            ),
            in_module(
                in_file(base_ref(Kind::Class, "usr-a", 3), "Sources/Y/B.swift"),
                "Y",
            ),
        ],
        &Configuration::default(),
    );
    assert!(!reported_unused(&results, "A"));
}

// Top-level reference with no container; helper kept local to this file.
fn base_ref(kind: Kind, usr: &str, line: u32) -> indexsweep::index::OccurrenceRecord {
    let mut r = ref_in(kind, usr, line, "ignored");
    r.container_usr = None;
    r
}

#[test]
fn test_override_chain_retains_base_and_override() {
    let results = run(
        vec![
            def(Kind::Class, "usr-b", "B", 1),
            def_in(Kind::FunctionMethodInstance, "usr-b-m", "m()", 2, "usr-b"),
            def(Kind::Class, "usr-s", "S", 10),
            related_in(Kind::Class, "usr-b", "B", 10, "usr-s"),
            with_modifier(
                def_in(Kind::FunctionMethodInstance, "usr-s-m", "m()", 11, "usr-s"),
                "override",
            ),
            ref_in(Kind::FunctionMethodInstance, "usr-b-m", 12, "usr-s-m"),
            in_file(def(Kind::FunctionFree, "usr-main", "main()", 1), "Sources/main.swift"),
            in_file(ref_in(Kind::Class, "usr-s", 2, "usr-main"), "Sources/main.swift"),
            in_file(
                ref_in(Kind::FunctionMethodInstance, "usr-s-m", 3, "usr-main"),
                "Sources/main.swift",
            ),
        ],
        &entry_main(),
    );
    assert!(results.is_empty(), "everything is reachable: {:?}", results);
}

#[test]
fn test_assign_only_property_with_trivial_initializer() {
    let results = run(
        vec![
            def(Kind::Class, "usr-c", "C", 1),
            def_in(Kind::VarInstance, "usr-x", "x", 2, "usr-c"),
            def_in(Kind::FunctionConstructor, "usr-init", "init()", 3, "usr-c"),
            as_write(ref_in(Kind::VarInstance, "usr-x", 4, "usr-init")),
            in_file(def(Kind::FunctionFree, "usr-main", "main()", 1), "Sources/main.swift"),
            in_file(
                ref_in(Kind::FunctionConstructor, "usr-init", 2, "usr-main"),
                "Sources/main.swift",
            ),
        ],
        &entry_main(),
    );
    assert!(reported_assign_only(&results, "x"));
    assert!(!reported_unused(&results, "x"));
}

#[test]
fn test_assign_only_rule_suppressed_by_flag() {
    let config = Configuration {
        entry_point_filenames: vec!["main.swift".into()],
        retain_assign_only_properties: true,
        ..Configuration::default()
    };
    let results = run(
        vec![
            def(Kind::Class, "usr-c", "C", 1),
            def_in(Kind::VarInstance, "usr-x", "x", 2, "usr-c"),
            def_in(Kind::FunctionConstructor, "usr-init", "init()", 3, "usr-c"),
            as_write(ref_in(Kind::VarInstance, "usr-x", 4, "usr-init")),
            in_file(def(Kind::FunctionFree, "usr-main", "main()", 1), "Sources/main.swift"),
            in_file(
                ref_in(Kind::FunctionConstructor, "usr-init", 2, "usr-main"),
                "Sources/main.swift",
            ),
        ],
        &config,
    );
    assert!(!reported_assign_only(&results, "x"));
}

#[test]
fn test_parameter_used_only_in_override_retains_base_parameter() {
    let results = run(
        vec![
            def(Kind::Class, "usr-b", "B", 1),
            def_in(
                Kind::FunctionMethodInstance,
                "usr-b-m",
                "update(value:)",
                2,
                "usr-b",
            ),
            def_in(Kind::VarParameter, "usr-b-p", "value", 2, "usr-b-m"),
            def(Kind::Class, "usr-s", "S", 10),
            related_in(Kind::Class, "usr-b", "B", 10, "usr-s"),
            with_modifier(
                def_in(
                    Kind::FunctionMethodInstance,
                    "usr-s-m",
                    "update(value:)",
                    11,
                    "usr-s",
                ),
                "override",
            ),
            def_in(Kind::VarParameter, "usr-s-p", "value", 11, "usr-s-m"),
            ref_in(Kind::VarParameter, "usr-s-p", 12, "usr-s-m"),
            in_file(def(Kind::FunctionFree, "usr-main", "main()", 1), "Sources/main.swift"),
            in_file(
                ref_in(Kind::FunctionMethodInstance, "usr-b-m", 2, "usr-main"),
                "Sources/main.swift",
            ),
            in_file(
                ref_in(Kind::FunctionMethodInstance, "usr-s-m", 3, "usr-main"),
                "Sources/main.swift",
            ),
        ],
        &entry_main(),
    );
    assert!(!reported_parameter(&results, "value"));
}

#[test]
fn test_unused_parameter_of_live_function_reported() {
    let results = run(
        vec![
            in_file(def(Kind::FunctionFree, "usr-main", "main()", 1), "Sources/main.swift"),
            in_file(
                ref_in(Kind::FunctionFree, "usr-f", 2, "usr-main"),
                "Sources/main.swift",
            ),
            def(Kind::FunctionFree, "usr-f", "handle(value:)", 5),
            def_in(Kind::VarParameter, "usr-p", "value", 5, "usr-f"),
        ],
        &entry_main(),
    );
    assert!(reported_parameter(&results, "value"));
}

#[test]
fn test_ignore_directive_suppresses_reporting() {
    let source = "\
// indexsweep:ignore
class Stale {
    func helper() {}
}
";
    let results = run_with_sources(
        vec![
            def(Kind::Class, "usr-stale", "Stale", 2),
            def_in(Kind::FunctionMethodInstance, "usr-helper", "helper()", 3, "usr-stale"),
        ],
        &Configuration::default(),
        &[(FILE, source)],
    );
    assert!(!reported_unused(&results, "Stale"));
    assert!(!reported_unused(&results, "helper()"));
}

#[test]
fn test_ignore_all_directive_covers_rest_of_file() {
    let source = "\
class Kept {}
// indexsweep:ignore:all
class Hidden {}
class AlsoHidden {}
";
    let results = run_with_sources(
        vec![
            def(Kind::Class, "usr-kept", "Kept", 1),
            def(Kind::Class, "usr-hidden", "Hidden", 3),
            def(Kind::Class, "usr-also", "AlsoHidden", 4),
        ],
        &Configuration::default(),
        &[(FILE, source)],
    );
    assert!(reported_unused(&results, "Kept"));
    assert!(!reported_unused(&results, "Hidden"));
    assert!(!reported_unused(&results, "AlsoHidden"));
}
