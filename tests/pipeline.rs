//! Full-pipeline coverage for the retention rules that depend on
//! mutator cooperation: annotations, framework coupling, external
//! conformances, implicit members and the provider shells.

mod common;

use common::*;
use indexsweep::config::Configuration;
use indexsweep::error::Error;
use indexsweep::graph::Kind;
use indexsweep::index::{InMemoryProvider, JsonlProvider};
use std::io::Write;

#[test]
fn test_objc_annotated_retention() {
    let config = Configuration {
        retain_objc_annotated: true,
        ..Configuration::default()
    };
    let results = run(
        vec![
            with_attr(def(Kind::Class, "usr-a", "Bridge", 1), "@objcMembers"),
            def_in(Kind::FunctionMethodInstance, "usr-a-m", "send()", 2, "usr-a"),
            with_attr(def(Kind::Class, "usr-b", "Exposed", 10), "@objc"),
            def_in(Kind::FunctionMethodInstance, "usr-b-m", "poke()", 11, "usr-b"),
        ],
        &config,
    );
    assert!(!reported_unused(&results, "Bridge"));
    assert!(!reported_unused(&results, "send()"));
    assert!(!reported_unused(&results, "Exposed"));
    assert!(reported_unused(&results, "poke()"), "members of an @objc type are not exposed");
}

#[test]
fn test_test_harness_subclass_retention() {
    let config = Configuration {
        external_test_base_class_usrs: vec!["c:objc(cs)XCTestCase".into()],
        ..Configuration::default()
    };
    let results = run(
        vec![
            def(Kind::Class, "usr-tests", "SessionTests", 1),
            related_in(Kind::Class, "c:objc(cs)XCTestCase", "XCTestCase", 1, "usr-tests"),
            def_in(
                Kind::FunctionMethodInstance,
                "usr-t1",
                "testLogin()",
                2,
                "usr-tests",
            ),
            def_in(Kind::FunctionMethodInstance, "usr-t2", "setUp()", 3, "usr-tests"),
            def_in(Kind::FunctionMethodInstance, "usr-h", "makeSession()", 4, "usr-tests"),
        ],
        &config,
    );
    assert!(!reported_unused(&results, "SessionTests"));
    assert!(!reported_unused(&results, "testLogin()"));
    assert!(!reported_unused(&results, "setUp()"));
    assert!(reported_unused(&results, "makeSession()"));
}

#[test]
fn test_external_conformance_witnesses_and_parameters() {
    let results = run(
        vec![
            def(Kind::Class, "usr-d", "Delegate", 1),
            related_in(
                Kind::Protocol,
                "c:objc(pl)URLSessionDelegate",
                "URLSessionDelegate",
                1,
                "usr-d",
            ),
            def_in(
                Kind::FunctionMethodInstance,
                "usr-d-m",
                "urlSession(_:didBecomeInvalidWithError:)",
                2,
                "usr-d",
            ),
            def_in(Kind::VarParameter, "usr-d-p", "error", 2, "usr-d-m"),
        ],
        &Configuration::default(),
    );
    assert!(!reported_unused(&results, "urlSession(_:didBecomeInvalidWithError:)"));
    assert!(!reported_unused(&results, "Delegate"));
    assert!(
        !reported_parameter(&results, "error"),
        "foreign witness parameters are exempt"
    );
}

#[test]
fn test_property_wrapper_members_retained() {
    let results = run(
        vec![
            with_attr(def(Kind::Struct, "usr-w", "Clamped", 1), "@propertyWrapper"),
            def_in(Kind::VarInstance, "usr-wv", "wrappedValue", 2, "usr-w"),
            def_in(Kind::FunctionMethodInstance, "usr-other", "recalc()", 3, "usr-w"),
        ],
        &Configuration::default(),
    );
    assert!(!reported_unused(&results, "wrappedValue"));
    assert!(!reported_unused(&results, "Clamped"));
    assert!(reported_unused(&results, "recalc()"));
}

#[test]
fn test_typealias_retains_aliased_type() {
    let config = Configuration {
        entry_point_filenames: vec!["main.swift".into()],
        ..Configuration::default()
    };
    let results = run(
        vec![
            def(Kind::Class, "usr-target", "Engine", 1),
            def(Kind::Typealias, "usr-alias", "Motor", 5),
            related_in(Kind::Class, "usr-target", "Engine", 5, "usr-alias"),
            in_file(def(Kind::FunctionFree, "usr-main", "main()", 1), "Sources/main.swift"),
            in_file(
                ref_in(Kind::Typealias, "usr-alias", 2, "usr-main"),
                "Sources/main.swift",
            ),
        ],
        &config,
    );
    assert!(!reported_unused(&results, "Motor"));
    assert!(!reported_unused(&results, "Engine"));
}

#[test]
fn test_protocol_extension_default_implementation_retained() {
    let config = Configuration {
        entry_point_filenames: vec!["main.swift".into()],
        ..Configuration::default()
    };
    let results = run(
        vec![
            def(Kind::Protocol, "usr-p", "Greeter", 1),
            def_in(Kind::FunctionMethodInstance, "usr-p-m", "greet()", 2, "usr-p"),
            def(Kind::ExtensionProtocol, "usr-ext", "Greeter", 10),
            related_in(Kind::Protocol, "usr-p", "Greeter", 10, "usr-ext"),
            def_in(Kind::FunctionMethodInstance, "usr-ext-m", "greet()", 11, "usr-ext"),
            // A conformer that shadows the default.
            def(Kind::Class, "usr-c", "Console", 20),
            related_in(Kind::Protocol, "usr-p", "Greeter", 20, "usr-c"),
            def_in(Kind::FunctionMethodInstance, "usr-c-m", "greet()", 21, "usr-c"),
            in_file(def(Kind::FunctionFree, "usr-main", "main()", 1), "Sources/main.swift"),
            in_file(
                ref_in(Kind::FunctionMethodInstance, "usr-p-m", 2, "usr-main"),
                "Sources/main.swift",
            ),
        ],
        &config,
    );
    // Removing the default implementation would change dispatch even
    // though the conformer shadows it.
    assert!(!reported_unused(&results, "greet()"));
    assert!(!reported_unused(&results, "Greeter"));
    assert!(!reported_unused(&results, "Console"));
}

#[test]
fn test_memberwise_initializer_keeps_struct_plumbing_quiet() {
    let config = Configuration {
        entry_point_filenames: vec!["main.swift".into()],
        ..Configuration::default()
    };
    let results = run(
        vec![
            def(Kind::Struct, "usr-pt", "Point", 1),
            def_in(Kind::VarInstance, "usr-x", "x", 2, "usr-pt"),
            def_in(Kind::VarInstance, "usr-y", "y", 3, "usr-pt"),
            in_file(def(Kind::FunctionFree, "usr-main", "main()", 1), "Sources/main.swift"),
            in_file(ref_in(Kind::Struct, "usr-pt", 2, "usr-main"), "Sources/main.swift"),
        ],
        &config,
    );
    assert!(!reported_unused(&results, "Point"));
    // Stored properties are written by the synthesized initializer and
    // never read: that is an assign-only finding, not plain unused.
    assert!(!reported_unused(&results, "x"));
    assert!(reported_assign_only(&results, "x"));
    assert!(reported_assign_only(&results, "y"));
}

#[test]
fn test_coding_keys_of_codable_type_not_reported() {
    let results = run(
        vec![
            def(Kind::Struct, "usr-payload", "Payload", 1),
            related_in(Kind::Protocol, "s:SE", "Codable", 1, "usr-payload"),
            def_in(Kind::Enum, "usr-keys", "CodingKeys", 2, "usr-payload"),
            def_in(Kind::EnumElement, "usr-keys-id", "id", 3, "usr-keys"),
        ],
        &Configuration::default(),
    );
    assert!(!reported_unused(&results, "CodingKeys"));
    assert!(!reported_unused(&results, "id"));
    assert!(!reported_unused(&results, "Payload"));
}

#[test]
fn test_unknown_entry_point_file_is_a_configuration_error() {
    let config = Configuration {
        entry_point_filenames: vec!["missing.swift".into()],
        ..Configuration::default()
    };
    let provider = InMemoryProvider::new(vec![def(Kind::Class, "usr-a", "A", 1)]);
    let err = indexsweep::run_analysis(&provider, &config).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn test_jsonl_provider_end_to_end() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{"module":"app","file":"Sources/A.swift","line":1,"column":1,"kind":"class","name":"A","usr":"usr-a","role":"def"}}"#
    )
    .unwrap();
    writeln!(
        file,
        r#"{{"module":"app","file":"Sources/A.swift","line":5,"column":1,"kind":"class","name":"B","usr":"usr-b","role":"def"}}"#
    )
    .unwrap();
    writeln!(
        file,
        r#"{{"module":"other","file":"Sources/O.swift","line":2,"column":9,"kind":"class","usr":"usr-a","role":"ref"}}"#
    )
    .unwrap();

    let provider = JsonlProvider::new(file.path());
    let results = indexsweep::run_analysis(&provider, &Configuration::default()).unwrap();

    assert!(!reported_unused(&results, "A"), "cross-module reference keeps A");
    assert!(reported_unused(&results, "B"));
}

#[test]
fn test_report_order_is_stable() {
    let results = run(
        vec![
            in_file(def(Kind::Class, "usr-z", "Zeta", 8), "Sources/B.swift"),
            in_file(def(Kind::Class, "usr-a", "Alpha", 3), "Sources/B.swift"),
            in_file(def(Kind::Class, "usr-m", "Mid", 1), "Sources/A.swift"),
        ],
        &Configuration::default(),
    );
    let names = unused_names(&results);
    assert_eq!(names, vec!["Mid", "Alpha", "Zeta"]);
}
