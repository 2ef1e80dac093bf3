//! Document parsing and validation tests
//!
//! Exercises the full error-wrapping chain: capability → policy ordinal →
//! target name → document identity.

use std::io::Write;
use vault_selfserve::policy::{Conventions, find_document_files, parse_file, parse_files, parse_str};
use vault_selfserve::{ValidationError, ValidationKind};

fn conventions() -> Conventions {
    Conventions::new("customer", "bad-group")
}

const CORRECT: &str = r#"
groups:
  - name: customer-prod-reader
    policies:
      - path: customer/prod/*
        capabilities: [read, list]
  - name: customer-prod-admin
    policies:
      - path: customer/prod/*
        capabilities: [create, read, update, delete, list]
approles:
  - name: customer-application-prod
    policies:
      - path: customer/prod/application/*
        capabilities: [read]
    accessor_groups: [customer-prod-admin]
"#;

#[test]
fn test_correct_config() {
    let config = parse_str(CORRECT, &conventions()).unwrap();

    let reader = config
        .groups
        .iter()
        .find(|g| g.name == "customer-prod-reader")
        .unwrap();
    assert_eq!(reader.policies[0].path, "customer/prod/*");
    assert_eq!(reader.policies[0].capabilities.len(), 2);

    let approle = &config.approles[0];
    assert_eq!(approle.name, "customer-application-prod");
    assert_eq!(approle.accessor_groups.len(), 1);
}

#[test]
fn test_approle_accessors_are_captured() {
    let config = parse_str(
        r#"
approles:
  - name: customer-application-dev
    policies:
      - path: customer/dev/application/*
        capabilities: [read]
    accessor_groups: [customer-prod-admin, customer-dev-admin]
"#,
        &conventions(),
    )
    .unwrap();

    let approle = config
        .approles
        .iter()
        .find(|a| a.name == "customer-application-dev")
        .unwrap();
    let accessors: Vec<&str> = approle
        .accessor_groups
        .iter()
        .map(|g| g.name.as_str())
        .collect();
    assert_eq!(accessors.len(), 2);
    assert!(accessors.contains(&"customer-prod-admin"));
    assert!(accessors.contains(&"customer-dev-admin"));
}

fn parse_err(yaml: &str) -> ValidationError {
    parse_str(yaml, &conventions()).unwrap_err()
}

#[test]
fn test_bad_approle_name() {
    let err = parse_err(
        r#"
approles:
  - name: customer-But spaces are not
    policies: []
"#,
    );
    let msg = err.to_string();
    assert!(msg.contains("approle 'customer-But spaces are not'"));
    assert!(msg.contains("invalid approle name 'customer-But spaces are not'"));
}

#[test]
fn test_bad_capability() {
    let err = parse_err(
        r#"
groups:
  - name: customer-prod-admin
    policies:
      - path: customer/prod/*
        capabilities: [read, foobar]
"#,
    );
    let msg = err.to_string();
    assert!(msg.contains("group 'customer-prod-admin'"));
    assert!(msg.contains("'foobar' is not a valid capability"));
}

#[test]
fn test_bad_group_name() {
    let err = parse_err(
        r#"
groups:
  - name: But, commas are not
    policies: []
"#,
    );
    let msg = err.to_string();
    assert!(msg.contains("group 'But, commas are not'"));
    assert!(msg.contains("invalid group name 'But, commas are not'"));
}

#[test]
fn test_bad_group_name_prefix() {
    let err = parse_err(
        r#"
groups:
  - name: bad-GROUP-foobar
    policies: []
"#,
    );
    let msg = err.to_string();
    assert!(msg.contains("group 'bad-GROUP-foobar'"));
    assert!(msg.contains("group name must not start with 'bad-group': bad-GROUP-foobar"));
}

#[test]
fn test_illegal_approle_name() {
    let err = parse_err(
        r#"
approles:
  - name: application-prod
    policies: []
"#,
    );
    let msg = err.to_string();
    assert!(msg.contains("approle 'application-prod'"));
    assert!(msg.contains("approle name must start with 'customer-'"));
}

#[test]
fn test_illegal_approle_path() {
    let err = parse_err(
        r#"
approles:
  - name: customer-application-prod
    policies:
      - path: customer_other/prod/application/*
        capabilities: [read]
"#,
    );
    let msg = err.to_string();
    assert!(msg.contains("approle 'customer-application-prod'"));
    assert!(msg.contains("error in 1st policy"));
    assert!(msg.contains("all policy paths must be children of 'customer'"));
    assert!(
        msg.contains("illegal root 'customer_other' in path 'customer_other/prod/application/*'")
    );
}

#[test]
fn test_never_allowed_path() {
    let err = parse_err(
        r#"
groups:
  - name: customer-prod-admin
    policies:
      - path: sys/foobar/*
        capabilities: [read]
"#,
    );
    let msg = err.to_string();
    assert!(msg.contains("group 'customer-prod-admin'"));
    assert!(msg.contains("error in 1st policy"));
    assert!(msg.contains("illegal root 'sys' in path 'sys/foobar/*'"));
}

#[test]
fn test_no_capabilities() {
    let err = parse_err(
        r#"
groups:
  - name: customer-prod-admin
    policies:
      - path: customer/prod/*
"#,
    );
    let msg = err.to_string();
    assert!(msg.contains("group 'customer-prod-admin'"));
    assert!(msg.contains("'customer/prod/*' does not have any capabilities"));
}

#[rstest::rstest]
#[case::reserved_sys("sys/foo/*", "illegal root 'sys'")]
#[case::reserved_auth("auth/foo", "illegal root 'auth'")]
#[case::reserved_plus("+/foo", "illegal root '+'")]
#[case::foreign_root("tenant/foo", "must be children of 'customer'")]
#[case::double_slash("customer//foo", "double `foo//bar` slashes")]
#[case::trailing_slash("customer/foo/", "double `foo//bar` slashes")]
#[case::inner_wildcard("customer/f*o/bar", "only allowed as the last character")]
#[case::bad_charset("customer/f o", "may be a single +")]
fn test_path_rejections(#[case] bad_path: &str, #[case] expected: &str) {
    let err = parse_err(&format!(
        "groups:\n  - name: G\n    policies:\n      - path: {bad_path}\n        capabilities: [read]\n"
    ));
    let msg = err.to_string();
    assert!(msg.contains(expected), "{msg}");
    assert!(msg.contains(bad_path), "{msg}");
}

#[test]
fn test_error_structure_is_inspectable() {
    let err = parse_err(
        r#"
groups:
  - name: customer-prod-admin
    policies:
      - path: customer/prod/*
        capabilities: [read]
      - path: customer/pr*od/x
        capabilities: [read]
"#,
    );
    assert_eq!(
        err.frames(),
        ["group 'customer-prod-admin'", "error in 2nd policy"]
    );
    assert!(matches!(
        err.kind(),
        ValidationKind::InvalidSection { section, .. } if section == "pr*od"
    ));
}

#[test]
fn test_parse_file_wraps_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yml");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(b"groups:\n  - name: customer-ops\n    policies:\n      - path: sys/x\n        capabilities: [read]\n")
        .unwrap();

    let err = parse_file(&path, &conventions()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("error parsing '"));
    assert!(msg.contains("broken.yml"));
    assert!(msg.contains("illegal root 'sys' in path 'sys/x'"));
}

#[test]
fn test_parse_files_collects_every_broken_document() {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in [
        ("a.yml", "groups:\n  - policies: []\n"),
        ("b.yml", CORRECT),
        ("c.yaml", "approles:\n  - name: wrong-prefix\n    policies: []\n"),
    ] {
        std::fs::write(dir.path().join(name), body).unwrap();
    }

    let files = find_document_files(dir.path()).unwrap();
    assert_eq!(files.len(), 3);

    let report = parse_files(&files, &conventions()).unwrap_err();
    assert_eq!(report.errors.len(), 2);
    let rendered = report.to_string();
    assert!(rendered.contains("a.yml"));
    assert!(rendered.contains("c.yaml"));
    assert!(rendered.contains("name required for group"));
    assert!(rendered.contains("approle name must start with 'customer-'"));
}

#[test]
fn test_find_document_files_filters_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["z.yml", "a.yaml", "notes.txt", "README.md"] {
        std::fs::write(dir.path().join(name), "{}").unwrap();
    }

    let files = find_document_files(dir.path()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(names, ["a.yaml", "z.yml"]);
}
