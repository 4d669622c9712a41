//! Integration tests for `hive agents` and `hive presets`.
//!
//! These tests verify catalog listing, lookups, the "none" preset
//! sentinel, and KDL extension file layering.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use serde_json::Value;

fn parse_stdout(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout should be JSON")
}

#[test]
fn test_agents_list_is_sorted_by_id() {
    let env = TestEnv::new();

    let assert = env.hive().args(["agents", "list"]).assert().success();

    let json = parse_stdout(&assert.get_output().stdout);
    let ids: Vec<&str> = json["agents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();

    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
    assert!(ids.contains(&"queen"));
    assert!(ids.contains(&"tester"));
}

#[test]
fn test_agents_list_category_filter() {
    let env = TestEnv::new();

    let assert = env
        .hive()
        .args(["agents", "list", "--category", "quality"])
        .assert()
        .success();

    let json = parse_stdout(&assert.get_output().stdout);
    for agent in json["agents"].as_array().unwrap() {
        assert_eq!(agent["category"], "quality");
    }
}

#[test]
fn test_agents_show_unknown_fails() {
    let env = TestEnv::new();

    env.hive()
        .args(["agents", "show", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_presets_list_contains_builtins() {
    let env = TestEnv::new();

    let assert = env.hive().args(["presets", "list"]).assert().success();

    let json = parse_stdout(&assert.get_output().stdout);
    let ids: Vec<&str> = json["presets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();

    for id in ["minimal", "hive-mind", "swarm-dev", "research", "pipeline"] {
        assert!(ids.contains(&id), "missing preset {}", id);
    }
}

#[test]
fn test_presets_show_none_sentinel() {
    let env = TestEnv::new();

    // The sentinel resolves to the default preset, not a not-found error
    let assert = env.hive().args(["presets", "show", "none"]).assert().success();
    let json = parse_stdout(&assert.get_output().stdout);
    assert_eq!(json["topology"], "hierarchical");

    env.hive()
        .args(["presets", "show", "ghost-preset"])
        .assert()
        .failure();
}

#[test]
fn test_catalog_extension_file_layering() {
    let env = TestEnv::new();
    let extension = env.write_file(
        "extra.kdl",
        r#"
        agent "security-auditor" {
            name "Security Auditor"
            category "quality"
            role "worker"
            capability "audit"
            verification {
                check "audit"
                truth-threshold 0.95
                max-files 5
            }
        }
        preset "audit" {
            name "Security audit sweep"
            topology "star"
            agent "security-auditor" required=#true tier="opus"
            max-agents 4
            strategy "analysis"
        }
        "#,
    );

    // The new agent resolves and is usable in synthesis
    env.hive()
        .args([
            "--catalog",
            extension.to_str().unwrap(),
            "agents",
            "show",
            "security-auditor",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("security-auditor"));

    let assert = env
        .hive()
        .args([
            "--catalog",
            extension.to_str().unwrap(),
            "synthesize",
            "--preset",
            "audit",
            "--task",
            "audit the tree",
        ])
        .assert()
        .success();

    let json = parse_stdout(&assert.get_output().stdout);
    let config = &json["config"];
    assert_eq!(config["agents"]["selected"], serde_json::json!(["security-auditor"]));
    assert_eq!(config["orchestrator"]["topology"], "star");
    assert_eq!(config["orchestrator"]["strategy"], "analysis");
    assert_eq!(
        config["agents"]["specializations"]["security-auditor"]["tier"],
        "opus"
    );

    // Without the extension the agent does not exist
    env.hive()
        .args(["agents", "show", "security-auditor"])
        .assert()
        .failure();
}

#[test]
fn test_malformed_catalog_extension_is_fatal() {
    let env = TestEnv::new();
    let extension = env.write_file(
        "broken.kdl",
        r#"
        agent "broken" {
            role "drone"
        }
        "#,
    );

    env.hive()
        .args(["--catalog", extension.to_str().unwrap(), "agents", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("drone"));
}

#[test]
fn test_version_reports_schema() {
    let env = TestEnv::new();

    let assert = env.hive().args(["version"]).assert().success();
    let json = parse_stdout(&assert.get_output().stdout);
    assert_eq!(json["schemaVersion"], "2.0.0");
    assert!(json["version"].is_string());
}
