use predicates::prelude::*;
use serial_test::serial;

use super::common::TestEnv;

#[test]
#[serial]
fn single_tag_is_archived_and_logged() {
  let env = TestEnv::new();

  env
    .build_cmd()
    .arg("1.0.0")
    .assert()
    .success()
    .stdout(predicate::str::contains("1.0.0 built"));

  let index = std::fs::read_to_string(env.artifact("1.0.0").join("index.html")).unwrap();
  assert_eq!(index.trim(), "<html>demo</html>");
  assert!(env.artifact("1.0.0").join("_static").is_dir());
  assert!(!env.source_path().join("docs").join("build").join("html").exists());

  let log = std::fs::read_to_string(env.log("1.0.0")).unwrap();
  assert!(log.contains("Running Sphinx for demo"));
  assert!(log.contains("git: checkout 1.0.0"));
  assert!(log.contains("pip: -m pip install -e ."));

  assert!(!env.env_dir().exists());
}

#[test]
#[serial]
fn tags_are_built_in_order() {
  let env = TestEnv::new();

  env.build_cmd().args(["1.0.0", "1.1.0"]).assert().success();

  assert!(env.artifact("1.0.0").join("index.html").is_file());
  assert!(env.artifact("1.1.0").join("index.html").is_file());
  assert!(env.log("1.0.0").is_file());
  assert!(env.log("1.1.0").is_file());
  assert!(!env.env_dir().exists());
}

#[test]
#[serial]
fn rebuild_replaces_existing_artifact() {
  let env = TestEnv::new();
  env.build_cmd().arg("1.0.0").assert().success();
  std::fs::write(env.artifact("1.0.0").join("stale.html"), "old").unwrap();

  env.build_cmd().arg("1.0.0").assert().success();

  assert!(!env.artifact("1.0.0").join("stale.html").exists());
  assert!(env.artifact("1.0.0").join("index.html").is_file());
  assert!(!env.env_dir().exists());
}

#[test]
#[serial]
fn failing_checkout_stops_the_run() {
  let env = TestEnv::new();

  env
    .build_cmd()
    .args(["9.9.9", "1.0.0"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("9.9.9: checkout failed"))
    .stderr(predicate::str::contains("1 of 2 tag(s) failed"));

  assert!(!env.artifact("9.9.9").exists());
  assert!(!env.artifact("1.0.0").exists());
  assert!(!env.log("1.0.0").exists());
  assert!(!env.env_dir().exists());

  let log = std::fs::read_to_string(env.log("9.9.9")).unwrap();
  assert!(log.contains("pathspec '9.9.9' did not match"));
}

#[test]
#[serial]
fn keep_going_builds_remaining_tags() {
  let env = TestEnv::new();

  env
    .build_cmd()
    .args(["9.9.9", "1.0.0", "--keep-going"])
    .assert()
    .failure()
    .stdout(predicate::str::contains("1.0.0 built"));

  assert!(env.artifact("1.0.0").join("index.html").is_file());
  assert!(!env.artifact("9.9.9").exists());
}

#[test]
#[serial]
fn json_report_lists_outcomes() {
  let env = TestEnv::new();

  let output = env.build_cmd().args(["1.0.0", "-o", "json"]).output().unwrap();

  assert!(output.status.success());
  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let outcome = &report["outcomes"][0];
  assert_eq!(outcome["tag"], "1.0.0");
  assert_eq!(outcome["status"], "built");
  assert!(outcome["artifact_bytes"].as_u64().unwrap() > 0);
}
