use std::fs;
use std::path::Path;

use assert_cmd::Command;
use handsim_cli::config::SimulatorConfig;
use handsim_cli::runner::SimulationRunner;
use predicates::prelude::*;
use tempfile::tempdir;

const YDK: &str = "#created by smoke test
#main
1000
1000
1000
2000
2000
2000
3000
3000
3000
4000
4000
4000
5000
5000
5000
6000
6000
6000
7000
7000
8000
9000
9000
9001
9002
9002
9003
9003
9003
9004
9004
9004
9005
9005
9005
9006
9006
9006
9007
9007
#extra
8888
#side
9999
";

fn write_fixture(dir: &Path, trials: u32) -> std::path::PathBuf {
    fs::write(dir.join("deck.ydk"), YDK).expect("write ydk");
    let yaml = format!(
        r#"
run_id: "smoke"
hand_size: 5
deck:
  ydk: "deck.ydk"
  declared_size: 40
  categories:
    "1000": engine
    "2000": engine
    "3000": engine
    "4000": engine
    "5000": handtrap
    "6000": handtrap
    "7000": handtrap
    "8000": brick
queries:
  - kind: at_least
    category: engine
    count: 1
  - kind: combined
    thresholds:
      engine: 1
      handtrap: 1
report:
  matrix:
    row: engine
    column: handtrap
simulation:
  seed: 4242
  sample_hands: 3
  trials: {trials}
logging:
  enable_structured: false
"#
    );
    let path = dir.join("handsim.yaml");
    fs::write(&path, yaml).expect("write config");
    path
}

#[test]
fn ydk_config_runs_end_to_end() {
    let dir = tempdir().expect("temp dir");
    let path = write_fixture(dir.path(), 1_000);

    let config = SimulatorConfig::from_path(&path).expect("config loads");
    assert_eq!(config.deck.ydk.as_deref(), Some(dir.path().join("deck.ydk").as_path()));

    let runner = SimulationRunner::new(config).expect("runner created");
    assert_eq!(runner.deck().category_total(&"engine".into()), 12);
    assert_eq!(runner.deck().category_total(&"other".into()), 19);

    let report = runner.run().expect("run completes");
    assert_eq!(report.deck.size, 40);
    assert!((report.queries[0].probability - 0.8506).abs() < 1e-4);
    assert_eq!(report.brick.copies, 1);
    assert_eq!(report.sample_hands.len(), 3);

    let text = report.render_text();
    assert!(text.contains("# Opening Hands: smoke"));
    assert!(text.contains("| at least 1 engine | 85.06% |"));
    // 12 engine copies in 40 cards, 5 drawn
    assert!(text.contains("| engine | 12 | 1.50 |"));
}

#[test]
fn binary_prints_markdown_report() {
    let dir = tempdir().expect("temp dir");
    let path = write_fixture(dir.path(), 0);

    Command::cargo_bin("handsim")
        .expect("binary built")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("| at least 1 engine | 85.06% | - | - | - |"))
        .stdout(predicate::str::contains("## Sample hands"));
}

#[test]
fn binary_writes_json_with_overrides() {
    let dir = tempdir().expect("temp dir");
    let path = write_fixture(dir.path(), 0);
    let output = dir.path().join("report.json");

    Command::cargo_bin("handsim")
        .expect("binary built")
        .args(["--hand-size", "6", "--trials", "200", "--json", "--output"])
        .arg(&output)
        .arg("--config")
        .arg(&path)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).expect("report written"))
            .expect("report is JSON");
    assert_eq!(json["hand_size"], 6);
    assert_eq!(json["queries"][0]["simulation"]["trials"], 200);
    assert_eq!(json["sample_hands"][0]["cards"].as_array().map(Vec::len), Some(6));
}

#[test]
fn validate_only_skips_the_run() {
    let dir = tempdir().expect("temp dir");
    let path = write_fixture(dir.path(), 0);

    Command::cargo_bin("handsim")
        .expect("binary built")
        .arg("--config")
        .arg(&path)
        .arg("--validate-only")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("40 cards in 4 categories"))
        .stderr(predicate::str::contains(format!(
            "handsim {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn structured_log_goes_to_configured_file() {
    let dir = tempdir().expect("temp dir");
    let path = write_fixture(dir.path(), 0);
    let log_path = dir.path().join("logs").join("run.jsonl");
    let yaml = fs::read_to_string(&path).expect("config readable").replace(
        "  enable_structured: false\n",
        &format!(
            "  enable_structured: true\n  tracing_level: info\n  path: \"{}\"\n",
            log_path.display()
        ),
    );
    fs::write(&path, yaml).expect("rewrite config");

    Command::cargo_bin("handsim")
        .expect("binary built")
        .arg("--config")
        .arg(&path)
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("Structured log:"));

    let log = fs::read_to_string(&log_path).expect("log written");
    assert!(log.contains("\"run_id\":\"smoke\""));
    assert!(log.contains("query answered"));
}

#[test]
fn invalid_deck_fails_with_message() {
    let dir = tempdir().expect("temp dir");
    let path = write_fixture(dir.path(), 0);
    fs::write(dir.path().join("deck.ydk"), "#main\n1\n1\n1\n1\n").expect("overwrite ydk");

    Command::cargo_bin("handsim")
        .expect("binary built")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("appears 4 times"));
}
