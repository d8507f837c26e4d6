use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(fixtures: Value) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("fixtures.json"), fixtures.to_string()).unwrap();
        Self { dir }
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("questions.json")
    }

    fn fixtures(&self) -> PathBuf {
        self.dir.path().join("fixtures.json")
    }

    fn raw_cmd(&self) -> Command {
        let path = assert_cmd::cargo::cargo_bin!("faq-dedup");
        let mut cmd = Command::new(path);
        for var in [
            "FAQ_DB_PATH",
            "FAQ_EMBEDDER",
            "FAQ_FIXTURES",
            "FAQ_THRESHOLD",
            "OPENAI_API_KEY",
            "OPENAI_BASE_URL",
        ] {
            cmd.env_remove(var);
        }
        cmd.arg("--db-path").arg(self.db());
        cmd
    }

    fn fixture_cmd(&self) -> Command {
        let mut cmd = self.raw_cmd();
        cmd.arg("--embedder")
            .arg("fixture")
            .arg("--fixtures")
            .arg(self.fixtures());
        cmd
    }

    fn cmd(&self) -> Command {
        let mut cmd = self.fixture_cmd();
        cmd.arg("--output").arg("json");
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let assert = self.cmd().args(args).assert().success();
        serde_json::from_slice(&assert.get_output().stdout).unwrap()
    }

    fn check(&self, text: &str) -> Value {
        self.json(&["check", "--text", text])
    }
}

fn cluster_count(db: &Path) -> usize {
    let raw = std::fs::read_to_string(db).unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();
    doc["clusters"].as_array().unwrap().len()
}

#[test]
fn similar_pair_forms_cluster() {
    let ws = Workspace::new(json!({"A": [1.0, 0.0], "B": [0.99, 0.14]}));

    let first = ws.check("A");
    assert_eq!(first["status"], "new");
    assert_eq!(first["cluster_count"], 0);

    let second = ws.check("B");
    assert_eq!(second["status"], "matched");
    assert_eq!(second["cluster_count"], 2);
    assert_eq!(second["similar_questions"], json!(["A", "B"]));
    assert_eq!(second["faq_drafted"], false);
    assert_eq!(cluster_count(&ws.db()), 1);
}

#[test]
fn orthogonal_questions_stay_new() {
    let ws = Workspace::new(json!({"A": [1.0, 0.0], "B": [0.0, 1.0]}));

    assert_eq!(ws.check("A")["status"], "new");
    assert_eq!(ws.check("B")["status"], "new");
    assert_eq!(cluster_count(&ws.db()), 0);
}

#[test]
fn third_question_grows_same_cluster() {
    let ws = Workspace::new(json!({
        "A": [1.0, 0.0],
        "B": [0.99, 0.14],
        "C": [0.98, 0.2]
    }));
    ws.check("A");
    let formed = ws.check("B");
    let joined = ws.check("C");

    assert_eq!(joined["cluster_id"], formed["cluster_id"]);
    assert_eq!(joined["cluster_count"], 3);
    assert_eq!(joined["similar_questions"], json!(["A", "B", "C"]));
    assert_eq!(cluster_count(&ws.db()), 1);
}

#[test]
fn mark_drafted_is_idempotent_and_reported_on_join() {
    let ws = Workspace::new(json!({
        "A": [1.0, 0.0],
        "B": [0.99, 0.14],
        "C": [0.98, 0.2]
    }));
    ws.check("A");
    let id = ws.check("B")["cluster_id"].as_u64().unwrap().to_string();

    assert_eq!(ws.json(&["mark-drafted", &id])["status"], "ok");
    assert_eq!(ws.json(&["mark-drafted", &id])["status"], "ok");

    let clusters = ws.json(&["clusters"]);
    assert_eq!(clusters[0]["faq_drafted"], true);
    assert_eq!(ws.check("C")["faq_drafted"], true);
}

#[test]
fn mark_drafted_unknown_cluster_fails() {
    let ws = Workspace::new(json!({}));
    ws.cmd()
        .args(["mark-drafted", "41"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cluster not found: 41"));
}

#[test]
fn reset_makes_questions_new_again() {
    let ws = Workspace::new(json!({"A": [1.0, 0.0], "B": [0.99, 0.14]}));
    ws.check("A");
    assert_eq!(ws.check("B")["status"], "matched");

    assert_eq!(ws.json(&["reset"])["status"], "cleared");
    assert_eq!(ws.json(&["clusters"]), json!([]));
    assert_eq!(ws.check("B")["status"], "new");
}

#[test]
fn debug_lists_scores_descending() {
    let ws = Workspace::new(json!({
        "A": [1.0, 0.0],
        "B": [0.0, 1.0],
        "query": [0.6, 0.8]
    }));
    ws.check("A");
    ws.check("B");

    let scores = ws.json(&["debug", "--text", "query"]);
    let scores = scores.as_array().unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0]["text"], "B");
    assert_eq!(scores[1]["text"], "A");
    assert!(scores[0]["similarity"].as_f64().unwrap() > scores[1]["similarity"].as_f64().unwrap());
}

#[test]
fn provider_failure_stores_nothing() {
    let ws = Workspace::new(json!({"A": [1.0, 0.0]}));
    ws.check("A");

    ws.cmd()
        .args(["check", "--text", "not in fixtures"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Embedding provider error"));

    let raw = std::fs::read_to_string(ws.db()).unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["questions"].as_array().unwrap().len(), 1);
}

#[test]
fn text_output_for_new_question() {
    let ws = Workspace::new(json!({"A": [1.0, 0.0]}));
    ws.fixture_cmd()
        .args(["check", "--text", "A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: new"));
}

#[test]
fn openai_without_key_is_rejected() {
    let ws = Workspace::new(json!({}));
    ws.raw_cmd()
        .args(["--embedder", "openai", "check", "--text", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn unknown_output_format_writes_nothing() {
    let ws = Workspace::new(json!({"A": [1.0, 0.0]}));
    ws.fixture_cmd()
        .args(["--output", "yaml", "check", "--text", "A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown output format: yaml"));

    assert!(!ws.db().exists());
}
