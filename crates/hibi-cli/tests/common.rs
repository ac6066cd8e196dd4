#![allow(dead_code)]
use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    _dir: TempDir,
    pub db: PathBuf,
    pub cfg: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = dir.path().join("config");
        std::fs::create_dir_all(&cfg).expect("cfg dir");
        let db = dir.path().join("hibi.db");
        Self { _dir: dir, db, cfg }
    }

    pub fn bin(&self) -> Command {
        let mut cmd = Command::cargo_bin("hibi-cli").unwrap();
        // keep the test run away from any real user settings
        cmd.env("XDG_CONFIG_HOME", &self.cfg);
        cmd.arg("--db").arg(&self.db);
        cmd
    }

    pub fn add(&self, date: &str, title: &str, extra: &[&str]) {
        self.bin()
            .args(["add", date, "--title", title])
            .args(extra)
            .assert()
            .success();
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
