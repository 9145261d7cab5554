use classforge::roster::load_roster;
use regex::Regex;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

const COLUMN: &str = "STEP3_SCENARIO_1";

struct TestContext {
    dir: TempDir,
    roster_path: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let roster_path = dir.path().join("roster.csv");

        let mut f = File::create(&roster_path).unwrap();
        writeln!(f, "name,gender,good_knowledge,friends,broken_friendship,{}", COLUMN).unwrap();
        writeln!(f, "P1,B,Y,,false,A1").unwrap();
        writeln!(f, "P2,G,N,,false,A1").unwrap();
        writeln!(f, "B1,B,Y,B2,false,").unwrap();
        writeln!(f, "B2,B,Y,B1,false,").unwrap();
        writeln!(f, "G1,G,N,G2,false,").unwrap();
        writeln!(f, "G2,G,N,G1,false,").unwrap();

        Self { dir, roster_path }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_classforge"))
        .args(args)
        .output()
        .expect("Failed to execute classforge")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_solve_prints_ranked_scenarios() {
    let ctx = TestContext::new();
    let output = run(&[
        "solve",
        "--roster",
        ctx.roster_path.to_str().unwrap(),
        "--column",
        COLUMN,
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let out = stdout(&output);
    assert!(out.contains("Best scenario placements"), "{}", out);
    let best_row = Regex::new(r"B1 \+ B2\s*\|\s*A2").unwrap();
    assert!(best_row.is_match(&out), "{}", out);
    let girls_row = Regex::new(r"G1 \+ G2\s*\|\s*A2").unwrap();
    assert!(girls_row.is_match(&out), "{}", out);
}

#[test]
fn test_solve_writes_csv_and_json() {
    let ctx = TestContext::new();
    let out_csv = ctx.path("out.csv");
    let out_json = ctx.path("out.json");

    let output = run(&[
        "solve",
        "-r",
        ctx.roster_path.to_str().unwrap(),
        "-c",
        COLUMN,
        "--out",
        out_csv.to_str().unwrap(),
        "--json",
        out_json.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let roster = load_roster(&out_csv).unwrap();
    assert!(roster.has_column("STEP4_SCENARIO_1"));
    assert!(roster.has_column("STEP4_SCENARIO_2"));
    assert_eq!(roster.placement("G2", "STEP4_SCENARIO_1"), Some("A2"));
    assert_eq!(roster.placement("G2", "STEP4_SCENARIO_2"), Some("A1"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_json).unwrap()).unwrap();
    assert_eq!(json[0]["column"], COLUMN);
    assert_eq!(json[0]["scenarios"].as_array().unwrap().len(), 2);
}

#[test]
fn test_max_results_flag() {
    let ctx = TestContext::new();
    let out_json = ctx.path("one.json");
    let output = run(&[
        "solve",
        "-r",
        ctx.roster_path.to_str().unwrap(),
        "-c",
        COLUMN,
        "--max-results",
        "1",
        "--json",
        out_json.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_json).unwrap()).unwrap();
    assert_eq!(json[0]["scenarios"].as_array().unwrap().len(), 1);
}

#[test]
fn test_config_file_is_applied() {
    let ctx = TestContext::new();
    let config_path = ctx.path("config.json");
    fs::write(
        &config_path,
        r#"{ "export": { "scenario_prefix": "FINAL_" }, "search": { "max_results": 1 } }"#,
    )
    .unwrap();
    let out_csv = ctx.path("out.csv");

    let output = run(&[
        "--config",
        config_path.to_str().unwrap(),
        "solve",
        "-r",
        ctx.roster_path.to_str().unwrap(),
        "-c",
        COLUMN,
        "-o",
        out_csv.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let roster = load_roster(&out_csv).unwrap();
    assert!(roster.has_column("FINAL_1"));
    assert!(!roster.has_column("FINAL_2"));
}

#[test]
fn test_unknown_column_fails() {
    let ctx = TestContext::new();
    let output = run(&[
        "solve",
        "-r",
        ctx.roster_path.to_str().unwrap(),
        "-c",
        "NOPE",
    ]);
    assert!(!output.status.success());
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("NOPE"), "{}", err);
}

#[test]
fn test_pairs_audit() {
    let ctx = TestContext::new();
    let output = run(&[
        "pairs",
        "-r",
        ctx.roster_path.to_str().unwrap(),
        "-c",
        COLUMN,
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let out = stdout(&output);
    assert!(out.contains("PAIR AUDIT"), "{}", out);
    assert!(out.contains("Good Knowledge (Boys)"), "{}", out);
    assert!(out.contains("Not Good Knowledge (Girls)"), "{}", out);
    assert!(out.contains("No preserved pairs"), "{}", out);
}

#[test]
fn test_generate_then_solve() {
    let ctx = TestContext::new();
    let generated = ctx.path("synthetic.csv");

    let output = run(&[
        "generate",
        "-n",
        "30",
        "--seed",
        "7",
        "-o",
        generated.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let roster = load_roster(&generated).unwrap();
    assert_eq!(roster.len(), 30);
    assert_eq!(roster.columns(), &[COLUMN]);

    let output = run(&[
        "solve",
        "-r",
        generated.to_str().unwrap(),
        "-c",
        COLUMN,
        "--max-nodes",
        "5000",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let summary = Regex::new(r"Column 'STEP3_SCENARIO_1': 2 classes, \d+ mutual pair").unwrap();
    assert!(summary.is_match(&stdout(&output)));
}
