use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn passages_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("create-passages");
    path
}

fn doc(id: &str, text: &str) -> String {
    serde_json::json!({
        "id": id,
        "revid": "1",
        "url": format!("https://en.wikipedia.org/wiki?curid={}", id),
        "title": format!("Title {}", id),
        "text": text,
    })
    .to_string()
}

/// WikiExtractor-style layout: text/AA/wiki_00, text/AA/wiki_01.gz, text/AB/wiki_00
fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let text_dir = tmp.path().join("text");
    fs::create_dir_all(text_dir.join("AA")).unwrap();
    fs::create_dir_all(text_dir.join("AB")).unwrap();

    let long = |c: &str| c.repeat(310);

    fs::write(
        text_dir.join("AA/wiki_00"),
        [
            doc("10", "Para one is short.\n\nThis second paragraph is intentionally long enough on its own to exceed the one-hundred character target_passage_length threshold set for this specific test case."),
            doc("11", &format!("{}\n\n{}", long("a"), long("b"))),
        ]
        .join("\n"),
    )
    .unwrap();

    let gz = File::create(text_dir.join("AA/wiki_01.gz")).unwrap();
    let mut enc = GzEncoder::new(gz, Compression::default());
    writeln!(enc, "{}", doc("12", &format!("Caf\u{e9} {}", long("c")))).unwrap();
    enc.finish().unwrap();

    fs::write(
        text_dir.join("AB/wiki_00"),
        format!("{}\n{}\n", doc("13", "   "), doc("14", &long("d"))),
    )
    .unwrap();

    (tmp, text_dir)
}

fn run_passages(input: &Path, output: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = passages_binary();
    let output = Command::new(&binary)
        .arg("--wikiextracted")
        .arg(input)
        .arg("--output")
        .arg(output)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run create-passages at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn read_shards(dir: &Path) -> Vec<(usize, serde_json::Value)> {
    let mut out = Vec::new();
    for i in 0.. {
        let path = dir.join(format!("{}.jsonl.gz", i));
        if !path.exists() {
            break;
        }
        let reader = BufReader::new(MultiGzDecoder::new(File::open(&path).unwrap()));
        for line in reader.lines() {
            out.push((i, serde_json::from_str(&line.unwrap()).unwrap()));
        }
    }
    out
}

#[test]
fn test_default_run() {
    let (tmp, input) = setup_test_env();
    let out = tmp.path().join("passages");

    let (stdout, stderr, success) = run_passages(&input, &out, &["--progress", "off"]);
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("input files: 3"));
    assert!(stdout.contains("documents: 5"));
    // Doc 10 is too short for the default 300-character target.
    assert!(stdout.contains("passages written: 4"));
    assert!(stdout.contains("ok"));

    let records = read_shards(&out);
    let ids: Vec<&str> = records
        .iter()
        .map(|(_, r)| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["11", "11", "12", "14"]);

    let cafe = records[2].1["contents"].as_str().unwrap();
    assert!(cafe.starts_with("Cafe "));
    for (_, r) in &records {
        let obj = r.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj.contains_key("contents"));
    }
}

#[test]
fn test_custom_lengths() {
    let (tmp, input) = setup_test_env();
    let out = tmp.path().join("passages");

    let (stdout, stderr, success) = run_passages(
        &input.join("AA/wiki_00"),
        &out,
        &[
            "--min_length",
            "10",
            "--target_passage_length",
            "100",
            "--progress",
            "off",
        ],
    );
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);

    let records = read_shards(&out);
    assert_eq!(
        records[0].1["contents"].as_str().unwrap(),
        "Para one is short.\n\nThis second paragraph is intentionally long enough on its own to exceed the one-hundred character target_passage_length threshold set for this specific test case."
    );
    assert_eq!(records.len(), 3);
}

#[test]
fn test_shard_rotation() {
    let (tmp, input) = setup_test_env();
    let out = tmp.path().join("passages");

    let (stdout, stderr, success) =
        run_passages(&input, &out, &["--shard-size", "3", "--progress", "off"]);
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("shards: 2"));

    let records = read_shards(&out);
    let shard_of: Vec<usize> = records.iter().map(|(i, _)| *i).collect();
    assert_eq!(shard_of, vec![0, 0, 0, 1]);
}

#[test]
fn test_glob_input() {
    let (tmp, input) = setup_test_env();
    let out = tmp.path().join("passages");
    let pattern = format!("{}/AB/*", input.display());

    let (stdout, stderr, success) = run_passages(Path::new(&pattern), &out, &["--progress", "off"]);
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("input files: 1"));
    assert!(stdout.contains("passages written: 1"));
}

#[test]
fn test_histogram_reported_on_stderr() {
    let (tmp, input) = setup_test_env();
    let out = tmp.path().join("passages");

    let (_, stderr, success) = run_passages(&input, &out, &["--progress", "human"]);
    assert!(success);
    assert!(
        stderr.contains("Passage length 256-511: 4"),
        "unexpected stderr: {}",
        stderr
    );
}

#[test]
fn test_histogram_in_summary_without_progress() {
    let (tmp, input) = setup_test_env();
    let out = tmp.path().join("passages");

    let (stdout, stderr, success) = run_passages(&input, &out, &[]);
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(
        stdout.contains("Passage length 256-511: 4"),
        "unexpected stdout: {}",
        stdout
    );
}

#[test]
fn test_json_progress() {
    let (tmp, input) = setup_test_env();
    let out = tmp.path().join("passages");

    let (_, stderr, success) = run_passages(&input, &out, &["--progress", "json"]);
    assert!(success);
    let events: Vec<serde_json::Value> = stderr
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let buckets: Vec<&serde_json::Value> = events
        .iter()
        .filter(|e| e["event"] == "length_bucket")
        .collect();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0]["lo"], 256);
    assert_eq!(buckets[0]["count"], 4);
}

#[test]
fn test_config_file_with_override() {
    let (tmp, input) = setup_test_env();
    let out = tmp.path().join("passages");
    let config_path = tmp.path().join("passages.toml");
    fs::write(
        &config_path,
        "[passages]\ntarget_passage_length = 100\nmin_length = 10\n\n[output]\nshard_size = 1\n",
    )
    .unwrap();

    let (stdout, stderr, success) = run_passages(
        &input.join("AA/wiki_00"),
        &out,
        &[
            "--config",
            config_path.to_str().unwrap(),
            "--shard_size",
            "2",
            "--progress",
            "off",
        ],
    );
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("passages written: 3"));
    assert!(stdout.contains("shards: 2"));
}

#[test]
fn test_malformed_input_fails() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("wiki_00");
    fs::write(&input, format!("{}\n{{\"id\": \"2\"}}\n", doc("1", "x"))).unwrap();

    let (_, stderr, success) = run_passages(&input, &tmp.path().join("out"), &["--progress", "off"]);
    assert!(!success);
    assert!(stderr.contains("line 2"), "unexpected stderr: {}", stderr);
}

#[test]
fn test_missing_input_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, _, success) = run_passages(
        &tmp.path().join("does-not-exist"),
        &tmp.path().join("out"),
        &["--progress", "off"],
    );
    assert!(!success);
}

#[test]
fn test_empty_output_when_nothing_qualifies() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("wiki_00");
    fs::write(&input, format!("{}\n", doc("1", "tiny"))).unwrap();
    let out = tmp.path().join("out");

    let (stdout, _, success) = run_passages(&input, &out, &["--progress", "off"]);
    assert!(success);
    assert!(stdout.contains("passages written: 0"));
    assert!(stdout.contains("shards: 0"));
    assert!(out.is_dir());
    assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
}
