use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const PAPERS: &str = r#"{"id": 1, "authors": ["ann", "bob"], "venue": ["kdd"]}
{"id": 2, "authors": ["ann"], "venue": ["kdd"]}
{"id": 3, "authors": ["bob", "cy"], "venue": ["www"]}
{"id": 4, "authors": ["dee"], "venue": ["www"]}
"#;

#[test]
fn test_cli_writes_similarities() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("papers.jsonl");
    let output = dir.path().join("sims.txt");
    fs::write(&input, PAPERS)?;

    let mut cmd = Command::cargo_bin("starsim")?;
    cmd.arg("--data")
        .arg(&input)
        .args(["-M", "authors_venue", "-W", "pub", "-N", "2000", "--workers", "2", "--seed", "9"])
        .arg("-o")
        .arg(&output);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("self-loop rate"));

    let text = fs::read_to_string(&output)?;
    assert!(!text.is_empty());
    for line in text.lines() {
        let parts: Vec<&str> = line.split(' ').collect();
        assert_eq!(parts.len(), 3);
        let score: f64 = parts[2].parse()?;
        assert!(score > 0.0 && score <= 1.0);
    }
    assert!(text.contains("P_1 P_2 "));
    Ok(())
}

#[test]
fn test_cli_seed_is_reproducible() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("papers.jsonl");
    fs::write(&input, PAPERS)?;

    let mut outputs = Vec::new();
    for (i, workers) in ["1", "3"].iter().enumerate() {
        let output = dir.path().join(format!("sims{i}.txt"));
        Command::cargo_bin("starsim")?
            .arg("--data")
            .arg(&input)
            .args(["-M", "authors_venue", "-W", "meta", "-N", "500", "--cpus", workers, "--seed", "1"])
            .arg("--outfile")
            .arg(&output)
            .assert()
            .success();
        outputs.push(fs::read_to_string(&output)?);
    }
    assert_eq!(outputs[0], outputs[1]);
    Ok(())
}

#[test]
fn test_cli_rejects_colliding_letters() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("papers.jsonl");
    let output = dir.path().join("sims.txt");
    fs::write(&input, PAPERS)?;

    Command::cargo_bin("starsim")?
        .arg("--data")
        .arg(&input)
        .args(["-M", "authors_pages", "-W", "p", "-N", "10", "--workers", "1"])
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("type letters collide"));

    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_cli_rejects_zero_walks() -> Result<(), Box<dyn std::error::Error>> {
    Command::cargo_bin("starsim")?
        .args(["--data", "x.jsonl", "-M", "authors", "-W", "p", "-o", "out.txt", "-N", "0", "--workers", "1"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn test_cli_malformed_record_aborts() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("papers.jsonl");
    let output = dir.path().join("sims.txt");
    fs::write(&input, "{\"id\": 1, \"authors\": [\"a\"]}\n{\"authors\": [\"a\"]}\n")?;

    Command::cargo_bin("starsim")?
        .arg("--data")
        .arg(&input)
        .args(["-M", "authors", "-W", "p", "-N", "10", "--workers", "1"])
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));

    assert!(!output.exists());
    Ok(())
}
