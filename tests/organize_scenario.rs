use std::fs;

use predicates::prelude::*;
use promptharvest::extract::ALL_TEXTS_FILE_NAME;

#[test]
fn guide_contains_only_texts_over_the_threshold() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let texts_dir = temp.path().join("contents");
    fs::create_dir_all(&texts_dir)?;
    fs::write(texts_dir.join("a.txt"), "x".repeat(180))?;
    fs::write(texts_dir.join("b.txt"), "y".repeat(90))?;
    fs::write(texts_dir.join(ALL_TEXTS_FILE_NAME), "z".repeat(500))?;

    let out = temp.path().join("guide").join("prompts.md");
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("promptharvest");
    cmd.env_remove("RUST_LOG")
        .args([
            "organize",
            "--texts-dir",
            texts_dir.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--min-length",
            "150",
        ])
        .assert()
        .success();

    let guide = fs::read_to_string(&out)?;
    assert!(guide.contains("## a\n"));
    assert!(!guide.contains("## b"));
    assert!(!guide.contains("all_extracted_texts"));
    assert_eq!(guide.matches("\n## ").count(), 1);

    Ok(())
}

#[test]
fn sections_follow_file_name_order() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let texts_dir = temp.path().join("contents");
    fs::create_dir_all(&texts_dir)?;
    // Written in reverse name order: sections must come from names, not
    // creation time.
    fs::write(texts_dir.join("z.txt"), "x".repeat(200))?;
    fs::write(texts_dir.join("m.txt"), "y".repeat(200))?;

    let out = temp.path().join("prompts.md");
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("promptharvest");
    cmd.env_remove("RUST_LOG")
        .args([
            "organize",
            "--texts-dir",
            texts_dir.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--min-length",
            "150",
        ])
        .assert()
        .success();

    let guide = fs::read_to_string(&out)?;
    let m = guide.find("## m\n").expect("section m");
    let z = guide.find("## z\n").expect("section z");
    assert!(m < z);

    Ok(())
}

#[test]
fn missing_texts_dir_skips_generation() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let out = temp.path().join("guide").join("prompts.md");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("promptharvest");
    cmd.env_remove("RUST_LOG")
        .args([
            "organize",
            "--texts-dir",
            temp.path().join("missing").to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--min-length",
            "150",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping guide generation"));

    assert!(!out.exists());

    Ok(())
}
