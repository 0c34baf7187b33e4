use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_grammardoc")));
    cmd.env_remove("GRAMMARDOC_LOG");
    cmd
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn read(path: impl AsRef<std::path::Path>) -> String {
    std::fs::read_to_string(path).unwrap()
}

// -- stdin mode --

#[test]
fn stdin_mode_produces_markdown() {
    let input = read(fixture_path("Calls.xtext"));

    let assert = cmd().write_stdin(input).assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(output.starts_with("# Calls\n"));
    assert!(output.contains("### A\n"));
    assert!(output.contains("Rule A"));
    assert!(output.contains("* [B](#b)"));
}

#[test]
fn stdin_mode_dot_format() {
    let input = read(fixture_path("Calls.xtext"));

    let assert = cmd().args(["-f", "dot"]).write_stdin(input).assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(output.starts_with("digraph \"test.Calls\" {"));
    assert_eq!(output.matches("\"A\" -> \"B\";").count(), 1);
    assert_eq!(output.matches("\"Twice\" -> \"B\";").count(), 2);
    assert_eq!(output.matches("\"Rec\" -> \"Rec\";").count(), 1);
}

#[test]
fn stdin_mode_collapsed_edges() {
    let input = read(fixture_path("Calls.xtext"));

    let assert = cmd()
        .args(["-f", "dot", "--collapse-edges"])
        .write_stdin(input)
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(output.matches("\"Twice\" -> \"B\";").count(), 1);
}

#[test]
fn stdin_mode_guarded_alternatives() {
    let input = "grammar t.Guards\nExpr<In>: <In> 'in' Other | <!In> Other<In>;\nOther<In>: \"'\";";

    cmd()
        .write_stdin(input)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Expr<In>:\n    <In> 'in' Other\n    | <!In> Other<In>;")
                .and(predicate::str::contains("Other<In>:\n    \"'\";")),
        );
}

#[test]
fn stdin_mode_reports_parse_error() {
    cmd()
        .write_stdin("grammar t.G\nA: 'x'")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse grammar from stdin"));
}

// -- file mode --

#[test]
fn file_mode_creates_output() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap(), &fixture_path("Domainmodel.xtext")])
        .assert()
        .success();

    let output = read(dir.path().join("Domainmodel.md"));
    assert!(output.starts_with("# Domainmodel\n\nEntities, data types and packages.\n"));
    assert!(output.contains("### Entity\n"));
    assert!(output.contains("* [Feature](#feature)"));
    assert!(output.contains("`ID` _(unresolved)_"));
    assert!(output.contains("**Deprecated:** visibility is ignored by the generator"));
    assert!(!dir.path().join("Domainmodel.dot").exists());
}

#[test]
fn file_mode_with_graph() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "--graph", &fixture_path("Calls.xtext")])
        .assert()
        .success();

    assert!(dir.path().join("Calls.md").exists());
    let graph = read(dir.path().join("Calls.dot"));
    assert!(graph.contains("  \"A\" [label=\"A\"];"));
    assert!(graph.contains("  \"B\" [label=\"B\"];"));
    assert!(graph.contains("  \"A\" -> \"B\";"));
}

#[test]
fn file_mode_extension_matches_format() {
    for (format, ext) in [("html", "html"), ("text", "txt"), ("json", "json"), ("dot", "dot")] {
        let dir = TempDir::new().unwrap();

        cmd()
            .args(["-o", dir.path().to_str().unwrap(), "-f", format, &fixture_path("Calls.xtext")])
            .assert()
            .success();

        let path = dir.path().join(format!("Calls.{}", ext));
        assert!(path.exists(), "missing {}", path.display());
    }
}

#[test]
fn file_mode_json_is_parseable() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "-f", "json", &fixture_path("Domainmodel.xtext")])
        .assert()
        .success();

    let value: serde_json::Value = serde_json::from_str(&read(dir.path().join("Domainmodel.json"))).unwrap();
    assert_eq!(value["name"], "org.example.domainmodel.Domainmodel");
    assert_eq!(value["rules"].as_array().unwrap().len(), 11);
}

#[test]
fn file_mode_skips_broken_grammar() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args([
            "-o",
            dir.path().to_str().unwrap(),
            &fixture_path("Broken.xtext"),
            &fixture_path("Calls.xtext"),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping").and(predicate::str::contains("Broken.xtext")));

    assert!(!dir.path().join("Broken.md").exists());
    assert!(dir.path().join("Calls.md").exists());
}

#[test]
fn file_mode_scans_directory() {
    let dir = TempDir::new().unwrap();
    let fixtures = format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR"));

    cmd()
        .args(["-o", dir.path().to_str().unwrap(), &fixtures])
        .assert()
        .success();

    assert!(dir.path().join("Calls.md").exists());
    assert!(dir.path().join("Domainmodel.md").exists());
}

#[test]
fn file_mode_with_prefix() {
    let dir = TempDir::new().unwrap();
    let prefix = dir.path().join("prefix.md");
    std::fs::write(&prefix, "---\ntitle: ${name}\n---").unwrap();
    let out = dir.path().join("out");

    cmd()
        .args([
            "-o",
            out.to_str().unwrap(),
            "-p",
            prefix.to_str().unwrap(),
            &fixture_path("Calls.xtext"),
        ])
        .assert()
        .success();

    let output = read(out.join("Calls.md"));
    assert!(output.starts_with("---\ntitle: Calls\n---\n# Calls\n"));
}

#[test]
fn file_mode_requires_output() {
    cmd()
        .arg(fixture_path("Calls.xtext"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output is required"));
}

#[test]
fn unknown_format_fails() {
    cmd()
        .args(["-f", "pdf"])
        .write_stdin("grammar t.G")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: pdf"));
}

#[test]
fn verbose_logs_written_files() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-v", "-o", dir.path().to_str().unwrap(), &fixture_path("Calls.xtext")])
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote").and(predicate::str::contains("Calls.md")));
}
