// Regression tests for the `spoof` binary.
// Requires: assert_cmd, predicates, tempfile crates in [dev-dependencies]

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn spoof() -> Command {
    Command::cargo_bin("spoof").unwrap()
}

#[test]
fn cli_reports_miette_diagnostics_on_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let bad_file = dir.path().join("bad.ts");
    fs::write(&bad_file, "const x = $spoof(\"a\";" /* missing closing paren */).unwrap();

    spoof()
        .arg("transform")
        .arg(&bad_file)
        .assert()
        .failure()
        .stderr(contains("spoof::parse").or(contains("help:")));
}

#[test]
fn transform_prints_rewritten_source_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.ts");
    fs::write(&file, "const s = $spoof(\"hi\", 10);\n").unwrap();

    spoof()
        .args(["transform", "--seed", "1"])
        .arg(&file)
        .assert()
        .success()
        .stdout("const s = string.char(...[114, 115].map((x) => x - 10));\n");
}

#[test]
fn transform_reports_malformed_markers_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.ts");
    fs::write(&file, "const s = $spoof();\n").unwrap();

    spoof()
        .arg("transform")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("$spoof()"))
        .stderr(contains("[spoof]").and(contains("$spoof requires a parameter!")));

    spoof()
        .args(["transform", "--quiet"])
        .arg(&file)
        .assert()
        .success()
        .stderr(contains("[spoof]").not());
}

#[test]
fn transform_writes_a_mirrored_tree_to_out_dir() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::create_dir_all(src.path().join("lib")).unwrap();
    fs::write(src.path().join("index.ts"), "export const id = $uuid();\n").unwrap();
    fs::write(src.path().join("lib/keys.ts"), "export enum Keys_spoof { A }\n").unwrap();
    fs::write(src.path().join("README.md"), "not a source file").unwrap();

    spoof()
        .arg("transform")
        .arg(src.path())
        .arg("--out-dir")
        .arg(out.path())
        .assert()
        .success();

    let index = fs::read_to_string(out.path().join("index.ts")).unwrap();
    assert!(index.starts_with("export const id = \""));
    assert!(!index.contains("$uuid"));
    let keys = fs::read_to_string(out.path().join("lib/keys.ts")).unwrap();
    assert!(keys.contains("A = \""));
    assert!(!out.path().join("README.md").exists());
}

#[test]
fn out_dir_refuses_inputs_that_share_a_file_name() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::create_dir_all(src.path().join("a")).unwrap();
    fs::create_dir_all(src.path().join("b")).unwrap();
    fs::write(src.path().join("a/keys.ts"), "const a = 1;\n").unwrap();
    fs::write(src.path().join("b/keys.ts"), "const b = 2;\n").unwrap();

    spoof()
        .arg("transform")
        .arg(src.path().join("a/keys.ts"))
        .arg(src.path().join("b/keys.ts"))
        .arg("--out-dir")
        .arg(out.path())
        .assert()
        .failure()
        .stderr(contains("would both be written here"));
    assert!(!out.path().join("keys.ts").exists());
}

#[test]
fn diff_and_out_dir_cannot_be_combined() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.ts");
    fs::write(&file, "const a = 1;\n").unwrap();

    spoof()
        .args(["transform", "--diff", "--out-dir"])
        .arg(dir.path().join("out"))
        .arg(&file)
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn disabled_spoof_enums_still_rewrite_member_initializers() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("keys.ts");
    fs::write(&file, "enum K_spoof { A = $spoof(\"x\", 1), B }\n").unwrap();

    spoof()
        .args(["transform", "--no-spoof-enum"])
        .arg(&file)
        .assert()
        .success()
        .stdout(
            contains("A = string.char(...[121].map((x) => x - 1)),")
                .and(contains("    B,\n"))
                .and(contains("$spoof").not()),
        );
}

#[test]
fn transform_honours_config_file_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("keys.ts");
    let config = dir.path().join("spoof.json");
    fs::write(&file, "enum Keys_spoof { A }\nconst s = $spoof(\"a\", 1);\n").unwrap();
    fs::write(&config, r#"{ "spoofEnum": false, "decoder": "utf8.char" }"#).unwrap();

    spoof()
        .arg("transform")
        .arg(&file)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("enum Keys_spoof {\n    A,\n}").and(contains("utf8.char(...[98]")));

    spoof()
        .arg("transform")
        .arg(&file)
        .args(["--no-shared-offset", "--quiet"])
        .assert()
        .success()
        .stdout(contains("$spoof(\"a\", 1)"));
}

#[test]
fn invalid_config_is_a_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.ts");
    let config = dir.path().join("spoof.json");
    fs::write(&file, "1;\n").unwrap();
    fs::write(&config, r#"{ "spoofEnum": "yes" }"#).unwrap();

    spoof()
        .arg("transform")
        .arg(&file)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("invalid pass configuration"));
}

#[test]
fn diff_shows_removed_and_added_lines() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.ts");
    fs::write(&file, "const a = 1;\nconst s = $spoof(\"a\", 2);\n").unwrap();

    spoof()
        .args(["transform", "--diff"])
        .arg(&file)
        .assert()
        .success()
        .stdout(
            contains(" const a = 1;")
                .and(contains("-const s = $spoof(\"a\", 2);"))
                .and(contains("+const s = string.char(...[99].map((x) => x - 2));")),
        );
}

#[test]
fn format_and_ast_commands() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.ts");
    fs::write(&file, "let   x='a' ;").unwrap();

    spoof()
        .arg("format")
        .arg(&file)
        .assert()
        .success()
        .stdout("let x = \"a\";\n");

    spoof()
        .arg("ast")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("\"statements\"").and(contains("\"Var\"")));
}

#[test]
fn missing_input_is_an_io_error() {
    spoof()
        .args(["transform", "does-not-exist.ts"])
        .assert()
        .failure()
        .stderr(contains("does-not-exist.ts"));
}
