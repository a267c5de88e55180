use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PEOPLE: &str = r#"[
  {"id": 2, "name": "bob", "info": {"city": "Oslo", "zip": "0150"}, "tags": ["x"]},
  {"id": 1, "name": null, "info": {"city": "Rome"}, "tags": ["y", "z"]}
]"#;

fn write_input(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn tablemorph() -> Command {
    Command::cargo_bin("tablemorph").unwrap()
}

#[test]
fn unpack_dict_to_csv() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "people.json", PEOPLE);

    tablemorph()
        .arg(&input)
        .args(["-f", "csv", "--sort-by", "id", "--unpack-dict", "info"])
        .args(["--cut", "id,info_city,info_zip"])
        .assert()
        .success()
        .stdout("id,info_city,info_zip\n1,Rome,\n2,Oslo,0150\n");
}

#[test]
fn coalesce_removes_sources_by_default() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "in.csv", "id,home,work\n1,,w1\n2,h2,w2\n");

    tablemorph()
        .arg(&input)
        .args(["-f", "csv", "--coalesce", "phone=home,work"])
        .assert()
        .success()
        .stdout("id,phone\n1,w1\n2,h2\n");
}

#[test]
fn coalesce_keep_sources() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "in.csv", "id,home,work\n1,,w1\n");

    tablemorph()
        .arg(&input)
        .args(["-f", "csv", "--coalesce", "phone=home,work", "--keep-sources"])
        .assert()
        .success()
        .stdout("id,home,work,phone\n1,,w1,w1\n");
}

#[test]
fn fillna_and_select() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "people.json", PEOPLE);

    tablemorph()
        .arg(&input)
        .args(["-f", "jsonl", "--fillna", "name=anon", "--select", "{id} < 2", "--cut", "id,name"])
        .assert()
        .success()
        .stdout("{\"id\":1,\"name\":\"anon\"}\n");
}

#[test]
fn long_table_from_jsonl() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "emails.jsonl",
        "{\"id\": 1, \"emails\": [\"a@x\", \"a@y\"]}\n{\"id\": 2, \"emails\": [\"b@x\"]}\n",
    );

    tablemorph()
        .arg(&input)
        .args(["-f", "csv", "--long-table", "id:emails"])
        .assert()
        .success()
        .stdout("id,emails\n1,a@x\n1,a@y\n2,b@x\n");
}

#[test]
fn match_columns_from_csv_to_file() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "in.csv", "First Name,extra\nAnn,1\n");
    let output = dir.path().join("out.csv");

    tablemorph()
        .arg(&input)
        .args(["-f", "csv", "--match-columns", "email,first_name", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout("");

    assert_eq!(fs::read_to_string(&output).unwrap(), "email,first_name\n,Ann\n");
}

#[test]
fn match_columns_fail_policy_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "in.csv", "a,b\n1,2\n");

    tablemorph()
        .arg(&input)
        .args(["--match-columns", "a", "--if-extra", "fail"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("schema mismatch"));
}

#[test]
fn types_report() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "people.json", PEOPLE);

    tablemorph()
        .arg(&input)
        .arg("--types")
        .assert()
        .success()
        .stdout(predicate::str::contains("id: int [int]"))
        .stdout(predicate::str::contains("name: string [string, null]"))
        .stdout(predicate::str::contains("info: map [map]"));
}

#[test]
fn table_output_has_footer() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "people.json", PEOPLE);

    tablemorph()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("bob"))
        .stdout(predicate::str::contains("(2 rows)"));
}

#[test]
fn bad_select_expression_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "people.json", PEOPLE);

    tablemorph()
        .arg(&input)
        .args(["--select", "{id} >"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid --select expression"));
}

#[test]
fn unsupported_extension_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "data.xml", "<a/>");

    tablemorph()
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported file format"));
}
