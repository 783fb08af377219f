mod common;

use assert_cmd::Command;
use common::FnFixture;
use predicates::prelude::*;
use std::io::Write;

fn fixture_file(data: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(data).expect("write fixture");
    file
}

#[test]
fn test_inspect_text_output() {
    let mut root = FnFixture::named(b"@cli.lua");
    root.protos = vec![FnFixture::named(b"inner")];
    let file = fixture_file(&common::chunk(&root, true));

    Command::cargo_bin("luac-dec-rs")
        .unwrap()
        .args(["inspect", "--format", "text"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("version 0x53"))
        .stdout(predicate::str::contains("little-endian"))
        .stdout(predicate::str::contains("functions: 2"));
}

#[test]
fn test_inspect_json_output() {
    let file = fixture_file(&common::chunk(&FnFixture::named(b"@cli.lua"), true));

    Command::cargo_bin("luac-dec-rs")
        .unwrap()
        .arg("inspect")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"@cli.lua\""))
        .stdout(predicate::str::contains("\"is_le\": true"));
}

#[test]
fn test_strings_output() {
    let mut root = FnFixture::named(b"@cli.lua");
    root.constants = vec![common::const_short_str(b"needle")];
    let file = fixture_file(&common::chunk(&root, true));

    Command::cargo_bin("luac-dec-rs")
        .unwrap()
        .arg("strings")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("needle"));
}

#[test]
fn test_funcs_addr_lookup() {
    let mut root = FnFixture::named(b"@cli.lua");
    root.code_count = 2;
    let data = common::chunk(&root, true);
    let file = fixture_file(&data);

    // First instruction byte: one int-sized length prefix past the code
    // block start, which itself follows name + two line ints + 3 bytes.
    let chunk = luac_dec_rs::LuacChunk::parse(&data).unwrap();
    let f = chunk.functions.iter().next().unwrap();
    let addr = f.code_offset + common::INT_SIZE as u64;

    Command::cargo_bin("luac-dec-rs")
        .unwrap()
        .args(["funcs", "--addr", &addr.to_string()])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("belongs to function"))
        .stdout(predicate::str::contains("@cli.lua"));
}

#[test]
fn test_corrupt_chunk_fails() {
    let file = fixture_file(b"\x1bLu");

    Command::cargo_bin("luac-dec-rs")
        .unwrap()
        .arg("inspect")
        .arg(file.path())
        .assert()
        .failure();
}
