use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_oxibr").to_string()
}

fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 9, 22);
        writer.write_all(data).unwrap();
    }
    out
}

#[test]
fn cli_decode_file_to_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("payload.br");
    let output = dir.path().join("payload.txt");
    let payload = b"line one\nline two\nline three\n".repeat(500);
    std::fs::write(&input, compress(&payload)).unwrap();

    let st = Command::new(bin())
        .args(["decode", "--input-buffer-size", "1K", "--output-buffer-size", "4K"])
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&output).unwrap(), payload);
}

#[test]
fn cli_refuses_to_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.br");
    let output = dir.path().join("out.txt");
    std::fs::write(&input, compress(b"fresh")).unwrap();
    std::fs::write(&output, b"existing").unwrap();

    let st = Command::new(bin())
        .arg("decode")
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(!st.success());
    assert_eq!(std::fs::read(&output).unwrap(), b"existing");

    let st = Command::new(bin())
        .args(["--force", "decode"])
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&output).unwrap(), b"fresh");
}

#[test]
fn cli_decode_stdin_to_stdout() {
    let compressed = compress(b"piped through stdio");
    let mut child = Command::new(bin())
        .args(["decode", "-c"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(&compressed).unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert_eq!(out.stdout, b"piped through stdio");
}

#[test]
fn cli_check_only_reports_corruption() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.br");
    let bad = dir.path().join("bad.br");
    let compressed = compress(&b"0123456789abcdef".repeat(64));
    std::fs::write(&good, &compressed).unwrap();
    std::fs::write(&bad, &compressed[..compressed.len() / 2]).unwrap();

    let st = Command::new(bin())
        .args(["decode", "--check-only"])
        .arg(&good)
        .status()
        .unwrap();
    assert!(st.success());

    let out = Command::new(bin())
        .args(["decode", "--check-only"])
        .arg(&bad)
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("truncated"));
}

#[test]
fn cli_json_stats() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.br");
    let compressed = compress(b"json stats please");
    std::fs::write(&input, &compressed).unwrap();

    let out = Command::new(bin())
        .args(["--json", "decode", "--check-only"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&out.stderr).unwrap();
    assert_eq!(stats["command"], "decode");
    assert_eq!(stats["input_size"], compressed.len() as u64);
    assert_eq!(stats["output_size"], 17);
}

#[test]
fn cli_config_works() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("DEFAULT_OUTPUT_REGION_LEN=524288"));
}
