use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn avrpp(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_avrpp"))
        .args(args)
        .output()
        .expect("failed to spawn avrpp")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("avrpp-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn transpiles_file_and_prints_report() {
    let dir = scratch_dir("ok");
    let input = dir.join("prog.pasm");
    let output = dir.join("prog.asm");
    fs::write(&input, "; demo\r\n    $ r1 -> r2\r\n    nop\r\n").unwrap();

    let run = avrpp(&["-o", output.to_str().unwrap(), "--in", input.to_str().unwrap()]);
    assert!(run.status.success(), "{}", String::from_utf8_lossy(&run.stderr));

    assert_eq!(fs::read_to_string(&output).unwrap(), "; demo\n    mov r2, r1\n    nop\n");
    let stdout = String::from_utf8_lossy(&run.stdout);
    assert!(stdout.contains("prog.pasm"));
    assert!(stdout.contains("│ Instructions  │"));

    // No temporary file left behind.
    let leftovers: Vec<_> = fs::read_dir(&dir).unwrap().collect();
    assert_eq!(leftovers.len(), 2);
}

#[test]
fn quiet_suppresses_report() {
    let dir = scratch_dir("quiet");
    let input = dir.join("a.pasm");
    let output = dir.join("a.asm");
    fs::write(&input, "$ 1 -> r16").unwrap();

    let run = avrpp(&["-q", "-i", input.to_str().unwrap(), "-o", output.to_str().unwrap()]);
    assert!(run.status.success());
    assert!(run.stdout.is_empty());
    assert_eq!(fs::read_to_string(&output).unwrap(), "ldi r16, 1");
}

#[test]
fn no_arguments_prints_usage() {
    let run = avrpp(&[]);
    let text = String::from_utf8_lossy(&run.stdout).into_owned()
        + &String::from_utf8_lossy(&run.stderr);
    assert!(text.contains("Usage"), "{text}");
}

#[test]
fn unknown_option_touches_nothing() {
    let dir = scratch_dir("bad-flag");
    let output = dir.join("never.asm");
    let run = avrpp(&["-x", "in.pasm", "-o", output.to_str().unwrap()]);
    assert!(!run.status.success());
    assert!(!output.exists());
}

#[test]
fn missing_input_is_fatal() {
    let dir = scratch_dir("missing");
    let output = dir.join("out.asm");
    let run = avrpp(&["-i", dir.join("nope.pasm").to_str().unwrap(), "-o", output.to_str().unwrap()]);
    assert!(!run.status.success());
    assert!(String::from_utf8_lossy(&run.stderr).contains("failed to read"));
    assert!(!output.exists());
}

#[test]
fn unsupported_sentence_is_dropped_with_warning() {
    let dir = scratch_dir("gen-warn");
    let input = dir.join("div.pasm");
    let output = dir.join("div.asm");
    fs::write(&input, "nop\n$ r1 / r2 -> r3\nnop\n").unwrap();

    let run = avrpp(&["-q", "-i", input.to_str().unwrap(), "-o", output.to_str().unwrap()]);
    assert!(run.status.success(), "{}", String::from_utf8_lossy(&run.stderr));
    assert!(String::from_utf8_lossy(&run.stderr).contains("line 2"));
    assert_eq!(fs::read_to_string(&output).unwrap(), "nop\nnop\n");
}

#[test]
fn strict_generation_error_writes_nothing() {
    let dir = scratch_dir("gen-error");
    let input = dir.join("div.pasm");
    let output = dir.join("div.asm");
    fs::write(&input, "nop\n$ r1 / r2 -> r3\n").unwrap();

    let run = avrpp(&["--strict", "-i", input.to_str().unwrap(), "-o", output.to_str().unwrap()]);
    assert!(!run.status.success());
    assert!(String::from_utf8_lossy(&run.stderr).contains("line 2"));
    assert!(!output.exists());
}
