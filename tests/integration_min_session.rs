// Drives the compiled binary through a pseudo terminal, covering the real
// event loop and crossterm input handling.
//
// Unix only and ignored by default since it needs a PTY.
// Run with: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("snipt");
    let cmd = format!("{} -p hi", bin.display());

    let mut p = spawn(cmd)?;

    // let the app enter the alternate screen
    std::thread::sleep(Duration::from_millis(200));

    p.send("hi")?;
    std::thread::sleep(Duration::from_millis(200));

    // ESC quits from both the typing and results screens
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}

#[test]
fn list_languages_prints_and_exits() {
    assert_cmd::Command::cargo_bin("snipt")
        .unwrap()
        .arg("--list-languages")
        .assert()
        .success()
        .stdout("go\njavascript\npython\nreact\nrust\ntypescript\n");
}

#[test]
fn non_tty_stdin_is_rejected() {
    assert_cmd::Command::cargo_bin("snipt")
        .unwrap()
        .args(["-p", "hi"])
        .write_stdin("")
        .assert()
        .failure();
}
