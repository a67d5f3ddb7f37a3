//! Integration tests for the cellgraph binary

use std::path::PathBuf;
use std::process::Command;

fn run(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_cellgraph"))
        // Tests must be deterministic and not depend on a user's ~/.config/cellgraph/config.toml.
        .arg("--no-config")
        .args(args)
        .env_remove("CELLGRAPH_LOG")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn temp_path(tag: &str, ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "cellgraph_cli_{}_{}_{}_{:?}.{}",
        tag,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos(),
        std::thread::current().id(),
        ext,
    ))
}

struct Cleanup(PathBuf);
impl Drop for Cleanup {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

#[test]
fn test_basic_arithmetic() {
    let (stdout, _, code) = run(&["-c", "5 + 3"]);
    assert_eq!(stdout.trim(), "8");
    assert_eq!(code, 0);
}

#[test]
fn test_precedence_and_fractions() {
    let (stdout, _, code) = run(&["-c", "2 + 3 * 4"]);
    assert_eq!(stdout.trim(), "14");
    assert_eq!(code, 0);

    let (stdout, _, _) = run(&["-c", "(2+3)/(4+8)"]);
    assert_eq!(stdout.trim(), "0.416667");
}

#[test]
fn test_auto_prepend_equals() {
    let (stdout1, _, _) = run(&["-c", "10 + 5"]);
    let (stdout2, _, _) = run(&["-c", "=10 + 5"]);
    assert_eq!(stdout1, stdout2);
}

#[test]
fn test_division_by_zero() {
    let (stdout, _, code) = run(&["-c", "1/0"]);
    assert_eq!(stdout.trim(), "#ERR: division by zero");
    assert_eq!(code, 1);
}

#[test]
fn test_format_error_exit_code() {
    let (stdout, _, code) = run(&["-c", "(3+1))"]);
    assert!(stdout.starts_with("#ERR: Right-Parentheses Rule"));
    assert_eq!(code, 1);
}

#[test]
fn test_undefined_variable() {
    let (stdout, _, code) = run(&["-c", "x + 1"]);
    assert!(stdout.starts_with("#ERR"));
    assert!(stdout.contains("depends on empty cell"));
    assert_eq!(code, 1);
}

#[test]
fn test_command_reads_assigned_cells() {
    let (stdout, _, code) = run(&["-s", "A1=5", "-s", "B1==A1*2", "-c", "B1 + 1"]);
    assert_eq!(stdout.trim(), "11");
    assert_eq!(code, 0);
}

#[test]
fn test_listing() {
    let (stdout, _, code) = run(&["-s", "A1=5", "-s", "B1==A1 * 2", "-s", "C1=total"]);
    assert_eq!(stdout, "A1\t5\t5\nB1\t=A1*2\t10\nC1\ttotal\ttotal\n");
    assert_eq!(code, 0);
}

#[test]
fn test_circular_assignment_fails() {
    let (_, stderr, code) = run(&["-s", "A1==B1", "-s", "B1==A1"]);
    assert!(stderr.contains("Circular dependency"));
    assert!(stderr.contains("B1 -> A1 -> B1"));
    assert_eq!(code, 1);
}

#[test]
fn test_save_then_load() {
    let path = temp_path("save", "cgs");
    let _cleanup = Cleanup(path.clone());
    let path_str = path.to_str().unwrap();

    let (_, stderr, code) = run(&["-s", "A1=2", "-s", "B1==A1*A1", "-o", path_str]);
    assert_eq!(code, 0, "{stderr}");
    assert!(stderr.contains("Saved to"));

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains("@version default"));
    assert!(saved.contains("B1: =A1*A1"));

    let (stdout, _, code) = run(&[path_str, "-s", "A1=3", "-c", "B1"]);
    assert_eq!(stdout.trim(), "9");
    assert_eq!(code, 0);
}

#[test]
fn test_config_file_rules() {
    let config = temp_path("config", "toml");
    let _cleanup = Cleanup(config.clone());
    std::fs::write(&config, "normalize = \"upper\"\nversion = \"v2\"\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_cellgraph"))
        .args(["--config", config.to_str().unwrap()])
        .args(["-s", "a1=4", "-c", "A1 * 2"])
        .output()
        .expect("Failed to execute command");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "8");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_unknown_option() {
    let (_, stderr, code) = run(&["--frobnicate"]);
    assert!(stderr.contains("Unknown option"));
    assert_eq!(code, 1);
}
