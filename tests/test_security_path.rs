//! Integration tests for Windows path validation (§4.3 "Path validation").

use mcp_exec_daemon::security::path::{validate_batch_file_path, validate_path};

fn allowed() -> Vec<String> {
    vec!["C:\\build\\".to_string()]
}

#[test]
fn accepts_absolute_path_under_allowed_prefix() {
    let result = validate_path("C:\\build\\MyApp\\MyApp.csproj", &allowed()).unwrap();
    assert_eq!(result, "C:\\build\\MyApp\\MyApp.csproj");
}

#[test]
fn is_case_insensitive_on_the_prefix() {
    let result = validate_path("c:\\BUILD\\app", &allowed()).unwrap();
    assert!(result.to_ascii_lowercase().starts_with("c:\\build"));
}

#[test]
fn collapses_dot_dot_segments() {
    let result = validate_path("C:\\build\\x\\..\\MyApp", &allowed()).unwrap();
    assert_eq!(result, "C:\\build\\MyApp");
}

#[test]
fn rejects_relative_paths() {
    assert!(validate_path("build\\MyApp", &allowed()).is_err());
}

#[test]
fn rejects_unc_paths() {
    assert!(validate_path("\\\\host\\share\\build", &allowed()).is_err());
}

#[test]
fn rejects_env_var_markers() {
    assert!(validate_path("C:\\build\\%TEMP%\\x", &allowed()).is_err());
}

#[test]
fn rejects_paths_outside_allowed_prefix() {
    assert!(validate_path("C:\\Windows\\System32", &allowed()).is_err());
}

#[test]
fn is_a_fixed_point_under_renormalization() {
    let first = validate_path("C:\\build\\x\\..\\MyApp\\.\\y", &allowed()).unwrap();
    let second = validate_path(&first, &allowed()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn an_empty_allowlist_rejects_every_path() {
    // Unlike the IP/origin allowlists, an unconfigured path allowlist must
    // not fall back to wildcard-allow.
    assert!(validate_path("C:\\build\\MyApp", &[]).is_err());
    assert!(validate_path("C:\\anything\\at\\all", &[]).is_err());
}

#[test]
fn batch_path_accepts_uppercase_bat_extension() {
    let allowed = vec!["C:\\scripts\\".to_string()];
    let result = validate_batch_file_path("C:\\scripts\\run.BAT", &allowed).unwrap();
    assert!(result.to_ascii_lowercase().ends_with("run.bat"));
}

#[test]
fn batch_path_rejects_double_extension() {
    let allowed = vec!["C:\\scripts\\".to_string()];
    assert!(validate_batch_file_path("C:\\scripts\\run.cmd.txt", &allowed).is_err());
}

#[test]
fn batch_path_rejects_missing_extension() {
    let allowed = vec!["C:\\scripts\\".to_string()];
    assert!(validate_batch_file_path("C:\\scripts\\run.exe", &allowed).is_err());
}

#[test]
fn batch_path_rejects_an_empty_allowed_dirs_list() {
    assert!(validate_batch_file_path("C:\\scripts\\run.bat", &[]).is_err());
}
