//! Windows path validation (§4.3 "Path validation").
//!
//! Paths are normalized to an absolute, backslash-separated, drive-letter
//! form and then checked against a configured allowlist of prefixes. None of
//! this is a substitute for OS-level isolation -- it exists to keep argv
//! construction from ever touching a path the operator didn't explicitly
//! allow.

use super::ValidationError;

const ZERO_WIDTH_CHARS: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

fn reject_unsafe_chars(raw: &str) -> Result<(), String> {
    if raw.is_empty() {
        return Err("path must not be empty".to_string());
    }
    if raw.contains('\0') {
        return Err("path contains a null byte".to_string());
    }
    if raw.chars().any(|c| ZERO_WIDTH_CHARS.contains(&c)) {
        return Err("path contains zero-width/BOM characters".to_string());
    }
    if raw.chars().any(|c| c.is_whitespace() && c != ' ') {
        return Err("path contains non-space unicode whitespace".to_string());
    }
    if raw.contains('%') && raw.to_ascii_lowercase().contains("%2e") {
        return Err("path contains URL-encoded traversal sequences".to_string());
    }
    if raw.contains("&#") {
        return Err("path contains HTML-entity-encoded sequences".to_string());
    }
    if raw.contains("%VAR%") || has_env_var_marker(raw) {
        return Err("path contains an environment variable marker".to_string());
    }
    Ok(())
}

fn has_env_var_marker(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    let mut in_marker = false;
    let mut start = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if in_marker && i > start + 1 {
                return true;
            }
            in_marker = true;
            start = i;
        }
        i += 1;
    }
    false
}

/// Normalize a raw path: backslash separators, collapsed `.`/`..`, and a
/// rejection of anything that isn't an absolute drive-letter path.
fn normalize(raw: &str) -> Result<String, String> {
    reject_unsafe_chars(raw)?;

    if raw.starts_with("\\\\") || raw.starts_with("//") {
        return Err("UNC paths are not allowed".to_string());
    }

    let slashed = raw.replace('/', "\\");

    let bytes = slashed.as_bytes();
    let is_drive_absolute = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && bytes[2] == b'\\';
    if !is_drive_absolute {
        return Err("path must be an absolute drive-letter path (e.g. C:\\...)".to_string());
    }

    let drive = &slashed[..2];
    let rest = &slashed[3..];

    let mut segments: Vec<&str> = Vec::new();
    for seg in rest.split('\\') {
        match seg {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut normalized = format!("{drive}\\");
    normalized.push_str(&segments.join("\\"));
    Ok(normalized)
}

fn starts_with_allowed(normalized: &str, allowed: &[String]) -> bool {
    let lower = normalized.to_ascii_lowercase();
    allowed
        .iter()
        .any(|prefix| lower.starts_with(&prefix.to_ascii_lowercase()))
}

/// `validatePath` (§4.3): normalize and ensure the result is under one of
/// `allowed`. An empty allowlist rejects every path -- unlike the IP/origin
/// allowlists, a path allowlist has no "unconfigured means allow any" carve
/// out; the operator must configure at least one prefix.
pub fn validate_path(raw: &str, allowed: &[String]) -> Result<String, ValidationError> {
    let normalized = normalize(raw).map_err(|reason| ValidationError::Path {
        path: format!("{raw} ({reason})"),
        allowed: allowed.to_vec(),
    })?;

    if !allowed.is_empty() && starts_with_allowed(&normalized, allowed) {
        Ok(normalized)
    } else {
        Err(ValidationError::Path {
            path: normalized,
            allowed: allowed.to_vec(),
        })
    }
}

/// `validateBuildPath`: same rules as [`validate_path`] against
/// `allowedBuildPaths`.
pub fn validate_build_path(raw: &str, allowed_build_paths: &[String]) -> Result<String, ValidationError> {
    validate_path(raw, allowed_build_paths)
}

/// `validateBatchFilePath`: [`validate_path`] against `allowedBatchDirs`,
/// plus a mandatory `.bat`/`.cmd` extension with no double extension.
pub fn validate_batch_file_path(
    raw: &str,
    allowed_batch_dirs: &[String],
) -> Result<String, ValidationError> {
    let normalized = validate_path(raw, allowed_batch_dirs)?;

    let file_name = normalized
        .rsplit('\\')
        .next()
        .unwrap_or(&normalized)
        .to_ascii_lowercase();

    let has_valid_ext = file_name.ends_with(".bat") || file_name.ends_with(".cmd");
    if !has_valid_ext {
        return Err(ValidationError::Path {
            path: format!("{normalized} (missing .bat/.cmd extension)"),
            allowed: allowed_batch_dirs.to_vec(),
        });
    }

    // Reject double extensions like "run.cmd.txt" -- the final component
    // must have exactly one dot before the bat/cmd suffix.
    let dot_count = file_name.matches('.').count();
    if dot_count != 1 {
        return Err(ValidationError::Path {
            path: format!("{normalized} (double extension not allowed)"),
            allowed: allowed_batch_dirs.to_vec(),
        });
    }

    Ok(normalized)
}
