//! PowerShell command validation (§4.3 "Command validation").
//!
//! Three modes compose in order: dangerous (pass-through), dev-commands
//! (enlarged allowlist, paths still constrained), normal (strict allowlist +
//! deny-list). The deny-pattern list is data (a static `Vec`), not embedded
//! in control flow, per the re-architecture note in `spec.md` §9.

use std::sync::LazyLock;

use regex::Regex;

use super::path::validate_path;
use super::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandMode {
    Dangerous,
    Dev,
    Normal,
}

pub struct CommandValidationContext<'a> {
    pub mode: CommandMode,
    pub dev_command_paths: &'a [String],
    pub allowed_dev_commands: &'a [String],
    pub max_command_length: usize,
}

const NORMAL_NAMED_VERBS: &[&str] = &[
    "where-object",
    "select-object",
    "measure-object",
    "out-file",
    "new-item",
    "set-content",
    "add-content",
    "get-content",
    "test-path",
    "stop-process",
    "wait-process",
];

const DEV_VERBS: &[&str] = &[
    "tasklist",
    "netstat",
    "type",
    "python",
    "python3",
    "pip",
    "node",
    "npm",
    "if",
    "for",
    "findstr",
    "echo",
    "set",
    "call",
    "start",
    "cd",
    "set-location",
    "invoke-command",
    "start-process",
];

struct DangerousPattern {
    regex: Regex,
    description: &'static str,
}

static DANGEROUS_PATTERNS: LazyLock<Vec<DangerousPattern>> = LazyLock::new(|| {
    let specs: &[(&str, &str)] = &[
        (r"(?i)remove-item\b[^\n]*-recurse", "recursive file deletion"),
        (r"(?i)\bformat-volume\b", "disk format"),
        (r"(?i)\bformat\s+[a-z]:", "disk format"),
        (r"(?i)\b(restart|stop)-computer\b", "shutdown/reboot"),
        (r"(?i)\bshutdown\b", "shutdown/reboot"),
        (
            r"(?i)\b(net\s+user|new-localuser|remove-localuser|add-localgroupmember)\b",
            "account/user management",
        ),
        (
            r"(?i)\b(reg\s+delete|remove-itemproperty\b[^\n]*hklm)",
            "registry destructive write",
        ),
        (
            r"(?i)stop-service\b[^\n]*(wuauserv|winrm|eventlog|winmgmt)",
            "stop of a protected service",
        ),
        (
            r"(?i)invoke-expression[^\n]*(https?://|new-object\s+net\.webclient)",
            "Invoke-Expression of network-sourced content",
        ),
        (
            r"(?i)(start-process[^\n]*-verb\s+runas|\brunas\b)",
            "elevated-execution pattern",
        ),
    ];
    specs
        .iter()
        .map(|(pattern, description)| DangerousPattern {
            regex: Regex::new(pattern).expect("static deny pattern"),
            description,
        })
        .collect()
});

/// Mask `@"..."@` / `@'...'@` here-strings so the backtick check doesn't
/// false-positive on multi-line here-string content (§4.3 shared rules).
fn mask_here_strings(command: &str) -> String {
    static HERE_STRING: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"(?s)@"(?:.*?)"@|@'(?:.*?)'@"#).expect("here-string regex"));
    HERE_STRING
        .replace_all(command, |caps: &regex::Captures| " ".repeat(caps[0].len()))
        .to_string()
}

fn reject_shared_unsafe(command: &str) -> Result<(), ValidationError> {
    if command.contains('\0') {
        return Err(ValidationError::Command {
            reason: "command contains a null byte".to_string(),
        });
    }
    if command.chars().any(|c| c.is_control() && c != '\t' && c != '\n' && c != '\r') {
        return Err(ValidationError::Command {
            reason: "command contains control characters".to_string(),
        });
    }
    let masked = mask_here_strings(command);
    if masked.contains('`') {
        return Err(ValidationError::Command {
            reason: "backtick command substitution outside a here-string is not allowed".to_string(),
        });
    }
    for pattern in DANGEROUS_PATTERNS.iter() {
        if pattern.regex.is_match(&masked) {
            return Err(ValidationError::Command {
                reason: format!("matches dangerous pattern: {}", pattern.description),
            });
        }
    }
    Ok(())
}

/// Split on `&&`, `||`, `|`, `;`, `&`, `>>`, `>`, `2>&1` -- good enough to
/// catch the common chaining operators, not a full shell parser.
fn split_subcommands(command: &str) -> Vec<&str> {
    static SEPARATORS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"2>&1|&&|\|\||>>|[|;&>]").expect("separator regex"));
    SEPARATORS
        .split(command)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn first_verb(subcommand: &str) -> Option<&str> {
    subcommand.split_whitespace().next()
}

fn verb_matches_normal_allowlist(verb: &str) -> bool {
    let lower = verb.to_ascii_lowercase();
    lower.starts_with("get-")
        || lower.starts_with("set-")
        || NORMAL_NAMED_VERBS.contains(&lower.as_str())
}

fn verb_matches_dev_allowlist(verb: &str, allowed_dev_commands: &[String]) -> bool {
    let lower = verb.to_ascii_lowercase();
    DEV_VERBS.contains(&lower.as_str())
        || verb_matches_normal_allowlist(&lower)
        || allowed_dev_commands
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&lower))
}

/// Any bare path-shaped argument in a subcommand must normalize inside
/// `allowed_paths` (dev-commands mode only, §4.3).
fn validate_path_literals(subcommand: &str, allowed_paths: &[String]) -> Result<(), ValidationError> {
    for token in subcommand.split_whitespace() {
        let candidate = token.trim_matches(|c| c == '"' || c == '\'');
        let looks_like_path =
            candidate.len() > 2 && candidate.as_bytes()[1] == b':' && candidate.contains('\\');
        if looks_like_path {
            validate_path(candidate, allowed_paths)?;
        }
    }
    Ok(())
}

/// `validatePowerShellCommand` (§4.3).
pub fn validate_powershell_command(
    command: &str,
    ctx: &CommandValidationContext<'_>,
) -> Result<String, ValidationError> {
    if ctx.mode == CommandMode::Dangerous {
        return Ok(command.to_string());
    }

    reject_shared_unsafe(command)?;

    match ctx.mode {
        CommandMode::Dangerous => unreachable!(),
        CommandMode::Dev => {
            for subcommand in split_subcommands(command) {
                let verb = first_verb(subcommand).ok_or_else(|| ValidationError::Command {
                    reason: "empty sub-command".to_string(),
                })?;
                if !verb_matches_dev_allowlist(verb, ctx.allowed_dev_commands) {
                    return Err(ValidationError::Command {
                        reason: format!("verb '{verb}' is not in the dev-command allowlist"),
                    });
                }
                validate_path_literals(subcommand, ctx.dev_command_paths)?;
            }
            Ok(command.to_string())
        }
        CommandMode::Normal => {
            if command.len() > ctx.max_command_length {
                return Err(ValidationError::Command {
                    reason: format!(
                        "command length {} exceeds the maximum of {}",
                        command.len(),
                        ctx.max_command_length
                    ),
                });
            }
            let verb = first_verb(command).ok_or_else(|| ValidationError::Command {
                reason: "empty command".to_string(),
            })?;
            if !verb_matches_normal_allowlist(verb) {
                return Err(ValidationError::Command {
                    reason: format!("verb '{verb}' is not in the normal-mode allowlist"),
                });
            }
            Ok(command.to_string())
        }
    }
}
