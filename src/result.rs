//! The uniform execution result shared by local and SSH execution (§3
//! "Execution result").

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

/// A result object is created once per tool invocation and is immutable
/// after the executor returns.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
    pub error: String,
    pub exit_code: Option<i32>,
    pub signal: Option<String>,
    pub content: Vec<TextContent>,
}

impl ExecutionResult {
    /// Build the uniform result from raw captured streams and exit status,
    /// per §3: `success = exitCode == 0 && signal == None`, and `content` is
    /// stdout, plus an `"Errors:"` block appended when stderr is non-empty.
    pub fn from_exit(output: String, error: String, exit_code: Option<i32>, signal: Option<String>) -> Self {
        Self::from_exit_with_ignore(output, error, exit_code, signal, false)
    }

    /// As [`Self::from_exit`], but when `ignore_exit_code` is set a non-zero
    /// exit does not get the `"Process failed with code N:"` prefix (it
    /// still reports as `success = false`, per the §3 invariant that success
    /// is strictly `exitCode == 0 && signal == None`).
    pub fn from_exit_with_ignore(
        output: String,
        error: String,
        exit_code: Option<i32>,
        signal: Option<String>,
        ignore_exit_code: bool,
    ) -> Self {
        let success = exit_code == Some(0) && signal.is_none();
        let mut text = output.clone();
        if !error.is_empty() {
            text.push_str("\n\nErrors:\n");
            text.push_str(&error);
        }
        if signal.is_some() {
            text = format!("Process terminated by signal: {}\n{text}", signal.as_deref().unwrap_or(""));
        } else if let Some(code) = exit_code {
            if code != 0 && !ignore_exit_code {
                text = format!("Process failed with code {code}:\n{text}");
            }
        }
        Self {
            success,
            output,
            error,
            exit_code,
            signal,
            content: vec![TextContent {
                kind: "text",
                text,
            }],
        }
    }

    pub fn timed_out(seconds: u64) -> Self {
        let text = format!("Command timed out after {seconds} seconds");
        Self {
            success: false,
            output: String::new(),
            error: text.clone(),
            exit_code: None,
            signal: None,
            content: vec![TextContent {
                kind: "text",
                text,
            }],
        }
    }

    pub fn spawn_error(message: impl Into<String>) -> Self {
        let message = message.into();
        let text = format!("Process error: {message}");
        Self {
            success: false,
            output: String::new(),
            error: message,
            exit_code: None,
            signal: None,
            content: vec![TextContent {
                kind: "text",
                text,
            }],
        }
    }

    pub fn validation_error(text: String) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: text.clone(),
            exit_code: None,
            signal: None,
            content: vec![TextContent {
                kind: "text",
                text,
            }],
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            success: true,
            output: text.clone(),
            error: String::new(),
            exit_code: Some(0),
            signal: None,
            content: vec![TextContent {
                kind: "text",
                text,
            }],
        }
    }
}
