use crate::validator::classify_message;
use crate::{InjectedSymbols, MarkupValidator, Result, ValidationError};
use rst_types::{Diagnostic, DiagnosticSeverity};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Driver run by the interpreter; the request arrives on stdin.
const VALIDATE_DRIVER: &str = include_str!("validate.py");

#[derive(Serialize)]
struct Request<'a> {
    path: &'a Path,
    text: &'a str,
    sphinx_builtins: bool,
    #[serde(flatten)]
    symbols: &'a InjectedSymbols,
}

/// One system message printed by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemMessage {
    pub line: Option<usize>,
    pub level: u8,
    pub message: String,
}

impl SystemMessage {
    /// Turn the message into a classified diagnostic for `path`.
    #[must_use]
    pub fn into_diagnostic(self, path: &Path) -> Diagnostic {
        let (category, name) = classify_message(&self.message);
        let diagnostic = Diagnostic::new(
            path,
            self.line.unwrap_or(0),
            DiagnosticSeverity::from_level(self.level),
            self.message,
        );
        match name {
            Some(name) => diagnostic.with_subject(category, name),
            None => diagnostic,
        }
    }
}

/// Validates documents with docutils in an external interpreter.
///
/// Only roles and directives are registered with the parser. Substitutions
/// and targets stay unknown to docutils so that combined references keep
/// producing their paired diagnostics for reconciliation to decide.
///
/// When Sphinx is importable its domain roles and directives (`:ref:`,
/// `toctree`, `py:function`, ...) are accepted as well, except `code`,
/// `code-block`, `sourcecode` and `include`, which docutils keeps checking.
#[derive(Debug, Clone)]
pub struct DocutilsValidator {
    interpreter: String,
    sphinx_builtins: bool,
}

impl DocutilsValidator {
    #[must_use]
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            sphinx_builtins: true,
        }
    }

    /// Whether Sphinx's own roles and directives are accepted.
    #[must_use]
    pub fn with_sphinx_builtins(mut self, enabled: bool) -> Self {
        self.sphinx_builtins = enabled;
        self
    }
}

impl MarkupValidator for DocutilsValidator {
    #[tracing::instrument(skip(self, text, symbols), fields(document = %path.display()))]
    fn validate(&self, path: &Path, text: &str, symbols: &InjectedSymbols) -> Result<Vec<Diagnostic>> {
        let failure = |message: String| ValidationError::Validator {
            path: path.to_path_buf(),
            message,
        };

        let request = serde_json::to_vec(&Request {
            path,
            text,
            sphinx_builtins: self.sphinx_builtins,
            symbols: &InjectedSymbols {
                substitutions: Vec::new(),
                targets: Vec::new(),
                ..symbols.clone()
            },
        })
        .map_err(|e| failure(e.to_string()))?;

        let mut command = Command::new(&self.interpreter);
        command
            .arg("-c")
            .arg(VALIDATE_DRIVER)
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = path.parent().filter(|d| d.is_dir()) {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| failure(format!("failed to start '{}': {e}", self.interpreter)))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&request)
                .map_err(|e| failure(format!("failed to send document: {e}")))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|e| failure(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure(format!(
                "interpreter exited with status {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        let messages: Vec<SystemMessage> = serde_json::from_slice(&output.stdout)
            .map_err(|e| failure(format!("unparseable validator output: {e}")))?;
        tracing::debug!(messages = messages.len(), "Docutils finished");

        Ok(messages
            .into_iter()
            .map(|message| message.into_diagnostic(path))
            .collect())
    }
}
