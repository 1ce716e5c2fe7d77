use crate::commands::common::{collect_documents, CommandContext};
use crate::{ExitCode, OutputFormat, OutputOptions, SettingsOverrides};
use anyhow::{Context, Result};
use colored::Colorize;
use rst_analysis::{CancellationToken, DocumentReport, ValidationError};
use rst_config::HarvestWarning;
use rst_types::{Diagnostic, DiagnosticSeverity};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A document that could not be checked at all.
struct Failure {
    path: PathBuf,
    error: ValidationError,
}

#[allow(clippy::too_many_lines)]
#[tracing::instrument(skip_all, fields(paths = paths.len()))]
pub fn run(
    paths: &[PathBuf],
    overrides: SettingsOverrides,
    format: OutputFormat,
    output_opts: OutputOptions,
) -> Result<()> {
    let start_time = std::time::Instant::now();
    let human = matches!(format, OutputFormat::Human);

    let ctx = CommandContext::load(overrides, format)?;
    let checker = ctx.checker()?;

    let paths = if paths.is_empty() {
        vec![std::env::current_dir().context("Failed to get current directory")?]
    } else {
        paths.to_vec()
    };
    let documents = match collect_documents(&paths) {
        Ok(documents) => documents,
        Err(e) => {
            print_error(format, &e.to_string());
            ExitCode::IoError.exit();
        }
    };

    if documents.is_empty() {
        if human && output_opts.show_info {
            println!("{}", "! No reStructuredText documents found".yellow());
        }
        return Ok(());
    }

    let spinner = crate::progress::checking(documents.len(), human && output_opts.show_progress);
    let outcome = checker.check_batch(&documents, &CancellationToken::new());
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let mut reports: Vec<DocumentReport> = Vec::new();
    let mut failures: Vec<Failure> = Vec::new();
    for (path, result) in outcome.results {
        match result {
            Ok(report) => reports.push(report),
            Err(error) => failures.push(Failure { path, error }),
        }
    }

    // One warning per artifact, however many documents it governs
    let warnings: BTreeMap<PathBuf, HarvestWarning> = reports
        .iter()
        .filter_map(|r| r.warning.clone())
        .map(|w| (w.artifact.clone(), w))
        .collect();

    let total_diagnostics: usize = reports.iter().map(|r| r.diagnostics.len()).sum();
    let files_with_diagnostics = reports.iter().filter(|r| !r.diagnostics.is_empty()).count();
    let total_suppressed: usize = reports.iter().map(|r| r.suppressed).sum();

    tracing::info!(
        documents = documents.len(),
        total_diagnostics,
        total_suppressed,
        failures = failures.len(),
        "Check completed"
    );

    match format {
        OutputFormat::Human => {
            for warning in warnings.values() {
                eprintln!("{} {warning}", "warning:".yellow().bold());
            }
            for failure in &failures {
                eprintln!("{} {}", "✗".red().bold(), failure.error.to_string().red());
            }
            for diagnostic in reports.iter().flat_map(|r| &r.diagnostics) {
                print_human(diagnostic);
            }
        }
        OutputFormat::Json => {
            let files: Vec<serde_json::Value> = reports
                .iter()
                .map(|report| {
                    serde_json::json!({
                        "file": report.path.display().to_string(),
                        "artifact": report.artifact.as_ref().map(|a| a.display().to_string()),
                        "suppressed": report.suppressed,
                        "diagnostics": report.diagnostics.iter().map(diagnostic_json).collect::<Vec<_>>(),
                    })
                })
                .collect();
            let errors: Vec<serde_json::Value> = failures
                .iter()
                .map(|f| {
                    serde_json::json!({
                        "file": f.path.display().to_string(),
                        "error": f.error.to_string(),
                    })
                })
                .collect();
            let harvest_warnings: Vec<serde_json::Value> = warnings
                .values()
                .map(|w| {
                    serde_json::json!({
                        "artifact": w.artifact.display().to_string(),
                        "message": w.message,
                    })
                })
                .collect();

            let output = serde_json::json!({
                "success": total_diagnostics == 0 && failures.is_empty(),
                "files": files,
                "errors": errors,
                "warnings": harvest_warnings,
                "stats": {
                    "total_files": reports.len(),
                    "files_with_diagnostics": files_with_diagnostics,
                    "total_diagnostics": total_diagnostics,
                    "suppressed": total_suppressed,
                }
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Github => {
            for warning in warnings.values() {
                println!(
                    "::warning file={}::{}",
                    warning.artifact.display(),
                    escape_workflow_data(&warning.message)
                );
            }
            for failure in &failures {
                println!(
                    "::error file={}::{}",
                    failure.path.display(),
                    escape_workflow_data(&failure.error.to_string())
                );
            }
            for diagnostic in reports.iter().flat_map(|r| &r.diagnostics) {
                print_github(diagnostic);
            }
        }
    }

    if human && output_opts.show_info {
        println!();
        if total_diagnostics == 0 && failures.is_empty() {
            println!(
                "{}",
                format!("✓ {} document(s) checked, no problems found", reports.len())
                    .green()
                    .bold()
            );
        } else {
            println!(
                "{}",
                format!(
                    "✗ Found {total_diagnostics} problem(s) in {files_with_diagnostics} file(s)"
                )
                .red()
            );
        }
        if total_suppressed > 0 {
            println!(
                "  {}",
                format!("{total_suppressed} diagnostic(s) resolved by project configuration").dimmed()
            );
        }
        println!(
            "  {} total: {:.2}s",
            "⏱".dimmed(),
            start_time.elapsed().as_secs_f64()
        );
    }

    match exit_code(&failures, total_diagnostics) {
        ExitCode::Success => Ok(()),
        code => code.exit(),
    }
}

/// Exit code for a finished run.
///
/// A validator that cannot run outranks unreadable documents, which outrank
/// reported diagnostics.
fn exit_code(failures: &[Failure], total_diagnostics: usize) -> ExitCode {
    if failures
        .iter()
        .any(|f| matches!(f.error, ValidationError::Validator { .. }))
    {
        ExitCode::ValidatorError
    } else if !failures.is_empty() {
        ExitCode::IoError
    } else if total_diagnostics > 0 {
        ExitCode::DiagnosticsFound
    } else {
        ExitCode::Success
    }
}

fn print_error(format: OutputFormat, message: &str) {
    match format {
        OutputFormat::Human => eprintln!("{} {}", "✗".red().bold(), message.red()),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": message })),
        OutputFormat::Github => eprintln!("::error ::{}", escape_workflow_data(message)),
    }
}

fn print_human(diagnostic: &Diagnostic) {
    let label = match diagnostic.severity {
        DiagnosticSeverity::Severe => "severe:".red().bold(),
        DiagnosticSeverity::Error => "error:".red().bold(),
        DiagnosticSeverity::Warning => "warning:".yellow().bold(),
        DiagnosticSeverity::Info => "info:".blue().bold(),
    };
    let location = if diagnostic.has_location() {
        format!("{}:{}", diagnostic.file_path.display(), diagnostic.line)
    } else {
        diagnostic.file_path.display().to_string()
    };
    println!("{location}: {label} {}", diagnostic.message);
}

fn print_github(diagnostic: &Diagnostic) {
    let command = match diagnostic.severity {
        DiagnosticSeverity::Error | DiagnosticSeverity::Severe => "error",
        DiagnosticSeverity::Warning => "warning",
        DiagnosticSeverity::Info => "notice",
    };
    let message = escape_workflow_data(&diagnostic.message);
    if diagnostic.has_location() {
        println!(
            "::{command} file={},line={}::{message}",
            diagnostic.file_path.display(),
            diagnostic.line
        );
    } else {
        println!("::{command} file={}::{message}", diagnostic.file_path.display());
    }
}

fn diagnostic_json(diagnostic: &Diagnostic) -> serde_json::Value {
    let mut value = serde_json::json!({
        "message": diagnostic.message,
        "severity": diagnostic.severity.to_string(),
        "category": diagnostic.category.to_string(),
    });
    if let Some(name) = diagnostic.name() {
        value["name"] = serde_json::json!(name);
    }
    if diagnostic.has_location() {
        value["line"] = serde_json::json!(diagnostic.line);
    }
    value
}

/// Workflow command data cannot contain raw newlines or `%`.
fn escape_workflow_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rst_types::DiagnosticCategory;
    use std::path::Path;

    #[test]
    fn test_escape_workflow_data() {
        assert_eq!(
            escape_workflow_data("Unknown directive type \"x\".\n\n.. x::"),
            "Unknown directive type \"x\".%0A%0A.. x::"
        );
        assert_eq!(escape_workflow_data("100%"), "100%25");
    }

    #[test]
    fn test_diagnostic_json() {
        let diagnostic = Diagnostic::unknown_role(Path::new("index.rst"), 3, "issue");
        let value = diagnostic_json(&diagnostic);
        assert_eq!(value["line"], 3);
        assert_eq!(value["category"], DiagnosticCategory::UnknownRole.to_string());
        assert_eq!(value["name"], "issue");
        assert_eq!(value["severity"], "error");
    }

    #[test]
    fn test_diagnostic_json_without_location() {
        let diagnostic = Diagnostic::new("index.rst", 0, DiagnosticSeverity::Warning, "x");
        let value = diagnostic_json(&diagnostic);
        assert!(value.get("line").is_none());
        assert!(value.get("name").is_none());
    }

    #[test]
    fn test_exit_code_priority() {
        assert_eq!(exit_code(&[], 0), ExitCode::Success);
        assert_eq!(exit_code(&[], 2), ExitCode::DiagnosticsFound);

        let read = Failure {
            path: PathBuf::from("a.rst"),
            error: ValidationError::Read {
                path: PathBuf::from("a.rst"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            },
        };
        assert_eq!(exit_code(std::slice::from_ref(&read), 2), ExitCode::IoError);

        let validator = Failure {
            path: PathBuf::from("b.rst"),
            error: ValidationError::Validator {
                path: PathBuf::from("b.rst"),
                message: "No module named 'docutils'".to_string(),
            },
        };
        assert_eq!(exit_code(&[read, validator], 0), ExitCode::ValidatorError);
    }
}
