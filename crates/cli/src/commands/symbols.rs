use crate::commands::common::CommandContext;
use crate::{ExitCode, OutputFormat, SettingsOverrides};
use anyhow::Result;
use colored::Colorize;
use rst_types::{SymbolKind, SymbolRegistry};
use std::path::Path;

const KINDS: [SymbolKind; 4] = [
    SymbolKind::Role,
    SymbolKind::Directive,
    SymbolKind::Substitution,
    SymbolKind::Target,
];

/// Print the artifact governing `path` and what it declares.
#[tracing::instrument(skip(overrides, format), fields(path = %path.display()))]
pub fn run(path: &Path, overrides: SettingsOverrides, format: OutputFormat) -> Result<()> {
    if !path.exists() {
        match format {
            OutputFormat::Json => eprintln!(
                "{}",
                serde_json::json!({ "error": format!("No such file or directory: {}", path.display()) })
            ),
            _ => eprintln!(
                "{} No such file or directory: {}",
                "✗".red().bold(),
                path.display()
            ),
        }
        ExitCode::IoError.exit();
    }

    let ctx = CommandContext::load(overrides, format)?;
    let checker = ctx.checker()?;
    let scope = checker.runner().resolve(path);
    let registry = &scope.harvest.registry;

    match format {
        OutputFormat::Json => {
            let symbols: Vec<serde_json::Value> = registry
                .definitions()
                .into_iter()
                .map(|def| {
                    serde_json::json!({
                        "kind": def.kind.to_string(),
                        "name": def.name,
                        "linkable": def.is_linkable,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "path": path.display().to_string(),
                "artifact": scope.artifact.as_ref().map(|a| a.path().display().to_string()),
                "symbols": symbols,
                "warning": scope.harvest.warning.as_ref().map(|w| w.message.clone()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human | OutputFormat::Github => {
            match &scope.artifact {
                Some(artifact) => println!("{} {}", "Artifact:".bold(), artifact.path().display()),
                None => {
                    println!("{}", "No governing artifact; nothing is reconciled".yellow());
                    return Ok(());
                }
            }
            if let Some(warning) = &scope.harvest.warning {
                eprintln!("{} {warning}", "warning:".yellow().bold());
            }
            for line in summary_lines(registry) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

/// One line per symbol kind, e.g. `substitutions (2): build*, version`.
/// Linkable substitutions are marked with `*`.
fn summary_lines(registry: &SymbolRegistry) -> Vec<String> {
    KINDS
        .iter()
        .map(|&kind| {
            let names: Vec<String> = registry
                .definitions()
                .into_iter()
                .filter(|def| def.kind == kind)
                .map(|def| {
                    if def.is_linkable {
                        format!("{}*", def.name)
                    } else {
                        def.name.clone()
                    }
                })
                .collect();
            let listing = if names.is_empty() {
                "-".to_string()
            } else {
                names.join(", ")
            };
            format!("  {kind}s ({}): {listing}", names.len())
        })
        .collect()
}
