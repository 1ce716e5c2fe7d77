use crate::{ExitCode, OutputFormat, SettingsOverrides};
use anyhow::{Context, Result};
use colored::Colorize;
use rst_analysis::{Checker, DiagnosticFilter, DocutilsValidator, ValidationRunner};
use rst_config::{find_settings, load_settings, ConfigDiscovery, InterpreterExecutor, Settings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Extension of the documents a directory expands to
const DOCUMENT_EXTENSION: &str = "rst";

/// Settings resolved for one command invocation.
pub struct CommandContext {
    pub settings: Settings,
    /// Directory relative settings paths are resolved against
    pub base_dir: PathBuf,
}

impl CommandContext {
    /// Load settings (explicit path, or found by walking up from the working
    /// directory) and overlay command-line values.
    ///
    /// Exits with [`ExitCode::ConfigError`] when settings cannot be loaded.
    pub fn load(overrides: SettingsOverrides, format: OutputFormat) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let settings_path = match overrides.config {
            Some(path) => Some(path),
            None => find_settings(&cwd).unwrap_or_else(|e| fail_settings(format, &e.to_string())),
        };

        let (settings, base_dir) = match settings_path {
            Some(path) => {
                let settings = load_settings(&path).unwrap_or_else(|e| {
                    fail_settings(format, &format!("{}: {e}", path.display()))
                });
                let base_dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map_or_else(|| cwd.clone(), Path::to_path_buf);
                (settings, base_dir)
            }
            None => (Settings::default(), cwd.clone()),
        };

        let settings = settings.with_overrides(
            overrides.interpreter,
            overrides.boundary.map(|b| cwd.join(b)),
            overrides.report_level.map(|level| level.to_string()),
        );

        tracing::debug!(
            base_dir = %base_dir.display(),
            interpreter = settings.interpreter(),
            "Settings resolved"
        );
        Ok(Self { settings, base_dir })
    }

    /// Build the checker the settings describe.
    pub fn checker(&self) -> Result<Checker> {
        let discovery = ConfigDiscovery::new(self.settings.artifact_names())
            .with_boundary(self.settings.resolved_boundary(&self.base_dir));
        let interpreter = self.settings.interpreter();

        let runner = ValidationRunner::new(
            discovery,
            Arc::new(InterpreterExecutor::new(interpreter)),
            Arc::new(
                DocutilsValidator::new(interpreter)
                    .with_sphinx_builtins(self.settings.sphinx_builtins()),
            ),
        )
        .with_ignored(
            self.settings.ignore.roles.clone(),
            self.settings.ignore.directives.clone(),
        );

        let filter = DiagnosticFilter::new(self.settings.report_level())
            .with_ignored_messages(self.settings.ignore.messages.as_deref())
            .context("Invalid 'ignore.messages' pattern")?;

        Ok(Checker::new(runner).with_filter(filter))
    }
}

/// Report a settings failure in the requested format and exit.
fn fail_settings(format: OutputFormat, message: &str) -> ! {
    match format {
        OutputFormat::Human => eprintln!("{} {message}", "✗ Failed to load settings:".red()),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": message })),
        OutputFormat::Github => eprintln!("::error ::Failed to load settings: {message}"),
    }
    ExitCode::ConfigError.exit()
}

/// Expand `paths` into the documents to check.
///
/// Files are taken as given; directories are searched recursively for
/// `*.rst` files, skipping hidden entries. The result is sorted and free of
/// duplicates. Missing paths are an error.
pub fn collect_documents(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for path in paths {
        if path.is_dir() {
            let walker = WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));
            for entry in walker {
                let entry = entry.with_context(|| format!("Failed to read {}", path.display()))?;
                let is_document = entry.file_type().is_file()
                    && entry.path().extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION);
                if is_document {
                    documents.push(entry.into_path());
                }
            }
        } else if path.is_file() {
            documents.push(path.clone());
        } else {
            anyhow::bail!("No such file or directory: {}", path.display());
        }
    }

    documents.sort();
    documents.dedup();
    tracing::debug!(documents = documents.len(), "Collected documents");
    Ok(documents)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}
