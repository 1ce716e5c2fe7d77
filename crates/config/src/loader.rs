use crate::{ConfigError, Result, Settings};
use rst_types::DiagnosticSeverity;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file names to search for, in order of preference
const SETTINGS_FILES: &[&str] = &[
    ".rst-check.yml",
    ".rst-check.yaml",
    ".rst-check.json",
    ".rst-check.toml",
    "rst-check.toml",
];

/// Find a settings file by walking up the directory tree from the given start directory.
/// Returns the path to the settings file if found.
#[tracing::instrument(fields(start = %start_dir.display()))]
pub fn find_settings(start_dir: &Path) -> Result<Option<PathBuf>> {
    let mut current_dir = start_dir.to_path_buf();
    let mut checked_dirs = 0;

    loop {
        tracing::trace!(dir = %current_dir.display(), "Checking directory for settings files");
        for file_name in SETTINGS_FILES {
            let settings_path = current_dir.join(file_name);
            if settings_path.is_file() {
                tracing::info!(path = %settings_path.display(), checked_dirs, "Found settings file");
                return Ok(Some(settings_path));
            }
        }

        checked_dirs += 1;
        if !current_dir.pop() {
            tracing::debug!(checked_dirs, "No settings file found");
            break;
        }
    }

    Ok(None)
}

/// Load settings from the specified path.
/// Automatically detects the format based on file extension.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_settings(path: &Path) -> Result<Settings> {
    tracing::debug!("Reading settings file");
    let contents = fs::read_to_string(path)?;
    let settings = load_settings_from_str(&contents, path)?;
    tracing::info!(
        interpreter = settings.interpreter(),
        report_level = %settings.report_level(),
        "Settings loaded successfully"
    );
    Ok(settings)
}

/// Load settings from a string.
/// The path is used for error messages and format detection.
#[tracing::instrument(skip(contents), fields(path = %path.display(), size = contents.len()))]
pub fn load_settings_from_str(contents: &str, path: &Path) -> Result<Settings> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

    tracing::debug!(extension, "Detecting settings format");

    let settings = match extension {
        "yml" | "yaml" => parse_yaml(contents, path)?,
        "json" => parse_json(contents, path)?,
        "toml" => parse_toml(contents, path)?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    validate_settings(&settings, path)?;

    Ok(settings)
}

fn parse_yaml(contents: &str, path: &Path) -> Result<Settings> {
    // An empty YAML document deserializes to unit, not a map
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_saphyr::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("YAML parse error: {e}"),
    })
}

fn parse_json(contents: &str, path: &Path) -> Result<Settings> {
    serde_json::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("JSON parse error: {e}"),
    })
}

fn parse_toml(contents: &str, path: &Path) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("TOML parse error: {e}"),
    })
}

/// Validate the loaded settings
#[tracing::instrument(skip(settings, path), fields(path = %path.display()))]
fn validate_settings(settings: &Settings, path: &Path) -> Result<()> {
    let invalid = |message: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    };

    if let Some(interpreter) = &settings.interpreter {
        if interpreter.trim().is_empty() {
            return Err(invalid("'interpreter' must not be empty".to_string()));
        }
    }

    if let Some(names) = &settings.artifact_names {
        if names.is_empty() {
            return Err(invalid("'artifact_names' must list at least one file name".to_string()));
        }
        for name in names {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                return Err(invalid(format!(
                    "'artifact_names' entry '{name}' must be a plain file name"
                )));
            }
        }
    }

    if let Some(level) = &settings.report_level {
        level
            .parse::<DiagnosticSeverity>()
            .map_err(|e| invalid(e.to_string()))?;
    }

    for (field, names) in [
        ("ignore.roles", &settings.ignore.roles),
        ("ignore.directives", &settings.ignore.directives),
    ] {
        if names.iter().any(|name| name.trim().is_empty()) {
            return Err(invalid(format!("'{field}' contains an empty name")));
        }
    }

    if let Some(pattern) = &settings.ignore.messages {
        regex::Regex::new(pattern)
            .map_err(|e| invalid(format!("'ignore.messages' is not a valid regex: {e}")))?;
    }

    tracing::debug!("Settings validation passed");
    Ok(())
}
