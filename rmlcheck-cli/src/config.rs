//! Configuration file support.
//!
//! Settings come from `rmlcheck.toml` (or the file named by `--config`),
//! merged with CLI args and environment variables.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI arguments
//! 2. Environment variables (`RMLCHECK_DATABASE_URL`)
//! 3. Config file
//! 4. Hardcoded defaults

use crate::cli::{OutputFormat, StoreArgs, TemplateArgs};
use crate::error::{CliError, CliResult};
use rmlcheck_core::{CheckOptions, DEFAULT_SENTINEL};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "rmlcheck.toml";

// ---------------------------------------------------------------------------
// File config serde types (all Option; absence means "not set in file")
// ---------------------------------------------------------------------------

/// Top-level config file structure.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub mapping: Option<PathBuf>,
    pub database_url: Option<String>,
    pub fixtures: Option<PathBuf>,
    pub format: Option<OutputFormat>,

    /// `[templates]`
    #[serde(default)]
    pub templates: Option<TemplatesFileConfig>,

    /// `[materialize]`
    #[serde(default)]
    pub materialize: Option<MaterializeFileConfig>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TemplatesFileConfig {
    pub sentinel: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MaterializeFileConfig {
    pub enabled: Option<bool>,
    pub verify_identifiers: Option<bool>,
}

impl FileConfig {
    /// Parse config text; relative paths are resolved against `base_dir`
    pub fn parse(content: &str, base_dir: &Path) -> CliResult<Self> {
        let mut config: FileConfig = toml::from_str(content)?;
        config.mapping = config.mapping.map(|p| rebase(base_dir, p));
        config.fixtures = config.fixtures.map(|p| rebase(base_dir, p));
        Ok(config)
    }

    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::parse(&content, base_dir)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Load the explicit config file, or `rmlcheck.toml` if it exists
    pub fn discover(explicit: Option<&Path>) -> CliResult<Self> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::load(path)
            }
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn sentinel(&self) -> Option<&str> {
        self.templates.as_ref()?.sentinel.as_deref()
    }

    fn materialize_enabled(&self) -> Option<bool> {
        self.materialize.as_ref()?.enabled
    }

    fn verify_identifiers(&self) -> Option<bool> {
        self.materialize.as_ref()?.verify_identifiers
    }
}

fn rebase(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Where materialization reads rows from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    Database(String),
    Fixtures(PathBuf),
}

pub fn resolve_mapping(cli: Option<PathBuf>, file: &FileConfig) -> CliResult<PathBuf> {
    cli.or_else(|| file.mapping.clone())
        .ok_or(CliError::NoMapping)
}

pub fn resolve_format(cli: Option<OutputFormat>, file: &FileConfig) -> OutputFormat {
    cli.or(file.format).unwrap_or_default()
}

/// Pick the store: fixtures before a database, CLI/env before the file
pub fn resolve_store(args: &StoreArgs, file: &FileConfig) -> Option<StoreSource> {
    if let Some(path) = &args.fixtures {
        return Some(StoreSource::Fixtures(path.clone()));
    }
    if let Some(url) = &args.database_url {
        return Some(StoreSource::Database(url.clone()));
    }
    if let Some(path) = &file.fixtures {
        return Some(StoreSource::Fixtures(path.clone()));
    }
    file.database_url.clone().map(StoreSource::Database)
}

/// `--verify` / `--no-verify` beat `[materialize] verify_identifiers`
fn resolve_verify(store: &StoreArgs, file: &FileConfig) -> bool {
    if store.verify {
        true
    } else if store.no_verify {
        false
    } else {
        file.verify_identifiers().unwrap_or(false)
    }
}

/// Build core check options from CLI flags and the config file
pub fn check_options(
    templates: &TemplateArgs,
    store: &StoreArgs,
    file: &FileConfig,
    no_materialize: bool,
) -> CliResult<CheckOptions> {
    let sentinel = templates
        .sentinel
        .clone()
        .or_else(|| file.sentinel().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_SENTINEL.to_string());

    let options = CheckOptions {
        sentinel,
        verify_identifiers: resolve_verify(store, file),
        materialize: !no_materialize && file.materialize_enabled().unwrap_or(true),
    };
    options.validate()?;
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
mapping = "mappings/university.ttl"
database_url = "postgresql://localhost/univ"
format = "json"

[templates]
sentinel = "X"

[materialize]
enabled = false
verify_identifiers = true
"#;

    #[test]
    fn test_parse_full_config() {
        let config = FileConfig::parse(SAMPLE, Path::new("/etc/rmlcheck")).unwrap();
        assert_eq!(
            config.mapping,
            Some(PathBuf::from("/etc/rmlcheck/mappings/university.ttl"))
        );
        assert_eq!(config.format, Some(OutputFormat::Json));
        assert_eq!(config.sentinel(), Some("X"));
        assert_eq!(config.materialize_enabled(), Some(false));
        assert_eq!(config.verify_identifiers(), Some(true));
    }

    #[test]
    fn test_empty_config() {
        let config = FileConfig::parse("", Path::new(".")).unwrap();
        assert!(config.mapping.is_none());
        assert_eq!(resolve_format(None, &config), OutputFormat::Text);
    }

    #[test]
    fn test_invalid_config() {
        let err = FileConfig::parse("format = \"yaml\"", Path::new(".")).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = FileConfig::parse(SAMPLE, Path::new("/cfg")).unwrap();

        let mapping = resolve_mapping(Some(PathBuf::from("cli.ttl")), &config).unwrap();
        assert_eq!(mapping, PathBuf::from("cli.ttl"));
        assert_eq!(
            resolve_format(Some(OutputFormat::Text), &config),
            OutputFormat::Text
        );

        let args = StoreArgs {
            database_url: Some("postgresql://cli/db".to_string()),
            ..StoreArgs::default()
        };
        assert_eq!(
            resolve_store(&args, &config),
            Some(StoreSource::Database("postgresql://cli/db".to_string()))
        );

        let templates = TemplateArgs {
            sentinel: Some("Z".to_string()),
        };
        let options = check_options(&templates, &args, &config, false).unwrap();
        assert_eq!(options.sentinel, "Z");
        assert!(options.verify_identifiers);
        assert!(!options.materialize);
    }

    #[test]
    fn test_file_fills_gaps() {
        let config = FileConfig::parse(SAMPLE, Path::new("/cfg")).unwrap();
        assert_eq!(
            resolve_store(&StoreArgs::default(), &config),
            Some(StoreSource::Database("postgresql://localhost/univ".to_string()))
        );
        let options =
            check_options(&TemplateArgs::default(), &StoreArgs::default(), &config, false).unwrap();
        assert_eq!(options.sentinel, "X");
    }

    #[test]
    fn test_fixtures_take_precedence() {
        let args = StoreArgs {
            database_url: Some("postgresql://env/db".to_string()),
            fixtures: Some(PathBuf::from("rows.json")),
            ..StoreArgs::default()
        };
        assert_eq!(
            resolve_store(&args, &FileConfig::default()),
            Some(StoreSource::Fixtures(PathBuf::from("rows.json")))
        );
    }

    #[test]
    fn test_no_verify_overrides_file() {
        let config = FileConfig::parse(SAMPLE, Path::new("/cfg")).unwrap();
        let templates = TemplateArgs::default();

        let args = StoreArgs {
            no_verify: true,
            ..StoreArgs::default()
        };
        let options = check_options(&templates, &args, &config, false).unwrap();
        assert!(!options.verify_identifiers);

        let options =
            check_options(&templates, &StoreArgs::default(), &config, false).unwrap();
        assert!(options.verify_identifiers);

        let args = StoreArgs {
            verify: true,
            ..StoreArgs::default()
        };
        let options =
            check_options(&templates, &args, &FileConfig::default(), false).unwrap();
        assert!(options.verify_identifiers);
    }

    #[test]
    fn test_missing_mapping() {
        let err = resolve_mapping(None, &FileConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::NoMapping));
    }

    #[test]
    fn test_empty_sentinel_rejected() {
        let templates = TemplateArgs {
            sentinel: Some(String::new()),
        };
        let err = check_options(
            &templates,
            &StoreArgs::default(),
            &FileConfig::default(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
