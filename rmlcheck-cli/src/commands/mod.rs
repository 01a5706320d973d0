pub mod check;
pub mod objects;
pub mod predicates;
pub mod subjects;
pub mod templates;

use crate::cli::OutputFormat;
use crate::error::CliResult;
use crate::output;
use rmlcheck_core::{MappingIndex, MappingLoader};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Output settings resolved from flags and the config file
#[derive(Debug, Clone)]
pub struct Settings {
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

/// Parse the mapping document and index it.
pub fn load_index(path: &Path) -> CliResult<MappingIndex> {
    let index = MappingLoader::from_file(path)?.index();
    tracing::info!(path = %path.display(), rules = index.len(), "indexed mapping");
    Ok(index)
}

/// Render `value` as JSON or with the given text renderer, then emit it.
fn render<T, F>(settings: &Settings, value: &T, text: F) -> CliResult<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    let content = match settings.format {
        OutputFormat::Text => text(value),
        OutputFormat::Json => output::to_json(value)?,
    };
    output::emit(&content, settings.output.as_deref())
}
