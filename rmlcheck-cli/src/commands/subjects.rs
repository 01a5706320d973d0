use super::{load_index, render, Settings};
use crate::cli::{StoreArgs, TemplateArgs};
use crate::config::{self, FileConfig};
use crate::error::{CliError, CliResult};
use crate::output;
use crate::store::Connector;
use rmlcheck_core::Pipeline;
use std::path::Path;

pub fn run(
    mapping: &Path,
    store: &StoreArgs,
    file: &FileConfig,
    settings: &Settings,
) -> CliResult<()> {
    let source = config::resolve_store(store, file).ok_or_else(|| {
        CliError::Usage(
            "no relational store configured; pass --database-url or --fixtures".to_string(),
        )
    })?;
    let options = config::check_options(&TemplateArgs::default(), store, file, false)?;

    let index = load_index(mapping)?;
    let connector = Connector::from_source(&source)?;
    let result = Pipeline::new(&index)
        .with_options(options)
        .materialize(&connector)?;

    tracing::info!(
        identifiers = result.identifier_count(),
        diagnostics = result.diagnostics.len(),
        "materialized subjects"
    );

    render(settings, &result, |m| {
        output::with_diagnostics(output::subjects_text(&m.predicates), &m.diagnostics)
    })
}
