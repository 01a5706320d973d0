use super::{load_index, render, Settings};
use crate::cli::{StoreArgs, TemplateArgs};
use crate::config::{self, FileConfig};
use crate::error::CliResult;
use crate::output;
use crate::store::Connector;
use rmlcheck_core::Pipeline;
use std::path::Path;

pub fn run(
    mapping: &Path,
    templates: &TemplateArgs,
    store: &StoreArgs,
    no_materialize: bool,
    file: &FileConfig,
    settings: &Settings,
) -> CliResult<()> {
    let options = config::check_options(templates, store, file, no_materialize)?;
    let index = load_index(mapping)?;
    let pipeline = Pipeline::new(&index).with_options(options);

    let source = config::resolve_store(store, file);
    let report = match source {
        Some(source) if pipeline.options().materialize => {
            let connector = Connector::from_source(&source)?;
            pipeline.run(&connector)?
        }
        Some(_) => pipeline.analyze()?,
        None => {
            if pipeline.options().materialize {
                tracing::info!("no relational store configured; skipping materialization");
            }
            pipeline.analyze()?
        }
    };

    render(settings, &report, output::report_text)
}
