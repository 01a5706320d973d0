use super::{load_index, render, Settings};
use crate::cli::{StoreArgs, TemplateArgs};
use crate::config::{self, FileConfig};
use crate::error::CliResult;
use crate::output;
use rmlcheck_core::template::{CrossMatch, ObjectLink, SelfCheck};
use rmlcheck_core::{Diagnostic, Pipeline};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct TemplatesReport {
    sentinel: String,
    self_check: Vec<SelfCheck>,
    cross_check: Vec<CrossMatch>,
    object_links: Vec<ObjectLink>,
    diagnostics: Vec<Diagnostic>,
}

pub fn run(
    mapping: &Path,
    templates: &TemplateArgs,
    file: &FileConfig,
    settings: &Settings,
) -> CliResult<()> {
    let options = config::check_options(templates, &StoreArgs::default(), file, true)?;
    let index = load_index(mapping)?;
    let catalog = Pipeline::new(&index).with_options(options).catalog()?;

    let mut diagnostics = index.gaps().to_vec();
    diagnostics.extend(catalog.diagnostics().iter().cloned());

    let report = TemplatesReport {
        sentinel: catalog.sentinel().to_string(),
        self_check: catalog.self_check(),
        cross_check: catalog.cross_check(),
        object_links: catalog.object_links(&index),
        diagnostics,
    };

    render(settings, &report, |r| {
        output::with_diagnostics(
            output::templates_text(&r.self_check, &r.cross_check, &r.object_links),
            &r.diagnostics,
        )
    })
}
