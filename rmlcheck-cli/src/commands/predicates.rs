use super::{load_index, render, Settings};
use crate::error::CliResult;
use crate::output;
use rmlcheck_core::PredicateRef;
use std::path::Path;

pub fn run(mapping: &Path, settings: &Settings) -> CliResult<()> {
    let index = load_index(mapping)?;
    let predicates: Vec<PredicateRef> = index.predicates().cloned().collect();

    render(settings, &predicates, |predicates| {
        output::with_diagnostics(output::predicates_text(predicates), index.gaps())
    })
}
