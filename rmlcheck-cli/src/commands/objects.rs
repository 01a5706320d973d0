use super::{load_index, render, Settings};
use crate::error::CliResult;
use crate::output;
use rmlcheck_core::group_object_mappings;
use std::path::Path;

pub fn run(mapping: &Path, settings: &Settings) -> CliResult<()> {
    let index = load_index(mapping)?;
    let groups = group_object_mappings(index.object_mappings());
    tracing::debug!(
        predicates = groups.len(),
        objects = groups.object_count(),
        "grouped object mappings"
    );

    render(settings, &groups, |groups| {
        output::with_diagnostics(output::objects_text(groups), index.gaps())
    })
}
