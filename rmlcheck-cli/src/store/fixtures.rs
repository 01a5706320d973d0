//! Canned query results read from a JSON file
//!
//! The file maps each query text to its rows, or to an error message:
//!
//! ```json
//! {
//!   "SELECT id FROM person": [{ "id": 5 }, { "id": 6 }],
//!   "SELECT * FROM course": { "error": "relation \"course\" does not exist" }
//! }
//! ```
//!
//! Queries not listed fail at execution time.

use crate::error::{CliError, CliResult};
use rmlcheck_core::{MemoryStore, Row, Value};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum Fixture {
    Rows(Vec<BTreeMap<String, Value>>),
    Failure { error: String },
}

pub fn load(path: &Path) -> CliResult<MemoryStore> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CliError::Input(format!("cannot read fixtures {}: {e}", path.display()))
    })?;
    parse(&content)
}

pub fn parse(content: &str) -> CliResult<MemoryStore> {
    let fixtures: BTreeMap<String, Fixture> = serde_json::from_str(content)?;

    let mut store = MemoryStore::new();
    for (query, fixture) in fixtures {
        store = match fixture {
            Fixture::Rows(rows) => store.with_rows(
                &query,
                rows.into_iter().map(|cells| cells.into_iter().collect::<Row>()).collect(),
            ),
            Fixture::Failure { error } => store.with_failure(&query, &error),
        };
    }
    Ok(store)
}
