//! Relational stores available from the command line

mod fixtures;
#[cfg(feature = "postgres")]
mod pg;

use crate::config::StoreSource;
use crate::error::CliResult;
use rmlcheck_core::{MemoryStore, QueryError, RelationalStore, StoreConnector};

/// Opens whichever store the settings selected
pub enum Connector {
    #[cfg(feature = "postgres")]
    Postgres(pg::PostgresConnector),
    Fixtures(MemoryStore),
}

impl Connector {
    pub fn from_source(source: &StoreSource) -> CliResult<Self> {
        match source {
            StoreSource::Fixtures(path) => Ok(Connector::Fixtures(fixtures::load(path)?)),
            #[cfg(feature = "postgres")]
            StoreSource::Database(url) => Ok(Connector::Postgres(pg::PostgresConnector::new(
                url.clone(),
            ))),
            #[cfg(not(feature = "postgres"))]
            StoreSource::Database(_) => Err(crate::error::CliError::Usage(
                "--database-url requires rmlcheck built with the `postgres` feature".to_string(),
            )),
        }
    }
}

impl StoreConnector for Connector {
    type Store = Box<dyn RelationalStore>;

    fn connect(&self) -> Result<Self::Store, QueryError> {
        match self {
            #[cfg(feature = "postgres")]
            Connector::Postgres(c) => Ok(Box::new(c.connect()?)),
            Connector::Fixtures(store) => Ok(Box::new(store.connect()?)),
        }
    }
}
