//! PostgreSQL store over the simple query protocol
//!
//! Every value comes back as text, which is all template binding needs.

use postgres::{Client, NoTls, SimpleQueryMessage};
use rmlcheck_core::{QueryError, RelationalStore, ResultSet, Row, StoreConnector, Value};

pub struct PostgresConnector {
    url: String,
}

impl PostgresConnector {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

impl StoreConnector for PostgresConnector {
    type Store = PostgresStore;

    fn connect(&self) -> Result<PostgresStore, QueryError> {
        let client =
            Client::connect(&self.url, NoTls).map_err(|e| QueryError::new(e.to_string()))?;
        tracing::info!("connected to PostgreSQL");
        Ok(PostgresStore {
            client: Some(client),
        })
    }
}

pub struct PostgresStore {
    client: Option<Client>,
}

impl RelationalStore for PostgresStore {
    fn execute(&mut self, query: &str) -> Result<ResultSet, QueryError> {
        let client = self
            .client
            .as_mut()
            .ok_or_else(|| QueryError::new("connection already closed"))?;

        let messages = client
            .simple_query(query)
            .map_err(|e| QueryError::new(e.to_string()))?;

        let mut result = ResultSet::default();
        for message in messages {
            match message {
                SimpleQueryMessage::RowDescription(columns) => {
                    result.columns = columns.iter().map(|c| c.name().to_string()).collect();
                }
                SimpleQueryMessage::Row(row) => {
                    let mut cells = Row::new();
                    for (i, column) in row.columns().iter().enumerate() {
                        let value = row.get(i).map_or(Value::Null, Value::from);
                        cells.push(column.name(), value);
                    }
                    result.rows.push(cells);
                }
                _ => {}
            }
        }

        tracing::debug!(rows = result.rows.len(), "query returned");
        Ok(result)
    }

    fn close(&mut self) -> Result<(), QueryError> {
        match self.client.take() {
            Some(client) => client.close().map_err(|e| QueryError::new(e.to_string())),
            None => Ok(()),
        }
    }
}
