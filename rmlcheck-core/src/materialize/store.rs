//! Relational store seam
//!
//! Materialization only needs "run this query, give me named columns".
//! [`RelationalStore`] is that seam; [`StoreSession`] owns an open store for
//! the length of a run and makes sure it gets closed.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// A scalar cell value
///
/// Integers outside `i64` land in `UInt` so they keep every digit; floats
/// always render with a fractional part or exponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::UInt(u) => write!(f, "{u}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UInt(u)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One result row: column name → value, in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style cell insertion
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.cells.push((column.into(), value.into()));
    }

    /// Value of a column; names compare exactly
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.push(k, v);
        }
        row
    }
}

/// Rows returned by one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Build a result set, taking column names from the first row
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns = rows
            .first()
            .map(|r| r.columns().map(str::to_string).collect())
            .unwrap_or_default();
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Executes relational queries for materialization
pub trait RelationalStore {
    /// Run a query and return every row
    fn execute(&mut self, query: &str) -> Result<ResultSet, QueryError>;

    /// Release the underlying connection
    fn close(&mut self) -> Result<(), QueryError> {
        Ok(())
    }
}

impl<S: RelationalStore + ?Sized> RelationalStore for Box<S> {
    fn execute(&mut self, query: &str) -> Result<ResultSet, QueryError> {
        (**self).execute(query)
    }

    fn close(&mut self) -> Result<(), QueryError> {
        (**self).close()
    }
}

/// Opens a [`RelationalStore`]
pub trait StoreConnector {
    type Store: RelationalStore;

    fn connect(&self) -> Result<Self::Store, QueryError>;
}

/// An open store, closed exactly once
///
/// Call [`StoreSession::close`] to observe close errors; otherwise the store
/// is closed on drop and errors are logged.
pub struct StoreSession<S: RelationalStore> {
    store: S,
    closed: bool,
}

impl<S: RelationalStore> StoreSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            closed: false,
        }
    }

    /// Connect through `connector` and wrap the result
    pub fn open<C>(connector: &C) -> Result<Self, QueryError>
    where
        C: StoreConnector<Store = S>,
    {
        connector.connect().map(Self::new)
    }

    pub fn close(mut self) -> Result<(), QueryError> {
        self.closed = true;
        self.store.close()
    }
}

impl<S: RelationalStore> Deref for StoreSession<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.store
    }
}

impl<S: RelationalStore> DerefMut for StoreSession<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

impl<S: RelationalStore> Drop for StoreSession<S> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.store.close() {
                tracing::warn!(error = %e, "failed to close store");
            }
        }
    }
}

/// In-memory store answering canned queries
///
/// Queries are looked up after trimming surrounding whitespace. Clones share
/// the execution log and the closed flag, so a clone handed out by
/// [`StoreConnector::connect`] can still be inspected through the original.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    results: HashMap<String, Result<ResultSet, QueryError>>,
    executed: Rc<RefCell<Vec<String>>>,
    closed: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `rows`
    pub fn with_rows(mut self, query: &str, rows: Vec<Row>) -> Self {
        self.results
            .insert(query.trim().to_string(), Ok(ResultSet::from_rows(rows)));
        self
    }

    pub fn with_result(mut self, query: &str, result: ResultSet) -> Self {
        self.results.insert(query.trim().to_string(), Ok(result));
        self
    }

    /// Fail `query` with `message`
    pub fn with_failure(mut self, query: &str, message: &str) -> Self {
        self.results
            .insert(query.trim().to_string(), Err(QueryError::new(message)));
        self
    }

    /// Queries executed so far, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl RelationalStore for MemoryStore {
    fn execute(&mut self, query: &str) -> Result<ResultSet, QueryError> {
        if self.closed.get() {
            return Err(QueryError::new("store is closed"));
        }
        let key = query.trim();
        self.executed.borrow_mut().push(key.to_string());
        self.results
            .get(key)
            .cloned()
            .unwrap_or_else(|| Err(QueryError::new(format!("no result registered for {key:?}"))))
    }

    fn close(&mut self) -> Result<(), QueryError> {
        self.closed.set(true);
        Ok(())
    }
}

impl StoreConnector for MemoryStore {
    type Store = MemoryStore;

    fn connect(&self) -> Result<MemoryStore, QueryError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(5).to_string(), "5");
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Float(5.0).to_string(), "5.0");
        assert_eq!(Value::UInt(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_row_lookup_is_exact() {
        let row = Row::new().with("id", 5).with("Name", "x");
        assert_eq!(row.get("id"), Some(&Value::Int(5)));
        assert!(row.get("name").is_none());
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "Name"]);
    }

    #[test]
    fn test_result_set_columns_from_first_row() {
        let rs = ResultSet::from_rows(vec![Row::new().with("a", 1).with("b", 2)]);
        assert_eq!(rs.columns, vec!["a", "b"]);
        assert!(ResultSet::from_rows(Vec::new()).columns.is_empty());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new()
            .with_rows("SELECT id FROM t", vec![Row::new().with("id", 1)])
            .with_failure("SELECT broken", "syntax error");

        assert_eq!(store.execute("  SELECT id FROM t\n").unwrap().len(), 1);
        assert_eq!(
            store.execute("SELECT broken").unwrap_err().message,
            "syntax error"
        );
        assert!(store.execute("SELECT other").is_err());
        assert_eq!(store.executed().len(), 3);
    }

    #[test]
    fn test_session_closes_on_drop() {
        let store = MemoryStore::new();
        {
            let _session = StoreSession::open(&store).unwrap();
            assert!(!store.is_closed());
        }
        assert!(store.is_closed());
    }

    #[test]
    fn test_session_explicit_close() {
        let store = MemoryStore::new();
        let mut session = StoreSession::open(&store).unwrap();
        assert!(session.execute("SELECT 1").is_err());
        session.close().unwrap();
        assert!(store.is_closed());
        assert_eq!(store.executed(), vec!["SELECT 1".to_string()]);
    }

    #[test]
    fn test_value_deserializes_from_json() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, 3, 18446744073709551615, 2.5, 5.0, "x"]"#)
                .unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(3),
                Value::UInt(u64::MAX),
                Value::Float(2.5),
                Value::Float(5.0),
                Value::Text("x".to_string())
            ]
        );
    }
}
