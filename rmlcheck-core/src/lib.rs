//! Consistency checks for RML / R2RML mappings
//!
//! This crate reads declarative field-to-identifier mappings and checks them
//! two ways: statically, by compiling every identifier template and matching
//! the templates against each other, and against data, by running each rule's
//! logical source query and binding the rows into its subject template.
//!
//! # Key Features
//!
//! - **Mapping index**: rules, predicates, subject templates, object mappings
//!   and logical sources extracted once from any
//!   [`TriplePatterns`](graph::TriplePatterns) source
//! - **Template compilation**: placeholders, literal segments, example
//!   identifiers and an anchored matcher that treats literal text verbatim
//! - **Template catalog**: self-check and cross-check of all subject templates
//! - **Predicate/object grouping** for reporting
//! - **Subject materialization** through the [`RelationalStore`] seam
//!
//! # Supported mapping vocabulary
//!
//! - `rml:` (`http://w3id.org/rml/`), the legacy `http://semweb.mmlab.be/ns/rml#`
//!   namespace, and `rr:` (R2RML)
//! - `logicalSource` / `logicalTable` with `query`, `sqlQuery` or `tableName`
//! - `subjectMap` with `template`
//! - `predicateObjectMap` with `predicateMap` / `objectMap` (`constant`,
//!   `template`, `reference`, `column`) and the `predicate` / `object` shortcuts
//! - `parentTriplesMap` object maps
//!
//! # Usage
//!
//! Load a document with [`MappingLoader::from_turtle()`] or
//! [`MappingLoader::from_file()`], build the [`MappingIndex`], then run a
//! [`Pipeline`] against a [`StoreConnector`].

pub mod error;
pub mod graph;
pub mod grouper;
pub mod index;
pub mod loader;
pub mod materialize;
pub mod pipeline;
pub mod template;
pub mod vocab;

pub use error::{CheckError, CheckResult, Diagnostic, QueryError};
pub use graph::{MappingGraph, Term, Triple, TriplePatterns};
pub use grouper::{group_object_mappings, GroupedObject, PredicateObjectGroups};
pub use index::{
    LogicalSource, MappingIndex, MappingRule, ObjectMapping, PredicateDeclaration, PredicateRef,
    SubjectTemplate, ValueKind,
};
pub use loader::MappingLoader;
pub use materialize::{
    bind_row, MaterializeOptions, Materialization, MaterializedIdentifier, MemoryStore,
    PredicateSubjects, RelationalStore, ResultSet, Row, StoreConnector, StoreSession,
    SubjectMaterializer, SubjectOutcome, Value,
};
pub use pipeline::{CheckOptions, CheckReport, Pipeline};
pub use template::{matches, CompiledTemplate, TemplateCatalog, TemplateWarning, DEFAULT_SENTINEL};
pub use vocab::{LegacyRML, R2RML, RML};
