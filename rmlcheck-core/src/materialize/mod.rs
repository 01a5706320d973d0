//! Subject materialization
//!
//! For every declared predicate, run the logical source query of each rule
//! declaring it and bind the returned rows into that rule's subject template.
//! Reference predicates name a column rather than a fixed predicate, so there
//! is no query that could resolve them; they are reported as such.
//!
//! Problems with one rule or one predicate never abort the run. They are
//! recorded as [`Diagnostic`]s next to the outcomes.

mod store;

pub use store::{
    MemoryStore, RelationalStore, ResultSet, Row, StoreConnector, StoreSession, Value,
};

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::{Diagnostic, QueryError};
use crate::index::{MappingIndex, MappingRule, PredicateRef, NO_LOGICAL_SOURCE};
use crate::template::{matches, CompiledTemplate};

/// Materialization settings
#[derive(Debug, Clone, Default)]
pub struct MaterializeOptions {
    /// Match each produced identifier against the template that built it
    pub verify_identifiers: bool,
}

/// An identifier built from a store row
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MaterializedIdentifier {
    pub value: String,
    pub source_predicate: String,
}

/// What materialization produced for one predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SubjectOutcome {
    /// At least one identifier was produced
    Identifiers(BTreeSet<MaterializedIdentifier>),
    /// Reference predicate; no query was run
    NotResolvable,
    /// Queries ran (or there was nothing to run) but produced nothing
    NoMatchingSubjects,
    /// Every query attempted for the predicate failed
    QueryFailed(Vec<QueryError>),
}

impl SubjectOutcome {
    /// Human-readable status for outcomes that carry no identifiers
    pub fn message(&self) -> Option<&'static str> {
        match self {
            SubjectOutcome::Identifiers(_) => None,
            SubjectOutcome::NotResolvable => Some("Reference predicate, not queryable."),
            SubjectOutcome::NoMatchingSubjects => Some("No matching subjects found."),
            SubjectOutcome::QueryFailed(_) => Some("All queries failed."),
        }
    }

    pub fn identifiers(&self) -> Option<&BTreeSet<MaterializedIdentifier>> {
        match self {
            SubjectOutcome::Identifiers(ids) => Some(ids),
            _ => None,
        }
    }
}

/// Outcome for one predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredicateSubjects {
    pub predicate: PredicateRef,
    pub outcome: SubjectOutcome,
}

/// Result of a materialization run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Materialization {
    /// One entry per declared predicate, in predicate order
    pub predicates: Vec<PredicateSubjects>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Materialization {
    pub fn outcome(&self, predicate: &PredicateRef) -> Option<&SubjectOutcome> {
        self.predicates
            .iter()
            .find(|p| &p.predicate == predicate)
            .map(|p| &p.outcome)
    }

    /// Total identifiers across all predicates
    pub fn identifier_count(&self) -> usize {
        self.predicates
            .iter()
            .filter_map(|p| p.outcome.identifiers())
            .map(BTreeSet::len)
            .sum()
    }
}

/// Runs logical source queries and binds rows into subject templates
pub struct SubjectMaterializer<'a> {
    index: &'a MappingIndex,
    options: MaterializeOptions,
}

/// Per-predicate accumulator
#[derive(Default)]
struct PredicateRun {
    identifiers: BTreeSet<MaterializedIdentifier>,
    attempted: usize,
    errors: Vec<QueryError>,
}

impl<'a> SubjectMaterializer<'a> {
    pub fn new(index: &'a MappingIndex) -> Self {
        Self::with_options(index, MaterializeOptions::default())
    }

    pub fn with_options(index: &'a MappingIndex, options: MaterializeOptions) -> Self {
        Self { index, options }
    }

    /// Materialize every predicate declared in the index
    pub fn run<S: RelationalStore + ?Sized>(&self, store: &mut S) -> Materialization {
        let mut result = Materialization::default();

        for predicate in self.index.predicates() {
            let outcome = self.materialize_predicate(predicate, store, &mut result.diagnostics);
            result.predicates.push(PredicateSubjects {
                predicate: predicate.clone(),
                outcome,
            });
        }

        tracing::info!(
            predicates = result.predicates.len(),
            identifiers = result.identifier_count(),
            diagnostics = result.diagnostics.len(),
            "materialization finished"
        );

        result
    }

    /// Materialize one predicate, appending problems to `diagnostics`
    pub fn materialize_predicate<S: RelationalStore + ?Sized>(
        &self,
        predicate: &PredicateRef,
        store: &mut S,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> SubjectOutcome {
        if predicate.is_reference() {
            tracing::debug!(%predicate, "reference predicate, skipping");
            return SubjectOutcome::NotResolvable;
        }

        let mut run = PredicateRun::default();
        for rule in self.index.rules_for_predicate(predicate) {
            self.materialize_rule(predicate, rule, store, &mut run, diagnostics);
        }

        if !run.identifiers.is_empty() {
            SubjectOutcome::Identifiers(run.identifiers)
        } else if run.attempted > 0 && run.errors.len() == run.attempted {
            SubjectOutcome::QueryFailed(run.errors)
        } else {
            SubjectOutcome::NoMatchingSubjects
        }
    }

    /// Whether indexing already reported a gap for `rule`
    fn has_extraction_gap(&self, rule: &str) -> bool {
        self.index
            .gaps()
            .iter()
            .any(|gap| matches!(gap, Diagnostic::ExtractionGap { rule: r, .. } if r == rule))
    }

    fn materialize_rule<S: RelationalStore + ?Sized>(
        &self,
        predicate: &PredicateRef,
        rule: &MappingRule,
        store: &mut S,
        run: &mut PredicateRun,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let Some(query) = rule.query() else {
            // Reported once per rule, whichever predicate reaches it first
            let gap = Diagnostic::ExtractionGap {
                rule: rule.id.clone(),
                detail: NO_LOGICAL_SOURCE.to_string(),
            };
            if self.has_extraction_gap(&rule.id) || diagnostics.contains(&gap) {
                tracing::debug!(rule = %rule.id, %predicate, "no logical source, skipping");
            } else {
                diagnostics.push(gap);
            }
            return;
        };
        let Some(source) = rule.template() else {
            tracing::debug!(rule = %rule.id, "no subject template, skipping");
            return;
        };
        let template = match CompiledTemplate::compile(source) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(rule = %rule.id, error = %e, "cannot compile subject template");
                diagnostics.push(Diagnostic::invalid_template(&rule.id, source, e));
                return;
            }
        };

        run.attempted += 1;
        let rows = match store.execute(query) {
            Ok(rows) => rows,
            Err(error) => {
                tracing::warn!(%predicate, rule = %rule.id, %error, "query failed");
                diagnostics.push(Diagnostic::QueryError {
                    predicate: predicate.to_string(),
                    rule: rule.id.clone(),
                    error: error.clone(),
                });
                run.errors.push(error);
                return;
            }
        };

        tracing::debug!(%predicate, rule = %rule.id, rows = rows.len(), "binding rows");

        // column → number of rows that could not bind it
        let mut unbound: BTreeMap<String, usize> = BTreeMap::new();
        for row in &rows.rows {
            match bind_row(&template, row) {
                Ok(value) => {
                    if self.options.verify_identifiers && !matches(&value, &template) {
                        diagnostics.push(Diagnostic::VerificationMismatch {
                            predicate: predicate.to_string(),
                            identifier: value.clone(),
                            template: source.to_string(),
                        });
                    }
                    run.identifiers.insert(MaterializedIdentifier {
                        value,
                        source_predicate: predicate.to_string(),
                    });
                }
                Err(column) => *unbound.entry(column).or_default() += 1,
            }
        }

        for (column, rows) in unbound {
            diagnostics.push(Diagnostic::BindingGap {
                predicate: predicate.to_string(),
                rule: rule.id.clone(),
                template: source.to_string(),
                column,
                rows,
            });
        }
    }
}

/// Substitute a row's values into the template
///
/// Returns the first placeholder whose column is absent or NULL.
pub fn bind_row(template: &CompiledTemplate, row: &Row) -> Result<String, String> {
    template.instantiate(|name| match row.get(name) {
        Some(value) if !value.is_null() => Ok(value.to_string()),
        _ => Err(name.to_string()),
    })
}
