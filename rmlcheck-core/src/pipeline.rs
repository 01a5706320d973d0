//! Check pipeline
//!
//! Composes the index, the template catalog, the grouper and the
//! materializer into a single [`CheckReport`]. The store, when one is used,
//! is opened once per run and closed before the report is returned.

use serde::Serialize;

use crate::error::{CheckError, CheckResult, Diagnostic};
use crate::grouper::{group_object_mappings, PredicateObjectGroups};
use crate::index::{MappingIndex, PredicateRef};
use crate::materialize::{
    MaterializeOptions, Materialization, PredicateSubjects, StoreConnector, StoreSession,
    SubjectMaterializer,
};
use crate::template::{CrossMatch, ObjectLink, SelfCheck, TemplateCatalog, DEFAULT_SENTINEL};

/// Options for a check run
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Placeholder substitute used for example identifiers
    pub sentinel: String,
    /// Match materialized identifiers against their templates
    pub verify_identifiers: bool,
    /// Run logical source queries at all
    pub materialize: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            verify_identifiers: false,
            materialize: true,
        }
    }
}

impl CheckOptions {
    pub fn validate(&self) -> CheckResult<()> {
        // An empty sentinel would let `{a}` examples fail their own `.+`
        if self.sentinel.is_empty() {
            return Err(CheckError::Config(
                "template sentinel must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn materialize_options(&self) -> MaterializeOptions {
        MaterializeOptions {
            verify_identifiers: self.verify_identifiers,
        }
    }
}

/// Everything learned about a mapping in one run
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub rules: usize,
    pub predicates: Vec<PredicateRef>,
    pub objects: PredicateObjectGroups,
    pub self_check: Vec<SelfCheck>,
    pub cross_check: Vec<CrossMatch>,
    pub object_links: Vec<ObjectLink>,
    /// Absent when materialization was not requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<PredicateSubjects>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    /// Check if every example identifier matched its own template
    pub fn self_check_passed(&self) -> bool {
        self.self_check.iter().all(|c| c.matches)
    }

    fn push_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diag in diagnostics {
            // The catalog and the materializer both report broken templates
            if !self.diagnostics.contains(&diag) {
                self.diagnostics.push(diag);
            }
        }
    }
}

/// Runs checks over one indexed mapping
pub struct Pipeline<'a> {
    index: &'a MappingIndex,
    options: CheckOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(index: &'a MappingIndex) -> Self {
        Self {
            index,
            options: CheckOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CheckOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    /// Template catalog built with the configured sentinel
    pub fn catalog(&self) -> CheckResult<TemplateCatalog> {
        self.options.validate()?;
        Ok(TemplateCatalog::with_sentinel(self.index, &self.options.sentinel))
    }

    /// Everything that can be checked without a store
    pub fn analyze(&self) -> CheckResult<CheckReport> {
        let catalog = self.catalog()?;

        let mut report = CheckReport {
            rules: self.index.len(),
            predicates: self.index.predicates().cloned().collect(),
            objects: group_object_mappings(self.index.object_mappings()),
            self_check: catalog.self_check(),
            cross_check: catalog.cross_check(),
            object_links: catalog.object_links(self.index),
            subjects: None,
            diagnostics: Vec::new(),
        };
        report.push_diagnostics(self.index.gaps().iter().cloned());
        report.push_diagnostics(catalog.diagnostics().iter().cloned());

        tracing::info!(
            rules = report.rules,
            predicates = report.predicates.len(),
            templates = report.self_check.len(),
            "analyzed mapping"
        );

        Ok(report)
    }

    /// Materialize subjects through a store opened from `connector`
    ///
    /// Failing to open the store is fatal; failing queries are not.
    pub fn materialize<C: StoreConnector>(&self, connector: &C) -> CheckResult<Materialization> {
        self.options.validate()?;

        let mut session =
            StoreSession::open(connector).map_err(|e| CheckError::StoreUnavailable(e.message))?;

        let materializer =
            SubjectMaterializer::with_options(self.index, self.options.materialize_options());
        let result = materializer.run(&mut *session);

        if let Err(e) = session.close() {
            tracing::warn!(error = %e, "failed to close store");
        }

        Ok(result)
    }

    /// Analyze, then materialize when enabled
    pub fn run<C: StoreConnector>(&self, connector: &C) -> CheckResult<CheckReport> {
        let mut report = self.analyze()?;

        if self.options.materialize {
            let result = self.materialize(connector)?;
            report.push_diagnostics(result.diagnostics);
            report.subjects = Some(result.predicates);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::index::{MappingRule, ValueKind};
    use crate::materialize::{MemoryStore, Row, SubjectOutcome};

    fn index() -> MappingIndex {
        let people = MappingRule::new("<#People>")
            .with_template("http://ex.org/{id}")
            .with_query("SELECT id FROM people")
            .with_predicate(ValueKind::Constant, "http://ex.org/name");
        let broken = MappingRule::new("<#Broken>")
            .with_template("http://ex.org/{oops")
            .with_query("SELECT oops FROM t")
            .with_predicate(ValueKind::Constant, "http://ex.org/other");
        MappingIndex::from_rules(vec![people, broken])
    }

    struct Unreachable;

    impl StoreConnector for Unreachable {
        type Store = MemoryStore;

        fn connect(&self) -> Result<MemoryStore, QueryError> {
            Err(QueryError::new("connection refused"))
        }
    }

    #[test]
    fn test_run_closes_store() {
        let store = MemoryStore::new()
            .with_rows("SELECT id FROM people", vec![Row::new().with("id", 5)]);

        let index = index();
        let report = Pipeline::new(&index).run(&store).unwrap();

        assert!(store.is_closed());
        assert_eq!(report.rules, 2);
        assert!(report.self_check_passed());
        let subjects = report.subjects.unwrap();
        assert_eq!(subjects.len(), 2);
        assert!(matches!(subjects[0].outcome, SubjectOutcome::Identifiers(_)));
    }

    #[test]
    fn test_invalid_template_reported_once() {
        let store = MemoryStore::new()
            .with_rows("SELECT id FROM people", vec![Row::new().with("id", 5)]);
        let index = index();
        let report = Pipeline::new(&index).run(&store).unwrap();

        let invalid = report
            .diagnostics
            .iter()
            .filter(|d| d.category() == "invalid_template")
            .count();
        assert_eq!(invalid, 1);
    }

    #[test]
    fn test_unreachable_store_is_fatal() {
        let index = index();
        let err = Pipeline::new(&index).run(&Unreachable).unwrap_err();
        assert!(matches!(err, CheckError::StoreUnavailable(ref m) if m == "connection refused"));
    }

    #[test]
    fn test_materialize_disabled_runs_no_query() {
        let store = MemoryStore::new();
        let index = index();
        let options = CheckOptions {
            materialize: false,
            ..CheckOptions::default()
        };
        let report = Pipeline::new(&index).with_options(options).run(&store).unwrap();

        assert!(report.subjects.is_none());
        assert!(store.executed().is_empty());
    }

    #[test]
    fn test_empty_sentinel_rejected() {
        let index = index();
        let options = CheckOptions {
            sentinel: String::new(),
            ..CheckOptions::default()
        };
        let err = Pipeline::new(&index).with_options(options).analyze().unwrap_err();
        assert!(matches!(err, CheckError::Config(_)));
    }

    #[test]
    fn test_report_serializes() {
        let index = index();
        let report = Pipeline::new(&index).analyze().unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rules"], 2);
        assert!(json.get("subjects").is_none());
        assert_eq!(json["self_check"][0]["example"], "http://ex.org/1");
    }

    #[test]
    fn test_store_closed_after_query_failures() {
        let store = MemoryStore::new().with_failure("SELECT id FROM people", "boom");
        let index = index();
        let report = Pipeline::new(&index).run(&store).unwrap();
        assert!(store.is_closed());
        let subjects = report.subjects.unwrap();
        assert!(matches!(subjects[0].outcome, SubjectOutcome::QueryFailed(_)));
        assert_eq!(store.executed(), vec!["SELECT id FROM people".to_string()]);
    }
}
