//! Mapping declaration index
//!
//! Built once from a triple source; every later lookup (predicate → rules,
//! rule → template / logical source) goes through the index instead of
//! re-scanning the graph.

mod extractor;
mod model;

use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use extractor::MappingExtractor;
pub use model::{
    LogicalSource, MappingRule, ObjectMapping, PredicateDeclaration, PredicateRef,
    SubjectTemplate, ValueKind,
};

use crate::error::Diagnostic;
use crate::graph::TriplePatterns;

/// Gap detail for a rule without `logicalSource` / `logicalTable`
pub(crate) const NO_LOGICAL_SOURCE: &str = "no logical source";

/// Indexed, read-only view of the rules in a mapping document
#[derive(Debug, Clone, Default)]
pub struct MappingIndex {
    /// All rules, in discovery order
    rules: Vec<MappingRule>,

    /// Index: rule id → position in `rules`
    by_id: HashMap<String, usize>,

    /// Index: predicate → positions of the rules declaring it
    predicate_to_rules: BTreeMap<PredicateRef, Vec<usize>>,

    /// Gaps recorded during extraction
    gaps: Vec<Diagnostic>,
}

impl MappingIndex {
    /// Extract and index every rule reachable through the triple source
    pub fn build<G: TriplePatterns + ?Sized>(graph: &G) -> Self {
        let (rules, gaps) = MappingExtractor::new(graph).extract_all();
        let mut index = Self::from_rules(rules);
        index.gaps = gaps;

        tracing::debug!(
            rules = index.rules.len(),
            predicates = index.predicate_to_rules.len(),
            gaps = index.gaps.len(),
            "built mapping index"
        );

        index
    }

    /// Index rules that were produced some other way
    pub fn from_rules(rules: Vec<MappingRule>) -> Self {
        let mut index = Self::default();
        for rule in rules {
            index.add_rule(rule);
        }
        index
    }

    fn add_rule(&mut self, rule: MappingRule) {
        let pos = self.rules.len();

        for decl in &rule.predicates {
            let entries = self.predicate_to_rules.entry(decl.key()).or_default();
            // A rule may declare the same predicate in several maps
            if entries.last() != Some(&pos) {
                entries.push(pos);
            }
        }

        self.by_id.insert(rule.id.clone(), pos);
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&MappingRule> {
        self.by_id.get(id).map(|&i| &self.rules[i])
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every predicate declaration, duplicates included
    pub fn predicate_declarations(&self) -> impl Iterator<Item = &PredicateDeclaration> {
        self.rules.iter().flat_map(|r| r.predicates.iter())
    }

    /// The set of declared predicates, ordered by kind then value
    pub fn predicates(&self) -> impl Iterator<Item = &PredicateRef> {
        self.predicate_to_rules.keys()
    }

    /// The set of declared predicate values, regardless of kind
    pub fn predicate_values(&self) -> BTreeSet<&str> {
        self.predicate_to_rules
            .keys()
            .map(|p| p.value.as_str())
            .collect()
    }

    /// Rules declaring a predicate, each listed once
    pub fn rules_for_predicate(&self, predicate: &PredicateRef) -> Vec<&MappingRule> {
        self.predicate_to_rules
            .get(predicate)
            .map(|positions| positions.iter().map(|&i| &self.rules[i]).collect())
            .unwrap_or_default()
    }

    pub fn subject_templates(&self) -> impl Iterator<Item = &SubjectTemplate> {
        self.rules.iter().filter_map(|r| r.subject_template.as_ref())
    }

    /// Every object mapping, in rule order then declaration order
    pub fn object_mappings(&self) -> impl Iterator<Item = &ObjectMapping> {
        self.rules.iter().flat_map(|r| r.object_mappings.iter())
    }

    /// Logical sources keyed by owning rule id
    pub fn logical_sources(&self) -> BTreeMap<&str, &LogicalSource> {
        self.rules
            .iter()
            .filter_map(|r| r.logical_source.as_ref().map(|s| (r.id.as_str(), s)))
            .collect()
    }

    pub fn logical_source(&self, rule: &str) -> Option<&LogicalSource> {
        self.rule(rule).and_then(|r| r.logical_source.as_ref())
    }

    /// Gaps recorded while extracting rules
    pub fn gaps(&self) -> &[Diagnostic] {
        &self.gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_rule() -> MappingRule {
        MappingRule::new("<#Person>")
            .with_template("http://ex.org/person/{id}")
            .with_query("SELECT id FROM person")
            .with_predicate(ValueKind::Constant, "http://ex.org/name")
            .with_predicate(ValueKind::Constant, "http://ex.org/name")
            .with_predicate(ValueKind::Reference, "dynamic_col")
    }

    fn course_rule() -> MappingRule {
        MappingRule::new("<#Course>")
            .with_template("http://ex.org/course/{code}")
            .with_predicate(ValueKind::Constant, "http://ex.org/name")
    }

    #[test]
    fn test_predicate_set_is_deduplicated() {
        let index = MappingIndex::from_rules(vec![person_rule(), course_rule()]);

        assert_eq!(index.predicate_declarations().count(), 4);
        let predicates: Vec<_> = index.predicates().cloned().collect();
        assert_eq!(
            predicates,
            vec![
                PredicateRef::constant("http://ex.org/name"),
                PredicateRef::reference("dynamic_col"),
            ]
        );
        assert_eq!(
            index.predicate_values().into_iter().collect::<Vec<_>>(),
            vec!["dynamic_col", "http://ex.org/name"]
        );
    }

    #[test]
    fn test_rules_for_predicate() {
        let index = MappingIndex::from_rules(vec![person_rule(), course_rule()]);

        let rules = index.rules_for_predicate(&PredicateRef::constant("http://ex.org/name"));
        let ids: Vec<_> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["<#Person>", "<#Course>"]);

        assert!(index
            .rules_for_predicate(&PredicateRef::constant("http://ex.org/unknown"))
            .is_empty());
    }

    #[test]
    fn test_logical_sources_keyed_by_rule() {
        let index = MappingIndex::from_rules(vec![person_rule(), course_rule()]);

        let sources = index.logical_sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources["<#Person>"].query, "SELECT id FROM person");
        assert!(index.logical_source("<#Course>").is_none());
        assert_eq!(index.subject_templates().count(), 2);
    }

    #[test]
    fn test_empty_index() {
        let index = MappingIndex::from_rules(Vec::new());
        assert!(index.is_empty());
        assert_eq!(index.predicates().count(), 0);
        assert_eq!(index.object_mappings().count(), 0);
        assert!(index.gaps().is_empty());
    }
}
