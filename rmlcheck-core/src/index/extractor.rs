//! Mapping rule extractor
//!
//! Walks a [`TriplePatterns`] source and pulls out every rule with its subject
//! template, predicate declarations, object mappings and logical source.
//! Missing pieces are recorded as gaps; extraction itself never fails.

use std::collections::{HashMap, HashSet};

use crate::error::Diagnostic;
use crate::graph::{Term, TriplePatterns};
use crate::index::NO_LOGICAL_SOURCE;
use crate::index::model::{
    LogicalSource, MappingRule, ObjectMapping, PredicateDeclaration, SubjectTemplate, ValueKind,
};
use crate::vocab;

/// Extracts mapping rules from a triple source
pub struct MappingExtractor<'a, G: TriplePatterns + ?Sized> {
    /// The source graph
    graph: &'a G,
    /// Gaps found so far
    gaps: Vec<Diagnostic>,
}

/// Properties whose presence on a node marks it as a rule
const RULE_MARKERS: &[&[&str]] = &[
    vocab::LOGICAL_SOURCE,
    vocab::LOGICAL_TABLE,
    vocab::SUBJECT_MAP,
    vocab::SUBJECT,
    vocab::PREDICATE_OBJECT_MAP,
];

impl<'a, G: TriplePatterns + ?Sized> MappingExtractor<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            gaps: Vec::new(),
        }
    }

    /// Extract all rules, in the order they first appear in the graph
    pub fn extract_all(mut self) -> (Vec<MappingRule>, Vec<Diagnostic>) {
        let mut rules: Vec<MappingRule> = self
            .rule_nodes()
            .into_iter()
            .map(|node| self.extract_rule(node))
            .collect();

        self.resolve_parent_objects(&mut rules);

        (rules, self.gaps)
    }

    /// Find rule nodes: typed TriplesMaps plus untyped nodes carrying rule properties
    fn rule_nodes(&self) -> Vec<&'a Term> {
        let mut seen: HashSet<&Term> = HashSet::new();
        let mut nodes = Vec::new();

        for triple in self.graph.find(None, None, None) {
            let typed = triple.p == vocab::RDF_TYPE
                && triple
                    .o
                    .as_iri()
                    .is_some_and(|o| vocab::TRIPLES_MAP_CLASSES.contains(&o));
            let marked = RULE_MARKERS
                .iter()
                .any(|group| group.contains(&triple.p.as_str()));

            if (typed || marked) && triple.s.is_node() && seen.insert(&triple.s) {
                nodes.push(&triple.s);
            }
        }

        nodes
    }

    fn extract_rule(&mut self, node: &Term) -> MappingRule {
        let graph = self.graph;
        let id = node.lexical();
        let mut rule = MappingRule::new(id.clone());

        rule.logical_source = self.extract_logical_source(node, &id);
        rule.subject_template = self.extract_subject_template(node, &id);

        for pom in graph.objects(node, vocab::PREDICATE_OBJECT_MAP) {
            self.extract_predicate_object_map(pom, &mut rule);
        }

        tracing::debug!(
            rule = %id,
            predicates = rule.predicates.len(),
            objects = rule.object_mappings.len(),
            "extracted mapping rule"
        );

        rule
    }

    /// Extract the logical source (RML) or logical table (R2RML) of a rule
    fn extract_logical_source(&mut self, node: &Term, rule: &str) -> Option<LogicalSource> {
        let graph = self.graph;
        let source_node = graph
            .object(node, vocab::LOGICAL_SOURCE)
            .or_else(|| graph.object(node, vocab::LOGICAL_TABLE));

        let Some(source_node) = source_node else {
            self.gap(rule, NO_LOGICAL_SOURCE);
            return None;
        };

        if let Some(query) = graph.object(source_node, vocab::QUERY) {
            let query = query.lexical().trim().to_string();
            if !query.is_empty() {
                return Some(LogicalSource {
                    query,
                    rule: rule.to_string(),
                });
            }
        }

        if let Some(table) = graph.object(source_node, vocab::TABLE_NAME) {
            return Some(LogicalSource::from_table(&table.lexical(), rule));
        }

        self.gap(rule, "logical source has neither a query nor a table name");
        None
    }

    /// Extract the subject template of a rule
    fn extract_subject_template(&mut self, node: &Term, rule: &str) -> Option<SubjectTemplate> {
        let graph = self.graph;
        let Some(subject_map) = graph.object(node, vocab::SUBJECT_MAP) else {
            if graph.object(node, vocab::SUBJECT).is_some() {
                self.gap(rule, "constant subject has no template");
            } else {
                self.gap(rule, "no subject map");
            }
            return None;
        };

        if let Some(template) = graph.object(subject_map, vocab::TEMPLATE) {
            return Some(SubjectTemplate {
                template: template.lexical(),
                rule: rule.to_string(),
            });
        }

        let detail = if graph.object(subject_map, vocab::REFERENCE).is_some() {
            "subject map is reference-valued, not a template"
        } else if graph.object(subject_map, vocab::CONSTANT).is_some() {
            "subject map is constant-valued, not a template"
        } else {
            "subject map has no template"
        };
        self.gap(rule, detail);
        None
    }

    /// Extract one predicate-object map into the rule
    ///
    /// Every predicate of the map pairs with every object of the map.
    fn extract_predicate_object_map(&mut self, pom: &Term, rule: &mut MappingRule) {
        let graph = self.graph;
        let mut predicates: Vec<(ValueKind, String)> = graph
            .objects(pom, vocab::PREDICATE)
            .into_iter()
            .map(|p| (ValueKind::Constant, p.lexical()))
            .collect();

        for pm in graph.objects(pom, vocab::PREDICATE_MAP) {
            let declared = self.value_declarations(pm);
            if declared.is_empty() {
                tracing::debug!(
                    rule = %rule.id,
                    predicate_map = %pm,
                    "predicate map has no constant, template or reference; excluded"
                );
            }
            predicates.extend(declared);
        }

        if predicates.is_empty() {
            self.gap(&rule.id, "predicate-object map declares no recognized predicate");
            return;
        }

        let objects = self.extract_objects(pom, &rule.id);

        for (kind, value) in &predicates {
            for object in &objects {
                let mut mapping = object.clone();
                mapping.predicate = value.clone();
                rule.object_mappings.push(mapping);
            }
            rule.predicates.push(PredicateDeclaration {
                value: value.clone(),
                kind: *kind,
                rule: rule.id.clone(),
            });
        }
    }

    /// Object mappings of a predicate-object map, with the predicate left blank
    fn extract_objects(&self, pom: &Term, rule: &str) -> Vec<ObjectMapping> {
        let mut objects: Vec<ObjectMapping> = self
            .graph
            .objects(pom, vocab::OBJECT)
            .into_iter()
            .map(|o| ObjectMapping::new("", o.lexical(), ValueKind::Constant, rule))
            .collect();

        for om in self.graph.objects(pom, vocab::OBJECT_MAP) {
            let datatype = self.graph.object(om, vocab::DATATYPE).map(Term::lexical);
            let language = self.graph.object(om, vocab::LANGUAGE).map(Term::lexical);

            if let Some(parent) = self.graph.object(om, vocab::PARENT_TRIPLES_MAP) {
                // Object filled in once every rule is known
                let mut mapping = ObjectMapping::new("", "", ValueKind::Template, rule);
                mapping.parent_rule = Some(parent.lexical());
                objects.push(mapping);
                continue;
            }

            for (kind, value) in self.value_declarations(om) {
                let mut mapping = ObjectMapping::new("", value, kind, rule);
                mapping.datatype = datatype.clone();
                mapping.language = language.clone();
                objects.push(mapping);
            }
        }

        objects
    }

    /// Constant / template / reference values declared on a term map node
    fn value_declarations(&self, term_map: &Term) -> Vec<(ValueKind, String)> {
        self.graph
            .find(Some(term_map), None, None)
            .into_iter()
            .filter_map(|t| {
                let p = t.p.as_str();
                let kind = if vocab::CONSTANT.contains(&p) {
                    ValueKind::Constant
                } else if vocab::TEMPLATE.contains(&p) {
                    ValueKind::Template
                } else if vocab::REFERENCE.contains(&p) {
                    ValueKind::Reference
                } else {
                    return None;
                };
                Some((kind, t.o.lexical()))
            })
            .collect()
    }

    /// Replace `parentTriplesMap` objects with the parent rule's subject template
    fn resolve_parent_objects(&mut self, rules: &mut [MappingRule]) {
        let templates: HashMap<String, Option<String>> = rules
            .iter()
            .map(|r| (r.id.clone(), r.template().map(str::to_string)))
            .collect();

        for rule in rules.iter_mut() {
            let mut unresolved = Vec::new();
            rule.object_mappings.retain_mut(|mapping| {
                let Some(parent) = &mapping.parent_rule else {
                    return true;
                };
                match templates.get(parent) {
                    Some(Some(template)) => {
                        mapping.object = template.clone();
                        true
                    }
                    Some(None) => {
                        unresolved.push(format!("parent rule {parent} has no subject template"));
                        false
                    }
                    None => {
                        unresolved.push(format!("parent rule {parent} is not defined"));
                        false
                    }
                }
            });
            for detail in unresolved {
                self.gap(&rule.id, detail);
            }
        }
    }

    fn gap(&mut self, rule: &str, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::debug!(rule, %detail, "extraction gap");
        self.gaps.push(Diagnostic::ExtractionGap {
            rule: rule.to_string(),
            detail,
        });
    }
}
