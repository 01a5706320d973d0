//! Mapping declaration structures
//!
//! Plain data extracted from a mapping document. Owning rules are referenced by
//! id so the structures stay flat and serializable.

use std::fmt;

use serde::Serialize;

/// How a term map determines its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// `rml:constant` / `rr:constant` (and the `rml:predicate` style shortcuts)
    Constant,
    /// `rml:template` / `rr:template`
    Template,
    /// `rml:reference` / `rr:column`
    Reference,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Constant => "constant",
            ValueKind::Template => "template",
            ValueKind::Reference => "reference",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One predicate declared by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredicateDeclaration {
    pub value: String,
    pub kind: ValueKind,
    pub rule: String,
}

impl PredicateDeclaration {
    pub fn key(&self) -> PredicateRef {
        PredicateRef::new(self.kind, self.value.clone())
    }
}

/// Predicate identity once the declaring rule no longer matters
///
/// Reference predicates are column names, not IRIs, so they are kept apart
/// from constants that happen to share the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PredicateRef {
    pub kind: ValueKind,
    pub value: String,
}

impl PredicateRef {
    pub fn new(kind: ValueKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn constant(value: impl Into<String>) -> Self {
        Self::new(ValueKind::Constant, value)
    }

    pub fn reference(column: impl Into<String>) -> Self {
        Self::new(ValueKind::Reference, column)
    }

    pub fn is_reference(&self) -> bool {
        self.kind == ValueKind::Reference
    }
}

impl fmt::Display for PredicateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ValueKind::Reference => write!(f, "reference:{}", self.value),
            _ => f.write_str(&self.value),
        }
    }
}

/// The subject template of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectTemplate {
    pub template: String,
    pub rule: String,
}

/// One object value declared for a predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectMapping {
    pub predicate: String,
    pub object: String,
    pub kind: ValueKind,
    pub rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Set when the object is the subject of another rule (`parentTriplesMap`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_rule: Option<String>,
}

impl ObjectMapping {
    pub fn new(
        predicate: impl Into<String>,
        object: impl Into<String>,
        kind: ValueKind,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            predicate: predicate.into(),
            object: object.into(),
            kind,
            rule: rule.into(),
            datatype: None,
            language: None,
            parent_rule: None,
        }
    }
}

/// The relational query feeding a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalSource {
    pub query: String,
    pub rule: String,
}

impl LogicalSource {
    /// Build a source from a bare table name
    pub fn from_table(table: &str, rule: impl Into<String>) -> Self {
        Self {
            query: format!("SELECT * FROM {}", table.trim()),
            rule: rule.into(),
        }
    }
}

/// One identifier-construction rule (an RML/R2RML TriplesMap)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingRule {
    pub id: String,
    pub subject_template: Option<SubjectTemplate>,
    pub predicates: Vec<PredicateDeclaration>,
    pub object_mappings: Vec<ObjectMapping>,
    pub logical_source: Option<LogicalSource>,
}

impl MappingRule {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject_template: None,
            predicates: Vec::new(),
            object_mappings: Vec::new(),
            logical_source: None,
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.subject_template = Some(SubjectTemplate {
            template: template.into(),
            rule: self.id.clone(),
        });
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.logical_source = Some(LogicalSource {
            query: query.into(),
            rule: self.id.clone(),
        });
        self
    }

    pub fn with_predicate(mut self, kind: ValueKind, value: impl Into<String>) -> Self {
        self.predicates.push(PredicateDeclaration {
            value: value.into(),
            kind,
            rule: self.id.clone(),
        });
        self
    }

    pub fn template(&self) -> Option<&str> {
        self.subject_template.as_ref().map(|t| t.template.as_str())
    }

    pub fn query(&self) -> Option<&str> {
        self.logical_source.as_ref().map(|s| s.query.as_str())
    }

    /// Check if the rule declares the given predicate
    pub fn declares(&self, predicate: &PredicateRef) -> bool {
        self.predicates
            .iter()
            .any(|p| p.kind == predicate.kind && p.value == predicate.value)
    }
}
