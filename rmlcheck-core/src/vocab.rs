//! RML and R2RML vocabulary constants
//!
//! Mapping documents in the wild mix the W3C R2RML namespace, the RML core
//! namespace and the legacy RML namespace. Each property the index reads is
//! listed with all of its spellings so lookups can treat them as one.
//!
//! - R2RML: https://www.w3.org/TR/r2rml/
//! - RML: https://w3id.org/rml/core/spec

/// R2RML vocabulary
pub struct R2RML;

impl R2RML {
    pub const NS: &'static str = "http://www.w3.org/ns/r2rml#";

    pub const TRIPLES_MAP: &'static str = "http://www.w3.org/ns/r2rml#TriplesMap";
    pub const LOGICAL_TABLE: &'static str = "http://www.w3.org/ns/r2rml#logicalTable";
    pub const TABLE_NAME: &'static str = "http://www.w3.org/ns/r2rml#tableName";
    pub const SQL_QUERY: &'static str = "http://www.w3.org/ns/r2rml#sqlQuery";

    pub const SUBJECT_MAP: &'static str = "http://www.w3.org/ns/r2rml#subjectMap";
    pub const SUBJECT: &'static str = "http://www.w3.org/ns/r2rml#subject";
    pub const PREDICATE_OBJECT_MAP: &'static str =
        "http://www.w3.org/ns/r2rml#predicateObjectMap";
    pub const PREDICATE_MAP: &'static str = "http://www.w3.org/ns/r2rml#predicateMap";
    pub const PREDICATE: &'static str = "http://www.w3.org/ns/r2rml#predicate";
    pub const OBJECT_MAP: &'static str = "http://www.w3.org/ns/r2rml#objectMap";
    pub const OBJECT: &'static str = "http://www.w3.org/ns/r2rml#object";

    pub const TEMPLATE: &'static str = "http://www.w3.org/ns/r2rml#template";
    pub const CONSTANT: &'static str = "http://www.w3.org/ns/r2rml#constant";
    /// R2RML spells a reference-valued term map `rr:column`
    pub const COLUMN: &'static str = "http://www.w3.org/ns/r2rml#column";
    pub const DATATYPE: &'static str = "http://www.w3.org/ns/r2rml#datatype";
    pub const LANGUAGE: &'static str = "http://www.w3.org/ns/r2rml#language";

    pub const PARENT_TRIPLES_MAP: &'static str = "http://www.w3.org/ns/r2rml#parentTriplesMap";
}

/// RML core vocabulary (`http://w3id.org/rml/`)
pub struct RML;

impl RML {
    pub const NS: &'static str = "http://w3id.org/rml/";

    pub const TRIPLES_MAP: &'static str = "http://w3id.org/rml/TriplesMap";
    pub const LOGICAL_SOURCE: &'static str = "http://w3id.org/rml/logicalSource";
    pub const QUERY: &'static str = "http://w3id.org/rml/query";
    pub const TABLE_NAME: &'static str = "http://w3id.org/rml/tableName";

    pub const SUBJECT_MAP: &'static str = "http://w3id.org/rml/subjectMap";
    pub const SUBJECT: &'static str = "http://w3id.org/rml/subject";
    pub const PREDICATE_OBJECT_MAP: &'static str = "http://w3id.org/rml/predicateObjectMap";
    pub const PREDICATE_MAP: &'static str = "http://w3id.org/rml/predicateMap";
    pub const PREDICATE: &'static str = "http://w3id.org/rml/predicate";
    pub const OBJECT_MAP: &'static str = "http://w3id.org/rml/objectMap";
    pub const OBJECT: &'static str = "http://w3id.org/rml/object";

    pub const TEMPLATE: &'static str = "http://w3id.org/rml/template";
    pub const CONSTANT: &'static str = "http://w3id.org/rml/constant";
    pub const REFERENCE: &'static str = "http://w3id.org/rml/reference";
    pub const DATATYPE: &'static str = "http://w3id.org/rml/datatype";
    pub const LANGUAGE: &'static str = "http://w3id.org/rml/language";

    pub const PARENT_TRIPLES_MAP: &'static str = "http://w3id.org/rml/parentTriplesMap";
}

/// Legacy RML vocabulary (`http://semweb.mmlab.be/ns/rml#`)
///
/// Only the terms that differ from R2RML live here; legacy documents use `rr:`
/// for everything else.
pub struct LegacyRML;

impl LegacyRML {
    pub const NS: &'static str = "http://semweb.mmlab.be/ns/rml#";

    pub const LOGICAL_SOURCE: &'static str = "http://semweb.mmlab.be/ns/rml#logicalSource";
    pub const QUERY: &'static str = "http://semweb.mmlab.be/ns/rml#query";
    pub const REFERENCE: &'static str = "http://semweb.mmlab.be/ns/rml#reference";
}

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

// Property groups: every spelling of one logical property.

pub(crate) const TRIPLES_MAP_CLASSES: &[&str] = &[RML::TRIPLES_MAP, R2RML::TRIPLES_MAP];
pub(crate) const LOGICAL_SOURCE: &[&str] = &[RML::LOGICAL_SOURCE, LegacyRML::LOGICAL_SOURCE];
pub(crate) const LOGICAL_TABLE: &[&str] = &[R2RML::LOGICAL_TABLE];
pub(crate) const QUERY: &[&str] = &[RML::QUERY, LegacyRML::QUERY, R2RML::SQL_QUERY];
pub(crate) const TABLE_NAME: &[&str] = &[RML::TABLE_NAME, R2RML::TABLE_NAME];
pub(crate) const SUBJECT_MAP: &[&str] = &[RML::SUBJECT_MAP, R2RML::SUBJECT_MAP];
pub(crate) const SUBJECT: &[&str] = &[RML::SUBJECT, R2RML::SUBJECT];
pub(crate) const PREDICATE_OBJECT_MAP: &[&str] =
    &[RML::PREDICATE_OBJECT_MAP, R2RML::PREDICATE_OBJECT_MAP];
pub(crate) const PREDICATE_MAP: &[&str] = &[RML::PREDICATE_MAP, R2RML::PREDICATE_MAP];
pub(crate) const PREDICATE: &[&str] = &[RML::PREDICATE, R2RML::PREDICATE];
pub(crate) const OBJECT_MAP: &[&str] = &[RML::OBJECT_MAP, R2RML::OBJECT_MAP];
pub(crate) const OBJECT: &[&str] = &[RML::OBJECT, R2RML::OBJECT];
pub(crate) const TEMPLATE: &[&str] = &[RML::TEMPLATE, R2RML::TEMPLATE];
pub(crate) const CONSTANT: &[&str] = &[RML::CONSTANT, R2RML::CONSTANT];
pub(crate) const REFERENCE: &[&str] = &[RML::REFERENCE, LegacyRML::REFERENCE, R2RML::COLUMN];
pub(crate) const DATATYPE: &[&str] = &[RML::DATATYPE, R2RML::DATATYPE];
pub(crate) const LANGUAGE: &[&str] = &[RML::LANGUAGE, R2RML::LANGUAGE];
pub(crate) const PARENT_TRIPLES_MAP: &[&str] =
    &[RML::PARENT_TRIPLES_MAP, R2RML::PARENT_TRIPLES_MAP];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces() {
        assert!(R2RML::TRIPLES_MAP.starts_with(R2RML::NS));
        assert!(R2RML::COLUMN.starts_with(R2RML::NS));
        assert!(RML::REFERENCE.starts_with(RML::NS));
        assert!(LegacyRML::QUERY.starts_with(LegacyRML::NS));
    }

    #[test]
    fn test_reference_spellings() {
        assert!(REFERENCE.contains(&"http://www.w3.org/ns/r2rml#column"));
        assert!(REFERENCE.contains(&"http://w3id.org/rml/reference"));
        assert!(!REFERENCE.contains(&RML::TEMPLATE));
    }
}
