//! Mapping document loader
//!
//! Parses a mapping document into a [`MappingGraph`] and hands it to the
//! [`MappingIndex`]. Parsing is delegated to an optional RDF library:
//!
//! - **Turtle**: Enable with `features = ["turtle"]` (on by default)
//!
//! For other serializations, build a [`MappingGraph`] (or any
//! [`TriplePatterns`](crate::graph::TriplePatterns) implementation) yourself
//! and use [`MappingLoader::from_graph`] or [`MappingIndex::build`].

use std::path::Path;

use crate::error::{CheckError, CheckResult};
use crate::graph::MappingGraph;
use crate::index::MappingIndex;

/// Base IRI for documents loaded from a string
pub const DEFAULT_BASE_IRI: &str = "file:///mapping.ttl";

/// Mapping document loader
#[derive(Debug)]
pub struct MappingLoader {
    graph: MappingGraph,
}

impl MappingLoader {
    /// Use an already parsed graph
    pub fn from_graph(graph: MappingGraph) -> Self {
        Self { graph }
    }

    /// Parse a Turtle document, resolving relative IRIs against [`DEFAULT_BASE_IRI`]
    #[cfg(feature = "turtle")]
    pub fn from_turtle(content: &str) -> CheckResult<Self> {
        Self::from_turtle_with_base(content, DEFAULT_BASE_IRI)
    }

    /// Parse a Turtle document with an explicit base IRI
    #[cfg(feature = "turtle")]
    pub fn from_turtle_with_base(content: &str, base: &str) -> CheckResult<Self> {
        let graph = turtle::parse(content, base)?;
        tracing::debug!(triples = graph.len(), base, "parsed turtle mapping");
        Ok(Self { graph })
    }

    /// Read and parse a mapping file
    ///
    /// The file's own location is the base IRI. Only Turtle is supported;
    /// JSON-LD documents are rejected.
    pub fn from_file(path: impl AsRef<Path>) -> CheckResult<Self> {
        let path = path.as_ref();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if matches!(extension.as_deref(), Some("jsonld" | "json")) {
            return Err(CheckError::Unsupported(format!(
                "JSON-LD mapping documents ({})",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|source| CheckError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::parse_file_content(path, &content)
    }

    #[cfg(feature = "turtle")]
    fn parse_file_content(path: &Path, content: &str) -> CheckResult<Self> {
        let base = std::fs::canonicalize(path)
            .ok()
            .and_then(|abs| abs.to_str().map(file_iri))
            .unwrap_or_else(|| DEFAULT_BASE_IRI.to_string());
        Self::from_turtle_with_base(content, &base)
    }

    #[cfg(not(feature = "turtle"))]
    fn parse_file_content(path: &Path, _content: &str) -> CheckResult<Self> {
        Err(CheckError::Unsupported(format!(
            "loading {} requires the `turtle` feature",
            path.display()
        )))
    }

    pub fn graph(&self) -> &MappingGraph {
        &self.graph
    }

    /// Extract and index the rules of the loaded document
    pub fn index(&self) -> MappingIndex {
        MappingIndex::build(&self.graph)
    }
}

#[cfg(feature = "turtle")]
fn file_iri(path: &str) -> String {
    let path = path.replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{path}")
    } else {
        format!("file:///{path}")
    }
}

#[cfg(feature = "turtle")]
mod turtle {
    use sophia_api::parser::TripleParser;
    use sophia_api::prelude::Iri;
    use sophia_api::source::TripleSource;
    use sophia_api::term::Term as _;
    use sophia_api::triple::Triple as _;
    use sophia_turtle::parser::turtle::TurtleParser;

    use crate::error::{CheckError, CheckResult};
    use crate::graph::{MappingGraph, Term, Triple};

    const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    pub(super) fn parse(content: &str, base: &str) -> CheckResult<MappingGraph> {
        let base = Iri::new(base.to_string())
            .map_err(|e| CheckError::Config(format!("invalid base IRI {base:?}: {e}")))?;
        let parser = TurtleParser { base: Some(base) };

        let mut graph = MappingGraph::new();
        let mut skipped = 0usize;
        parser
            .parse_str(content)
            .for_each_triple(|t| {
                let converted = (|| {
                    let s = convert(t.s())?;
                    let p = t.p().iri()?.as_str().to_string();
                    let o = convert(t.o())?;
                    Some(Triple::new(s, p, o))
                })();
                match converted {
                    Some(triple) => graph.add(triple),
                    None => skipped += 1,
                }
            })
            .map_err(|e| CheckError::Parse(e.to_string()))?;

        if skipped > 0 {
            tracing::debug!(skipped, "ignored triples with unsupported terms");
        }
        Ok(graph)
    }

    fn convert<T: sophia_api::term::Term>(term: T) -> Option<Term> {
        if let Some(iri) = term.iri() {
            return Some(Term::Iri(iri.as_str().to_string()));
        }
        if let Some(id) = term.bnode_id() {
            return Some(Term::BlankNode(id.as_str().to_string()));
        }
        let value = term.lexical_form()?.to_string();
        let language = term.language_tag().map(|tag| tag.as_str().to_string());
        // Language-tagged and plain strings carry no explicit datatype
        let datatype = match language {
            Some(_) => None,
            None => term
                .datatype()
                .map(|dt| dt.as_str().to_string())
                .filter(|dt| dt != XSD_STRING),
        };
        Some(Term::Literal {
            value,
            datatype,
            language,
        })
    }
}

#[cfg(all(test, feature = "turtle"))]
mod tests {
    use super::*;
    use crate::graph::{Term, TriplePatterns};
    use crate::index::{PredicateRef, ValueKind};

    const RML_MAPPING: &str = r#"
        @prefix rml: <http://w3id.org/rml/> .
        @prefix ex: <http://example.org/> .

        ex:PersonMap a rml:TriplesMap ;
            rml:logicalSource [ rml:query "SELECT id, name FROM person" ] ;
            rml:subjectMap [ rml:template "http://example.org/person/{id}" ] ;
            rml:predicateObjectMap [
                rml:predicateMap [ rml:constant ex:name ] ;
                rml:objectMap [ rml:reference "name" ; rml:datatype ex:Text ]
            ] .
    "#;

    const R2RML_MAPPING: &str = r#"
        @prefix rr: <http://www.w3.org/ns/r2rml#> .
        @prefix ex: <http://example.org/> .

        <#AirlineMapping> a rr:TriplesMap ;
            rr:logicalTable [ rr:tableName "airlines" ] ;
            rr:subjectMap [ rr:template "http://example.org/airline/{id}" ] ;
            rr:predicateObjectMap [
                rr:predicate ex:label ;
                rr:objectMap [ rr:column "label" ; rr:language "en" ]
            ] .
    "#;

    #[test]
    fn test_from_turtle() {
        let loader = MappingLoader::from_turtle(RML_MAPPING).unwrap();
        assert!(!loader.graph().is_empty());
        let maps = loader.graph().subjects(
            &["http://www.w3.org/1999/02/22-rdf-syntax-ns#type"],
            Some(&Term::iri("http://w3id.org/rml/TriplesMap")),
        );
        assert_eq!(maps, vec![&Term::iri("http://example.org/PersonMap")]);
    }

    #[test]
    fn test_index_rml() {
        let index = MappingLoader::from_turtle(RML_MAPPING).unwrap().index();
        assert_eq!(index.len(), 1);
        let rule = index.rule("http://example.org/PersonMap").unwrap();
        assert_eq!(rule.template(), Some("http://example.org/person/{id}"));
        assert_eq!(rule.query(), Some("SELECT id, name FROM person"));
        assert!(rule.declares(&PredicateRef::constant("http://example.org/name")));

        let objects: Vec<_> = index.object_mappings().collect();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].kind, ValueKind::Reference);
        assert_eq!(objects[0].datatype.as_deref(), Some("http://example.org/Text"));
    }

    #[test]
    fn test_relative_iris_resolve_against_base() {
        let index = MappingLoader::from_turtle(R2RML_MAPPING).unwrap().index();
        let rule = index.rule("file:///mapping.ttl#AirlineMapping").unwrap();
        assert_eq!(rule.query(), Some("SELECT * FROM airlines"));
        assert_eq!(rule.object_mappings[0].language.as_deref(), Some("en"));

        let index = MappingLoader::from_turtle_with_base(R2RML_MAPPING, "http://ex.org/m.ttl")
            .unwrap()
            .index();
        assert!(index.rule("http://ex.org/m.ttl#AirlineMapping").is_some());
    }

    #[test]
    fn test_parse_error() {
        let err =
            MappingLoader::from_turtle("@prefix ex: <http://ex.org/> . ex:a ex:b").unwrap_err();
        assert!(matches!(err, CheckError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path();
        let path = dir.join("mapping.ttl");
        std::fs::write(&path, RML_MAPPING).unwrap();

        let index = MappingLoader::from_file(&path).unwrap().index();
        assert_eq!(index.len(), 1);

        let missing = MappingLoader::from_file(dir.join("missing.ttl")).unwrap_err();
        assert!(matches!(missing, CheckError::Io { .. }));

        let jsonld = MappingLoader::from_file(dir.join("mapping.jsonld")).unwrap_err();
        assert!(matches!(jsonld, CheckError::Unsupported(_)));
    }
}
