//! Triple store for parsed mapping documents
//!
//! The index never walks a serialization directly. It asks a [`TriplePatterns`]
//! implementation for triples matching a shape, so any RDF library can stand
//! behind it. [`MappingGraph`] is the bundled implementation.

use std::collections::HashMap;
use std::fmt;

/// RDF term
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// An expanded IRI
    Iri(String),
    /// A blank node label, without the `_:` prefix
    BlankNode(String),
    /// A literal with optional datatype and language tag
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn blank(label: impl Into<String>) -> Self {
        Term::BlankNode(label.into())
    }

    /// Plain string literal
    pub fn string(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_blank(&self) -> Option<&str> {
        match self {
            Term::BlankNode(label) => Some(label),
            _ => None,
        }
    }

    /// Check whether the term can be the subject of other triples
    pub fn is_node(&self) -> bool {
        matches!(self, Term::Iri(_) | Term::BlankNode(_))
    }

    /// Lexical value: the IRI, the `_:label`, or the literal text
    ///
    /// Mapping documents sometimes write table names and templates as IRIs,
    /// so callers reading a string-valued property accept any term kind.
    pub fn lexical(&self) -> String {
        match self {
            Term::Iri(iri) => iri.clone(),
            Term::BlankNode(label) => format!("_:{label}"),
            Term::Literal { value, .. } => value.clone(),
        }
    }

    /// Key under which the subject index stores this node
    fn node_key(&self) -> Option<String> {
        match self {
            Term::Iri(iri) => Some(iri.clone()),
            Term::BlankNode(label) => Some(format!("_:{label}")),
            Term::Literal { .. } => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::BlankNode(label) => write!(f, "_:{label}"),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "{value:?}")?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{dt}>")
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Subject / predicate / object triple; predicates are always IRIs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub s: Term,
    pub p: String,
    pub o: Term,
}

impl Triple {
    pub fn new(s: Term, p: impl Into<String>, o: Term) -> Self {
        Self { s, p: p.into(), o }
    }
}

/// Pattern-query capability over a triple collection
///
/// `None` in a position is a wildcard. Results come back in insertion order.
pub trait TriplePatterns {
    fn find(&self, s: Option<&Term>, p: Option<&str>, o: Option<&Term>) -> Vec<&Triple>;

    /// Objects of `subject` under any of the given predicate spellings
    fn objects(&self, subject: &Term, predicates: &[&str]) -> Vec<&Term> {
        self.find(Some(subject), None, None)
            .into_iter()
            .filter(|t| predicates.contains(&t.p.as_str()))
            .map(|t| &t.o)
            .collect()
    }

    /// First object of `subject` under any of the given predicate spellings
    fn object(&self, subject: &Term, predicates: &[&str]) -> Option<&Term> {
        self.objects(subject, predicates).into_iter().next()
    }

    /// Subjects having any of the given predicates, optionally with a fixed object
    fn subjects(&self, predicates: &[&str], object: Option<&Term>) -> Vec<&Term> {
        let mut out: Vec<&Term> = Vec::new();
        for p in predicates {
            for t in self.find(None, Some(*p), object) {
                out.push(&t.s);
            }
        }
        out
    }
}

/// In-memory triple collection with a subject index
#[derive(Debug, Clone, Default)]
pub struct MappingGraph {
    triples: Vec<Triple>,
    /// Index: subject key → positions in `triples`
    by_subject: HashMap<String, Vec<usize>>,
}

impl MappingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, triple: Triple) {
        if let Some(key) = triple.s.node_key() {
            self.by_subject
                .entry(key)
                .or_default()
                .push(self.triples.len());
        }
        self.triples.push(triple);
    }

    pub fn add_triple(&mut self, s: Term, p: impl Into<String>, o: Term) {
        self.add(Triple::new(s, p, o));
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }
}

impl FromIterator<Triple> for MappingGraph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = MappingGraph::new();
        for triple in iter {
            graph.add(triple);
        }
        graph
    }
}

impl TriplePatterns for MappingGraph {
    fn find(&self, s: Option<&Term>, p: Option<&str>, o: Option<&Term>) -> Vec<&Triple> {
        let matches = |t: &Triple| p.map_or(true, |p| t.p == p) && o.map_or(true, |o| &t.o == o);

        match s {
            Some(subject) => subject
                .node_key()
                .and_then(|key| self.by_subject.get(&key))
                .map(|positions| {
                    positions
                        .iter()
                        .map(|&i| &self.triples[i])
                        .filter(|t| matches(t))
                        .collect()
                })
                .unwrap_or_default(),
            None => self.triples.iter().filter(|t| matches(t)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MappingGraph {
        let mut g = MappingGraph::new();
        g.add_triple(
            Term::iri("http://ex.org/map#A"),
            "http://ex.org/p",
            Term::blank("b0"),
        );
        g.add_triple(Term::blank("b0"), "http://ex.org/q", Term::string("x"));
        g.add_triple(Term::blank("b0"), "http://ex.org/r", Term::string("y"));
        g
    }

    #[test]
    fn test_find_by_subject() {
        let g = sample();
        let found = g.find(Some(&Term::blank("b0")), None, None);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].p, "http://ex.org/q");
    }

    #[test]
    fn test_find_wildcards() {
        let g = sample();
        assert_eq!(g.find(None, None, None).len(), 3);
        assert_eq!(g.find(None, Some("http://ex.org/r"), None).len(), 1);
        assert_eq!(
            g.find(None, None, Some(&Term::string("x")))[0].s,
            Term::blank("b0")
        );
        assert!(g.find(Some(&Term::string("x")), None, None).is_empty());
    }

    #[test]
    fn test_objects_accept_any_spelling() {
        let g = sample();
        let objs = g.objects(&Term::blank("b0"), &["http://ex.org/r", "http://ex.org/q"]);
        assert_eq!(objs.len(), 2);
        assert_eq!(
            g.object(&Term::blank("b0"), &["http://ex.org/r"]),
            Some(&Term::string("y"))
        );
    }

    #[test]
    fn test_subjects() {
        let g = sample();
        let subs = g.subjects(&["http://ex.org/p"], None);
        assert_eq!(subs, vec![&Term::iri("http://ex.org/map#A")]);
    }

    #[test]
    fn test_iri_and_blank_keys_do_not_collide() {
        let mut g = MappingGraph::new();
        g.add_triple(Term::iri("b0"), "http://ex.org/p", Term::string("iri"));
        g.add_triple(Term::blank("b0"), "http://ex.org/p", Term::string("blank"));
        let found = g.find(Some(&Term::blank("b0")), None, None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].o, Term::string("blank"));
    }
}
