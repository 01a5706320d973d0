//! Template matching and the subject template catalog

use serde::Serialize;

use super::{CompiledTemplate, DEFAULT_SENTINEL};
use crate::error::Diagnostic;
use crate::index::{MappingIndex, ValueKind};

/// Check if `candidate` is fully matched by the template
pub fn matches(candidate: &str, template: &CompiledTemplate) -> bool {
    template.pattern().is_match(candidate)
}

/// A compiled subject template and its example identifier
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub rule: String,
    pub template: CompiledTemplate,
    pub example: String,
}

/// Result of matching a template's example identifier against itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfCheck {
    pub rule: String,
    pub template: String,
    pub example: String,
    pub matches: bool,
}

/// Rules whose subject templates accept another rule's example identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossMatch {
    pub rule: String,
    pub template: String,
    pub example: String,
    pub matched_by: Vec<String>,
}

/// Rules whose subjects an object template can point at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectLink {
    pub rule: String,
    pub predicate: String,
    pub template: String,
    pub example: String,
    pub targets: Vec<String>,
}

/// Every compiled subject template of a mapping
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    entries: Vec<CatalogEntry>,
    sentinel: String,
    diagnostics: Vec<Diagnostic>,
}

impl TemplateCatalog {
    /// Compile the subject template of every rule using [`DEFAULT_SENTINEL`]
    pub fn from_index(index: &MappingIndex) -> Self {
        Self::with_sentinel(index, DEFAULT_SENTINEL)
    }

    /// Compile every subject template, generating examples with `sentinel`
    ///
    /// Templates that fail to compile are left out and reported.
    pub fn with_sentinel(index: &MappingIndex, sentinel: &str) -> Self {
        let mut entries = Vec::new();
        let mut diagnostics = Vec::new();

        for subject in index.subject_templates() {
            match CompiledTemplate::compile(&subject.template) {
                Ok(template) => {
                    for diag in template.diagnostics(&subject.rule) {
                        tracing::warn!(rule = %subject.rule, "{diag}");
                        diagnostics.push(diag);
                    }
                    entries.push(CatalogEntry {
                        rule: subject.rule.clone(),
                        example: template.example_identifier_with(sentinel),
                        template,
                    });
                }
                Err(e) => {
                    tracing::warn!(rule = %subject.rule, error = %e, "skipping subject template");
                    diagnostics.push(Diagnostic::invalid_template(
                        &subject.rule,
                        &subject.template,
                        e,
                    ));
                }
            }
        }

        Self {
            entries,
            sentinel: sentinel.to_string(),
            diagnostics,
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entry(&self, rule: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.rule == rule)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Template warnings and compile failures
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Match each example identifier against its own template
    pub fn self_check(&self) -> Vec<SelfCheck> {
        self.entries
            .iter()
            .map(|e| SelfCheck {
                rule: e.rule.clone(),
                template: e.template.source().to_string(),
                example: e.example.clone(),
                matches: matches(&e.example, &e.template),
            })
            .collect()
    }

    /// For each template, the other rules whose templates match its example
    pub fn cross_check(&self) -> Vec<CrossMatch> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| CrossMatch {
                rule: e.rule.clone(),
                template: e.template.source().to_string(),
                example: e.example.clone(),
                matched_by: self
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(j, other)| *j != i && matches(&e.example, &other.template))
                    .map(|(_, other)| other.rule.clone())
                    .collect(),
            })
            .collect()
    }

    /// Entries whose template matches `candidate`
    pub fn templates_matching(&self, candidate: &str) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| matches(candidate, &e.template))
            .collect()
    }

    /// Resolve template-kind object mappings to the rules whose subjects they match
    ///
    /// Object templates that fail to compile are skipped; they are not
    /// subject templates and do not affect the catalog.
    pub fn object_links(&self, index: &MappingIndex) -> Vec<ObjectLink> {
        index
            .object_mappings()
            .filter(|m| m.kind == ValueKind::Template)
            .filter_map(|m| {
                let template = match CompiledTemplate::compile(&m.object) {
                    Ok(t) => t,
                    Err(e) => {
                        tracing::debug!(rule = %m.rule, error = %e, "skipping object template");
                        return None;
                    }
                };
                let example = template.example_identifier_with(&self.sentinel);
                let targets = self
                    .templates_matching(&example)
                    .into_iter()
                    .map(|e| e.rule.clone())
                    .collect();
                Some(ObjectLink {
                    rule: m.rule.clone(),
                    predicate: m.predicate.clone(),
                    template: m.object.clone(),
                    example,
                    targets,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{MappingRule, ObjectMapping};

    fn compile(t: &str) -> CompiledTemplate {
        CompiledTemplate::compile(t).unwrap()
    }

    #[test]
    fn test_two_placeholder_example_matches_itself() {
        let t = compile("http://ex.org/{a}/{b}");
        let example = t.example_identifier();
        assert_eq!(example, "http://ex.org/1/1");
        assert!(matches(&example, &t));
    }

    #[test]
    fn test_full_string_match_only() {
        let t = compile("http://ex.org/{id}");
        assert!(matches("http://ex.org/5", &t));
        assert!(!matches("http://ex.org/", &t));
        assert!(!matches("xhttp://ex.org/5", &t));
        assert!(!matches("http://ex.org", &t));
    }

    #[test]
    fn test_placeholders_match_any_character() {
        let t = compile("http://ex.org/{id}");
        assert!(matches("http://ex.org/a/b c?d", &t));
        assert!(matches("http://ex.org/line\nbreak", &t));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let t = compile("http://ex.org/a.b?c=(d)+{id}");
        assert!(matches("http://ex.org/a.b?c=(d)+7", &t));
        assert!(!matches("http://ex.org/aXb?c=(d)+7", &t));
        assert!(!matches("http://ex.org/a.bc=(d)7", &t));
    }

    #[test]
    fn test_substitute_then_match() {
        let t = compile("http://ex.org/{dept}/emp-{id}");
        for (dept, id) in [("cs", "1"), ("a/b", "x.y"), ("{}", "$^")] {
            let identifier: Result<String, ()> = t.instantiate(|name| {
                Ok(if name == "dept" { dept } else { id }.to_string())
            });
            assert!(matches(&identifier.unwrap(), &t));
        }
    }

    #[test]
    fn test_non_overlapping_prefixes_never_cross_match() {
        let a = compile("http://ex.org/person/{id}");
        let b = compile("http://other.org/course/{id}");
        for value in ["1", "person/2", "http://ex.org/person/3"] {
            let ia: Result<String, ()> = a.instantiate(|_| Ok(value.to_string()));
            let ib: Result<String, ()> = b.instantiate(|_| Ok(value.to_string()));
            assert!(!matches(&ia.unwrap(), &b));
            assert!(!matches(&ib.unwrap(), &a));
        }
    }

    #[test]
    fn test_ambiguous_template_still_matches() {
        let t = compile("http://ex.org/{a}{b}");
        assert!(t.is_ambiguous());
        assert!(matches("http://ex.org/12", &t));
        assert!(!matches("http://ex.org/1", &t));
    }

    fn catalog_index() -> MappingIndex {
        let person = MappingRule::new("<#Person>").with_template("http://ex.org/person/{id}");
        let any = MappingRule::new("<#Any>").with_template("http://ex.org/{path}");
        let course = MappingRule::new("<#Course>").with_template("http://other.org/course/{code}");
        let broken = MappingRule::new("<#Broken>").with_template("http://ex.org/{oops");
        let mut enrolment = MappingRule::new("<#Enrolment>")
            .with_template("http://ex.org/enrolment/{sid}-{code}");
        enrolment.object_mappings.push(ObjectMapping::new(
            "http://ex.org/course",
            "http://other.org/course/{code}",
            ValueKind::Template,
            "<#Enrolment>",
        ));
        enrolment.object_mappings.push(ObjectMapping::new(
            "http://ex.org/label",
            "label",
            ValueKind::Reference,
            "<#Enrolment>",
        ));
        MappingIndex::from_rules(vec![person, any, course, broken, enrolment])
    }

    #[test]
    fn test_catalog_reports_invalid_templates() {
        let catalog = TemplateCatalog::from_index(&catalog_index());
        assert_eq!(catalog.len(), 4);
        assert!(catalog.entry("<#Broken>").is_none());
        assert_eq!(catalog.diagnostics().len(), 1);
        assert_eq!(catalog.diagnostics()[0].category(), "invalid_template");
    }

    #[test]
    fn test_self_check_all_match() {
        let catalog = TemplateCatalog::from_index(&catalog_index());
        let checks = catalog.self_check();
        assert_eq!(checks.len(), 4);
        assert!(checks.iter().all(|c| c.matches));
    }

    #[test]
    fn test_cross_check() {
        let catalog = TemplateCatalog::from_index(&catalog_index());
        let cross = catalog.cross_check();

        let person = cross.iter().find(|c| c.rule == "<#Person>").unwrap();
        assert_eq!(person.example, "http://ex.org/person/1");
        assert_eq!(person.matched_by, vec!["<#Any>".to_string()]);

        let course = cross.iter().find(|c| c.rule == "<#Course>").unwrap();
        assert!(course.matched_by.is_empty());

        let any = cross.iter().find(|c| c.rule == "<#Any>").unwrap();
        assert!(any.matched_by.is_empty());
    }

    #[test]
    fn test_templates_matching_and_sentinel() {
        let catalog = TemplateCatalog::with_sentinel(&catalog_index(), "X");
        assert_eq!(catalog.sentinel(), "X");
        assert_eq!(
            catalog.entry("<#Person>").unwrap().example,
            "http://ex.org/person/X"
        );
        let rules: Vec<_> = catalog
            .templates_matching("http://ex.org/person/42")
            .into_iter()
            .map(|e| e.rule.as_str())
            .collect();
        assert_eq!(rules, vec!["<#Person>", "<#Any>"]);
        assert!(catalog.templates_matching("urn:nothing").is_empty());
    }

    #[test]
    fn test_object_links() {
        let index = catalog_index();
        let catalog = TemplateCatalog::from_index(&index);
        let links = catalog.object_links(&index);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].predicate, "http://ex.org/course");
        assert_eq!(links[0].example, "http://other.org/course/1");
        assert_eq!(links[0].targets, vec!["<#Course>".to_string()]);
    }
}
