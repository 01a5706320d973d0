//! Template compilation
//!
//! A template such as `http://ex.org/{dept}/{id}` compiles into its literal
//! and placeholder segments plus an anchored regex. Literal text is escaped
//! before it reaches the regex, so `.`, `?` or `+` in an IRI only ever match
//! themselves. Each placeholder becomes a greedy `(.+)` capture.
//!
//! Templates whose placeholders touch (`{a}{b}`) cannot be split uniquely by
//! greedy matching. They still compile and match; the ambiguity is reported
//! as a warning.

mod matcher;

pub use matcher::{
    matches, CatalogEntry, CrossMatch, ObjectLink, SelfCheck, TemplateCatalog,
};

use std::collections::HashSet;

use regex::Regex;

use crate::error::{CheckError, CheckResult, Diagnostic};

/// Token substituted for every placeholder when generating an example identifier
pub const DEFAULT_SENTINEL: &str = "1";

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text matched verbatim (escapes already resolved)
    Literal(String),
    /// A `{name}` placeholder
    Placeholder(String),
}

/// Non-fatal findings about a template's shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateWarning {
    /// Two placeholders with nothing between them
    AmbiguousBoundary { first: String, second: String },
    /// A placeholder name used more than once
    DuplicatePlaceholder(String),
}

/// A template compiled into segments and a full-string matcher
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    source: String,
    segments: Vec<Segment>,
    pattern: Regex,
    warnings: Vec<TemplateWarning>,
}

impl CompiledTemplate {
    /// Compile a template string
    ///
    /// `\{`, `\}` and `\\` are literal characters. Unbalanced or empty
    /// braces are rejected.
    pub fn compile(template: &str) -> CheckResult<Self> {
        let segments = parse_segments(template)?;
        let warnings = inspect(&segments);

        let mut pattern = String::from("(?s)^");
        for segment in &segments {
            match segment {
                Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                Segment::Placeholder(_) => pattern.push_str("(.+)"),
            }
        }
        pattern.push('$');

        let pattern = Regex::new(&pattern)
            .map_err(|e| CheckError::invalid_template(template, e.to_string()))?;

        Ok(Self {
            source: template.to_string(),
            segments,
            pattern,
            warnings,
        })
    }

    /// The template as written
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names, left to right
    pub fn placeholders(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Literal spans, left to right
    pub fn literal_segments(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Literal(text) => Some(text.as_str()),
                Segment::Placeholder(_) => None,
            })
            .collect()
    }

    /// Identifier produced by substituting [`DEFAULT_SENTINEL`] everywhere
    pub fn example_identifier(&self) -> String {
        self.example_identifier_with(DEFAULT_SENTINEL)
    }

    pub fn example_identifier_with(&self, sentinel: &str) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.as_str(),
                Segment::Placeholder(_) => sentinel,
            })
            .collect()
    }

    /// Substitute a value for each placeholder
    ///
    /// Values are inserted as-is, without IRI escaping. The first error
    /// returned by `value_of` aborts the substitution.
    pub fn instantiate<E>(
        &self,
        mut value_of: impl FnMut(&str) -> Result<String, E>,
    ) -> Result<String, E> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => out.push_str(&value_of(name)?),
            }
        }
        Ok(out)
    }

    /// The anchored regex used for matching
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn warnings(&self) -> &[TemplateWarning] {
        &self.warnings
    }

    /// Check if greedy matching may split captured text arbitrarily
    pub fn is_ambiguous(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, TemplateWarning::AmbiguousBoundary { .. }))
    }

    /// Warnings as diagnostics attributed to a rule
    pub fn diagnostics(&self, rule: &str) -> Vec<Diagnostic> {
        self.warnings
            .iter()
            .map(|w| match w {
                TemplateWarning::AmbiguousBoundary { first, second } => {
                    Diagnostic::AmbiguousTemplate {
                        rule: rule.to_string(),
                        template: self.source.clone(),
                        first: first.clone(),
                        second: second.clone(),
                    }
                }
                TemplateWarning::DuplicatePlaceholder(name) => Diagnostic::DuplicatePlaceholder {
                    rule: rule.to_string(),
                    template: self.source.clone(),
                    name: name.clone(),
                },
            })
            .collect()
    }
}

/// Split a template into literal and placeholder segments
fn parse_segments(template: &str) -> CheckResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(&next @ ('{' | '}' | '\\')) => {
                    chars.next();
                    literal.push(next);
                }
                _ => literal.push('\\'),
            },
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => {
                            return Err(CheckError::invalid_template(
                                template,
                                "nested '{' inside placeholder",
                            ))
                        }
                        _ => name.push(c),
                    }
                }
                if !closed {
                    return Err(CheckError::invalid_template(template, "unclosed '{'"));
                }
                if name.trim().is_empty() {
                    return Err(CheckError::invalid_template(template, "empty placeholder"));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name));
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

fn inspect(segments: &[Segment]) -> Vec<TemplateWarning> {
    let mut warnings = Vec::new();

    for pair in segments.windows(2) {
        if let [Segment::Placeholder(first), Segment::Placeholder(second)] = pair {
            warnings.push(TemplateWarning::AmbiguousBoundary {
                first: first.clone(),
                second: second.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for segment in segments {
        if let Segment::Placeholder(name) = segment {
            if !seen.insert(name.as_str()) && reported.insert(name.as_str()) {
                warnings.push(TemplateWarning::DuplicatePlaceholder(name.clone()));
            }
        }
    }

    warnings
}
