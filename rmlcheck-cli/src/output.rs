use crate::error::{CliError, CliResult};
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use rmlcheck_core::template::{CrossMatch, ObjectLink, SelfCheck};
use rmlcheck_core::{
    CheckReport, Diagnostic, GroupedObject, PredicateObjectGroups, PredicateRef,
    PredicateSubjects, SubjectOutcome,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Pretty-printed JSON for any report value.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Output(format!("cannot serialize report: {e}")))
}

/// Write the rendered report to `output`, or stdout when absent.
pub fn emit(content: &str, output: Option<&Path>) -> CliResult<()> {
    match output {
        Some(path) => {
            let mut text = content.to_string();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            std::fs::write(path, text).map_err(|e| {
                CliError::Output(format!("cannot write {}: {e}", path.display()))
            })?;
            tracing::info!(path = %path.display(), "wrote report");
            Ok(())
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            writeln!(lock, "{content}")
                .map_err(|e| CliError::Output(format!("cannot write to stdout: {e}")))
        }
    }
}

// ---------------------------------------------------------------------------
// Text renderers
// ---------------------------------------------------------------------------

pub fn predicates_text(predicates: &[PredicateRef]) -> String {
    if predicates.is_empty() {
        return "No predicates found.".to_string();
    }
    predicates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn objects_text(groups: &PredicateObjectGroups) -> String {
    if groups.is_empty() {
        return "No predicate/object mappings found.".to_string();
    }

    let mut lines = Vec::new();
    for (predicate, objects) in groups.iter() {
        lines.push(predicate.bold().to_string());
        for object in objects {
            lines.push(format!("  {}", object_line(object)));
        }
    }
    lines.join("\n")
}

fn object_line(object: &GroupedObject) -> String {
    let mut line = format!("{} ({})", object.object, object.kind.as_str());
    if let Some(datatype) = &object.datatype {
        line.push_str(&format!(" ^^{datatype}"));
    }
    if let Some(language) = &object.language {
        line.push_str(&format!(" @{language}"));
    }
    line
}

pub fn templates_text(
    self_check: &[SelfCheck],
    cross_check: &[CrossMatch],
    object_links: &[ObjectLink],
) -> String {
    if self_check.is_empty() {
        return "No subject templates found.".to_string();
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["RULE", "TEMPLATE", "EXAMPLE", "SELF-MATCH", "ALSO MATCHED BY"]);

    for check in self_check {
        let matched_by = cross_check
            .iter()
            .find(|c| c.rule == check.rule)
            .map(|c| c.matched_by.join("\n"))
            .unwrap_or_default();
        let status = if check.matches {
            "yes".green().to_string()
        } else {
            "NO".red().bold().to_string()
        };
        table.add_row(vec![
            check.rule.clone(),
            check.template.clone(),
            check.example.clone(),
            status,
            matched_by,
        ]);
    }

    let mut out = table.to_string();

    if !object_links.is_empty() {
        let mut links = Table::new();
        links.set_content_arrangement(ContentArrangement::Dynamic);
        links.set_header(vec!["RULE", "PREDICATE", "OBJECT TEMPLATE", "EXAMPLE", "TARGETS"]);
        for link in object_links {
            let targets = if link.targets.is_empty() {
                "-".to_string()
            } else {
                link.targets.join("\n")
            };
            links.add_row(vec![
                link.rule.clone(),
                link.predicate.clone(),
                link.template.clone(),
                link.example.clone(),
                targets,
            ]);
        }
        out.push('\n');
        out.push_str(&links.to_string());
    }

    out
}

pub fn subjects_text(subjects: &[PredicateSubjects]) -> String {
    if subjects.is_empty() {
        return "No predicates found.".to_string();
    }

    let mut lines = Vec::new();
    for entry in subjects {
        lines.push(entry.predicate.to_string().bold().to_string());
        match &entry.outcome {
            SubjectOutcome::Identifiers(ids) => {
                for id in ids {
                    lines.push(format!("  {}", id.value));
                }
            }
            SubjectOutcome::QueryFailed(errors) => {
                for error in errors {
                    lines.push(format!("  {} {}", "failed:".red(), error.message));
                }
            }
            other => {
                if let Some(message) = other.message() {
                    lines.push(format!("  {}", message.dimmed()));
                }
            }
        }
    }
    lines.join("\n")
}

pub fn diagnostics_text(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("{} {d}", "warning:".yellow().bold()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Body plus trailing diagnostics, when there are any
pub fn with_diagnostics(body: String, diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        body
    } else {
        format!("{body}\n\n{}", diagnostics_text(diagnostics))
    }
}

pub fn report_text(report: &CheckReport) -> String {
    let mut sections = vec![
        section("Predicates", predicates_text(&report.predicates)),
        section("Objects", objects_text(&report.objects)),
        section(
            "Templates",
            templates_text(&report.self_check, &report.cross_check, &report.object_links),
        ),
    ];
    if let Some(subjects) = &report.subjects {
        sections.push(section("Subjects", subjects_text(subjects)));
    }

    let self_check = if report.self_check_passed() {
        "passed".green().to_string()
    } else {
        "FAILED".red().bold().to_string()
    };
    sections.push(format!(
        "{} rule(s), {} predicate(s), {} diagnostic(s); template self-check {self_check}",
        report.rules,
        report.predicates.len(),
        report.diagnostics.len(),
    ));

    with_diagnostics(sections.join("\n\n"), &report.diagnostics)
}

fn section(title: &str, body: String) -> String {
    format!("{}\n{body}", format!("== {title} ==").cyan().bold())
}
