use std::fmt::Write;

use serde_json::{Map, Value};

use crate::dataset::Dataset;
use crate::filter::FilterSet;
use crate::models::Principal;
use crate::pipeline::{run_dataset_page, PageOutcome, RenderedPage};
use crate::scope::EntityKind;
use crate::shape::ShapeContext;

const LISTED_ITEMS: usize = 5;

/// `totalClasses` -> `total classes`.
fn words(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push(' ');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) if number.is_f64() => {
            format!("{:.1}", number.as_f64().unwrap_or_default())
        }
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(values) => values.iter().map(scalar).collect::<Vec<_>>().join(", "),
        Value::Object(fields) => inline(fields),
    }
}

fn inline(fields: &Map<String, Value>) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{} {}", words(key), scalar(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn item_label(item: &Value) -> String {
    ["title", "name"]
        .iter()
        .find_map(|key| item.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| scalar(&item["id"]))
}

/// A non-empty map of per-owner stat objects.
fn is_breakdown(groups: &Map<String, Value>) -> bool {
    !groups.is_empty() && groups.values().all(Value::is_object)
}

fn write_page(output: &mut String, page: &RenderedPage) {
    if let Value::Object(summary) = &page.summary {
        for (key, value) in summary {
            match value {
                Value::Object(groups) if is_breakdown(groups) => {
                    let _ = writeln!(output, "- {}:", words(key));
                    for (group, stats) in groups {
                        let _ = writeln!(output, "  - {}: {}", group, scalar(stats));
                    }
                }
                other => {
                    let _ = writeln!(output, "- {}: {}", words(key), scalar(other));
                }
            }
        }
    }

    let _ = writeln!(output);
    for item in page.items.iter().take(LISTED_ITEMS) {
        let _ = writeln!(output, "1. {}", item_label(item));
    }
    if page.items.len() > LISTED_ITEMS {
        let _ = writeln!(output, "\n...and {} more.", page.items.len() - LISTED_ITEMS);
    }
}

/// One page as markdown, without a heading.
pub fn render_page(page: &RenderedPage) -> String {
    let mut output = String::new();
    write_page(&mut output, page);
    output
}

/// Renders every page the principal can open, in page order, as markdown.
pub fn build_report(principal: &Principal, ctx: &ShapeContext<'_>, dataset: &Dataset) -> String {
    let mut output = String::new();
    let filters = FilterSet::default();

    let _ = writeln!(output, "# LMS Scope Report");
    let _ = writeln!(
        output,
        "Generated for {} ({}) on {}",
        principal.id, principal.role, ctx.today
    );

    for kind in EntityKind::ALL {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", title(kind));

        match run_dataset_page(kind, principal, ctx, dataset, &filters) {
            Ok(PageOutcome::Denied(_)) => {
                let _ = writeln!(output, "Access denied.");
            }
            Ok(PageOutcome::Ready(page)) if page.items.is_empty() => {
                let _ = writeln!(output, "No data.");
            }
            Ok(PageOutcome::Ready(page)) => write_page(&mut output, &page),
            Err(err) => {
                tracing::warn!(%kind, error = %err, "page could not be rendered");
                let _ = writeln!(output, "Unavailable: {err}");
            }
        }
    }

    output
}

fn title(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Classes => "Classes",
        EntityKind::Analytics => "Analytics",
        EntityKind::Sessions => "Live Sessions",
        EntityKind::Events => "Calendar",
        EntityKind::Students => "Students",
        EntityKind::Users => "Users",
        EntityKind::Notifications => "Notifications",
        EntityKind::Notes => "Notes",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticDirectory;
    use crate::models::Role;
    use crate::pages::fixtures::today;

    fn report_for(principal: &Principal, dataset: &Dataset) -> String {
        let directory = StaticDirectory::default();
        let ctx = ShapeContext::new(&directory, today());
        build_report(principal, &ctx, dataset)
    }

    fn section<'a>(report: &'a str, heading: &str) -> &'a str {
        let start = report.find(&format!("## {heading}\n")).unwrap();
        let rest = &report[start..];
        let end = rest[3..].find("\n## ").map_or(rest.len(), |i| i + 3);
        &rest[..end]
    }

    #[test]
    fn student_report_marks_denied_pages() {
        let student = Principal::new("student_1", Role::Student);
        let report = report_for(&student, &Dataset::demo().unwrap());
        assert!(report.starts_with(
            "# LMS Scope Report\nGenerated for student_1 (student) on 2025-06-15"
        ));
        assert!(section(&report, "Analytics").contains("Access denied."));
        assert!(section(&report, "Students").contains("Access denied."));
        assert!(section(&report, "Users").contains("Access denied."));
        assert!(section(&report, "Live Sessions").contains("- total: 6"));
    }

    #[test]
    fn empty_scope_reads_no_data() {
        let report = report_for(&Principal::new("teacher_1", Role::Teacher), &Dataset::default());
        assert!(section(&report, "Classes").contains("No data."));
        assert!(section(&report, "Users").contains("Access denied."));
    }

    #[test]
    fn admin_report_lists_breakdowns() {
        let admin = Principal::new("admin_1", Role::Admin);
        let report = report_for(&admin, &Dataset::demo().unwrap());
        let sessions = section(&report, "Live Sessions");
        assert!(sessions.contains("- instructor breakdown:"));
        assert!(sessions.contains(concat!(
            "  - Dr. Sarah Wilson: cancelled 0, completed 0, live 1, ",
            "participants 24, scheduled 0, total 1"
        )));
        let unknown = "  - unknown: cancelled 1, completed 1, live 0, participants 28";
        assert!(sessions.contains(unknown));
        assert!(sessions.contains("1. Advanced Calculus - Derivatives"));
    }

    #[test]
    fn keys_read_as_words() {
        assert_eq!(words("averageFillRate"), "average fill rate");
        assert_eq!(words("total"), "total");
    }
}
