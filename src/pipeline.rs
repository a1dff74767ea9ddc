//! Access check, scope, shape and filter, run in that order for one page.

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{AccessDenied, InvalidFilter};
use crate::filter::{apply_filters, FilterSet, Filterable};
use crate::models::{Principal, Role};
use crate::scope::{
    annotate_owners, check_access, resolve_scope, EntityKind, Owned, OwnerRef, Scoped,
};
use crate::shape::{shape_view, RoleView, Shape, ShapeContext};

/// Everything a page needs from its row type.
pub trait Page: Scoped + Shape + Filterable + Clone + Serialize {}

impl<T> Page for T where T: Scoped + Shape + Filterable + Clone + Serialize {}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome<V> {
    Denied(AccessDenied),
    Ready(V),
}

impl<V> PageOutcome<V> {
    pub fn ready(self) -> Option<V> {
        match self {
            PageOutcome::Ready(view) => Some(view),
            PageOutcome::Denied(_) => None,
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, PageOutcome::Denied(_))
    }
}

fn messages<S: Serializer>(ignored: &[InvalidFilter], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(ignored.iter().map(ToString::to_string))
}

/// The shaped summary of the whole scope plus the rows left after filtering.
///
/// `owners` runs parallel to `items` on admin pages of owned kinds and is
/// empty everywhere else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView<T: Page> {
    pub kind: EntityKind,
    pub view: RoleView<T::Admin, T::Member>,
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<OwnerRef>,
    #[serde(serialize_with = "messages", skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<InvalidFilter>,
}

impl<T: Page> PageView<T> {
    /// Drops the row type, keeping the page as JSON. Owned rows get their
    /// `ownerId` and `ownerName` inlined.
    pub fn render(&self) -> serde_json::Result<RenderedPage> {
        let summary = match &self.view {
            RoleView::Admin(summary) => serde_json::to_value(summary)?,
            RoleView::Teacher(summary) | RoleView::Student(summary) => {
                serde_json::to_value(summary)?
            }
        };
        let items = if self.owners.is_empty() {
            self.items
                .iter()
                .map(serde_json::to_value)
                .collect::<serde_json::Result<Vec<_>>>()?
        } else {
            self.items
                .iter()
                .zip(&self.owners)
                .map(|(item, owner)| serde_json::to_value(Owned { owner, item }))
                .collect::<serde_json::Result<Vec<_>>>()?
        };
        Ok(RenderedPage {
            kind: self.kind,
            role: self.view.role(),
            summary,
            items,
            ignored: self.ignored.clone(),
        })
    }
}

/// A page of any kind, as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPage {
    pub kind: EntityKind,
    pub role: Role,
    pub summary: Value,
    pub items: Vec<Value>,
    /// Filter parts the page could not apply.
    #[serde(serialize_with = "messages", skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<InvalidFilter>,
}

/// Runs the page for the row type's own kind.
pub fn run_page<T: Page>(
    principal: &Principal,
    ctx: &ShapeContext<'_>,
    items: &[T],
    filters: &FilterSet,
) -> PageOutcome<PageView<T>> {
    run_page_as(T::KIND, principal, ctx, items, filters)
}

/// Runs a page whose access rule is `kind` over rows of type `T`, for pages
/// that reuse another kind's rows (analytics over classes).
pub fn run_page_as<T: Page>(
    kind: EntityKind,
    principal: &Principal,
    ctx: &ShapeContext<'_>,
    items: &[T],
    filters: &FilterSet,
) -> PageOutcome<PageView<T>> {
    if let Err(denied) = check_access(principal.role, kind) {
        debug!(principal = %principal.id, %kind, "page denied");
        return PageOutcome::Denied(denied);
    }

    let scoped = resolve_scope(principal, ctx.directory, items);
    let view = shape_view(principal.role, &scoped, ctx);
    let ignored = filters.unsupported_by::<T>();
    let items = apply_filters(&scoped, filters);
    let owners = match principal.role {
        Role::Admin => annotate_owners(ctx.directory, &items),
        Role::Teacher | Role::Student => Vec::new(),
    };
    debug!(
        principal = %principal.id,
        %kind,
        scoped = scoped.len(),
        shown = items.len(),
        ignored = ignored.len(),
        "page ready"
    );
    PageOutcome::Ready(PageView {
        kind,
        view,
        items,
        owners,
        ignored,
    })
}

/// Runs the page for `kind` against the matching collection of `dataset`.
pub fn run_dataset_page(
    kind: EntityKind,
    principal: &Principal,
    ctx: &ShapeContext<'_>,
    dataset: &Dataset,
    filters: &FilterSet,
) -> serde_json::Result<PageOutcome<RenderedPage>> {
    match kind {
        EntityKind::Classes => render(run_page(principal, ctx, &dataset.classes, filters)),
        EntityKind::Analytics => {
            render(run_page_as(kind, principal, ctx, &dataset.classes, filters))
        }
        EntityKind::Sessions => render(run_page(principal, ctx, &dataset.sessions, filters)),
        EntityKind::Events => render(run_page(principal, ctx, &dataset.events, filters)),
        EntityKind::Students => render(run_page(principal, ctx, &dataset.students, filters)),
        EntityKind::Users => render(run_page(principal, ctx, &dataset.users, filters)),
        EntityKind::Notifications => {
            render(run_page(principal, ctx, &dataset.notifications, filters))
        }
        EntityKind::Notes => render(run_page(principal, ctx, &dataset.notes, filters)),
    }
}

fn render<T: Page>(
    outcome: PageOutcome<PageView<T>>,
) -> serde_json::Result<PageOutcome<RenderedPage>> {
    match outcome {
        PageOutcome::Denied(denied) => Ok(PageOutcome::Denied(denied)),
        PageOutcome::Ready(page) => page.render().map(PageOutcome::Ready),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticDirectory;
    use crate::models::{Class, Role};
    use crate::pages::fixtures::{class, today};

    fn classes() -> Vec<Class> {
        vec![
            class(1, "Calculus II", "Dr. Sarah Wilson", 15, 94.0),
            class(2, "Physics Fundamentals", "Prof. Michael Chen", 18, 83.0),
        ]
    }

    #[test]
    fn analytics_is_denied_to_students_but_classes_are_not() {
        let directory = StaticDirectory::default();
        let ctx = ShapeContext::new(&directory, today());
        let student = Principal::new("student_1", Role::Student);
        let filters = FilterSet::default();

        let analytics = run_page_as(EntityKind::Analytics, &student, &ctx, &classes(), &filters);
        assert_eq!(
            analytics,
            PageOutcome::Denied(AccessDenied {
                role: Role::Student,
                kind: EntityKind::Analytics
            })
        );

        let page = run_page(&student, &ctx, &classes(), &filters).ready().unwrap();
        assert_eq!(page.kind, EntityKind::Classes);
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn unknown_teacher_gets_ready_page_with_zeroed_metrics() {
        let directory = StaticDirectory::default();
        let ctx = ShapeContext::new(&directory, today());
        let stranger = Principal::new("teacher_99", Role::Teacher);
        let page = run_page(&stranger, &ctx, &classes(), &FilterSet::default())
            .ready()
            .unwrap();
        assert!(page.items.is_empty());
        let summary = page.view.member().unwrap();
        assert_eq!(summary.total_classes, 0);
        assert_eq!(summary.average_grade, 0.0);
    }

    #[test]
    fn filters_narrow_items_but_not_the_summary() {
        let directory = StaticDirectory::default();
        let ctx = ShapeContext::new(&directory, today());
        let admin = Principal::new("admin_1", Role::Admin);
        let (filters, _) = FilterSet::from_params([("threshold", "high")]);
        let page = run_page(&admin, &ctx, &classes(), &filters).ready().unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.view.admin().unwrap().total_classes, 2);
    }

    #[test]
    fn rendered_page_carries_role_and_summary() {
        let directory = StaticDirectory::default();
        let ctx = ShapeContext::new(&directory, today());
        let teacher = Principal::new("teacher_1", Role::Teacher);
        let page = run_page(&teacher, &ctx, &classes(), &FilterSet::default())
            .ready()
            .unwrap();
        let rendered = page.render().unwrap();
        assert_eq!(rendered.role, Role::Teacher);
        assert_eq!(rendered.summary["totalClasses"], 1);
        assert_eq!(rendered.items[0]["instructorName"], "Dr. Sarah Wilson");
        assert!(rendered.items[0].get("ownerId").is_none());
    }

    #[test]
    fn admin_items_carry_their_owner() {
        let directory = StaticDirectory::default();
        let ctx = ShapeContext::new(&directory, today());
        let admin = Principal::new("admin_1", Role::Admin);
        let mut rows = classes();
        rows.push(class(3, "History of Science", "Prof. David Kim", 20, 84.0));

        let page = run_page(&admin, &ctx, &rows, &FilterSet::default())
            .ready()
            .unwrap();
        assert_eq!(page.owners.len(), 3);
        let rendered = page.render().unwrap();
        assert_eq!(rendered.items[0]["ownerId"], "teacher_1");
        assert_eq!(rendered.items[1]["ownerName"], "Prof. Michael Chen");
        assert_eq!(rendered.items[2]["ownerId"], serde_json::Value::Null);
        assert_eq!(rendered.items[2]["ownerName"], "unknown");
        assert_eq!(rendered.items[2]["name"], "History of Science");
    }

    #[test]
    fn sort_the_rows_cannot_honor_is_returned_as_ignored() {
        let directory = StaticDirectory::default();
        let ctx = ShapeContext::new(&directory, today());
        let admin = Principal::new("admin_1", Role::Admin);
        let (filters, invalid) = FilterSet::from_params([("sort", "joined")]);
        assert!(invalid.is_empty());

        let page = run_page(&admin, &ctx, &classes(), &filters).ready().unwrap();
        assert_eq!(
            page.ignored,
            vec![InvalidFilter::UnsupportedSort("joined".to_string())]
        );
        let ids: Vec<i64> = page.items.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let rendered = serde_json::to_value(page.render().unwrap()).unwrap();
        assert_eq!(rendered["ignored"], serde_json::json!(["`joined` cannot sort this list"]));
    }
}
