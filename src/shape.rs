use std::fmt::Debug;

use chrono::NaiveDate;
use serde::Serialize;

use crate::identity::IdentityDirectory;
use crate::models::Role;

/// Where teacher-facing headline metrics come from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MetricsPolicy {
    /// Means over the scoped rows.
    #[default]
    Computed,
    /// Fixed figures supplied by configuration.
    Configured(ConfiguredMetrics),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguredMetrics {
    pub average_grade: f64,
    pub attendance_rate: f64,
}

impl ConfiguredMetrics {
    /// The figures the dashboards have historically shown to teachers.
    pub const fn legacy() -> Self {
        Self {
            average_grade: 88.7,
            attendance_rate: 92.5,
        }
    }
}

/// Everything a shaper may consult besides the rows themselves.
#[derive(Clone, Copy)]
pub struct ShapeContext<'a> {
    pub directory: &'a dyn IdentityDirectory,
    pub today: NaiveDate,
    pub metrics: MetricsPolicy,
}

impl<'a> ShapeContext<'a> {
    pub fn new(directory: &'a dyn IdentityDirectory, today: NaiveDate) -> Self {
        Self {
            directory,
            today,
            metrics: MetricsPolicy::Computed,
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsPolicy) -> Self {
        self.metrics = metrics;
        self
    }
}

/// A view-model tagged by the role it was shaped for. Admin summaries carry
/// system-wide breakdowns; member summaries only describe the scoped rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", content = "summary", rename_all = "lowercase")]
pub enum RoleView<A, M> {
    Admin(A),
    Teacher(M),
    Student(M),
}

impl<A, M> RoleView<A, M> {
    pub fn role(&self) -> Role {
        match self {
            RoleView::Admin(_) => Role::Admin,
            RoleView::Teacher(_) => Role::Teacher,
            RoleView::Student(_) => Role::Student,
        }
    }

    pub fn admin(&self) -> Option<&A> {
        match self {
            RoleView::Admin(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn member(&self) -> Option<&M> {
        match self {
            RoleView::Teacher(summary) | RoleView::Student(summary) => Some(summary),
            RoleView::Admin(_) => None,
        }
    }
}

pub trait Shape: Sized {
    type Admin: Debug + Clone + PartialEq + Serialize;
    type Member: Debug + Clone + PartialEq + Serialize;

    fn admin_view(items: &[Self], ctx: &ShapeContext<'_>) -> Self::Admin;

    fn member_view(items: &[Self], ctx: &ShapeContext<'_>) -> Self::Member;
}

/// Shapes already-scoped rows for `role`. For admins the scoped rows are the
/// full collection, so owner breakdowns cover every owner present.
pub fn shape_view<T: Shape>(
    role: Role,
    items: &[T],
    ctx: &ShapeContext<'_>,
) -> RoleView<T::Admin, T::Member> {
    match role {
        Role::Admin => RoleView::Admin(T::admin_view(items, ctx)),
        Role::Teacher => RoleView::Teacher(T::member_view(items, ctx)),
        Role::Student => RoleView::Student(T::member_view(items, ctx)),
    }
}

/// Arithmetic mean, `0.0` for no values.
pub fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// `part` as a percentage of `whole`, `0.0` when `whole` is zero.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}
