use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::filter::{grade_rank, Filterable, SortKey, SortValue};
use crate::models::{AccountStatus, Student};
use crate::scope::{resolve_owner, EntityKind, Ownership, Scoped};
use crate::shape::{mean, percent, MetricsPolicy, Shape, ShapeContext};

impl Scoped for Student {
    const KIND: EntityKind = EntityKind::Students;

    fn ownership(&self) -> Ownership<'_> {
        Ownership::Teacher(self.teacher_id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub pending: usize,
    pub average_attendance: f64,
    /// Completed over assigned work, summed across the roster.
    pub assignment_completion: f64,
    /// Every subject on the roster, sorted and deduplicated.
    pub subjects: Vec<String>,
}

impl RosterSummary {
    fn of(students: &[Student]) -> Self {
        let count = |status: AccountStatus| students.iter().filter(|s| s.status == status).count();
        let completed: u32 = students.iter().map(|s| s.assignments_completed).sum();
        let assigned: u32 = students.iter().map(|s| s.assignments_total).sum();
        let subjects: BTreeSet<&str> = students
            .iter()
            .flat_map(|s| s.subjects.iter().map(String::as_str))
            .collect();
        RosterSummary {
            total: students.len(),
            active: count(AccountStatus::Active),
            inactive: count(AccountStatus::Inactive),
            pending: count(AccountStatus::Pending),
            average_attendance: mean(students.iter().map(|s| s.attendance_pct)),
            assignment_completion: percent(f64::from(completed), f64::from(assigned)),
            subjects: subjects.into_iter().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterOwnerStats {
    pub teacher_id: Option<String>,
    pub students: usize,
    pub active: usize,
    pub average_attendance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterAdminSummary {
    #[serde(flatten)]
    pub roster: RosterSummary,
    pub teacher_breakdown: BTreeMap<String, RosterOwnerStats>,
}

impl Shape for Student {
    type Admin = RosterAdminSummary;
    type Member = RosterSummary;

    fn admin_view(items: &[Self], ctx: &ShapeContext<'_>) -> Self::Admin {
        let mut grouped: BTreeMap<String, (Option<String>, Vec<&Student>)> = BTreeMap::new();
        for student in items {
            let owner = resolve_owner(student.ownership(), ctx.directory);
            grouped
                .entry(owner.owner_name)
                .or_insert_with(|| (owner.owner_id, Vec::new()))
                .1
                .push(student);
        }
        let teacher_breakdown = grouped
            .into_iter()
            .map(|(name, (teacher_id, students))| {
                let stats = RosterOwnerStats {
                    teacher_id,
                    students: students.len(),
                    active: students.iter().filter(|s| s.status == AccountStatus::Active).count(),
                    average_attendance: mean(students.iter().map(|s| s.attendance_pct)),
                };
                (name, stats)
            })
            .collect();
        RosterAdminSummary {
            roster: RosterSummary::of(items),
            teacher_breakdown,
        }
    }

    fn member_view(items: &[Self], ctx: &ShapeContext<'_>) -> Self::Member {
        let mut roster = RosterSummary::of(items);
        if let MetricsPolicy::Configured(metrics) = ctx.metrics {
            roster.average_attendance = metrics.attendance_rate;
        }
        roster
    }
}

impl Filterable for Student {
    const SORT_KEYS: &'static [SortKey] = &[
        SortKey::Name,
        SortKey::Grade,
        SortKey::Attendance,
        SortKey::Recent,
    ];

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.email.as_str()];
        fields.extend(self.subjects.iter().map(String::as_str));
        fields
    }

    fn subjects(&self) -> Option<&[String]> {
        Some(&self.subjects)
    }

    fn metric(&self) -> Option<f64> {
        Some(self.attendance_pct)
    }

    fn sort_value(&self, key: SortKey) -> Option<SortValue<'_>> {
        match key {
            SortKey::Name => Some(SortValue::Text(self.name.as_str())),
            SortKey::Grade => Some(SortValue::Rank(grade_rank(&self.grade))),
            SortKey::Attendance => Some(SortValue::Number(self.attendance_pct)),
            SortKey::Recent => Some(SortValue::Time(self.last_active_at)),
            _ => None,
        }
    }
}
