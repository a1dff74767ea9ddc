use std::collections::BTreeMap;

use serde::Serialize;

use crate::filter::{Filterable, SortKey, SortValue, Threshold};
use crate::models::Class;
use crate::scope::{resolve_owner, EntityKind, Ownership, Scoped, UNKNOWN_OWNER};
use crate::shape::{mean, MetricsPolicy, Shape, ShapeContext};

impl Scoped for Class {
    const KIND: EntityKind = EntityKind::Classes;

    fn ownership(&self) -> Ownership<'_> {
        Ownership::Instructor(Some(self.instructor_name.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOwnerStats {
    pub classes: usize,
    pub students: u64,
    pub average_engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAdminSummary {
    pub total_classes: usize,
    pub total_students: u64,
    pub average_class_size: f64,
    pub average_engagement: f64,
    pub average_grade: f64,
    pub average_completion: f64,
    pub high_engagement: usize,
    pub needs_attention: usize,
    pub instructors: usize,
    pub instructor_breakdown: BTreeMap<String, ClassOwnerStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassMemberSummary {
    pub total_classes: usize,
    pub total_students: u64,
    pub average_grade: f64,
    pub average_engagement: f64,
    pub completion_rate: f64,
    pub high_engagement: usize,
    pub needs_attention: usize,
}

fn students(classes: &[Class]) -> u64 {
    classes.iter().map(|c| u64::from(c.students_count)).sum()
}

fn in_band(classes: &[Class], threshold: Threshold) -> usize {
    classes.iter().filter(|c| threshold.admits(c.engagement_pct)).count()
}

impl Shape for Class {
    type Admin = ClassAdminSummary;
    type Member = ClassMemberSummary;

    fn admin_view(items: &[Self], ctx: &ShapeContext<'_>) -> Self::Admin {
        let mut grouped: BTreeMap<String, Vec<&Class>> = BTreeMap::new();
        for class in items {
            let owner = resolve_owner(class.ownership(), ctx.directory);
            grouped.entry(owner.owner_name).or_default().push(class);
        }
        let instructor_breakdown: BTreeMap<String, ClassOwnerStats> = grouped
            .into_iter()
            .map(|(name, classes)| {
                let stats = ClassOwnerStats {
                    classes: classes.len(),
                    students: classes.iter().map(|c| u64::from(c.students_count)).sum(),
                    average_engagement: mean(classes.iter().map(|c| c.engagement_pct)),
                };
                (name, stats)
            })
            .collect();

        let total_students = students(items);
        ClassAdminSummary {
            total_classes: items.len(),
            total_students,
            average_class_size: mean(items.iter().map(|c| f64::from(c.students_count))),
            average_engagement: mean(items.iter().map(|c| c.engagement_pct)),
            average_grade: mean(items.iter().map(|c| c.avg_grade)),
            average_completion: mean(items.iter().map(|c| c.completion_rate)),
            high_engagement: in_band(items, Threshold::High),
            needs_attention: in_band(items, Threshold::NeedsAttention),
            instructors: instructor_breakdown
                .keys()
                .filter(|k| k.as_str() != UNKNOWN_OWNER)
                .count(),
            instructor_breakdown,
        }
    }

    fn member_view(items: &[Self], ctx: &ShapeContext<'_>) -> Self::Member {
        let average_grade = match ctx.metrics {
            MetricsPolicy::Computed => mean(items.iter().map(|c| c.avg_grade)),
            MetricsPolicy::Configured(metrics) => metrics.average_grade,
        };
        ClassMemberSummary {
            total_classes: items.len(),
            total_students: students(items),
            average_grade,
            average_engagement: mean(items.iter().map(|c| c.engagement_pct)),
            completion_rate: mean(items.iter().map(|c| c.completion_rate)),
            high_engagement: in_band(items, Threshold::High),
            needs_attention: in_band(items, Threshold::NeedsAttention),
        }
    }
}

impl Filterable for Class {
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Name, SortKey::Engagement, SortKey::Grade];

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.instructor_name.as_str()]
    }

    fn metric(&self) -> Option<f64> {
        Some(self.engagement_pct)
    }

    fn sort_value(&self, key: SortKey) -> Option<SortValue<'_>> {
        match key {
            SortKey::Name => Some(SortValue::Text(self.name.as_str())),
            SortKey::Engagement => Some(SortValue::Number(self.engagement_pct)),
            SortKey::Grade => Some(SortValue::Number(self.avg_grade)),
            _ => None,
        }
    }
}
