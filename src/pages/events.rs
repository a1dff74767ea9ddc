use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::filter::{Filterable, SortKey, SortValue};
use crate::models::{Event, EventType};
use crate::scope::{resolve_owner, EntityKind, Ownership, Scoped, UNKNOWN_OWNER};
use crate::shape::{Shape, ShapeContext};

/// Days ahead, today included, that count as "this week".
const WEEK_AHEAD_DAYS: i64 = 7;

impl Scoped for Event {
    const KIND: EntityKind = EntityKind::Events;

    fn ownership(&self) -> Ownership<'_> {
        Ownership::Instructor(self.instructor_name.as_deref())
    }
}

fn empty_type_counts() -> BTreeMap<EventType, usize> {
    EventType::ALL.into_iter().map(|kind| (kind, 0)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCounts {
    pub total: usize,
    pub today: usize,
    pub this_week: usize,
    pub by_type: BTreeMap<EventType, usize>,
}

impl EventCounts {
    fn of(events: &[Event], today: NaiveDate) -> Self {
        let mut by_type = empty_type_counts();
        let mut counts = EventCounts {
            total: events.len(),
            today: 0,
            this_week: 0,
            by_type: BTreeMap::new(),
        };
        for event in events {
            let days_until = (event.date - today).num_days();
            if days_until == 0 {
                counts.today += 1;
            }
            if (0..=WEEK_AHEAD_DAYS).contains(&days_until) {
                counts.this_week += 1;
            }
            *by_type.entry(event.kind).or_default() += 1;
        }
        counts.by_type = by_type;
        counts
    }

    pub fn of_type(&self, kind: EventType) -> usize {
        self.by_type.get(&kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOwnerStats {
    pub teacher_id: Option<String>,
    pub events: usize,
    pub by_type: BTreeMap<EventType, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAdminSummary {
    #[serde(flatten)]
    pub counts: EventCounts,
    pub teachers: usize,
    pub teacher_breakdown: BTreeMap<String, EventOwnerStats>,
}

impl Shape for Event {
    type Admin = EventAdminSummary;
    type Member = EventCounts;

    fn admin_view(items: &[Self], ctx: &ShapeContext<'_>) -> Self::Admin {
        let mut breakdown: BTreeMap<String, EventOwnerStats> = BTreeMap::new();
        for event in items {
            let owner = resolve_owner(event.ownership(), ctx.directory);
            let stats = breakdown
                .entry(owner.owner_name)
                .or_insert_with(|| EventOwnerStats {
                    teacher_id: owner.owner_id,
                    events: 0,
                    by_type: empty_type_counts(),
                });
            stats.events += 1;
            *stats.by_type.entry(event.kind).or_default() += 1;
        }
        EventAdminSummary {
            counts: EventCounts::of(items, ctx.today),
            teachers: breakdown.keys().filter(|k| k.as_str() != UNKNOWN_OWNER).count(),
            teacher_breakdown: breakdown,
        }
    }

    fn member_view(items: &[Self], ctx: &ShapeContext<'_>) -> Self::Member {
        EventCounts::of(items, ctx.today)
    }
}

impl Filterable for Event {
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Name, SortKey::Date];

    fn category(&self) -> Option<&str> {
        Some(self.kind.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.subject.as_deref());
        fields.extend(self.location.as_deref());
        fields.extend(self.instructor_name.as_deref());
        fields
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }

    fn sort_value(&self, key: SortKey) -> Option<SortValue<'_>> {
        match key {
            SortKey::Name => Some(SortValue::Text(self.title.as_str())),
            SortKey::Date => Some(SortValue::Day(self.date)),
            _ => None,
        }
    }
}
