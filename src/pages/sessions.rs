use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::filter::{Filterable, SortKey, SortValue};
use crate::models::{Session, SessionStatus};
use crate::scope::{resolve_owner, EntityKind, Ownership, Scoped, UNKNOWN_OWNER};
use crate::shape::{mean, percent, Shape, ShapeContext};

impl Scoped for Session {
    const KIND: EntityKind = EntityKind::Sessions;

    fn ownership(&self) -> Ownership<'_> {
        Ownership::Instructor(Some(self.instructor_name.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCounts {
    pub total: usize,
    pub live: usize,
    pub scheduled: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub participants: u64,
}

impl SessionCounts {
    fn add(&mut self, session: &Session) {
        self.total += 1;
        match session.status {
            SessionStatus::Live => self.live += 1,
            SessionStatus::Scheduled => self.scheduled += 1,
            SessionStatus::Completed => self.completed += 1,
            SessionStatus::Cancelled => self.cancelled += 1,
        }
        self.participants += u64::from(session.participants_count);
    }

    fn of(sessions: &[Session]) -> Self {
        let mut counts = Self::default();
        sessions.iter().for_each(|s| counts.add(s));
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAdminSummary {
    #[serde(flatten)]
    pub counts: SessionCounts,
    /// Distinct instructors found in the directory.
    pub instructors: usize,
    pub instructor_breakdown: BTreeMap<String, SessionCounts>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMemberSummary {
    #[serde(flatten)]
    pub counts: SessionCounts,
    /// Mean of participants over capacity, per session.
    pub average_fill_rate: f64,
    pub recordings_available: usize,
}

impl Shape for Session {
    type Admin = SessionAdminSummary;
    type Member = SessionMemberSummary;

    fn admin_view(items: &[Self], ctx: &ShapeContext<'_>) -> Self::Admin {
        let mut breakdown: BTreeMap<String, SessionCounts> = BTreeMap::new();
        for session in items {
            let owner = resolve_owner(session.ownership(), ctx.directory);
            breakdown.entry(owner.owner_name).or_default().add(session);
        }
        SessionAdminSummary {
            counts: SessionCounts::of(items),
            instructors: breakdown.keys().filter(|k| k.as_str() != UNKNOWN_OWNER).count(),
            instructor_breakdown: breakdown,
        }
    }

    fn member_view(items: &[Self], _ctx: &ShapeContext<'_>) -> Self::Member {
        SessionMemberSummary {
            counts: SessionCounts::of(items),
            average_fill_rate: mean(
                items.iter().map(|s| {
                    percent(f64::from(s.participants_count), f64::from(s.max_participants))
                }),
            ),
            recordings_available: items
                .iter()
                .filter(|s| s.status == SessionStatus::Completed && s.recording_url.is_some())
                .count(),
        }
    }
}

impl Filterable for Session {
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Name, SortKey::Date, SortKey::Recent];

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn category(&self) -> Option<&str> {
        Some(self.subject.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.subject.as_str(),
            self.instructor_name.as_str(),
        ]
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.scheduled_time.date())
    }

    fn sort_value(&self, key: SortKey) -> Option<SortValue<'_>> {
        match key {
            SortKey::Name => Some(SortValue::Text(self.title.as_str())),
            SortKey::Date | SortKey::Recent => Some(SortValue::Time(Some(self.scheduled_time))),
            _ => None,
        }
    }
}
