use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::filter::{Filterable, SortKey, SortValue};
use crate::models::{Notification, Priority, Role};
use crate::scope::{EntityKind, Ownership, Scoped};
use crate::shape::{Shape, ShapeContext};

impl Scoped for Notification {
    const KIND: EntityKind = EntityKind::Notifications;

    fn ownership(&self) -> Ownership<'_> {
        Ownership::Audience(self.audience_role)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxSummary {
    pub total: usize,
    pub unread: usize,
    pub high_priority: usize,
    pub by_type: BTreeMap<String, usize>,
}

impl InboxSummary {
    fn of(notifications: &[Notification]) -> Self {
        let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
        for notification in notifications {
            *by_type.entry(notification.kind.clone()).or_default() += 1;
        }
        InboxSummary {
            total: notifications.len(),
            unread: notifications.iter().filter(|n| !n.read).count(),
            high_priority: notifications.iter().filter(|n| n.priority == Priority::High).count(),
            by_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxAdminSummary {
    #[serde(flatten)]
    pub inbox: InboxSummary,
    /// Notifications addressed to admins only.
    pub admin_only: usize,
}

impl Shape for Notification {
    type Admin = InboxAdminSummary;
    type Member = InboxSummary;

    fn admin_view(items: &[Self], _ctx: &ShapeContext<'_>) -> Self::Admin {
        InboxAdminSummary {
            inbox: InboxSummary::of(items),
            admin_only: items.iter().filter(|n| n.audience_role == Some(Role::Admin)).count(),
        }
    }

    fn member_view(items: &[Self], _ctx: &ShapeContext<'_>) -> Self::Member {
        InboxSummary::of(items)
    }
}

impl Filterable for Notification {
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Name, SortKey::Recent, SortKey::Date];

    fn status(&self) -> Option<&str> {
        Some(if self.read { "read" } else { "unread" })
    }

    fn category(&self) -> Option<&str> {
        Some(self.kind.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.message.as_str()]
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.timestamp.date())
    }

    fn sort_value(&self, key: SortKey) -> Option<SortValue<'_>> {
        match key {
            SortKey::Name => Some(SortValue::Text(self.title.as_str())),
            SortKey::Recent | SortKey::Date => Some(SortValue::Time(Some(self.timestamp))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{apply_filters, FilterSet};
    use crate::identity::StaticDirectory;
    use crate::models::Principal;
    use crate::pages::fixtures::{notification, today};
    use crate::scope::resolve_scope;

    fn inbox() -> Vec<Notification> {
        vec![
            notification(1, "assignment", false, Priority::High, None),
            notification(2, "grade", true, Priority::Medium, None),
            notification(3, "message", false, Priority::Low, None),
            notification(4, "system", false, Priority::High, Some(Role::Admin)),
            notification(5, "security", false, Priority::High, Some(Role::Admin)),
            notification(6, "reminder", true, Priority::Low, Some(Role::Teacher)),
        ]
    }

    #[test]
    fn admin_addressed_notifications_stay_with_admins() {
        let directory = StaticDirectory::default();
        let ids = |principal: &Principal| -> Vec<i64> {
            resolve_scope(principal, &directory, &inbox()).iter().map(|n| n.id).collect()
        };
        assert_eq!(ids(&Principal::new("admin_1", Role::Admin)), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(ids(&Principal::new("teacher_1", Role::Teacher)), vec![1, 2, 3, 6]);
        assert_eq!(ids(&Principal::new("student_1", Role::Student)), vec![1, 2, 3]);
    }

    #[test]
    fn summaries_count_unread_and_priority() {
        let directory = StaticDirectory::default();
        let ctx = ShapeContext::new(&directory, today());
        let summary = Notification::admin_view(&inbox(), &ctx);
        assert_eq!(summary.inbox.total, 6);
        assert_eq!(summary.inbox.unread, 4);
        assert_eq!(summary.inbox.high_priority, 3);
        assert_eq!(summary.inbox.by_type["security"], 1);
        assert_eq!(summary.admin_only, 2);

        let member = Notification::member_view(&inbox()[..3], &ctx);
        assert_eq!((member.total, member.unread), (3, 2));
    }

    #[test]
    fn unread_filter_and_newest_first() {
        let (filters, invalid) = FilterSet::from_params([("status", "unread"), ("sort", "recent")]);
        assert!(invalid.is_empty());
        let ids: Vec<i64> = apply_filters(&inbox(), &filters).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 1]);
    }

    #[test]
    fn type_filter_matches_kind() {
        let (filters, _) = FilterSet::from_params([("type", "grade")]);
        let ids: Vec<i64> = apply_filters(&inbox(), &filters).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2]);
    }
}
