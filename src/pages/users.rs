use chrono::NaiveDate;
use serde::Serialize;

use crate::filter::{Filterable, SortKey, SortValue};
use crate::models::{AccountStatus, Role, User};
use crate::scope::{EntityKind, Ownership, Scoped};
use crate::shape::{Shape, ShapeContext};

impl Scoped for User {
    const KIND: EntityKind = EntityKind::Users;

    fn ownership(&self) -> Ownership<'_> {
        Ownership::Audience(Some(Role::Admin))
    }
}

/// Account totals. Only admins ever reach the user directory, so both sides
/// of the view carry the same figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub total: usize,
    pub admins: usize,
    pub teachers: usize,
    pub students: usize,
    pub active: usize,
    pub inactive: usize,
    pub pending: usize,
}

impl UserSummary {
    fn of(users: &[User]) -> Self {
        let with_role = |role: Role| users.iter().filter(|u| u.role == role).count();
        let with_status =
            |status: AccountStatus| users.iter().filter(|u| u.status == status).count();
        UserSummary {
            total: users.len(),
            admins: with_role(Role::Admin),
            teachers: with_role(Role::Teacher),
            students: with_role(Role::Student),
            active: with_status(AccountStatus::Active),
            inactive: with_status(AccountStatus::Inactive),
            pending: with_status(AccountStatus::Pending),
        }
    }
}

impl Shape for User {
    type Admin = UserSummary;
    type Member = UserSummary;

    fn admin_view(items: &[Self], _ctx: &ShapeContext<'_>) -> Self::Admin {
        UserSummary::of(items)
    }

    fn member_view(items: &[Self], _ctx: &ShapeContext<'_>) -> Self::Member {
        UserSummary::of(items)
    }
}

impl Filterable for User {
    const SORT_KEYS: &'static [SortKey] = &[
        SortKey::Name,
        SortKey::Role,
        SortKey::Recent,
        SortKey::Joined,
    ];

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn category(&self) -> Option<&str> {
        Some(self.role.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.role.as_str()]
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.joined_at)
    }

    fn sort_value(&self, key: SortKey) -> Option<SortValue<'_>> {
        match key {
            SortKey::Name => Some(SortValue::Text(self.name.as_str())),
            SortKey::Role => Some(SortValue::Text(self.role.as_str())),
            SortKey::Recent => Some(SortValue::Time(self.last_active_at)),
            SortKey::Joined => Some(SortValue::Day(self.joined_at)),
            _ => None,
        }
    }
}
