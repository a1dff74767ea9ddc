//! Scope resolution: which entities a principal may see.
//!
//! Access is decided per entity kind before any row is touched; a denied
//! kind never reaches scoping. Within an allowed kind the rules are:
//!
//! - admins see everything,
//! - teachers see what they own, matched exactly on instructor name or
//!   teacher id,
//! - students see broadcast material in full,
//! - notifications follow their audience, notes are always the caller's own.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{AccessDenied, ParseEnumError};
use crate::identity::IdentityDirectory;
use crate::models::{Principal, Role};

/// Owner bucket for rows whose owner is missing or not in the directory.
pub const UNKNOWN_OWNER: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Classes,
    Analytics,
    Sessions,
    Events,
    Students,
    Users,
    Notifications,
    Notes,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Classes,
        EntityKind::Analytics,
        EntityKind::Sessions,
        EntityKind::Events,
        EntityKind::Students,
        EntityKind::Users,
        EntityKind::Notifications,
        EntityKind::Notes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Classes => "classes",
            EntityKind::Analytics => "analytics",
            EntityKind::Sessions => "sessions",
            EntityKind::Events => "events",
            EntityKind::Students => "students",
            EntityKind::Users => "users",
            EntityKind::Notifications => "notifications",
            EntityKind::Notes => "notes",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| ParseEnumError::new("page", s))
    }
}

/// Whether `role` may open pages of `kind` at all.
pub fn check_access(role: Role, kind: EntityKind) -> Result<(), AccessDenied> {
    let allowed = match (role, kind) {
        (Role::Admin, _) => true,
        (_, EntityKind::Users) => false,
        (Role::Student, EntityKind::Students | EntityKind::Analytics) => false,
        _ => true,
    };
    if allowed {
        Ok(())
    } else {
        Err(AccessDenied { role, kind })
    }
}

/// How a row ties back to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership<'a> {
    /// Owned by the instructor with this display name.
    Instructor(Option<&'a str>),
    /// Owned by the teacher with this principal id.
    Teacher(Option<&'a str>),
    /// Addressed to one role, or to everyone when `None`.
    Audience(Option<Role>),
    /// Part of the caller's own workspace.
    Personal,
}

pub trait Scoped {
    const KIND: EntityKind;

    fn ownership(&self) -> Ownership<'_>;
}

/// Returns the rows of `items` the principal may see, in input order.
///
/// A kind the role is denied yields an empty list here; callers that need to
/// tell denial apart from emptiness go through [`check_access`] first.
pub fn resolve_scope<T>(
    principal: &Principal,
    directory: &dyn IdentityDirectory,
    items: &[T],
) -> Vec<T>
where
    T: Scoped + Clone,
{
    if check_access(principal.role, T::KIND).is_err() {
        return Vec::new();
    }
    if principal.role == Role::Admin {
        return items.to_vec();
    }

    let teacher_name = match principal.role {
        Role::Teacher => directory.display_name(&principal.id),
        _ => None,
    };
    let scoped: Vec<T> = items
        .iter()
        .filter(|item| visible_to(principal, teacher_name, item.ownership()))
        .cloned()
        .collect();

    tracing::debug!(
        principal = %principal.id,
        role = %principal.role,
        kind = %T::KIND,
        total = items.len(),
        visible = scoped.len(),
        "resolved scope"
    );
    scoped
}

fn visible_to(principal: &Principal, teacher_name: Option<&str>, ownership: Ownership<'_>) -> bool {
    match (principal.role, ownership) {
        (_, Ownership::Personal) => true,
        (Role::Admin, _) => true,
        (role, Ownership::Audience(audience)) => audience.map_or(true, |target| target == role),
        (Role::Teacher, Ownership::Instructor(name)) => name.is_some() && name == teacher_name,
        (Role::Teacher, Ownership::Teacher(id)) => id == Some(principal.id.as_str()),
        (Role::Student, Ownership::Instructor(_) | Ownership::Teacher(_)) => true,
    }
}

/// The directory-resolved owner of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRef {
    pub owner_id: Option<String>,
    pub owner_name: String,
}

impl OwnerRef {
    fn unknown() -> Self {
        Self {
            owner_id: None,
            owner_name: UNKNOWN_OWNER.to_string(),
        }
    }
}

/// Resolves the owner through the directory; anything unmatched is
/// [`UNKNOWN_OWNER`].
pub fn resolve_owner(ownership: Ownership<'_>, directory: &dyn IdentityDirectory) -> OwnerRef {
    match ownership {
        Ownership::Instructor(Some(name)) => directory
            .teacher_id(name)
            .map(|id| OwnerRef {
                owner_id: Some(id.to_string()),
                owner_name: name.to_string(),
            })
            .unwrap_or_else(OwnerRef::unknown),
        Ownership::Teacher(Some(id)) => directory
            .display_name(id)
            .map(|name| OwnerRef {
                owner_id: Some(id.to_string()),
                owner_name: name.to_string(),
            })
            .unwrap_or_else(OwnerRef::unknown),
        _ => OwnerRef::unknown(),
    }
}

/// A row serialized with its resolved owner alongside its own fields.
#[derive(Debug, Serialize)]
pub struct Owned<'a, T> {
    #[serde(flatten)]
    pub owner: &'a OwnerRef,
    #[serde(flatten)]
    pub item: &'a T,
}

/// Resolved owners for `items`, in order. Kinds without an owner (notes,
/// notifications, users) get an empty list.
pub fn annotate_owners<T: Scoped>(directory: &dyn IdentityDirectory, items: &[T]) -> Vec<OwnerRef> {
    items
        .iter()
        .map_while(|item| match item.ownership() {
            ownership @ (Ownership::Instructor(_) | Ownership::Teacher(_)) => {
                Some(resolve_owner(ownership, directory))
            }
            Ownership::Audience(_) | Ownership::Personal => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticDirectory;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        instructor: Option<&'static str>,
    }

    impl Scoped for Row {
        const KIND: EntityKind = EntityKind::Sessions;

        fn ownership(&self) -> Ownership<'_> {
            Ownership::Instructor(self.instructor)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct RosterRow {
        teacher: Option<&'static str>,
    }

    impl Scoped for RosterRow {
        const KIND: EntityKind = EntityKind::Students;

        fn ownership(&self) -> Ownership<'_> {
            Ownership::Teacher(self.teacher)
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, instructor: Some("Dr. Sarah Wilson") },
            Row { id: 2, instructor: Some("Prof. Michael Chen") },
            Row { id: 3, instructor: Some("Dr. Sarah Wilson") },
            Row { id: 4, instructor: None },
            Row { id: 5, instructor: Some("Dr. Sarah Wilson Jr.") },
        ]
    }

    #[test]
    fn admin_scope_is_identity() {
        let directory = StaticDirectory::default();
        let admin = Principal::new("admin_1", Role::Admin);
        assert_eq!(resolve_scope(&admin, &directory, &rows()), rows());
    }

    #[test]
    fn teacher_scope_is_exact_instructor_match() {
        let directory = StaticDirectory::default();
        let teacher = Principal::new("teacher_1", Role::Teacher);
        let scoped = resolve_scope(&teacher, &directory, &rows());
        let ids: Vec<u32> = scoped.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let excluded: Vec<Row> = rows().into_iter().filter(|r| !scoped.contains(r)).collect();
        assert!(excluded.iter().all(|r| r.instructor != Some("Dr. Sarah Wilson")));
    }

    #[test]
    fn unknown_teacher_gets_empty_scope() {
        let directory = StaticDirectory::default();
        let teacher = Principal::new("teacher_42", Role::Teacher);
        assert!(resolve_scope(&teacher, &directory, &rows()).is_empty());
        assert!(check_access(Role::Teacher, EntityKind::Sessions).is_ok());
    }

    #[test]
    fn students_see_broadcast_rows_in_full() {
        let directory = StaticDirectory::default();
        let student = Principal::new("student_1", Role::Student);
        assert_eq!(resolve_scope(&student, &directory, &rows()), rows());
    }

    #[test]
    fn teacher_roster_matches_on_teacher_id() {
        let directory = StaticDirectory::default();
        let teacher = Principal::new("teacher_2", Role::Teacher);
        let roster = vec![
            RosterRow { teacher: Some("teacher_1") },
            RosterRow { teacher: Some("teacher_2") },
            RosterRow { teacher: None },
        ];
        let scoped = resolve_scope(&teacher, &directory, &roster);
        assert_eq!(scoped, vec![RosterRow { teacher: Some("teacher_2") }]);
    }

    #[test]
    fn student_roster_scope_is_empty_and_access_is_denied() {
        let directory = StaticDirectory::default();
        let student = Principal::new("student_1", Role::Student);
        let roster = vec![RosterRow { teacher: Some("teacher_1") }];
        assert!(resolve_scope(&student, &directory, &roster).is_empty());
        assert_eq!(
            check_access(Role::Student, EntityKind::Students),
            Err(AccessDenied {
                role: Role::Student,
                kind: EntityKind::Students
            })
        );
    }

    #[test]
    fn access_table_matches_page_rules() {
        for kind in EntityKind::ALL {
            assert!(check_access(Role::Admin, kind).is_ok(), "admin {kind}");
        }
        assert!(check_access(Role::Teacher, EntityKind::Users).is_err());
        assert!(check_access(Role::Student, EntityKind::Users).is_err());
        assert!(check_access(Role::Student, EntityKind::Analytics).is_err());
        assert!(check_access(Role::Teacher, EntityKind::Analytics).is_ok());
        assert!(check_access(Role::Student, EntityKind::Events).is_ok());
        assert!(check_access(Role::Student, EntityKind::Notes).is_ok());
    }

    #[test]
    fn owners_resolve_or_fall_into_unknown() {
        let directory = StaticDirectory::default();
        let owners = annotate_owners(&directory, &rows());
        assert_eq!(owners.len(), 5);
        assert_eq!(owners[0].owner_id.as_deref(), Some("teacher_1"));
        assert_eq!(owners[1].owner_name, "Prof. Michael Chen");
        assert_eq!(owners[3].owner_name, UNKNOWN_OWNER);
        assert_eq!(owners[4].owner_name, UNKNOWN_OWNER);
        assert!(owners[4].owner_id.is_none());

        let owned = serde_json::to_value(Owned {
            owner: &owners[0],
            item: &serde_json::json!({ "id": 1 }),
        })
        .unwrap();
        assert_eq!(
            owned,
            serde_json::json!({
                "id": 1,
                "ownerId": "teacher_1",
                "ownerName": "Dr. Sarah Wilson"
            })
        );
    }

    #[test]
    fn audience_rows_have_no_owner() {
        #[derive(Clone)]
        struct Broadcast;

        impl Scoped for Broadcast {
            const KIND: EntityKind = EntityKind::Notifications;

            fn ownership(&self) -> Ownership<'_> {
                Ownership::Audience(None)
            }
        }

        let directory = StaticDirectory::default();
        assert!(annotate_owners(&directory, &[Broadcast, Broadcast]).is_empty());
    }

    #[test]
    fn page_names_parse() {
        assert_eq!("Students".parse::<EntityKind>().unwrap(), EntityKind::Students);
        assert!("grades".parse::<EntityKind>().is_err());
    }
}
