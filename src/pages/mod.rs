//! Per-entity scoping, shaping and filtering rules.

mod classes;
mod events;
mod notes;
mod notifications;
mod sessions;
mod students;
mod users;

#[cfg(test)]
pub(crate) mod fixtures;

pub use classes::{ClassAdminSummary, ClassMemberSummary, ClassOwnerStats};
pub use events::{EventAdminSummary, EventCounts, EventOwnerStats};
pub use notes::NotesSummary;
pub use notifications::{InboxAdminSummary, InboxSummary};
pub use sessions::{SessionAdminSummary, SessionCounts, SessionMemberSummary};
pub use students::{RosterAdminSummary, RosterOwnerStats, RosterSummary};
pub use users::UserSummary;
