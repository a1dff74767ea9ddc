use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::DatasetError;
use crate::identity::IdentityDirectory;
use crate::models::{Class, Event, Folder, Note, Notification, Session, Student, User};
use crate::scope::EntityKind;

/// Every collection the pages draw from. Missing collections load as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub classes: Vec<Class>,
    pub sessions: Vec<Session>,
    pub students: Vec<Student>,
    pub notifications: Vec<Notification>,
    pub notes: Vec<Note>,
    pub folders: Vec<Folder>,
    pub events: Vec<Event>,
    pub users: Vec<User>,
}

pub fn load_json(path: &Path) -> Result<Dataset, DatasetError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset: Dataset = serde_json::from_str(&raw).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        classes = dataset.classes.len(),
        sessions = dataset.sessions.len(),
        students = dataset.students.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// One broken invariant in a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: EntityKind,
    pub id: String,
    pub problem: String,
}

impl Violation {
    fn new(kind: EntityKind, id: impl ToString, problem: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.to_string(),
            problem: problem.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.id, self.problem)
    }
}

fn check_pct(out: &mut Vec<Violation>, kind: EntityKind, id: i64, field: &str, value: f64) {
    if !(0.0..=100.0).contains(&value) {
        out.push(Violation::new(kind, id, format!("{field} {value} is outside 0-100")));
    }
}

impl Dataset {
    /// Lists invariant violations. An empty list means the dataset is clean.
    pub fn validate(&self, directory: &dyn IdentityDirectory) -> Vec<Violation> {
        let mut out = Vec::new();
        let known_instructor = |name: &str| directory.teacher_id(name).is_some();

        for class in &self.classes {
            let rates = [
                ("avgGrade", class.avg_grade),
                ("completionRate", class.completion_rate),
                ("engagementPct", class.engagement_pct),
            ];
            for (field, value) in rates {
                check_pct(&mut out, EntityKind::Classes, class.id, field, value);
            }
            if !known_instructor(&class.instructor_name) {
                out.push(Violation::new(
                    EntityKind::Classes,
                    class.id,
                    format!("instructor `{}` is not in the directory", class.instructor_name),
                ));
            }
        }

        for session in &self.sessions {
            if session.participants_count > session.max_participants {
                out.push(Violation::new(
                    EntityKind::Sessions,
                    session.id,
                    format!(
                        "{} participants exceed capacity {}",
                        session.participants_count, session.max_participants
                    ),
                ));
            }
            if !known_instructor(&session.instructor_name) {
                out.push(Violation::new(
                    EntityKind::Sessions,
                    session.id,
                    format!("instructor `{}` is not in the directory", session.instructor_name),
                ));
            }
        }

        for student in &self.students {
            let attendance = student.attendance_pct;
            check_pct(&mut out, EntityKind::Students, student.id, "attendancePct", attendance);
            if student.assignments_completed > student.assignments_total {
                out.push(Violation::new(
                    EntityKind::Students,
                    student.id,
                    format!(
                        "{} assignments completed of {}",
                        student.assignments_completed, student.assignments_total
                    ),
                ));
            }
            if let Some(teacher_id) = student.teacher_id.as_deref() {
                if directory.display_name(teacher_id).is_none() {
                    out.push(Violation::new(
                        EntityKind::Students,
                        student.id,
                        format!("teacher `{teacher_id}` is not in the directory"),
                    ));
                }
            }
        }

        for event in &self.events {
            if let Some(name) = event.instructor_name.as_deref() {
                if !known_instructor(name) {
                    out.push(Violation::new(
                        EntityKind::Events,
                        event.id,
                        format!("instructor `{name}` is not in the directory"),
                    ));
                }
            }
        }

        let folders: BTreeSet<Uuid> = self.folders.iter().map(|f| f.id).collect();
        for note in &self.notes {
            if let Some(folder_id) = note.folder_id {
                if !folders.contains(&folder_id) {
                    out.push(Violation::new(
                        EntityKind::Notes,
                        note.id,
                        format!("folder {folder_id} does not exist"),
                    ));
                }
            }
        }

        for violation in &out {
            warn!(%violation, "dataset violation");
        }
        out
    }
}
