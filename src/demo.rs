//! Built-in demo data, used when no dataset file or database is configured
//! and as the source for `seed`.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::dataset::Dataset;
use crate::error::DatasetError;
use crate::models::{
    AccountStatus, Class, Event, EventType, Folder, Note, Notification, Priority, Role, Session,
    SessionStatus, Student, User,
};

pub const LECTURE_FOLDER: Uuid = Uuid::from_u128(0x6c65_6374_7572_6573_0000_0000_0000_0001);
pub const RESEARCH_FOLDER: Uuid = Uuid::from_u128(0x6c65_6374_7572_6573_0000_0000_0000_0002);
pub const PERSONAL_FOLDER: Uuid = Uuid::from_u128(0x6c65_6374_7572_6573_0000_0000_0000_0003);

fn day(month: u32, d: u32) -> Result<NaiveDate, DatasetError> {
    NaiveDate::from_ymd_opt(2025, month, d).ok_or(DatasetError::InvalidDate {
        month,
        day: d,
        hour: 0,
        minute: 0,
    })
}

fn at(month: u32, d: u32, hour: u32, minute: u32) -> Result<NaiveDateTime, DatasetError> {
    day(month, d)?
        .and_hms_opt(hour, minute, 0)
        .ok_or(DatasetError::InvalidDate {
            month,
            day: d,
            hour,
            minute,
        })
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn classes() -> Vec<Class> {
    let class = |id, name: &str, instructor: &str, students, grade, completion, engagement| Class {
        id,
        name: name.to_string(),
        instructor_name: instructor.to_string(),
        students_count: students,
        avg_grade: grade,
        completion_rate: completion,
        engagement_pct: engagement,
    };
    vec![
        class(
            1,
            "Advanced Mathematics",
            "Dr. Sarah Wilson",
            25,
            87.5,
            92.0,
            94.0,
        ),
        class(
            2,
            "Physics Fundamentals",
            "Prof. Michael Chen",
            18,
            82.3,
            85.0,
            87.0,
        ),
        class(
            3,
            "Chemistry Lab",
            "Dr. Emma Rodriguez",
            22,
            89.1,
            88.0,
            91.0,
        ),
        class(4, "Calculus II", "Dr. Sarah Wilson", 15, 91.2, 95.0, 96.0),
        class(
            5,
            "Biology Basics",
            "Prof. Jane Smith",
            28,
            78.4,
            76.0,
            72.0,
        ),
        class(
            6,
            "History of Science",
            "Prof. David Kim",
            20,
            84.0,
            81.0,
            83.0,
        ),
    ]
}

fn session(
    id: i64,
    title: &str,
    instructor: &str,
    subject: &str,
    status: SessionStatus,
    scheduled_time: NaiveDateTime,
    duration_min: u32,
) -> Session {
    Session {
        id,
        title: title.to_string(),
        instructor_name: instructor.to_string(),
        subject: subject.to_string(),
        scheduled_time,
        duration_min,
        status,
        participants_count: 0,
        max_participants: 0,
        recording_url: None,
    }
}

fn sessions() -> Result<Vec<Session>, DatasetError> {
    let mut sessions = vec![
        session(
            1,
            "Advanced Calculus - Derivatives",
            "Dr. Sarah Wilson",
            "Mathematics",
            SessionStatus::Live,
            at(6, 15, 14, 0)?,
            90,
        ),
        session(
            2,
            "Quantum Physics Introduction",
            "Prof. Michael Chen",
            "Physics",
            SessionStatus::Scheduled,
            at(6, 15, 16, 0)?,
            60,
        ),
        session(
            3,
            "Organic Chemistry Lab",
            "Dr. Emma Rodriguez",
            "Chemistry",
            SessionStatus::Scheduled,
            at(6, 16, 10, 0)?,
            120,
        ),
        session(
            4,
            "World History Discussion",
            "Prof. David Kim",
            "History",
            SessionStatus::Completed,
            at(6, 14, 13, 0)?,
            60,
        ),
        session(
            5,
            "Linear Algebra Workshop",
            "Prof. Jane Smith",
            "Mathematics",
            SessionStatus::Scheduled,
            at(6, 17, 15, 0)?,
            75,
        ),
        session(
            6,
            "Creative Writing Workshop",
            "Dr. Alex Thompson",
            "English",
            SessionStatus::Cancelled,
            at(6, 16, 11, 0)?,
            60,
        ),
    ];
    let seats = [(24, 30), (18, 25), (15, 20), (28, 30), (22, 25), (0, 15)];
    for (session, (taken, capacity)) in sessions.iter_mut().zip(seats) {
        session.participants_count = taken;
        session.max_participants = capacity;
    }
    sessions[3].recording_url = Some("https://recordings.lms.example/sessions/4".to_string());
    Ok(sessions)
}

fn student(
    id: i64,
    name: &str,
    status: AccountStatus,
    grade: &str,
    attendance_pct: f64,
    subjects: &[&str],
    teacher: Option<&str>,
) -> Student {
    Student {
        id,
        name: name.to_string(),
        email: format!("{}@email.com", name.to_lowercase().replace(' ', ".")),
        status,
        grade: grade.to_string(),
        attendance_pct,
        assignments_completed: 0,
        assignments_total: 20,
        subjects: strings(subjects),
        teacher_id: teacher.map(str::to_string),
        last_active_at: None,
    }
}

fn students() -> Result<Vec<Student>, DatasetError> {
    use AccountStatus::{Active, Inactive, Pending};

    let mut roster = vec![
        student(
            1,
            "Alex Johnson",
            Active,
            "A",
            95.0,
            &["Advanced Mathematics", "Calculus II"],
            Some("teacher_1"),
        ),
        student(
            2,
            "Maya Patel",
            Active,
            "B+",
            88.0,
            &["Advanced Mathematics"],
            Some("teacher_1"),
        ),
        student(
            3,
            "Jordan Smith",
            Active,
            "B",
            82.0,
            &["Physics Fundamentals"],
            Some("teacher_2"),
        ),
        student(
            4,
            "Emily Davis",
            Active,
            "A",
            97.0,
            &["Chemistry Lab"],
            Some("teacher_3"),
        ),
        student(
            5,
            "Chris Lee",
            Active,
            "C",
            71.0,
            &["Physics Fundamentals"],
            Some("teacher_2"),
        ),
        student(
            6,
            "Lisa Anderson",
            Pending,
            "-",
            0.0,
            &["Calculus II"],
            Some("teacher_1"),
        ),
        student(
            7,
            "Sophie Turner",
            Active,
            "A+",
            99.0,
            &["Biology Basics"],
            Some("teacher_4"),
        ),
        student(
            8,
            "Ryan Foster",
            Inactive,
            "C",
            76.0,
            &["History of Science"],
            None,
        ),
    ];
    let completed = [19, 17, 15, 20, 11, 0, 20, 12];
    for (student, done) in roster.iter_mut().zip(completed) {
        student.assignments_completed = done;
    }
    let seen = [
        at(6, 15, 9, 30)?,
        at(6, 14, 18, 5)?,
        at(6, 13, 11, 0)?,
        at(6, 15, 8, 45)?,
        at(6, 10, 16, 20)?,
    ];
    for (student, last) in roster.iter_mut().zip(seen) {
        student.last_active_at = Some(last);
    }
    roster[5].assignments_total = 0;
    roster[7].last_active_at = Some(at(5, 28, 14, 0)?);
    Ok(roster)
}

fn notification(
    id: i64,
    kind: &str,
    title: &str,
    message: &str,
    timestamp: NaiveDateTime,
    read: bool,
    priority: Priority,
) -> Notification {
    Notification {
        id,
        kind: kind.to_string(),
        title: title.to_string(),
        message: message.to_string(),
        timestamp,
        read,
        priority,
        audience_role: None,
    }
}

fn notifications() -> Result<Vec<Notification>, DatasetError> {
    let mut inbox = vec![
        notification(
            1,
            "assignment",
            "Assignment Due Tomorrow",
            "Calculus Problem Set 4 is due tomorrow at 11:59 PM.",
            at(6, 15, 10, 30)?,
            false,
            Priority::High,
        ),
        notification(
            2,
            "grade",
            "Grade Posted",
            "Your Physics lab report has been graded.",
            at(6, 15, 9, 15)?,
            true,
            Priority::Medium,
        ),
        notification(
            3,
            "message",
            "New Message",
            "Dr. Sarah Wilson replied to your question.",
            at(6, 14, 16, 45)?,
            false,
            Priority::Medium,
        ),
        notification(
            4,
            "system",
            "System Maintenance",
            "The platform will be unavailable Sunday 2-4 AM.",
            at(6, 14, 12, 0)?,
            true,
            Priority::Low,
        ),
        notification(
            5,
            "reminder",
            "Live Session Starting",
            "Advanced Calculus starts in 15 minutes.",
            at(6, 15, 13, 45)?,
            false,
            Priority::High,
        ),
        notification(
            6,
            "system",
            "New User Registrations",
            "12 new accounts are waiting for approval.",
            at(6, 15, 8, 0)?,
            false,
            Priority::Medium,
        ),
        notification(
            7,
            "security",
            "Failed Login Attempts",
            "Multiple failed login attempts detected.",
            at(6, 15, 8, 30)?,
            false,
            Priority::High,
        ),
        notification(
            8,
            "system",
            "Storage Usage",
            "Recording storage is at 85% of quota.",
            at(6, 13, 7, 0)?,
            true,
            Priority::Low,
        ),
    ];
    // The last three go to admins only.
    for item in &mut inbox[5..] {
        item.audience_role = Some(Role::Admin);
    }
    Ok(inbox)
}

fn folders() -> Vec<Folder> {
    let folder = |id, name: &str, color: &str| Folder {
        id,
        name: name.to_string(),
        color: color.to_string(),
    };
    vec![
        folder(LECTURE_FOLDER, "Lecture Notes", "blue"),
        folder(RESEARCH_FOLDER, "Research", "green"),
        folder(PERSONAL_FOLDER, "Personal", "purple"),
    ]
}

/// `stamps` is `(created_at, updated_at)`.
fn note(
    id: i64,
    title: &str,
    content: &str,
    folder_id: Option<Uuid>,
    tags: &[&str],
    category: &str,
    stamps: (NaiveDateTime, NaiveDateTime),
) -> Note {
    Note {
        id,
        title: title.to_string(),
        content: content.to_string(),
        folder_id,
        tags: strings(tags),
        is_favorite: false,
        category: category.to_string(),
        created_at: stamps.0,
        updated_at: stamps.1,
    }
}

fn notes() -> Result<Vec<Note>, DatasetError> {
    let mut notes = vec![
        note(
            1,
            "Calculus Derivatives Summary",
            "Chain rule, product rule and quotient rule with worked examples.",
            Some(LECTURE_FOLDER),
            &["calculus", "derivatives"],
            "lecture",
            (at(6, 10, 9, 0)?, at(6, 14, 17, 20)?),
        ),
        note(
            2,
            "Quantum Mechanics Basics",
            "Wave functions, superposition and measurement.",
            Some(RESEARCH_FOLDER),
            &["physics", "quantum"],
            "research",
            (at(6, 8, 14, 0)?, at(6, 12, 10, 5)?),
        ),
        note(
            3,
            "Office Hours Agenda",
            "Review midterm questions and project proposals.",
            None,
            &["meeting"],
            "meeting",
            (at(6, 13, 8, 0)?, at(6, 13, 8, 40)?),
        ),
        note(
            4,
            "Reading List",
            "Feynman Lectures vol. 1, Calculus Made Easy.",
            Some(PERSONAL_FOLDER),
            &["books"],
            "personal",
            (at(6, 1, 20, 0)?, at(6, 15, 7, 10)?),
        ),
        note(
            5,
            "Lab Safety Checklist",
            "Goggles, gloves, fume hood check before every session.",
            None,
            &["chemistry", "safety"],
            "lab",
            (at(6, 5, 11, 0)?, at(6, 5, 11, 0)?),
        ),
    ];
    notes[0].is_favorite = true;
    notes[3].is_favorite = true;
    Ok(notes)
}

fn event(
    id: i64,
    title: &str,
    date: NaiveDate,
    kind: EventType,
    instructor: Option<&str>,
    subject: Option<&str>,
    location: Option<&str>,
) -> Event {
    Event {
        id,
        title: title.to_string(),
        date,
        kind,
        instructor_name: instructor.map(str::to_string),
        subject: subject.map(str::to_string),
        location: location.map(str::to_string),
    }
}

fn events() -> Result<Vec<Event>, DatasetError> {
    Ok(vec![
        event(
            1,
            "Advanced Calculus Lecture",
            day(6, 15)?,
            EventType::Class,
            Some("Dr. Sarah Wilson"),
            Some("Mathematics"),
            Some("Room 201"),
        ),
        event(
            2,
            "Physics Lab Report Due",
            day(6, 16)?,
            EventType::Assignment,
            Some("Prof. Michael Chen"),
            Some("Physics"),
            None,
        ),
        event(
            3,
            "Chemistry Live Session",
            day(6, 17)?,
            EventType::Session,
            Some("Dr. Emma Rodriguez"),
            Some("Chemistry"),
            Some("Online"),
        ),
        event(
            4,
            "Faculty Meeting",
            day(6, 18)?,
            EventType::Meeting,
            None,
            None,
            Some("Conference Room A"),
        ),
        event(
            5,
            "Biology Midterm",
            day(6, 20)?,
            EventType::Exam,
            Some("Prof. Jane Smith"),
            Some("Biology"),
            Some("Hall B"),
        ),
        event(
            6,
            "Calculus Problem Set",
            day(6, 22)?,
            EventType::Assignment,
            Some("Dr. Sarah Wilson"),
            Some("Mathematics"),
            None,
        ),
        event(
            7,
            "History Seminar",
            day(6, 25)?,
            EventType::Class,
            Some("Prof. David Kim"),
            Some("History"),
            Some("Room 105"),
        ),
    ])
}

fn users() -> Result<Vec<User>, DatasetError> {
    use AccountStatus::{Active, Inactive, Pending};

    let user = |id: &str, name: &str, role, status, joined, last| User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@lms.example", name.to_lowercase().replace(['.', ' '], "")),
        role,
        status,
        joined_at: joined,
        last_active_at: last,
    };
    Ok(vec![
        user(
            "admin_1",
            "Morgan Lee",
            Role::Admin,
            Active,
            day(1, 6)?,
            Some(at(6, 15, 8, 0)?),
        ),
        user(
            "teacher_1",
            "Dr. Sarah Wilson",
            Role::Teacher,
            Active,
            day(1, 20)?,
            Some(at(6, 15, 13, 50)?),
        ),
        user(
            "teacher_2",
            "Prof. Michael Chen",
            Role::Teacher,
            Active,
            day(2, 3)?,
            Some(at(6, 14, 17, 0)?),
        ),
        user(
            "teacher_3",
            "Dr. Emma Rodriguez",
            Role::Teacher,
            Active,
            day(2, 17)?,
            Some(at(6, 15, 9, 10)?),
        ),
        user(
            "teacher_4",
            "Prof. Jane Smith",
            Role::Teacher,
            Active,
            day(3, 2)?,
            None,
        ),
        user(
            "student_1",
            "Alex Johnson",
            Role::Student,
            Active,
            day(3, 15)?,
            Some(at(6, 15, 9, 30)?),
        ),
        user(
            "student_2",
            "Maya Patel",
            Role::Student,
            Active,
            day(3, 18)?,
            Some(at(6, 14, 18, 5)?),
        ),
        user(
            "student_6",
            "Lisa Anderson",
            Role::Student,
            Pending,
            day(6, 12)?,
            None,
        ),
        user(
            "student_8",
            "Ryan Foster",
            Role::Student,
            Inactive,
            day(2, 25)?,
            Some(at(5, 28, 14, 0)?),
        ),
    ])
}

impl Dataset {
    pub fn demo() -> Result<Self, DatasetError> {
        Ok(Dataset {
            classes: classes(),
            sessions: sessions()?,
            students: students()?,
            notifications: notifications()?,
            notes: notes()?,
            folders: folders(),
            events: events()?,
            users: users()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticDirectory;
    use crate::scope::EntityKind;

    #[test]
    fn demo_only_flags_unlisted_instructors() {
        let violations = Dataset::demo().unwrap().validate(&StaticDirectory::default());
        assert!(violations
            .iter()
            .all(|v| v.problem.contains("not in the directory")));
        let kinds: Vec<(EntityKind, &str)> =
            violations.iter().map(|v| (v.kind, v.id.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (EntityKind::Classes, "6"),
                (EntityKind::Sessions, "4"),
                (EntityKind::Sessions, "6"),
                (EntityKind::Events, "7"),
            ]
        );
    }

    #[test]
    fn demo_roster_timestamps_line_up() {
        let students = Dataset::demo().unwrap().students;
        assert_eq!(students[0].last_active_at, Some(at(6, 15, 9, 30).unwrap()));
        assert_eq!(students[0].assignments_completed, 19);
        assert!(students[5].last_active_at.is_none());
        assert_eq!(students[5].assignments_total, 0);
        assert!(students[7].teacher_id.is_none());
    }

    #[test]
    fn demo_rows_carry_their_post_build_fields() {
        let dataset = Dataset::demo().unwrap();
        assert_eq!(dataset.sessions[0].participants_count, 24);
        assert_eq!(dataset.sessions[5].max_participants, 15);
        assert!(dataset.sessions[3].recording_url.is_some());
        let admin_only: Vec<i64> = dataset
            .notifications
            .iter()
            .filter(|n| n.audience_role == Some(Role::Admin))
            .map(|n| n.id)
            .collect();
        assert_eq!(admin_only, vec![6, 7, 8]);
        let favorites: Vec<i64> =
            dataset.notes.iter().filter(|n| n.is_favorite).map(|n| n.id).collect();
        assert_eq!(favorites, vec![1, 4]);
    }

    #[test]
    fn impossible_dates_are_errors() {
        assert!(matches!(
            at(2, 30, 9, 0),
            Err(DatasetError::InvalidDate { month: 2, day: 30, .. })
        ));
        assert!(matches!(
            at(6, 15, 25, 0),
            Err(DatasetError::InvalidDate { hour: 25, .. })
        ));
    }
}
