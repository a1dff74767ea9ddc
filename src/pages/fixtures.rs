//! Row builders shared by the page tests.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::models::{
    AccountStatus, Class, Event, EventType, Note, Notification, Priority, Role, Session,
    SessionStatus, Student,
};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

pub fn at(d: u32, hour: u32) -> NaiveDateTime {
    day(d).and_hms_opt(hour, 0, 0).unwrap()
}

pub fn session(
    id: i64,
    instructor: &str,
    status: SessionStatus,
    participants: u32,
    capacity: u32,
) -> Session {
    Session {
        id,
        title: format!("Session {id}"),
        instructor_name: instructor.to_string(),
        subject: "Mathematics".to_string(),
        scheduled_time: at(10 + id as u32, 14),
        duration_min: 60,
        status,
        participants_count: participants,
        max_participants: capacity,
        recording_url: None,
    }
}

pub fn class(id: i64, name: &str, instructor: &str, students: u32, engagement: f64) -> Class {
    Class {
        id,
        name: name.to_string(),
        instructor_name: instructor.to_string(),
        students_count: students,
        avg_grade: 85.0,
        completion_rate: 90.0,
        engagement_pct: engagement,
    }
}

pub fn student(
    id: i64,
    name: &str,
    grade: &str,
    attendance: f64,
    teacher: Option<&str>,
) -> Student {
    Student {
        id,
        name: name.to_string(),
        email: format!("{}@email.com", name.to_lowercase().replace(' ', ".")),
        status: AccountStatus::Active,
        grade: grade.to_string(),
        attendance_pct: attendance,
        assignments_completed: 18,
        assignments_total: 20,
        subjects: vec!["Advanced Mathematics".to_string()],
        teacher_id: teacher.map(str::to_string),
        last_active_at: None,
    }
}

pub fn event(id: i64, date: NaiveDate, kind: EventType, instructor: Option<&str>) -> Event {
    Event {
        id,
        title: format!("Event {id}"),
        date,
        kind,
        instructor_name: instructor.map(str::to_string),
        subject: None,
        location: None,
    }
}

pub fn notification(
    id: i64,
    kind: &str,
    read: bool,
    priority: Priority,
    audience: Option<Role>,
) -> Notification {
    Notification {
        id,
        kind: kind.to_string(),
        title: format!("Notification {id}"),
        message: "Details inside.".to_string(),
        timestamp: at(15, id as u32 % 24),
        read,
        priority,
        audience_role: audience,
    }
}

pub fn note(id: i64, folder_id: Option<Uuid>, favorite: bool) -> Note {
    Note {
        id,
        title: format!("Note {id}"),
        content: "Lecture notes.".to_string(),
        folder_id,
        tags: vec!["lecture".to_string()],
        is_favorite: favorite,
        category: "lecture".to_string(),
        created_at: at(1, 9),
        updated_at: at(id as u32, 9),
    }
}
