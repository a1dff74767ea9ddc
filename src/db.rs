use std::path::Path;

use anyhow::Context;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::info;

use crate::dataset::Dataset;
use crate::models::{
    AccountStatus, Class, Event, EventType, Folder, Note, Notification, Priority, Role, Session,
    SessionStatus, Student, User,
};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn count(row: &PgRow, column: &str) -> anyhow::Result<u32> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value).with_context(|| format!("{column} is out of range: {value}"))
}

fn parsed<T>(row: &PgRow, column: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    Ok(raw.parse::<T>()?)
}

/// Upserts every row of `dataset`, keyed on id.
pub async fn seed(pool: &PgPool, dataset: &Dataset) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    for class in &dataset.classes {
        sqlx::query(
            r#"
            INSERT INTO lms_scope.classes
            (id, name, instructor_name, students_count, avg_grade, completion_rate, engagement_pct)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, instructor_name = EXCLUDED.instructor_name,
                students_count = EXCLUDED.students_count, avg_grade = EXCLUDED.avg_grade,
                completion_rate = EXCLUDED.completion_rate, engagement_pct = EXCLUDED.engagement_pct
            "#,
        )
        .bind(class.id)
        .bind(&class.name)
        .bind(&class.instructor_name)
        .bind(i64::from(class.students_count))
        .bind(class.avg_grade)
        .bind(class.completion_rate)
        .bind(class.engagement_pct)
        .execute(&mut *tx)
        .await?;
    }

    for session in &dataset.sessions {
        sqlx::query(
            r#"
            INSERT INTO lms_scope.live_sessions
            (id, title, instructor_name, subject, scheduled_time, duration_min, status,
             participants_count, max_participants, recording_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title, instructor_name = EXCLUDED.instructor_name,
                subject = EXCLUDED.subject, scheduled_time = EXCLUDED.scheduled_time,
                duration_min = EXCLUDED.duration_min, status = EXCLUDED.status,
                participants_count = EXCLUDED.participants_count,
                max_participants = EXCLUDED.max_participants, recording_url = EXCLUDED.recording_url
            "#,
        )
        .bind(session.id)
        .bind(&session.title)
        .bind(&session.instructor_name)
        .bind(&session.subject)
        .bind(session.scheduled_time)
        .bind(i64::from(session.duration_min))
        .bind(session.status.as_str())
        .bind(i64::from(session.participants_count))
        .bind(i64::from(session.max_participants))
        .bind(&session.recording_url)
        .execute(&mut *tx)
        .await?;
    }

    for student in &dataset.students {
        upsert_student(&mut tx, student).await?;
    }
    // Seeded ids are explicit; keep the sequence ahead of them for imports.
    sqlx::query(
        "SELECT setval(pg_get_serial_sequence('lms_scope.students', 'id'), \
         GREATEST((SELECT MAX(id) FROM lms_scope.students), 1))",
    )
    .execute(&mut *tx)
    .await?;

    for notification in &dataset.notifications {
        sqlx::query(
            r#"
            INSERT INTO lms_scope.notifications
            (id, kind, title, message, sent_at, read, priority, audience_role)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE
            SET kind = EXCLUDED.kind, title = EXCLUDED.title, message = EXCLUDED.message,
                sent_at = EXCLUDED.sent_at, read = EXCLUDED.read, priority = EXCLUDED.priority,
                audience_role = EXCLUDED.audience_role
            "#,
        )
        .bind(notification.id)
        .bind(&notification.kind)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.timestamp)
        .bind(notification.read)
        .bind(notification.priority.as_str())
        .bind(notification.audience_role.map(Role::as_str))
        .execute(&mut *tx)
        .await?;
    }

    for folder in &dataset.folders {
        sqlx::query(
            r#"
            INSERT INTO lms_scope.folders (id, name, color)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, color = EXCLUDED.color
            "#,
        )
        .bind(folder.id)
        .bind(&folder.name)
        .bind(&folder.color)
        .execute(&mut *tx)
        .await?;
    }

    for note in &dataset.notes {
        sqlx::query(
            r#"
            INSERT INTO lms_scope.notes
            (id, title, content, folder_id, tags, is_favorite, category, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title, content = EXCLUDED.content,
                folder_id = EXCLUDED.folder_id, tags = EXCLUDED.tags,
                is_favorite = EXCLUDED.is_favorite, category = EXCLUDED.category,
                created_at = EXCLUDED.created_at, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(note.id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.folder_id)
        .bind(&note.tags)
        .bind(note.is_favorite)
        .bind(&note.category)
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(&mut *tx)
        .await?;
    }

    for event in &dataset.events {
        sqlx::query(
            r#"
            INSERT INTO lms_scope.calendar_events
            (id, title, event_date, kind, instructor_name, subject, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title, event_date = EXCLUDED.event_date, kind = EXCLUDED.kind,
                instructor_name = EXCLUDED.instructor_name, subject = EXCLUDED.subject,
                location = EXCLUDED.location
            "#,
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(event.date)
        .bind(event.kind.as_str())
        .bind(&event.instructor_name)
        .bind(&event.subject)
        .bind(&event.location)
        .execute(&mut *tx)
        .await?;
    }

    for user in &dataset.users {
        sqlx::query(
            r#"
            INSERT INTO lms_scope.users (id, name, email, role, status, joined_at, last_active_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, email = EXCLUDED.email, role = EXCLUDED.role,
                status = EXCLUDED.status, joined_at = EXCLUDED.joined_at,
                last_active_at = EXCLUDED.last_active_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(user.joined_at)
        .bind(user.last_active_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(
        classes = dataset.classes.len(),
        sessions = dataset.sessions.len(),
        students = dataset.students.len(),
        notes = dataset.notes.len(),
        "seeded dataset"
    );
    Ok(())
}

async fn upsert_student(
    tx: &mut Transaction<'_, Postgres>,
    student: &Student,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO lms_scope.students
        (id, name, email, status, grade, attendance_pct, assignments_completed, assignments_total,
         subjects, teacher_id, last_active_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO UPDATE
        SET name = EXCLUDED.name, email = EXCLUDED.email, status = EXCLUDED.status,
            grade = EXCLUDED.grade, attendance_pct = EXCLUDED.attendance_pct,
            assignments_completed = EXCLUDED.assignments_completed,
            assignments_total = EXCLUDED.assignments_total, subjects = EXCLUDED.subjects,
            teacher_id = EXCLUDED.teacher_id, last_active_at = EXCLUDED.last_active_at
        "#,
    )
    .bind(student.id)
    .bind(&student.name)
    .bind(&student.email)
    .bind(student.status.as_str())
    .bind(&student.grade)
    .bind(student.attendance_pct)
    .bind(i64::from(student.assignments_completed))
    .bind(i64::from(student.assignments_total))
    .bind(&student.subjects)
    .bind(&student.teacher_id)
    .bind(student.last_active_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Loads every collection, each ordered by id.
pub async fn fetch_dataset(pool: &PgPool) -> anyhow::Result<Dataset> {
    let mut dataset = Dataset::default();

    for row in sqlx::query("SELECT * FROM lms_scope.classes ORDER BY id")
        .fetch_all(pool)
        .await
        .context("failed to load classes")?
    {
        dataset.classes.push(Class {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            instructor_name: row.try_get("instructor_name")?,
            students_count: count(&row, "students_count")?,
            avg_grade: row.try_get("avg_grade")?,
            completion_rate: row.try_get("completion_rate")?,
            engagement_pct: row.try_get("engagement_pct")?,
        });
    }

    for row in sqlx::query("SELECT * FROM lms_scope.live_sessions ORDER BY id")
        .fetch_all(pool)
        .await
        .context("failed to load live sessions")?
    {
        dataset.sessions.push(Session {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            instructor_name: row.try_get("instructor_name")?,
            subject: row.try_get("subject")?,
            scheduled_time: row.try_get("scheduled_time")?,
            duration_min: count(&row, "duration_min")?,
            status: parsed::<SessionStatus>(&row, "status")?,
            participants_count: count(&row, "participants_count")?,
            max_participants: count(&row, "max_participants")?,
            recording_url: row.try_get("recording_url")?,
        });
    }

    for row in sqlx::query("SELECT * FROM lms_scope.students ORDER BY id")
        .fetch_all(pool)
        .await
        .context("failed to load students")?
    {
        dataset.students.push(Student {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            status: parsed::<AccountStatus>(&row, "status")?,
            grade: row.try_get("grade")?,
            attendance_pct: row.try_get("attendance_pct")?,
            assignments_completed: count(&row, "assignments_completed")?,
            assignments_total: count(&row, "assignments_total")?,
            subjects: row.try_get("subjects")?,
            teacher_id: row.try_get("teacher_id")?,
            last_active_at: row.try_get("last_active_at")?,
        });
    }

    for row in sqlx::query("SELECT * FROM lms_scope.notifications ORDER BY id")
        .fetch_all(pool)
        .await
        .context("failed to load notifications")?
    {
        let audience: Option<String> = row.try_get("audience_role")?;
        dataset.notifications.push(Notification {
            id: row.try_get("id")?,
            kind: row.try_get("kind")?,
            title: row.try_get("title")?,
            message: row.try_get("message")?,
            timestamp: row.try_get("sent_at")?,
            read: row.try_get("read")?,
            priority: parsed::<Priority>(&row, "priority")?,
            audience_role: audience.map(|role| role.parse::<Role>()).transpose()?,
        });
    }

    for row in sqlx::query("SELECT * FROM lms_scope.folders ORDER BY name")
        .fetch_all(pool)
        .await
        .context("failed to load folders")?
    {
        dataset.folders.push(Folder {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            color: row.try_get("color")?,
        });
    }

    for row in sqlx::query("SELECT * FROM lms_scope.notes ORDER BY id")
        .fetch_all(pool)
        .await
        .context("failed to load notes")?
    {
        dataset.notes.push(Note {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            folder_id: row.try_get("folder_id")?,
            tags: row.try_get("tags")?,
            is_favorite: row.try_get("is_favorite")?,
            category: row.try_get("category")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        });
    }

    for row in sqlx::query("SELECT * FROM lms_scope.calendar_events ORDER BY id")
        .fetch_all(pool)
        .await
        .context("failed to load calendar events")?
    {
        dataset.events.push(Event {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            date: row.try_get("event_date")?,
            kind: parsed::<EventType>(&row, "kind")?,
            instructor_name: row.try_get("instructor_name")?,
            subject: row.try_get("subject")?,
            location: row.try_get("location")?,
        });
    }

    for row in sqlx::query("SELECT * FROM lms_scope.users ORDER BY id")
        .fetch_all(pool)
        .await
        .context("failed to load users")?
    {
        dataset.users.push(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            role: parsed::<Role>(&row, "role")?,
            status: parsed::<AccountStatus>(&row, "status")?,
            joined_at: row.try_get("joined_at")?,
            last_active_at: row.try_get("last_active_at")?,
        });
    }

    Ok(dataset)
}

#[derive(Debug, serde::Deserialize)]
struct RosterRow {
    name: String,
    email: String,
    status: AccountStatus,
    #[serde(default = "ungraded")]
    grade: String,
    attendance_pct: f64,
    assignments_completed: u32,
    assignments_total: u32,
    /// Semicolon separated.
    #[serde(default)]
    subjects: String,
    teacher_id: Option<String>,
}

fn ungraded() -> String {
    "-".to_string()
}

/// Imports a roster CSV. Rows whose email already exists are skipped; the
/// count of new students is returned.
pub async fn import_students_csv(pool: &PgPool, csv_path: &Path) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<RosterRow>().enumerate() {
        let row = result.with_context(|| format!("bad roster row {}", line + 1))?;
        let subjects: Vec<String> = row
            .subjects
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let teacher_id = row.teacher_id.filter(|id| !id.trim().is_empty());

        let result = sqlx::query(
            r#"
            INSERT INTO lms_scope.students
            (name, email, status, grade, attendance_pct, assignments_completed, assignments_total,
             subjects, teacher_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(&row.name)
        .bind(&row.email)
        .bind(row.status.as_str())
        .bind(&row.grade)
        .bind(row.attendance_pct)
        .bind(i64::from(row.assignments_completed))
        .bind(i64::from(row.assignments_total))
        .bind(&subjects)
        .bind(teacher_id)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    info!(path = %csv_path.display(), inserted, "imported roster");
    Ok(inserted)
}
