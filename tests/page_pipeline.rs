use chrono::NaiveDate;
use uuid::Uuid;

use lms_scope::models::{Folder, Note, Session, SessionStatus};
use lms_scope::mutations::delete_folder;
use lms_scope::pipeline::run_dataset_page;
use lms_scope::{
    resolve_scope, run_page, AccessDenied, Dataset, EntityKind, FilterSet, InvalidFilter,
    PageOutcome, Principal, Role, RoleView, ShapeContext, StaticDirectory,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn session(id: i64, instructor: &str, status: SessionStatus) -> Session {
    Session {
        id,
        title: format!("Session {id}"),
        instructor_name: instructor.to_string(),
        subject: "Mathematics".to_string(),
        scheduled_time: today().and_hms_opt(9 + id as u32, 0, 0).unwrap(),
        duration_min: 60,
        status,
        participants_count: 10,
        max_participants: 20,
        recording_url: None,
    }
}

fn sessions() -> Vec<Session> {
    vec![
        session(1, "Dr. Sarah Wilson", SessionStatus::Live),
        session(2, "Prof. Michael Chen", SessionStatus::Live),
        session(3, "Dr. Sarah Wilson", SessionStatus::Scheduled),
        session(4, "Dr. Emma Rodriguez", SessionStatus::Scheduled),
        session(5, "Dr. Sarah Wilson", SessionStatus::Completed),
        session(6, "Prof. David Kim", SessionStatus::Completed),
    ]
}

#[test]
fn teacher_sees_own_sessions_and_filters_narrow_the_list() {
    let directory = StaticDirectory::default();
    let ctx = ShapeContext::new(&directory, today());
    let teacher = Principal::new("teacher_1", Role::Teacher);

    let scoped = resolve_scope(&teacher, &directory, &sessions());
    assert_eq!(scoped.len(), 3);
    assert!(scoped.iter().all(|s| s.instructor_name == "Dr. Sarah Wilson"));

    let page = run_page(&teacher, &ctx, &sessions(), &FilterSet::default())
        .ready()
        .expect("teachers may view sessions");
    let RoleView::Teacher(summary) = &page.view else {
        panic!("expected a teacher view");
    };
    assert_eq!(summary.counts.total, 3);
    assert_eq!(page.items.len(), 3);

    let (live, invalid) = FilterSet::from_params([("status", "live")]);
    assert!(invalid.is_empty());
    let page = run_page(&teacher, &ctx, &sessions(), &live).ready().unwrap();
    let ids: Vec<i64> = page.items.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(page.view.member().unwrap().counts.total, 3);
}

#[test]
fn admin_scope_is_the_whole_collection() {
    let directory = StaticDirectory::default();
    let admin = Principal::new("admin_1", Role::Admin);
    assert_eq!(resolve_scope(&admin, &directory, &sessions()), sessions());
}

#[test]
fn students_are_denied_rosters_not_handed_an_empty_list() {
    let directory = StaticDirectory::default();
    let ctx = ShapeContext::new(&directory, today());
    let student = Principal::new("student_1", Role::Student);
    let dataset = Dataset::demo().unwrap();
    let filters = FilterSet::default();

    for kind in [EntityKind::Students, EntityKind::Analytics, EntityKind::Users] {
        let outcome = run_dataset_page(kind, &student, &ctx, &dataset, &filters).unwrap();
        assert_eq!(
            outcome,
            PageOutcome::Denied(AccessDenied {
                role: Role::Student,
                kind
            })
        );
    }

    let teacher = Principal::new("teacher_2", Role::Teacher);
    let users = run_dataset_page(EntityKind::Users, &teacher, &ctx, &dataset, &filters).unwrap();
    assert!(users.is_denied());
}

#[test]
fn demo_roster_scopes_by_teacher_id() {
    let directory = StaticDirectory::default();
    let ctx = ShapeContext::new(&directory, today());
    let teacher = Principal::new("teacher_2", Role::Teacher);
    let dataset = Dataset::demo().unwrap();
    let filters = FilterSet::default();
    let page = run_dataset_page(EntityKind::Students, &teacher, &ctx, &dataset, &filters)
        .unwrap()
        .ready()
        .unwrap();
    let names: Vec<&str> = page.items.iter().filter_map(|s| s["name"].as_str()).collect();
    assert_eq!(names, vec!["Jordan Smith", "Chris Lee"]);
    assert_eq!(page.summary["total"], 2);
}

#[test]
fn deleting_a_folder_returns_its_notes_to_uncategorized() {
    let folder = Folder {
        id: Uuid::new_v4(),
        name: "Lecture Notes".to_string(),
        color: "blue".to_string(),
    };
    let stamp = today().and_hms_opt(9, 0, 0).unwrap();
    let mut notes: Vec<Note> = (1..=3)
        .map(|id| Note {
            id,
            title: format!("Note {id}"),
            content: String::new(),
            folder_id: (id != 2).then_some(folder.id),
            tags: Vec::new(),
            is_favorite: false,
            category: "lecture".to_string(),
            created_at: stamp,
            updated_at: stamp,
        })
        .collect();
    let mut folders = vec![folder.clone()];

    assert_eq!(delete_folder(&mut folders, &mut notes, folder.id), Ok(2));
    assert!(folders.is_empty());
    assert_eq!(notes.len(), 3);

    let (uncategorized, _) = FilterSet::from_params([("folder", "uncategorized")]);
    let directory = StaticDirectory::default();
    let ctx = ShapeContext::new(&directory, today());
    let student = Principal::new("student_1", Role::Student);
    let page = run_page(&student, &ctx, &notes, &uncategorized).ready().unwrap();
    assert_eq!(page.items.len(), 3);
}

#[test]
fn sort_the_page_cannot_apply_comes_back_to_the_caller() {
    let directory = StaticDirectory::default();
    let ctx = ShapeContext::new(&directory, today());
    let admin = Principal::new("admin_1", Role::Admin);
    let dataset = Dataset::demo().unwrap();

    let (filters, invalid) = FilterSet::from_params([("sort", "joined"), ("threshold", "high")]);
    assert!(invalid.is_empty());

    let page = run_dataset_page(EntityKind::Sessions, &admin, &ctx, &dataset, &filters)
        .unwrap()
        .ready()
        .unwrap();
    assert_eq!(page.ignored, vec![InvalidFilter::UnsupportedSort("joined".to_string())]);
    let ids: Vec<i64> = page.items.iter().filter_map(|s| s["id"].as_i64()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

    let (filters, _) = FilterSet::from_params([("sort", "joined")]);
    let users = run_dataset_page(EntityKind::Users, &admin, &ctx, &dataset, &filters)
        .unwrap()
        .ready()
        .unwrap();
    assert!(users.ignored.is_empty());
}

#[test]
fn admin_sessions_carry_owner_ids_and_teacher_sessions_do_not() {
    let directory = StaticDirectory::default();
    let ctx = ShapeContext::new(&directory, today());
    let dataset = Dataset::demo().unwrap();
    let filters = FilterSet::default();

    let admin = Principal::new("admin_1", Role::Admin);
    let page = run_dataset_page(EntityKind::Sessions, &admin, &ctx, &dataset, &filters)
        .unwrap()
        .ready()
        .unwrap();
    assert_eq!(page.items[0]["ownerId"], "teacher_1");
    assert_eq!(page.items[3]["ownerName"], "unknown");
    assert!(page.items[3]["ownerId"].is_null());

    let teacher = Principal::new("teacher_1", Role::Teacher);
    let page = run_dataset_page(EntityKind::Sessions, &teacher, &ctx, &dataset, &filters)
        .unwrap()
        .ready()
        .unwrap();
    assert!(page.items.iter().all(|s| s.get("ownerId").is_none()));

    let notes = run_dataset_page(EntityKind::Notes, &admin, &ctx, &dataset, &filters)
        .unwrap()
        .ready()
        .unwrap();
    assert!(notes.items.iter().all(|n| n.get("ownerId").is_none()));
}
