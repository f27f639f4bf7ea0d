use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveTime, TimeZone, Utc};

use campus_core::models::{
    DayOfWeek, NewAdmin, NewCat, NewCourse, NewScheduleEntry, NewStudent, NewTeacher, Role,
};
use campus_core::{
    CatStore, CourseStore, MemoryStore, NewTenant, PrincipalStore, ScheduleStore, StoreError,
    TenantContext, TenantDirectory,
};

/// Test factory functions
fn new_tenant(name: &str) -> NewTenant {
    NewTenant {
        name: name.to_string(),
        kind: "secondary".to_string(),
    }
}

fn new_teacher(username: &str, fullname: &str) -> NewTeacher {
    NewTeacher {
        username: username.to_string(),
        password_hash: "hash".to_string(),
        fullname: fullname.to_string(),
        employee_id: format!("EMP-{username}"),
        subject: "Mathematics".to_string(),
        department: "Science".to_string(),
        age: 40,
        year: "2024".to_string(),
    }
}

fn new_student(username: &str, fullname: &str) -> NewStudent {
    NewStudent {
        username: username.to_string(),
        password_hash: "hash".to_string(),
        fullname: fullname.to_string(),
        registration_number: format!("REG-{username}"),
        department: "Science".to_string(),
        age: 16,
        year: "1".to_string(),
    }
}

fn new_course(name: &str, code: &str) -> NewCourse {
    NewCourse {
        name: name.to_string(),
        code: code.to_string(),
        department: Some("Science".to_string()),
    }
}

async fn school(store: &MemoryStore, name: &str) -> TenantContext {
    store.create_tenant(new_tenant(name)).await.unwrap().context()
}

#[tokio::test]
async fn test_tenant_slug_embeds_generated_id() {
    let store = MemoryStore::new();
    let oak = store.create_tenant(new_tenant("Oak School")).await.unwrap();
    assert_eq!(oak.slug, format!("oak-school-{}", oak.id));

    let resolved = store.resolve_by_slug(&oak.slug).await.unwrap();
    assert_eq!(resolved.id, oak.id);
    assert_eq!(
        store.resolve_by_slug("oak-school").await,
        Err(StoreError::NotFound("Tenant".into()))
    );
}

#[tokio::test]
async fn test_concurrent_tenant_creation_yields_unique_slugs() {
    let store = Arc::new(MemoryStore::new());
    let mut handles = Vec::new();
    for _ in 0..32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.create_tenant(new_tenant("Same Name")).await.unwrap().slug
        }));
    }
    let mut slugs = HashSet::new();
    for handle in handles {
        assert!(slugs.insert(handle.await.unwrap()));
    }
    assert_eq!(slugs.len(), 32);
}

#[tokio::test]
async fn test_admin_email_is_unique() {
    let store = MemoryStore::new();
    let admin = || NewAdmin {
        email: "Head@Oak.edu".to_string(),
        password_hash: "hash".to_string(),
        fullname: "Head".to_string(),
        phone_number: "555".to_string(),
    };
    let (tenant, created) = store
        .create_tenant_with_admin(new_tenant("Oak School"), admin())
        .await
        .unwrap();
    assert_eq!(created.email, "head@oak.edu");
    assert_eq!(created.tenant_id, tenant.id);

    let dup = store.create_tenant_with_admin(new_tenant("Elm School"), admin()).await;
    assert_eq!(dup, Err(StoreError::Conflict("Admin email".into())));

    let (found, slug) = store.find_admin_by_email("head@oak.edu").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(slug, tenant.slug);
}

#[tokio::test]
async fn test_username_unique_per_tenant_only() {
    let store = MemoryStore::new();
    let oak = school(&store, "Oak School").await;
    let elm = school(&store, "Elm School").await;

    store.insert_teacher(&oak, new_teacher("alice", "Alice")).await.unwrap();
    let dup = store.insert_teacher(&oak, new_teacher("alice", "Alice Two")).await;
    assert_eq!(dup, Err(StoreError::Conflict("Username".into())));
    store.insert_teacher(&elm, new_teacher("alice", "Alice Elm")).await.unwrap();

    let found = store.find_by_username(Role::Teacher, "alice").await.unwrap();
    let slugs: HashSet<_> = found.iter().map(|p| p.tenant_slug.clone()).collect();
    assert_eq!(slugs, HashSet::from([oak.slug.clone(), elm.slug.clone()]));
    assert!(store.find_by_username(Role::Student, "alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cross_tenant_ids_are_not_found() {
    let store = MemoryStore::new();
    let oak = school(&store, "Oak School").await;
    let elm = school(&store, "Elm School").await;

    let teacher = store.insert_teacher(&elm, new_teacher("bob", "Bob")).await.unwrap();
    let course = store.create_course(&elm, new_course("Algebra", "MTH101")).await.unwrap();

    assert_eq!(
        store.get_teacher(&oak, teacher.id).await,
        Err(StoreError::NotFound("Teacher".into()))
    );
    assert_eq!(
        store.get_course(&oak, course.id).await,
        Err(StoreError::NotFound("Course".into()))
    );
    assert!(store.teacher_courses(&oak, teacher.id).await.is_err());

    // A tenant-A teacher cannot be linked to a tenant-B course.
    let own = store.insert_teacher(&oak, new_teacher("carol", "Carol")).await.unwrap();
    assert_eq!(
        store.assign_teacher_courses(&oak, own.id, &[course.id]).await,
        Err(StoreError::NotFound("Course".into()))
    );
}

#[tokio::test]
async fn test_course_assignment_is_idempotent() {
    let store = MemoryStore::new();
    let oak = school(&store, "Oak School").await;
    let teacher = store.insert_teacher(&oak, new_teacher("alice", "Alice")).await.unwrap();
    let course = store.create_course(&oak, new_course("Biology", "BIO101")).await.unwrap();

    assert_eq!(store.assign_teacher_courses(&oak, teacher.id, &[course.id]).await, Ok(1));
    assert_eq!(store.assign_teacher_courses(&oak, teacher.id, &[course.id]).await, Ok(0));
    assert_eq!(store.teacher_courses(&oak, teacher.id).await.unwrap().len(), 1);

    store.unassign_teacher_course(&oak, teacher.id, course.id).await.unwrap();
    assert!(store.teacher_courses(&oak, teacher.id).await.unwrap().is_empty());
    assert_eq!(
        store.unassign_teacher_course(&oak, teacher.id, course.id).await,
        Err(StoreError::NotFound("Course assignment".into()))
    );
}

#[tokio::test]
async fn test_assignment_validates_every_course_first() {
    let store = MemoryStore::new();
    let oak = school(&store, "Oak School").await;
    let student = store.insert_student(&oak, new_student("sam", "Sam")).await.unwrap();
    let course = store.create_course(&oak, new_course("Biology", "BIO101")).await.unwrap();

    let res = store.assign_student_courses(&oak, student.id, &[course.id, 9999]).await;
    assert_eq!(res, Err(StoreError::NotFound("Course".into())));
    assert!(store.student_courses(&oak, student.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_roster_rows_use_outer_join_semantics() {
    let store = MemoryStore::new();
    let oak = school(&store, "Oak School").await;
    let elm = school(&store, "Elm School").await;

    let alice = store.insert_teacher(&oak, new_teacher("alice", "Alice")).await.unwrap();
    store.insert_teacher(&oak, new_teacher("zed", "Zed")).await.unwrap();
    store.insert_teacher(&elm, new_teacher("eve", "Eve")).await.unwrap();

    let bio = store.create_course(&oak, new_course("Biology", "BIO101")).await.unwrap();
    let chem = store.create_course(&oak, new_course("Chemistry", "CHM101")).await.unwrap();
    store.assign_teacher_courses(&oak, alice.id, &[bio.id, chem.id]).await.unwrap();

    let sam = store.insert_student(&oak, new_student("sam", "Sam")).await.unwrap();
    let ann = store.insert_student(&oak, new_student("ann", "Ann")).await.unwrap();
    store.assign_student_courses(&oak, sam.id, &[bio.id]).await.unwrap();
    store.assign_student_courses(&oak, ann.id, &[bio.id]).await.unwrap();

    let rows = store.teacher_roster_rows(&oak).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].teacher.fullname, "Alice");
    let counts: Vec<_> = rows
        .iter()
        .map(|r| (r.course.as_ref().map(|c| c.code.clone()), r.student_count))
        .collect();
    assert!(counts.contains(&(Some("BIO101".to_string()), 2)));
    assert!(counts.contains(&(Some("CHM101".to_string()), 0)));
    assert_eq!(rows[2].teacher.fullname, "Zed");
    assert!(rows[2].course.is_none());

    let students = store.student_roster_rows(&oak).await.unwrap();
    assert_eq!(students.len(), 2);
    assert!(store.student_roster_rows(&elm).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_student_classes_follow_enrolment_and_weekday_order() {
    let store = MemoryStore::new();
    let oak = school(&store, "Oak School").await;
    let teacher = store.insert_teacher(&oak, new_teacher("alice", "Alice")).await.unwrap();
    let student = store.insert_student(&oak, new_student("sam", "Sam")).await.unwrap();
    let bio = store.create_course(&oak, new_course("Biology", "BIO101")).await.unwrap();
    let art = store.create_course(&oak, new_course("Art", "ART101")).await.unwrap();
    store.assign_student_courses(&oak, student.id, &[bio.id]).await.unwrap();

    let slot = |course_id, day, hour| NewScheduleEntry {
        teacher_id: teacher.id,
        course_id,
        day_of_week: day,
        start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
        venue: "Lab 1".to_string(),
        semester: "Fall".to_string(),
    };
    store.add_schedule_entry(&oak, slot(bio.id, DayOfWeek::Wednesday, 9)).await.unwrap();
    store.add_schedule_entry(&oak, slot(bio.id, DayOfWeek::Monday, 14)).await.unwrap();
    store.add_schedule_entry(&oak, slot(bio.id, DayOfWeek::Monday, 8)).await.unwrap();
    store.add_schedule_entry(&oak, slot(art.id, DayOfWeek::Monday, 7)).await.unwrap();

    let classes = store.student_classes(&oak, student.id).await.unwrap();
    let order: Vec<_> = classes
        .iter()
        .map(|r| (r.entry.day_of_week, r.entry.start_time.format("%H").to_string()))
        .collect();
    assert_eq!(
        order,
        vec![
            (DayOfWeek::Monday, "08".to_string()),
            (DayOfWeek::Monday, "14".to_string()),
            (DayOfWeek::Wednesday, "09".to_string()),
        ]
    );
    assert_eq!(store.teacher_schedule(&oak, teacher.id).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_cat_lifecycle() {
    let store = MemoryStore::new();
    let oak = school(&store, "Oak School").await;
    let elm = school(&store, "Elm School").await;
    let teacher = store.insert_teacher(&oak, new_teacher("alice", "Alice")).await.unwrap();
    let student = store.insert_student(&oak, new_student("sam", "Sam")).await.unwrap();
    let bio = store.create_course(&oak, new_course("Biology", "BIO101")).await.unwrap();
    store.assign_student_courses(&oak, student.id, &[bio.id]).await.unwrap();

    let when = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
    let cat = NewCat {
        course_id: bio.id,
        teacher_id: teacher.id,
        cat_datetime: when,
    };
    let (first, created) = store.create_cat(&oak, cat.clone()).await.unwrap();
    assert!(created);
    let (again, created) = store.create_cat(&oak, cat).await.unwrap();
    assert!(!created);
    assert_eq!(again.id, first.id);

    let later = Utc.with_ymd_and_hms(2026, 3, 12, 9, 0, 0).unwrap();
    let moved = store.reschedule_cat(&oak, first.id, later).await.unwrap();
    assert_eq!(moved.cat_datetime, later);

    let for_student = store.student_cats(&oak, student.id).await.unwrap();
    assert_eq!(for_student.len(), 1);
    assert_eq!(for_student[0].course.code, "BIO101");

    assert_eq!(
        store.delete_cat(&elm, first.id).await,
        Err(StoreError::NotFound("CAT".into()))
    );
    store.delete_cat(&oak, first.id).await.unwrap();
    assert!(store.teacher_cats(&oak, teacher.id).await.unwrap().is_empty());
}
