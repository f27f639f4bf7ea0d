//! Tenant-scoped storage contracts.
//!
//! Every method that touches tenant-owned rows takes the caller's
//! [`TenantContext`] and applies its tenant id to every row it reads or
//! joins. A row owned by another tenant is reported as `NotFound`, exactly
//! like a missing row. Uniqueness constraints live in the store so that
//! concurrent duplicate inserts are settled by the store, not by callers.

pub mod memory;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    Admin, CatEvent, CatRow, Course, EnrolmentRow, NewAdmin, NewCat, NewCourse, NewScheduleEntry,
    NewStudent, NewTeacher, PrincipalRecord, Role, ScheduleEntry, ScheduleRow, Student,
    StudentCourseRow, Teacher, TeacherCourseRow,
};
use crate::tenant::{BrandingUpdate, NewTenant, Tenant, TenantContext, TenantId};

pub use memory::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Run a storage future under a deadline.
pub async fn bounded<T, F>(limit: Duration, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(?limit, "storage call exceeded its deadline");
            Err(StoreError::Timeout(limit))
        }
    }
}

/// Maps slugs to tenants and creates tenants.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn resolve_by_slug(&self, slug: &str) -> StoreResult<Tenant>;

    async fn get_tenant(&self, id: TenantId) -> StoreResult<Tenant>;

    /// Allocate an id, derive the slug and insert, as one step.
    async fn create_tenant(&self, tenant: NewTenant) -> StoreResult<Tenant>;

    /// Same as `create_tenant`, inserting the admin account in the same step.
    async fn create_tenant_with_admin(
        &self,
        tenant: NewTenant,
        admin: NewAdmin,
    ) -> StoreResult<(Tenant, Admin)>;

    async fn update_branding(&self, ctx: &TenantContext, update: BrandingUpdate)
        -> StoreResult<Tenant>;
}

/// Students, teachers and admins.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Fails with `Conflict` when the username is taken within the tenant.
    async fn insert_student(&self, ctx: &TenantContext, student: NewStudent) -> StoreResult<Student>;

    async fn insert_teacher(&self, ctx: &TenantContext, teacher: NewTeacher) -> StoreResult<Teacher>;

    /// Login lookup. Usernames are only unique within a tenant, so this
    /// returns every match across tenants together with the owning slug.
    async fn find_by_username(&self, role: Role, username: &str) -> StoreResult<Vec<PrincipalRecord>>;

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<(Admin, String)>>;

    async fn get_student(&self, ctx: &TenantContext, id: i64) -> StoreResult<Student>;

    async fn get_teacher(&self, ctx: &TenantContext, id: i64) -> StoreResult<Teacher>;
}

/// Course catalog and course associations.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn create_course(&self, ctx: &TenantContext, course: NewCourse) -> StoreResult<Course>;

    async fn get_course(&self, ctx: &TenantContext, id: i64) -> StoreResult<Course>;

    async fn list_courses(&self, ctx: &TenantContext) -> StoreResult<Vec<Course>>;

    async fn list_courses_by_department(
        &self,
        ctx: &TenantContext,
        department: &str,
    ) -> StoreResult<Vec<Course>>;

    /// Associate courses with a teacher. All ids are checked before anything
    /// is written; existing pairs are left alone. Returns how many pairs were new.
    async fn assign_teacher_courses(
        &self,
        ctx: &TenantContext,
        teacher_id: i64,
        course_ids: &[i64],
    ) -> StoreResult<usize>;

    async fn unassign_teacher_course(
        &self,
        ctx: &TenantContext,
        teacher_id: i64,
        course_id: i64,
    ) -> StoreResult<()>;

    async fn teacher_courses(&self, ctx: &TenantContext, teacher_id: i64) -> StoreResult<Vec<Course>>;

    async fn assign_student_courses(
        &self,
        ctx: &TenantContext,
        student_id: i64,
        course_ids: &[i64],
    ) -> StoreResult<usize>;

    async fn student_courses(&self, ctx: &TenantContext, student_id: i64) -> StoreResult<Vec<Course>>;

    /// Students enrolled in any of the teacher's courses.
    async fn teacher_enrolments(
        &self,
        ctx: &TenantContext,
        teacher_id: i64,
    ) -> StoreResult<Vec<EnrolmentRow>>;

    /// Teacher ⟕ teacher_courses ⟕ student_courses, ordered by teacher name.
    async fn teacher_roster_rows(&self, ctx: &TenantContext) -> StoreResult<Vec<TeacherCourseRow>>;

    /// Student ⟕ student_courses, ordered by student name.
    async fn student_roster_rows(&self, ctx: &TenantContext) -> StoreResult<Vec<StudentCourseRow>>;
}

/// Teacher timetables.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn add_schedule_entry(
        &self,
        ctx: &TenantContext,
        entry: NewScheduleEntry,
    ) -> StoreResult<ScheduleEntry>;

    async fn teacher_schedule(&self, ctx: &TenantContext, teacher_id: i64)
        -> StoreResult<Vec<ScheduleRow>>;

    /// Entries for every course the student is enrolled in.
    async fn student_classes(&self, ctx: &TenantContext, student_id: i64)
        -> StoreResult<Vec<ScheduleRow>>;
}

/// Continuous assessment tests.
#[async_trait]
pub trait CatStore: Send + Sync {
    /// Returns the stored CAT and whether it was newly created; an identical
    /// CAT (same course, teacher and datetime) is returned as is.
    async fn create_cat(&self, ctx: &TenantContext, cat: NewCat) -> StoreResult<(CatEvent, bool)>;

    async fn get_cat(&self, ctx: &TenantContext, id: i64) -> StoreResult<CatEvent>;

    async fn reschedule_cat(
        &self,
        ctx: &TenantContext,
        id: i64,
        cat_datetime: DateTime<Utc>,
    ) -> StoreResult<CatEvent>;

    async fn delete_cat(&self, ctx: &TenantContext, id: i64) -> StoreResult<CatEvent>;

    async fn teacher_cats(&self, ctx: &TenantContext, teacher_id: i64) -> StoreResult<Vec<CatRow>>;

    /// CATs for the student's enrolled courses.
    async fn student_cats(&self, ctx: &TenantContext, student_id: i64) -> StoreResult<Vec<CatRow>>;
}

/// Everything the server needs from one backend.
pub trait CampusStore: TenantDirectory + PrincipalStore + CourseStore + ScheduleStore + CatStore {}

impl<T> CampusStore for T where
    T: TenantDirectory + PrincipalStore + CourseStore + ScheduleStore + CatStore
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_passes_results_through() {
        let ok = bounded(Duration::from_millis(50), async { Ok::<_, StoreError>(3) }).await;
        assert_eq!(ok, Ok(3));
    }

    #[tokio::test]
    async fn bounded_times_out() {
        let slow = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, StoreError>(())
        })
        .await;
        assert_eq!(slow, Err(StoreError::Timeout(Duration::from_millis(10))));
    }
}
