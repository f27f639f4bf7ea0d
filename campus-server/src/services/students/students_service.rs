use campus_auth::SessionClaim;
use campus_core::models::Course;
use campus_core::{CampusResult, Role, TenantContext};
use tracing::{debug, info};
use validator::Validate;

use crate::services::teachers::{dedup_ids, AssignmentOutcome, CourseSelection};
use crate::services::types::{ensure_principal_access, StoreHandle};
use crate::services::validation_error;

pub struct StudentsService {
    pub store: StoreHandle,
}

impl StudentsService {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Enrol a student. Existing enrolments are kept as they are.
    pub async fn assign_courses(
        &self,
        claim: &SessionClaim,
        student_id: i64,
        selection: CourseSelection,
    ) -> CampusResult<AssignmentOutcome> {
        ensure_principal_access(&self.store, claim, Role::Student, student_id).await?;
        selection.validate().map_err(validation_error)?;
        let ids = dedup_ids(&selection.course_ids);
        let ctx = claim.tenant();
        let assigned = self
            .store
            .run(self.store.store().assign_student_courses(&ctx, student_id, &ids))
            .await?;
        info!(tenant_id = ctx.id(), student_id, assigned, requested = ids.len(), "student courses assigned");
        Ok(AssignmentOutcome {
            message: "Courses registered successfully".to_string(),
            assigned,
            requested: ids.len(),
        })
    }

    pub async fn courses(&self, ctx: &TenantContext, student_id: i64) -> CampusResult<Vec<Course>> {
        self.store
            .run(self.store.store().student_courses(ctx, student_id))
            .await
    }

    /// Catalog courses offered by the student's department.
    pub async fn department_courses(&self, ctx: &TenantContext, student_id: i64) -> CampusResult<Vec<Course>> {
        let store = self.store.store();
        let student = self.store.run(store.get_student(ctx, student_id)).await?;
        debug!(student_id, department = %student.department, "department courses");
        self.store
            .run(store.list_courses_by_department(ctx, &student.department))
            .await
    }
}
