use campus_auth::SessionClaim;
use campus_core::models::{Course, NewCourse};
use campus_core::{CampusResult, TenantContext};
use tracing::info;
use validator::Validate;

use crate::services::types::{ensure_admin, StoreHandle};
use crate::services::validation_error;

use super::CreateCourse;

pub struct CoursesService {
    pub store: StoreHandle,
}

impl CoursesService {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub async fn list(&self, ctx: &TenantContext) -> CampusResult<Vec<Course>> {
        self.store.run(self.store.store().list_courses(ctx)).await
    }

    pub async fn by_department(&self, ctx: &TenantContext, department: &str) -> CampusResult<Vec<Course>> {
        self.store
            .run(self.store.store().list_courses_by_department(ctx, department.trim()))
            .await
    }

    pub async fn create(&self, claim: &SessionClaim, body: CreateCourse) -> CampusResult<Course> {
        ensure_admin(claim)?;
        body.validate().map_err(validation_error)?;
        let course = NewCourse {
            name: body.name.trim().to_string(),
            code: body.code.trim().to_string(),
            department: body
                .department
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        };
        let ctx = claim.tenant();
        let course = self.store.run(self.store.store().create_course(&ctx, course)).await?;
        info!(tenant_id = ctx.id(), course_id = course.id, code = %course.code, "course created");
        Ok(course)
    }
}
