use campus_core::{CampusResult, TenantContext};
use tracing::debug;

use crate::services::types::StoreHandle;

use super::{group_students, group_teachers, StudentRoster, TeacherRoster};

pub struct RostersService {
    pub store: StoreHandle,
}

impl RostersService {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub async fn teachers(&self, ctx: &TenantContext) -> CampusResult<Vec<TeacherRoster>> {
        let rows = self.store.run(self.store.store().teacher_roster_rows(ctx)).await?;
        debug!(tenant_id = ctx.id(), rows = rows.len(), "teacher roster rows");
        Ok(group_teachers(rows))
    }

    pub async fn students(&self, ctx: &TenantContext) -> CampusResult<Vec<StudentRoster>> {
        let rows = self.store.run(self.store.store().student_roster_rows(ctx)).await?;
        debug!(tenant_id = ctx.id(), rows = rows.len(), "student roster rows");
        Ok(group_students(rows))
    }
}
