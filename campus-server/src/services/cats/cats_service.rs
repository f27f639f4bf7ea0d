use campus_auth::SessionClaim;
use campus_core::models::{CatEvent, CatRow, NewCat};
use campus_core::{CampusResult, Role, TenantContext};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::services::types::{ensure_principal_access, ensure_self_or_admin, StoreHandle};

use super::{CatView, CreateCat};

pub struct CatsService {
    pub store: StoreHandle,
}

impl CatsService {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Returns the CAT and whether it is new. Creating the same course,
    /// teacher and datetime again returns the existing CAT.
    pub async fn create(&self, claim: &SessionClaim, body: CreateCat) -> CampusResult<(CatView, bool)> {
        ensure_principal_access(&self.store, claim, Role::Teacher, body.teacher_id).await?;
        let ctx = claim.tenant();
        let store = self.store.store();
        let (cat, created) = self
            .store
            .run(store.create_cat(
                &ctx,
                NewCat {
                    course_id: body.course_id,
                    teacher_id: body.teacher_id,
                    cat_datetime: body.cat_datetime,
                },
            ))
            .await?;
        let course = self.store.run(store.get_course(&ctx, cat.course_id)).await?;
        if created {
            info!(tenant_id = ctx.id(), cat_id = cat.id, course_id = course.id, "cat created");
        }
        Ok((CatView::from(CatRow { cat, course }), created))
    }

    pub async fn reschedule(
        &self,
        claim: &SessionClaim,
        id: i64,
        cat_datetime: DateTime<Utc>,
    ) -> CampusResult<CatView> {
        let ctx = claim.tenant();
        self.owned(claim, &ctx, id).await?;
        let store = self.store.store();
        let cat = self.store.run(store.reschedule_cat(&ctx, id, cat_datetime)).await?;
        let course = self.store.run(store.get_course(&ctx, cat.course_id)).await?;
        info!(tenant_id = ctx.id(), cat_id = id, %cat_datetime, "cat rescheduled");
        Ok(CatView::from(CatRow { cat, course }))
    }

    pub async fn delete(&self, claim: &SessionClaim, id: i64) -> CampusResult<CatEvent> {
        let ctx = claim.tenant();
        self.owned(claim, &ctx, id).await?;
        let cat = self.store.run(self.store.store().delete_cat(&ctx, id)).await?;
        info!(tenant_id = ctx.id(), cat_id = id, "cat deleted");
        Ok(cat)
    }

    pub async fn for_teacher(&self, ctx: &TenantContext, teacher_id: i64) -> CampusResult<Vec<CatView>> {
        let rows = self
            .store
            .run(self.store.store().teacher_cats(ctx, teacher_id))
            .await?;
        Ok(rows.into_iter().map(CatView::from).collect())
    }

    pub async fn for_student(&self, ctx: &TenantContext, student_id: i64) -> CampusResult<Vec<CatView>> {
        let rows = self
            .store
            .run(self.store.store().student_cats(ctx, student_id))
            .await?;
        Ok(rows.into_iter().map(CatView::from).collect())
    }

    /// Only the teacher who set a CAT, or an admin, may change it.
    async fn owned(&self, claim: &SessionClaim, ctx: &TenantContext, id: i64) -> CampusResult<CatEvent> {
        let cat = self.store.run(self.store.store().get_cat(ctx, id)).await?;
        ensure_self_or_admin(claim, Role::Teacher, cat.teacher_id)?;
        Ok(cat)
    }
}
