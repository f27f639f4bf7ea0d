use std::collections::{BTreeSet, HashMap};

use campus_auth::SessionClaim;
use campus_core::models::Course;
use campus_core::{CampusResult, Role, TenantContext};
use tracing::info;
use validator::Validate;

use crate::services::types::{ensure_principal_access, StoreHandle};
use crate::services::validation_error;

use super::{AssignmentOutcome, CourseSelection, CourseWithCount, EnrolledStudent};

/// Distinct ids in first-seen order.
pub fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = BTreeSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

pub struct TeachersService {
    pub store: StoreHandle,
}

impl TeachersService {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Add courses to a teacher. Already assigned courses are skipped, so
    /// repeating the call succeeds without creating duplicates.
    pub async fn assign_courses(
        &self,
        claim: &SessionClaim,
        teacher_id: i64,
        selection: CourseSelection,
    ) -> CampusResult<AssignmentOutcome> {
        ensure_principal_access(&self.store, claim, Role::Teacher, teacher_id).await?;
        selection.validate().map_err(validation_error)?;
        let ids = dedup_ids(&selection.course_ids);
        let ctx = claim.tenant();
        let assigned = self
            .store
            .run(self.store.store().assign_teacher_courses(&ctx, teacher_id, &ids))
            .await?;
        info!(tenant_id = ctx.id(), teacher_id, assigned, requested = ids.len(), "teacher courses assigned");
        Ok(AssignmentOutcome {
            message: "Courses assigned successfully".to_string(),
            assigned,
            requested: ids.len(),
        })
    }

    pub async fn courses(&self, ctx: &TenantContext, teacher_id: i64) -> CampusResult<Vec<Course>> {
        self.store
            .run(self.store.store().teacher_courses(ctx, teacher_id))
            .await
    }

    pub async fn unassign_course(
        &self,
        claim: &SessionClaim,
        teacher_id: i64,
        course_id: i64,
    ) -> CampusResult<()> {
        ensure_principal_access(&self.store, claim, Role::Teacher, teacher_id).await?;
        let ctx = claim.tenant();
        self.store
            .run(self.store.store().unassign_teacher_course(&ctx, teacher_id, course_id))
            .await?;
        info!(tenant_id = ctx.id(), teacher_id, course_id, "teacher course removed");
        Ok(())
    }

    /// The teacher's courses with the number of students enrolled in each.
    pub async fn courses_with_count(
        &self,
        ctx: &TenantContext,
        teacher_id: i64,
    ) -> CampusResult<Vec<CourseWithCount>> {
        let courses = self.courses(ctx, teacher_id).await?;
        let enrolments = self
            .store
            .run(self.store.store().teacher_enrolments(ctx, teacher_id))
            .await?;

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for row in &enrolments {
            *counts.entry(row.course.id).or_default() += 1;
        }
        Ok(courses
            .into_iter()
            .map(|course| {
                let count = counts.get(&course.id).copied().unwrap_or(0);
                CourseWithCount::new(course, count)
            })
            .collect())
    }

    pub async fn students(&self, ctx: &TenantContext, teacher_id: i64) -> CampusResult<Vec<EnrolledStudent>> {
        let rows = self
            .store
            .run(self.store.store().teacher_enrolments(ctx, teacher_id))
            .await?;
        Ok(rows.into_iter().map(EnrolledStudent::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        assert_eq!(dedup_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup_ids(&[]).is_empty());
    }
}
