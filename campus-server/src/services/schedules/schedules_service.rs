use std::str::FromStr;

use campus_auth::SessionClaim;
use campus_core::models::{hhmm, NewScheduleEntry, ScheduleRow};
use campus_core::{CampusError, CampusResult, DayOfWeek, Role, TenantContext};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::services::types::{ensure_principal_access, StoreHandle};
use crate::services::validation_error;

use super::{timetable_order, AddScheduleEntry, ScheduleView};

pub struct SchedulesService {
    pub store: StoreHandle,
}

impl SchedulesService {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub async fn add_entry(
        &self,
        claim: &SessionClaim,
        teacher_id: i64,
        body: AddScheduleEntry,
    ) -> CampusResult<ScheduleView> {
        ensure_principal_access(&self.store, claim, Role::Teacher, teacher_id).await?;
        body.validate().map_err(validation_error)?;
        let entry = parse_entry(teacher_id, body)?;

        let ctx = claim.tenant();
        let store = self.store.store();
        let entry = self.store.run(store.add_schedule_entry(&ctx, entry)).await?;
        let course = self.store.run(store.get_course(&ctx, entry.course_id)).await?;
        info!(
            tenant_id = ctx.id(),
            teacher_id,
            course_id = course.id,
            day = ?entry.day_of_week,
            "schedule entry added"
        );
        Ok(ScheduleView::from(ScheduleRow { entry, course }))
    }

    pub async fn teacher_schedule(&self, ctx: &TenantContext, teacher_id: i64) -> CampusResult<Vec<ScheduleView>> {
        let rows = self
            .store
            .run(self.store.store().teacher_schedule(ctx, teacher_id))
            .await?;
        let mut views: Vec<ScheduleView> = rows.into_iter().map(ScheduleView::from).collect();
        timetable_order(&mut views);
        Ok(views)
    }

    pub async fn student_classes(&self, ctx: &TenantContext, student_id: i64) -> CampusResult<Vec<ScheduleView>> {
        let rows = self
            .store
            .run(self.store.store().student_classes(ctx, student_id))
            .await?;
        let mut views: Vec<ScheduleView> = rows.into_iter().map(ScheduleView::from).collect();
        timetable_order(&mut views);
        Ok(views)
    }
}

/// Weekday and `HH:MM` parsing; the slot must end after it starts.
pub fn parse_entry(teacher_id: i64, body: AddScheduleEntry) -> CampusResult<NewScheduleEntry> {
    let mut errors = serde_json::Map::new();
    let day = match DayOfWeek::from_str(&body.day_of_week) {
        Ok(day) => Some(day),
        Err(e) => {
            errors.insert("day_of_week".into(), json!([e]));
            None
        }
    };
    let start = time_field(&mut errors, "start_time", &body.start_time);
    let end = time_field(&mut errors, "end_time", &body.end_time);

    match (day, start, end) {
        (Some(day_of_week), Some(start_time), Some(end_time)) if errors.is_empty() => {
            if end_time <= start_time {
                return Err(CampusError::bad_request("Validation failed")
                    .with_errors(json!({"end_time": ["end_time must be after start_time"]}))
                    .into_anyhow());
            }
            Ok(NewScheduleEntry {
                teacher_id,
                course_id: body.course_id,
                day_of_week,
                start_time,
                end_time,
                venue: body.venue.trim().to_string(),
                semester: body.semester.trim().to_string(),
            })
        }
        _ => Err(CampusError::bad_request("Validation failed")
            .with_errors(serde_json::Value::Object(errors))
            .into_anyhow()),
    }
}

fn time_field(
    errors: &mut serde_json::Map<String, serde_json::Value>,
    field: &str,
    raw: &str,
) -> Option<chrono::NaiveTime> {
    match hhmm::parse(raw) {
        Ok(time) => Some(time),
        Err(e) => {
            errors.insert(field.to_string(), json!([e]));
            None
        }
    }
}
