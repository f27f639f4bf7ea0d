use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use super::{
    CatStore, CourseStore, PrincipalStore, ScheduleStore, StoreError, StoreResult, TenantDirectory,
};
use crate::models::{
    Admin, CatEvent, CatRow, Course, EnrolmentRow, NewAdmin, NewCat, NewCourse, NewScheduleEntry,
    NewStudent, NewTeacher, PrincipalRecord, Role, ScheduleEntry, ScheduleRow, Student,
    StudentCourseRow, Teacher, TeacherCourseRow,
};
use crate::tenant::{derive_slug, Branding, BrandingUpdate, NewTenant, Tenant, TenantContext, TenantId};

#[derive(Debug, Default)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

/// Association key: (tenant, principal, course).
type Link = (i64, i64, i64);

#[derive(Debug, Default)]
struct Tables {
    tenant_seq: Sequence,
    principal_seq: Sequence,
    course_seq: Sequence,
    schedule_seq: Sequence,
    cat_seq: Sequence,

    tenants: BTreeMap<i64, Tenant>,
    slugs: HashMap<String, i64>,
    students: BTreeMap<i64, Student>,
    teachers: BTreeMap<i64, Teacher>,
    admins: BTreeMap<i64, Admin>,
    courses: BTreeMap<i64, Course>,
    teacher_courses: BTreeSet<Link>,
    student_courses: BTreeSet<Link>,
    schedules: BTreeMap<i64, ScheduleEntry>,
    cats: BTreeMap<i64, CatEvent>,
}

impl Tables {
    fn tenant(&self, id: TenantId) -> StoreResult<&Tenant> {
        self.tenants
            .get(&id.0)
            .ok_or_else(|| StoreError::NotFound("Tenant".into()))
    }

    fn student(&self, ctx: &TenantContext, id: i64) -> StoreResult<&Student> {
        self.students
            .get(&id)
            .filter(|s| s.tenant_id == ctx.tenant_id)
            .ok_or_else(|| StoreError::NotFound("Student".into()))
    }

    fn teacher(&self, ctx: &TenantContext, id: i64) -> StoreResult<&Teacher> {
        self.teachers
            .get(&id)
            .filter(|t| t.tenant_id == ctx.tenant_id)
            .ok_or_else(|| StoreError::NotFound("Teacher".into()))
    }

    fn course(&self, ctx: &TenantContext, id: i64) -> StoreResult<&Course> {
        self.courses
            .get(&id)
            .filter(|c| c.tenant_id == ctx.tenant_id)
            .ok_or_else(|| StoreError::NotFound("Course".into()))
    }

    fn cat(&self, ctx: &TenantContext, id: i64) -> StoreResult<&CatEvent> {
        self.cats
            .get(&id)
            .filter(|c| c.tenant_id == ctx.tenant_id)
            .ok_or_else(|| StoreError::NotFound("CAT".into()))
    }

    fn linked_courses(&self, links: &BTreeSet<Link>, ctx: &TenantContext, principal_id: i64) -> Vec<Course> {
        let tenant = ctx.id();
        links
            .range((tenant, principal_id, i64::MIN)..=(tenant, principal_id, i64::MAX))
            .filter_map(|(_, _, course_id)| self.course(ctx, *course_id).ok().cloned())
            .collect()
    }

    fn enrolment_count(&self, ctx: &TenantContext, course_id: i64) -> usize {
        self.student_courses
            .iter()
            .filter(|(tenant, _, course)| *tenant == ctx.id() && *course == course_id)
            .count()
    }

    fn insert_tenant(&mut self, tenant: NewTenant) -> StoreResult<Tenant> {
        let id = TenantId(self.tenant_seq.next());
        let slug = derive_slug(&tenant.name, id);
        if self.slugs.contains_key(&slug) {
            return Err(StoreError::Conflict(format!("Tenant slug '{slug}'")));
        }
        let record = Tenant {
            id,
            slug: slug.clone(),
            name: tenant.name,
            kind: tenant.kind,
            branding: Branding::default(),
            created_at: Utc::now(),
        };
        self.slugs.insert(slug, id.0);
        self.tenants.insert(id.0, record.clone());
        Ok(record)
    }

    fn assign(
        &mut self,
        ctx: &TenantContext,
        principal_id: i64,
        course_ids: &[i64],
        teacher: bool,
    ) -> StoreResult<usize> {
        if teacher {
            self.teacher(ctx, principal_id)?;
        } else {
            self.student(ctx, principal_id)?;
        }
        for course_id in course_ids {
            self.course(ctx, *course_id)?;
        }
        let links = if teacher {
            &mut self.teacher_courses
        } else {
            &mut self.student_courses
        };
        let added = course_ids
            .iter()
            .filter(|course_id| links.insert((ctx.id(), principal_id, **course_id)))
            .count();
        Ok(added)
    }

    fn schedule_rows<'a>(
        &self,
        ctx: &TenantContext,
        entries: impl Iterator<Item = &'a ScheduleEntry>,
    ) -> Vec<ScheduleRow> {
        let mut rows: Vec<ScheduleRow> = entries
            .filter_map(|entry| {
                let course = self.course(ctx, entry.course_id).ok()?.clone();
                Some(ScheduleRow {
                    entry: entry.clone(),
                    course,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.entry.day_of_week, a.entry.start_time, a.entry.id)
                .cmp(&(b.entry.day_of_week, b.entry.start_time, b.entry.id))
        });
        rows
    }

    fn cat_rows<'a>(&self, ctx: &TenantContext, cats: impl Iterator<Item = &'a CatEvent>) -> Vec<CatRow> {
        let mut rows: Vec<CatRow> = cats
            .filter_map(|cat| {
                let course = self.course(ctx, cat.course_id).ok()?.clone();
                Some(CatRow {
                    cat: cat.clone(),
                    course,
                })
            })
            .collect();
        rows.sort_by(|a, b| (a.cat.cat_datetime, a.cat.id).cmp(&(b.cat.cat_datetime, b.cat.id)));
        rows
    }
}

/// In-process store. One `RwLock` guards all tables, so every trait method
/// runs as a single transaction and constraint checks cannot race inserts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantDirectory for MemoryStore {
    async fn resolve_by_slug(&self, slug: &str) -> StoreResult<Tenant> {
        let tables = self.tables.read();
        let id = tables
            .slugs
            .get(slug)
            .ok_or_else(|| StoreError::NotFound("Tenant".into()))?;
        tables.tenant(TenantId(*id)).cloned()
    }

    async fn get_tenant(&self, id: TenantId) -> StoreResult<Tenant> {
        self.tables.read().tenant(id).cloned()
    }

    async fn create_tenant(&self, tenant: NewTenant) -> StoreResult<Tenant> {
        let created = self.tables.write().insert_tenant(tenant)?;
        debug!(tenant_id = %created.id, slug = %created.slug, "tenant created");
        Ok(created)
    }

    async fn create_tenant_with_admin(
        &self,
        tenant: NewTenant,
        admin: NewAdmin,
    ) -> StoreResult<(Tenant, Admin)> {
        let mut tables = self.tables.write();
        let email = admin.email.trim().to_lowercase();
        if tables.admins.values().any(|a| a.email == email) {
            return Err(StoreError::Conflict("Admin email".into()));
        }
        let created = tables.insert_tenant(tenant)?;
        let admin = Admin {
            id: tables.principal_seq.next(),
            tenant_id: created.id,
            email,
            password_hash: admin.password_hash,
            fullname: admin.fullname,
            phone_number: admin.phone_number,
            created_at: Utc::now(),
        };
        tables.admins.insert(admin.id, admin.clone());
        debug!(tenant_id = %created.id, slug = %created.slug, "tenant created with admin");
        Ok((created, admin))
    }

    async fn update_branding(
        &self,
        ctx: &TenantContext,
        update: BrandingUpdate,
    ) -> StoreResult<Tenant> {
        let mut tables = self.tables.write();
        let tenant = tables
            .tenants
            .get_mut(&ctx.id())
            .ok_or_else(|| StoreError::NotFound("Tenant".into()))?;
        update.apply(&mut tenant.branding);
        Ok(tenant.clone())
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn insert_student(&self, ctx: &TenantContext, student: NewStudent) -> StoreResult<Student> {
        let mut tables = self.tables.write();
        tables.tenant(ctx.tenant_id)?;
        if tables
            .students
            .values()
            .any(|s| s.tenant_id == ctx.tenant_id && s.username == student.username)
        {
            return Err(StoreError::Conflict("Username".into()));
        }
        let record = Student {
            id: tables.principal_seq.next(),
            tenant_id: ctx.tenant_id,
            username: student.username,
            password_hash: student.password_hash,
            fullname: student.fullname,
            registration_number: student.registration_number,
            department: student.department,
            age: student.age,
            year: student.year,
            created_at: Utc::now(),
        };
        tables.students.insert(record.id, record.clone());
        Ok(record)
    }

    async fn insert_teacher(&self, ctx: &TenantContext, teacher: NewTeacher) -> StoreResult<Teacher> {
        let mut tables = self.tables.write();
        tables.tenant(ctx.tenant_id)?;
        if tables
            .teachers
            .values()
            .any(|t| t.tenant_id == ctx.tenant_id && t.username == teacher.username)
        {
            return Err(StoreError::Conflict("Username".into()));
        }
        let record = Teacher {
            id: tables.principal_seq.next(),
            tenant_id: ctx.tenant_id,
            username: teacher.username,
            password_hash: teacher.password_hash,
            fullname: teacher.fullname,
            employee_id: teacher.employee_id,
            subject: teacher.subject,
            department: teacher.department,
            age: teacher.age,
            year: teacher.year,
            created_at: Utc::now(),
        };
        tables.teachers.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_username(&self, role: Role, username: &str) -> StoreResult<Vec<PrincipalRecord>> {
        let tables = self.tables.read();
        let slug_of = |tenant_id: TenantId| tables.tenants.get(&tenant_id.0).map(|t| t.slug.clone());
        let records = match role {
            Role::Student => tables
                .students
                .values()
                .filter(|s| s.username == username)
                .filter_map(|s| {
                    Some(PrincipalRecord {
                        id: s.id,
                        tenant_id: s.tenant_id,
                        tenant_slug: slug_of(s.tenant_id)?,
                        role,
                        password_hash: s.password_hash.clone(),
                        fullname: s.fullname.clone(),
                        department: s.department.clone(),
                    })
                })
                .collect(),
            Role::Teacher => tables
                .teachers
                .values()
                .filter(|t| t.username == username)
                .filter_map(|t| {
                    Some(PrincipalRecord {
                        id: t.id,
                        tenant_id: t.tenant_id,
                        tenant_slug: slug_of(t.tenant_id)?,
                        role,
                        password_hash: t.password_hash.clone(),
                        fullname: t.fullname.clone(),
                        department: t.department.clone(),
                    })
                })
                .collect(),
            Role::Admin => Vec::new(),
        };
        Ok(records)
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<(Admin, String)>> {
        let tables = self.tables.read();
        let email = email.trim().to_lowercase();
        Ok(tables
            .admins
            .values()
            .find(|a| a.email == email)
            .and_then(|a| {
                let slug = tables.tenants.get(&a.tenant_id.0)?.slug.clone();
                Some((a.clone(), slug))
            }))
    }

    async fn get_student(&self, ctx: &TenantContext, id: i64) -> StoreResult<Student> {
        self.tables.read().student(ctx, id).cloned()
    }

    async fn get_teacher(&self, ctx: &TenantContext, id: i64) -> StoreResult<Teacher> {
        self.tables.read().teacher(ctx, id).cloned()
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn create_course(&self, ctx: &TenantContext, course: NewCourse) -> StoreResult<Course> {
        let mut tables = self.tables.write();
        tables.tenant(ctx.tenant_id)?;
        if tables
            .courses
            .values()
            .any(|c| c.tenant_id == ctx.tenant_id && c.code.eq_ignore_ascii_case(&course.code))
        {
            return Err(StoreError::Conflict(format!("Course code '{}'", course.code)));
        }
        let record = Course {
            id: tables.course_seq.next(),
            tenant_id: ctx.tenant_id,
            name: course.name,
            code: course.code,
            department: course.department,
        };
        tables.courses.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_course(&self, ctx: &TenantContext, id: i64) -> StoreResult<Course> {
        self.tables.read().course(ctx, id).cloned()
    }

    async fn list_courses(&self, ctx: &TenantContext) -> StoreResult<Vec<Course>> {
        let tables = self.tables.read();
        Ok(tables
            .courses
            .values()
            .filter(|c| c.tenant_id == ctx.tenant_id)
            .cloned()
            .collect())
    }

    async fn list_courses_by_department(
        &self,
        ctx: &TenantContext,
        department: &str,
    ) -> StoreResult<Vec<Course>> {
        let tables = self.tables.read();
        Ok(tables
            .courses
            .values()
            .filter(|c| c.tenant_id == ctx.tenant_id)
            .filter(|c| {
                c.department
                    .as_deref()
                    .is_some_and(|d| d.eq_ignore_ascii_case(department))
            })
            .cloned()
            .collect())
    }

    async fn assign_teacher_courses(
        &self,
        ctx: &TenantContext,
        teacher_id: i64,
        course_ids: &[i64],
    ) -> StoreResult<usize> {
        self.tables.write().assign(ctx, teacher_id, course_ids, true)
    }

    async fn unassign_teacher_course(
        &self,
        ctx: &TenantContext,
        teacher_id: i64,
        course_id: i64,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write();
        tables.teacher(ctx, teacher_id)?;
        if tables.teacher_courses.remove(&(ctx.id(), teacher_id, course_id)) {
            Ok(())
        } else {
            Err(StoreError::NotFound("Course assignment".into()))
        }
    }

    async fn teacher_courses(&self, ctx: &TenantContext, teacher_id: i64) -> StoreResult<Vec<Course>> {
        let tables = self.tables.read();
        tables.teacher(ctx, teacher_id)?;
        Ok(tables.linked_courses(&tables.teacher_courses, ctx, teacher_id))
    }

    async fn assign_student_courses(
        &self,
        ctx: &TenantContext,
        student_id: i64,
        course_ids: &[i64],
    ) -> StoreResult<usize> {
        self.tables.write().assign(ctx, student_id, course_ids, false)
    }

    async fn student_courses(&self, ctx: &TenantContext, student_id: i64) -> StoreResult<Vec<Course>> {
        let tables = self.tables.read();
        tables.student(ctx, student_id)?;
        Ok(tables.linked_courses(&tables.student_courses, ctx, student_id))
    }

    async fn teacher_enrolments(
        &self,
        ctx: &TenantContext,
        teacher_id: i64,
    ) -> StoreResult<Vec<EnrolmentRow>> {
        let tables = self.tables.read();
        tables.teacher(ctx, teacher_id)?;
        let mut rows = Vec::new();
        for course in tables.linked_courses(&tables.teacher_courses, ctx, teacher_id) {
            for (tenant, student_id, course_id) in tables.student_courses.iter() {
                if *tenant != ctx.id() || *course_id != course.id {
                    continue;
                }
                if let Ok(student) = tables.student(ctx, *student_id) {
                    rows.push(EnrolmentRow {
                        student: student.clone(),
                        course: course.clone(),
                    });
                }
            }
        }
        rows.sort_by(|a, b| {
            (&a.course.name, &a.student.fullname, a.student.id)
                .cmp(&(&b.course.name, &b.student.fullname, b.student.id))
        });
        Ok(rows)
    }

    async fn teacher_roster_rows(&self, ctx: &TenantContext) -> StoreResult<Vec<TeacherCourseRow>> {
        let tables = self.tables.read();
        let mut teachers: Vec<&Teacher> = tables
            .teachers
            .values()
            .filter(|t| t.tenant_id == ctx.tenant_id)
            .collect();
        teachers.sort_by(|a, b| (&a.fullname, a.id).cmp(&(&b.fullname, b.id)));

        let mut rows = Vec::new();
        for teacher in teachers {
            let courses = tables.linked_courses(&tables.teacher_courses, ctx, teacher.id);
            if courses.is_empty() {
                rows.push(TeacherCourseRow {
                    teacher: teacher.clone(),
                    course: None,
                    student_count: 0,
                });
            }
            for course in courses {
                rows.push(TeacherCourseRow {
                    teacher: teacher.clone(),
                    student_count: tables.enrolment_count(ctx, course.id),
                    course: Some(course),
                });
            }
        }
        Ok(rows)
    }

    async fn student_roster_rows(&self, ctx: &TenantContext) -> StoreResult<Vec<StudentCourseRow>> {
        let tables = self.tables.read();
        let mut students: Vec<&Student> = tables
            .students
            .values()
            .filter(|s| s.tenant_id == ctx.tenant_id)
            .collect();
        students.sort_by(|a, b| (&a.fullname, a.id).cmp(&(&b.fullname, b.id)));

        let mut rows = Vec::new();
        for student in students {
            let courses = tables.linked_courses(&tables.student_courses, ctx, student.id);
            if courses.is_empty() {
                rows.push(StudentCourseRow {
                    student: student.clone(),
                    course: None,
                });
            }
            for course in courses {
                rows.push(StudentCourseRow {
                    student: student.clone(),
                    course: Some(course),
                });
            }
        }
        Ok(rows)
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn add_schedule_entry(
        &self,
        ctx: &TenantContext,
        entry: NewScheduleEntry,
    ) -> StoreResult<ScheduleEntry> {
        let mut tables = self.tables.write();
        tables.teacher(ctx, entry.teacher_id)?;
        tables.course(ctx, entry.course_id)?;
        let record = ScheduleEntry {
            id: tables.schedule_seq.next(),
            tenant_id: ctx.tenant_id,
            teacher_id: entry.teacher_id,
            course_id: entry.course_id,
            day_of_week: entry.day_of_week,
            start_time: entry.start_time,
            end_time: entry.end_time,
            venue: entry.venue,
            semester: entry.semester,
            created_at: Utc::now(),
        };
        tables.schedules.insert(record.id, record.clone());
        Ok(record)
    }

    async fn teacher_schedule(&self, ctx: &TenantContext, teacher_id: i64) -> StoreResult<Vec<ScheduleRow>> {
        let tables = self.tables.read();
        tables.teacher(ctx, teacher_id)?;
        let entries = tables
            .schedules
            .values()
            .filter(|e| e.tenant_id == ctx.tenant_id && e.teacher_id == teacher_id);
        Ok(tables.schedule_rows(ctx, entries))
    }

    async fn student_classes(&self, ctx: &TenantContext, student_id: i64) -> StoreResult<Vec<ScheduleRow>> {
        let tables = self.tables.read();
        tables.student(ctx, student_id)?;
        let enrolled: BTreeSet<i64> = tables
            .linked_courses(&tables.student_courses, ctx, student_id)
            .into_iter()
            .map(|c| c.id)
            .collect();
        let entries = tables
            .schedules
            .values()
            .filter(|e| e.tenant_id == ctx.tenant_id && enrolled.contains(&e.course_id));
        Ok(tables.schedule_rows(ctx, entries))
    }
}

#[async_trait]
impl CatStore for MemoryStore {
    async fn create_cat(&self, ctx: &TenantContext, cat: NewCat) -> StoreResult<(CatEvent, bool)> {
        let mut tables = self.tables.write();
        tables.course(ctx, cat.course_id)?;
        tables.teacher(ctx, cat.teacher_id)?;
        if let Some(existing) = tables.cats.values().find(|c| {
            c.tenant_id == ctx.tenant_id
                && c.course_id == cat.course_id
                && c.teacher_id == cat.teacher_id
                && c.cat_datetime == cat.cat_datetime
        }) {
            return Ok((existing.clone(), false));
        }
        let record = CatEvent {
            id: tables.cat_seq.next(),
            tenant_id: ctx.tenant_id,
            course_id: cat.course_id,
            teacher_id: cat.teacher_id,
            cat_datetime: cat.cat_datetime,
        };
        tables.cats.insert(record.id, record.clone());
        Ok((record, true))
    }

    async fn get_cat(&self, ctx: &TenantContext, id: i64) -> StoreResult<CatEvent> {
        self.tables.read().cat(ctx, id).cloned()
    }

    async fn reschedule_cat(
        &self,
        ctx: &TenantContext,
        id: i64,
        cat_datetime: DateTime<Utc>,
    ) -> StoreResult<CatEvent> {
        let mut tables = self.tables.write();
        let current = tables.cat(ctx, id)?.clone();
        if tables.cats.values().any(|c| {
            c.id != id
                && c.tenant_id == ctx.tenant_id
                && c.course_id == current.course_id
                && c.teacher_id == current.teacher_id
                && c.cat_datetime == cat_datetime
        }) {
            return Err(StoreError::Conflict("CAT".into()));
        }
        let cat = tables
            .cats
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("CAT".into()))?;
        cat.cat_datetime = cat_datetime;
        Ok(cat.clone())
    }

    async fn delete_cat(&self, ctx: &TenantContext, id: i64) -> StoreResult<CatEvent> {
        let mut tables = self.tables.write();
        tables.cat(ctx, id)?;
        tables
            .cats
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound("CAT".into()))
    }

    async fn teacher_cats(&self, ctx: &TenantContext, teacher_id: i64) -> StoreResult<Vec<CatRow>> {
        let tables = self.tables.read();
        tables.teacher(ctx, teacher_id)?;
        let cats = tables
            .cats
            .values()
            .filter(|c| c.tenant_id == ctx.tenant_id && c.teacher_id == teacher_id);
        Ok(tables.cat_rows(ctx, cats))
    }

    async fn student_cats(&self, ctx: &TenantContext, student_id: i64) -> StoreResult<Vec<CatRow>> {
        let tables = self.tables.read();
        tables.student(ctx, student_id)?;
        let enrolled: BTreeSet<i64> = tables
            .linked_courses(&tables.student_courses, ctx, student_id)
            .into_iter()
            .map(|c| c.id)
            .collect();
        let cats = tables
            .cats
            .values()
            .filter(|c| c.tenant_id == ctx.tenant_id && enrolled.contains(&c.course_id));
        Ok(tables.cat_rows(ctx, cats))
    }
}
