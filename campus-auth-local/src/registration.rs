// Principal and school registration.

use std::sync::Arc;
use std::time::Duration;

use campus_auth::{AuthError, AuthResult};
use campus_core::models::{Admin, NewAdmin, NewStudent, NewTeacher};
use campus_core::{
    bounded, NewTenant, PrincipalStore, Role, StoreError, Tenant, TenantContext, TenantDirectory,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::info;
use validator::Validate;

use crate::credentials::CredentialStore;
use crate::payload::decode_payload;

/// Years arrive as `"2024"` from forms and as `2024` from scripts.
fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or a number, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StudentRegistration {
    #[validate(length(min = 1, message = "slug is required"))]
    pub slug: String,
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 6, message = "password must be at least 6 chars"))]
    pub password: String,
    #[validate(length(min = 1, message = "fullname is required"))]
    pub fullname: String,
    #[serde(rename = "registrationNumber", alias = "registration_number")]
    #[validate(length(min = 1, message = "registrationNumber is required"))]
    pub registration_number: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    #[validate(range(max = 150, message = "age is out of range"))]
    pub age: u32,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TeacherRegistration {
    #[validate(length(min = 1, message = "slug is required"))]
    pub slug: String,
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 6, message = "password must be at least 6 chars"))]
    pub password: String,
    #[validate(length(min = 1, message = "fullname is required"))]
    pub fullname: String,
    #[serde(rename = "employeeId", alias = "employee_id")]
    #[validate(length(min = 1, message = "employeeId is required"))]
    pub employee_id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    #[validate(range(max = 150, message = "age is out of range"))]
    pub age: u32,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: String,
}

/// A registration body, tagged by its `role` field.
#[derive(Debug, Clone)]
pub enum RegistrationRequest {
    Student(StudentRegistration),
    Teacher(TeacherRegistration),
}

impl RegistrationRequest {
    /// Read the `role` tag first, then decode the body for that role.
    pub fn parse(body: &Value) -> AuthResult<Self> {
        let role = match body.get("role") {
            Some(Value::String(role)) => role.as_str(),
            Some(_) => return Err(AuthError::malformed("role must be a string")),
            None => return Err(AuthError::malformed("role is required")),
        };
        match role {
            "student" => decode_payload(body).map(RegistrationRequest::Student),
            "teacher" => decode_payload(body).map(RegistrationRequest::Teacher),
            other => Err(AuthError::UnsupportedRole(other.to_string())),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RegistrationRequest::Student(_) => Role::Student,
            RegistrationRequest::Teacher(_) => Role::Teacher,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            RegistrationRequest::Student(s) => &s.slug,
            RegistrationRequest::Teacher(t) => &t.slug,
        }
    }
}

/// `POST /schoolregistration` body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SchoolRegistration {
    #[validate(length(min = 2, message = "name must be at least 2 chars"))]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[validate(email(message = "email must be valid"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 chars"))]
    pub password: String,
    #[serde(alias = "phone_number", default)]
    pub phonenumber: String,
    #[serde(default)]
    pub fullname: Option<String>,
}

/// A newly registered student or teacher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub id: i64,
    pub role: Role,
    pub tenant: TenantContext,
}

/// Creates principals and schools.
pub struct Registrar {
    tenants: Arc<dyn TenantDirectory>,
    principals: Arc<dyn PrincipalStore>,
    credentials: CredentialStore,
    storage_timeout: Duration,
}

impl Registrar {
    pub fn new(
        tenants: Arc<dyn TenantDirectory>,
        principals: Arc<dyn PrincipalStore>,
        credentials: CredentialStore,
    ) -> Self {
        Self {
            tenants,
            principals,
            credentials,
            storage_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    /// Register a student or teacher under the school named by the body's slug.
    pub async fn register(&self, body: &Value) -> AuthResult<Registered> {
        let request = RegistrationRequest::parse(body)?;

        let tenant = bounded(self.storage_timeout, self.tenants.resolve_by_slug(request.slug()))
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => AuthError::UnknownTenant(request.slug().to_string()),
                other => AuthError::from(other),
            })?;
        let ctx = tenant.context();

        let registered = match request {
            RegistrationRequest::Student(s) => {
                let password_hash = self.credentials.hash(&s.password).await?;
                let student = NewStudent {
                    username: s.username,
                    password_hash,
                    fullname: s.fullname,
                    registration_number: s.registration_number,
                    department: s.department,
                    age: s.age,
                    year: s.year,
                };
                let row = bounded(
                    self.storage_timeout,
                    self.principals.insert_student(&ctx, student),
                )
                .await?;
                Registered {
                    id: row.id,
                    role: Role::Student,
                    tenant: ctx,
                }
            }
            RegistrationRequest::Teacher(t) => {
                let password_hash = self.credentials.hash(&t.password).await?;
                let teacher = NewTeacher {
                    username: t.username,
                    password_hash,
                    fullname: t.fullname,
                    employee_id: t.employee_id,
                    subject: t.subject,
                    department: t.department,
                    age: t.age,
                    year: t.year,
                };
                let row = bounded(
                    self.storage_timeout,
                    self.principals.insert_teacher(&ctx, teacher),
                )
                .await?;
                Registered {
                    id: row.id,
                    role: Role::Teacher,
                    tenant: ctx,
                }
            }
        };

        info!(
            principal_id = registered.id,
            role = %registered.role,
            tenant_id = registered.tenant.id(),
            "principal registered"
        );
        Ok(registered)
    }

    /// Create a school and its administrator account in one step.
    pub async fn register_school(&self, body: &Value) -> AuthResult<(Tenant, Admin)> {
        let request: SchoolRegistration = decode_payload(body)?;
        let password_hash = self.credentials.hash(&request.password).await?;

        let tenant = NewTenant {
            name: request.name.trim().to_string(),
            kind: request.kind,
        };
        let admin = NewAdmin {
            email: request.email,
            password_hash,
            fullname: request
                .fullname
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| tenant.name.clone()),
            phone_number: request.phonenumber,
        };

        let (tenant, admin) = bounded(
            self.storage_timeout,
            self.tenants.create_tenant_with_admin(tenant, admin),
        )
        .await?;
        info!(tenant_id = %tenant.id, slug = %tenant.slug, "school registered");
        Ok((tenant, admin))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn student_body() -> Value {
        json!({
            "role": "student",
            "slug": "oak-school-1",
            "username": "bob",
            "password": "hunter22",
            "fullname": "Bob Banda",
            "registrationNumber": "R-001",
            "department": "Science",
            "age": 17,
            "year": "2024"
        })
    }

    #[test]
    fn role_tag_selects_the_variant() {
        let parsed = RegistrationRequest::parse(&student_body()).unwrap();
        assert_eq!(parsed.role(), Role::Student);
        assert_eq!(parsed.slug(), "oak-school-1");
        let RegistrationRequest::Student(s) = parsed else {
            panic!("expected a student");
        };
        assert_eq!(s.registration_number, "R-001");
        assert_eq!(s.year, "2024");
    }

    #[test]
    fn numeric_year_is_accepted() {
        let mut body = student_body();
        body["year"] = json!(2025);
        let RegistrationRequest::Student(s) = RegistrationRequest::parse(&body).unwrap() else {
            panic!("expected a student");
        };
        assert_eq!(s.year, "2025");
    }

    #[test]
    fn missing_or_mistyped_role_is_malformed() {
        let mut body = student_body();
        body.as_object_mut().unwrap().remove("role");
        assert!(matches!(
            RegistrationRequest::parse(&body),
            Err(AuthError::MalformedInput { .. })
        ));

        body["role"] = json!(3);
        assert!(matches!(
            RegistrationRequest::parse(&body),
            Err(AuthError::MalformedInput { .. })
        ));
    }

    #[test]
    fn unknown_roles_are_unsupported() {
        for role in ["admin", "parent", "Student"] {
            let mut body = student_body();
            body["role"] = json!(role);
            match RegistrationRequest::parse(&body) {
                Err(AuthError::UnsupportedRole(r)) => assert_eq!(r, role),
                other => panic!("unexpected result for {role}: {other:?}"),
            }
        }
    }

    #[test]
    fn variant_fields_are_required() {
        let mut body = student_body();
        body["role"] = json!("teacher");
        // A student body lacks employeeId.
        assert!(matches!(
            RegistrationRequest::parse(&body),
            Err(AuthError::MalformedInput { .. })
        ));

        let mut body = student_body();
        body["password"] = json!("123");
        let Err(AuthError::MalformedInput { fields, .. }) = RegistrationRequest::parse(&body) else {
            panic!("expected malformed input");
        };
        assert!(fields.unwrap().get("password").is_some());
    }
}
