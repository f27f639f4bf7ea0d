use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourse {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 32, message = "code must be 1 to 32 chars"))]
    pub code: String,
    #[serde(default)]
    pub department: Option<String>,
}
