// Request body decoding with field validation.

use campus_auth::AuthError;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

fn friendly_message(code: &str) -> Option<&'static str> {
    match code {
        "required" => Some("is required"),
        "email" => Some("must be a valid email"),
        "length" => Some("has invalid length"),
        "range" => Some("is out of range"),
        _ => None,
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn collect_field_errors(out: &mut Map<String, Value>, prefix: &str, errs: &ValidationErrors) {
    for (field, kind) in errs.errors() {
        let key = join_path(prefix, field);
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = out
                    .entry(key)
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(list) = messages {
                    for e in field_errors {
                        let msg = e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .or_else(|| friendly_message(&e.code).map(str::to_string))
                            .unwrap_or_else(|| e.code.to_string());
                        list.push(Value::String(msg));
                    }
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_field_errors(out, &key, nested),
            ValidationErrorsKind::List(items) => {
                for (idx, nested) in items {
                    collect_field_errors(out, &format!("{key}[{idx}]"), nested);
                }
            }
        }
    }
}

/// `{field: [messages]}` for a failed validation.
pub fn field_errors(errs: &ValidationErrors) -> Value {
    let mut out = Map::new();
    collect_field_errors(&mut out, "", errs);
    Value::Object(out)
}

/// Deserialize `data` into `T` and run its validation rules.
pub fn decode_payload<T>(data: &Value) -> Result<T, AuthError>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_json::from_value(data.clone()).map_err(|e| AuthError::MalformedInput {
        message: "Invalid request body".to_string(),
        fields: Some(json!({ "_schema": [e.to_string()] })),
    })?;

    parsed.validate().map_err(|e| AuthError::MalformedInput {
        message: "Validation failed".to_string(),
        fields: Some(field_errors(&e)),
    })?;

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;
    use validator::Validate;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Signup {
        #[validate(length(min = 2, message = "name must be at least 2 chars"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn valid_payload_decodes() {
        let s: Signup = decode_payload(&json!({"name": "Oak", "email": "a@oak.test"})).unwrap();
        assert_eq!(s.name, "Oak");
        assert_eq!(s.email, "a@oak.test");
    }

    #[test]
    fn shape_errors_are_malformed() {
        let err = decode_payload::<Signup>(&json!({"name": 5})).unwrap_err();
        match err {
            AuthError::MalformedInput { message, fields } => {
                assert_eq!(message, "Invalid request body");
                assert!(fields.unwrap()["_schema"].is_array());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rule_violations_are_reported_per_field() {
        let err = decode_payload::<Signup>(&json!({"name": "O", "email": "nope"})).unwrap_err();
        let AuthError::MalformedInput { fields, .. } = err else {
            panic!("expected malformed input");
        };
        let fields = fields.unwrap();
        assert_eq!(fields["name"], json!(["name must be at least 2 chars"]));
        assert_eq!(fields["email"], json!(["must be a valid email"]));
    }
}
