//! Account forms forwarded to the backend's auth endpoints.
//!
//! Field names follow the backend contract so a validated form can be
//! forwarded as-is.

use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::validation::{collect_field_errors, FieldError};

const SIGNUP_FIELDS: &[&str] = &[
    "email",
    "first_name",
    "last_name",
    "username",
    "phone_number",
    "password",
    "re_password",
];

const SIGNIN_FIELDS: &[&str] = &["email", "password"];

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(email(message = "Please enter a valid email address."))]
    #[serde(default)]
    pub email: String,
    #[validate(length(min = 1, message = "First name is required."))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required."))]
    #[serde(default)]
    pub last_name: String,
    #[validate(length(min = 1, message = "Username is required."))]
    #[serde(default)]
    pub username: String,
    #[validate(length(min = 1, message = "Phone number is required."))]
    #[serde(default)]
    pub phone_number: String,
    #[validate(length(min = 1, message = "Password is required."))]
    #[serde(default)]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    #[serde(default)]
    pub re_password: String,
}

impl SignupForm {
    pub fn check(&self) -> Result<(), Vec<FieldError>> {
        self.validate()
            .map_err(|errors| collect_field_errors(&errors, SIGNUP_FIELDS))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SigninForm {
    #[validate(email(message = "Please enter a valid email address."))]
    #[serde(default)]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    #[serde(default)]
    pub password: String,
}

impl SigninForm {
    pub fn check(&self) -> Result<(), Vec<FieldError>> {
        self.validate()
            .map_err(|errors| collect_field_errors(&errors, SIGNIN_FIELDS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_signup() -> SignupForm {
        SignupForm {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            username: "adaobi".to_string(),
            phone_number: "08012345678".to_string(),
            password: "s3cret-pass".to_string(),
            re_password: "s3cret-pass".to_string(),
        }
    }

    #[test]
    fn test_valid_signup_passes() {
        assert!(valid_signup().check().is_ok());
    }

    #[test]
    fn test_password_mismatch_is_reported_on_confirmation() {
        let mut form = valid_signup();
        form.re_password = "different".to_string();

        let errors = form.check().unwrap_err();
        assert_eq!(errors, vec![FieldError::new("re_password", "Passwords do not match.")]);
    }

    #[test]
    fn test_missing_fields_reported_in_form_order() {
        let form: SignupForm = serde_json::from_value(serde_json::json!({
            "email": "not-an-email",
            "password": "x",
            "re_password": "x"
        }))
        .unwrap();

        let fields: Vec<String> = form.check().unwrap_err().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["email", "first_name", "last_name", "username", "phone_number"]);
    }

    #[test]
    fn test_signin_requires_password() {
        let form = SigninForm { email: "ada@example.com".to_string(), password: String::new() };
        let errors = form.check().unwrap_err();
        assert_eq!(errors[0].message, "Password is required.");
    }
}
