//! Login and signup payloads with the validation rules both the server and
//! the client enforce.
//!
//! Validation is ordered: missing fields are reported before a password
//! mismatch, and a mismatch before unaccepted terms.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a submitted auth form is rejected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Please agree to the terms and conditions")]
    TermsNotAccepted,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.email) || is_blank(&self.password) {
            return Err(ValidationError::MissingFields);
        }
        Ok(())
    }
}

/// Body of `POST /api/auth/signup`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    /// Arrives as a checkbox; URL-encoded forms send `"on"`.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub agree_terms: bool,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.password,
            &self.confirm_password,
        ];
        if required.iter().any(|f| is_blank(f)) {
            return Err(ValidationError::MissingFields);
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if !self.agree_terms {
            return Err(ValidationError::TermsNotAccepted);
        }
        Ok(())
    }

    /// `"<first> <last>"`, the name shown in the user menu.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "on" | "1" | "yes"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signup() -> SignupRequest {
        SignupRequest {
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            email: "asha@example.com".into(),
            phone: "555-0100".into(),
            password: "hunter22".into(),
            confirm_password: "hunter22".into(),
            agree_terms: true,
        }
    }

    #[test]
    fn login_requires_both_fields() {
        let req = LoginRequest {
            email: "a@b.c".into(),
            password: "  ".into(),
        };
        assert_eq!(req.validate(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn signup_accepts_complete_form() {
        assert!(signup().validate().is_ok());
        assert_eq!(signup().display_name(), "Asha Rao");
    }

    #[test]
    fn signup_reports_missing_before_mismatch() {
        let mut req = signup();
        req.phone.clear();
        req.confirm_password = "different".into();
        assert_eq!(req.validate(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn signup_rejects_mismatched_passwords() {
        let mut req = signup();
        req.confirm_password = "hunter23".into();
        assert_eq!(req.validate(), Err(ValidationError::PasswordMismatch));
        assert_eq!(
            ValidationError::PasswordMismatch.to_string(),
            "Passwords do not match"
        );
    }

    #[test]
    fn signup_requires_terms() {
        let mut req = signup();
        req.agree_terms = false;
        assert_eq!(req.validate(), Err(ValidationError::TermsNotAccepted));
    }

    #[test]
    fn signup_decodes_camel_case_and_checkbox_text() {
        let req: SignupRequest = serde_json::from_value(json!({
            "firstName": "Asha",
            "lastName": "Rao",
            "email": "asha@example.com",
            "phone": "555-0100",
            "password": "pw",
            "confirmPassword": "pw",
            "agreeTerms": "on"
        }))
        .unwrap();
        assert!(req.agree_terms);
        assert!(req.validate().is_ok());
    }
}
