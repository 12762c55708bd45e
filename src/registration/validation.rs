//! Input validation for intern registration.
//!
//! Errors carry the failing field, a message and an optional suggestion so
//! the applicant can correct the form in one pass.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use super::model::RegistrationRequest;
use crate::certificate::positions::PositionTable;

lazy_static! {
    static ref FULL_NAME: Regex = Regex::new(r"^[A-Za-z]{5,30} [A-Za-z]{5,30}$").unwrap();
    static ref EMAIL: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    static ref MOBILE: Regex = Regex::new(r"^[6-9][0-9]{9}$").unwrap();
    static ref HAS_LETTER: Regex = Regex::new(r"[a-zA-Z]").unwrap();
    static ref HAS_DIGIT: Regex = Regex::new(r"[0-9]").unwrap();
    static ref HAS_SPECIAL: Regex = Regex::new(r"[\W_]").unwrap();
}

const INTERNSHIP_MODES: [&str; 2] = ["Online", "Offline"];
const YES_NO: [&str; 2] = ["Yes", "No"];

/// Validation error with a user-facing message.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    pub message: String,
    /// Suggestion for how to fix the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} is required", label))
            .with_suggestion(format!("Please fill in {}", label.to_lowercase()))
    }

    pub fn invalid_mobile(field: &str) -> Self {
        Self::new(field, "Must be a valid 10-digit number")
            .with_suggestion("Mobile numbers start with 6-9, for example 9876543210")
    }

    pub fn length(field: &str, label: &str, min: usize, max: usize) -> Self {
        Self::new(
            field,
            format!("{} must be between {} and {} characters", label, min, max),
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Single-line summary, e.g. for a toast.
    pub fn summary(&self) -> String {
        match self.errors.as_slice() {
            [] => String::new(),
            [only] => only.message.clone(),
            [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
        }
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) -> bool {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
        return false;
    }
    true
}

pub fn validate_length(
    value: &str,
    field: &str,
    label: &str,
    (min, max): (usize, usize),
    errors: &mut ValidationErrors,
) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.add(ValidationError::length(field, label, min, max));
    }
}

pub fn validate_one_of(
    value: &str,
    field: &str,
    label: &str,
    allowed: &[&str],
    errors: &mut ValidationErrors,
) {
    if !validate_required(value, field, label, errors) {
        return;
    }
    if !allowed.contains(&value) {
        errors.add(
            ValidationError::new(field, format!("'{}' is not a valid {}", value, label.to_lowercase()))
                .with_suggestion(format!("Choose one of: {}", allowed.join(", "))),
        );
    }
}

pub fn validate_full_name(value: &str, field: &str, errors: &mut ValidationErrors) {
    if !validate_required(value, field, "Full Name", errors) {
        return;
    }
    validate_length(value, field, "Full Name", (5, 30), errors);
    if !FULL_NAME.is_match(value) {
        errors.add(
            ValidationError::new(
                field,
                "Full Name must consist of a first name and a last name each containing 5 to 30 characters, separated by a space, and should only contain letters",
            ),
        );
    }
}

pub fn validate_email(value: &str, field: &str, errors: &mut ValidationErrors) {
    if !validate_required(value, field, "Email", errors) {
        return;
    }
    validate_length(value, field, "Email", (5, 50), errors);
    if !EMAIL.is_match(value) {
        errors.add(
            ValidationError::new(field, "Invalid email format")
                .with_suggestion("Use an address like name@example.com"),
        );
    }
}

pub fn validate_mobile(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if !validate_required(value, field, label, errors) {
        return;
    }
    if !MOBILE.is_match(value) {
        errors.add(ValidationError::invalid_mobile(field));
    }
}

pub fn validate_address(value: &str, field: &str, errors: &mut ValidationErrors) {
    if !validate_required(value, field, "Address", errors) {
        return;
    }
    validate_length(value, field, "Address", (5, 30), errors);
    if !HAS_LETTER.is_match(value) {
        errors.add(ValidationError::new(field, "Address must contain at least one letter"));
    }
    if !HAS_DIGIT.is_match(value) {
        errors.add(ValidationError::new(field, "Address must contain at least one number"));
    }
    if !HAS_SPECIAL.is_match(value) {
        errors.add(ValidationError::new(
            field,
            "Address must contain at least one special character",
        ));
    }
}

pub fn validate_batch(value: &str, field: &str, errors: &mut ValidationErrors) {
    if !validate_required(value, field, "Batch number", errors) {
        return;
    }
    validate_length(value, field, "Batch number", (1, 15), errors);
    if value == "0" {
        errors.add(ValidationError::new(field, "Batch number cannot be 0"));
    }
}

impl RegistrationRequest {
    /// Check every field against the registration rules.
    ///
    /// `domains` supplies the accepted internship domains.
    pub fn validate(&self, domains: &PositionTable) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_full_name(&self.full_name, "fullName", &mut errors);
        validate_email(&self.email, "email", &mut errors);
        validate_mobile(&self.mobileno, "mobileno", "Mobile number", &mut errors);
        validate_mobile(
            &self.altmobileno,
            "altmobileno",
            "Alternative mobile number",
            &mut errors,
        );
        if !self.mobileno.is_empty() && self.mobileno == self.altmobileno {
            errors.add(ValidationError::new(
                "altmobileno",
                "Alternative mobile number must be different from mobile number",
            ));
        }
        validate_address(&self.address, "address", &mut errors);
        validate_batch(&self.batchno, "batchno", &mut errors);
        validate_one_of(
            &self.mode_of_internship,
            "modeOfInternship",
            "Mode of internship",
            &INTERNSHIP_MODES,
            &mut errors,
        );
        validate_one_of(
            &self.belonged_to_vasavi_foundation,
            "belongedToVasaviFoundation",
            "Vasavi Foundation answer",
            &YES_NO,
            &mut errors,
        );
        validate_one_of(
            &self.domain,
            "domain",
            "Domain",
            &domains.domains(),
            &mut errors,
        );

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> RegistrationRequest {
        RegistrationRequest {
            full_name: "Sravan Kumar".to_string(),
            email: "sravan.kumar@example.com".to_string(),
            mobileno: "9876543210".to_string(),
            altmobileno: "8765432109".to_string(),
            address: "H.No 4-12, Ameerpet".to_string(),
            batchno: "B12".to_string(),
            mode_of_internship: "Online".to_string(),
            belonged_to_vasavi_foundation: "No".to_string(),
            domain: "Data Science".to_string(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate(&PositionTable::default()).is_ok());
    }

    #[test]
    fn test_empty_request_reports_every_field() {
        let errors = RegistrationRequest::default()
            .validate(&PositionTable::default())
            .unwrap_err();

        for field in [
            "fullName",
            "email",
            "mobileno",
            "altmobileno",
            "address",
            "batchno",
            "modeOfInternship",
            "belongedToVasaviFoundation",
            "domain",
        ] {
            assert!(errors.has_field(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_short_name_part_rejected() {
        let mut request = valid_request();
        request.full_name = "Ravi Kumar".to_string();
        let errors = request.validate(&PositionTable::default()).unwrap_err();
        assert!(errors.has_field("fullName"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_mobile_numbers_must_differ() {
        let mut request = valid_request();
        request.altmobileno = request.mobileno.clone();
        let errors = request.validate(&PositionTable::default()).unwrap_err();
        assert!(errors.has_field("altmobileno"));
    }

    #[test]
    fn test_mobile_must_start_with_six_to_nine() {
        let mut request = valid_request();
        request.mobileno = "5876543210".to_string();
        let errors = request.validate(&PositionTable::default()).unwrap_err();
        assert!(errors.has_field("mobileno"));
        assert!(errors.summary().contains("10-digit"));
    }

    #[test]
    fn test_address_needs_letter_digit_and_special() {
        let mut request = valid_request();
        request.address = "Ameerpet".to_string();
        let errors = request.validate(&PositionTable::default()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.summary().contains("and 1 more"));
    }

    #[test]
    fn test_batch_zero_rejected() {
        let mut request = valid_request();
        request.batchno = "0".to_string();
        let errors = request.validate(&PositionTable::default()).unwrap_err();
        assert!(errors.has_field("batchno"));
    }

    #[test]
    fn test_unknown_domain_rejected() {
        let mut request = valid_request();
        request.domain = "Underwater Basket Weaving".to_string();
        let errors = request.validate(&PositionTable::default()).unwrap_err();
        let error = &errors.errors()[0];
        assert_eq!(error.field, "domain");
        assert!(error.suggestion.as_deref().unwrap().contains("Data Science"));
    }

    #[test]
    fn test_error_display() {
        let error = ValidationError::empty_field("email", "Email");
        assert_eq!(error.to_string(), "[email] Email is required. Please fill in email");
    }
}
