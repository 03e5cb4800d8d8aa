//! Mutation form controller.
//!
//! Owns the dialog state around a create/edit request: local validation
//! that blocks submission, a submitting flag that debounces the button,
//! and the close-only-on-success rule. Server-side rejections land back
//! in the same per-field error list the local validation uses, with the
//! user's input untouched.

use chairside_core::{FieldError, ImageCategory, MAX_RETENTION_YEARS, MIN_RETENTION_YEARS};

use crate::policies::CreatePolicyRequest;
use crate::Error;

/// Editable model behind a mutation form.
pub trait FormModel {
    /// The request produced on successful validation.
    type Request;

    /// Validate the current input, returning one error per offending
    /// field. An empty result permits submission.
    fn validate(&self) -> Vec<FieldError>;

    /// Build the request from the validated input.
    fn to_request(&self) -> Self::Request;
}

/// What [`FormState::resolve`] did with the submission outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    /// The mutation succeeded; the dialog is closed.
    Closed,
    /// The mutation failed; the dialog stays open with errors shown.
    StillOpen,
}

/// Dialog state wrapped around a [`FormModel`].
#[derive(Debug, Clone)]
pub struct FormState<M> {
    model: M,
    errors: Vec<FieldError>,
    general_error: Option<String>,
    submitting: bool,
    open: bool,
}

impl<M: FormModel> FormState<M> {
    /// Open the dialog over the given model.
    #[must_use]
    pub fn open(model: M) -> Self {
        Self {
            model,
            errors: Vec::new(),
            general_error: None,
            submitting: false,
            open: true,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access for input binding. Editing does not clear errors;
    /// they stand until the next submit attempt.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// The error shown for one field, if any.
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Non-field error from the last failed submit.
    pub fn general_error(&self) -> Option<&str> {
        self.general_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Cancel closes unconditionally; any in-flight response is ignored
    /// because the form is no longer submitting.
    pub fn cancel(&mut self) {
        self.open = false;
        self.submitting = false;
    }

    /// Attempt to submit.
    ///
    /// Returns the request to send when validation passes; otherwise the
    /// field errors are recorded and nothing leaves the form. A second
    /// call while a submission is in flight is a no-op.
    pub fn begin_submit(&mut self) -> Option<M::Request> {
        if self.submitting {
            return None;
        }
        let errors = self.model.validate();
        if !errors.is_empty() {
            self.errors = errors;
            return None;
        }
        self.errors.clear();
        self.general_error = None;
        self.submitting = true;
        Some(self.model.to_request())
    }

    /// Apply the server's response to the submission.
    ///
    /// Success closes the dialog. Any failure keeps it open with the
    /// input intact: validation envelopes map onto per-field errors,
    /// everything else lands in the general error slot.
    pub fn resolve(&mut self, outcome: Result<(), Error>) -> FormOutcome {
        self.submitting = false;
        match outcome {
            Ok(()) => {
                self.open = false;
                FormOutcome::Closed
            }
            Err(error) => {
                let fields = error.field_errors();
                if fields.is_empty() {
                    self.general_error = Some(error.to_string());
                } else {
                    self.errors = fields.to_vec();
                }
                FormOutcome::StillOpen
            }
        }
    }
}

/// Input model for creating a retention policy.
///
/// Numeric fields are kept as raw text so a half-typed value survives a
/// failed validation pass.
#[derive(Debug, Clone, Default)]
pub struct PolicyForm {
    pub name: String,
    pub description: String,
    pub categories: Vec<ImageCategory>,
    pub retention_years: String,
    pub minor_extension_years: String,
    pub archive_after_years: String,
    pub notify_before_archive_days: String,
    pub auto_extend_on_access: bool,
    pub is_default: bool,
}

fn parse_optional_u32(input: &str, field: &str, errors: &mut Vec<FieldError>) -> Option<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(field, "Must be a whole number"));
            None
        }
    }
}

fn u32_input(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl PolicyForm {
    /// Prefill the form from an existing policy, i.e. open it in edit
    /// mode. An empty form is the create flow.
    #[must_use]
    pub fn from_policy(policy: &chairside_core::RetentionPolicy) -> Self {
        Self {
            name: policy.name.clone(),
            description: policy.description.clone().unwrap_or_default(),
            categories: policy.categories.clone(),
            retention_years: policy.retention_years.to_string(),
            minor_extension_years: u32_input(policy.minor_extension_years),
            archive_after_years: u32_input(policy.archive_after_years),
            notify_before_archive_days: u32_input(policy.notify_before_archive_days),
            auto_extend_on_access: policy.auto_extend_on_access,
            is_default: policy.is_default,
        }
    }

    fn parse(&self) -> (CreatePolicyRequest, Vec<FieldError>) {
        let mut errors = Vec::new();

        let name = self.name.trim().to_owned();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }

        let retention_years =
            parse_optional_u32(&self.retention_years, "retentionYears", &mut errors);
        let retention_years = match retention_years {
            Some(years) if (MIN_RETENTION_YEARS..=MAX_RETENTION_YEARS).contains(&years) => years,
            Some(_) => {
                errors.push(FieldError::new(
                    "retentionYears",
                    "Retention must be between 1 and 100 years",
                ));
                0
            }
            None => {
                if self.retention_years.trim().is_empty() {
                    errors.push(FieldError::new("retentionYears", "Retention is required"));
                }
                0
            }
        };

        let minor_extension_years =
            parse_optional_u32(&self.minor_extension_years, "minorExtensionYears", &mut errors);
        let archive_after_years =
            parse_optional_u32(&self.archive_after_years, "archiveAfterYears", &mut errors);
        if let Some(archive) = archive_after_years
            && retention_years > 0
            && archive >= retention_years
        {
            errors.push(FieldError::new(
                "archiveAfterYears",
                "Archive threshold must be earlier than the retention period",
            ));
        }

        let notify_before_archive_days = parse_optional_u32(
            &self.notify_before_archive_days,
            "notifyBeforeArchiveDays",
            &mut errors,
        );
        if let Some(days) = notify_before_archive_days
            && !(1..=365).contains(&days)
        {
            errors.push(FieldError::new(
                "notifyBeforeArchiveDays",
                "Notice must be between 1 and 365 days",
            ));
        }

        let description = self.description.trim();
        let request = CreatePolicyRequest {
            name,
            description: (!description.is_empty()).then(|| description.to_owned()),
            categories: self.categories.clone(),
            retention_years,
            minor_extension_years,
            archive_after_years,
            notify_before_archive_days,
            auto_extend_on_access: self.auto_extend_on_access,
            is_default: self.is_default,
        };
        (request, errors)
    }
}

impl FormModel for PolicyForm {
    type Request = CreatePolicyRequest;

    fn validate(&self) -> Vec<FieldError> {
        self.parse().1
    }

    fn to_request(&self) -> CreatePolicyRequest {
        self.parse().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> PolicyForm {
        PolicyForm {
            name: "Standard 7-Year".to_owned(),
            retention_years: "7".to_owned(),
            archive_after_years: "5".to_owned(),
            notify_before_archive_days: "60".to_owned(),
            ..PolicyForm::default()
        }
    }

    #[test]
    fn invalid_input_blocks_submission() {
        let mut form = FormState::open(PolicyForm {
            retention_years: "0".to_owned(),
            ..PolicyForm::default()
        });

        assert!(form.begin_submit().is_none());
        assert!(!form.is_submitting());
        assert!(form.error_for("name").is_some());
        assert!(form.error_for("retentionYears").is_some());
        // The dialog stays open with the input intact.
        assert!(form.is_open());
        assert_eq!(form.model().retention_years, "0");
    }

    #[test]
    fn archive_threshold_must_precede_retention() {
        let mut form = FormState::open(PolicyForm {
            archive_after_years: "7".to_owned(),
            ..valid_form()
        });
        assert!(form.begin_submit().is_none());
        assert!(form.error_for("archiveAfterYears").is_some());
    }

    #[test]
    fn valid_input_produces_request_and_success_closes() {
        let mut form = FormState::open(valid_form());

        let request = form.begin_submit().expect("form should submit");
        assert_eq!(request.retention_years, 7);
        assert_eq!(request.archive_after_years, Some(5));
        assert!(form.is_submitting());

        // Double-click while in flight does nothing.
        assert!(form.begin_submit().is_none());

        assert_eq!(form.resolve(Ok(())), FormOutcome::Closed);
        assert!(!form.is_open());
    }

    #[test]
    fn server_rejection_keeps_dialog_open_with_field_errors() {
        let mut form = FormState::open(valid_form());
        form.begin_submit().expect("form should submit");

        let outcome = form.resolve(Err(Error::Api {
            code: "VALIDATION_ERROR".to_owned(),
            message: "Validation failed".to_owned(),
            fields: vec![FieldError::new("name", "Name is already in use")],
        }));

        assert_eq!(outcome, FormOutcome::StillOpen);
        assert!(form.is_open());
        assert!(!form.is_submitting());
        assert_eq!(form.error_for("name"), Some("Name is already in use"));
        assert_eq!(form.model().name, "Standard 7-Year");
    }

    #[test]
    fn editing_prefills_and_validates_the_existing_values() {
        let policy = chairside_core::RetentionPolicy {
            id: "pol_1".to_owned(),
            name: "CBCT 10-Year".to_owned(),
            description: None,
            is_default: false,
            active: true,
            categories: vec![ImageCategory::Cbct],
            retention_years: 10,
            minor_extension_years: None,
            archive_after_years: Some(7),
            notify_before_archive_days: None,
            auto_extend_on_access: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let mut form = FormState::open(PolicyForm::from_policy(&policy));
        assert_eq!(form.model().retention_years, "10");
        assert_eq!(form.model().archive_after_years, "7");

        let request = form.begin_submit().expect("prefilled form is valid");
        assert_eq!(request.retention_years, 10);
        assert_eq!(request.categories, vec![ImageCategory::Cbct]);
        assert!(request.auto_extend_on_access);
    }

    #[test]
    fn non_field_failure_lands_in_general_error() {
        let mut form = FormState::open(valid_form());
        form.begin_submit().expect("form should submit");

        let outcome = form.resolve(Err(Error::Api {
            code: "DUPLICATE_NAME".to_owned(),
            message: "A policy with this name already exists".to_owned(),
            fields: Vec::new(),
        }));

        assert_eq!(outcome, FormOutcome::StillOpen);
        assert!(form.general_error().unwrap().contains("already exists"));
    }
}
