use std::fmt;

/// Message shown when the email field is empty.
pub const EMAIL_REQUIRED: &str = "Email is required";
/// Message shown when the email does not look like an address.
pub const EMAIL_INVALID: &str = "Please enter a valid email address";
/// Message shown when the password field is empty.
pub const PASSWORD_REQUIRED: &str = "Password is required";
/// Message shown when the sign-up password is too short.
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
/// Message shown when the confirmation field is empty.
pub const CONFIRM_REQUIRED: &str = "Please confirm your password";
/// Message shown when the confirmation does not match the password.
pub const CONFIRM_MISMATCH: &str = "Passwords do not match";

const MIN_PASSWORD_LEN: usize = 6;

/// Per-field validation failures for a login or sign-up form.
///
/// Rendered inline next to the offending field; a populated value blocks
/// submission before any call reaches the provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Failure on the email field.
    pub email: Option<&'static str>,
    /// Failure on the password field.
    pub password: Option<&'static str>,
    /// Failure on the confirmation field (sign-up only).
    pub confirm_password: Option<&'static str>,
}

impl ValidationErrors {
    /// Whether any field failed validation.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.confirm_password.is_none()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        for msg in [self.email, self.password, self.confirm_password]
            .into_iter()
            .flatten()
        {
            write!(f, "{sep}{msg}")?;
            sep = "; ";
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Basic address shape check: something before an `@`, a dotted domain after
/// it, no whitespace anywhere.
fn looks_like_email(input: &str) -> bool {
    if input.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = input.split_once('@') else {
        return false;
    };
    let Some(dot) = domain.rfind('.') else {
        return false;
    };
    !local.is_empty() && dot > 0 && dot + 1 < domain.len()
}

fn validate_email(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        Some(EMAIL_REQUIRED)
    } else if !looks_like_email(email) {
        Some(EMAIL_INVALID)
    } else {
        None
    }
}

/// Input to the password sign-in form.
#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

impl LoginForm {
    /// Validate the form. Login only requires the password to be present;
    /// length rules apply at sign-up, not here.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors {
            email: validate_email(&self.email),
            ..Default::default()
        };
        if self.password.is_empty() {
            errors.password = Some(PASSWORD_REQUIRED);
        }
        errors.into_result()
    }
}

/// Input to the sign-up form.
#[derive(Clone, Debug, Default)]
pub struct SignupForm {
    /// Email address.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Confirmation of the chosen password.
    pub confirm_password: String,
}

impl SignupForm {
    /// Validate the form: address shape, minimum password length, matching
    /// confirmation.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors {
            email: validate_email(&self.email),
            ..Default::default()
        };
        if self.password.is_empty() {
            errors.password = Some(PASSWORD_REQUIRED);
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.password = Some(PASSWORD_TOO_SHORT);
        }
        if self.confirm_password.is_empty() {
            errors.confirm_password = Some(CONFIRM_REQUIRED);
        } else if self.confirm_password != self.password {
            errors.confirm_password = Some(CONFIRM_MISMATCH);
        }
        errors.into_result()
    }
}

/// Submission lifecycle of a single form.
///
/// `Failed` returns to `Validating` on the next input edit; the error is
/// cleared eagerly rather than waiting for resubmission.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FormPhase {
    /// No interaction yet.
    #[default]
    Idle,
    /// The user is editing; client-side checks run here.
    Validating,
    /// A request to the provider is in flight.
    Submitting,
    /// The provider accepted the submission.
    Success,
    /// The provider rejected the submission.
    Failed(String),
}

impl FormPhase {
    /// The user edited a field. A previous failure is discarded.
    pub fn on_edit(&mut self) {
        match self {
            FormPhase::Idle | FormPhase::Failed(_) => *self = FormPhase::Validating,
            FormPhase::Validating | FormPhase::Submitting | FormPhase::Success => {}
        }
    }

    /// Client-side validation passed and the request was dispatched.
    pub fn on_submit(&mut self) {
        if matches!(self, FormPhase::Idle | FormPhase::Validating) {
            *self = FormPhase::Submitting;
        }
    }

    /// The in-flight request resolved.
    pub fn on_result(&mut self, result: Result<(), String>) {
        if matches!(self, FormPhase::Submitting) {
            *self = match result {
                Ok(()) => FormPhase::Success,
                Err(message) => FormPhase::Failed(message),
            };
        }
    }

    /// The failure message, if the last submission failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            FormPhase::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_rejects_email_without_at_sign() {
        let form = LoginForm {
            email: "not-an-address".into(),
            password: "hunter2".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.email, Some(EMAIL_INVALID));
        assert_eq!(errors.password, None);
    }

    #[test]
    fn login_rejects_empty_password() {
        let form = LoginForm {
            email: "user@example.com".into(),
            password: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.password, Some(PASSWORD_REQUIRED));
        assert_eq!(errors.email, None);
    }

    #[test]
    fn login_rejects_empty_email() {
        let form = LoginForm {
            email: String::new(),
            password: "hunter2".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.email, Some(EMAIL_REQUIRED));
    }

    #[test]
    fn login_accepts_well_formed_input() {
        let form = LoginForm {
            email: "user@example.com".into(),
            password: "hunter2".into(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn signup_rejects_short_password() {
        let form = SignupForm {
            email: "user@example.com".into(),
            password: "abc12".into(),
            confirm_password: "abc12".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.password, Some(PASSWORD_TOO_SHORT));
        assert_eq!(errors.confirm_password, None);
    }

    #[test]
    fn signup_rejects_mismatched_confirmation() {
        let form = SignupForm {
            email: "user@example.com".into(),
            password: "abc123".into(),
            confirm_password: "abc124".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.confirm_password, Some(CONFIRM_MISMATCH));
    }

    #[test]
    fn signup_rejects_missing_confirmation() {
        let form = SignupForm {
            email: "user@example.com".into(),
            password: "abc123".into(),
            confirm_password: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.confirm_password, Some(CONFIRM_REQUIRED));
    }

    #[test]
    fn signup_accepts_well_formed_input() {
        let form = SignupForm {
            email: "user@example.com".into(),
            password: "abc123".into(),
            confirm_password: "abc123".into(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn email_shape_requires_dotted_domain() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a b@c.de"));
        assert!(!looks_like_email("a@.co"));
    }

    #[test]
    fn validation_errors_render_all_messages() {
        let form = SignupForm::default();
        let errors = form.validate().unwrap_err();
        let rendered = errors.to_string();
        assert!(rendered.contains(EMAIL_REQUIRED));
        assert!(rendered.contains(PASSWORD_REQUIRED));
        assert!(rendered.contains(CONFIRM_REQUIRED));
    }

    #[test]
    fn form_phase_clears_failure_on_edit() {
        let mut phase = FormPhase::Failed("Invalid login credentials".into());
        phase.on_edit();
        assert_eq!(phase, FormPhase::Validating);
    }

    #[test]
    fn form_phase_full_cycle() {
        let mut phase = FormPhase::default();
        phase.on_edit();
        assert_eq!(phase, FormPhase::Validating);
        phase.on_submit();
        assert_eq!(phase, FormPhase::Submitting);
        phase.on_result(Ok(()));
        assert_eq!(phase, FormPhase::Success);
    }

    #[test]
    fn form_phase_result_ignored_unless_submitting() {
        let mut phase = FormPhase::Idle;
        phase.on_result(Err("late response".into()));
        assert_eq!(phase, FormPhase::Idle);
    }
}
