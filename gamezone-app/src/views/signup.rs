use gamezone_client::Queries;
use gamezone_core::{FieldError, Member, MemberForm};
use serde::Serialize;

use super::FormError;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SignupForm {
    pub form: MemberForm,
    pub error: Option<FormError>,
}

impl SignupForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local checks run before any request.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.form.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        let email = self.form.email.trim();
        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !email.contains('@') {
            errors.push(FieldError::new("email", "Email must contain @"));
        }
        if self.form.phone_number.trim().is_empty() {
            errors.push(FieldError::new("phoneNumber", "Phone number is required"));
        }
        errors
    }

    pub async fn submit(&mut self, queries: &Queries) -> Result<Member, FormError> {
        let errors = self.validate();
        let result = if errors.is_empty() {
            queries.create_member(&self.form).await.map_err(FormError::from)
        } else {
            Err(FormError::invalid(errors))
        };
        self.error = result.as_ref().err().filter(|e| e.is_shown()).cloned();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_flags_each_field() {
        let mut form = SignupForm::new();
        let errors = form.validate();
        assert_eq!(errors.len(), 3);

        form.form.name = "Ana".into();
        form.form.email = "ana.zone.gg".into();
        form.form.phone_number = "555".into();
        let errors = form.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field.as_deref(), Some("email"));

        form.form.email = "ana@zone.gg".into();
        assert!(form.validate().is_empty());
    }
}
