use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Payload of the public contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    /// Name, email and message are required; subject is optional.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_is_optional() {
        let msg = ContactMessage {
            name: "A".into(),
            email: "a@b.com".into(),
            subject: String::new(),
            message: "hi".into(),
        };
        assert!(msg.validate().is_ok());
    }

    #[test]
    fn blank_message_is_rejected() {
        let msg = ContactMessage {
            name: "A".into(),
            email: "a@b.com".into(),
            message: "   ".into(),
            ..Default::default()
        };
        assert_eq!(
            msg.validate(),
            Err(ValidationError::MissingField { field: "message".into() })
        );
    }
}
