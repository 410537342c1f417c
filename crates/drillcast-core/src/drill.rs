//! Drill request validation and SMS composition.

use crate::error::ValidationError;

/// Validate a start-drill / send-alert request.
///
/// `kind` and `class` are required; the message and initiator may be
/// empty. Rejection happens before any store mutation.
pub fn validate_request(kind: &str, class: &str) -> Result<(), ValidationError> {
    if kind.trim().is_empty() {
        return Err(ValidationError::MissingField("kind"));
    }
    if class.trim().is_empty() {
        return Err(ValidationError::MissingField("class"));
    }
    Ok(())
}

/// Compose the SMS body sent to a parent contact.
///
/// An empty initiator falls back to "School" so the text never reads
/// as coming from nobody.
pub fn sms_body(kind: &str, message: &str, started_by: &str) -> String {
    let from = if started_by.trim().is_empty() { "School" } else { started_by };
    format!("{kind} Alert: {message} - Your child's school: {from}. Please remain calm.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_class_are_required() {
        assert_eq!(validate_request("", "ClassA"), Err(ValidationError::MissingField("kind")));
        assert_eq!(validate_request("fire", "  "), Err(ValidationError::MissingField("class")));
        assert_eq!(validate_request("fire", "ClassA"), Ok(()));
    }

    #[test]
    fn sms_body_includes_kind_message_and_initiator() {
        let body = sms_body("fire", "Evacuate now", "Ms. Iyer");
        assert!(body.starts_with("fire Alert: Evacuate now"));
        assert!(body.contains("Ms. Iyer"));
    }

    #[test]
    fn sms_body_falls_back_to_school() {
        let body = sms_body("fire", "Evacuate", "");
        assert!(body.contains("Your child's school: School"));
    }
}
