use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::assistant::AssistantReply;

const INTERESTS: &[&str] = &[
    "market-research",
    "signal-generation",
    "enterprise-api",
    "custom-solution",
    "general",
];

// Contact form submission
#[derive(Deserialize, Serialize, Clone, Debug, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 2, max = 100, message = "must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 254, message = "must be at most 254 characters")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub company: Option<String>,
    #[validate(custom(function = "validate_interest", message = "must be one of the listed interests"))]
    pub interest: String,
    #[validate(length(min = 10, max = 5000, message = "must be between 10 and 5000 characters"))]
    pub message: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Deserialize, Serialize, Clone, Debug, Validate)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub content: String,
}

// Chatbot request - history is accepted but replies only look at `message`
#[derive(Deserialize, Serialize, Clone, Debug, Validate)]
pub struct ChatbotRequest {
    #[validate(length(min = 1, max = 1000, message = "must be between 1 and 1000 characters"))]
    pub message: String,
    #[serde(default)]
    #[validate(length(max = 10, message = "must contain at most 10 messages"))]
    pub history: Vec<ChatMessage>,
}

#[derive(Serialize, Clone, Debug)]
pub struct ChatbotResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub reply: AssistantReply,
}

fn validate_interest(interest: &str) -> Result<(), ValidationError> {
    if INTERESTS.contains(&interest) {
        return Ok(());
    }
    Err(ValidationError::new("interest"))
}

impl ChatbotRequest {
    /// Validates the request, then each history entry.
    ///
    /// Entries are checked one by one instead of through `nested`: validator
    /// refuses to hold a length error and nested errors under one field.
    pub fn validate_with_history(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        self.history.iter().try_for_each(Validate::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactRequest {
        ContactRequest {
            name: "Test User".to_owned(),
            email: "test@example.com".to_owned(),
            company: Some("Test Company".to_owned()),
            interest: "general".to_owned(),
            message: "Tell me more about the research platform.".to_owned(),
        }
    }

    fn failed_fields(result: Result<(), ValidationErrors>) -> Vec<String> {
        let errors = result.expect_err("expected validation errors");
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        fields
    }

    #[test]
    fn valid_contact_passes() {
        assert!(contact().validate().is_ok());
        let no_company = ContactRequest {
            company: None,
            ..contact()
        };
        assert!(no_company.validate().is_ok());
    }

    #[test]
    fn contact_reports_every_bad_field() {
        let request = ContactRequest {
            name: "A".to_owned(),
            email: "not-an-email".to_owned(),
            company: None,
            interest: "crypto".to_owned(),
            message: "short".to_owned(),
        };

        assert_eq!(
            failed_fields(request.validate()),
            ["email", "interest", "message", "name"]
        );
    }

    #[test]
    fn contact_rejects_long_company_and_bad_email() {
        let request = ContactRequest {
            email: "a b@c.io".to_owned(),
            company: Some("x".repeat(101)),
            ..contact()
        };

        assert_eq!(failed_fields(request.validate()), ["company", "email"]);
    }

    #[test]
    fn every_listed_interest_is_accepted() {
        for interest in INTERESTS {
            let request = ContactRequest {
                interest: (*interest).to_owned(),
                ..contact()
            };
            assert!(request.validate().is_ok(), "{interest} rejected");
        }
    }

    #[test]
    fn chatbot_limits_message_and_history() {
        let empty = ChatbotRequest {
            message: String::new(),
            history: Vec::new(),
        };
        assert_eq!(failed_fields(empty.validate_with_history()), ["message"]);

        let long_history = ChatbotRequest {
            message: "hi".to_owned(),
            history: vec![
                ChatMessage {
                    role: ChatRole::User,
                    content: "hello".to_owned(),
                };
                11
            ],
        };
        assert_eq!(failed_fields(long_history.validate_with_history()), ["history"]);
    }

    #[test]
    fn oversized_history_entry_is_rejected() {
        let request = ChatbotRequest {
            message: "hi".to_owned(),
            history: vec![ChatMessage {
                role: ChatRole::Assistant,
                content: "x".repeat(2001),
            }],
        };
        assert_eq!(failed_fields(request.validate_with_history()), ["content"]);
    }

    #[test]
    fn chatbot_history_is_optional() {
        let request: ChatbotRequest = serde_json::from_str(r#"{"message":"pricing?"}"#).unwrap();
        assert!(request.history.is_empty());
        assert!(request.validate_with_history().is_ok());
    }
}
