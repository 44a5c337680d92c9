//! Shared data models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::intent::Hints;

/// Chat request payload for `POST /get_response`.
///
/// The boolean hints are computed client-side; see [`Hints`].
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "Prompt is required"))]
    pub prompt: String,
    // The client sends this one key in snake_case.
    #[serde(default, rename = "chat_id")]
    pub chat_id: Option<Uuid>,
    #[serde(default)]
    pub is_direct_document_request: bool,
    #[serde(default)]
    pub contains_document_type: bool,
    #[serde(default)]
    pub contains_document_word: bool,
    #[serde(default)]
    pub contains_interrogative: bool,
    #[serde(default)]
    pub starts_with_interrogative: bool,
    #[serde(default)]
    pub requested_doc_type: Option<String>,
}

impl ChatRequest {
    pub fn hints(&self) -> Hints {
        Hints {
            is_direct_document_request: self.is_direct_document_request,
            contains_document_type: self.contains_document_type,
            contains_document_word: self.contains_document_word,
            contains_interrogative: self.contains_interrogative,
            starts_with_interrogative: self.starts_with_interrogative,
            requested_doc_type: self.requested_doc_type.clone(),
        }
    }
}

/// Chat response payload. Flags are omitted unless set so the client
/// only reacts to what a given turn actually decided.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_form_button: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggest_form: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggest_all_documents: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggest_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
}

impl ChatResponse {
    pub fn text(response: String) -> Self {
        Self {
            response,
            ..Default::default()
        }
    }
}

/// Limit details attached to a 429 submission rejection.
#[derive(Debug, Serialize)]
pub struct LimitInfo {
    pub document_type: String,
    pub used: i64,
    pub limit: i64,
    pub reset_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_defaults() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"prompt":"hello"}"#).unwrap();
        assert_eq!(request.prompt, "hello");
        assert!(!request.is_direct_document_request);
        assert!(request.requested_doc_type.is_none());
    }

    #[test]
    fn test_chat_request_hints_carry_over() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"prompt":"I need a barangay clearance","isDirectDocumentRequest":true,"containsDocumentType":true,"requestedDocType":"barangay clearance"}"#,
        )
        .unwrap();
        let hints = request.hints();
        assert!(hints.is_direct_document_request);
        assert_eq!(hints.requested_doc_type.as_deref(), Some("barangay clearance"));
    }

    #[test]
    fn test_empty_prompt_fails_validation() {
        let request: ChatRequest = serde_json::from_str(r#"{"prompt":""}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_response_flags_omitted_when_unset() {
        let response = ChatResponse::text("hi".to_string());
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"response":"hi"}"#);
    }
}
