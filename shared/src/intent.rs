//! Intent classification for inbound chat messages.
//!
//! Every message resolves to exactly one [`Intent`]. The probes run in
//! a fixed order and the first hit wins: admin credentials, curated
//! knowledge domains, notable places, reference lookups, generic
//! document inquiries, direct document requests, then the freeform
//! completion fallback. The order is inherited behavior; messages that
//! could match several probes deliberately resolve to the earliest.

use crate::config::AdminCredentials;
use crate::documents::{self, DocumentType};
use crate::knowledge::{self, Section};
use crate::places::{self, PlaceQuery};

/// Advisory signals computed by the chat client alongside the prompt.
/// Trusted as hints; the server only re-derives the document type when
/// the client didn't name one.
#[derive(Debug, Clone, Default)]
pub struct Hints {
    pub is_direct_document_request: bool,
    pub contains_document_type: bool,
    pub contains_document_word: bool,
    pub contains_interrogative: bool,
    pub starts_with_interrogative: bool,
    pub requested_doc_type: Option<String>,
}

/// The response strategy selected for a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Two-token admin credential match.
    AdminAuth,
    /// One or more curated knowledge blocks matched.
    Knowledge(Vec<Section>),
    /// Request to see a notable place (or all of them).
    Place(PlaceQuery),
    /// Reference-number lookup with the extracted candidate token.
    Reference(String),
    /// Documents mentioned generically, no specific type named.
    DocumentInquiry,
    /// Direct request for one resolvable document type.
    DocumentRequest(DocumentType),
    /// Fall through to the completion model.
    Freeform,
}

/// Classify one message. Probe order is fixed; see module docs.
pub fn classify(message: &str, hints: &Hints, admin: &AdminCredentials) -> Intent {
    if is_admin_auth(message, admin) {
        return Intent::AdminAuth;
    }

    let sections = knowledge::relevant_sections(message);
    if !sections.is_empty() {
        return Intent::Knowledge(sections);
    }

    if places::is_place_request(message) {
        if let Some(query) = places::detect_place(message) {
            return Intent::Place(query);
        }
    }

    if mentions_reference(message) {
        if let Some(token) = extract_reference_token(message) {
            return Intent::Reference(token);
        }
    }

    if hints.contains_document_word && !hints.contains_document_type {
        return Intent::DocumentInquiry;
    }

    if hints.is_direct_document_request && !hints.starts_with_interrogative {
        let resolved = hints
            .requested_doc_type
            .as_deref()
            .and_then(DocumentType::parse)
            .or_else(|| documents::detect_document_type(message));

        if let Some(doc_type) = resolved {
            return Intent::DocumentRequest(doc_type);
        }
    }

    Intent::Freeform
}

/// Exact two-token, case-sensitive credential match.
fn is_admin_auth(message: &str, admin: &AdminCredentials) -> bool {
    let mut parts = message.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(passphrase), None) => {
            key == admin.key && passphrase == admin.passphrase
        }
        _ => false,
    }
}

fn mentions_reference(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("ref-") || lower.contains("reference")
}

/// Pick the token that most plausibly carries the reference number:
/// one starting with "ref-" if present, else the first token with
/// "ref" or a digit in it. Punctuation is stripped before parsing.
pub fn extract_reference_token(message: &str) -> Option<String> {
    let tokens: Vec<&str> = message.split_whitespace().collect();

    let candidate = tokens
        .iter()
        .find(|t| t.to_lowercase().starts_with("ref-"))
        .or_else(|| {
            tokens
                .iter()
                .find(|t| t.to_lowercase().contains("ref") || t.chars().any(|c| c.is_ascii_digit()))
        })?;

    let cleaned: String = candidate
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Vocabulary scan used after a freeform reply to decide whether to
/// follow up with the request-form suggestion.
pub fn mentions_document_vocabulary(reply: &str) -> bool {
    const DOCUMENT_VOCABULARY: &[&str] = &[
        "document",
        "clearance",
        "indigency",
        "residency",
        "certificate",
        "request",
    ];

    let lower = reply.to_lowercase();
    DOCUMENT_VOCABULARY.iter().any(|w| lower.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AdminCredentials {
        AdminCredentials {
            key: "EASTER".to_string(),
            passphrase: "EGG".to_string(),
        }
    }

    #[test]
    fn test_admin_exact_match() {
        assert_eq!(
            classify("EASTER EGG", &Hints::default(), &admin()),
            Intent::AdminAuth
        );
    }

    #[test]
    fn test_admin_is_case_sensitive() {
        assert_ne!(
            classify("easter egg", &Hints::default(), &admin()),
            Intent::AdminAuth
        );
        assert_ne!(
            classify("EASTER EGG extra", &Hints::default(), &admin()),
            Intent::AdminAuth
        );
        assert_ne!(classify("EASTER", &Hints::default(), &admin()), Intent::AdminAuth);
    }

    #[test]
    fn test_knowledge_before_fallback() {
        let intent = classify("Who are the barangay officials?", &Hints::default(), &admin());
        match intent {
            Intent::Knowledge(sections) => {
                assert!(sections.iter().any(|s| s.title == "Officials"));
            }
            other => panic!("expected knowledge intent, got {:?}", other),
        }
    }

    #[test]
    fn test_combined_domains() {
        let intent = classify(
            "Tell me about the Kagawad and the population",
            &Hints::default(),
            &admin(),
        );
        match intent {
            Intent::Knowledge(sections) => {
                let titles: Vec<_> = sections.iter().map(|s| s.title).collect();
                assert!(titles.contains(&"Officials"));
                assert!(titles.contains(&"Population"));
            }
            other => panic!("expected knowledge intent, got {:?}", other),
        }
    }

    #[test]
    fn test_place_request() {
        let intent = classify("show me the barangay hall", &Hints::default(), &admin());
        assert_eq!(intent, Intent::Place(PlaceQuery::Specific("barangay hall")));
    }

    #[test]
    fn test_reference_lookup() {
        let intent = classify("What is the status of REF-42?", &Hints::default(), &admin());
        assert_eq!(intent, Intent::Reference("REF-42".to_string()));
    }

    #[test]
    fn test_reference_word_without_token() {
        let intent = classify("I lost my reference", &Hints::default(), &admin());
        assert_eq!(intent, Intent::Reference("reference".to_string()));
    }

    #[test]
    fn test_document_inquiry_without_type() {
        let hints = Hints {
            contains_document_word: true,
            ..Default::default()
        };
        assert_eq!(
            classify("what documents can I get here", &hints, &admin()),
            Intent::DocumentInquiry
        );
    }

    #[test]
    fn test_direct_request_resolves_from_hint() {
        let hints = Hints {
            is_direct_document_request: true,
            contains_document_type: true,
            requested_doc_type: Some("barangay clearance".to_string()),
            ..Default::default()
        };
        assert_eq!(
            classify("I want to get a barangay clearance", &hints, &admin()),
            Intent::DocumentRequest(DocumentType::Clearance)
        );
    }

    #[test]
    fn test_direct_request_server_side_recheck() {
        let hints = Hints {
            is_direct_document_request: true,
            contains_document_type: true,
            requested_doc_type: None,
            ..Default::default()
        };
        assert_eq!(
            classify("requesting certificate of indengency po", &hints, &admin()),
            Intent::DocumentRequest(DocumentType::Indigency)
        );
    }

    #[test]
    fn test_interrogative_suppresses_direct_request() {
        let hints = Hints {
            is_direct_document_request: true,
            starts_with_interrogative: true,
            ..Default::default()
        };
        assert_eq!(
            classify("how do I get a barangay clearance", &hints, &admin()),
            Intent::Freeform
        );
    }

    #[test]
    fn test_unresolvable_direct_request_falls_through() {
        let hints = Hints {
            is_direct_document_request: true,
            ..Default::default()
        };
        assert_eq!(classify("I want to get one", &hints, &admin()), Intent::Freeform);
    }

    #[test]
    fn test_fallback_is_freeform() {
        assert_eq!(
            classify("kumusta", &Hints::default(), &admin()),
            Intent::Freeform
        );
    }

    #[test]
    fn test_reference_token_prefers_ref_prefix() {
        assert_eq!(
            extract_reference_token("my number 99 is REF-123 thanks"),
            Some("REF-123".to_string())
        );
        assert_eq!(
            extract_reference_token("status of request 55 please"),
            Some("55".to_string())
        );
    }

    #[test]
    fn test_submitted_reference_round_trips_through_probe() {
        let token = crate::documents::format_reference(7);
        let message = format!("What is the status of reference {}?", token);

        match classify(&message, &Hints::default(), &admin()) {
            Intent::Reference(extracted) => {
                assert_eq!(crate::documents::parse_reference_id(&extracted), Some(7));
            }
            other => panic!("expected reference intent, got {:?}", other),
        }
    }

    #[test]
    fn test_document_vocabulary_scan() {
        assert!(mentions_document_vocabulary(
            "You can request a barangay clearance at the hall."
        ));
        assert!(!mentions_document_vocabulary("The beach is lovely."));
    }
}
