//! Document request domain: types, statuses, reference tokens.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Documents the barangay can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Clearance,
    Indigency,
    Residency,
}

/// Copies of one document type a user may request per day.
pub const DAILY_COPY_LIMIT: i64 = 5;

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [
        DocumentType::Clearance,
        DocumentType::Indigency,
        DocumentType::Residency,
    ];

    /// Canonical citizen-facing name, as the chat client sends it.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Clearance => "barangay clearance",
            DocumentType::Indigency => "barangay indigency",
            DocumentType::Residency => "barangay residency",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "barangay clearance" => Some(DocumentType::Clearance),
            "barangay indigency" => Some(DocumentType::Indigency),
            "barangay residency" => Some(DocumentType::Residency),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common misspellings of "indigency" seen in live traffic.
const INDIGENCY_SPELLINGS: &[&str] = &["indigency", "indengency", "indengecy", "indegency"];

/// Resolve the document type mentioned in a message, if any.
pub fn detect_document_type(query: &str) -> Option<DocumentType> {
    let query_lower = query.to_lowercase();

    if query_lower.contains("clearance") {
        return Some(DocumentType::Clearance);
    }

    if INDIGENCY_SPELLINGS.iter().any(|s| query_lower.contains(s)) {
        return Some(DocumentType::Indigency);
    }

    if query_lower.contains("residency") {
        return Some(DocumentType::Residency);
    }

    DocumentType::ALL
        .into_iter()
        .find(|doc| query_lower.contains(doc.as_str()))
}

/// Submission lifecycle. Creation is always Pending; the administrative
/// update writes whatever status string the operator chose, so unknown
/// strings can exist in the table and map to Other here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
    Claimed,
    Other(String),
}

impl DocumentStatus {
    pub fn parse(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "pending" => DocumentStatus::Pending,
            "approved" => DocumentStatus::Approved,
            "rejected" => DocumentStatus::Rejected,
            "claimed" => DocumentStatus::Claimed,
            other => DocumentStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Claimed => "claimed",
            DocumentStatus::Other(s) => s,
        }
    }

    /// Only entering Claimed stamps a pickup date.
    pub fn stamps_pickup_date(&self) -> bool {
        matches!(self, DocumentStatus::Claimed)
    }
}

/// Format the citizen-facing reference token for a submission id.
pub fn format_reference(id: i64) -> String {
    format!("REF-{}", id)
}

/// Parse a submission id out of a candidate reference token.
///
/// Tolerates casing, a missing prefix, and arbitrary trailing
/// non-numeric characters; anything unusable is simply None.
pub fn parse_reference_id(token: &str) -> Option<i64> {
    let cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();

    let lower = cleaned.to_lowercase();
    let digits_part = lower.strip_prefix("ref-").unwrap_or(&lower);

    let digits: String = digits_part
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return None;
    }

    digits.parse().ok()
}

/// A document submission row.
#[derive(Debug, sqlx::FromRow)]
pub struct DocumentRequestRow {
    pub id: i64,
    pub user_id: Option<Uuid>,
    pub document_types: Vec<String>,
    pub full_name: String,
    pub address: String,
    pub purpose: String,
    pub status: String,
    pub pickup_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Templated status reply for a reference lookup.
pub fn status_reply(row: &DocumentRequestRow) -> String {
    let reference = format_reference(row.id);
    let documents = row.document_types.join(", ");

    let body = match DocumentStatus::parse(&row.status) {
        DocumentStatus::Approved => format!(
            "Good news! Your request <strong>{}</strong> ({}) has been <strong>approved</strong>. \
             You may claim your document at the barangay hall during office hours.",
            reference, documents
        ),
        DocumentStatus::Rejected => format!(
            "We're sorry, but your request <strong>{}</strong> ({}) has been <strong>rejected</strong>. \
             Please visit the barangay hall for details or submit a new request.",
            reference, documents
        ),
        DocumentStatus::Claimed => {
            let picked_up = row
                .pickup_date
                .map(|d| d.format("%B %e, %Y").to_string())
                .unwrap_or_else(|| "a previous date".to_string());
            format!(
                "Our records show that request <strong>{}</strong> ({}) was already \
                 <strong>claimed</strong> on {}.",
                reference, documents, picked_up
            )
        }
        _ => format!(
            "Your request <strong>{}</strong> ({}) is still <strong>{}</strong>. \
             We'll have it ready as soon as possible; please check back later.",
            reference, documents, row.status
        ),
    };

    crate::format::wrap_ai_response(&body)
}

/// Templated reply when a reference cannot be found.
pub fn not_found_reply(token: &str) -> String {
    crate::format::wrap_ai_response(&format!(
        "I couldn't find a document request matching <strong>{}</strong>. \
         Please double-check the reference number on your confirmation message, \
         or submit a new request if you haven't made one yet.",
        crate::context::strip_html(token)
    ))
}

/// Confirmation reply returned right after a submission.
pub fn submission_reply(id: i64, document_types: &[String]) -> String {
    crate::format::wrap_ai_response(&format!(
        "Your document request has been submitted! Your reference number is \
         <strong>{}</strong> ({}). Keep it safe; you can ask me about the status \
         anytime, for example \"What is the status of {}?\".",
        format_reference(id),
        document_types.join(", "),
        format_reference(id)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_with_misspellings() {
        assert_eq!(
            detect_document_type("I need a certificate of indengency"),
            Some(DocumentType::Indigency)
        );
        assert_eq!(
            detect_document_type("barangay clearance please"),
            Some(DocumentType::Clearance)
        );
        assert_eq!(
            detect_document_type("proof of residency"),
            Some(DocumentType::Residency)
        );
        assert_eq!(detect_document_type("hello po"), None);
    }

    #[test]
    fn test_reference_round_trip() {
        let token = format_reference(42);
        assert_eq!(token, "REF-42");
        assert_eq!(parse_reference_id(&token), Some(42));
        assert_eq!(parse_reference_id("ref-42"), Some(42));
    }

    #[test]
    fn test_reference_trailing_garbage() {
        assert_eq!(parse_reference_id("REF-42?!"), Some(42));
        assert_eq!(parse_reference_id("REF-42abc"), Some(42));
        assert_eq!(parse_reference_id("ref-007."), Some(7));
    }

    #[test]
    fn test_reference_malformed_is_none() {
        assert_eq!(parse_reference_id("REF-"), None);
        assert_eq!(parse_reference_id("reference"), None);
        assert_eq!(parse_reference_id(""), None);
        assert_eq!(parse_reference_id("ref-abc"), None);
    }

    #[test]
    fn test_only_claimed_stamps_pickup() {
        assert!(DocumentStatus::parse("claimed").stamps_pickup_date());
        assert!(DocumentStatus::parse("Claimed").stamps_pickup_date());
        assert!(!DocumentStatus::parse("approved").stamps_pickup_date());
        assert!(!DocumentStatus::parse("on hold").stamps_pickup_date());
    }

    #[test]
    fn test_arbitrary_status_preserved() {
        let status = DocumentStatus::parse("on hold");
        assert_eq!(status.as_str(), "on hold");
    }

    fn sample_row(status: &str) -> DocumentRequestRow {
        DocumentRequestRow {
            id: 42,
            user_id: None,
            document_types: vec!["barangay clearance".to_string()],
            full_name: "Juan Dela Cruz".to_string(),
            address: "Purok 3".to_string(),
            purpose: "employment".to_string(),
            status: status.to_string(),
            pickup_date: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_status_reply_names_reference_and_documents() {
        let reply = status_reply(&sample_row("approved"));
        assert!(reply.contains("REF-42"));
        assert!(reply.contains("barangay clearance"));
        assert!(reply.contains("approved"));
    }

    #[test]
    fn test_not_found_reply_echoes_sanitized_token() {
        let reply = not_found_reply("REF-9999");
        assert!(reply.contains("REF-9999"));
        assert!(reply.contains("couldn't find"));
    }
}
