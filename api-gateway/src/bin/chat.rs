//! Chat Lambda - Handles POST /get_response.
//!
//! Classifies each inbound message (admin probe, curated knowledge,
//! notable places, reference lookup, document intents) and falls back
//! to the completion model with the bounded conversation context.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use validator::Validate;

use shared::documents::{self, DocumentRequestRow, DocumentType};
use shared::http::{error_response, json_response, session_id};
use shared::intent::{self, Intent};
use shared::models::{ChatRequest, ChatResponse};
use shared::places::PlaceQuery;
use shared::{auth, config, format, knowledge, parse_body};
use shared::{ChatStore, CompletionClient, ConversationContext, SessionStore};

/// Fixed acknowledgment logged for an admin credential probe. The
/// credentials themselves are never written anywhere.
const ADMIN_PROBE_ACK: &str =
    "I understand you're asking about administrative access. Let me check that for you.";

/// Sentinel reply the web client turns into an admin redirect.
const ADMIN_SENTINEL: &str = "ADMIN_AUTHENTICATED";

const PERSONA: &str = "You are BAAC (Barangay Amungan Assistant Chatbot), an assistant chatbot \
for Barangay Amungan, Iba, Zambales. Always provide helpful and informative responses. \
Format your response in a clear and professional manner.";

/// Application state
struct AppState {
    db_pool: PgPool,
    completion: CompletionClient,
    sessions: SessionStore,
    chats: ChatStore,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let (app_config, db_pool) = shared::db::connect_from_env()
            .await
            .map_err(|e| format!("Failed to initialize state: {}", e))?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let bedrock = aws_sdk_bedrockruntime::Client::new(&aws_config);
        let completion = CompletionClient::new(bedrock, app_config.model_id.clone());

        // Pick up any database override of the in-chat admin credentials.
        if let Err(e) = config::refresh_admin_credentials(&db_pool).await {
            error!("Admin credential refresh failed, using seed values: {}", e);
        }

        Ok(Self {
            sessions: SessionStore::new(db_pool.clone()),
            chats: ChatStore::new(db_pool.clone()),
            db_pool,
            completion,
        })
    }
}

/// Best-effort conversation log; a failure never blocks the reply.
async fn log_conversation(pool: &PgPool, user_input: &str, ai_response: &str, user_id: Option<Uuid>) {
    let result = sqlx::query(
        "INSERT INTO conversation_logs (user_id, user_input, ai_response) VALUES ($1, $2, $3)",
    )
    .bind(user_id)
    .bind(user_input)
    .bind(ai_response)
    .execute(pool)
    .await;

    if let Err(e) = result {
        error!("Failed to log conversation: {}", e);
    }
}

fn build_system_prompt(context: &ConversationContext) -> String {
    let mut prompt = String::from(PERSONA);
    prompt.push_str("\n\nReference information about the barangay:\n");
    prompt.push_str(&knowledge::reference_corpus());

    if !context.is_empty() {
        prompt.push_str("\n\nRecent conversation:\n");
        prompt.push_str(&context.prompt_history());
    }

    prompt
}

/// Resolve which context feeds this turn: persisted chat history when a
/// chat id and user are both present, session history otherwise.
async fn active_context(
    state: &AppState,
    chat_id: Option<Uuid>,
    user: Option<&auth::AuthenticatedUser>,
    session: Option<&str>,
) -> Result<ConversationContext, shared::Error> {
    match (chat_id, user) {
        (Some(chat_id), Some(user)) => state.chats.context_for(chat_id, user.user_id).await,
        _ => Ok(match session {
            Some(id) => state.sessions.load(id).await.context,
            None => ConversationContext::new(),
        }),
    }
}

/// Append the finished turn to whichever context store is active.
async fn remember_turn(
    state: &AppState,
    chat_id: Option<Uuid>,
    user: Option<&auth::AuthenticatedUser>,
    session: Option<&str>,
    prompt: &str,
    reply: &str,
) {
    match (chat_id, user) {
        (Some(chat_id), Some(user)) => {
            state.chats.append(chat_id, user.user_id, prompt, reply).await;
        }
        _ => {
            if let Some(id) = session {
                state.sessions.append(id, prompt, reply).await;
            }
        }
    }
}

async fn lookup_reference(state: &AppState, token: &str) -> String {
    let Some(reference_id) = documents::parse_reference_id(token) else {
        return documents::not_found_reply(token);
    };

    let row: Result<Option<DocumentRequestRow>, sqlx::Error> = sqlx::query_as(
        r#"
        SELECT id, user_id, document_types, full_name, address, purpose,
               status, pickup_date, created_at
        FROM document_requests
        WHERE id = $1
        "#,
    )
    .bind(reference_id)
    .fetch_optional(&state.db_pool)
    .await;

    match row {
        Ok(Some(row)) => documents::status_reply(&row),
        Ok(None) => documents::not_found_reply(token),
        Err(e) => {
            error!("Reference lookup failed for {}: {}", reference_id, e);
            documents::not_found_reply(token)
        }
    }
}

fn direct_request_response(
    doc_type: DocumentType,
    user: Option<&auth::AuthenticatedUser>,
) -> ChatResponse {
    if user.is_some() {
        let mut response = ChatResponse::text(format::wrap_ai_response(&format!(
            "I can help you request a <strong>{}</strong>. Use the button below to open \
             the request form and fill in the details.",
            doc_type
        )));
        response.show_form_button = Some(true);
        response.form_type = Some(doc_type.as_str().to_string());
        response
    } else {
        let mut response = ChatResponse::text(format::wrap_ai_response(&format!(
            "You need to be logged in to request a <strong>{}</strong>. Please sign in \
             or create an account, then ask me again.",
            doc_type
        )));
        response.suggest_auth = Some(true);
        response.document_type = Some(doc_type.as_str().to_string());
        response
    }
}

/// Freeform fallback: one completion round-trip with the assembled
/// context, then the post-pass that may suggest the request form.
async fn freeform_response(
    state: &AppState,
    request: &ChatRequest,
    user: Option<&auth::AuthenticatedUser>,
    context: &ConversationContext,
) -> Result<ChatResponse, shared::Error> {
    let system = build_system_prompt(context);
    let generated = state.completion.generate(&system, &request.prompt).await?;

    let reply = format::wrap_ai_response(&format::format_bullets(&generated));
    let mut response = ChatResponse::text(reply);

    // Only follow up with the form suggestion when the user named a
    // document type, this wasn't already a direct request, and the
    // model's reply actually went there.
    if request.contains_document_type
        && !request.is_direct_document_request
        && intent::mentions_document_vocabulary(&generated)
    {
        let doc_type = request
            .requested_doc_type
            .as_deref()
            .and_then(DocumentType::parse)
            .or_else(|| documents::detect_document_type(&request.prompt));

        match (doc_type, user) {
            (Some(doc_type), Some(_)) => {
                response.suggest_form = Some(true);
                response.form_type = Some(doc_type.as_str().to_string());
            }
            (Some(doc_type), None) => {
                response.suggest_auth = Some(true);
                response.document_type = Some(doc_type.as_str().to_string());
            }
            (None, _) => {
                response.suggest_all_documents = Some(true);
            }
        }
    }

    Ok(response)
}

/// Document-inquiry turn: the model drafts the reply, the caller is
/// told to surface every available document type.
async fn inquiry_response(
    state: &AppState,
    request: &ChatRequest,
    context: &ConversationContext,
) -> Result<ChatResponse, shared::Error> {
    let mut system = build_system_prompt(context);
    system.push_str(
        "\n\nThe resident is asking about barangay documents in general. The barangay \
         issues these documents: barangay clearance, barangay indigency, barangay \
         residency. Briefly explain what each is for and invite them to request one.",
    );

    let generated = state.completion.generate(&system, &request.prompt).await?;
    let mut response =
        ChatResponse::text(format::wrap_ai_response(&format::format_bullets(&generated)));
    response.suggest_all_documents = Some(true);
    Ok(response)
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = event.uri().path();

    info!("Chat request: {} {}", method, path);

    if method != "POST" || path != "/get_response" {
        return error_response(404, "Not found");
    }

    let request: ChatRequest = parse_body!(event.body());

    if let Err(e) = request.validate() {
        return error_response(400, format!("Prompt is required: {}", e));
    }

    let user = auth::optional_user(&event);
    let session = session_id(&event);
    let admin = config::admin_credentials().await;

    let intent = intent::classify(&request.prompt, &request.hints(), &admin);

    // Admin probe: flag the session, log the fixed acknowledgment, and
    // return the sentinel. The context stores are left untouched.
    if intent == Intent::AdminAuth {
        if let Some(session) = session.as_deref() {
            state.sessions.mark_admin(session).await;
        }
        log_conversation(
            &state.db_pool,
            &request.prompt,
            ADMIN_PROBE_ACK,
            user.as_ref().map(|u| u.user_id),
        )
        .await;
        return json_response(200, &ChatResponse::text(ADMIN_SENTINEL.to_string()));
    }

    let context = match active_context(&state, request.chat_id, user.as_ref(), session.as_deref())
        .await
    {
        Ok(context) => context,
        Err(e @ shared::Error::NotFound(_)) => {
            return error_response(e.status_code(), "Chat not found");
        }
        Err(e) => {
            error!("Context load failed: {}", e);
            ConversationContext::new()
        }
    };

    let response = match intent {
        Intent::AdminAuth => unreachable!("handled above"),
        Intent::Knowledge(sections) => ChatResponse::text(format::knowledge_reply(&sections)),
        Intent::Place(PlaceQuery::All) => {
            let place = shared::places::all_places_response();
            let mut response = ChatResponse::text(format::wrap_ai_response(&place.text));
            response.image_paths = Some(place.image_paths);
            response
        }
        Intent::Place(PlaceQuery::Specific(name)) => match shared::places::place_response(name) {
            Some(place) => {
                let mut response = ChatResponse::text(format::wrap_ai_response(&place.text));
                response.image_paths = Some(place.image_paths);
                response
            }
            None => ChatResponse::text(format::wrap_ai_response(
                "I don't have photos of that place yet.",
            )),
        },
        Intent::Reference(token) => ChatResponse::text(lookup_reference(&state, &token).await),
        Intent::DocumentInquiry => match inquiry_response(&state, &request, &context).await {
            Ok(response) => response,
            Err(e) => {
                error!("Completion failed: {}", e);
                return error_response(500, "An error occurred while processing the request");
            }
        },
        Intent::DocumentRequest(doc_type) => direct_request_response(doc_type, user.as_ref()),
        Intent::Freeform => {
            match freeform_response(&state, &request, user.as_ref(), &context).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Completion failed: {}", e);
                    return error_response(500, "An error occurred while processing the request");
                }
            }
        }
    };

    // The turn is logged even when no context store is available; the
    // context append only happens once a response exists.
    log_conversation(
        &state.db_pool,
        &request.prompt,
        &response.response,
        user.as_ref().map(|u| u.user_id),
    )
    .await;

    remember_turn(
        &state,
        request.chat_id,
        user.as_ref(),
        session.as_deref(),
        &request.prompt,
        &response.response,
    )
    .await;

    json_response(200, &response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
