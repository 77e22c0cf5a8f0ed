//! Patient-doctor chat endpoints.
//!
//! - `GET /api/chat/:peer_id` — messages in the channel with a peer
//! - `POST /api/chat/:peer_id` — send a user message

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::access::can_chat_with;
use crate::api::error::ApiError;
use crate::api::types::{AppState, UserContext};
use crate::db;
use crate::models::enums::SenderTag;
use crate::models::ChatMessage;
use crate::triage::channel_id;

const MAX_MESSAGE_CHARS: usize = 2000;

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

/// `GET /api/chat/:peer_id` — oldest first, newest `limit` messages.
pub async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(peer_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let limit = query.limit.unwrap_or(100).clamp(1, 500);
    let channel = channel_id(&user.user_id, &peer_id);

    let messages = state.store.with_conn(|conn| {
        if !can_chat_with(conn, &user, &peer_id)? {
            return Ok(None);
        }
        db::get_channel_messages(conn, &channel, limit).map(Some)
    })?;
    messages.map(Json).ok_or(ApiError::Forbidden)
}

#[derive(Deserialize)]
pub struct SendRequest {
    pub body: String,
}

/// `POST /api/chat/:peer_id` — send a message to the peer.
pub async fn send(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(peer_id): Path<Uuid>,
    Json(req): Json<SendRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let body = req.body.trim();
    if body.is_empty() {
        return Err(ApiError::BadRequest("Message is empty".into()));
    }
    if body.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Message exceeds {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let msg = ChatMessage {
        id: Uuid::new_v4(),
        channel_id: channel_id(&user.user_id, &peer_id),
        sender_id: user.user_id,
        receiver_id: peer_id,
        sender_tag: SenderTag::User,
        body: body.to_string(),
        sent_at: db::now_utc(),
    };

    let sent = state.store.with_conn(|conn| {
        if !can_chat_with(conn, &user, &peer_id)? {
            return Ok(false);
        }
        db::insert_chat_message(conn, &msg)?;
        Ok(true)
    })?;
    if !sent {
        return Err(ApiError::Forbidden);
    }
    Ok((StatusCode::CREATED, Json(msg)))
}
