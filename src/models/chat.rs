use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::SenderTag;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub channel_id: String,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub sender_tag: SenderTag,
    pub body: String,
    pub sent_at: NaiveDateTime,
}
