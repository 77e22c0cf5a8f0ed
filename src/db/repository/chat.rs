use std::str::FromStr;

use rusqlite::{params, Connection};

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::SenderTag;
use crate::models::*;

pub fn insert_chat_message(conn: &Connection, msg: &ChatMessage) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO chat_messages (id, channel_id, sender_id, receiver_id, sender_tag, body, sent_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            msg.id.to_string(),
            msg.channel_id,
            msg.sender_id.to_string(),
            msg.receiver_id.to_string(),
            msg.sender_tag.as_str(),
            msg.body,
            format_datetime(&msg.sent_at),
        ],
    )?;
    Ok(())
}

/// Messages in a channel, oldest first. Returns at most `limit` of the
/// newest messages.
pub fn get_channel_messages(
    conn: &Connection,
    channel_id: &str,
    limit: u32,
) -> Result<Vec<ChatMessage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, channel_id, sender_id, receiver_id, sender_tag, body, sent_at FROM (
            SELECT rowid AS seq, * FROM chat_messages WHERE channel_id = ?1
            ORDER BY sent_at DESC, seq DESC LIMIT ?2
         ) ORDER BY sent_at ASC, seq ASC",
    )?;

    let rows = stmt.query_map(params![channel_id, limit], |row| {
        Ok(MessageRow {
            id: row.get(0)?,
            channel_id: row.get(1)?,
            sender_id: row.get(2)?,
            receiver_id: row.get(3)?,
            sender_tag: row.get(4)?,
            body: row.get(5)?,
            sent_at: row.get(6)?,
        })
    })?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_row(row?)?);
    }
    Ok(messages)
}

struct MessageRow {
    id: String,
    channel_id: String,
    sender_id: String,
    receiver_id: String,
    sender_tag: String,
    body: String,
    sent_at: String,
}

fn message_from_row(row: MessageRow) -> Result<ChatMessage, DatabaseError> {
    Ok(ChatMessage {
        id: parse_uuid(&row.id)?,
        channel_id: row.channel_id,
        sender_id: parse_uuid(&row.sender_id)?,
        receiver_id: parse_uuid(&row.receiver_id)?,
        sender_tag: SenderTag::from_str(&row.sender_tag)?,
        body: row.body,
        sent_at: parse_datetime(&row.sent_at)?,
    })
}
