use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::Serialize;

use crate::{conversation, user};

use super::Id;

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Message {
    pub id: Id,
    pub conversation_id: conversation::Id,
    pub sender: user::Id,
    pub content: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::messages)]
pub struct NewMessage<'a> {
    pub id: Id,
    pub conversation_id: &'a conversation::Id,
    pub sender: &'a user::Id,
    pub content: &'a str,
    pub created_at: NaiveDateTime,
}

impl<'a> NewMessage<'a> {
    pub fn new(conversation_id: &'a conversation::Id, sender: &'a user::Id, content: &'a str) -> Self {
        Self {
            id: Id::random(),
            conversation_id,
            sender,
            content,
            created_at: Utc::now().naive_utc(),
        }
    }
}

/// Position of a message in the `(created_at, id)` order of its conversation.
#[derive(Clone, Debug, PartialEq)]
pub struct Cursor {
    pub created_at: NaiveDateTime,
    pub id: Id,
}

impl From<&Message> for Cursor {
    fn from(m: &Message) -> Self {
        Self {
            created_at: m.created_at,
            id: m.id.clone(),
        }
    }
}

/// Window for paging through a conversation from the newest message backwards.
/// `before` is exclusive.
#[derive(Clone, Debug, Default)]
pub struct Page {
    pub limit: Option<i64>,
    pub before: Option<Cursor>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: Id,
    pub conversation: conversation::Id,
    pub sender: user::Id,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            conversation: m.conversation_id,
            sender: m.sender,
            content: m.content,
            is_read: m.is_read,
            created_at: m.created_at.and_utc(),
        }
    }
}
