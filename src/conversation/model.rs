use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::Serialize;

use crate::{message, product, user};

use super::Id;

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Conversation {
    pub id: Id,
    pub participants_key: String,
    pub product_id: Option<product::Id>,
    pub last_message_id: Option<message::Id>,
    pub is_archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::conversations)]
pub struct NewConversation<'a> {
    pub id: Id,
    pub participants_key: &'a str,
    pub product_id: Option<&'a product::Id>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewConversation<'a> {
    pub fn new(participants_key: &'a str, product_id: Option<&'a product::Id>) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Id::random(),
            participants_key,
            product_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::conversations_users)]
pub struct NewParticipant<'a> {
    conversation_id: &'a Id,
    user_id: &'a user::Id,
}

impl<'a> NewParticipant<'a> {
    pub fn new(conversation_id: &'a Id, user_id: &'a user::Id) -> Self {
        Self {
            conversation_id,
            user_id,
        }
    }
}

/// Sorted, de-duplicated set of users taking part in a conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participants(Vec<user::Id>);

impl Participants {
    pub fn new(members: impl IntoIterator<Item = user::Id>) -> super::Result<Self> {
        let mut members: Vec<user::Id> = members.into_iter().collect();
        members.sort();
        members.dedup();

        if members.len() < 2 {
            return Err(super::Error::NotEnoughParticipants(members.len()));
        }

        Ok(Self(members))
    }

    pub fn as_slice(&self) -> &[user::Id] {
        &self.0
    }

    /// Normalised identity of a conversation between these participants,
    /// optionally scoped to a product. Backed by a unique index.
    pub fn key(&self, product: Option<&product::Id>) -> String {
        let members = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");

        match product {
            Some(p) => format!("{members}#{p}"),
            None => members,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub id: Id,
    pub participants: Vec<user::Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<product::Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<message::model::MessageDto>,
    pub unread_count: i64,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationDto {
    pub fn new(
        c: Conversation,
        participants: Vec<user::Id>,
        last_message: Option<message::model::MessageDto>,
        unread_count: i64,
    ) -> Self {
        Self {
            id: c.id,
            participants,
            product: c.product_id,
            last_message,
            unread_count,
            is_archived: c.is_archived,
            created_at: c.created_at.and_utc(),
            updated_at: c.updated_at.and_utc(),
        }
    }
}
