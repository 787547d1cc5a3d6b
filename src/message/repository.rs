use diesel::{
    BoolExpressionMethods, Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl,
    SelectableHelper, dsl::count_star, r2d2::ConnectionManager,
};

use crate::schema::{conversations, conversations_users, messages};
use crate::{conversation, user};

use super::Id;
use super::model::{Message, NewMessage, Page};

pub trait MessageRepository {
    /// Stores the message and points the conversation's last message at it.
    fn insert(&self, m: &NewMessage) -> super::Result<Message>;

    fn find_by_id(&self, id: &Id) -> super::Result<Option<Message>>;

    fn find_by_ids(&self, ids: &[Id]) -> super::Result<Vec<Message>>;

    /// Messages of a conversation, oldest first.
    fn find_by_conversation(
        &self,
        conversation_id: &conversation::Id,
        page: Page,
    ) -> super::Result<Vec<Message>>;

    /// Marks everything not sent by `reader` as read, returns the number of changed rows.
    fn mark_as_read(
        &self,
        conversation_id: &conversation::Id,
        reader: &user::Id,
    ) -> super::Result<usize>;

    fn count_unread(&self, reader: &user::Id) -> super::Result<i64>;

    fn count_unread_by_conversations(
        &self,
        reader: &user::Id,
        ids: &[conversation::Id],
    ) -> super::Result<Vec<(conversation::Id, i64)>>;

    /// Deletes the message, moving the conversation's last message pointer
    /// to the newest remaining one when needed.
    fn delete(&self, id: &Id) -> super::Result<bool>;
}

pub struct PgMessageRepository {
    pool: r2d2::Pool<ConnectionManager<PgConnection>>,
}

impl PgMessageRepository {
    pub fn new(pool: r2d2::Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

impl MessageRepository for PgMessageRepository {
    fn insert(&self, m: &NewMessage) -> super::Result<Message> {
        let mut conn = self.pool.get()?;

        conn.transaction(|conn| {
            let msg = diesel::insert_into(messages::table)
                .values(m)
                .returning(Message::as_returning())
                .get_result(conn)?;

            diesel::update(conversations::table.find(m.conversation_id))
                .set((
                    conversations::last_message_id.eq(&msg.id),
                    conversations::updated_at.eq(msg.created_at),
                ))
                .execute(conn)?;

            Ok(msg)
        })
    }

    fn find_by_id(&self, id: &Id) -> super::Result<Option<Message>> {
        let mut conn = self.pool.get()?;

        let msg = messages::table
            .find(id)
            .select(Message::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(msg)
    }

    fn find_by_ids(&self, ids: &[Id]) -> super::Result<Vec<Message>> {
        if ids.is_empty() {
            return Ok(Vec::with_capacity(0));
        }

        let mut conn = self.pool.get()?;

        let msgs = messages::table
            .filter(messages::id.eq_any(ids))
            .select(Message::as_select())
            .load(&mut conn)?;

        Ok(msgs)
    }

    fn find_by_conversation(
        &self,
        conversation_id: &conversation::Id,
        page: Page,
    ) -> super::Result<Vec<Message>> {
        let mut conn = self.pool.get()?;

        let mut query = messages::table
            .filter(messages::conversation_id.eq(conversation_id))
            .into_boxed();

        if let Some(before) = page.before {
            query = query.filter(
                messages::created_at.lt(before.created_at).or(messages::created_at
                    .eq(before.created_at)
                    .and(messages::id.lt(before.id))),
            );
        }

        match page.limit {
            Some(limit) => {
                let mut msgs = query
                    .order((messages::created_at.desc(), messages::id.desc()))
                    .limit(limit)
                    .select(Message::as_select())
                    .load(&mut conn)?;
                msgs.reverse();
                Ok(msgs)
            }
            None => {
                let msgs = query
                    .order((messages::created_at.asc(), messages::id.asc()))
                    .select(Message::as_select())
                    .load(&mut conn)?;
                Ok(msgs)
            }
        }
    }

    fn mark_as_read(
        &self,
        conversation_id: &conversation::Id,
        reader: &user::Id,
    ) -> super::Result<usize> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(
            messages::table
                .filter(messages::conversation_id.eq(conversation_id))
                .filter(messages::sender.ne(reader))
                .filter(messages::is_read.eq(false)),
        )
        .set(messages::is_read.eq(true))
        .execute(&mut conn)?;

        Ok(updated)
    }

    fn count_unread(&self, reader: &user::Id) -> super::Result<i64> {
        let mut conn = self.pool.get()?;

        let member_of = conversations_users::table
            .filter(conversations_users::user_id.eq(reader))
            .select(conversations_users::conversation_id);

        let count = messages::table
            .filter(messages::conversation_id.eq_any(member_of))
            .filter(messages::sender.ne(reader))
            .filter(messages::is_read.eq(false))
            .count()
            .get_result(&mut conn)?;

        Ok(count)
    }

    fn count_unread_by_conversations(
        &self,
        reader: &user::Id,
        ids: &[conversation::Id],
    ) -> super::Result<Vec<(conversation::Id, i64)>> {
        if ids.is_empty() {
            return Ok(Vec::with_capacity(0));
        }

        let mut conn = self.pool.get()?;

        let counts = messages::table
            .filter(messages::conversation_id.eq_any(ids))
            .filter(messages::sender.ne(reader))
            .filter(messages::is_read.eq(false))
            .group_by(messages::conversation_id)
            .select((messages::conversation_id, count_star()))
            .load(&mut conn)?;

        Ok(counts)
    }

    fn delete(&self, id: &Id) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        conn.transaction(|conn| {
            let Some(msg) = messages::table
                .find(id)
                .select(Message::as_select())
                .first(conn)
                .optional()?
            else {
                return Ok(false);
            };

            // held until commit so a concurrent insert cannot move the pointer in between
            let last_message_id: Option<Id> = conversations::table
                .find(&msg.conversation_id)
                .select(conversations::last_message_id)
                .for_no_key_update()
                .first(conn)?;

            if last_message_id.as_ref() == Some(id) {
                let previous: Option<Id> = messages::table
                    .filter(messages::conversation_id.eq(&msg.conversation_id))
                    .filter(messages::id.ne(id))
                    .order((messages::created_at.desc(), messages::id.desc()))
                    .select(messages::id)
                    .first(conn)
                    .optional()?;

                diesel::update(conversations::table.find(&msg.conversation_id))
                    .set(conversations::last_message_id.eq(previous))
                    .execute(conn)?;
            }

            diesel::delete(messages::table.find(id)).execute(conn)?;

            Ok(true)
        })
    }
}
