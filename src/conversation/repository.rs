use diesel::{
    Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl,
    SelectableHelper, r2d2::ConnectionManager,
};

use crate::schema::{conversations, conversations_users};
use crate::user;

use super::Id;
use super::model::{Conversation, NewConversation, NewParticipant};

pub trait ConversationRepository {
    /// Inserts the conversation unless one with the same participants key
    /// exists, and returns whichever row owns the key afterwards.
    fn find_or_create(
        &self,
        c: &NewConversation,
        participants: &[user::Id],
    ) -> super::Result<Conversation>;

    fn find_by_id(&self, id: &Id) -> super::Result<Option<Conversation>>;

    fn find_by_member(&self, member: &user::Id, archived: bool)
    -> super::Result<Vec<Conversation>>;

    fn find_members(&self, id: &Id) -> super::Result<Vec<user::Id>>;

    fn find_members_by_ids(&self, ids: &[Id]) -> super::Result<Vec<(Id, user::Id)>>;

    fn set_archived(&self, id: &Id, archived: bool) -> super::Result<bool>;
}

pub struct PgConversationRepository {
    pool: r2d2::Pool<ConnectionManager<PgConnection>>,
}

impl PgConversationRepository {
    pub fn new(pool: r2d2::Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

impl ConversationRepository for PgConversationRepository {
    fn find_or_create(
        &self,
        c: &NewConversation,
        participants: &[user::Id],
    ) -> super::Result<Conversation> {
        let mut conn = self.pool.get()?;

        conn.transaction(|conn| {
            let inserted = diesel::insert_into(conversations::table)
                .values(c)
                .on_conflict(conversations::participants_key)
                .do_nothing()
                .execute(conn)?;

            if inserted > 0 {
                let rows = participants
                    .iter()
                    .map(|u| NewParticipant::new(&c.id, u))
                    .collect::<Vec<_>>();

                diesel::insert_into(conversations_users::table)
                    .values(&rows)
                    .execute(conn)?;
            }

            let conversation = conversations::table
                .filter(conversations::participants_key.eq(c.participants_key))
                .select(Conversation::as_select())
                .first(conn)?;

            Ok(conversation)
        })
    }

    fn find_by_id(&self, id: &Id) -> super::Result<Option<Conversation>> {
        let mut conn = self.pool.get()?;

        let c = conversations::table
            .find(id)
            .select(Conversation::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(c)
    }

    fn find_by_member(
        &self,
        member: &user::Id,
        archived: bool,
    ) -> super::Result<Vec<Conversation>> {
        let mut conn = self.pool.get()?;

        let c = conversations::table
            .inner_join(conversations_users::table)
            .filter(conversations_users::user_id.eq(member))
            .filter(conversations::is_archived.eq(archived))
            .order(conversations::updated_at.desc())
            .select(Conversation::as_select())
            .load(&mut conn)?;

        Ok(c)
    }

    fn find_members(&self, id: &Id) -> super::Result<Vec<user::Id>> {
        let mut conn = self.pool.get()?;

        let members = conversations_users::table
            .filter(conversations_users::conversation_id.eq(id))
            .select(conversations_users::user_id)
            .load(&mut conn)?;

        Ok(members)
    }

    fn find_members_by_ids(&self, ids: &[Id]) -> super::Result<Vec<(Id, user::Id)>> {
        let mut conn = self.pool.get()?;

        let members = conversations_users::table
            .filter(conversations_users::conversation_id.eq_any(ids))
            .select((
                conversations_users::conversation_id,
                conversations_users::user_id,
            ))
            .load(&mut conn)?;

        Ok(members)
    }

    fn set_archived(&self, id: &Id, archived: bool) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(conversations::table.find(id))
            .set(conversations::is_archived.eq(archived))
            .execute(&mut conn)?;

        Ok(updated > 0)
    }
}
