//! In-process store backing both repositories, for service and router tests.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::conversation::{self, model::Conversation, model::NewConversation};
use crate::conversation::repository::ConversationRepository;
use crate::message::{self, model::Message, model::NewMessage, model::Page};
use crate::message::repository::MessageRepository;
use crate::user;

#[derive(Default)]
struct Inner {
    conversations: Vec<Conversation>,
    members: Vec<(conversation::Id, user::Id)>,
    messages: Vec<Message>,
}

impl Inner {
    fn is_member(&self, id: &conversation::Id, user: &user::Id) -> bool {
        self.members.iter().any(|(c, u)| c == id && u == user)
    }

    fn conversation_mut(&mut self, id: &conversation::Id) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| &c.id == id)
    }
}

#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<Mutex<Inner>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ConversationRepository for Store {
    fn find_or_create(
        &self,
        c: &NewConversation,
        participants: &[user::Id],
    ) -> conversation::Result<Conversation> {
        let mut inner = self.lock();

        if let Some(existing) = inner
            .conversations
            .iter()
            .find(|e| e.participants_key == c.participants_key)
        {
            return Ok(existing.clone());
        }

        let created = Conversation {
            id: c.id.clone(),
            participants_key: c.participants_key.to_string(),
            product_id: c.product_id.cloned(),
            last_message_id: None,
            is_archived: false,
            created_at: c.created_at,
            updated_at: c.updated_at,
        };

        inner.conversations.push(created.clone());
        for u in participants {
            inner.members.push((c.id.clone(), u.clone()));
        }

        Ok(created)
    }

    fn find_by_id(&self, id: &conversation::Id) -> conversation::Result<Option<Conversation>> {
        let inner = self.lock();
        Ok(inner.conversations.iter().find(|c| &c.id == id).cloned())
    }

    fn find_by_member(
        &self,
        member: &user::Id,
        archived: bool,
    ) -> conversation::Result<Vec<Conversation>> {
        let inner = self.lock();

        let mut found = inner
            .conversations
            .iter()
            .filter(|c| c.is_archived == archived && inner.is_member(&c.id, member))
            .cloned()
            .collect::<Vec<_>>();
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(found)
    }

    fn find_members(&self, id: &conversation::Id) -> conversation::Result<Vec<user::Id>> {
        let inner = self.lock();

        Ok(inner
            .members
            .iter()
            .filter(|(c, _)| c == id)
            .map(|(_, u)| u.clone())
            .collect())
    }

    fn find_members_by_ids(
        &self,
        ids: &[conversation::Id],
    ) -> conversation::Result<Vec<(conversation::Id, user::Id)>> {
        let inner = self.lock();

        Ok(inner
            .members
            .iter()
            .filter(|(c, _)| ids.contains(c))
            .cloned()
            .collect())
    }

    fn set_archived(&self, id: &conversation::Id, archived: bool) -> conversation::Result<bool> {
        let mut inner = self.lock();

        match inner.conversation_mut(id) {
            Some(c) => {
                c.is_archived = archived;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl MessageRepository for Store {
    fn insert(&self, m: &NewMessage) -> message::Result<Message> {
        let mut inner = self.lock();

        let msg = Message {
            id: m.id.clone(),
            conversation_id: m.conversation_id.clone(),
            sender: m.sender.clone(),
            content: m.content.to_string(),
            is_read: false,
            created_at: m.created_at,
        };

        if let Some(c) = inner.conversation_mut(m.conversation_id) {
            c.last_message_id = Some(msg.id.clone());
            c.updated_at = msg.created_at;
        }
        inner.messages.push(msg.clone());

        Ok(msg)
    }

    fn find_by_id(&self, id: &message::Id) -> message::Result<Option<Message>> {
        let inner = self.lock();
        Ok(inner.messages.iter().find(|m| &m.id == id).cloned())
    }

    fn find_by_ids(&self, ids: &[message::Id]) -> message::Result<Vec<Message>> {
        let inner = self.lock();

        Ok(inner
            .messages
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    fn find_by_conversation(
        &self,
        conversation_id: &conversation::Id,
        page: Page,
    ) -> message::Result<Vec<Message>> {
        let inner = self.lock();

        let mut msgs = inner
            .messages
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .filter(|m| {
                page.before
                    .as_ref()
                    .is_none_or(|b| (m.created_at, &m.id) < (b.created_at, &b.id))
            })
            .cloned()
            .collect::<Vec<_>>();
        msgs.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));

        if let Some(limit) = page.limit {
            let skip = msgs.len().saturating_sub(limit as usize);
            msgs.drain(..skip);
        }

        Ok(msgs)
    }

    fn mark_as_read(
        &self,
        conversation_id: &conversation::Id,
        reader: &user::Id,
    ) -> message::Result<usize> {
        let mut inner = self.lock();

        let mut updated = 0;
        for m in inner.messages.iter_mut().filter(|m| {
            &m.conversation_id == conversation_id && &m.sender != reader && !m.is_read
        }) {
            m.is_read = true;
            updated += 1;
        }

        Ok(updated)
    }

    fn count_unread(&self, reader: &user::Id) -> message::Result<i64> {
        let inner = self.lock();

        let count = inner
            .messages
            .iter()
            .filter(|m| !m.is_read && &m.sender != reader)
            .filter(|m| inner.is_member(&m.conversation_id, reader))
            .count();

        Ok(count as i64)
    }

    fn count_unread_by_conversations(
        &self,
        reader: &user::Id,
        ids: &[conversation::Id],
    ) -> message::Result<Vec<(conversation::Id, i64)>> {
        let inner = self.lock();

        let counts = ids
            .iter()
            .map(|id| {
                let n = inner
                    .messages
                    .iter()
                    .filter(|m| &m.conversation_id == id && !m.is_read && &m.sender != reader)
                    .count();
                (id.clone(), n as i64)
            })
            .filter(|(_, n)| *n > 0)
            .collect();

        Ok(counts)
    }

    fn delete(&self, id: &message::Id) -> message::Result<bool> {
        let mut inner = self.lock();

        let Some(pos) = inner.messages.iter().position(|m| &m.id == id) else {
            return Ok(false);
        };
        let removed = inner.messages.remove(pos);

        let previous = inner
            .messages
            .iter()
            .filter(|m| m.conversation_id == removed.conversation_id)
            .max_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)))
            .map(|m| m.id.clone());

        if let Some(c) = inner.conversation_mut(&removed.conversation_id) {
            if c.last_message_id.as_ref() == Some(id) {
                c.last_message_id = previous;
            }
        }

        Ok(true)
    }
}
