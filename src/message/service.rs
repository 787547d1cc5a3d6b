use async_trait::async_trait;
use log::debug;

use crate::{conversation, user};

use super::model::{Cursor, MessageDto, NewMessage, Page};
use super::{Id, MAX_CONTENT_LEN, MAX_PAGE_SIZE, Repository};

#[async_trait]
pub trait MessageService {
    /// Oldest first. With `before`, only messages preceding that message are
    /// returned; with `limit`, only the latest `limit` of those.
    async fn find_by_conversation(
        &self,
        auth_user: &user::Id,
        conversation_id: &conversation::Id,
        limit: Option<i64>,
        before: Option<&Id>,
    ) -> super::Result<Vec<MessageDto>>;

    async fn send(
        &self,
        auth_user: &user::Id,
        conversation_id: &conversation::Id,
        content: &str,
    ) -> super::Result<MessageDto>;

    /// Returns the number of messages that changed state.
    async fn mark_as_read(
        &self,
        auth_user: &user::Id,
        conversation_id: &conversation::Id,
    ) -> super::Result<usize>;

    async fn delete(&self, auth_user: &user::Id, id: &Id) -> super::Result<()>;

    async fn unread_count(&self, auth_user: &user::Id) -> super::Result<i64>;
}

#[derive(Clone)]
pub struct MessageServiceImpl {
    repo: Repository,
    conversation_service: conversation::Service,
}

impl MessageServiceImpl {
    pub fn new(repo: Repository, conversation_service: conversation::Service) -> Self {
        Self {
            repo,
            conversation_service,
        }
    }
}

#[async_trait]
impl MessageService for MessageServiceImpl {
    async fn find_by_conversation(
        &self,
        auth_user: &user::Id,
        conversation_id: &conversation::Id,
        limit: Option<i64>,
        before: Option<&Id>,
    ) -> super::Result<Vec<MessageDto>> {
        if let Some(limit) = limit {
            if !(1..=MAX_PAGE_SIZE).contains(&limit) {
                return Err(super::Error::InvalidLimit(limit));
            }
        }

        self.conversation_service
            .check_member(conversation_id, auth_user)
            .await?;

        let before = match before {
            Some(id) => {
                let m = self
                    .repo
                    .find_by_id(id)?
                    .filter(|m| m.conversation_id.eq(conversation_id))
                    .ok_or(super::Error::NotFound(id.clone()))?;
                Some(Cursor::from(&m))
            }
            None => None,
        };

        let msgs = self
            .repo
            .find_by_conversation(conversation_id, Page { limit, before })?;

        Ok(msgs.into_iter().map(MessageDto::from).collect())
    }

    async fn send(
        &self,
        auth_user: &user::Id,
        conversation_id: &conversation::Id,
        content: &str,
    ) -> super::Result<MessageDto> {
        let content = content.trim();
        if content.is_empty() {
            return Err(super::Error::EmptyContent);
        }
        if content.chars().count() > MAX_CONTENT_LEN {
            return Err(super::Error::ContentTooLong);
        }

        self.conversation_service
            .check_member(conversation_id, auth_user)
            .await?;

        let msg = self
            .repo
            .insert(&NewMessage::new(conversation_id, auth_user, content))?;
        debug!("User '{auth_user}' sent '{}' to '{conversation_id}'", msg.id);

        Ok(MessageDto::from(msg))
    }

    async fn mark_as_read(
        &self,
        auth_user: &user::Id,
        conversation_id: &conversation::Id,
    ) -> super::Result<usize> {
        self.conversation_service
            .check_member(conversation_id, auth_user)
            .await?;

        let updated = self.repo.mark_as_read(conversation_id, auth_user)?;
        if updated > 0 {
            debug!("Marked {updated} messages in '{conversation_id}' as read by '{auth_user}'");
        }

        Ok(updated)
    }

    async fn delete(&self, auth_user: &user::Id, id: &Id) -> super::Result<()> {
        let msg = self
            .repo
            .find_by_id(id)?
            .ok_or(super::Error::NotFound(id.clone()))?;

        if msg.sender.ne(auth_user) {
            return Err(super::Error::NotOwner);
        }

        if !self.repo.delete(id)? {
            return Err(super::Error::NotFound(id.clone()));
        }

        Ok(())
    }

    async fn unread_count(&self, auth_user: &user::Id) -> super::Result<i64> {
        self.repo.count_unread(auth_user)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use chrono::Utc;
    use uuid::Uuid;

    use crate::conversation::service::{ConversationService, ConversationServiceImpl};
    use crate::integration::memory::Store;
    use crate::message::{self, repository::MessageRepository};

    use super::*;

    fn user(n: u128) -> user::Id {
        user::Id::from(Uuid::from_u128(n))
    }

    fn services() -> (conversation::Service, message::Service) {
        services_on(Store::new())
    }

    fn services_on(store: Store) -> (conversation::Service, message::Service) {
        let conversation_service: conversation::Service = Arc::new(ConversationServiceImpl::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        ));
        let message_service: message::Service = Arc::new(MessageServiceImpl::new(
            Arc::new(store),
            conversation_service.clone(),
        ));
        (conversation_service, message_service)
    }

    #[tokio::test]
    async fn should_send_and_read_a_first_message() {
        let (conversations, messages) = services();
        let (a, b) = (user(1), user(2));

        let c1 = conversations.find_or_create(&a, &b, None).await.unwrap();
        let again = conversations.find_or_create(&a, &b, None).await.unwrap();
        assert_eq!(c1.id, again.id);

        let m1 = messages.send(&a, &c1.id, "hi").await.unwrap();
        assert!(!m1.is_read);

        let c1 = conversations.find_all(&b, false).await.unwrap().remove(0);
        assert_eq!(c1.last_message.as_ref().map(|m| &m.id), Some(&m1.id));
        assert_eq!(c1.unread_count, 1);
        assert_eq!(messages.unread_count(&b).await.unwrap(), 1);

        assert_eq!(messages.mark_as_read(&b, &c1.id).await.unwrap(), 1);
        assert_eq!(messages.mark_as_read(&b, &c1.id).await.unwrap(), 0);

        let msgs = messages
            .find_by_conversation(&b, &c1.id, None, None)
            .await
            .unwrap();
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].is_read);
        assert_eq!(messages.unread_count(&b).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn should_not_mark_own_messages_as_read() {
        let (conversations, messages) = services();
        let (a, b) = (user(1), user(2));
        let c = conversations.find_or_create(&a, &b, None).await.unwrap();

        messages.send(&a, &c.id, "hi").await.unwrap();

        assert_eq!(messages.mark_as_read(&a, &c.id).await.unwrap(), 0);
        assert_eq!(messages.unread_count(&a).await.unwrap(), 0);
        assert_eq!(messages.unread_count(&b).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn should_list_messages_oldest_first() {
        let (conversations, messages) = services();
        let (a, b) = (user(1), user(2));
        let c = conversations.find_or_create(&a, &b, None).await.unwrap();

        for content in ["one", "two", "three", "four"] {
            messages.send(&a, &c.id, content).await.unwrap();
        }

        let all = messages
            .find_by_conversation(&b, &c.id, None, None)
            .await
            .unwrap();
        let contents = all.iter().map(|m| m.content.as_str()).collect::<Vec<_>>();
        assert_eq!(contents, ["one", "two", "three", "four"]);

        let latest = messages
            .find_by_conversation(&b, &c.id, Some(2), None)
            .await
            .unwrap();
        let contents = latest.iter().map(|m| m.content.as_str()).collect::<Vec<_>>();
        assert_eq!(contents, ["three", "four"]);

        let earlier = messages
            .find_by_conversation(&b, &c.id, Some(2), Some(&latest[0].id))
            .await
            .unwrap();
        let contents = earlier.iter().map(|m| m.content.as_str()).collect::<Vec<_>>();
        assert_eq!(contents, ["one", "two"]);
    }

    #[tokio::test]
    async fn should_page_through_messages_sharing_a_timestamp() {
        let store = Store::new();
        let (conversations, messages) = services_on(store.clone());
        let (a, b) = (user(1), user(2));
        let c = conversations.find_or_create(&a, &b, None).await.unwrap();

        let at = Utc::now().naive_utc();
        for (n, content) in [(10, "one"), (20, "two"), (30, "three")] {
            let mut m = NewMessage::new(&c.id, &a, content);
            m.id = Id::from(Uuid::from_u128(n));
            m.created_at = at;
            MessageRepository::insert(&store, &m).unwrap();
        }

        let mut seen = Vec::new();
        let mut before: Option<Id> = None;
        loop {
            let page = messages
                .find_by_conversation(&b, &c.id, Some(1), before.as_ref())
                .await
                .unwrap();
            let Some(m) = page.into_iter().next() else {
                break;
            };
            before = Some(m.id.clone());
            seen.push(m.content);
        }

        assert_eq!(seen, ["three", "two", "one"]);
    }

    #[tokio::test]
    async fn should_not_page_from_a_foreign_message() {
        let (conversations, messages) = services();
        let (a, b, c) = (user(1), user(2), user(3));
        let with_b = conversations.find_or_create(&a, &b, None).await.unwrap();
        let with_c = conversations.find_or_create(&a, &c, None).await.unwrap();

        let elsewhere = messages.send(&a, &with_c.id, "hi").await.unwrap();

        let res = messages
            .find_by_conversation(&a, &with_b.id, Some(10), Some(&elsewhere.id))
            .await;
        assert!(matches!(res, Err(message::Error::NotFound(_))));
    }

    #[tokio::test]
    async fn should_reject_out_of_range_limit() {
        let (conversations, messages) = services();
        let (a, b) = (user(1), user(2));
        let c = conversations.find_or_create(&a, &b, None).await.unwrap();

        for limit in [0, MAX_PAGE_SIZE + 1] {
            let res = messages
                .find_by_conversation(&a, &c.id, Some(limit), None)
                .await;
            assert!(matches!(res, Err(message::Error::InvalidLimit(l)) if l == limit));
        }
    }

    #[tokio::test]
    async fn should_validate_content() {
        let (conversations, messages) = services();
        let (a, b) = (user(1), user(2));
        let c = conversations.find_or_create(&a, &b, None).await.unwrap();

        let res = messages.send(&a, &c.id, "   \n").await;
        assert!(matches!(res, Err(message::Error::EmptyContent)));

        let res = messages
            .send(&a, &c.id, &"x".repeat(MAX_CONTENT_LEN + 1))
            .await;
        assert!(matches!(res, Err(message::Error::ContentTooLong)));

        let m = messages.send(&a, &c.id, "  padded  ").await.unwrap();
        assert_eq!(m.content, "padded");
    }

    #[tokio::test]
    async fn should_forbid_outsiders() {
        let (conversations, messages) = services();
        let (a, b, mallory) = (user(1), user(2), user(3));
        let c = conversations.find_or_create(&a, &b, None).await.unwrap();

        let res = messages.send(&mallory, &c.id, "hi").await;
        assert!(matches!(
            res,
            Err(message::Error::_Conversation(conversation::Error::NotMember))
        ));

        let res = messages
            .find_by_conversation(&mallory, &c.id, None, None)
            .await;
        assert!(matches!(
            res,
            Err(message::Error::_Conversation(conversation::Error::NotMember))
        ));

        let res = messages.mark_as_read(&mallory, &c.id).await;
        assert!(matches!(
            res,
            Err(message::Error::_Conversation(conversation::Error::NotMember))
        ));
    }

    #[tokio::test]
    async fn should_not_find_unknown_conversation() {
        let (_, messages) = services();

        let res = messages
            .send(&user(1), &conversation::Id::random(), "hi")
            .await;

        assert!(matches!(
            res,
            Err(message::Error::_Conversation(conversation::Error::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn should_move_last_message_back_on_delete() {
        let (conversations, messages) = services();
        let (a, b) = (user(1), user(2));
        let c = conversations.find_or_create(&a, &b, None).await.unwrap();

        let first = messages.send(&a, &c.id, "first").await.unwrap();
        let second = messages.send(&b, &c.id, "second").await.unwrap();

        let res = messages.delete(&a, &second.id).await;
        assert!(matches!(res, Err(message::Error::NotOwner)));

        messages.delete(&b, &second.id).await.unwrap();
        let c = conversations.find_all(&a, false).await.unwrap().remove(0);
        assert_eq!(c.last_message.map(|m| m.id), Some(first.id.clone()));

        messages.delete(&a, &first.id).await.unwrap();
        let c = conversations.find_all(&a, false).await.unwrap().remove(0);
        assert!(c.last_message.is_none());

        let res = messages.delete(&a, &first.id).await;
        assert!(matches!(res, Err(message::Error::NotFound(_))));
    }
}
