use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;

use crate::message::model::MessageDto;
use crate::{message, product, user};

use super::model::{Conversation, ConversationDto, NewConversation, Participants};
use super::{Id, Repository};

#[async_trait]
pub trait ConversationService {
    async fn find_or_create(
        &self,
        auth_user: &user::Id,
        recipient: &user::Id,
        product: Option<&product::Id>,
    ) -> super::Result<ConversationDto>;

    async fn find_all(
        &self,
        auth_user: &user::Id,
        archived: bool,
    ) -> super::Result<Vec<ConversationDto>>;

    /// Fails with `NotFound` for unknown ids and `NotMember` when the user
    /// does not take part in the conversation.
    async fn check_member(&self, id: &Id, user: &user::Id) -> super::Result<()>;

    async fn archive(&self, id: &Id, auth_user: &user::Id) -> super::Result<ConversationDto>;

    async fn restore(&self, id: &Id, auth_user: &user::Id) -> super::Result<ConversationDto>;
}

#[derive(Clone)]
pub struct ConversationServiceImpl {
    repo: Repository,
    message_repo: message::Repository,
}

impl ConversationServiceImpl {
    pub fn new(repo: Repository, message_repo: message::Repository) -> Self {
        Self { repo, message_repo }
    }
}

#[async_trait]
impl ConversationService for ConversationServiceImpl {
    async fn find_or_create(
        &self,
        auth_user: &user::Id,
        recipient: &user::Id,
        product: Option<&product::Id>,
    ) -> super::Result<ConversationDto> {
        if auth_user.eq(recipient) {
            return Err(super::Error::SelfReference);
        }

        let participants = Participants::new([auth_user.clone(), recipient.clone()])?;
        let key = participants.key(product);

        let c = self
            .repo
            .find_or_create(&NewConversation::new(&key, product), participants.as_slice())?;
        debug!("Resolved conversation '{}' for key '{key}'", c.id);

        self.to_dto(c, auth_user)
    }

    async fn find_all(
        &self,
        auth_user: &user::Id,
        archived: bool,
    ) -> super::Result<Vec<ConversationDto>> {
        let conversations = self.repo.find_by_member(auth_user, archived)?;
        self.to_dtos(conversations, auth_user)
    }

    async fn check_member(&self, id: &Id, user: &user::Id) -> super::Result<()> {
        let members = self.repo.find_members(id)?;

        // every persisted conversation has at least two members
        if members.is_empty() {
            return Err(super::Error::NotFound(id.clone()));
        }

        if !members.contains(user) {
            return Err(super::Error::NotMember);
        }

        Ok(())
    }

    async fn archive(&self, id: &Id, auth_user: &user::Id) -> super::Result<ConversationDto> {
        self.set_archived(id, auth_user, true).await
    }

    async fn restore(&self, id: &Id, auth_user: &user::Id) -> super::Result<ConversationDto> {
        self.set_archived(id, auth_user, false).await
    }
}

impl ConversationServiceImpl {
    async fn set_archived(
        &self,
        id: &Id,
        auth_user: &user::Id,
        archived: bool,
    ) -> super::Result<ConversationDto> {
        self.check_member(id, auth_user).await?;

        if !self.repo.set_archived(id, archived)? {
            return Err(super::Error::NotFound(id.clone()));
        }

        let c = self
            .repo
            .find_by_id(id)?
            .ok_or(super::Error::NotFound(id.clone()))?;

        self.to_dto(c, auth_user)
    }

    fn to_dto(&self, c: Conversation, auth_user: &user::Id) -> super::Result<ConversationDto> {
        let id = c.id.clone();
        self.to_dtos(vec![c], auth_user)?
            .into_iter()
            .next()
            .ok_or(super::Error::NotFound(id))
    }

    fn to_dtos(
        &self,
        conversations: Vec<Conversation>,
        auth_user: &user::Id,
    ) -> super::Result<Vec<ConversationDto>> {
        if conversations.is_empty() {
            return Ok(Vec::with_capacity(0));
        }

        let ids = conversations
            .iter()
            .map(|c| c.id.clone())
            .collect::<Vec<_>>();

        let mut members: HashMap<Id, Vec<user::Id>> = HashMap::with_capacity(ids.len());
        for (id, member) in self.repo.find_members_by_ids(&ids)? {
            members.entry(id).or_default().push(member);
        }

        let last_message_ids = conversations
            .iter()
            .filter_map(|c| c.last_message_id.clone())
            .collect::<Vec<_>>();

        let mut last_messages = self
            .message_repo
            .find_by_ids(&last_message_ids)
            .map_err(Box::new)?
            .into_iter()
            .map(|m| (m.conversation_id.clone(), MessageDto::from(m)))
            .collect::<HashMap<_, _>>();

        let unread = self
            .message_repo
            .count_unread_by_conversations(auth_user, &ids)
            .map_err(Box::new)?
            .into_iter()
            .collect::<HashMap<_, _>>();

        let dtos = conversations
            .into_iter()
            .map(|c| {
                let mut participants = members.remove(&c.id).unwrap_or_default();
                participants.sort();
                let last_message = last_messages.remove(&c.id);
                let unread_count = unread.get(&c.id).copied().unwrap_or(0);

                ConversationDto::new(c, participants, last_message, unread_count)
            })
            .collect();

        Ok(dtos)
    }
}
