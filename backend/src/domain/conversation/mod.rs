//! Area registration conversation.
//!
//! Each inbound text moves a user through [`ConversationStatus`] by doing a
//! lookup for the current state, persisting the changed user, and then
//! replying. A lookup miss keeps the state and replies with the matching
//! "not found" message. Lookup failures are logged and answered the same
//! way so no technical detail reaches the chat.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, error, info, warn};

use super::ports::{
    ChatEvent, ChatEventHandler, ChatMessenger, ChatMessengerError, MAX_QUICK_REPLIES,
    MessageCatalog, OutgoingMessage, QuickReplyOption, ReplyToken, UserPersistenceError,
    UserRepository,
};
use super::{
    AreaHierarchyService, AreaLevel, AreaLookupError, AreaNode, ChatUserId, ConversationStatus,
    Error, MessageKey, StatusTransitionError, User,
};

/// Failures that abort handling of one event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversationError {
    #[error(transparent)]
    Persistence(#[from] UserPersistenceError),
    #[error(transparent)]
    Transition(#[from] StatusTransitionError),
    #[error(transparent)]
    Reply(#[from] ChatMessengerError),
}

impl From<ConversationError> for Error {
    fn from(value: ConversationError) -> Self {
        match &value {
            ConversationError::Persistence(UserPersistenceError::RevisionMismatch { .. }) => {
                Error::conflict(value.to_string())
            }
            ConversationError::Persistence(UserPersistenceError::Connection { .. }) => {
                Error::service_unavailable(value.to_string())
            }
            ConversationError::Reply(_) => Error::upstream_failure(value.to_string()),
            ConversationError::Persistence(_) | ConversationError::Transition(_) => {
                Error::internal(value.to_string())
            }
        }
    }
}

/// Changed user to persist, if any, and the reply to send afterwards.
struct Step {
    update: Option<User>,
    replies: Vec<OutgoingMessage>,
}

impl Step {
    fn stay(reply: OutgoingMessage) -> Self {
        Self {
            update: None,
            replies: vec![reply],
        }
    }

    fn advance(user: User, reply: OutgoingMessage) -> Self {
        Self {
            update: Some(user),
            replies: vec![reply],
        }
    }
}

/// Drives the registration flow for chat users.
pub struct ConversationService {
    users: Arc<dyn UserRepository>,
    areas: AreaHierarchyService,
    messenger: Arc<dyn ChatMessenger>,
    catalog: Arc<dyn MessageCatalog>,
    clock: Arc<dyn Clock>,
}

impl ConversationService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        areas: AreaHierarchyService,
        messenger: Arc<dyn ChatMessenger>,
        catalog: Arc<dyn MessageCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            areas,
            messenger,
            catalog,
            clock,
        }
    }

    /// Handle one event.
    pub async fn handle_event(&self, event: ChatEvent) -> Result<(), ConversationError> {
        match event {
            ChatEvent::Followed {
                chat_user_id,
                reply_token,
            } => self.on_follow(chat_user_id, &reply_token).await,
            ChatEvent::TextReceived {
                chat_user_id,
                reply_token,
                text,
            } => self.on_text(&chat_user_id, &reply_token, &text).await,
        }
    }

    async fn on_follow(
        &self,
        chat_user_id: ChatUserId,
        reply_token: &ReplyToken,
    ) -> Result<(), ConversationError> {
        if self.users.find_by_chat_user_id(&chat_user_id).await?.is_none() {
            let user = User::new_follower(chat_user_id, self.clock.utc());
            self.users.create(&user).await?;
            info!(user_id = %user.id, "registered new follower");
        }
        let replies = [self.say(MessageKey::Greeting), self.say(MessageKey::AskPrefecture)];
        self.messenger.reply(reply_token, &replies).await?;
        Ok(())
    }

    async fn on_text(
        &self,
        chat_user_id: &ChatUserId,
        reply_token: &ReplyToken,
        text: &str,
    ) -> Result<(), ConversationError> {
        let Some(user) = self.users.find_by_chat_user_id(chat_user_id).await? else {
            warn!(chat_user_id = %chat_user_id, "message from unknown chat user dropped");
            return Ok(());
        };
        let from = user.status;
        let step = self.step(user, text.trim()).await?;

        if let Some(user) = step.update {
            let to = user.status;
            self.persist(user).await?;
            debug!(chat_user_id = %chat_user_id, %from, %to, "conversation advanced");
        }
        self.messenger.reply(reply_token, &step.replies).await?;
        Ok(())
    }

    async fn step(&self, user: User, text: &str) -> Result<Step, ConversationError> {
        match user.status {
            ConversationStatus::AwaitingPrefecture => self.on_prefecture(user, text).await,
            ConversationStatus::AwaitingMunicipality => self.on_municipality(user, text).await,
            ConversationStatus::AwaitingConfirmation => self.on_confirmation(user, text).await,
            ConversationStatus::AwaitingAreaClass10Selection => self.on_class10(user, text).await,
            ConversationStatus::AwaitingAreaClass15Selection => self.on_class15(user, text).await,
            ConversationStatus::AwaitingAreaClass20Selection => self.on_class20(user, text).await,
            ConversationStatus::Completed => Ok(Step::stay(self.say(MessageKey::DefaultReply))),
        }
    }

    async fn on_prefecture(&self, mut user: User, text: &str) -> Result<Step, ConversationError> {
        let office = or_no_match(self.areas.find_office_by_name(text).await, "office search");
        let Some(office) = office else {
            return Ok(Step::stay(self.say(MessageKey::PrefectureNotFound)));
        };
        user.selected_area_office_id = Some(office.id);
        user.advance(ConversationStatus::AwaitingMunicipality)?;
        Ok(Step::advance(user, self.say(MessageKey::AskMunicipality)))
    }

    /// Picks the first candidate under the chosen office, or else the first
    /// candidate overall.
    async fn on_municipality(&self, mut user: User, text: &str) -> Result<Step, ConversationError> {
        let mut candidates = or_no_match(self.areas.search_by_name(text).await, "city search");
        let preferred = user.selected_area_office_id.as_deref().and_then(|office| {
            candidates
                .iter()
                .position(|hierarchy| hierarchy.office.id == office)
        });
        let chosen = match preferred {
            Some(index) => Some(candidates.swap_remove(index)),
            None => candidates.into_iter().next(),
        };
        let Some(hierarchy) = chosen else {
            return Ok(Step::stay(self.say(MessageKey::MunicipalityNotFound)));
        };

        user.selected_area_office_id = Some(hierarchy.office.id);
        user.selected_area_class15_id = Some(hierarchy.class15.id);
        user.selected_area_id = Some(hierarchy.class20.id);
        user.advance(ConversationStatus::AwaitingConfirmation)?;
        let prompt = self.catalog.render(
            MessageKey::ConfirmLocation.as_str(),
            &[hierarchy.class20.name.as_str()],
        );
        Ok(Step::advance(
            user,
            OutgoingMessage::with_options(prompt, self.yes_no()),
        ))
    }

    async fn on_confirmation(&self, mut user: User, text: &str) -> Result<Step, ConversationError> {
        if text == self.catalog.text(MessageKey::Yes.as_str()) {
            user.advance(ConversationStatus::Completed)?;
            return Ok(Step::advance(user, self.say(MessageKey::LocationRegistered)));
        }
        if text != self.catalog.text(MessageKey::No.as_str()) {
            return Ok(Step::stay(OutgoingMessage::with_options(
                self.catalog.text(MessageKey::ConfirmRetry.as_str()),
                self.yes_no(),
            )));
        }

        let class10 = match user.selected_area_office_id.as_deref() {
            Some(office) => or_no_match(
                self.areas.children_of(AreaLevel::Office, office).await,
                "class10 listing",
            ),
            None => Vec::new(),
        };
        if class10.is_empty() {
            return Ok(Step::stay(self.say(MessageKey::SelectionNotFound)));
        }
        let not_in_list = self.catalog.text(MessageKey::NotInList.as_str());
        let mut options = node_options(class10, MAX_QUICK_REPLIES - 1);
        options.push(QuickReplyOption::echo(not_in_list));

        user.advance(ConversationStatus::AwaitingAreaClass10Selection)?;
        Ok(Step::advance(
            user,
            self.choose(MessageKey::SelectAreaClass10, options),
        ))
    }

    async fn on_class10(&self, mut user: User, text: &str) -> Result<Step, ConversationError> {
        if text == self.catalog.text(MessageKey::NotInList.as_str()) {
            user.advance(ConversationStatus::AwaitingPrefecture)?;
            return Ok(Step::advance(user, self.say(MessageKey::AskPrefecture)));
        }
        let class15 = or_no_match(
            self.areas.children_of(AreaLevel::Class10, text).await,
            "class15 listing",
        );
        if class15.is_empty() {
            return Ok(Step::stay(self.say(MessageKey::SelectionNotFound)));
        }
        user.advance(ConversationStatus::AwaitingAreaClass15Selection)?;
        Ok(Step::advance(
            user,
            self.choose(
                MessageKey::SelectAreaClass15,
                node_options(class15, MAX_QUICK_REPLIES),
            ),
        ))
    }

    async fn on_class15(&self, mut user: User, text: &str) -> Result<Step, ConversationError> {
        let class20 = or_no_match(
            self.areas.children_of(AreaLevel::Class15, text).await,
            "class20 listing",
        );
        if class20.is_empty() {
            return Ok(Step::stay(self.say(MessageKey::SelectionNotFound)));
        }
        user.selected_area_class15_id = Some(text.to_owned());
        user.advance(ConversationStatus::AwaitingAreaClass20Selection)?;
        Ok(Step::advance(
            user,
            self.choose(
                MessageKey::SelectAreaClass20,
                node_options(class20, MAX_QUICK_REPLIES),
            ),
        ))
    }

    async fn on_class20(&self, mut user: User, text: &str) -> Result<Step, ConversationError> {
        let resolved = or_no_match(
            self.areas.resolve_by_leaf_id(text).await.map(Some),
            "class20 resolution",
        );
        let Some(hierarchy) = resolved else {
            return Ok(Step::stay(self.say(MessageKey::SelectionNotFound)));
        };
        user.selected_area_office_id = Some(hierarchy.office.id);
        user.selected_area_class15_id = Some(hierarchy.class15.id);
        user.selected_area_id = Some(hierarchy.class20.id);
        user.advance(ConversationStatus::Completed)?;
        Ok(Step::advance(user, self.say(MessageKey::LocationRegistered)))
    }

    async fn persist(&self, mut user: User) -> Result<User, ConversationError> {
        let expected = user.revision;
        user.revision = expected.saturating_add(1);
        user.updated_at = self.clock.utc();
        if let Err(err) = self.users.update(&user, expected).await {
            error!(user_id = %user.id, error = %err, "conversation state update failed");
            return Err(err.into());
        }
        Ok(user)
    }

    fn say(&self, key: MessageKey) -> OutgoingMessage {
        OutgoingMessage::text(self.catalog.text(key.as_str()))
    }

    fn choose(&self, key: MessageKey, options: Vec<QuickReplyOption>) -> OutgoingMessage {
        OutgoingMessage::with_options(self.catalog.text(key.as_str()), options)
    }

    fn yes_no(&self) -> Vec<QuickReplyOption> {
        vec![
            QuickReplyOption::echo(self.catalog.text(MessageKey::Yes.as_str())),
            QuickReplyOption::echo(self.catalog.text(MessageKey::No.as_str())),
        ]
    }
}

#[async_trait]
impl ChatEventHandler for ConversationService {
    async fn handle(&self, event: ChatEvent) -> Result<(), Error> {
        self.handle_event(event).await.map_err(Error::from)
    }
}

fn or_no_match<T: Default>(result: Result<T, AreaLookupError>, step: &'static str) -> T {
    result.unwrap_or_else(|err| {
        match &err {
            AreaLookupError::Repository(_) => error!(step, error = %err, "area lookup failed"),
            _ => debug!(step, error = %err, "area lookup found nothing"),
        }
        T::default()
    })
}

/// Name as label, id as the value sent back.
fn node_options(nodes: Vec<AreaNode>, limit: usize) -> Vec<QuickReplyOption> {
    nodes
        .into_iter()
        .take(limit)
        .map(|node| QuickReplyOption::new(node.name, node.id))
        .collect()
}

#[cfg(test)]
mod tests;
