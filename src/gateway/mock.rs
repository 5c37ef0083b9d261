// MockGateway - in-memory guild for workflow tests
//
// Records every post, role change and kick so tests can assert on side effects.

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, RoleId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{GuildGateway, MemberSnapshot, Outgoing, RecentMessage};
use crate::error::{BotError, Result};

pub const BOT_ID: u64 = 999;

/// A message sitting in a mock channel
#[derive(Debug, Clone)]
pub struct PostedMessage {
    pub author_id: UserId,
    pub has_components: bool,
    pub outgoing: Option<Outgoing>,
}

pub struct MockGateway {
    channels: HashSet<ChannelId>,
    roles: HashSet<RoleId>,
    messages: Mutex<HashMap<ChannelId, Vec<PostedMessage>>>,
    members: Mutex<HashMap<UserId, HashSet<RoleId>>>,
    kicked: Mutex<Vec<(UserId, String)>>,
    can_kick: bool,
    can_manage_roles: bool,
    can_remove_roles: bool,
    kick_fails: bool,
    post_fails: bool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            channels: HashSet::new(),
            roles: HashSet::new(),
            messages: Mutex::new(HashMap::new()),
            members: Mutex::new(HashMap::new()),
            kicked: Mutex::new(Vec::new()),
            can_kick: true,
            can_manage_roles: true,
            can_remove_roles: true,
            kick_fails: false,
            post_fails: false,
        }
    }

    pub fn with_channel(mut self, channel_id: u64) -> Self {
        self.channels.insert(ChannelId::new(channel_id));
        self
    }

    pub fn with_role(mut self, role_id: u64) -> Self {
        self.roles.insert(RoleId::new(role_id));
        self
    }

    pub fn with_member(self, user_id: u64, roles: &[u64]) -> Self {
        self.members.lock().unwrap().insert(
            UserId::new(user_id),
            roles.iter().map(|r| RoleId::new(*r)).collect(),
        );
        self
    }

    /// Seed a channel with an existing message, oldest first
    pub fn with_message(self, channel_id: u64, author_id: u64, has_components: bool) -> Self {
        self.messages
            .lock()
            .unwrap()
            .entry(ChannelId::new(channel_id))
            .or_default()
            .push(PostedMessage {
                author_id: UserId::new(author_id),
                has_components,
                outgoing: None,
            });
        self
    }

    pub fn without_kick_permission(mut self) -> Self {
        self.can_kick = false;
        self
    }

    pub fn without_role_permission(mut self) -> Self {
        self.can_manage_roles = false;
        self
    }

    /// Roles can still be granted, but not taken away
    pub fn without_role_removal_permission(mut self) -> Self {
        self.can_remove_roles = false;
        self
    }

    /// Kicks fail with a Discord error unrelated to permissions
    pub fn with_failing_kick(mut self) -> Self {
        self.kick_fails = true;
        self
    }

    /// Sends to existing channels fail with a Discord error
    pub fn with_failing_post(mut self) -> Self {
        self.post_fails = true;
        self
    }

    pub fn messages_in(&self, channel_id: u64) -> Vec<PostedMessage> {
        self.messages
            .lock()
            .unwrap()
            .get(&ChannelId::new(channel_id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn total_messages(&self) -> usize {
        self.messages.lock().unwrap().values().map(Vec::len).sum()
    }

    pub fn member_roles(&self, user_id: u64) -> Option<HashSet<RoleId>> {
        self.members
            .lock()
            .unwrap()
            .get(&UserId::new(user_id))
            .cloned()
    }

    pub fn is_member(&self, user_id: u64) -> bool {
        self.members
            .lock()
            .unwrap()
            .contains_key(&UserId::new(user_id))
    }

    pub fn kicked(&self) -> Vec<(UserId, String)> {
        self.kicked.lock().unwrap().clone()
    }
}

#[async_trait]
impl GuildGateway for MockGateway {
    fn bot_user_id(&self) -> UserId {
        UserId::new(BOT_ID)
    }

    async fn channel_exists(&self, channel_id: ChannelId) -> Result<bool> {
        Ok(self.channels.contains(&channel_id))
    }

    async fn recent_messages(&self, channel_id: ChannelId, limit: u8) -> Result<Vec<RecentMessage>> {
        let messages = self.messages.lock().unwrap();
        Ok(messages
            .get(&channel_id)
            .map(|list| {
                list.iter()
                    .rev()
                    .take(limit as usize)
                    .map(|m| RecentMessage {
                        author_id: m.author_id,
                        has_components: m.has_components,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn post(&self, channel_id: ChannelId, message: Outgoing) -> Result<MessageId> {
        if !self.channels.contains(&channel_id) {
            return Err(BotError::not_found("Channel"));
        }
        if self.post_fails {
            return Err(BotError::Discord {
                message: "Internal Server Error".to_string(),
            });
        }
        let mut messages = self.messages.lock().unwrap();
        let list = messages.entry(channel_id).or_default();
        list.push(PostedMessage {
            author_id: UserId::new(BOT_ID),
            has_components: message.has_components(),
            outgoing: Some(message),
        });
        Ok(MessageId::new(list.len() as u64))
    }

    async fn fetch_member(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<MemberSnapshot>> {
        Ok(self.members.lock().unwrap().get(&user_id).map(|roles| {
            let mut roles: Vec<RoleId> = roles.iter().copied().collect();
            roles.sort();
            MemberSnapshot { user_id, roles }
        }))
    }

    async fn role_exists(&self, _guild_id: GuildId, role_id: RoleId) -> Result<bool> {
        Ok(self.roles.contains(&role_id))
    }

    async fn add_role(&self, _guild_id: GuildId, user_id: UserId, role_id: RoleId) -> Result<()> {
        if !self.can_manage_roles {
            return Err(BotError::permission_denied("manage roles"));
        }
        let mut members = self.members.lock().unwrap();
        let roles = members.get_mut(&user_id).ok_or(BotError::MemberNotFound)?;
        roles.insert(role_id);
        Ok(())
    }

    async fn remove_role(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<()> {
        if !self.can_manage_roles || !self.can_remove_roles {
            return Err(BotError::permission_denied("manage roles"));
        }
        let mut members = self.members.lock().unwrap();
        let roles = members.get_mut(&user_id).ok_or(BotError::MemberNotFound)?;
        roles.remove(&role_id);
        Ok(())
    }

    async fn kick(&self, _guild_id: GuildId, user_id: UserId, reason: &str) -> Result<()> {
        if !self.can_kick {
            return Err(BotError::permission_denied("kick users"));
        }
        if self.kick_fails {
            return Err(BotError::Discord {
                message: "Service Unavailable".to_string(),
            });
        }
        self.members
            .lock()
            .unwrap()
            .remove(&user_id)
            .ok_or(BotError::MemberNotFound)?;
        self.kicked
            .lock()
            .unwrap()
            .push((user_id, reason.to_string()));
        Ok(())
    }
}
