use async_trait::async_trait;
use poise::serenity_prelude::{
    self as serenity, ChannelId, GetMessages, GuildId, Http, MessageId, RoleId, UserId,
};
use std::sync::Arc;
use tracing::debug;

use super::{GuildGateway, MemberSnapshot, Outgoing, RecentMessage};
use crate::error::{http_status, BotError, Result};
use crate::messages;

/// [`GuildGateway`] backed by the Discord HTTP API
pub struct SerenityGateway {
    http: Arc<Http>,
    bot_user_id: UserId,
}

impl SerenityGateway {
    pub fn new(http: Arc<Http>, bot_user_id: UserId) -> Self {
        Self { http, bot_user_id }
    }

    pub fn from_context(ctx: &serenity::Context) -> Self {
        let bot_user_id = ctx.cache.current_user().id;
        Self::new(ctx.http.clone(), bot_user_id)
    }
}

/// 404 means the entity does not exist, 403 that the bot cannot see it
fn is_missing(err: &serenity::Error) -> bool {
    matches!(http_status(err), Some(403) | Some(404))
}

#[async_trait]
impl GuildGateway for SerenityGateway {
    fn bot_user_id(&self) -> UserId {
        self.bot_user_id
    }

    async fn channel_exists(&self, channel_id: ChannelId) -> Result<bool> {
        match self.http.get_channel(channel_id).await {
            Ok(_) => Ok(true),
            Err(e) if is_missing(&e) => {
                debug!("Channel {} is not resolvable: {}", channel_id, e);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn recent_messages(&self, channel_id: ChannelId, limit: u8) -> Result<Vec<RecentMessage>> {
        let messages = channel_id
            .messages(&self.http, GetMessages::new().limit(limit))
            .await?;

        Ok(messages
            .iter()
            .map(|m| RecentMessage {
                author_id: m.author.id,
                has_components: !m.components.is_empty(),
            })
            .collect())
    }

    async fn post(&self, channel_id: ChannelId, message: Outgoing) -> Result<MessageId> {
        let sent = channel_id
            .send_message(&self.http, messages::render(message))
            .await
            .map_err(|e| BotError::from(e).for_action("send messages in that channel"))?;
        Ok(sent.id)
    }

    async fn fetch_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<MemberSnapshot>> {
        match guild_id.member(&self.http, user_id).await {
            Ok(member) => Ok(Some(MemberSnapshot {
                user_id: member.user.id,
                roles: member.roles.clone(),
            })),
            Err(e) if http_status(&e) == Some(404) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn role_exists(&self, guild_id: GuildId, role_id: RoleId) -> Result<bool> {
        let roles = guild_id.roles(&self.http).await?;
        Ok(roles.contains_key(&role_id))
    }

    async fn add_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId) -> Result<()> {
        self.http
            .add_member_role(guild_id, user_id, role_id, Some("Verification approved"))
            .await
            .map_err(|e| BotError::from(e).for_action("manage roles"))
    }

    async fn remove_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<()> {
        self.http
            .remove_member_role(guild_id, user_id, role_id, Some("Verification approved"))
            .await
            .map_err(|e| BotError::from(e).for_action("manage roles"))
    }

    async fn kick(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> Result<()> {
        guild_id
            .kick_with_reason(&self.http, user_id, reason)
            .await
            .map_err(|e| BotError::from(e).for_action("kick users"))
    }
}
