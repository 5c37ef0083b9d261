//! Platform capabilities the verification workflow depends on.
//!
//! The workflow only talks to Discord through [`GuildGateway`], so it can be
//! driven by [`SerenityGateway`] in production and by an in-memory double in tests.

pub mod serenity_gateway;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, RoleId, UserId};
use uuid::Uuid;

use crate::error::Result;
use crate::verification::PendingVerification;

pub use serenity_gateway::SerenityGateway;

/// A message the bot posts into a channel
#[derive(Debug, Clone)]
pub enum Outgoing {
    /// Persistent prompt with the "Verify Yourself" button
    VerificationPrompt,
    /// Review request with Approve/Deny buttons bound to `token`
    ReviewRequest {
        pending: PendingVerification,
        token: Uuid,
    },
    /// Welcome embed for a member who just joined
    ArrivalWelcome {
        member_id: UserId,
        channel_id: ChannelId,
    },
}

impl Outgoing {
    pub fn has_components(&self) -> bool {
        matches!(
            self,
            Outgoing::VerificationPrompt | Outgoing::ReviewRequest { .. }
        )
    }
}

/// What the workflow needs to know about an existing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentMessage {
    pub author_id: UserId,
    pub has_components: bool,
}

/// A guild member and the roles they hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub user_id: UserId,
    pub roles: Vec<RoleId>,
}

impl MemberSnapshot {
    pub fn has_role(&self, role_id: RoleId) -> bool {
        self.roles.contains(&role_id)
    }
}

#[async_trait]
pub trait GuildGateway: Send + Sync {
    /// The bot's own user id
    fn bot_user_id(&self) -> UserId;

    /// Whether the channel exists and is visible to the bot
    async fn channel_exists(&self, channel_id: ChannelId) -> Result<bool>;

    /// Most recent messages in a channel, newest first
    async fn recent_messages(&self, channel_id: ChannelId, limit: u8) -> Result<Vec<RecentMessage>>;

    async fn post(&self, channel_id: ChannelId, message: Outgoing) -> Result<MessageId>;

    /// Look up a guild member. `Ok(None)` when they are not in the guild.
    async fn fetch_member(&self, guild_id: GuildId, user_id: UserId)
        -> Result<Option<MemberSnapshot>>;

    async fn role_exists(&self, guild_id: GuildId, role_id: RoleId) -> Result<bool>;

    async fn add_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId) -> Result<()>;

    async fn remove_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId)
        -> Result<()>;

    /// Remove the member from the guild, recording `reason` in the audit log
    async fn kick(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> Result<()>;
}
