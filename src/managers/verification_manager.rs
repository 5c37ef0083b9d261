use poise::serenity_prelude::{GuildId, Mentionable, UserId};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::pending_store::PendingStore;
use crate::config::Directory;
use crate::error::{BotError, Result};
use crate::gateway::{GuildGateway, MemberSnapshot, Outgoing};
use crate::messages;
use crate::verification::{
    DecisionAction, DecisionOutcome, DecisionState, Justification, PendingVerification,
    PromptStatus, Reply, Submitter,
};

/// How many recent messages are searched for an existing prompt
const PROMPT_SCAN_LIMIT: u8 = 10;

/// What a decision handler did with a claimed request
enum Resolution {
    /// Terminal: the request is settled and the buttons get disabled
    Settled(DecisionState),
    /// Recoverable failure: the request goes back to awaiting a decision
    Released,
}

/// Runs the verification workflow: prompt, intake, moderator decision and greeting
pub struct VerificationManager {
    directory: Directory,
    pending: PendingStore,
}

impl VerificationManager {
    pub fn new(directory: Directory) -> Self {
        Self {
            directory,
            pending: PendingStore::new(),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn pending(&self) -> &PendingStore {
        &self.pending
    }

    /// Post the "Verify Yourself" prompt unless one of ours is already there
    pub async fn ensure_prompt(&self, gateway: &dyn GuildGateway) -> Result<PromptStatus> {
        let Some(channel_id) = self.directory.verify_channel() else {
            debug!("No verify channel configured, skipping verification prompt");
            return Ok(PromptStatus::NotConfigured);
        };

        if !gateway.channel_exists(channel_id).await? {
            warn!("Verify channel {} not found, skipping verification prompt", channel_id);
            return Ok(PromptStatus::ChannelMissing);
        }

        let bot_id = gateway.bot_user_id();
        let recent = gateway.recent_messages(channel_id, PROMPT_SCAN_LIMIT).await?;
        if recent
            .iter()
            .any(|m| m.author_id == bot_id && m.has_components)
        {
            debug!("Verification prompt already present in {}", channel_id);
            return Ok(PromptStatus::AlreadyPresent);
        }

        let message_id = gateway
            .post(channel_id, Outgoing::VerificationPrompt)
            .await?;
        info!("Posted verification prompt {} in {}", message_id, channel_id);
        Ok(PromptStatus::Posted(message_id))
    }

    /// Handle a submitted verification form.
    /// The returned reply is only ever shown to the submitter.
    pub async fn submit_justification(
        &self,
        gateway: &dyn GuildGateway,
        submitter: Submitter,
        raw_justification: &str,
    ) -> Reply {
        match self.try_submit(gateway, submitter, raw_justification).await {
            Ok(()) => Reply::private(messages::SUBMISSION_CONFIRMED),
            Err(e) => {
                warn!("Verification request rejected: {}", e);
                Reply::from(e)
            }
        }
    }

    async fn try_submit(
        &self,
        gateway: &dyn GuildGateway,
        submitter: Submitter,
        raw_justification: &str,
    ) -> Result<()> {
        let justification = Justification::parse(raw_justification)?;

        let channel_id = self
            .directory
            .moderator_channel()
            .ok_or_else(|| BotError::not_configured("Moderator channel"))?;
        if !gateway.channel_exists(channel_id).await? {
            return Err(BotError::not_found("Moderator channel"));
        }

        let user_id = submitter.user_id;
        let pending = PendingVerification::new(submitter, justification);
        let token = self.pending.register(pending.clone());

        if let Err(e) = gateway
            .post(channel_id, Outgoing::ReviewRequest { pending, token })
            .await
        {
            error!("Failed to deliver verification request for {}: {}", user_id, e);
            self.pending.discard(token);
            return Err(e);
        }

        info!(
            "Verification request {} submitted by {} ({} requests tracked)",
            token,
            user_id,
            self.pending.len()
        );
        Ok(())
    }

    /// Apply a moderator's decision on the request identified by `token`
    pub async fn decide(
        &self,
        gateway: &dyn GuildGateway,
        guild_id: Option<GuildId>,
        token: Uuid,
        action: DecisionAction,
    ) -> DecisionOutcome {
        let Some(guild_id) = guild_id else {
            return DecisionOutcome {
                reply: BotError::OutsideGuild.into(),
                disable_controls: false,
            };
        };

        let pending = match self.pending.claim(token) {
            Ok(pending) => pending,
            Err(e) => {
                debug!("Decision on {} refused: {}", token, e);
                // Settled or forgotten requests can never be decided from this message
                let disable_controls =
                    matches!(e, BotError::AlreadyDecided | BotError::UnknownRequest);
                return DecisionOutcome {
                    reply: e.into(),
                    disable_controls,
                };
            }
        };

        let (reply, resolution) = match action {
            DecisionAction::Approve => self.approve(gateway, guild_id, &pending).await,
            DecisionAction::Deny => self.deny(gateway, guild_id, &pending).await,
        };

        let disable_controls = match resolution {
            Resolution::Settled(state) => {
                info!(
                    "Verification {} for {} settled as {:?}",
                    token,
                    pending.user_id(),
                    state
                );
                self.pending.settle(token, state);
                true
            }
            Resolution::Released => {
                self.pending.release(token);
                false
            }
        };

        DecisionOutcome {
            reply,
            disable_controls,
        }
    }

    async fn resolve_member(
        &self,
        gateway: &dyn GuildGateway,
        guild_id: GuildId,
        user_id: UserId,
    ) -> std::result::Result<MemberSnapshot, (Reply, Resolution)> {
        match gateway.fetch_member(guild_id, user_id).await {
            Ok(Some(member)) => Ok(member),
            Ok(None) => {
                warn!("Member {} is no longer in guild {}", user_id, guild_id);
                Err((
                    BotError::MemberNotFound.into(),
                    Resolution::Settled(DecisionState::Closed),
                ))
            }
            Err(e) => {
                error!("Failed to fetch member {}: {}", user_id, e);
                Err((e.into(), Resolution::Released))
            }
        }
    }

    async fn approve(
        &self,
        gateway: &dyn GuildGateway,
        guild_id: GuildId,
        pending: &PendingVerification,
    ) -> (Reply, Resolution) {
        let member = match self.resolve_member(gateway, guild_id, pending.user_id()).await {
            Ok(member) => member,
            Err(failure) => return failure,
        };

        match self.apply_approval(gateway, guild_id, &member).await {
            Ok(actions) => {
                let summary =
                    messages::approval_summary(&member.user_id.mention().to_string(), &actions);
                (Reply::public(summary), Resolution::Settled(DecisionState::Approved))
            }
            Err(e) => {
                error!("Failed to approve {}: {}", member.user_id, e);
                (e.into(), Resolution::Released)
            }
        }
    }

    /// Grant the verified role and drop the unverified one.
    /// Returns the role changes that were made, in order.
    async fn apply_approval(
        &self,
        gateway: &dyn GuildGateway,
        guild_id: GuildId,
        member: &MemberSnapshot,
    ) -> Result<Vec<&'static str>> {
        let verified_role = self
            .directory
            .verified_role()
            .ok_or_else(|| BotError::not_configured("Verified role"))?;
        if !gateway.role_exists(guild_id, verified_role).await? {
            return Err(BotError::not_found("Verified role"));
        }

        let mut actions = Vec::new();

        gateway
            .add_role(guild_id, member.user_id, verified_role)
            .await?;
        actions.push("given the verified role");

        if let Some(unverified_role) = self.directory.unverified_role() {
            if member.has_role(unverified_role) {
                gateway
                    .remove_role(guild_id, member.user_id, unverified_role)
                    .await?;
                actions.push("removed the unverified role");
            }
        }

        Ok(actions)
    }

    async fn deny(
        &self,
        gateway: &dyn GuildGateway,
        guild_id: GuildId,
        pending: &PendingVerification,
    ) -> (Reply, Resolution) {
        let member = match self.resolve_member(gateway, guild_id, pending.user_id()).await {
            Ok(member) => member,
            Err(failure) => return failure,
        };

        match gateway
            .kick(guild_id, member.user_id, messages::KICK_REASON)
            .await
        {
            Ok(()) => {
                info!("Kicked {} after denied verification", member.user_id);
                (
                    Reply::public(messages::denial_announcement(
                        &member.user_id.mention().to_string(),
                    )),
                    Resolution::Settled(DecisionState::Denied),
                )
            }
            Err(e) if e.is_permission_denied() => {
                warn!("Missing permission to kick {}: {}", member.user_id, e);
                (
                    BotError::permission_denied("kick users").into(),
                    Resolution::Settled(DecisionState::Closed),
                )
            }
            Err(e) => {
                error!("Failed to kick {}: {}", member.user_id, e);
                (e.into(), Resolution::Released)
            }
        }
    }

    /// Point a newly joined member at the verification flow
    pub async fn greet_arrival(&self, gateway: &dyn GuildGateway, member_id: UserId) -> Result<bool> {
        let Some(channel_id) = self.directory.new_arrivals_channel() else {
            return Ok(false);
        };
        if !gateway.channel_exists(channel_id).await? {
            debug!("New arrivals channel {} not found, skipping welcome", channel_id);
            return Ok(false);
        }

        gateway
            .post(
                channel_id,
                Outgoing::ArrivalWelcome {
                    member_id,
                    channel_id,
                },
            )
            .await?;
        Ok(true)
    }
}

/// Shared verification manager type
pub type SharedVerificationManager = Arc<VerificationManager>;

pub fn create_shared_verification_manager(directory: Directory) -> SharedVerificationManager {
    Arc::new(VerificationManager::new(directory))
}
