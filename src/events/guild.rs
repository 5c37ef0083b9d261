use poise::serenity_prelude as serenity;
use tracing::{debug, info, warn};

use crate::gateway::SerenityGateway;
use crate::verification::PromptStatus;
use crate::{Data, Error};

/// Make sure the verification prompt is in place once the bot is connected
pub async fn handle_ready(ctx: &serenity::Context, data: &Data) -> Result<(), Error> {
    let gateway = SerenityGateway::from_context(ctx);
    match data.verification_manager.ensure_prompt(&gateway).await? {
        PromptStatus::Posted(message_id) => info!("Verification prompt posted as {}", message_id),
        PromptStatus::AlreadyPresent => info!("Verification prompt already in place"),
        PromptStatus::NotConfigured => warn!("VERIFY_CHANNEL_ID not set, no verification prompt"),
        PromptStatus::ChannelMissing => warn!("Verify channel could not be resolved, no verification prompt"),
    }
    Ok(())
}

/// Handle when a new member joins the guild
pub async fn handle_member_add(
    ctx: &serenity::Context,
    new_member: &serenity::Member,
    data: &Data,
) -> Result<(), Error> {
    info!(
        "New member joined: {} in guild {}",
        new_member.user.name, new_member.guild_id
    );

    let gateway = SerenityGateway::from_context(ctx);
    if !data
        .verification_manager
        .greet_arrival(&gateway, new_member.user.id)
        .await?
    {
        debug!("No new arrivals channel available, {} not greeted", new_member.user.name);
    }

    Ok(())
}
